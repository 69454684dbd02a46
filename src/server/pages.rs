use std::{
  collections::HashSet,
  sync::{Arc, Mutex},
  time::Duration,
};

use maud::Markup;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
  blog::{Blog, Listing},
  cache::{Lookup, TimedLruCache},
  content::Cursor,
  error::Result,
};

use super::web;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PageKey {
  Listing,
  Post(String),
}

impl std::fmt::Display for PageKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PageKey::Listing => f.write_str("/"),
      PageKey::Post(uid) => write!(f, "/post/{uid}"),
    }
  }
}

/// Rendered pages with stale-while-revalidate caching.
///
/// A page older than the revalidation interval is still served, while a
/// single background task renders its replacement.
#[derive(Clone)]
pub struct PageService {
  inner: Arc<Inner>,
}

struct Inner {
  blog: Blog,
  cache: TimedLruCache<PageKey, Markup>,
  // pages with a background refresh in flight
  refreshing: Mutex<HashSet<PageKey>>,
}

impl PageService {
  pub fn new(blog: Blog, revalidate: Duration, cache_size: usize) -> Self {
    let inner = Inner {
      blog,
      cache: TimedLruCache::new(cache_size, revalidate),
      refreshing: Mutex::new(HashSet::new()),
    };

    Self {
      inner: Arc::new(inner),
    }
  }

  pub fn title(&self) -> &str {
    &self.inner.blog.title
  }

  /// `None` when the page has no content (yet), e.g. an unknown post.
  pub async fn page(&self, key: PageKey) -> Result<Option<Markup>> {
    match self.inner.cache.lookup(&key) {
      Lookup::Fresh(page) => Ok(Some(page)),
      Lookup::Stale(page) => {
        self.spawn_refresh(key);
        Ok(Some(page))
      }
      Lookup::Missing => {
        let page = self.render(&key).await?;
        if let Some(page) = &page {
          self.inner.cache.insert(key, page.clone());
        }
        Ok(page)
      }
    }
  }

  /// The listing page following `cursor`. Not cached.
  pub async fn load_more(&self, cursor: &Cursor) -> Result<Listing> {
    self.inner.blog.listing.load_more(cursor).await
  }

  /// Render the listing and the posts it links to ahead of the first
  /// request.
  pub async fn prerender(&self) -> Result<()> {
    let listing = self.inner.blog.listing.build().await?;
    self.inner.cache.insert(
      PageKey::Listing,
      web::listing::render_listing_page(self.title(), &listing),
    );

    for item in &listing.items {
      let key = PageKey::Post(item.summary.uid.clone());
      match self.render(&key).await {
        Ok(Some(page)) => {
          self.inner.cache.insert(key, page);
        }
        Ok(None) => debug!("nothing to prerender for {key}"),
        Err(e) => warn!("failed to prerender {key}: {e}"),
      }
    }

    info!("prerendered {} pages", listing.items.len() + 1);
    Ok(())
  }

  async fn render(&self, key: &PageKey) -> Result<Option<Markup>> {
    let blog = &self.inner.blog;
    match key {
      PageKey::Listing => {
        let listing = blog.listing.build().await?;
        Ok(Some(web::listing::render_listing_page(&blog.title, &listing)))
      }
      PageKey::Post(uid) => {
        let page = blog.posts.build(uid).await?;
        Ok(page.map(|page| web::post::render_post_page(&blog.title, &page)))
      }
    }
  }

  fn spawn_refresh(&self, key: PageKey) -> Option<JoinHandle<()>> {
    let mut refreshing = self.inner.refreshing.lock().ok()?;
    if !refreshing.insert(key.clone()) {
      return None;
    }
    drop(refreshing);

    let this = self.clone();
    Some(tokio::spawn(async move {
      this.refresh(&key).await;
      if let Ok(mut refreshing) = this.inner.refreshing.lock() {
        refreshing.remove(&key);
      }
    }))
  }

  async fn refresh(&self, key: &PageKey) {
    debug!("regenerating {key}");
    match self.render(key).await {
      Ok(Some(page)) => {
        self.inner.cache.insert(key.clone(), page);
      }
      Ok(None) => {
        info!("{key} is gone, dropping it from the cache");
        self.inner.cache.remove(key);
      }
      Err(e) => {
        warn!("failed to regenerate {key}, serving stale page: {e}");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    config::SiteConfig,
    test_utils::{StaticSource, test_display_config},
  };

  fn service(source: Arc<StaticSource>, revalidate: Duration) -> PageService {
    let config = SiteConfig {
      display: test_display_config(),
      ..SiteConfig::default()
    };
    let blog = Blog::new(&config, source).unwrap();
    PageService::new(blog, revalidate, 16)
  }

  fn html(page: Option<Markup>) -> String {
    page.expect("page should exist").into_string()
  }

  async fn settle(source: &StaticSource, calls: usize) {
    for _ in 0..100 {
      if source.calls() >= calls {
        break;
      }
      tokio::task::yield_now().await;
    }
    // let the refresh task store its result
    for _ in 0..10 {
      tokio::task::yield_now().await;
    }
  }

  #[tokio::test]
  async fn test_fresh_pages_are_served_from_cache() {
    let source = Arc::new(StaticSource::with_posts(["a", "b", "c"]));
    let service = service(source.clone(), Duration::from_secs(60));

    let first = html(service.page(PageKey::Listing).await.unwrap());
    assert_eq!(source.calls(), 1);

    let second = html(service.page(PageKey::Listing).await.unwrap());
    assert_eq!(source.calls(), 1);
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn test_stale_page_is_served_then_regenerated() {
    let source = Arc::new(StaticSource::with_posts(["a", "b", "c"]));
    let service = service(source.clone(), Duration::ZERO);

    let first = html(service.page(PageKey::Listing).await.unwrap());
    assert!(first.contains("Title of a"));
    source.set_title("a", "Renamed");

    // stale: the old page is returned right away
    let stale = html(service.page(PageKey::Listing).await.unwrap());
    assert_eq!(stale, first);

    settle(&source, 2).await;
    assert_eq!(source.calls(), 2);
    let refreshed = html(service.page(PageKey::Listing).await.unwrap());
    assert!(refreshed.contains("Renamed"));
  }

  #[tokio::test]
  async fn test_one_refresh_per_stale_page() {
    let source = Arc::new(StaticSource::with_posts(["a"]));
    let service = service(source.clone(), Duration::ZERO);
    service.page(PageKey::Listing).await.unwrap();

    let key = PageKey::Listing;
    let handle = service.spawn_refresh(key.clone());
    assert!(handle.is_some());
    assert!(service.spawn_refresh(key.clone()).is_none());

    handle.unwrap().await.unwrap();
    assert!(service.spawn_refresh(key).is_some());
  }

  #[tokio::test]
  async fn test_failed_refresh_keeps_stale_page() {
    let source = Arc::new(StaticSource::with_posts(["a"]));
    let service = service(source.clone(), Duration::ZERO);
    let first = html(service.page(PageKey::Listing).await.unwrap());

    source.set_failing(true);
    let handle = service.spawn_refresh(PageKey::Listing).unwrap();
    handle.await.unwrap();

    let stale = html(service.page(PageKey::Listing).await.unwrap());
    assert_eq!(stale, first);
  }

  #[tokio::test]
  async fn test_missing_post_is_not_cached() {
    let source = Arc::new(StaticSource::with_posts(["a"]));
    let service = service(source.clone(), Duration::from_secs(60));

    let key = PageKey::Post("later".into());
    assert!(service.page(key.clone()).await.unwrap().is_none());
    let calls = source.calls();
    assert!(service.page(key).await.unwrap().is_none());
    assert!(source.calls() > calls);
  }

  #[tokio::test]
  async fn test_removed_post_is_evicted_on_refresh() {
    let source = Arc::new(StaticSource::with_posts(["a", "b"]));
    let service = service(source.clone(), Duration::ZERO);
    let key = PageKey::Post("b".into());
    assert!(service.page(key.clone()).await.unwrap().is_some());

    source.remove("b");
    service.spawn_refresh(key.clone()).unwrap().await.unwrap();

    assert!(service.page(key).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_prerender_fills_cache() {
    let source = Arc::new(StaticSource::with_posts(["a", "b", "c"]));
    let service = service(source.clone(), Duration::from_secs(60));

    service.prerender().await.unwrap();
    let calls = source.calls();

    // listing plus the two posts of its first page
    assert!(service.page(PageKey::Listing).await.unwrap().is_some());
    assert!(service.page(PageKey::Post("a".into())).await.unwrap().is_some());
    assert!(service.page(PageKey::Post("b".into())).await.unwrap().is_some());
    assert_eq!(source.calls(), calls);
  }
}
