use std::sync::{
  Mutex,
  atomic::{AtomicUsize, Ordering},
};

use crate::{
  config::DisplayConfig,
  content::{ContentBlock, ContentSource, Cursor, Page, PostDetail, PostSummary},
  error::{Error, Result},
  util::{DateFormatter, parse_date},
};

/// English dates in UTC, so assertions don't depend on the defaults.
pub fn date_formatter() -> DateFormatter {
  DateFormatter::new(&test_display_config()).expect("bad display config")
}

pub fn test_display_config() -> DisplayConfig {
  DisplayConfig {
    locale: "en_US".into(),
    timezone: "UTC".into(),
    ..DisplayConfig::default()
  }
}

pub fn summary(uid: &str) -> PostSummary {
  PostSummary {
    uid: uid.into(),
    published_at: parse_date("2021-03-15T19:25:28+0000"),
    title: format!("Title of {uid}"),
    subtitle: format!("Subtitle of {uid}"),
    author: "Joseph Oliveira".into(),
  }
}

pub fn detail(uid: &str) -> PostDetail {
  let summary = summary(uid);
  PostDetail {
    uid: summary.uid,
    published_at: summary.published_at,
    last_edited_at: parse_date("2021-03-17T08:00:00+0000"),
    title: summary.title,
    subtitle: summary.subtitle,
    author: summary.author,
    banner_url: format!("https://images.test/{uid}.png"),
    content: vec![ContentBlock {
      heading: Some(format!("About {uid}")),
      body_html: format!("<p>The body of <strong>{uid}</strong>.</p>"),
    }],
  }
}

/// In-memory content source. Pages are slices of the post list, cursors
/// are `offset:<n>:<size>`.
pub struct StaticSource {
  posts: Mutex<Vec<PostSummary>>,
  details: Mutex<Vec<PostDetail>>,
  calls: AtomicUsize,
  failing: Mutex<bool>,
}

impl StaticSource {
  pub fn new(posts: Vec<PostSummary>, details: Vec<PostDetail>) -> Self {
    Self {
      posts: Mutex::new(posts),
      details: Mutex::new(details),
      calls: AtomicUsize::new(0),
      failing: Mutex::new(false),
    }
  }

  /// A summary and a detail for every uid.
  pub fn with_posts<const N: usize>(uids: [&str; N]) -> Self {
    Self::new(
      uids.iter().map(|uid| summary(uid)).collect(),
      uids.iter().map(|uid| detail(uid)).collect(),
    )
  }

  /// Number of calls made to the source so far.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn set_failing(&self, failing: bool) {
    *self.failing.lock().unwrap() = failing;
  }

  pub fn set_title(&self, uid: &str, title: &str) {
    for post in self.posts.lock().unwrap().iter_mut() {
      if post.uid == uid {
        post.title = title.into();
      }
    }
    for post in self.details.lock().unwrap().iter_mut() {
      if post.uid == uid {
        post.title = title.into();
      }
    }
  }

  pub fn remove(&self, uid: &str) {
    self.posts.lock().unwrap().retain(|p| p.uid != uid);
    self.details.lock().unwrap().retain(|p| p.uid != uid);
  }

  fn enter(&self) -> Result<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if *self.failing.lock().unwrap() {
      return Err(Error::Message("content source unavailable".into()));
    }
    Ok(())
  }

  fn page(&self, offset: usize, size: usize) -> Page<PostSummary> {
    let posts = self.posts.lock().unwrap();
    let end = (offset + size).min(posts.len());
    let results = posts.get(offset..end).unwrap_or_default().to_vec();
    let next_page =
      (end < posts.len()).then(|| Cursor::new(format!("offset:{end}:{size}")));

    Page { results, next_page }
  }
}

#[async_trait::async_trait]
impl ContentSource for StaticSource {
  async fn query(&self, page_size: usize) -> Result<Page<PostSummary>> {
    self.enter()?;
    Ok(self.page(0, page_size))
  }

  async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<PostSummary>> {
    self.enter()?;
    let parsed = cursor
      .as_str()
      .strip_prefix("offset:")
      .and_then(|rest| rest.split_once(':'))
      .and_then(|(offset, size)| Some((offset.parse().ok()?, size.parse().ok()?)));

    match parsed {
      Some((offset, size)) => Ok(self.page(offset, size)),
      None => Err(Error::ForeignCursor(cursor.to_string())),
    }
  }

  async fn get_by_uid(&self, uid: &str) -> Result<Option<PostDetail>> {
    self.enter()?;
    let details = self.details.lock().unwrap();
    Ok(details.iter().find(|post| post.uid == uid).cloned())
  }
}
