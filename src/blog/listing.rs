use std::sync::Arc;

use tracing::debug;

use crate::{
  content::{ContentSource, Cursor, Page, PostSummary},
  error::Result,
  util::DateFormatter,
};

/// A summary together with its formatted publication date. The summary
/// keeps the raw timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplaySummary {
  pub summary: PostSummary,
  pub published: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
  pub cursor: Option<Cursor>,
  pub items: Vec<DisplaySummary>,
}

impl Listing {
  pub fn has_more(&self) -> bool {
    self.cursor.is_some()
  }

  /// Append the items of the following page and take over its cursor.
  pub fn append(&mut self, page: Listing) {
    self.items.extend(page.items);
    self.cursor = page.cursor;
  }
}

pub struct ListingBuilder {
  source: Arc<dyn ContentSource>,
  dates: DateFormatter,
  page_size: usize,
}

impl ListingBuilder {
  pub fn new(
    source: Arc<dyn ContentSource>,
    dates: DateFormatter,
    page_size: usize,
  ) -> Self {
    Self {
      source,
      dates,
      page_size,
    }
  }

  /// The first page of the listing.
  pub async fn build(&self) -> Result<Listing> {
    let page = self.source.query(self.page_size).await?;
    Ok(self.present(page))
  }

  /// The page following `cursor`, formatted like the first one.
  pub async fn load_more(&self, cursor: &Cursor) -> Result<Listing> {
    let page = self.source.fetch_page(cursor).await?;
    Ok(self.present(page))
  }

  fn present(&self, page: Page<PostSummary>) -> Listing {
    let items = page
      .results
      .into_iter()
      .map(|summary| DisplaySummary {
        published: summary.published_at.as_ref().map(|d| self.dates.date(d)),
        summary,
      })
      .collect();

    Listing {
      cursor: page.next_page,
      items,
    }
  }
}

/// Identifies one "load more" fetch issued by a [`ListingSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchToken(u64);

/// A listing accumulated over several "load more" fetches.
///
/// Only the response to the most recently issued fetch is applied, and
/// only once, so a slow response overtaken by a newer fetch can neither
/// duplicate nor reorder items.
#[derive(Debug, Default)]
pub struct ListingSession {
  listing: Listing,
  issued: u64,
  applied: u64,
}

impl ListingSession {
  pub fn new(listing: Listing) -> Self {
    Self {
      listing,
      issued: 0,
      applied: 0,
    }
  }

  pub fn listing(&self) -> &Listing {
    &self.listing
  }

  /// Start a fetch of the next page. `None` when there is no next page.
  pub fn begin_fetch(&mut self) -> Option<(FetchToken, Cursor)> {
    let cursor = self.listing.cursor.clone()?;
    self.issued += 1;
    Some((FetchToken(self.issued), cursor))
  }

  /// Apply a fetched page. Returns false if the response was discarded.
  pub fn apply(&mut self, token: FetchToken, page: Listing) -> bool {
    if token.0 != self.issued || token.0 <= self.applied {
      debug!("discarding stale listing page (fetch {})", token.0);
      return false;
    }

    self.applied = token.0;
    self.listing.append(page);
    true
  }

  /// Load up to `pages` more pages one after the other. Returns the number
  /// of pages appended.
  pub async fn load_pages(
    &mut self,
    builder: &ListingBuilder,
    pages: usize,
  ) -> Result<usize> {
    let mut loaded = 0;
    while loaded < pages && self.listing.has_more() {
      let Some((token, cursor)) = self.begin_fetch() else {
        break;
      };
      let page = builder.load_more(&cursor).await?;
      if self.apply(token, page) {
        loaded += 1;
      }
    }
    Ok(loaded)
  }
}
