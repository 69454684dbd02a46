pub mod prismic;
mod rich_text;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opaque continuation token naming the next page of a listing. For
/// Prismic this is the `next_page` URL.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
  pub fn new(cursor: impl Into<String>) -> Self {
    Self(cursor.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for Cursor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// One page of a paginated result set.
#[derive(Clone, Debug)]
pub struct Page<T> {
  pub results: Vec<T>,
  pub next_page: Option<Cursor>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PostSummary {
  pub uid: String,
  pub published_at: Option<DateTime<FixedOffset>>,
  pub title: String,
  pub subtitle: String,
  pub author: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PostDetail {
  pub uid: String,
  pub published_at: Option<DateTime<FixedOffset>>,
  pub last_edited_at: Option<DateTime<FixedOffset>>,
  pub title: String,
  pub subtitle: String,
  pub author: String,
  pub banner_url: String,
  pub content: Vec<ContentBlock>,
}

/// A section of a post: an optional heading followed by rich text.
/// `body_html` comes from the content source and is embedded as is.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentBlock {
  pub heading: Option<String>,
  pub body_html: String,
}

/// The narrow read interface the blog needs from a content repository.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
  /// First page of post summaries, in the repository's natural order.
  async fn query(&self, page_size: usize) -> Result<Page<PostSummary>>;

  /// The page named by a cursor returned from an earlier page.
  async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<PostSummary>>;

  /// A full post, or `None` if no post has this uid.
  async fn get_by_uid(&self, uid: &str) -> Result<Option<PostDetail>>;
}
