use std::{collections::HashSet, sync::Arc};

use tracing::{debug, warn};

use crate::{
  config::SiblingConfig,
  content::{ContentSource, PostDetail, PostSummary},
  error::Result,
  util::DateFormatter,
};

use super::reading_time::ReadingTime;

/// Everything the post page shows.
#[derive(Clone, Debug, PartialEq)]
pub struct PostPage {
  pub post: PostDetail,
  pub reading_time: ReadingTime,
  pub published: Option<String>,
  pub last_edited: Option<String>,
  pub siblings: Siblings,
}

/// The posts right before and after a post in the index order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Siblings {
  pub before: Option<PostSummary>,
  pub next: Option<PostSummary>,
}

impl Siblings {
  /// Both siblings are absent when `uid` is not in `index`.
  pub fn resolve(index: &[PostSummary], uid: &str) -> Self {
    let Some(pos) = index.iter().position(|post| post.uid == uid) else {
      return Self::default();
    };

    Self {
      before: pos.checked_sub(1).and_then(|i| index.get(i)).cloned(),
      next: index.get(pos + 1).cloned(),
    }
  }
}

pub struct PostPageBuilder {
  source: Arc<dyn ContentSource>,
  dates: DateFormatter,
  index: SiblingConfig,
}

impl PostPageBuilder {
  pub fn new(
    source: Arc<dyn ContentSource>,
    dates: DateFormatter,
    index: SiblingConfig,
  ) -> Self {
    Self {
      source,
      dates,
      index,
    }
  }

  /// `None` when there is no post with this uid (yet).
  pub async fn build(&self, uid: &str) -> Result<Option<PostPage>> {
    let (post, index) =
      futures::try_join!(self.source.get_by_uid(uid), self.post_index())?;

    let Some(post) = post else {
      debug!("post not found: {uid}");
      return Ok(None);
    };

    let siblings = Siblings::resolve(&index, &post.uid);
    Ok(Some(PostPage {
      reading_time: ReadingTime::of(&post.content),
      published: post.published_at.as_ref().map(|d| self.dates.date(d)),
      last_edited: post.last_edited_at.as_ref().map(|d| self.dates.date_time(d)),
      siblings,
      post,
    }))
  }

  /// All post summaries in the source's order, walking every page.
  pub async fn post_index(&self) -> Result<Vec<PostSummary>> {
    let mut page = self.source.query(self.index.page_size).await?;
    let mut posts = std::mem::take(&mut page.results);
    let mut seen = HashSet::new();
    let mut pages = 1;

    while let Some(cursor) = page.next_page.take() {
      if pages >= self.index.max_pages {
        warn!(
          "post index truncated after {pages} pages ({} posts)",
          posts.len()
        );
        break;
      }
      if !seen.insert(cursor.clone()) {
        warn!("content source repeated cursor {cursor}, stopping");
        break;
      }

      page = self.source.fetch_page(&cursor).await?;
      posts.append(&mut page.results);
      pages += 1;
    }

    Ok(posts)
  }
}
