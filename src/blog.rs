pub mod listing;
pub mod post;
pub mod reading_time;

use std::sync::Arc;

use crate::{
  config::SiteConfig,
  content::{ContentSource, prismic::PrismicSource},
  error::Result,
  util::DateFormatter,
};

pub use listing::{Listing, ListingBuilder, ListingSession};
pub use post::{PostPage, PostPageBuilder};

/// The page builders of one site, sharing a content source.
pub struct Blog {
  pub title: String,
  pub listing: ListingBuilder,
  pub posts: PostPageBuilder,
}

impl Blog {
  pub fn new(config: &SiteConfig, source: Arc<dyn ContentSource>) -> Result<Self> {
    let dates = DateFormatter::new(&config.display)?;

    Ok(Self {
      title: config.title.clone(),
      listing: ListingBuilder::new(
        source.clone(),
        dates.clone(),
        config.listing.page_size,
      ),
      posts: PostPageBuilder::new(source, dates, config.siblings.clone()),
    })
  }

  /// Builds the blog on top of the configured Prismic repository.
  pub fn from_config(config: &SiteConfig) -> Result<Self> {
    let client = config.client.build()?;
    let source = PrismicSource::new(&config.content_source, client)?;
    Self::new(config, Arc::new(source))
  }
}
