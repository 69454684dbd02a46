use std::{path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::{client::ClientConfig, error::Result};

/// Everything the blog needs to know about itself, loaded once at
/// startup. Every section has defaults so the config file is optional.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SiteConfig {
  pub title: String,
  pub content_source: ContentSourceConfig,
  pub listing: ListingConfig,
  pub siblings: SiblingConfig,
  pub display: DisplayConfig,
  /// How long a rendered page is served before it is regenerated in the
  /// background.
  #[serde(deserialize_with = "duration_str::deserialize_duration")]
  pub revalidate: Duration,
  pub page_cache_size: usize,
  pub client: ClientConfig,
}

impl Default for SiteConfig {
  fn default() -> Self {
    Self {
      title: "spacetraveling".into(),
      content_source: ContentSourceConfig::default(),
      listing: ListingConfig::default(),
      siblings: SiblingConfig::default(),
      display: DisplayConfig::default(),
      revalidate: Duration::from_secs(30 * 60),
      page_cache_size: 128,
      client: ClientConfig::default(),
    }
  }
}

impl SiteConfig {
  pub fn load_from_file(path: &Path) -> Result<Self> {
    let f = std::fs::File::open(path)?;
    let config = serde_yaml::from_reader(f)
      .map_err(crate::error::ConfigError::from)?;
    Ok(config)
  }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ContentSourceConfig {
  /// Prismic API endpoint, e.g. `https://<repo>.cdn.prismic.io/api/v2`
  pub api_url: Option<Url>,
  /// Never read from the config file, only from the command line or
  /// the environment.
  #[serde(skip)]
  pub access_token: Option<String>,
  pub document_type: String,
}

impl Default for ContentSourceConfig {
  fn default() -> Self {
    Self {
      api_url: None,
      access_token: None,
      document_type: "posts_ignite".into(),
    }
  }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ListingConfig {
  pub page_size: usize,
}

impl Default for ListingConfig {
  fn default() -> Self {
    Self { page_size: 2 }
  }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SiblingConfig {
  /// Page size used while walking the full post index
  pub page_size: usize,
  /// Upper bound on the pages walked for one post page
  pub max_pages: usize,
}

impl Default for SiblingConfig {
  fn default() -> Self {
    Self {
      page_size: 100,
      max_pages: 50,
    }
  }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DisplayConfig {
  pub locale: String,
  pub timezone: String,
  pub date_format: String,
  pub date_time_format: String,
}

impl Default for DisplayConfig {
  fn default() -> Self {
    Self {
      locale: "pt_BR".into(),
      timezone: "America/Sao_Paulo".into(),
      date_format: "%d %b %Y".into(),
      date_time_format: "%d %b %Y, às %H:%M".into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_config_uses_defaults() {
    let config: SiteConfig = serde_yaml::from_str("{}").unwrap();

    assert_eq!(config.listing.page_size, 2);
    assert_eq!(config.revalidate, Duration::from_secs(1800));
    assert_eq!(config.content_source.document_type, "posts_ignite");
    assert!(config.content_source.api_url.is_none());
  }

  #[test]
  fn test_parse_config() {
    let yaml = r#"
title: my blog
content_source:
  api_url: https://blog.cdn.prismic.io/api/v2
  document_type: posts
listing:
  page_size: 5
revalidate: 10m
display:
  locale: en_US
  timezone: UTC
client:
  timeout: 3s
"#;
    let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.title, "my blog");
    assert_eq!(
      config.content_source.api_url.unwrap().as_str(),
      "https://blog.cdn.prismic.io/api/v2"
    );
    assert_eq!(config.listing.page_size, 5);
    assert_eq!(config.revalidate, Duration::from_secs(600));
    assert_eq!(config.display.locale, "en_US");
    // untouched keys of a partially specified section keep their defaults
    assert_eq!(config.display.date_format, "%d %b %Y");
    assert_eq!(config.siblings.max_pages, 50);
  }

  #[test]
  fn test_access_token_not_read_from_file() {
    let yaml = r#"
content_source:
  access_token: leaked
"#;
    let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
    assert!(config.content_source.access_token.is_none());
  }
}
