//! Read-only client for the Prismic REST API (v2).

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{
  cache::TimedLruCache,
  client::Client,
  config::ContentSourceConfig,
  error::{ConfigError, Error, Result},
  util::parse_date,
};

use super::{
  ContentBlock, ContentSource, Cursor, Page, PostDetail, PostSummary,
  rich_text::{self, RichTextBlock},
};

const SUMMARY_FIELDS: [&str; 3] = ["title", "subtitle", "author"];

pub struct PrismicSource {
  client: Client,
  api_url: Url,
  access_token: Option<String>,
  document_type: String,
  // the master ref changes whenever content is published
  master_ref: TimedLruCache<Url, String>,
}

#[derive(Deserialize)]
struct ApiInfo {
  refs: Vec<ApiRef>,
}

#[derive(Deserialize)]
struct ApiRef {
  #[serde(rename = "ref")]
  id: String,
  #[serde(rename = "isMasterRef", default)]
  is_master: bool,
}

#[derive(Deserialize)]
struct SearchResponse<D> {
  next_page: Option<String>,
  results: Vec<Document<D>>,
}

#[derive(Deserialize)]
struct Document<D> {
  id: String,
  uid: Option<String>,
  first_publication_date: Option<String>,
  last_publication_date: Option<String>,
  data: D,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SummaryData {
  title: Option<String>,
  subtitle: Option<String>,
  author: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct DetailData {
  title: Option<String>,
  subtitle: Option<String>,
  author: Option<String>,
  banner: Option<Banner>,
  content: Vec<Section>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Banner {
  url: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Section {
  heading: Option<String>,
  body: Vec<RichTextBlock>,
}

impl<D> Document<D> {
  fn uid(&self) -> String {
    self.uid.clone().unwrap_or_else(|| self.id.clone())
  }
}

impl From<Document<SummaryData>> for PostSummary {
  fn from(doc: Document<SummaryData>) -> Self {
    Self {
      uid: doc.uid(),
      published_at: doc.first_publication_date.as_deref().and_then(parse_date),
      title: doc.data.title.unwrap_or_default(),
      subtitle: doc.data.subtitle.unwrap_or_default(),
      author: doc.data.author.unwrap_or_default(),
    }
  }
}

impl From<Document<DetailData>> for PostDetail {
  fn from(doc: Document<DetailData>) -> Self {
    let uid = doc.uid();
    let data = doc.data;
    let content = data
      .content
      .into_iter()
      .map(|section| ContentBlock {
        heading: section.heading.filter(|h| !h.trim().is_empty()),
        body_html: rich_text::as_html(&section.body),
      })
      .collect();

    Self {
      uid,
      published_at: doc.first_publication_date.as_deref().and_then(parse_date),
      last_edited_at: doc.last_publication_date.as_deref().and_then(parse_date),
      title: data.title.unwrap_or_default(),
      subtitle: data.subtitle.unwrap_or_default(),
      author: data.author.unwrap_or_default(),
      banner_url: data.banner.and_then(|b| b.url).unwrap_or_default(),
      content,
    }
  }
}

impl From<SearchResponse<SummaryData>> for Page<PostSummary> {
  fn from(resp: SearchResponse<SummaryData>) -> Self {
    Self {
      results: resp.results.into_iter().map(PostSummary::from).collect(),
      next_page: resp.next_page.map(|next| match Url::parse(&next) {
        Ok(mut url) => {
          strip_token(&mut url);
          Cursor::new(url)
        }
        Err(_) => Cursor::new(next),
      }),
    }
  }
}

impl PrismicSource {
  pub fn new(
    config: &ContentSourceConfig,
    client: Client,
  ) -> Result<Self, ConfigError> {
    let api_url = config.api_url.clone().ok_or_else(|| {
      ConfigError::Message(
        "content source API url not configured (set PRISMIC_URL_API)".into(),
      )
    })?;

    if api_url.cannot_be_a_base() {
      return Err(ConfigError::Message(format!(
        "content source API url is not a base url: {api_url}"
      )));
    }

    Ok(Self {
      client,
      api_url,
      access_token: config.access_token.clone(),
      document_type: config.document_type.clone(),
      master_ref: TimedLruCache::new(1, Duration::from_secs(5)),
    })
  }

  async fn master_ref(&self) -> Result<String> {
    if let Some(master_ref) = self.master_ref.get_cached(&self.api_url) {
      return Ok(master_ref);
    }

    let mut url = self.api_url.clone();
    self.authorize(&mut url);
    let info: ApiInfo = self.client.get_json(&url).await?;
    let master_ref = info
      .refs
      .into_iter()
      .find(|r| r.is_master)
      .map(|r| r.id)
      .ok_or_else(|| Error::NoMasterRef(self.api_url.clone()))?;

    debug!("master ref: {master_ref}");
    self.master_ref.insert(self.api_url.clone(), master_ref.clone());
    Ok(master_ref)
  }

  fn authorize(&self, url: &mut Url) {
    if let Some(token) = &self.access_token {
      url.query_pairs_mut().append_pair("access_token", token);
    }
  }

  async fn search_url(
    &self,
    predicate: &str,
    page_size: usize,
    fetch: &[String],
  ) -> Result<Url> {
    let master_ref = self.master_ref().await?;

    let mut url = self.api_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| Error::Message("API url cannot be a base".into()))?
      .pop_if_empty()
      .extend(["documents", "search"]);

    url
      .query_pairs_mut()
      .append_pair("ref", &master_ref)
      .append_pair("q", &format!("[[{predicate}]]"))
      .append_pair("pageSize", &page_size.to_string());
    if !fetch.is_empty() {
      url.query_pairs_mut().append_pair("fetch", &fetch.join(","));
    }
    self.authorize(&mut url);

    Ok(url)
  }

  fn summary_fields(&self) -> Vec<String> {
    SUMMARY_FIELDS
      .iter()
      .map(|field| format!("{}.{field}", self.document_type))
      .collect()
  }

  // Cursors come back from the browser, only follow the ones pointing at
  // the configured repository.
  fn cursor_url(&self, cursor: &Cursor) -> Result<Url> {
    let mut url = Url::parse(cursor.as_str())
      .map_err(|_| Error::ForeignCursor(cursor.to_string()))?;

    if url.origin() != self.api_url.origin() {
      return Err(Error::ForeignCursor(cursor.to_string()));
    }

    strip_token(&mut url);
    self.authorize(&mut url);
    Ok(url)
  }
}

#[async_trait::async_trait]
impl ContentSource for PrismicSource {
  async fn query(&self, page_size: usize) -> Result<Page<PostSummary>> {
    let predicate = format!("at(document.type, {})", quote(&self.document_type));
    let url = self
      .search_url(&predicate, page_size, &self.summary_fields())
      .await?;

    let resp: SearchResponse<SummaryData> = self.client.get_json(&url).await?;
    Ok(resp.into())
  }

  async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<PostSummary>> {
    let url = self.cursor_url(cursor)?;
    let resp: SearchResponse<SummaryData> = self.client.get_json(&url).await?;
    Ok(resp.into())
  }

  async fn get_by_uid(&self, uid: &str) -> Result<Option<PostDetail>> {
    let predicate =
      format!("at(my.{}.uid, {})", self.document_type, quote(uid));
    let url = self.search_url(&predicate, 1, &[]).await?;

    let resp: SearchResponse<DetailData> = self.client.get_json(&url).await?;
    Ok(resp.results.into_iter().next().map(PostDetail::from))
  }
}

// Cursors end up in rendered pages, so they never carry the access token.
// It is added back when the cursor is followed.
fn strip_token(url: &mut Url) {
  let pairs: Vec<(String, String)> = url
    .query_pairs()
    .filter(|(key, _)| key != "access_token")
    .map(|(key, value)| (key.into_owned(), value.into_owned()))
    .collect();

  if pairs.is_empty() {
    url.set_query(None);
  } else {
    url.query_pairs_mut().clear().extend_pairs(pairs);
  }
}

fn quote(value: &str) -> String {
  format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
