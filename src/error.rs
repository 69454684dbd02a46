use http::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("YAML parse error")]
  Yaml(#[from] serde_yaml::Error),

  #[error("Invalid URL {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("{0}")]
  Message(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("IO error")]
  Io(#[from] std::io::Error),

  // constructed without the request url, see client::Client
  #[error("Reqwest client error {0}")]
  Reqwest(reqwest::Error),

  // url is reported without its query, which may carry the access token
  #[error("HTTP status error {0} (url: {})", redacted(.1))]
  HttpStatus(reqwest::StatusCode, url::Url),

  #[error("Malformed response from {}: {source}", redacted(.url))]
  Json {
    url: url::Url,
    #[source]
    source: serde_json::Error,
  },

  #[error("Invalid URL {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("Content repository at {} has no master ref", redacted(.0))]
  NoMasterRef(url::Url),

  #[error("Cursor does not point at the content source: {0}")]
  ForeignCursor(String),

  #[error("Config error {0:?}")]
  Config(#[from] ConfigError),

  #[error("{0}")]
  Message(String),
}

fn redacted(url: &url::Url) -> String {
  let mut url = url.clone();
  url.set_query(None);
  url.to_string()
}

pub fn into_http(e: &Error) -> (StatusCode, String) {
  let status = match e {
    Error::ForeignCursor(_) | Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
    Error::Reqwest(_)
    | Error::HttpStatus(..)
    | Error::Json { .. }
    | Error::NoMasterRef(_) => StatusCode::BAD_GATEWAY,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  };

  (status, e.to_string())
}
