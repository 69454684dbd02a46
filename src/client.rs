use std::time::Duration;

use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

#[derive(Deserialize, Debug, Clone)]
pub struct ClientConfig {
  user_agent: Option<String>,
  #[serde(default = "default_timeout")]
  #[serde(deserialize_with = "duration_str::deserialize_duration")]
  timeout: Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      user_agent: None,
      timeout: default_timeout(),
    }
  }
}

impl ClientConfig {
  fn to_builder(&self) -> reqwest::ClientBuilder {
    let mut builder = reqwest::Client::builder();

    if let Some(user_agent) = &self.user_agent {
      builder = builder.user_agent(user_agent);
    } else {
      builder = builder.user_agent(crate::util::USER_AGENT);
    }

    builder.timeout(self.timeout)
  }

  pub fn build(&self) -> Result<Client> {
    let client = self.to_builder().build().map_err(Error::Reqwest)?;
    Ok(Client { client })
  }
}

/// HTTP client for JSON APIs. Cheap to clone.
#[derive(Clone)]
pub struct Client {
  client: reqwest::Client,
}

impl Client {
  pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
    // the query may carry the access token, log the path only
    debug!("GET {}", url.path());

    let resp = self
      .client
      .get(url.clone())
      .header("Accept", "application/json")
      .send()
      .await
      .map_err(|e| Error::Reqwest(e.without_url()))?;

    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
      return Err(Error::HttpStatus(status, url.clone()));
    }

    let body = resp
      .bytes()
      .await
      .map_err(|e| Error::Reqwest(e.without_url()))?;
    serde_json::from_slice(&body).map_err(|source| Error::Json {
      url: url.clone(),
      source,
    })
  }
}

fn default_timeout() -> Duration {
  Duration::from_secs(10)
}

#[cfg(test)]
mod tests {
  use serde_json::Value;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
  };

  use super::*;

  #[tokio::test]
  async fn test_get_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api"))
      .and(header("accept", "application/json"))
      .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"a":1}"#))
      .mount(&server)
      .await;

    let client = ClientConfig::default().build().unwrap();
    let url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let value: Value = client.get_json(&url).await.unwrap();
    assert_eq!(value["a"], 1);
  }

  #[tokio::test]
  async fn test_status_and_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(path("/missing"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;
    Mock::given(path("/garbage"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
      .mount(&server)
      .await;

    let client = ClientConfig::default().build().unwrap();

    let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
    let err = client.get_json::<Value>(&url).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus(s, _) if s.as_u16() == 404));

    let url = Url::parse(&format!("{}/garbage", server.uri())).unwrap();
    let err = client.get_json::<Value>(&url).await.unwrap_err();
    assert!(matches!(err, Error::Json { .. }));
  }
}
