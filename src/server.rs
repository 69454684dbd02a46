mod pages;
pub(crate) mod web;

use axum::{Router, routing::get};
use clap::Parser;
use http::StatusCode;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::{info, warn};

use pages::PageService;

use crate::{blog::Blog, config::SiteConfig, error::Result};

#[derive(Parser)]
pub struct ServerConfig {
  #[clap(long, short, default_value = "127.0.0.1:3000")]
  bind: String,
  /// Render the listing and its posts before accepting requests
  #[clap(
    long,
    action = clap::ArgAction::Set,
    num_args = 0..=1,
    require_equals = true,
    default_value = "true",
    default_missing_value = "true"
  )]
  prerender: bool,
}

pub async fn serve(server_config: ServerConfig, site: SiteConfig) -> Result<()> {
  let blog = Blog::from_config(&site)?;
  let service = PageService::new(blog, site.revalidate, site.page_cache_size);

  if server_config.prerender {
    info!("prerendering pages");
    if let Err(e) = service.prerender().await {
      warn!("prerender failed, pages will render on first request: {e}");
    }
  }

  info!("listening on {}", server_config.bind);
  let listener = tokio::net::TcpListener::bind(&server_config.bind).await?;

  info!("starting server");
  Ok(axum::serve(listener, app(service)).await?)
}

fn app(service: PageService) -> Router {
  web::router(service)
    .route("/health", get(|| async { "ok" }))
    .fallback(get(|| async { (StatusCode::NOT_FOUND, "Page not found") }))
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new().gzip(true)),
    )
}
