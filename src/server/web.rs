pub mod listing;
pub mod post;

use axum::{
  Extension, Router,
  extract::{Path, Query},
  response::{IntoResponse, Response},
  routing,
};
use http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Deserialize;
use tracing::warn;

use crate::{
  content::Cursor,
  error::{Error, into_http},
};

use super::pages::{PageKey, PageService};

pub fn router(service: PageService) -> Router {
  Router::new()
    .route("/", routing::get(handle_home))
    .route("/post/:slug", routing::get(handle_post))
    .route("/posts/more", routing::get(handle_more))
    .layer(Extension(service))
}

async fn handle_home(Extension(service): Extension<PageService>) -> Response {
  match service.page(PageKey::Listing).await {
    Ok(Some(page)) => page.into_response(),
    Ok(None) => placeholder_response(service.title()),
    Err(e) => into_http(&e).into_response(),
  }
}

async fn handle_post(
  Path(slug): Path<String>,
  Extension(service): Extension<PageService>,
) -> Response {
  match service.page(PageKey::Post(slug)).await {
    Ok(Some(page)) => page.into_response(),
    Ok(None) => placeholder_response(service.title()),
    Err(e) => into_http(&e).into_response(),
  }
}

#[derive(Deserialize)]
struct MoreParams {
  cursor: Cursor,
}

// Answers the "load more" button. Upstream failures still answer with a
// fragment, a retry button, since the page only swaps in successful
// responses. A cursor the source refuses can't succeed on retry.
async fn handle_more(
  Query(params): Query<MoreParams>,
  Extension(service): Extension<PageService>,
) -> Response {
  match service.load_more(&params.cursor).await {
    Ok(listing) => listing::render_more_fragment(&listing).into_response(),
    Err(e @ (Error::ForeignCursor(_) | Error::InvalidUrl(_))) => {
      warn!("rejected load more request: {e}");
      into_http(&e).into_response()
    }
    Err(e) => {
      warn!("failed to load more posts: {e}");
      listing::render_retry_fragment(&params.cursor).into_response()
    }
  }
}

fn placeholder_response(title: &str) -> Response {
  (StatusCode::NOT_FOUND, post::render_placeholder_page(title)).into_response()
}

fn layout(site_title: &str, page_title: Option<&str>, body: Markup) -> Markup {
  html! {
    (DOCTYPE)
    html lang="pt-BR" {
      head {
        meta charset="utf-8";
        meta name="viewport" content="width=device-width, initial-scale=1";
        title {
          @if let Some(page_title) = page_title {
            (page_title) " | "
          }
          (site_title)
        }
        (header_libs_fragment())
      }
      body {
        header .site-header {
          a href="/" { (site_title) "." }
        }
        (body)
      }
    }
  }
}

fn header_libs_fragment() -> Markup {
  html! {
    script
      src="https://unpkg.com/htmx.org@2.0.1"
      referrerpolicy="no-referrer" {}
    style { (PreEscaped(styles())) }
  }
}

fn styles() -> &'static str {
  r#"
  body {
    margin: 0;
    background: #1a1d23;
    color: #d7d7d7;
    font-family: Inter, sans-serif;
  }

  a { color: inherit; text-decoration: none; }

  .site-header, .container {
    max-width: 720px;
    margin: 0 auto;
    padding: 2rem 1rem;
  }

  .post-item { margin-bottom: 3rem; }
  .post-item strong { display: block; font-size: 1.75rem; color: #fff; }
  .post-item p { margin: 0.5rem 0 1.5rem; }

  .publ-info { display: flex; gap: 1.5rem; font-size: 0.875rem; }
  .edited { font-style: italic; font-size: 0.875rem; }

  .load-more button {
    background: none;
    border: 0;
    color: #ff57b2;
    font-size: 1.125rem;
    cursor: pointer;
  }
  .load-more button[disabled] { opacity: 0.5; cursor: wait; }

  .banner img { width: 100%; max-height: 400px; object-fit: cover; }

  .post-content h2 { color: #fff; margin-top: 4rem; }
  .post-content { line-height: 1.6; }

  .post-navigation {
    display: flex;
    justify-content: space-between;
    border-top: 1px solid #383e49;
    margin-top: 4rem;
    padding-top: 2rem;
  }
  .post-navigation .next { margin-left: auto; text-align: right; }
"#
}

fn post_href(uid: &str) -> String {
  format!("/post/{}", urlencoding::encode(uid))
}
