use maud::{Markup, PreEscaped, html};

use crate::{blog::PostPage, content::PostSummary};

pub fn render_post_page(title: &str, page: &PostPage) -> Markup {
  let post = &page.post;
  let body = html! {
    @if !post.banner_url.is_empty() {
      div .banner {
        img src=(post.banner_url) alt="banner";
      }
    }
    main .container {
      article .post {
        h1 { (post.title) }
        div .publ-info {
          @if let Some(published) = &page.published {
            time { (published) }
          }
          span .author { (post.author) }
          span .reading-time { (page.reading_time) }
        }
        @if let Some(last_edited) = &page.last_edited {
          p .edited { "* editado em " (last_edited) }
        }
        div .post-content {
          @for block in &post.content {
            section {
              @if let Some(heading) = &block.heading {
                h2 { (heading) }
              }
              (PreEscaped(&block.body_html))
            }
          }
        }
      }
      (navigation_fragment(&page.siblings.before, &page.siblings.next))
    }
  };

  super::layout(title, Some(&post.title), body)
}

/// Shown for posts the content source doesn't know (yet).
pub fn render_placeholder_page(title: &str) -> Markup {
  let body = html! {
    main .container {
      p .loading { "Carregando..." }
    }
  };

  super::layout(title, None, body)
}

fn navigation_fragment(
  before: &Option<PostSummary>,
  next: &Option<PostSummary>,
) -> Markup {
  html! {
    @if before.is_some() || next.is_some() {
      nav .post-navigation {
        @if let Some(post) = before {
          a .before href=(super::post_href(&post.uid)) {
            div { (post.title) }
            strong { "Post anterior" }
          }
        }
        @if let Some(post) = next {
          a .next href=(super::post_href(&post.uid)) {
            div { (post.title) }
            strong { "Próximo post" }
          }
        }
      }
    }
  }
}
