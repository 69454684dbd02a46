use maud::{Markup, html};

use crate::{
  blog::{Listing, listing::DisplaySummary},
  content::Cursor,
};

pub fn render_listing_page(title: &str, listing: &Listing) -> Markup {
  let body = html! {
    main .container {
      div .posts {
        (render_more_fragment(listing))
      }
    }
  };

  super::layout(title, None, body)
}

/// The items of a listing page followed by the button loading the next
/// one. The button replaces itself with the next page's fragment.
pub fn render_more_fragment(listing: &Listing) -> Markup {
  html! {
    @for item in &listing.items {
      (post_item_fragment(item))
    }
    @if let Some(cursor) = &listing.cursor {
      div #load-more .load-more {
        (load_more_button(cursor, "Carregar mais posts"))
      }
    }
  }
}

pub fn render_retry_fragment(cursor: &Cursor) -> Markup {
  html! {
    div #load-more .load-more {
      p .error { "Não foi possível carregar mais posts." }
      (load_more_button(cursor, "Tentar novamente"))
    }
  }
}

fn load_more_button(cursor: &Cursor, label: &str) -> Markup {
  html! {
    button
      type="button"
      hx-get=(more_href(cursor))
      hx-target="#load-more"
      hx-swap="outerHTML"
      hx-disabled-elt="this"
      hx-sync="this:drop" {
      (label)
    }
  }
}

fn post_item_fragment(item: &DisplaySummary) -> Markup {
  let post = &item.summary;
  html! {
    article .post-item {
      a href=(super::post_href(&post.uid)) {
        strong { (post.title) }
        p { (post.subtitle) }
      }
      div .publ-info {
        @if let (Some(published), Some(raw)) = (&item.published, &post.published_at) {
          time datetime=(raw.to_rfc3339()) { (published) }
        }
        span .author { (post.author) }
      }
    }
  }
}

fn more_href(cursor: &Cursor) -> String {
  format!("/posts/more?cursor={}", urlencoding::encode(cursor.as_str()))
}
