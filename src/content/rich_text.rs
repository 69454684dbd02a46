//! Prismic structured text to HTML.
//!
//! Structured text is a list of blocks (paragraphs, headings, list items,
//! images, embeds). Inline formatting is described by spans: ranges of
//! UTF-16 code units over the block's text. Text is escaped, embed HTML is trusted
//! and passed through.

use std::fmt::Write as _;

use itertools::Itertools as _;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct RichTextBlock {
  #[serde(rename = "type")]
  kind: String,
  #[serde(default)]
  text: String,
  #[serde(default)]
  spans: Vec<Span>,
  url: Option<String>,
  alt: Option<String>,
  oembed: Option<Oembed>,
}

#[derive(Deserialize, Clone, Debug)]
struct Span {
  start: usize,
  end: usize,
  #[serde(rename = "type")]
  kind: String,
  data: Option<SpanData>,
}

#[derive(Deserialize, Clone, Debug)]
struct SpanData {
  url: Option<String>,
  target: Option<String>,
  label: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
struct Oembed {
  html: Option<String>,
}

pub fn as_html(blocks: &[RichTextBlock]) -> String {
  let mut out = String::new();

  let groups = blocks.iter().group_by(|block| list_tag(&block.kind));
  for (list, group) in &groups {
    match list {
      Some(tag) => {
        let _ = write!(out, "<{tag}>");
        for block in group {
          out.push_str("<li>");
          out.push_str(&inline_html(&block.text, &block.spans));
          out.push_str("</li>");
        }
        let _ = write!(out, "</{tag}>");
      }
      None => {
        for block in group {
          block_html(block, &mut out);
        }
      }
    }
  }

  out
}

fn list_tag(kind: &str) -> Option<&'static str> {
  match kind {
    "list-item" => Some("ul"),
    "o-list-item" => Some("ol"),
    _ => None,
  }
}

fn block_html(block: &RichTextBlock, out: &mut String) {
  let inline = || inline_html(&block.text, &block.spans);

  match block.kind.as_str() {
    kind @ ("heading1" | "heading2" | "heading3" | "heading4" | "heading5"
    | "heading6") => {
      let level = &kind["heading".len()..];
      let _ = write!(out, "<h{level}>{}</h{level}>", inline());
    }
    "preformatted" => {
      let _ = write!(out, "<pre>{}</pre>", inline());
    }
    "image" => {
      let src = block.url.as_deref().unwrap_or_default();
      let alt = block.alt.as_deref().unwrap_or_default();
      let _ = write!(
        out,
        r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
        htmlescape::encode_minimal(src),
        htmlescape::encode_minimal(alt)
      );
    }
    "embed" => {
      let html = block
        .oembed
        .as_ref()
        .and_then(|o| o.html.as_deref())
        .unwrap_or_default();
      let _ = write!(out, "<div data-oembed>{html}</div>");
    }
    _ => {
      let _ = write!(out, "<p>{}</p>", inline());
    }
  }
}

// Span offsets count UTF-16 code units, like the editor that wrote them.
fn inline_html(text: &str, spans: &[Span]) -> String {
  let len = text.encode_utf16().count();

  let mut spans: Vec<&Span> = spans
    .iter()
    .filter(|span| span.start < span.end && span.end <= len)
    .collect();
  // outer spans first when two start together
  spans.sort_by_key(|span| (span.start, std::cmp::Reverse(span.end)));

  let mut out = String::new();
  let mut pending = String::new();
  let mut open: Vec<&Span> = Vec::new();
  let mut next = 0;
  let mut at = 0;

  for c in text.chars() {
    let opens_here = next < spans.len() && spans[next].start <= at;
    let closes_here = open.iter().any(|span| span.end <= at);
    if opens_here || closes_here {
      flush_text(&mut pending, &mut out);
      close_spans(&mut open, at, &mut out);
    }

    while next < spans.len() && spans[next].start <= at {
      out.push_str(&open_tag(spans[next]));
      open.push(spans[next]);
      next += 1;
    }

    pending.push(c);
    at += c.len_utf16();
  }

  flush_text(&mut pending, &mut out);
  close_spans(&mut open, len, &mut out);
  out
}

fn flush_text(pending: &mut String, out: &mut String) {
  if pending.is_empty() {
    return;
  }
  let escaped = htmlescape::encode_minimal(pending);
  out.push_str(&escaped.replace('\n', "<br />"));
  pending.clear();
}

// Close every open span ending at or before `at`. Spans opened after one
// that ends are closed with it and reopened, keeping the markup nested.
fn close_spans<'a>(open: &mut Vec<&'a Span>, at: usize, out: &mut String) {
  while let Some(pos) = open.iter().rposition(|span| span.end <= at) {
    let inner: Vec<&Span> = open.drain(pos + 1..).collect();
    for span in inner.iter().rev() {
      out.push_str(close_tag(span));
    }

    if let Some(span) = open.pop() {
      out.push_str(close_tag(span));
    }

    for span in inner {
      out.push_str(&open_tag(span));
      open.push(span);
    }
  }
}

fn open_tag(span: &Span) -> String {
  let data = span.data.as_ref();
  match span.kind.as_str() {
    "strong" => "<strong>".into(),
    "em" => "<em>".into(),
    "hyperlink" => {
      let url = data.and_then(|d| d.url.as_deref()).unwrap_or_default();
      let mut tag = format!(r#"<a href="{}""#, htmlescape::encode_minimal(url));
      if let Some(target) = data.and_then(|d| d.target.as_deref()) {
        let _ = write!(
          tag,
          r#" target="{}" rel="noopener noreferrer""#,
          htmlescape::encode_minimal(target)
        );
      }
      tag.push('>');
      tag
    }
    "label" => {
      let label = data.and_then(|d| d.label.as_deref()).unwrap_or_default();
      format!(r#"<span class="{}">"#, htmlescape::encode_minimal(label))
    }
    _ => "<span>".into(),
  }
}

fn close_tag(span: &Span) -> &'static str {
  match span.kind.as_str() {
    "strong" => "</strong>",
    "em" => "</em>",
    "hyperlink" => "</a>",
    _ => "</span>",
  }
}
