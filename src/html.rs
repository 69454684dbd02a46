use scraper::{Html, Node};

// elements whose boundaries separate words even without whitespace
const BLOCK_ELEMENTS: &[&str] = &[
  "address", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
  "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "ol", "p", "pre",
  "section", "table", "td", "th", "tr", "ul",
];

/// The readable text of an HTML fragment. Block level elements are
/// separated by a space so that `<p>a</p><p>b</p>` reads as two words.
pub fn text_content(html: &str) -> String {
  let fragment = Html::parse_fragment(html);
  let mut text = String::new();

  for node in fragment.tree.root().descendants() {
    match node.value() {
      Node::Text(t) => text.push_str(t),
      Node::Element(e) if BLOCK_ELEMENTS.contains(&e.name()) => {
        text.push(' ');
      }
      _ => {}
    }
  }

  text
}
