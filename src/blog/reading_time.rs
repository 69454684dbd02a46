use std::fmt;

use regex::Regex;

use crate::{content::ContentBlock, html::text_content};

/// Assumed reading speed.
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimated minutes needed to read a post. Never below one minute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadingTime(usize);

impl ReadingTime {
  pub fn from_words(words: usize) -> Self {
    Self(words.div_ceil(WORDS_PER_MINUTE).max(1))
  }

  pub fn of(blocks: &[ContentBlock]) -> Self {
    Self::from_words(count_words(blocks))
  }

  pub fn minutes(&self) -> usize {
    self.0
  }
}

impl fmt::Display for ReadingTime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} min", self.minutes())
  }
}

pub fn count_words(blocks: &[ContentBlock]) -> usize {
  blocks
    .iter()
    .map(|block| {
      heading_words(block.heading.as_deref()) + body_words(&block.body_html)
    })
    .sum()
}

fn heading_words(heading: Option<&str>) -> usize {
  heading.map_or(0, |h| h.split_whitespace().count())
}

// Body tokens only count when they hold a run of two or more word
// characters with at least one letter in it. Bare punctuation, numbers and
// single letters are dropped.
fn body_words(body_html: &str) -> usize {
  lazy_static::lazy_static! {
    static ref WORD: Regex = Regex::new(r#"[\p{L},'"\-.]{2,}"#).unwrap();
  }

  text_content(body_html)
    .split_whitespace()
    .filter(|token| {
      WORD
        .find_iter(token)
        .any(|run| run.as_str().chars().any(char::is_alphabetic))
    })
    .count()
}
