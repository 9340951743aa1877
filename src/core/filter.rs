/// Line filter: decides which corpus lines are eligible for training.

use regex::Regex;
use rustc_hash::FxHashSet;
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::schema::event::author_key;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid exclusion pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Characters of the target script: full-width digits and Latin letters,
/// hiragana, katakana, and CJK ideographs.
const TARGET_SCRIPT: &[RangeInclusive<char>] = &[
    '０'..='９',
    'Ａ'..='Ｚ',
    'ａ'..='ｚ',
    'ぁ'..='ゖ',
    'ァ'..='ヾ',
    '一'..='鶴',
];

/// Suffixes of media links that disqualify a line.
const MEDIA_SUFFIXES: &[&str] = &[".png", ".jpeg", ".jpg", ".gif", ".bmp"];

/// Matches a URL up to (not including) its query string.
const URL_PATTERN: &str = r"\bhttps?://[^?\s]+";

/// Filter settings supplied by the outer configuration layer.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Regular expression of blocked content. `None` blocks nothing.
    pub ng_words: Option<String>,
    /// Authors whose lines are never used, as `npub1…` ids or hex keys.
    pub ignored_authors: FxHashSet<String>,
}

/// Compiled, immutable line filter.
#[derive(Debug, Clone)]
pub struct LineFilter {
    ng_words: Option<Regex>,
    url: Regex,
    ignored_authors: FxHashSet<String>,
}

impl LineFilter {
    pub fn new(config: FilterConfig) -> Result<Self, FilterError> {
        let ng_words = match config.ng_words.as_deref() {
            Some(pattern) if !pattern.is_empty() => Some(Regex::new(pattern)?),
            _ => None,
        };
        Ok(Self {
            ng_words,
            url: Regex::new(URL_PATTERN)?,
            ignored_authors: config
                .ignored_authors
                .iter()
                .map(|id| author_key(id))
                .collect(),
        })
    }

    /// Whether `author` is on the ignore list, in either key encoding.
    pub fn is_ignored(&self, author: &str) -> bool {
        self.ignored_authors.contains(&author_key(author))
    }

    /// Decide whether `line` may be used for training.
    pub fn accept(&self, line: &str, author_is_ignored: bool) -> bool {
        if author_is_ignored {
            return false;
        }
        if !has_target_script(line) {
            return false;
        }
        if self.ng_words.as_ref().is_some_and(|re| re.is_match(line)) {
            return false;
        }
        !self.has_media_link(line)
    }

    fn has_media_link(&self, line: &str) -> bool {
        self.url.find_iter(line).any(|m| {
            MEDIA_SUFFIXES
                .iter()
                .any(|suffix| m.as_str().ends_with(suffix))
        })
    }
}

fn has_target_script(line: &str) -> bool {
    line.chars()
        .any(|c| TARGET_SCRIPT.iter().any(|range| range.contains(&c)))
}
