/// Markov chain model: tokenization, training, sampling, and serialization.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkovError {
    #[error("model is empty: no corpus line was observed")]
    EmptyModel,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Special token marking end of line. The tokenizer splits `<` and `/` into
/// their own tokens, so no observed token can collide with it.
pub const LINE_END: &str = "</S>";

/// Hard upper bound on tokens appended by a single walk.
pub const STEP_CAP: usize = 300;

/// Successor token → observation count. Ordered so that models built from
/// any permutation of the same corpus are identical.
pub type Successors = BTreeMap<String, u32>;

/// Coarse script class used to cut whitespace-free text into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Han,
    Hiragana,
    Katakana,
    FullWidth,
    Alnum,
    Symbol,
}

impl Script {
    fn of(c: char) -> Script {
        match c {
            '・' => Script::Symbol,
            '々' | '〆' | '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}' => {
                Script::Han
            }
            '\u{3041}'..='\u{309F}' => Script::Hiragana,
            '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' | '\u{FF66}'..='\u{FF9F}' => {
                Script::Katakana
            }
            '\u{FF10}'..='\u{FF19}' | '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => {
                Script::FullWidth
            }
            c if c.is_alphanumeric() => Script::Alnum,
            _ => Script::Symbol,
        }
    }
}

/// Tokenize a line.
///
/// Whitespace-delimited words are cut further wherever the script class
/// changes, and every symbol character becomes its own token. The first token
/// of each word after the first carries one leading space, so concatenating
/// tokens restores the line with its whitespace normalized.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for (i, word) in text.split_whitespace().enumerate() {
        let mut current = String::new();
        let mut current_script: Option<Script> = None;
        if i > 0 {
            current.push(' ');
        }
        for c in word.chars() {
            let script = Script::of(c);
            let continues = current_script == Some(script) && script != Script::Symbol;
            if current_script.is_some() && !continues {
                tokens.push(std::mem::take(&mut current));
            }
            current.push(c);
            current_script = Some(script);
        }
        if current_script.is_some() {
            tokens.push(current);
        }
    }
    tokens
}

/// A first-order Markov model over tokens with raw frequency weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChainModel {
    /// First token of each observed line → count.
    pub starts: Successors,
    /// Transition table: token → successors (including [`LINE_END`]).
    pub transitions: FxHashMap<String, Successors>,
    /// Number of lines observed.
    #[serde(default)]
    pub lines: u64,
}

impl ChainModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one line. Blank lines are ignored.
    pub fn observe(&mut self, line: &str) {
        let tokens = tokenize(line.trim());
        let Some(first) = tokens.first() else {
            return;
        };

        *self.starts.entry(first.clone()).or_default() += 1;
        for pair in tokens.windows(2) {
            add_transition(&mut self.transitions, &pair[0], &pair[1]);
        }
        if let Some(last) = tokens.last() {
            add_transition(&mut self.transitions, last, LINE_END);
        }
        self.lines += 1;
    }

    /// Fold another model's counts into this one.
    ///
    /// Equivalent to having observed both corpora in a single model, which is
    /// how partial models trained on separate workers are combined.
    pub fn merge(&mut self, other: ChainModel) {
        for (token, count) in other.starts {
            *self.starts.entry(token).or_default() += count;
        }
        for (state, successors) in other.transitions {
            let table = self.transitions.entry(state).or_default();
            for (next, count) in successors {
                *table.entry(next).or_default() += count;
            }
        }
        self.lines += other.lines;
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn line_count(&self) -> u64 {
        self.lines
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    /// Number of distinct (state, successor) pairs.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(|s| s.len()).sum()
    }

    /// Draw a start token with probability proportional to how often it
    /// opened an observed line.
    pub fn sample_start<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, MarkovError> {
        pick_weighted(&self.starts, rng)
            .map(str::to_string)
            .ok_or(MarkovError::EmptyModel)
    }

    /// Walk the chain from `seed` until the end-of-line sentinel is drawn or
    /// [`STEP_CAP`] tokens were appended. Returns the trimmed text.
    ///
    /// The seed may be any word or phrase: the walk continues from its last
    /// token, and the seed's own text opens the result.
    pub fn generate<R: Rng + ?Sized>(&self, seed: &str, rng: &mut R) -> String {
        let mut result = String::from(seed.trim());
        let Some(mut state) = tokenize(seed).last().and_then(|t| self.resolve_state(t)) else {
            return result;
        };

        for _ in 0..STEP_CAP {
            let next = match self.transitions.get(state).and_then(|s| pick_weighted(s, rng)) {
                Some(tok) => tok,
                None => break,
            };
            if next == LINE_END {
                break;
            }
            result.push_str(next);
            state = next;
        }

        result.trim().to_string()
    }

    /// Find the table key for a token, with or without its leading space.
    fn resolve_state(&self, token: &str) -> Option<&str> {
        let bare = token.trim_start();
        [token.to_string(), format!(" {bare}"), bare.to_string()]
            .iter()
            .find_map(|key| self.transitions.get_key_value(key.as_str()))
            .map(|(key, _)| key.as_str())
    }
}

fn add_transition(table: &mut FxHashMap<String, Successors>, state: &str, next: &str) {
    *table
        .entry(state.to_string())
        .or_default()
        .entry(next.to_string())
        .or_default() += 1;
}

/// Pick a key with probability proportional to its count.
fn pick_weighted<'a, R: Rng + ?Sized>(options: &'a Successors, rng: &mut R) -> Option<&'a str> {
    if options.is_empty() {
        return None;
    }
    let dist = WeightedIndex::<u32>::new(options.values()).ok()?;
    options.keys().nth(dist.sample(rng)).map(String::as_str)
}

/// Save a ChainModel to a RON file: a struct of `starts`, `transitions`
/// (token → successor counts), and `lines`.
pub fn save_model(model: &ChainModel, path: &std::path::Path) -> Result<(), MarkovError> {
    let serialized = ron::ser::to_string_pretty(model, ron::ser::PrettyConfig::default())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    std::fs::write(path, serialized)?;
    Ok(())
}

/// Load a ChainModel from a RON file.
pub fn load_model(path: &std::path::Path) -> Result<ChainModel, MarkovError> {
    let contents = std::fs::read_to_string(path)?;
    let model: ChainModel = ron::from_str(&contents)?;
    Ok(model)
}
