/// Start classifier: lexical categories used to veto sentence openers.

use serde::{Deserialize, Serialize};

/// Coarse lexical category of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Grammatical particle (e.g. は, が, を).
    Particle,
    /// Punctuation, brackets, and other auxiliary symbols.
    AuxiliarySymbol,
    Other,
}

impl Category {
    /// Whether a word of this category must never open generated text.
    pub fn is_rejected_start(self) -> bool {
        matches!(self, Category::Particle | Category::AuxiliarySymbol)
    }
}

/// Anything that can tell the generator what kind of word a candidate start is.
///
/// Implemented by morphological analyzers; any `Fn(&str) -> Category` works too.
pub trait StartClassifier {
    fn classify(&self, word: &str) -> Category;
}

impl<F> StartClassifier for F
where
    F: Fn(&str) -> Category,
{
    fn classify(&self, word: &str) -> Category {
        self(word)
    }
}

/// Common Japanese particles, longest first.
const PARTICLES: &[&str] = &[
    "けれども", "ながら", "ばかり", "くらい", "ぐらい", "かしら", "だけ", "しか", "まで",
    "から", "より", "など", "ので", "のに", "けど", "って", "は", "が", "を", "に", "へ",
    "と", "で", "も", "の", "や", "か", "ね", "よ", "な", "ぞ", "ぜ", "わ", "さ",
];

/// Dictionary-free classifier for when no morphological analyzer is wired in.
///
/// A word made only of punctuation or symbols is an auxiliary symbol; a word
/// that is exactly a common particle is a particle.
///
/// Only whole words are matched. The tokenizer keeps a hiragana run together,
/// so a particle fused with the kana after it (`はいい`) passes as `Other`;
/// prefix matching would also reject real words such as `ねこ`. Plug in a
/// morphological analyzer when that matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl StartClassifier for HeuristicClassifier {
    fn classify(&self, word: &str) -> Category {
        let word = word.trim();
        if word.is_empty() || word.chars().all(|c| !c.is_alphanumeric()) {
            return Category::AuxiliarySymbol;
        }
        if PARTICLES.contains(&word) {
            return Category::Particle;
        }
        Category::Other
    }
}
