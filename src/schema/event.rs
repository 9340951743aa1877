/// Note events and the corpus lines cut from them.
use serde::{Deserialize, Serialize};

/// One fetched text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Author key.
    pub pubkey: String,
    pub content: String,
}

/// A single raw line of a note, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusLine {
    pub author: String,
    pub text: String,
    pub seq: usize,
}

/// Canonical form of an author key: lowercase hex.
///
/// `npub1…` ids are bech32-decoded so they compare equal to the hex `pubkey`
/// carried by events. Anything else is only lowercased.
pub fn author_key(id: &str) -> String {
    let id = id.trim();
    if let Ok((hrp, data)) = bech32::decode(id) {
        if hrp.as_str() == "npub" && data.len() == 32 {
            return hex::encode(data);
        }
    }
    id.to_ascii_lowercase()
}

impl NoteEvent {
    /// Split the content on newlines. `first_seq` is the arrival index of the
    /// first line.
    pub fn lines(&self, first_seq: usize) -> impl Iterator<Item = CorpusLine> + '_ {
        self.content
            .split('\n')
            .enumerate()
            .map(move |(i, text)| CorpusLine {
                author: self.pubkey.clone(),
                text: text.to_string(),
                seq: first_seq + i,
            })
    }
}
