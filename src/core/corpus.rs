/// Corpus loading and model training.
///
/// Reads note events from JSON Lines, cuts them into lines, runs every line
/// through the [`LineFilter`], and feeds the survivors to a [`ChainModel`].

use std::io::BufRead;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::filter::LineFilter;
use crate::core::markov::ChainModel;
use crate::schema::event::{CorpusLine, NoteEvent};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed event on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse events from JSON Lines text. Blank lines are skipped.
pub fn parse_events<R: BufRead>(reader: R) -> Result<Vec<NoteEvent>, CorpusError> {
    let mut events = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line).map_err(|source| CorpusError::Json {
            line: i + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Load events from a JSON Lines file.
pub fn load_events(path: &Path) -> Result<Vec<NoteEvent>, CorpusError> {
    let file = std::fs::File::open(path)?;
    parse_events(std::io::BufReader::new(file))
}

/// Flatten events into corpus lines, numbered in arrival order.
pub fn corpus_lines(events: &[NoteEvent]) -> Vec<CorpusLine> {
    let mut lines = Vec::new();
    for event in events {
        let first_seq = lines.len();
        lines.extend(event.lines(first_seq));
    }
    lines
}

/// Train a model from corpus lines, keeping only the lines the filter accepts.
pub fn train<I>(filter: &LineFilter, lines: I) -> ChainModel
where
    I: IntoIterator<Item = CorpusLine>,
{
    let mut model = ChainModel::new();
    let mut rejected = 0usize;

    for line in lines {
        let ignored = filter.is_ignored(&line.author);
        if !filter.accept(&line.text, ignored) {
            rejected += 1;
            continue;
        }
        let text = line.text.trim();
        debug!(author = %line.author, seq = line.seq, text, "accepted");
        model.observe(text);
    }

    info!(
        lines = model.line_count(),
        rejected,
        states = model.state_count(),
        transitions = model.transition_count(),
        "model trained"
    );
    model
}

/// Train a model straight from events.
pub fn train_events(filter: &LineFilter, events: &[NoteEvent]) -> ChainModel {
    train(filter, corpus_lines(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::FilterConfig;

    fn event(pubkey: &str, content: &str) -> NoteEvent {
        NoteEvent {
            pubkey: pubkey.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn parse_events_skips_blank_lines() {
        let input = "{\"pubkey\":\"a\",\"content\":\"おはよう\"}\n\n{\"pubkey\":\"b\",\"content\":\"眠い\"}\n";
        let events = parse_events(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].pubkey, "b");
    }

    #[test]
    fn parse_events_reports_line_number() {
        let input = "{\"pubkey\":\"a\",\"content\":\"おはよう\"}\nnot json\n";
        match parse_events(input.as_bytes()) {
            Err(CorpusError::Json { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected JSON error, got {:?}", other),
        }
    }

    #[test]
    fn corpus_lines_numbers_in_arrival_order() {
        let events = vec![event("a", "一\n二"), event("b", "三")];
        let lines = corpus_lines(&events);
        let seqs: Vec<usize> = lines.iter().map(|l| l.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(lines[2].author, "b");
    }

    #[test]
    fn train_applies_filter() {
        let filter = LineFilter::new(FilterConfig {
            ng_words: Some("宣伝".to_string()),
            ignored_authors: ["bot".to_string()].into_iter().collect(),
        })
        .unwrap();
        let events = vec![
            event("alice", "  おはよう  \nhello world"),
            event("alice", "宣伝です"),
            event("bot", "ボットの投稿"),
            event("carol", "写真 https://example.com/a.png"),
        ];

        let model = train_events(&filter, &events);
        assert_eq!(model.line_count(), 1);
        assert_eq!(model.starts.keys().collect::<Vec<_>>(), vec!["おはよう"]);
    }

    #[test]
    fn train_with_nothing_accepted_is_empty() {
        let filter = LineFilter::new(FilterConfig::default()).unwrap();
        let model = train_events(&filter, &[event("a", "english only")]);
        assert!(model.is_empty());
    }
}
