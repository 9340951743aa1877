/// End-to-end tests: corpus file → filter → model → generation loop.

use markovbot::core::classifier::{Category, HeuristicClassifier, StartClassifier};
use markovbot::core::corpus;
use markovbot::core::filter::LineFilter;
use markovbot::core::generator::{GenerateError, Generator};
use markovbot::core::markov::{self, tokenize, ChainModel};
use markovbot::schema::config::BotConfig;
use markovbot::schema::event::NoteEvent;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

const ACCEPTED: &[&str] = &[
    "今日はいい天気ですね",
    "お昼はラーメンにしよう",
    "今日は雨が降りそう",
    "明日はいい天気になるといいな",
    "お腹すいた",
    "コーヒー飲みたい",
    "はい",
];

fn fixture_config() -> BotConfig {
    BotConfig {
        ng_words: Some("宣伝".to_string()),
        ignores_file: PathBuf::from("tests/fixtures/ignores.txt"),
        ..Default::default()
    }
}

fn fixture_events() -> Vec<NoteEvent> {
    corpus::load_events(Path::new("tests/fixtures/notes.jsonl")).unwrap()
}

fn fixture_model() -> ChainModel {
    let filter = LineFilter::new(fixture_config().filter_config().unwrap()).unwrap();
    corpus::train_events(&filter, &fixture_events())
}

#[test]
fn fixture_corpus_trains_on_accepted_lines_only() {
    let model = fixture_model();

    let mut expected = ChainModel::new();
    for line in ACCEPTED {
        expected.observe(line);
    }
    assert_eq!(model, expected);
    assert_eq!(model.line_count(), ACCEPTED.len() as u64);
}

#[test]
fn sampled_starts_open_some_accepted_line() {
    let model = fixture_model();
    let firsts: Vec<String> = ACCEPTED.iter().map(|l| tokenize(l)[0].clone()).collect();
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..500 {
        let start = model.sample_start(&mut rng).unwrap();
        assert!(firsts.contains(&start), "unexpected start: {}", start);
    }
}

#[test]
fn event_order_does_not_change_model() {
    let filter = LineFilter::new(fixture_config().filter_config().unwrap()).unwrap();
    let mut events = fixture_events();
    let forward = corpus::train_events(&filter, &events);
    events.reverse();
    let backward = corpus::train_events(&filter, &events);
    assert_eq!(forward, backward);
}

#[test]
fn generated_notes_are_trimmed_and_bounded() {
    let model = fixture_model();
    for seed in 0..40 {
        let mut generator = Generator::builder()
            .with_model(model.clone())
            .max_length(Some(12))
            .seed(Some(seed))
            .build();
        let text = generator.generate(None).unwrap();
        assert!(!text.is_empty());
        assert_eq!(text, text.trim());
        assert!(text.chars().count() <= 12, "too long: {}", text);
        let opener = tokenize(&text)[0].clone();
        assert!(
            !HeuristicClassifier.classify(&opener).is_rejected_start(),
            "bad opener: {}",
            text
        );
    }
}

#[test]
fn explicit_word_opens_the_note() {
    let mut generator = Generator::builder()
        .with_model(fixture_model())
        .seed(Some(1))
        .build();
    let text = generator.generate(Some("コーヒー")).unwrap();
    assert_eq!(text, "コーヒー飲みたい");
}

#[test]
fn explicit_phrase_continues_from_its_last_token() {
    let mut generator = Generator::builder()
        .with_model(fixture_model())
        .seed(Some(1))
        .build();
    assert_eq!(generator.generate(Some("雨が")).unwrap(), "雨が降りそう");
    assert_eq!(generator.generate(Some("コーヒー飲")).unwrap(), "コーヒー飲みたい");
}

#[test]
fn explicit_word_mid_sentence_in_spaced_corpus() {
    let mut model = ChainModel::new();
    model.observe("the cat sat down");
    model.observe("a dog ran away");

    let mut generator = Generator::builder().with_model(model).seed(Some(6)).build();
    assert_eq!(generator.generate(Some("cat")).unwrap(), "cat sat down");
    assert_eq!(generator.generate(Some("the cat")).unwrap(), "the cat sat down");
    assert_eq!(generator.generate(Some("dog ran")).unwrap(), "dog ran away");
}

#[test]
fn too_long_explicit_phrase_falls_back_to_sampled_start() {
    let mut model = ChainModel::new();
    model.observe("the cat sat down on the warm mat");
    model.observe("hi");

    let mut generator = Generator::builder()
        .with_model(model)
        .max_length(Some(5))
        .seed(Some(6))
        .build();
    assert_eq!(generator.generate(Some("cat")).unwrap(), "hi");
}

#[test]
fn hex_author_ignored_by_npub_entry() {
    let filter = LineFilter::new(fixture_config().filter_config().unwrap()).unwrap();
    assert!(filter.is_ignored("3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d"));
    let model = fixture_model();
    assert!(!model.transitions.contains_key("定期投稿"));
    assert!(!model.starts.contains_key("定期投稿"));
}

#[test]
fn strict_classifier_exhausts_budget() {
    let mut generator = Generator::builder()
        .with_model(fixture_model())
        .classifier(|_: &str| Category::AuxiliarySymbol)
        .attempt_budget(25)
        .seed(Some(8))
        .build();
    assert!(matches!(
        generator.generate(None),
        Err(GenerateError::RetryExhausted(25))
    ));
}

#[test]
fn corpus_without_target_script_is_empty_model() {
    let filter = LineFilter::new(Default::default()).unwrap();
    let events = vec![NoteEvent {
        pubkey: "npub1x".to_string(),
        content: "hello\nworld".to_string(),
    }];
    let mut generator = Generator::builder()
        .with_model(corpus::train_events(&filter, &events))
        .build();
    assert!(matches!(
        generator.generate(None),
        Err(GenerateError::EmptyModel)
    ));
}

#[test]
fn saved_model_generates_like_fresh_one() {
    let model = fixture_model();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.ron");
    markov::save_model(&model, &path).unwrap();
    let loaded = markov::load_model(&path).unwrap();

    let mut fresh = Generator::builder().with_model(model).seed(Some(5)).build();
    let mut reloaded = Generator::builder().with_model(loaded).seed(Some(5)).build();
    assert_eq!(fresh.generate(None).unwrap(), reloaded.generate(None).unwrap());
}
