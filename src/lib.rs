//! markovbot: Markov-chain short note generator.
//!
//! Trains a first-order chain on sampled timeline lines and draws new lines
//! from it, retrying within a fixed attempt budget until one passes the
//! length and opening-word checks.

pub mod core;
pub mod schema;
