/// The generation loop: start selection → chain walk → acceptance check.
///
/// Every start-selection and every walk draws from a single attempt budget,
/// so a request always terminates.

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::classifier::{HeuristicClassifier, StartClassifier};
use crate::core::markov::{ChainModel, MarkovError};

/// Attempts allowed per request when none is configured.
pub const DEFAULT_ATTEMPT_BUDGET: u32 = 500;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("model is empty: no corpus line was observed")]
    EmptyModel,
    #[error("generation failed after {0} attempts")]
    RetryExhausted(u32),
    #[error(transparent)]
    Model(MarkovError),
}

impl From<MarkovError> for GenerateError {
    fn from(err: MarkovError) -> Self {
        match err {
            MarkovError::EmptyModel => GenerateError::EmptyModel,
            other => GenerateError::Model(other),
        }
    }
}

/// Where the loop currently is. Success and failure leave the loop directly.
#[derive(Debug)]
enum Phase {
    SelectingStart,
    Generating(String),
}

/// Produces accepted lines from a trained model.
pub struct Generator<C = HeuristicClassifier> {
    model: ChainModel,
    classifier: C,
    max_length: Option<usize>,
    attempt_budget: u32,
    rng: StdRng,
}

/// Builder for constructing a `Generator`.
pub struct GeneratorBuilder<C> {
    model: Option<ChainModel>,
    classifier: C,
    max_length: Option<usize>,
    attempt_budget: u32,
    seed: Option<u64>,
}

impl Generator<HeuristicClassifier> {
    pub fn builder() -> GeneratorBuilder<HeuristicClassifier> {
        GeneratorBuilder {
            model: None,
            classifier: HeuristicClassifier,
            max_length: None,
            attempt_budget: DEFAULT_ATTEMPT_BUDGET,
            seed: None,
        }
    }
}

impl<C: StartClassifier> Generator<C> {
    pub fn attempt_budget(&self) -> u32 {
        self.attempt_budget
    }

    /// Generate one accepted line.
    ///
    /// `explicit_seed` opens the first attempt without classification; if that
    /// attempt is rejected the loop falls back to classifier-gated starts
    /// sampled from the model.
    pub fn generate(&mut self, explicit_seed: Option<&str>) -> Result<String, GenerateError> {
        if self.model.is_empty() {
            return Err(GenerateError::EmptyModel);
        }

        let mut phase = match explicit_seed.map(str::trim) {
            Some(word) if !word.is_empty() => Phase::Generating(word.to_string()),
            _ => Phase::SelectingStart,
        };
        let mut attempts = 0u32;

        loop {
            if attempts >= self.attempt_budget {
                warn!(attempts, "attempt budget exhausted");
                return Err(GenerateError::RetryExhausted(self.attempt_budget));
            }
            attempts += 1;

            phase = match phase {
                Phase::SelectingStart => {
                    let start = self.model.sample_start(&mut self.rng)?;
                    let category = self.classifier.classify(&start);
                    if category.is_rejected_start() {
                        debug!(attempt = attempts, start = %start, ?category, "start rejected");
                        Phase::SelectingStart
                    } else {
                        Phase::Generating(start)
                    }
                }
                Phase::Generating(seed) => {
                    let text = self.model.generate(&seed, &mut self.rng);
                    if self.accepts(&text) {
                        info!(attempts, chars = text.chars().count(), "generated");
                        return Ok(text);
                    }
                    debug!(attempt = attempts, seed = %seed, text = %text, "output rejected");
                    Phase::SelectingStart
                }
            };
        }
    }

    fn accepts(&self, text: &str) -> bool {
        !text.is_empty()
            && self
                .max_length
                .map_or(true, |max| text.chars().count() <= max)
    }
}

impl<C: StartClassifier> GeneratorBuilder<C> {
    pub fn with_model(mut self, model: ChainModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Swap in another start classifier, e.g. a morphological analyzer.
    pub fn classifier<D: StartClassifier>(self, classifier: D) -> GeneratorBuilder<D> {
        GeneratorBuilder {
            model: self.model,
            classifier,
            max_length: self.max_length,
            attempt_budget: self.attempt_budget,
            seed: self.seed,
        }
    }

    /// Maximum output length in characters.
    pub fn max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn attempt_budget(mut self, budget: u32) -> Self {
        self.attempt_budget = budget;
        self
    }

    /// Fix the RNG seed for reproducible output.
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Generator<C> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Generator {
            model: self.model.unwrap_or_default(),
            classifier: self.classifier,
            max_length: self.max_length,
            attempt_budget: self.attempt_budget,
            rng,
        }
    }
}
