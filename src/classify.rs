use crate::error::{PathwayError, Result};
use crate::types::FrequencyTable;
use log::info;

/// Fraction of isolates a pathway must cover to count as core, in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Score(f64);

impl Score {
    /// # Errors
    /// * `PathwayError::InvalidParameter` if `score` is outside `[0, 1]` or NaN
    pub fn new(score: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&score) {
            Ok(Score(score))
        } else {
            Err(PathwayError::invalid_parameter(
                "score",
                score,
                "score must satisfy 0 <= score <= 1",
            ))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Score(1.0)
    }
}

/// Summed-frequency threshold separating core from accessory pathways
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Cutoff(f64);

impl Cutoff {
    /// `isolate_count * score`
    pub fn new(isolate_count: usize, score: Score) -> Self {
        Cutoff(isolate_count as f64 * score.value())
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_core(self, frequency_sum: f64) -> bool {
        frequency_sum >= self.0
    }
}

/// Pathway names split by the cutoff, each list in table order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub core: Vec<String>,
    pub accessory: Vec<String>,
}

/// Splits pathways into core (row sum >= cutoff) and accessory (row sum < cutoff)
pub fn classify(table: &FrequencyTable, cutoff: Cutoff) -> Classification {
    let mut classification = Classification::default();
    for (pathway, sum) in table.pathways().iter().zip(table.row_sums().iter()) {
        if cutoff.is_core(*sum) {
            classification.core.push(pathway.clone());
        } else {
            classification.accessory.push(pathway.clone());
        }
    }

    info!(
        "Cutoff {:.3}: {} core and {} accessory pathways",
        cutoff.value(),
        classification.core.len(),
        classification.accessory.len()
    );
    classification
}
