use serde::Serialize;

use crate::config::MatchConfig;
use crate::model::{BestMatch, MatchVerdict};

/// Verdict counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerdictCounts {
    pub total: usize,
    pub unique: usize,
    pub ambiguous: usize,
    pub unmatched: usize,
    pub partial: usize,
    /// Ambiguous verdicts whose candidates all share one birth date.
    pub ambiguous_same_birth_date: usize,
}

impl VerdictCounts {
    pub fn add(&mut self, verdict: &MatchVerdict) {
        self.total += 1;
        match verdict.best {
            BestMatch::Unique(_) => self.unique += 1,
            BestMatch::Ambiguous => {
                self.ambiguous += 1;
                if verdict.same_birth_date {
                    self.ambiguous_same_birth_date += 1;
                }
            }
            BestMatch::None => self.unmatched += 1,
        }
        if verdict.partial {
            self.partial += 1;
        }
    }

    pub fn matched(&self) -> usize {
        self.unique + self.ambiguous
    }
}

/// Compute verdict counts over a slice of verdicts.
pub fn count_verdicts(verdicts: &[MatchVerdict]) -> VerdictCounts {
    let mut counts = VerdictCounts::default();
    for v in verdicts {
        counts.add(v);
    }
    counts
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    pub registry_records: usize,
    pub external_records: usize,
    /// Index of the first record scored in this run (non-zero after a resume).
    pub resumed_at: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub meta: RunMeta,
    pub config: MatchConfig,
    pub counts: VerdictCounts,
}

impl RunSummary {
    pub fn new(
        config: &MatchConfig,
        registry_records: usize,
        external_records: usize,
        resumed_at: usize,
        counts: VerdictCounts,
    ) -> Self {
        Self {
            meta: RunMeta {
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                registry_records,
                external_records,
                resumed_at,
            },
            config: config.clone(),
            counts,
        }
    }
}
