use std::ops::Range;

use rayon::prelude::*;

use crate::candidate::{CandidateGenerator, Thresholds};
use crate::config::MatchConfig;
use crate::error::LinkageError;
use crate::model::{ExternalRecord, MatchCandidate, MatchVerdict, RegistryRecord};
use crate::resolve::resolve;

/// Matches external records against one registry snapshot.
///
/// `Matcher` holds only read-only data, so a single instance can be shared
/// across threads; every call is independent of every other.
#[derive(Debug)]
pub struct Matcher<'r> {
    generator: CandidateGenerator<'r>,
}

impl<'r> Matcher<'r> {
    pub fn new(config: &MatchConfig, registry: &'r [RegistryRecord]) -> Result<Self, LinkageError> {
        let generator = CandidateGenerator::new(config, registry)?;
        log::debug!(
            "matcher ready: {} registry records, thresholds {:?}",
            generator.registry_len(),
            generator.thresholds()
        );
        Ok(Self { generator })
    }

    pub fn thresholds(&self) -> Thresholds {
        self.generator.thresholds()
    }

    /// Candidates for one record, in registry order, before ranking.
    pub fn candidates(&self, external: &ExternalRecord) -> Vec<MatchCandidate<'r>> {
        self.generator.generate(external)
    }

    pub fn match_record(&self, external: &ExternalRecord) -> MatchVerdict {
        resolve(self.generator.generate(external))
    }

    /// Verdicts for all records, in input order. Records are scored in parallel.
    pub fn match_all(&self, externals: &[ExternalRecord]) -> Vec<MatchVerdict> {
        externals
            .par_iter()
            .map(|external| self.match_record(external))
            .collect()
    }

    /// Score `externals[start..]` in batches of `batch_size`, handing each batch
    /// to `on_batch` before starting the next.
    ///
    /// `on_batch` receives the index range of the batch and its verdicts; its
    /// error stops the run. Returns the index after the last scored record.
    pub fn match_batches<E, F>(
        &self,
        externals: &[ExternalRecord],
        start: usize,
        batch_size: usize,
        mut on_batch: F,
    ) -> Result<usize, E>
    where
        F: FnMut(Range<usize>, Vec<MatchVerdict>) -> Result<(), E>,
    {
        let batch_size = batch_size.max(1);
        let mut next = start.min(externals.len());

        while next < externals.len() {
            let end = (next + batch_size).min(externals.len());
            let verdicts = self.match_all(&externals[next..end]);
            on_batch(next..end, verdicts)?;
            next = end;
        }

        Ok(next)
    }
}
