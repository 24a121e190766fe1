//! Sampling policy for the next title to present
//!
//! Draws from an injected random source so a seeded sampler replays the
//! same session order.

use crate::types::ResultsDocument;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Picks untested titles and builds retest queues
#[derive(Debug)]
pub struct Sampler<R = StdRng> {
    rng: R,
}

impl Sampler<StdRng> {
    /// Sampler seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sampler
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Uniformly pick a title from `all_titles` that has no verdict for
    /// `version`. `None` means every title is covered.
    ///
    /// Duplicate dataset lines are separate candidates, so a repeated title
    /// is proportionally more likely to be drawn.
    pub fn pick_untested<'a>(
        &mut self,
        all_titles: &'a [String],
        document: &ResultsDocument,
        version: &str,
    ) -> Option<&'a str> {
        let candidates: Vec<&'a String> = all_titles
            .iter()
            .filter(|title| !document.has_verdict(title, version))
            .collect();

        candidates
            .choose(&mut self.rng)
            .copied()
            .map(String::as_str)
    }

    /// All previously tested titles in a single random permutation.
    ///
    /// The queue is consumed front to back and never reshuffled.
    pub fn build_retest_queue(&mut self, document: &ResultsDocument) -> VecDeque<String> {
        let mut titles: Vec<String> = document.titles.keys().cloned().collect();
        titles.shuffle(&mut self.rng);
        titles.into()
    }
}
