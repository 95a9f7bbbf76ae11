// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::SampleOutcome;
use crate::SynthesisError;

/// Counts of how a batch of sample requests fared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisSummary {
    pub succeeded: usize,
    pub out_of_band: usize,
    pub overflowed: usize,
    pub cancelled: usize,

    /// Errors that aren't tied to a single request. Batches never report these
    /// per request, but they are counted rather than dropped.
    pub other: usize,
}

impl SynthesisSummary {
    pub fn from_outcomes(outcomes: &[SampleOutcome]) -> SynthesisSummary {
        let mut summary = SynthesisSummary::default();
        for outcome in outcomes {
            summary.add(outcome);
        }
        summary
    }

    /// Account for another outcome, e.g. while streaming.
    pub fn add(&mut self, outcome: &SampleOutcome) {
        match &outcome.result {
            Ok(_) => self.succeeded += 1,
            Err(SynthesisError::OutOfBandSample { .. }) => self.out_of_band += 1,
            Err(SynthesisError::NumericalOverflow { .. }) => self.overflowed += 1,
            Err(SynthesisError::Cancelled) => self.cancelled += 1,
            Err(_) => self.other += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed()
    }

    pub fn failed(&self) -> usize {
        self.out_of_band + self.overflowed + self.cancelled + self.other
    }
}
