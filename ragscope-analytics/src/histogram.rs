// Copyright 2025 Ragscope Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Score distribution histogram
//!
//! Buckets per-test-case mean scores into five fixed bins. A test case is a
//! distinct (query, question type) pair; its mean is taken over whichever
//! metrics were scored for it. The last bin is closed on both ends so a
//! perfect 1.0 lands in it.

use ragscope_core::EvaluationRun;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of fixed bins.
pub const HISTOGRAM_BINS: usize = 5;

/// Bin labels, in bin order.
pub const BIN_LABELS: [&str; HISTOGRAM_BINS] =
    ["0-20%", "20-40%", "40-60%", "60-80%", "80-100%"];

/// Distribution of per-test-case mean scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreHistogram {
    /// Percentage of test cases per bin; all zero when no cases exist
    pub bins: [f64; HISTOGRAM_BINS],

    /// Number of distinct test cases observed
    pub total_cases: usize,
}

impl ScoreHistogram {
    pub fn from_run(run: &EvaluationRun) -> Self {
        let mut by_case: HashMap<(&str, &str), Vec<f64>> = HashMap::new();
        for (_, detail) in run.individual_scores() {
            by_case
                .entry((detail.query.as_str(), detail.question_type.as_str()))
                .or_default()
                .push(detail.score);
        }

        let total_cases = by_case.len();
        let mut counts = [0_usize; HISTOGRAM_BINS];
        for scores in by_case.values() {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            counts[bin_index(mean)] += 1;
        }

        let mut bins = [0.0; HISTOGRAM_BINS];
        if total_cases > 0 {
            for (bin, count) in bins.iter_mut().zip(counts) {
                *bin = count as f64 / total_cases as f64 * 100.0;
            }
        }

        ScoreHistogram { bins, total_cases }
    }
}

/// Half-open bins of width 0.2; the last bin also takes exactly 1.0.
fn bin_index(score: f64) -> usize {
    ((score * HISTOGRAM_BINS as f64).floor() as usize).min(HISTOGRAM_BINS - 1)
}
