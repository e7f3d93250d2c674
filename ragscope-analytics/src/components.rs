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

//! Category roll-ups
//!
//! Averages each run's metric summaries into the three fixed categories and
//! an overall composite. This is the one boundary where fractions become
//! percentages.
//!
//! A category with no matching metrics averages to 0 and still counts in the
//! composite denominator. Known modeling simplification, kept for
//! compatibility with the original dashboard.

use crate::statistics::Statistics;
use ragscope_core::MetricCategory;
use serde::{Deserialize, Serialize};

/// Category-level averages for one run, as percentages in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentAverages {
    pub retrieval: f64,
    pub generation: f64,
    pub system: f64,

    /// Unweighted mean of the three category percentages
    pub overall: f64,
}

impl ComponentAverages {
    pub fn from_statistics(stats: &Statistics) -> Self {
        let mut sums = [0.0_f64; 3];
        let mut counts = [0_usize; 3];

        for (metric_id, summary) in &stats.metrics_summary {
            let slot = match MetricCategory::classify(metric_id) {
                MetricCategory::Retrieval => 0,
                MetricCategory::Generation => 1,
                MetricCategory::System => 2,
                MetricCategory::Unclassified => continue,
            };
            sums[slot] += summary.average_score;
            counts[slot] += 1;
        }

        let percent = |slot: usize| {
            if counts[slot] == 0 {
                0.0
            } else {
                sums[slot] / counts[slot] as f64 * 100.0
            }
        };

        let retrieval = percent(0);
        let generation = percent(1);
        let system = percent(2);

        ComponentAverages {
            retrieval,
            generation,
            system,
            overall: (retrieval + generation + system) / 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::MetricSummary;
    use std::collections::BTreeMap;

    fn stats_with_metrics(entries: &[(&str, f64)]) -> Statistics {
        let mut metrics_summary = BTreeMap::new();
        for (id, avg) in entries {
            metrics_summary.insert(
                id.to_string(),
                MetricSummary {
                    average_score: *avg,
                    min_score: *avg,
                    max_score: *avg,
                    count: 1,
                    std_dev: None,
                },
            );
        }
        Statistics {
            overall_score: 0.0,
            goals: vec![],
            metrics_summary,
            question_types_performance: BTreeMap::new(),
            metric_question_type_performance: None,
        }
    }

    #[test]
    fn test_category_averages_are_unweighted_percentages() {
        let stats = stats_with_metrics(&[
            ("context_precision", 0.8),
            ("context_recall", 0.6),
            ("faithfulness", 0.5),
            ("answer_correctness", 1.0),
        ]);
        let averages = ComponentAverages::from_statistics(&stats);
        assert!((averages.retrieval - 70.0).abs() < 1e-9);
        assert!((averages.generation - 50.0).abs() < 1e-9);
        assert!((averages.system - 100.0).abs() < 1e-9);
        assert!((averages.overall - (70.0 + 50.0 + 100.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_category_stays_in_composite_denominator() {
        let stats = stats_with_metrics(&[
            ("context_precision", 0.9),
            ("faithfulness", 0.6),
        ]);
        let averages = ComponentAverages::from_statistics(&stats);
        assert_eq!(averages.system, 0.0);
        assert!((averages.overall - (90.0 + 60.0 + 0.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_unclassified_metrics_contribute_nowhere() {
        let stats = stats_with_metrics(&[
            ("context_precision", 0.9),
            ("mystery_metric", 0.1),
        ]);
        let averages = ComponentAverages::from_statistics(&stats);
        assert!((averages.retrieval - 90.0).abs() < 1e-9);
        assert_eq!(averages.generation, 0.0);
        assert_eq!(averages.system, 0.0);
    }
}
