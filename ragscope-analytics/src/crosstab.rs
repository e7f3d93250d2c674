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

//! Cross-tabulation builder
//!
//! Question-type x metric grid of average scores for heatmap rendering.
//! Sparse cells resolve through a fallback chain: pair performance, then
//! raw per-test-case scores matching both keys, then the metric's global
//! average, then 0.

use crate::statistics::{mean, Statistics};
use ragscope_core::EvaluationRun;
use serde::{Deserialize, Serialize};

/// Question-type x metric grid of values in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossTab {
    /// Row keys
    pub question_types: Vec<String>,

    /// Column keys
    pub metric_ids: Vec<String>,

    /// values[row][col], rows keyed by question type
    pub values: Vec<Vec<f64>>,
}

/// Display band for a cell value. Classification contract consumed by the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceBand {
    High,
    MediumHigh,
    Medium,
    MediumLow,
    Low,
}

impl PerformanceBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            PerformanceBand::High
        } else if score >= 0.6 {
            PerformanceBand::MediumHigh
        } else if score >= 0.4 {
            PerformanceBand::Medium
        } else if score >= 0.2 {
            PerformanceBand::MediumLow
        } else {
            PerformanceBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceBand::High => "high",
            PerformanceBand::MediumHigh => "medium-high",
            PerformanceBand::Medium => "medium",
            PerformanceBand::MediumLow => "medium-low",
            PerformanceBand::Low => "low",
        }
    }
}

impl CrossTab {
    /// Build the grid for one run. Row and column keys come from the run's
    /// statistics; the raw run backs the sparse-cell fallback.
    pub fn build(stats: &Statistics, run: &EvaluationRun) -> Self {
        let question_types: Vec<String> =
            stats.question_types_performance.keys().cloned().collect();
        let metric_ids: Vec<String> = stats.metrics_summary.keys().cloned().collect();

        let values = question_types
            .iter()
            .map(|q_type| {
                metric_ids
                    .iter()
                    .map(|metric_id| cell_value(stats, run, q_type, metric_id))
                    .collect()
            })
            .collect();

        CrossTab {
            question_types,
            metric_ids,
            values,
        }
    }

    /// Cell value by key, if both keys are part of the grid.
    pub fn get(&self, question_type: &str, metric_id: &str) -> Option<f64> {
        let row = self
            .question_types
            .iter()
            .position(|t| t == question_type)?;
        let col = self.metric_ids.iter().position(|m| m == metric_id)?;
        Some(self.values[row][col])
    }
}

fn cell_value(
    stats: &Statistics,
    run: &EvaluationRun,
    q_type: &str,
    metric_id: &str,
) -> f64 {
    if let Some(pairs) = &stats.metric_question_type_performance {
        if let Some(perf) = pairs.get(metric_id).and_then(|by_type| by_type.get(q_type)) {
            return perf.average;
        }
    }

    let raw: Vec<f64> = run
        .individual_scores()
        .filter(|(id, detail)| *id == metric_id && detail.question_type == q_type)
        .map(|(_, detail)| detail.score)
        .collect();
    if !raw.is_empty() {
        return mean(&raw);
    }

    stats
        .metrics_summary
        .get(metric_id)
        .map(|s| s.average_score)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ragscope_core::{Goal, IndividualScore, Metric, Question};
    use std::collections::BTreeMap;

    fn score(q_type: &str, value: f64) -> IndividualScore {
        IndividualScore {
            query: "q".to_string(),
            generated_answer: String::new(),
            question_type: q_type.to_string(),
            score: value,
        }
    }

    fn run_with_metrics(metrics: Vec<Metric>) -> EvaluationRun {
        EvaluationRun {
            id: "run".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            overall_score: 0.5,
            goals: vec![Goal {
                name: "g".to_string(),
                score: 0.5,
                weight: 1.0,
                questions: vec![Question {
                    text: "q".to_string(),
                    score: 0.5,
                    weight: 1.0,
                    metrics,
                }],
            }],
        }
    }

    #[test]
    fn test_cell_from_pair_performance() {
        let run = run_with_metrics(vec![Metric {
            id: "faithfulness".to_string(),
            value: 0.9,
            weight: 1.0,
            individual_scores: Some(vec![score("simple", 0.6), score("simple", 0.8)]),
        }]);
        let stats = Statistics::from_run(&run);
        let grid = CrossTab::build(&stats, &run);
        assert!((grid.get("simple", "faithfulness").unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_raw_score_fallback_when_pair_entry_absent() {
        // Pair table stripped to force the second step of the chain.
        let run = run_with_metrics(vec![Metric {
            id: "faithfulness".to_string(),
            value: 0.9,
            weight: 1.0,
            individual_scores: Some(vec![score("simple", 0.6), score("simple", 0.8)]),
        }]);
        let mut stats = Statistics::from_run(&run);
        stats.metric_question_type_performance = None;
        let grid = CrossTab::build(&stats, &run);
        assert!((grid.get("simple", "faithfulness").unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_global_average_fallback_ignores_question_type() {
        // "complex" has detail only for context_recall, so the
        // (complex, faithfulness) cell falls through to the global average.
        let run = run_with_metrics(vec![
            Metric {
                id: "faithfulness".to_string(),
                value: 0.5,
                weight: 1.0,
                individual_scores: Some(vec![score("simple", 0.9)]),
            },
            Metric {
                id: "context_recall".to_string(),
                value: 0.4,
                weight: 1.0,
                individual_scores: Some(vec![score("complex", 0.4)]),
            },
        ]);
        let stats = Statistics::from_run(&run);
        let grid = CrossTab::build(&stats, &run);
        assert!((grid.get("complex", "faithfulness").unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_grid_shape_covers_all_types_and_metrics() {
        let run = run_with_metrics(vec![
            Metric {
                id: "faithfulness".to_string(),
                value: 0.5,
                weight: 1.0,
                individual_scores: Some(vec![score("simple", 0.9), score("double", 0.2)]),
            },
            Metric {
                id: "bertscore".to_string(),
                value: 0.4,
                weight: 1.0,
                individual_scores: None,
            },
        ]);
        let stats = Statistics::from_run(&run);
        let grid = CrossTab::build(&stats, &run);
        assert_eq!(grid.question_types.len(), 2);
        assert_eq!(grid.metric_ids.len(), 2);
        assert_eq!(grid.values.len(), 2);
        assert!(grid.values.iter().all(|row| row.len() == 2));
        // bertscore has no detail anywhere: every cell is its global average.
        assert_eq!(grid.get("simple", "bertscore"), Some(0.4));
        assert_eq!(grid.get("double", "bertscore"), Some(0.4));
    }

    #[test]
    fn test_empty_statistics_yield_empty_grid() {
        let run = run_with_metrics(vec![]);
        let stats = Statistics {
            overall_score: 0.0,
            goals: vec![],
            metrics_summary: BTreeMap::new(),
            question_types_performance: BTreeMap::new(),
            metric_question_type_performance: None,
        };
        let grid = CrossTab::build(&stats, &run);
        assert!(grid.question_types.is_empty());
        assert!(grid.metric_ids.is_empty());
        assert!(grid.values.is_empty());
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(PerformanceBand::from_score(0.95), PerformanceBand::High);
        assert_eq!(PerformanceBand::from_score(0.8), PerformanceBand::High);
        assert_eq!(PerformanceBand::from_score(0.79), PerformanceBand::MediumHigh);
        assert_eq!(PerformanceBand::from_score(0.6), PerformanceBand::MediumHigh);
        assert_eq!(PerformanceBand::from_score(0.4), PerformanceBand::Medium);
        assert_eq!(PerformanceBand::from_score(0.2), PerformanceBand::MediumLow);
        assert_eq!(PerformanceBand::from_score(0.19), PerformanceBand::Low);
        assert_eq!(PerformanceBand::from_score(0.0), PerformanceBand::Low);
        assert_eq!(PerformanceBand::from_score(0.6).as_str(), "medium-high");
    }
}
