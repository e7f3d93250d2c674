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

//! Metric correlation engine
//!
//! Pearson correlation between metrics over their per-test-case score
//! sequences. Alignment is positional: for a pair of metrics, the first
//! min(len_i, len_j) entries of each group are paired in order, not matched
//! by test-case key. Every ordered pair is computed independently; the
//! matrix is not assumed symmetric.
//!
//! Defined-as-zero cases: fewer than two aligned samples, or zero variance
//! in either window. The diagonal is pinned to 1 regardless of data.

use ragscope_core::EvaluationRun;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pairwise metric correlations for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Metric ids in first-seen order over the flattened run
    pub metric_ids: Vec<String>,

    /// matrix[i][j] = correlation of metric i against metric j
    pub matrix: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn from_run(run: &EvaluationRun) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();

        for (metric_id, detail) in run.individual_scores() {
            if !groups.contains_key(metric_id) {
                order.push(metric_id.to_string());
            }
            groups.entry(metric_id).or_default().push(detail.score);
        }

        let matrix = order
            .iter()
            .map(|row_id| {
                let row_scores = &groups[row_id.as_str()];
                order
                    .iter()
                    .map(|col_id| {
                        if row_id == col_id {
                            1.0
                        } else {
                            pearson(row_scores, &groups[col_id.as_str()])
                        }
                    })
                    .collect()
            })
            .collect();

        CorrelationMatrix {
            metric_ids: order,
            matrix,
        }
    }

    /// Coefficient for a pair of metric ids, if both were observed.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.metric_ids.iter().position(|id| id == a)?;
        let j = self.metric_ids.iter().position(|id| id == b)?;
        Some(self.matrix[i][j])
    }
}

/// Pearson coefficient over the positional prefix of two score sequences,
/// using population mean/variance of exactly that window.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n <= 1 {
        return 0.0;
    }
    let xs = &xs[..n];
    let ys = &ys[..n];

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for k in 0..n {
        let dx = xs[k] - mean_x;
        let dy = ys[k] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    cov / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ragscope_core::{Goal, IndividualScore, Metric, Question};

    fn run_with_metric_scores(metric_scores: Vec<(&str, Vec<f64>)>) -> EvaluationRun {
        let metrics = metric_scores
            .into_iter()
            .map(|(id, scores)| Metric {
                id: id.to_string(),
                value: 0.5,
                weight: 1.0,
                individual_scores: Some(
                    scores
                        .into_iter()
                        .enumerate()
                        .map(|(i, s)| IndividualScore {
                            query: format!("q{i}"),
                            generated_answer: String::new(),
                            question_type: "simple".to_string(),
                            score: s,
                        })
                        .collect(),
                ),
            })
            .collect();
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
    fn test_diagonal_is_always_one() {
        let run = run_with_metric_scores(vec![
            ("faithfulness", vec![0.5, 0.5, 0.5]),
            ("context_recall", vec![0.1, 0.9]),
        ]);
        let corr = CorrelationMatrix::from_run(&run);
        assert_eq!(corr.get("faithfulness", "faithfulness"), Some(1.0));
        assert_eq!(corr.get("context_recall", "context_recall"), Some(1.0));
    }

    #[test]
    fn test_first_seen_order_is_preserved() {
        let run = run_with_metric_scores(vec![
            ("bertscore", vec![0.1, 0.2]),
            ("answer_relevance", vec![0.3, 0.4]),
        ]);
        let corr = CorrelationMatrix::from_run(&run);
        assert_eq!(corr.metric_ids, vec!["bertscore", "answer_relevance"]);
    }

    #[test]
    fn test_perfect_positive_and_negative_correlation() {
        let run = run_with_metric_scores(vec![
            ("faithfulness", vec![0.1, 0.2, 0.3]),
            ("answer_relevance", vec![0.2, 0.4, 0.6]),
            ("context_recall", vec![0.9, 0.6, 0.3]),
        ]);
        let corr = CorrelationMatrix::from_run(&run);
        assert!((corr.get("faithfulness", "answer_relevance").unwrap() - 1.0).abs() < 1e-12);
        assert!((corr.get("faithfulness", "context_recall").unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_is_zero_not_nan() {
        let run = run_with_metric_scores(vec![
            ("faithfulness", vec![0.5, 0.5, 0.5]),
            ("context_recall", vec![0.5, 0.5, 0.5]),
        ]);
        let corr = CorrelationMatrix::from_run(&run);
        assert_eq!(corr.get("faithfulness", "context_recall"), Some(0.0));
    }

    #[test]
    fn test_single_aligned_sample_is_zero() {
        let run = run_with_metric_scores(vec![
            ("faithfulness", vec![0.9]),
            ("context_recall", vec![0.1, 0.2, 0.3]),
        ]);
        let corr = CorrelationMatrix::from_run(&run);
        assert_eq!(corr.get("faithfulness", "context_recall"), Some(0.0));
        assert_eq!(corr.get("context_recall", "faithfulness"), Some(0.0));
    }

    #[test]
    fn test_ragged_groups_truncate_to_shared_prefix() {
        // Only the first two entries of the longer group take part.
        let run = run_with_metric_scores(vec![
            ("faithfulness", vec![0.1, 0.2]),
            ("context_recall", vec![0.2, 0.4, 0.0]),
        ]);
        let corr = CorrelationMatrix::from_run(&run);
        assert!((corr.get("faithfulness", "context_recall").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_run_without_detail_is_empty() {
        let run = EvaluationRun {
            id: "run".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            overall_score: 0.5,
            goals: vec![],
        };
        let corr = CorrelationMatrix::from_run(&run);
        assert!(corr.metric_ids.is_empty());
        assert!(corr.matrix.is_empty());
    }
}
