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

//! Statistics aggregator
//!
//! Reduces one [`EvaluationRun`] into per-goal, per-metric and
//! per-question-type summaries. The per-question `Metric.value` is the unit
//! of aggregation for metric summaries; per-test-case detail feeds only the
//! question-type views, which stay empty when a run carries no detail.
//! Empty collections mean "not available", never zero performance.

use ragscope_core::EvaluationRun;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived summary of one evaluation run. Plain serializable data,
/// recomputed on demand and never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    /// Weighted overall score, taken from the run as-is
    pub overall_score: f64,

    /// One entry per goal, in source order
    pub goals: Vec<GoalStatistic>,

    /// Summary per metric id observed anywhere in the run
    pub metrics_summary: BTreeMap<String, MetricSummary>,

    /// Performance per question type; empty when the run has no
    /// per-test-case detail
    pub question_types_performance: BTreeMap<String, QuestionTypePerformance>,

    /// Performance per (metric, question type) pair; `None` when the run
    /// has no per-test-case detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_question_type_performance:
        Option<BTreeMap<String, BTreeMap<String, PairPerformance>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalStatistic {
    pub name: String,
    pub score: f64,
    pub weight: f64,
    pub question_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSummary {
    pub average_score: f64,
    pub min_score: f64,
    pub max_score: f64,

    /// Number of questions contributing
    pub count: usize,

    /// Population standard deviation; present only when count > 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTypePerformance {
    pub average: f64,
    pub count: usize,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairPerformance {
    pub average: f64,
    pub count: usize,
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population (not sample) standard deviation.
fn population_std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

impl Statistics {
    /// Aggregate one run. A run with zero goals yields empty collections
    /// with the overall score as given; that is not an error.
    pub fn from_run(run: &EvaluationRun) -> Self {
        let goals = run
            .goals
            .iter()
            .map(|g| GoalStatistic {
                name: g.name.clone(),
                score: g.score,
                weight: g.weight,
                question_count: g.questions.len(),
            })
            .collect();

        // Per-metric values, one per question where the metric appears.
        let mut metric_values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for goal in &run.goals {
            for question in &goal.questions {
                for metric in &question.metrics {
                    metric_values
                        .entry(metric.id.as_str())
                        .or_default()
                        .push(metric.value);
                }
            }
        }

        let metrics_summary = metric_values
            .into_iter()
            .map(|(id, values)| {
                let summary = MetricSummary {
                    average_score: mean(&values),
                    min_score: values.iter().copied().fold(f64::INFINITY, f64::min),
                    max_score: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    count: values.len(),
                    std_dev: (values.len() > 1).then(|| population_std_dev(&values)),
                };
                (id.to_string(), summary)
            })
            .collect();

        // Question-type views exist only where per-test-case detail does.
        let mut type_scores: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut pair_scores: BTreeMap<&str, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();
        for (metric_id, detail) in run.individual_scores() {
            type_scores
                .entry(detail.question_type.as_str())
                .or_default()
                .push(detail.score);
            pair_scores
                .entry(metric_id)
                .or_default()
                .entry(detail.question_type.as_str())
                .or_default()
                .push(detail.score);
        }

        let question_types_performance = type_scores
            .into_iter()
            .map(|(q_type, scores)| {
                let perf = QuestionTypePerformance {
                    average: mean(&scores),
                    count: scores.len(),
                    min: scores.iter().copied().fold(f64::INFINITY, f64::min),
                    max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                };
                (q_type.to_string(), perf)
            })
            .collect();

        let metric_question_type_performance = if pair_scores.is_empty() {
            None
        } else {
            Some(
                pair_scores
                    .into_iter()
                    .map(|(metric_id, by_type)| {
                        let inner = by_type
                            .into_iter()
                            .map(|(q_type, scores)| {
                                let perf = PairPerformance {
                                    average: mean(&scores),
                                    count: scores.len(),
                                };
                                (q_type.to_string(), perf)
                            })
                            .collect();
                        (metric_id.to_string(), inner)
                    })
                    .collect(),
            )
        };

        Statistics {
            overall_score: run.overall_score,
            goals,
            metrics_summary,
            question_types_performance,
            metric_question_type_performance,
        }
    }
}
