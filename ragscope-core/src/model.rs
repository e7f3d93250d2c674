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

//! Raw evaluation records
//!
//! One `EvaluationRun` is the complete output of a single evaluation
//! execution: an ordered tree of goals, questions and metric values, with
//! optional per-test-case detail attached to each metric. All scores are
//! fractions in [0, 1]; percentage rendering is a presentation concern.
//!
//! Goal and question order is the insertion order of the source run and is
//! preserved by every derived structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_weight() -> f64 {
    1.0
}

/// One complete evaluation execution.
///
/// `id` and `timestamp` are assigned by the run store (file stem and
/// modification time for the filesystem store); the result file body carries
/// `overall_score` and `goals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRun {
    /// Unique run identifier
    pub id: String,

    /// When this run was produced
    pub timestamp: DateTime<Utc>,

    /// Weighted overall score, pre-computed by the upstream pipeline
    #[serde(default)]
    pub overall_score: f64,

    /// Evaluation goals in source order
    #[serde(default)]
    pub goals: Vec<Goal>,
}

/// A weighted evaluation objective composed of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,

    /// Weighted aggregate of this goal's question scores, in [0, 1]
    pub score: f64,

    #[serde(default = "default_weight")]
    pub weight: f64,

    #[serde(default)]
    pub questions: Vec<Question>,
}

/// One evaluation prompt grouping, composed of metric evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub text: String,

    /// Weighted aggregate of this question's metric values, in [0, 1]
    pub score: f64,

    #[serde(default = "default_weight")]
    pub weight: f64,

    #[serde(default)]
    pub metrics: Vec<Metric>,
}

/// A named scoring function evaluated for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    /// Metric identifier from the closed vocabulary (see [`crate::category`])
    pub id: String,

    /// Aggregate value of this metric for the question, in [0, 1]
    pub value: f64,

    #[serde(default = "default_weight")]
    pub weight: f64,

    /// Per-test-case detail; absent when the pipeline ran without
    /// detailed results. Absence is sparsity, never synthesized zeros.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_scores: Option<Vec<IndividualScore>>,
}

/// One metric's score for one specific test case.
///
/// The owning metric id is a back-reference supplied when flattening; it is
/// not stored on the record itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualScore {
    pub query: String,
    pub generated_answer: String,

    /// Free-form test-case category ("simple", "complex", ...)
    pub question_type: String,

    pub score: f64,
}

/// Listing record for a stored run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: String,
    pub filename: String,
    pub timestamp: DateTime<Utc>,
    pub size: u64,
}

impl EvaluationRun {
    /// Flatten all per-test-case scores in document order (goals, then
    /// questions, then metrics, then each metric's individual scores),
    /// yielding the owning metric id with each record.
    ///
    /// This single traversal order feeds correlation grouping, cross-tab
    /// fallbacks and the histogram builder, so it must stay stable.
    pub fn individual_scores(&self) -> impl Iterator<Item = (&str, &IndividualScore)> {
        self.goals
            .iter()
            .flat_map(|g| g.questions.iter())
            .flat_map(|q| q.metrics.iter())
            .flat_map(|m| {
                m.individual_scores
                    .iter()
                    .flatten()
                    .map(move |s| (m.id.as_str(), s))
            })
    }

    /// Whether any metric in the run carries per-test-case detail.
    pub fn has_individual_scores(&self) -> bool {
        self.individual_scores().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_run() -> EvaluationRun {
        EvaluationRun {
            id: "run-1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            overall_score: 0.75,
            goals: vec![Goal {
                name: "retrieval quality".to_string(),
                score: 0.75,
                weight: 1.0,
                questions: vec![Question {
                    text: "What is the capital of France?".to_string(),
                    score: 0.75,
                    weight: 1.0,
                    metrics: vec![
                        Metric {
                            id: "faithfulness".to_string(),
                            value: 0.8,
                            weight: 1.0,
                            individual_scores: Some(vec![IndividualScore {
                                query: "What is the capital of France?".to_string(),
                                generated_answer: "Paris".to_string(),
                                question_type: "simple".to_string(),
                                score: 0.8,
                            }]),
                        },
                        Metric {
                            id: "context_precision".to_string(),
                            value: 0.7,
                            weight: 1.0,
                            individual_scores: None,
                        },
                    ],
                }],
            }],
        }
    }

    #[test]
    fn test_flatten_yields_owning_metric_id() {
        let run = sample_run();
        let flat: Vec<_> = run.individual_scores().collect();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].0, "faithfulness");
        assert_eq!(flat[0].1.question_type, "simple");
        assert!(run.has_individual_scores());
    }

    #[test]
    fn test_absent_detail_is_omitted_from_json() {
        let run = sample_run();
        let json = serde_json::to_string(&run).unwrap();
        let metric_without_detail = &run.goals[0].questions[0].metrics[1];
        assert!(metric_without_detail.individual_scores.is_none());
        // Only the metric that has detail serializes the field.
        assert_eq!(json.matches("individual_scores").count(), 1);
    }

    #[test]
    fn test_result_file_defaults() {
        // A result file body may omit goals entirely; weights default to 1.
        let metric: Metric =
            serde_json::from_str(r#"{"id": "bertscore", "value": 0.9}"#).unwrap();
        assert_eq!(metric.weight, 1.0);
        assert!(metric.individual_scores.is_none());

        let goal: Goal =
            serde_json::from_str(r#"{"name": "g", "score": 0.5}"#).unwrap();
        assert!(goal.questions.is_empty());
    }

    #[test]
    fn test_run_round_trip() {
        let run = sample_run();
        let json = serde_json::to_string(&run).unwrap();
        let back: EvaluationRun = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, run.id);
        assert_eq!(back.goals.len(), 1);
        assert_eq!(back.goals[0].questions[0].metrics.len(), 2);
    }
}
