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

//! Metric category vocabulary
//!
//! Every metric identifier belongs to exactly one of three fixed categories.
//! The partition is closed; identifiers outside it classify as
//! [`MetricCategory::Unclassified`] and contribute to no category average.

use serde::{Deserialize, Serialize};

/// Fixed partition of the metric vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricCategory {
    /// Quality of the retrieved context
    Retrieval,
    /// Quality of the generated answer
    Generation,
    /// End-to-end system behavior
    System,
    /// Identifier outside the closed vocabulary
    Unclassified,
}

const RETRIEVAL_METRICS: &[&str] = &[
    "context_precision",
    "context_relevance",
    "context_recall",
    "context_entities_recall",
    "semantic_diversity",
];

const GENERATION_METRICS: &[&str] = &[
    "faithfulness",
    "answer_relevance",
    "answer_completeness",
    "factual_consistency",
    "bertscore",
    "attribution_score",
    "self_consistency",
];

const SYSTEM_METRICS: &[&str] = &[
    "answer_correctness",
    "multi_hop_reasoning",
    "context_utilization",
];

impl MetricCategory {
    /// Classify a metric identifier against the closed vocabulary.
    pub fn classify(metric_id: &str) -> Self {
        if RETRIEVAL_METRICS.contains(&metric_id) {
            MetricCategory::Retrieval
        } else if GENERATION_METRICS.contains(&metric_id) {
            MetricCategory::Generation
        } else if SYSTEM_METRICS.contains(&metric_id) {
            MetricCategory::System
        } else {
            MetricCategory::Unclassified
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::Retrieval => "retrieval",
            MetricCategory::Generation => "generation",
            MetricCategory::System => "system",
            MetricCategory::Unclassified => "unclassified",
        }
    }

    /// All identifiers in the closed vocabulary, category by category.
    pub fn known_metrics() -> impl Iterator<Item = (&'static str, MetricCategory)> {
        RETRIEVAL_METRICS
            .iter()
            .map(|id| (*id, MetricCategory::Retrieval))
            .chain(
                GENERATION_METRICS
                    .iter()
                    .map(|id| (*id, MetricCategory::Generation)),
            )
            .chain(SYSTEM_METRICS.iter().map(|id| (*id, MetricCategory::System)))
    }
}
