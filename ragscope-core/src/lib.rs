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

//! Ragscope Core
//!
//! Data contracts for hierarchical RAG evaluation results: the raw
//! run/goal/question/metric record tree produced by an evaluation pipeline,
//! and the fixed metric-category vocabulary shared by every derived view.
//!
//! Raw records are read-only once loaded; all analytics in
//! `ragscope-analytics` are pure functions over them.

pub mod category;
pub mod model;

pub use category::MetricCategory;
pub use model::{
    EvaluationRun, Goal, IndividualScore, Metric, Question, RunSummary,
};
