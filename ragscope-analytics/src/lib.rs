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

//! # Ragscope Analytics
//!
//! Analytics and comparison engine for RAG evaluation runs.
//!
//! Turns raw nested score records into the derived views a dashboard
//! renders:
//!
//! - **Statistics**: per-metric, per-goal and per-question-type summaries
//! - **Component averages**: retrieval / generation / system roll-ups
//! - **Correlation matrix**: pairwise metric correlations
//! - **Cross-tabulation**: metric x question-type score grid
//! - **Histogram**: per-test-case score distribution
//! - **Comparison views**: multi-run bars, radar, heatmap diff, time series
//!
//! Every transform is a pure, synchronous function over immutable records;
//! derived values carry no identity and are recomputed on demand. The only
//! async surface is the [`store::RunRepository`] boundary and the
//! per-session fetch cache in [`session`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use ragscope_analytics::{ComparisonSession, FsRunStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ragscope_analytics::AnalyticsError> {
//!     let store = Arc::new(FsRunStore::new("evaluation_results"));
//!     let session = ComparisonSession::new(store);
//!
//!     let analytics = session.analyze("2025-06-01_run").await?;
//!     println!("overall: {:.2}", analytics.statistics.overall_score);
//!
//!     let view = session
//!         .compare("2025-06-01_run", &["2025-05-01_run".to_string()])
//!         .await?;
//!     println!("{} radar series", view.radar.series.len());
//!     Ok(())
//! }
//! ```

use thiserror::Error;

pub mod cache;
pub mod comparison;
pub mod components;
pub mod correlation;
pub mod crosstab;
pub mod histogram;
pub mod session;
pub mod statistics;
pub mod store;

pub use cache::{CacheStats, RunCache};
pub use comparison::{
    ComparisonView, ComponentSeries, GoalSeries, HeatmapComparison, HeatmapDiff,
    RadarComparison, RadarSeries, RunAnalytics, RunHeatmap, TimePoint, TimeSeriesView,
    MAX_COMPARISON_RUNS,
};
pub use components::ComponentAverages;
pub use correlation::CorrelationMatrix;
pub use crosstab::{CrossTab, PerformanceBand};
pub use histogram::{ScoreHistogram, HISTOGRAM_BINS};
pub use ragscope_core::{
    EvaluationRun, Goal, IndividualScore, Metric, MetricCategory, Question, RunSummary,
};
pub use session::ComparisonSession;
pub use statistics::{
    GoalStatistic, MetricSummary, PairPerformance, QuestionTypePerformance, Statistics,
};
pub use store::{FsRunStore, RunRepository};

/// Errors surfaced by the analytics engine and its repository boundary.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Too many comparison runs: {requested} requested, max {max}")]
    TooManyComparisons { requested: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
