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

//! Multi-run comparison views
//!
//! Combines per-run analytics across the current run plus up to
//! [`MAX_COMPARISON_RUNS`] comparison runs into the structures the dashboard
//! charts from: parallel component bars, goal radar, heatmap grids with a
//! two-run diff, and a chronological per-goal time series.
//!
//! The current run is always the first element of every series list. Radar
//! and time series zero-fill goals a run does not have; charts need
//! fixed-length vectors per series.

use crate::components::ComponentAverages;
use crate::correlation::CorrelationMatrix;
use crate::crosstab::CrossTab;
use crate::histogram::ScoreHistogram;
use crate::statistics::Statistics;
use chrono::{DateTime, Utc};
use ragscope_core::EvaluationRun;
use serde::{Deserialize, Serialize};

/// Hard cap on comparison runs, enforced at the selection boundary.
pub const MAX_COMPARISON_RUNS: usize = 2;

/// Everything the engine derives from a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAnalytics {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub statistics: Statistics,
    pub components: ComponentAverages,
    pub correlation: CorrelationMatrix,
    pub crosstab: CrossTab,
    pub histogram: ScoreHistogram,
}

impl RunAnalytics {
    pub fn from_run(run: &EvaluationRun) -> Self {
        let statistics = Statistics::from_run(run);
        let components = ComponentAverages::from_statistics(&statistics);
        let correlation = CorrelationMatrix::from_run(run);
        let crosstab = CrossTab::build(&statistics, run);
        let histogram = ScoreHistogram::from_run(run);
        RunAnalytics {
            run_id: run.id.clone(),
            timestamp: run.timestamp,
            statistics,
            components,
            correlation,
            crosstab,
            histogram,
        }
    }

    fn goal_score(&self, name: &str) -> Option<f64> {
        self.statistics
            .goals
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.score)
    }
}

/// One run's component averages inside a multi-run bar chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSeries {
    pub run_id: String,
    pub averages: ComponentAverages,
}

/// Per-goal percentage vectors aligned by goal name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarComparison {
    /// Axis labels: the current run's goals, in source order
    pub goals: Vec<String>,
    pub series: Vec<RadarSeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarSeries {
    pub run_id: String,

    /// Goal scores as percentages; 0 where the run lacks the goal
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHeatmap {
    pub run_id: String,
    pub grid: CrossTab,
}

/// Cell-by-cell difference between exactly two runs' grids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapDiff {
    pub question_types: Vec<String>,
    pub metric_ids: Vec<String>,

    /// values[row][col] = second run's cell - first run's cell
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapComparison {
    pub runs: Vec<RunHeatmap>,

    /// Present only when exactly two runs are compared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<HeatmapDiff>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimePoint {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSeries {
    pub goal: String,

    /// One score in [0, 1] per time point; 0 where the run lacks the goal
    pub scores: Vec<f64>,
}

/// Per-goal trend lines over chronologically ordered runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesView {
    /// Runs sorted ascending by timestamp
    pub points: Vec<TimePoint>,
    pub series: Vec<GoalSeries>,
}

/// The complete comparison output for a selection of runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonView {
    pub components: Vec<ComponentSeries>,
    pub radar: RadarComparison,
    pub heatmap: HeatmapComparison,

    /// `None` with fewer than two runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_series: Option<TimeSeriesView>,
}

impl ComparisonView {
    /// Assemble all comparison views. `runs[0]` is the current run; callers
    /// enforce the comparison cap before building.
    pub fn build(runs: &[RunAnalytics]) -> Self {
        ComparisonView {
            components: component_series(runs),
            radar: radar_comparison(runs),
            heatmap: heatmap_comparison(runs),
            time_series: time_series(runs),
        }
    }
}

fn component_series(runs: &[RunAnalytics]) -> Vec<ComponentSeries> {
    runs.iter()
        .map(|r| ComponentSeries {
            run_id: r.run_id.clone(),
            averages: r.components.clone(),
        })
        .collect()
}

fn radar_comparison(runs: &[RunAnalytics]) -> RadarComparison {
    let goals: Vec<String> = runs
        .first()
        .map(|r| r.statistics.goals.iter().map(|g| g.name.clone()).collect())
        .unwrap_or_default();

    let series = runs
        .iter()
        .map(|r| RadarSeries {
            run_id: r.run_id.clone(),
            scores: goals
                .iter()
                .map(|name| r.goal_score(name).unwrap_or(0.0) * 100.0)
                .collect(),
        })
        .collect();

    RadarComparison { goals, series }
}

fn heatmap_comparison(runs: &[RunAnalytics]) -> HeatmapComparison {
    let grids: Vec<RunHeatmap> = runs
        .iter()
        .map(|r| RunHeatmap {
            run_id: r.run_id.clone(),
            grid: r.crosstab.clone(),
        })
        .collect();

    // Diff is defined only for exactly two runs. The first run's shape is
    // the iteration domain; coordinates only the second run has are
    // excluded, coordinates it lacks read as 0.
    let diff = if let [first, second] = runs {
        let base = &first.crosstab;
        let values = base
            .question_types
            .iter()
            .enumerate()
            .map(|(row, q_type)| {
                base.metric_ids
                    .iter()
                    .enumerate()
                    .map(|(col, metric_id)| {
                        second.crosstab.get(q_type, metric_id).unwrap_or(0.0)
                            - base.values[row][col]
                    })
                    .collect()
            })
            .collect();
        Some(HeatmapDiff {
            question_types: base.question_types.clone(),
            metric_ids: base.metric_ids.clone(),
            values,
        })
    } else {
        None
    };

    HeatmapComparison { runs: grids, diff }
}

fn time_series(runs: &[RunAnalytics]) -> Option<TimeSeriesView> {
    if runs.len() < 2 {
        return None;
    }

    let mut ordered: Vec<&RunAnalytics> = runs.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let points = ordered
        .iter()
        .map(|r| TimePoint {
            run_id: r.run_id.clone(),
            timestamp: r.timestamp,
        })
        .collect();

    // Trend lines exist for the current run's goals, in its goal order.
    let series = runs[0]
        .statistics
        .goals
        .iter()
        .map(|g| GoalSeries {
            goal: g.name.clone(),
            scores: ordered
                .iter()
                .map(|r| r.goal_score(&g.name).unwrap_or(0.0))
                .collect(),
        })
        .collect();

    Some(TimeSeriesView { points, series })
}
