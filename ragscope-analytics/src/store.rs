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

//! Run repository boundary
//!
//! The engine reads materialized evaluation records through
//! [`RunRepository`] and performs no other I/O. [`FsRunStore`] is the
//! filesystem implementation: a directory of JSON result files, one per
//! run, where the file stem is the run id and the modification time is the
//! run timestamp.

use crate::statistics::Statistics;
use crate::AnalyticsError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ragscope_core::{EvaluationRun, Goal, RunSummary};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Source of raw evaluation records.
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// All stored runs, newest first.
    async fn list_runs(&self) -> Result<Vec<RunSummary>, AnalyticsError>;

    /// Full hierarchical record for one run.
    async fn get_run(&self, id: &str) -> Result<EvaluationRun, AnalyticsError>;

    /// Statistics for one run. The default computes on demand; a store
    /// holding pre-computed statistics may override. The contract is
    /// identical either way.
    async fn get_run_statistics(&self, id: &str) -> Result<Statistics, AnalyticsError> {
        let run = self.get_run(id).await?;
        Ok(Statistics::from_run(&run))
    }
}

/// The on-disk body of a result file. Run id and timestamp come from file
/// metadata, not the body.
#[derive(Debug, Deserialize)]
struct RunFile {
    #[serde(default)]
    overall_score: f64,
    #[serde(default)]
    goals: Vec<Goal>,
}

/// Directory of `*.json` evaluation result files.
pub struct FsRunStore {
    results_dir: PathBuf,
}

impl FsRunStore {
    pub fn new(results_dir: impl AsRef<Path>) -> Self {
        Self {
            results_dir: results_dir.as_ref().to_path_buf(),
        }
    }

    fn run_path(&self, id: &str) -> PathBuf {
        self.results_dir.join(format!("{id}.json"))
    }

    async fn file_timestamp(path: &Path) -> std::io::Result<DateTime<Utc>> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(DateTime::<Utc>::from(metadata.modified()?))
    }
}

#[async_trait]
impl RunRepository for FsRunStore {
    async fn list_runs(&self) -> Result<Vec<RunSummary>, AnalyticsError> {
        // A missing results directory is an empty store, not an error.
        let mut dir = match tokio::fs::read_dir(&self.results_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut runs = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Unreadable entries are skipped, never fatal.
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!("Skipping unreadable result file {:?}: {}", path, e);
                    continue;
                }
            };
            let Ok(modified) = metadata.modified() else {
                tracing::warn!("Skipping result file without mtime: {:?}", path);
                continue;
            };
            runs.push(RunSummary {
                id: stem.to_string(),
                filename: format!("{stem}.json"),
                timestamp: DateTime::<Utc>::from(modified),
                size: metadata.len(),
            });
        }

        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(runs)
    }

    async fn get_run(&self, id: &str) -> Result<EvaluationRun, AnalyticsError> {
        let path = self.run_path(id);
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AnalyticsError::RunNotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let file: RunFile = serde_json::from_str(&body)?;
        let timestamp = Self::file_timestamp(&path).await?;
        tracing::debug!("Loaded run {} ({} goals)", id, file.goals.len());

        Ok(EvaluationRun {
            id: id.to_string(),
            timestamp,
            overall_score: file.overall_score,
            goals: file.goals,
        })
    }
}
