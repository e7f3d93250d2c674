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

//! Comparison session
//!
//! One session per dashboard view: it owns the repository handle and the
//! run cache, so the cache's lifetime is exactly the session's. Dropping
//! the session drops everything it fetched. Selection limits are enforced
//! here, before any fetch is issued.

use crate::cache::{CacheStats, RunCache};
use crate::comparison::{ComparisonView, RunAnalytics, MAX_COMPARISON_RUNS};
use crate::store::RunRepository;
use crate::AnalyticsError;
use ragscope_core::EvaluationRun;
use std::sync::Arc;

/// Orchestrates fetching, caching and deriving views for one dashboard
/// session.
pub struct ComparisonSession {
    repository: Arc<dyn RunRepository>,
    cache: RunCache,
}

impl ComparisonSession {
    pub fn new(repository: Arc<dyn RunRepository>) -> Self {
        Self {
            repository,
            cache: RunCache::new(),
        }
    }

    async fn fetch_run(&self, id: &str) -> Result<Arc<EvaluationRun>, AnalyticsError> {
        let repository = self.repository.clone();
        let owned_id = id.to_string();
        self.cache
            .get_or_fetch(id, move || async move { repository.get_run(&owned_id).await })
            .await
    }

    /// Full derived bundle for a single run.
    pub async fn analyze(&self, id: &str) -> Result<RunAnalytics, AnalyticsError> {
        let run = self.fetch_run(id).await?;
        Ok(RunAnalytics::from_run(&run))
    }

    /// Compare the current run against up to [`MAX_COMPARISON_RUNS`]
    /// others. All required runs are fetched concurrently; ids seen before
    /// in this session are served from the cache.
    pub async fn compare(
        &self,
        current_id: &str,
        comparison_ids: &[String],
    ) -> Result<ComparisonView, AnalyticsError> {
        if comparison_ids.len() > MAX_COMPARISON_RUNS {
            return Err(AnalyticsError::TooManyComparisons {
                requested: comparison_ids.len(),
                max: MAX_COMPARISON_RUNS,
            });
        }

        let (current, comparisons) = futures::future::try_join(
            self.fetch_run(current_id),
            futures::future::try_join_all(comparison_ids.iter().map(|id| self.fetch_run(id))),
        )
        .await?;

        tracing::debug!(
            "Comparing {} against {} run(s)",
            current_id,
            comparisons.len()
        );

        let mut analytics = Vec::with_capacity(1 + comparisons.len());
        analytics.push(RunAnalytics::from_run(&current));
        for run in &comparisons {
            analytics.push(RunAnalytics::from_run(run));
        }

        Ok(ComparisonView::build(&analytics))
    }

    /// Drop all cached runs without ending the session.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
