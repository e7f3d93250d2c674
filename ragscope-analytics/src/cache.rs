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

//! Caching layer for fetched runs
//!
//! Holds raw runs already fetched from the repository for the lifetime of a
//! comparison session. Concurrent fetches of the same run id are
//! deduplicated: only one repository call runs, the rest await its result.
//! Failed fetches are not cached.

use crate::AnalyticsError;
use moka::future::Cache;
use ragscope_core::EvaluationRun;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const MAX_CACHED_RUNS: u64 = 64;

/// Session-scoped cache of fetched runs, keyed by run id.
pub struct RunCache {
    cache: Cache<String, Arc<EvaluationRun>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl RunCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().max_capacity(MAX_CACHED_RUNS).build(),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Return the cached run, or run `fetch` and cache its result.
    /// Concurrent callers for the same id share a single fetch.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        id: &str,
        fetch: F,
    ) -> Result<Arc<EvaluationRun>, AnalyticsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EvaluationRun, AnalyticsError>> + Send,
    {
        if let Some(run) = self.cache.get(id).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(run);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        self.cache
            .try_get_with(id.to_string(), async move { fetch().await.map(Arc::new) })
            .await
            .map_err(|shared: Arc<AnalyticsError>| match Arc::try_unwrap(shared) {
                Ok(err) => err,
                Err(still_shared) => AnalyticsError::Internal(still_shared.to_string()),
            })
    }

    /// Drop every cached run.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
            entry_count: self.cache.entry_count(),
        }
    }
}

impl Default for RunCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entry_count: u64,
}
