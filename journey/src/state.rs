//! Durable cache and checkpoint rows for one orchestrator.
//!
//! Every row carries the schema version and the identity it belongs to. A row
//! that fails to parse, carries another version or identity, or (for
//! progress) is older than the configured window is deleted on read and
//! reported as absent. Writes larger than the configured ceiling are refused.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use serde::Serialize;
use serde::de::DeserializeOwned;

use journey_core::{
    CacheRecord, Clock, JourneyConfig, JourneyError, ScanProgress, ScanScope, StateBackend, Stage,
    WorksResume, YearlyStats, YearsToScan,
};

/// Cache and progress store scoped by identity.
pub struct ScanStateStore {
    backend: Arc<dyn StateBackend>,
    clock: Arc<dyn Clock>,
    version: u32,
    max_age: Duration,
    max_bytes: usize,
}

impl ScanStateStore {
    /// Store rows in `backend`, validated against `cfg`'s schema version, age
    /// window and size ceiling.
    pub fn new(backend: Arc<dyn StateBackend>, clock: Arc<dyn Clock>, cfg: &JourneyConfig) -> Self {
        Self {
            backend,
            clock,
            version: cfg.schema_version,
            max_age: cfg.progress_max_age,
            max_bytes: cfg.max_persisted_bytes,
        }
    }

    /// Key of `identity`'s cache row.
    #[must_use]
    pub fn cache_key(identity: &str) -> String {
        format!("journey.cache.{identity}")
    }

    /// Key of `identity`'s progress row.
    #[must_use]
    pub fn progress_key(identity: &str) -> String {
        format!("journey.progress.{identity}")
    }

    /// The completed statistics of `identity`'s last successful scan.
    pub async fn load_cache(&self, identity: &str) -> Option<CacheRecord> {
        let key = Self::cache_key(identity);
        let row: CacheRecord = self.read(&key).await?;
        let verdict = self.check(&key, row.version, &row.identity, identity);
        self.keep_or_discard(&key, verdict, row).await
    }

    /// Persist `data` as `identity`'s cache. Returns whether the row was written.
    pub async fn save_cache(&self, identity: &str, data: &YearlyStats) -> bool {
        let row = CacheRecord {
            version: self.version,
            identity: identity.to_string(),
            saved_at: self.clock.now(),
            data: data.clone(),
        };
        self.write(&Self::cache_key(identity), &row).await
    }

    /// Decide which years a new scan must crawl.
    ///
    /// With a usable cache, every cached year strictly before the current
    /// year is reused and only the current year is crawled. The current year
    /// is never taken from the cache.
    pub async fn determine_scan_scope(&self, identity: &str) -> ScanScope {
        let Some(cache) = self.load_cache(identity).await else {
            return ScanScope::full();
        };
        let current = self.clock.current_year();
        let cached = cache.data.before(current);
        ScanScope {
            cached_years: cached.years(),
            cached: Some(cached),
            years_to_scan: YearsToScan::Only(vec![current]),
        }
    }

    /// Checkpoint an in-flight scan. Returns whether the row was written.
    pub async fn save_progress(
        &self,
        identity: &str,
        stage: Stage,
        last_page: u32,
        total_pages: Option<u32>,
        target_year: Option<i32>,
        data: &YearlyStats,
        extra: Option<&WorksResume>,
    ) -> bool {
        let row = ScanProgress {
            version: self.version,
            identity: identity.to_string(),
            saved_at: self.clock.now(),
            stage,
            last_page,
            total_pages,
            target_year,
            data: data.clone(),
            extra: extra.cloned(),
        };
        let written = self.write(&Self::progress_key(identity), &row).await;
        if written {
            #[cfg(feature = "tracing")]
            tracing::debug!(identity, stage = %stage, last_page, ?total_pages, "checkpoint saved");
        }
        written
    }

    /// The checkpoint of `identity`'s interrupted scan, if it is still fresh.
    pub async fn load_progress(&self, identity: &str) -> Option<ScanProgress> {
        let key = Self::progress_key(identity);
        let row: ScanProgress = self.read(&key).await?;
        let mut verdict = self.check(&key, row.version, &row.identity, identity);
        if verdict.is_ok() {
            let age = self.clock.now() - row.saved_at;
            let limit = TimeDelta::from_std(self.max_age).unwrap_or(TimeDelta::MAX);
            if age > limit {
                verdict = Err(JourneyError::malformed(
                    &key,
                    format!("stale checkpoint ({}s old)", age.num_seconds()),
                ));
            }
        }
        self.keep_or_discard(&key, verdict, row).await
    }

    /// Delete `identity`'s progress row.
    pub async fn clear_progress(&self, identity: &str) {
        self.delete(&Self::progress_key(identity)).await;
    }

    /// Delete `identity`'s cache row.
    pub async fn clear_cache(&self, identity: &str) {
        self.delete(&Self::cache_key(identity)).await;
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.load(key).await {
            Ok(raw) => raw?,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(key, error = %_e, "state read failed; treating row as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(row) => Some(row),
            Err(e) => {
                let err = JourneyError::malformed(key, e.to_string());
                self.discard(key, &err).await;
                None
            }
        }
    }

    fn check(
        &self,
        key: &str,
        version: u32,
        stored_identity: &str,
        identity: &str,
    ) -> Result<(), JourneyError> {
        if version != self.version {
            return Err(JourneyError::malformed(
                key,
                format!("schema version {version}, expected {}", self.version),
            ));
        }
        if stored_identity != identity {
            return Err(JourneyError::malformed(
                key,
                format!("row belongs to {stored_identity}"),
            ));
        }
        Ok(())
    }

    async fn keep_or_discard<T>(
        &self,
        key: &str,
        verdict: Result<(), JourneyError>,
        row: T,
    ) -> Option<T> {
        match verdict {
            Ok(()) => Some(row),
            Err(err) => {
                self.discard(key, &err).await;
                None
            }
        }
    }

    async fn discard(&self, key: &str, _reason: &JourneyError) {
        #[cfg(feature = "tracing")]
        tracing::info!(key, reason = %_reason, "discarding persisted state");
        self.delete(key).await;
    }

    async fn write<T: Serialize>(&self, key: &str, row: &T) -> bool {
        let body = match serde_json::to_string(row) {
            Ok(body) => body,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(key, error = %_e, "state row could not be serialized");
                return false;
            }
        };
        if body.len() > self.max_bytes {
            let _err = JourneyError::StorageQuotaExceeded {
                bytes: body.len(),
                limit: self.max_bytes,
            };
            #[cfg(feature = "tracing")]
            tracing::warn!(key, error = %_err, "state write refused");
            return false;
        }
        match self.backend.store(key, &body).await {
            Ok(()) => true,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(key, error = %_e, "state write failed");
                false
            }
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(_e) = self.backend.remove(key).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(key, error = %_e, "state delete failed");
        }
    }
}
