//! Per-client, per-route fixed-window rate limiting.
//!
//! # Responsibilities
//! - Count requests per `(client, route)` inside a window
//! - Deny once the route's quota is used, reporting seconds until reset
//! - Sweep stale records inline once the store grows past a threshold
//!
//! # Design Decisions
//! - Limits are supplied by the caller per route, never hard-coded here
//! - The store is injected, so tests get a fresh one and a shared cache
//!   can stand in for multi-instance deployments
//! - Counting is per process: several instances each keep their own quota
//! - Client identity comes from proxy headers and can be spoofed when the
//!   service is reachable without a trusted proxy in front

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::observability::metrics;

/// Default record count that triggers an inline sweep.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 1000;

/// Key of one rate-limit record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    pub client_id: String,
    pub route_key: String,
}

impl RateLimitKey {
    pub fn new(client_id: impl Into<String>, route_key: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            route_key: route_key.into(),
        }
    }
}

/// Request count inside the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub window_start: Instant,
    pub reset_time: Instant,
    pub last_request: Instant,
}

impl RateLimitRecord {
    fn fresh(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            window_start: now,
            reset_time: now + window,
            last_request: now,
        }
    }
}

/// Outcome of [`RequestGate::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied { retry_after_secs: u64 },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Storage for rate-limit records.
///
/// `update` must apply its closure atomically with respect to other calls for
/// the same key; two concurrent requests must never both see the pre-update
/// count.
pub trait RateLimitStore: Send + Sync {
    fn get(&self, key: &RateLimitKey) -> Option<RateLimitRecord>;

    fn set(&self, key: RateLimitKey, record: RateLimitRecord);

    /// Atomic read-modify-write of one record.
    fn update(
        &self,
        key: &RateLimitKey,
        apply: &mut dyn FnMut(Option<RateLimitRecord>) -> (RateLimitRecord, Admission),
    ) -> Admission;

    /// Drop records whose own window ended before `now`. Returns how many went.
    fn sweep(&self, now: Instant) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    records: DashMap<RateLimitKey, RateLimitRecord>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    fn get(&self, key: &RateLimitKey) -> Option<RateLimitRecord> {
        self.records.get(key).map(|r| *r.value())
    }

    fn set(&self, key: RateLimitKey, record: RateLimitRecord) {
        self.records.insert(key, record);
    }

    fn update(
        &self,
        key: &RateLimitKey,
        apply: &mut dyn FnMut(Option<RateLimitRecord>) -> (RateLimitRecord, Admission),
    ) -> Admission {
        // The entry guard holds the shard lock for the whole read-modify-write.
        match self.records.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let (record, admission) = apply(Some(*entry.get()));
                entry.insert(record);
                admission
            }
            Entry::Vacant(entry) => {
                let (record, admission) = apply(None);
                entry.insert(record);
                admission
            }
        }
    }

    fn sweep(&self, now: Instant) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| record.reset_time >= now);
        before.saturating_sub(self.records.len())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// The request gate: decides whether a client may submit to a route.
#[derive(Clone)]
pub struct RequestGate {
    store: Arc<dyn RateLimitStore>,
    sweep_threshold: usize,
}

impl std::fmt::Debug for RequestGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGate")
            .field("records", &self.store.len())
            .field("sweep_threshold", &self.sweep_threshold)
            .finish()
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new(Arc::new(MemoryRateLimitStore::new()), DEFAULT_SWEEP_THRESHOLD)
    }
}

impl RequestGate {
    pub fn new(store: Arc<dyn RateLimitStore>, sweep_threshold: usize) -> Self {
        Self {
            store,
            sweep_threshold,
        }
    }

    /// Admit or deny one request, using the current time.
    pub fn admit(
        &self,
        client_id: &str,
        route_key: &str,
        max_requests: u32,
        window: Duration,
    ) -> Admission {
        self.admit_at(client_id, route_key, max_requests, window, Instant::now())
    }

    /// Admit or deny one request observed at `now`.
    pub fn admit_at(
        &self,
        client_id: &str,
        route_key: &str,
        max_requests: u32,
        window: Duration,
        now: Instant,
    ) -> Admission {
        let key = RateLimitKey::new(client_id, route_key);

        let admission = self.store.update(&key, &mut |existing| match existing {
            None => (RateLimitRecord::fresh(now, window), Admission::Allowed),
            Some(record) if now > record.reset_time => {
                (RateLimitRecord::fresh(now, window), Admission::Allowed)
            }
            Some(record) if record.count >= max_requests => {
                let remaining = record.reset_time.saturating_duration_since(now);
                let retry_after_secs = ceil_secs(remaining).max(1);
                (record, Admission::Denied { retry_after_secs })
            }
            Some(mut record) => {
                record.count += 1;
                record.last_request = now;
                (record, Admission::Allowed)
            }
        });

        let records = self.store.len();
        if records > self.sweep_threshold {
            // Routes share the store; each record expires on its own window.
            let removed = self.store.sweep(now);
            tracing::debug!(removed, remaining = records.saturating_sub(removed), "Swept rate-limit records");
        }
        metrics::record_rate_limit_records(self.store.len());

        admission
    }

    /// Number of live records.
    pub fn records(&self) -> usize {
        self.store.len()
    }

    /// Inspect a record (tests and diagnostics).
    pub fn record(&self, client_id: &str, route_key: &str) -> Option<RateLimitRecord> {
        self.store.get(&RateLimitKey::new(client_id, route_key))
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let millis = d.as_millis() as u64;
    millis.div_ceil(1000)
}
