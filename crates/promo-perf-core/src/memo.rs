//! Caller-owned memoisation of performance results.
//!
//! The cache lives wherever the caller keeps it and is passed in
//! explicitly. Entries expire after a fixed time-to-live and the oldest
//! insertion is evicted once capacity is reached. Nothing here is shared
//! across processes, so a hit is only ever a performance shortcut.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::performance::{evaluate_performance, PerformanceInput, PerformanceResult};
use crate::types::ComputationOutput;
use crate::PromoPerfResult;

/// SHA-256 of the input's canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_input(input: &PerformanceInput) -> PromoPerfResult<Self> {
        let canonical = serde_json::to_vec(input)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(CacheKey(format!("{:x}", hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The whole envelope is stored so a hit carries the same warnings,
/// methodology and assumptions as the miss that filled it.
struct CacheEntry {
    output: ComputationOutput<PerformanceResult>,
    stored_at: Instant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

pub struct PerformanceCache {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Insertion order, oldest first
    order: VecDeque<CacheKey>,
    ttl: Duration,
    capacity: usize,
    stats: CacheStats,
}

impl PerformanceCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            ttl,
            capacity: capacity.max(1),
            stats: CacheStats::default(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.capacity)
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<ComputationOutput<PerformanceResult>> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(
        &mut self,
        key: &CacheKey,
        now: Instant,
    ) -> Option<ComputationOutput<PerformanceResult>> {
        let expired = match self.entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                self.stats.hits += 1;
                tracing::debug!(key = key.as_str(), "performance cache hit");
                return Some(entry.output.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.remove(key);
        }
        self.stats.misses += 1;
        tracing::debug!(key = key.as_str(), expired, "performance cache miss");
        None
    }

    pub fn insert(&mut self, key: CacheKey, output: ComputationOutput<PerformanceResult>) {
        self.insert_at(key, output, Instant::now());
    }

    pub fn insert_at(
        &mut self,
        key: CacheKey,
        output: ComputationOutput<PerformanceResult>,
        now: Instant,
    ) {
        if self.entries.contains_key(&key) {
            self.remove(&key);
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    self.stats.evictions += 1;
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            CacheEntry {
                output,
                stored_at: now,
            },
        );
    }

    fn remove(&mut self, key: &CacheKey) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats
        }
    }
}

impl Default for PerformanceCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// [`evaluate_performance`] with memoisation through `cache`.
pub fn evaluate_performance_cached(
    cache: &mut PerformanceCache,
    input: &PerformanceInput,
) -> PromoPerfResult<ComputationOutput<PerformanceResult>> {
    let start = Instant::now();
    let key = CacheKey::for_input(input)?;

    if let Some(mut output) = cache.get(&key) {
        output.metadata.computation_time_us = start.elapsed().as_micros() as u64;
        return Ok(output);
    }

    let output = evaluate_performance(input)?;
    cache.insert(key, output.clone());
    Ok(output)
}
