//! Run Metrics Module
//!
//! Hit/miss counting and process-level measurements kept outside the cache
//! core. Callers wrap `Cache::get` and record the outcome here.

use std::time::{Duration, Instant};

use serde::Serialize;
use sysinfo::System;

use crate::cache::{Cache, EvictionPolicy};

// == Hit/Miss Counter ==
/// Tracks lookup outcomes and evictions observed by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HitMissCounter {
    /// Number of lookups that found a value
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of entries displaced by `put`
    pub evictions: u64,
}

impl HitMissCounter {
    // == Constructor ==
    /// Creates a new counter with all values at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one lookup.
    pub fn record_lookup(&mut self, found: bool) {
        if found {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn total_lookups(&self) -> u64 {
        self.hits + self.misses
    }

    // == Hit Rate ==
    /// Calculates the hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        match self.total_lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    /// Complement of [`hit_rate`](Self::hit_rate); 0.0 before any lookup.
    pub fn miss_rate(&self) -> f64 {
        match self.total_lookups() {
            0 => 0.0,
            total => self.misses as f64 / total as f64,
        }
    }
}

// == Run Timer ==
/// Wall-clock timer started at the beginning of a run.
///
/// Measures elapsed real time, not CPU time.
#[derive(Debug, Clone, Copy)]
pub struct RunTimer {
    started: Instant,
}

impl RunTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Freezes the counters, cache shape and process measurements into a report.
    pub fn finish(&self, counter: &HitMissCounter, cache: &Cache) -> RunReport {
        RunReport {
            policy: cache.policy(),
            entries: cache.len(),
            longest_chain: cache.longest_chain(),
            counter: counter.clone(),
            hit_rate: counter.hit_rate(),
            elapsed_secs: self.elapsed().as_secs_f64(),
            memory_kib: resident_memory_kib(),
        }
    }
}

// == Run Report ==
/// Summary printed when an input run ends.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub policy: EvictionPolicy,
    /// Live entries at the end of the run
    pub entries: usize,
    /// Longest index bucket chain at the end of the run
    pub longest_chain: usize,
    #[serde(flatten)]
    pub counter: HitMissCounter,
    pub hit_rate: f64,
    /// Elapsed wall-clock time
    pub elapsed_secs: f64,
    /// Resident memory of this process, if it could be sampled
    pub memory_kib: Option<u64>,
}

impl RunReport {
    /// Renders the report as a fixed-width table.
    pub fn render_table(&self) -> String {
        let memory = self
            .memory_kib
            .map(|kib| format!("{} KB", kib))
            .unwrap_or_else(|| "n/a".to_string());
        let rows = [
            ("Eviction policy", self.policy.to_string()),
            ("Live entries", self.entries.to_string()),
            ("Longest bucket chain", self.longest_chain.to_string()),
            ("Total number of cache hits", self.counter.hits.to_string()),
            ("Total number of cache miss", self.counter.misses.to_string()),
            ("Evictions", self.counter.evictions.to_string()),
            ("Hit ratio", format!("{:.2}%", self.counter.hit_rate() * 100.0)),
            ("Miss ratio", format!("{:.2}%", self.counter.miss_rate() * 100.0)),
            ("Elapsed wall time", format!("{:.6} s", self.elapsed_secs)),
            ("Resident memory", memory),
        ];

        let rule = "-".repeat(55);
        let mut out = String::from("Cache Metrics:\n");
        out.push_str(&rule);
        out.push('\n');
        for (label, value) in rows {
            out.push_str(&format!("| {:<30} | {:<18} |\n", label, value));
        }
        out.push_str(&rule);
        out
    }
}

/// Samples the resident memory of the current process in KiB.
///
/// Returns None when the platform does not expose process information.
pub fn resident_memory_kib() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    if !system.refresh_process(pid) {
        return None;
    }
    system.process(pid).map(|process| process.memory() / 1024)
}
