//! Dispatch timing.

use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};

use dashmap::DashMap;
use serde::Serialize;

/// Wall-clock time spent in one forwarded filter call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElapsedRecord {
    pub tag: String,
    pub target: String,
    pub method: String,
    /// Milliseconds; `0.0` for calls nested inside another dispatch.
    pub elapsed_ms: f64,
}

/// Append-only log of dispatch timings with per-thread nesting depth.
#[derive(Debug, Default)]
pub struct ElapsedLog {
    records: Mutex<Vec<ElapsedRecord>>,
    depth: DashMap<ThreadId, usize>,
}

impl ElapsedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a dispatch on the current thread.
    pub fn enter(&self) -> DispatchGuard<'_> {
        let thread = thread::current().id();
        let outermost = {
            let mut depth = self.depth.entry(thread).or_insert(0);
            *depth += 1;
            *depth == 1
        };
        DispatchGuard {
            log: self,
            thread,
            outermost,
        }
    }

    /// Whether a dispatch is running on the current thread.
    pub fn is_running(&self) -> bool {
        self.depth.contains_key(&thread::current().id())
    }

    pub fn record(&self, record: ElapsedRecord) {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).push(record);
    }

    pub fn records(&self) -> Vec<ElapsedRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Total of every recorded time, in milliseconds.
    pub fn total_ms(&self) -> f64 {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|r| r.elapsed_ms)
            .sum()
    }

    /// One line per record: time, share of the total, tag, target and method.
    pub fn details(&self) -> Vec<String> {
        let records = self.records();
        let total: f64 = records.iter().map(|r| r.elapsed_ms).sum();
        records
            .iter()
            .map(|r| {
                let share = if total > 0.0 { r.elapsed_ms * 100.0 / total } else { 0.0 };
                format!(
                    "{:10.6}ms ({:5.2}%) : [{}] {}->{}",
                    r.elapsed_ms, share, r.tag, r.target, r.method
                )
            })
            .collect()
    }
}

/// Held for the duration of one dispatch.
#[derive(Debug)]
pub struct DispatchGuard<'a> {
    log: &'a ElapsedLog,
    thread: ThreadId,
    outermost: bool,
}

impl DispatchGuard<'_> {
    /// Whether no other dispatch was running on this thread when this one began.
    pub fn is_outermost(&self) -> bool {
        self.outermost
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut depth) = self.log.depth.get_mut(&self.thread) {
            *depth = depth.saturating_sub(1);
        }
        self.log.depth.remove_if(&self.thread, |_, depth| *depth == 0);
    }
}
