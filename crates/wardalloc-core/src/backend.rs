//! Logical allocation backend.
//!
//! Models the page/arena allocator the entry points delegate to once a
//! request passes validation. Allocations are logical offsets, not real
//! memory: enough structure to observe the contracts the front must keep
//! (a rejected resize leaves the old allocation untouched, a serviced
//! resize preserves identity bookkeeping) without any `unsafe`. The real
//! memory path lives in `wardalloc-abi`.

use std::collections::{HashMap, HashSet};

/// Severity of a backend lifecycle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendLogLevel {
    Trace,
    Warn,
    Error,
}

/// Structured backend lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendLogRecord {
    /// Monotonic decision/event id.
    pub decision_id: u64,
    /// Severity level.
    pub level: BackendLogLevel,
    /// API symbol (`alloc`, `free`, `resize`).
    pub symbol: &'static str,
    /// Event kind (`alloc`, `free`, `double_free_detected`, ...).
    pub event: &'static str,
    /// Offset involved in the event.
    pub ptr: Option<usize>,
    /// Size value involved in the event.
    pub size: Option<usize>,
    /// Machine-readable outcome label.
    pub outcome: &'static str,
    /// Snapshot: currently active allocation count.
    pub active_count: usize,
    /// Snapshot: currently allocated user bytes.
    pub total_allocated: usize,
}

/// Logical heap state.
///
/// Offsets start above the zero page so offset 0 stays the null
/// equivalent. Freed blocks of a given size are reused before fresh slab
/// space is carved.
pub struct HeapState {
    /// Active allocation records (offset -> user size).
    active: HashMap<usize, usize>,
    /// Freelists keyed by block size.
    free_by_size: HashMap<usize, Vec<usize>>,
    /// Recently freed offsets, to distinguish double-free from unknown free.
    recently_freed: HashSet<usize>,
    /// Next offset for fresh allocations.
    next_offset: usize,
    /// Monotonic lifecycle decision id.
    next_decision_id: u64,
    /// Structured lifecycle records.
    lifecycle_logs: Vec<BackendLogRecord>,
    /// Total bytes allocated (user-requested).
    total_allocated: usize,
}

impl HeapState {
    /// Creates an empty heap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
            free_by_size: HashMap::new(),
            recently_freed: HashSet::new(),
            next_offset: 0x1000, // Start above zero page
            next_decision_id: 1,
            lifecycle_logs: Vec::new(),
            total_allocated: 0,
        }
    }

    fn record_lifecycle(
        &mut self,
        level: BackendLogLevel,
        symbol: &'static str,
        event: &'static str,
        ptr: Option<usize>,
        size: Option<usize>,
        outcome: &'static str,
    ) {
        let decision_id = self.next_decision_id;
        self.next_decision_id = self.next_decision_id.wrapping_add(1);
        self.lifecycle_logs.push(BackendLogRecord {
            decision_id,
            level,
            symbol,
            event,
            ptr,
            size,
            outcome,
            active_count: self.active.len(),
            total_allocated: self.total_allocated,
        });
    }

    /// Allocates `size` bytes, returning a logical offset or `None` when
    /// the offset space is exhausted.
    pub fn alloc(&mut self, size: usize) -> Option<usize> {
        let size = size.max(1);

        if let Some(offset) = self.free_by_size.get_mut(&size).and_then(Vec::pop) {
            self.active.insert(offset, size);
            self.recently_freed.remove(&offset);
            self.total_allocated += size;
            self.record_lifecycle(
                BackendLogLevel::Trace,
                "alloc",
                "alloc",
                Some(offset),
                Some(size),
                "success",
            );
            return Some(offset);
        }

        let offset = self.next_offset;
        let Some(next_offset) = self.next_offset.checked_add(size) else {
            self.record_lifecycle(
                BackendLogLevel::Warn,
                "alloc",
                "offset_space_exhausted",
                None,
                Some(size),
                "oom",
            );
            return None;
        };
        self.next_offset = next_offset;
        self.active.insert(offset, size);
        self.total_allocated += size;
        self.record_lifecycle(
            BackendLogLevel::Trace,
            "alloc",
            "alloc",
            Some(offset),
            Some(size),
            "success",
        );
        Some(offset)
    }

    /// Frees a previously allocated block. No-op for offset 0.
    pub fn free(&mut self, ptr: usize) {
        if ptr == 0 {
            self.record_lifecycle(
                BackendLogLevel::Trace,
                "free",
                "free_null",
                Some(ptr),
                None,
                "noop",
            );
            return;
        }

        let Some(size) = self.active.remove(&ptr) else {
            let event = if self.recently_freed.contains(&ptr) {
                "double_free_detected"
            } else {
                "unknown_free_pointer"
            };
            self.record_lifecycle(BackendLogLevel::Warn, "free", event, Some(ptr), None, "ignored");
            return;
        };

        match self.total_allocated.checked_sub(size) {
            Some(next) => self.total_allocated = next,
            None => {
                self.total_allocated = 0;
                self.record_lifecycle(
                    BackendLogLevel::Error,
                    "free",
                    "invariant_total_allocated_underflow",
                    Some(ptr),
                    Some(size),
                    "recovered",
                );
            }
        }
        self.free_by_size.entry(size).or_default().push(ptr);
        self.recently_freed.insert(ptr);
        self.record_lifecycle(
            BackendLogLevel::Trace,
            "free",
            "free",
            Some(ptr),
            Some(size),
            "success",
        );
    }

    /// Looks up the user size of an active allocation.
    #[must_use]
    pub fn lookup(&self, ptr: usize) -> Option<usize> {
        self.active.get(&ptr).copied()
    }

    /// Number of active allocations.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Total user bytes currently allocated.
    #[must_use]
    pub fn total_allocated(&self) -> usize {
        self.total_allocated
    }

    /// Returns a view of lifecycle records.
    #[must_use]
    pub fn lifecycle_logs(&self) -> &[BackendLogRecord] {
        &self.lifecycle_logs
    }

    /// Drains lifecycle records.
    pub fn drain_lifecycle_logs(&mut self) -> Vec<BackendLogRecord> {
        std::mem::take(&mut self.lifecycle_logs)
    }
}

impl Default for HeapState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free_round_trip() {
        let mut heap = HeapState::new();
        let ptr = heap.alloc(100).unwrap();
        assert_ne!(ptr, 0);
        assert_eq!(heap.lookup(ptr), Some(100));
        assert_eq!(heap.active_count(), 1);
        assert_eq!(heap.total_allocated(), 100);

        heap.free(ptr);
        assert_eq!(heap.lookup(ptr), None);
        assert_eq!(heap.active_count(), 0);
        assert_eq!(heap.total_allocated(), 0);
    }

    #[test]
    fn zero_size_alloc_is_serviced() {
        let mut heap = HeapState::new();
        let ptr = heap.alloc(0).unwrap();
        assert_eq!(heap.lookup(ptr), Some(1));
    }

    #[test]
    fn freed_block_is_reused_for_same_size() {
        let mut heap = HeapState::new();
        let ptr = heap.alloc(64).unwrap();
        heap.free(ptr);
        assert_eq!(heap.alloc(64), Some(ptr));
    }

    #[test]
    fn free_null_and_unknown_are_ignored() {
        let mut heap = HeapState::new();
        heap.free(0);
        heap.free(0xDEAD);
        assert_eq!(heap.active_count(), 0);
    }

    #[test]
    fn offset_space_exhaustion_reports_oom() {
        let mut heap = HeapState::new();
        heap.next_offset = usize::MAX;
        assert_eq!(heap.alloc(32), None);
        assert!(
            heap.lifecycle_logs()
                .iter()
                .any(|r| r.event == "offset_space_exhausted" && r.outcome == "oom")
        );
    }

    #[test]
    fn double_free_is_classified() {
        let mut heap = HeapState::new();
        let ptr = heap.alloc(16).unwrap();
        heap.free(ptr);
        heap.free(ptr);
        let logs = heap.drain_lifecycle_logs();
        assert!(
            logs.iter().any(|r| {
                r.level == BackendLogLevel::Warn && r.event == "double_free_detected"
            })
        );
    }

    #[test]
    fn lifecycle_decision_ids_are_monotonic() {
        let mut heap = HeapState::new();
        let ptr = heap.alloc(8).unwrap();
        heap.free(ptr);
        let logs = heap.drain_lifecycle_logs();
        assert!(!logs.is_empty());
        assert!(logs.windows(2).all(|w| w[0].decision_id < w[1].decision_id));
    }
}
