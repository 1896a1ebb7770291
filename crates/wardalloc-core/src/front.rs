//! Allocation entry points.
//!
//! One front owns the failure mode and the backend. Each entry point is a
//! single-step state machine: validate, then either delegate to the
//! backend or resolve the rejection through the shared policy. The mode is
//! injected at construction rather than read ad hoc, so the validator and
//! policy stay independently testable.

use crate::backend::HeapState;
use crate::config;
use crate::limit::{RejectReason, Verdict, validate_product, validate_size};
use crate::policy::{AllocOrigin, FailureAction, FailureMode, on_rejected};
use crate::report;

/// Allocation front over the logical backend.
pub struct AllocFront {
    mode: FailureMode,
    heap: HeapState,
}

impl AllocFront {
    /// Creates a front with an explicit failure mode.
    #[must_use]
    pub fn new(mode: FailureMode) -> Self {
        Self {
            mode,
            heap: HeapState::new(),
        }
    }

    /// Creates a front configured from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(config::failure_mode())
    }

    /// The failure mode this front was constructed with.
    #[must_use]
    pub fn mode(&self) -> FailureMode {
        self.mode
    }

    /// Read access to the backend, for bookkeeping assertions.
    #[must_use]
    pub fn heap(&self) -> &HeapState {
        &self.heap
    }

    /// Mutable backend access (lifecycle log draining).
    pub fn heap_mut(&mut self) -> &mut HeapState {
        &mut self.heap
    }

    /// Resolves a rejected request. Returns `None` only when the policy
    /// permits a null result; otherwise does not return.
    fn resolve_rejected(&self, origin: AllocOrigin, reason: RejectReason) -> Option<usize> {
        match on_rejected(self.mode, origin) {
            FailureAction::ReturnNull => None,
            FailureAction::Terminate => report::die(origin, &reason),
        }
    }

    /// Plain allocate. Returns the new offset, or `None` under the
    /// `ReturnNull` mode when the request is rejected.
    pub fn allocate(&mut self, size: usize) -> Option<usize> {
        match validate_size(size) {
            Verdict::Accepted(total) => self.heap.alloc(total),
            Verdict::Rejected(reason) => self.resolve_rejected(AllocOrigin::Plain, reason),
        }
    }

    /// Zero-filled allocate of `count` elements of `elem_size` bytes.
    ///
    /// The product is validated with overflow-checked arithmetic; an
    /// overflowing product never reaches the backend. In the logical model
    /// zero-filling is implicit; the ABI layer does the real `memset`.
    pub fn allocate_zeroed(&mut self, count: usize, elem_size: usize) -> Option<usize> {
        match validate_product(count, elem_size) {
            Verdict::Accepted(total) => self.heap.alloc(total),
            Verdict::Rejected(reason) => self.resolve_rejected(AllocOrigin::Zeroed, reason),
        }
    }

    /// Resize an existing allocation to `new_size` bytes.
    ///
    /// `resize(0, n)` allocates; `resize(ptr, 0)` frees and returns `None`.
    /// When the new size is rejected and the policy returns null, the
    /// existing allocation stays fully valid and owned by the caller.
    pub fn resize(&mut self, ptr: usize, new_size: usize) -> Option<usize> {
        if ptr == 0 {
            return match validate_size(new_size) {
                Verdict::Accepted(total) => self.heap.alloc(total),
                Verdict::Rejected(reason) => self.resolve_rejected(AllocOrigin::Resize, reason),
            };
        }
        if new_size == 0 {
            self.heap.free(ptr);
            return None;
        }

        match validate_size(new_size) {
            Verdict::Rejected(reason) => {
                // The backend is not consulted: `ptr` keeps its address,
                // size, and contents, and the caller must still release it.
                self.resolve_rejected(AllocOrigin::Resize, reason)
            }
            Verdict::Accepted(total) => {
                // Allocate-then-free so a backend failure also leaves the
                // old block intact.
                let new_ptr = self.heap.alloc(total)?;
                self.heap.free(ptr);
                Some(new_ptr)
            }
        }
    }

    /// Object-construction allocate with the throwing contract.
    ///
    /// Never returns a null equivalent: a rejected or unserviceable
    /// request terminates the process regardless of the global mode.
    pub fn construct(&mut self, size: usize) -> usize {
        match validate_size(size) {
            Verdict::Accepted(total) => match self.heap.alloc(total) {
                Some(ptr) => ptr,
                None => report::die_out_of_memory(AllocOrigin::ConstructThrowing, total),
            },
            Verdict::Rejected(reason) => {
                debug_assert_eq!(
                    on_rejected(self.mode, AllocOrigin::ConstructThrowing),
                    FailureAction::Terminate
                );
                report::die(AllocOrigin::ConstructThrowing, &reason)
            }
        }
    }

    /// Object-construction allocate with the no-throw contract. Behaves
    /// like [`Self::allocate`] under rejection, with its own origin tag.
    pub fn construct_nothrow(&mut self, size: usize) -> Option<usize> {
        match validate_size(size) {
            Verdict::Accepted(total) => self.heap.alloc(total),
            Verdict::Rejected(reason) => {
                self.resolve_rejected(AllocOrigin::ConstructNonThrowing, reason)
            }
        }
    }

    /// Releases an allocation made through any entry point.
    pub fn release(&mut self, ptr: usize) {
        self.heap.free(ptr);
    }
}
