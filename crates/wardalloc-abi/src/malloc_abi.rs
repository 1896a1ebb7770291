//! ABI layer for the guarded allocation family.
//!
//! Each `ward_*` symbol is a thin `extern "C"` wrapper over a
//! mode-parameterized `guarded_*` function; the wrappers inject the
//! process-wide failure mode, the inner functions take it explicitly so
//! tests can drive the ReturnNull paths in-process without touching the
//! environment. Rejected requests never reach the `libc` backend: a
//! rejected resize in particular leaves the old block byte-for-byte
//! intact because `libc::realloc` is never called for it.

use std::ffi::c_void;

use wardalloc_core::limit::{validate_product, validate_size};
use wardalloc_core::policy::{AllocOrigin, FailureAction, FailureMode, on_rejected};
use wardalloc_core::{RejectReason, Verdict, failure_mode, report};

use crate::registry;

/// Resolves a rejection to null or termination.
fn resolve_rejected(mode: FailureMode, origin: AllocOrigin, reason: RejectReason) -> *mut c_void {
    match on_rejected(mode, origin) {
        FailureAction::ReturnNull => std::ptr::null_mut(),
        FailureAction::Terminate => report::die(origin, &reason),
    }
}

/// Plain allocate with an explicit failure mode.
#[must_use]
pub fn guarded_malloc(mode: FailureMode, size: usize) -> *mut c_void {
    match validate_size(size) {
        Verdict::Accepted(total) => {
            // SAFETY: total is validated and nonzero.
            let ptr = unsafe { libc::malloc(total) };
            if !ptr.is_null() {
                registry::register(ptr as usize, total);
            }
            ptr
        }
        Verdict::Rejected(reason) => resolve_rejected(mode, AllocOrigin::Plain, reason),
    }
}

/// Zero-filled count*elem allocate with an explicit failure mode.
#[must_use]
pub fn guarded_calloc(mode: FailureMode, nmemb: usize, size: usize) -> *mut c_void {
    match validate_product(nmemb, size) {
        Verdict::Accepted(total) => {
            // SAFETY: total is validated and nonzero.
            let ptr = unsafe { libc::malloc(total) };
            if !ptr.is_null() {
                // SAFETY: ptr is valid for `total` bytes per the malloc contract.
                unsafe { std::ptr::write_bytes(ptr.cast::<u8>(), 0, total) };
                registry::register(ptr as usize, total);
            }
            ptr
        }
        Verdict::Rejected(reason) => resolve_rejected(mode, AllocOrigin::Zeroed, reason),
    }
}

/// Resize with an explicit failure mode.
///
/// # Safety
///
/// `ptr` must be null or a live pointer previously returned by one of the
/// guarded entry points.
#[must_use]
pub unsafe fn guarded_realloc(mode: FailureMode, ptr: *mut c_void, size: usize) -> *mut c_void {
    // resize(NULL, size) allocates; the origin stays Resize for diagnostics.
    if ptr.is_null() {
        return match validate_size(size) {
            Verdict::Accepted(total) => {
                // SAFETY: total is validated and nonzero.
                let out = unsafe { libc::malloc(total) };
                if !out.is_null() {
                    registry::register(out as usize, total);
                }
                out
            }
            Verdict::Rejected(reason) => resolve_rejected(mode, AllocOrigin::Resize, reason),
        };
    }

    // resize(ptr, 0) frees and returns null.
    if size == 0 {
        // SAFETY: caller guarantees ptr is live.
        unsafe { guarded_free(ptr) };
        return std::ptr::null_mut();
    }

    match validate_size(size) {
        Verdict::Rejected(reason) => {
            // The backend is not consulted: the old block keeps its
            // address, size, and contents, and the caller still owns it.
            resolve_rejected(mode, AllocOrigin::Resize, reason)
        }
        Verdict::Accepted(total) => {
            let old_addr = ptr as usize;
            // SAFETY: caller guarantees ptr is live; total is validated.
            let out = unsafe { libc::realloc(ptr, total) };
            if !out.is_null() {
                registry::unregister(old_addr);
                registry::register(out as usize, total);
            }
            out
        }
    }
}

/// Releases a block allocated by any guarded entry point.
///
/// # Safety
///
/// `ptr` must be null or a live pointer previously returned by one of the
/// guarded entry points, not yet freed.
pub unsafe fn guarded_free(ptr: *mut c_void) {
    if ptr.is_null() {
        return;
    }
    registry::unregister(ptr as usize);
    // SAFETY: caller guarantees ptr came from the libc allocator and is live.
    unsafe { libc::free(ptr) };
}

/// Object-construction allocate with the throwing contract.
///
/// Never returns null: rejected or unserviceable requests terminate the
/// process regardless of `mode`.
#[must_use]
pub fn guarded_new(mode: FailureMode, size: usize) -> *mut c_void {
    match validate_size(size) {
        Verdict::Accepted(total) => {
            // SAFETY: total is validated and nonzero.
            let ptr = unsafe { libc::malloc(total) };
            if ptr.is_null() {
                report::die_out_of_memory(AllocOrigin::ConstructThrowing, total);
            }
            registry::register(ptr as usize, total);
            ptr
        }
        Verdict::Rejected(reason) => {
            debug_assert_eq!(
                on_rejected(mode, AllocOrigin::ConstructThrowing),
                FailureAction::Terminate
            );
            report::die(AllocOrigin::ConstructThrowing, &reason)
        }
    }
}

/// Object-construction allocate with the no-throw contract.
#[must_use]
pub fn guarded_new_nothrow(mode: FailureMode, size: usize) -> *mut c_void {
    match validate_size(size) {
        Verdict::Accepted(total) => {
            // SAFETY: total is validated and nonzero.
            let ptr = unsafe { libc::malloc(total) };
            if !ptr.is_null() {
                registry::register(ptr as usize, total);
            }
            ptr
        }
        Verdict::Rejected(reason) => {
            resolve_rejected(mode, AllocOrigin::ConstructNonThrowing, reason)
        }
    }
}

// ---------------------------------------------------------------------------
// extern "C" surface
// ---------------------------------------------------------------------------

/// Guarded `malloc` -- allocates `size` bytes of uninitialized memory.
///
/// Returns null on a rejected request when the process-wide mode permits
/// it; terminates otherwise.
///
/// # Safety
///
/// Caller must eventually `ward_free` the returned pointer exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ward_malloc(size: usize) -> *mut c_void {
    guarded_malloc(failure_mode(), size)
}

/// Guarded `calloc` -- allocates zeroed memory for `nmemb` elements of
/// `size` bytes each. The product is computed with overflow-checked
/// arithmetic; an overflowing product is rejected, never wrapped.
///
/// # Safety
///
/// Caller must eventually `ward_free` the returned pointer exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ward_calloc(nmemb: usize, size: usize) -> *mut c_void {
    guarded_calloc(failure_mode(), nmemb, size)
}

/// Guarded `realloc` -- resizes a previously allocated block.
///
/// On a rejected new size the original block stays valid and unchanged.
///
/// # Safety
///
/// `ptr` must be null or a pointer previously returned by a guarded entry
/// point.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ward_realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
    // SAFETY: forwarded caller contract.
    unsafe { guarded_realloc(failure_mode(), ptr, size) }
}

/// Guarded `free` -- releases a block from any guarded entry point. Null
/// is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a live pointer previously returned by a guarded
/// entry point.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ward_free(ptr: *mut c_void) {
    // SAFETY: forwarded caller contract.
    unsafe { guarded_free(ptr) }
}

/// Guarded throwing `operator new` equivalent. Never returns null.
///
/// # Safety
///
/// Caller must eventually `ward_free` the returned pointer exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ward_new(size: usize) -> *mut c_void {
    guarded_new(failure_mode(), size)
}

/// Guarded non-throwing `operator new(nothrow)` equivalent.
///
/// # Safety
///
/// Caller must eventually `ward_free` the returned pointer exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ward_new_nothrow(size: usize) -> *mut c_void {
    guarded_new_nothrow(failure_mode(), size)
}

/// User size of a live guarded allocation, or 0 for unknown pointers.
///
/// # Safety
///
/// Sound for any pointer value; the registry is only consulted.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ward_allocated_size(ptr: *mut c_void) -> usize {
    registry::lookup(ptr as usize).unwrap_or(0)
}
