//! Process-wide failure-mode configuration.
//!
//! The mode is set via the `WARDALLOC_MAY_RETURN_NULL` environment
//! variable: `1` (also `yes`/`true`/`null`) selects `ReturnNull`, anything
//! else — including an absent variable — selects `Terminate`. The variable
//! is read once, before the first allocation consults it, and the resolved
//! mode is immutable for the lifetime of the process.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::policy::FailureMode;

/// Environment variable holding the failure-mode flag.
pub const MODE_ENV_VAR: &str = "WARDALLOC_MAY_RETURN_NULL";

// Atomic cache: 0=unresolved, 1=Terminate, 2=ReturnNull, 255=resolving.
// A non-blocking state machine instead of OnceLock: if resolution itself
// allocates (std::env::var does) and that allocation is rejected, a
// reentrant read must not deadlock; it observes RESOLVING and gets the
// safe default.
static CACHED_MODE: AtomicU8 = AtomicU8::new(0);

const MODE_UNRESOLVED: u8 = 0;
const MODE_TERMINATE: u8 = 1;
const MODE_RETURN_NULL: u8 = 2;
const MODE_RESOLVING: u8 = 255;

fn mode_to_u8(mode: FailureMode) -> u8 {
    match mode {
        FailureMode::Terminate => MODE_TERMINATE,
        FailureMode::ReturnNull => MODE_RETURN_NULL,
    }
}

fn u8_to_mode(v: u8) -> FailureMode {
    match v {
        MODE_RETURN_NULL => FailureMode::ReturnNull,
        _ => FailureMode::Terminate,
    }
}

/// Get the configured failure mode (reads the env var on first call,
/// caches thereafter).
#[must_use]
pub fn failure_mode() -> FailureMode {
    let cached = CACHED_MODE.load(Ordering::Relaxed);

    // Fast path: already resolved.
    if cached != MODE_UNRESOLVED && cached != MODE_RESOLVING {
        return u8_to_mode(cached);
    }

    // Reentrant call during resolution: return the safe default.
    if cached == MODE_RESOLVING {
        return FailureMode::Terminate;
    }

    // Try to claim the resolution slot.
    if CACHED_MODE
        .compare_exchange(
            MODE_UNRESOLVED,
            MODE_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        // Another thread or reentrant call owns resolution.
        let v = CACHED_MODE.load(Ordering::Relaxed);
        return if v != MODE_UNRESOLVED && v != MODE_RESOLVING {
            u8_to_mode(v)
        } else {
            FailureMode::Terminate
        };
    }

    let mode = std::env::var(MODE_ENV_VAR)
        .map(|v| FailureMode::from_str_loose(&v))
        .unwrap_or_default();
    CACHED_MODE.store(mode_to_u8(mode), Ordering::Release);
    mode
}
