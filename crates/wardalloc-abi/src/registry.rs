//! Live-allocation registry.
//!
//! Tracks the user size of every block handed out by the ABI entry points
//! so `ward_allocated_size` can answer for any live pointer. The map is
//! global shared state; a `parking_lot` mutex keeps it consistent under
//! concurrent entry-point calls.

use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::Mutex;

static LIVE: LazyLock<Mutex<HashMap<usize, usize>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

/// Records a block handed out by an entry point.
pub fn register(addr: usize, size: usize) {
    LIVE.lock().insert(addr, size);
}

/// Forgets a block returned to the backing allocator.
pub fn unregister(addr: usize) {
    LIVE.lock().remove(&addr);
}

/// User size of a live block, or `None` for unknown pointers.
#[must_use]
pub fn lookup(addr: usize) -> Option<usize> {
    LIVE.lock().get(&addr).copied()
}

/// Number of live blocks handed out through the ABI.
#[must_use]
pub fn live_count() -> usize {
    LIVE.lock().len()
}
