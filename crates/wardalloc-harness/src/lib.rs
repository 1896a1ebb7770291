//! Oversize-allocation scenarios.
//!
//! Each scenario drives one allocation entry point with a request above
//! the allocator's maximum supported size, through the process-wide
//! configured failure mode. The `oversize` binary runs one scenario per
//! process so the terminate outcomes can be observed at the process
//! boundary.

use std::ffi::c_void;

use clap::ValueEnum;

use wardalloc_abi::{ward_calloc, ward_free, ward_malloc, ward_new, ward_new_nothrow, ward_realloc};
use wardalloc_core::MAX_ALLOWED_ALLOC_SIZE;

/// One byte past the largest serviceable request.
pub const OVERSIZE: usize = MAX_ALLOWED_ALLOC_SIZE + 1;

/// An oversize request shape, one per allocation entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Plain allocate of an oversize request.
    Malloc,
    /// Zeroed allocate whose count*elem product is above the limit.
    Calloc,
    /// Zeroed allocate whose count*elem product overflows `usize`.
    CallocOverflow,
    /// Resize from a null pointer to an oversize request.
    Realloc,
    /// Resize of a live 100-byte block to an oversize request; the block
    /// must survive a rejected resize byte-for-byte.
    ReallocAfterMalloc,
    /// Throwing construction allocate; never returns null.
    New,
    /// Non-throwing construction allocate.
    NewNothrow,
}

impl Scenario {
    /// Every scenario, in the order the original oversize matrix runs them.
    pub const ALL: [Self; 7] = [
        Self::Malloc,
        Self::Calloc,
        Self::CallocOverflow,
        Self::Realloc,
        Self::ReallocAfterMalloc,
        Self::New,
        Self::NewNothrow,
    ];

    /// Command-line name of the scenario.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Malloc => "malloc",
            Self::Calloc => "calloc",
            Self::CallocOverflow => "calloc-overflow",
            Self::Realloc => "realloc",
            Self::ReallocAfterMalloc => "realloc-after-malloc",
            Self::New => "new",
            Self::NewNothrow => "new-nothrow",
        }
    }

    /// True if the entry point's contract permits a null result.
    #[must_use]
    pub const fn may_return_null(self) -> bool {
        !matches!(self, Self::New)
    }

    /// Runs the scenario and returns the resulting address (0 for null).
    ///
    /// Under terminate-mode configuration this does not return.
    #[must_use]
    pub fn run(self) -> usize {
        let out: *mut c_void = match self {
            // SAFETY: each call hands a fresh request to a guarded entry
            // point; live pointers passed to resize/free come from
            // ward_malloc in the same arm.
            Self::Malloc => unsafe { ward_malloc(OVERSIZE) },
            Self::Calloc => unsafe { ward_calloc(OVERSIZE / 4 + 1, 4) },
            Self::CallocOverflow => unsafe { ward_calloc(4096, usize::MAX / 4096 + 10) },
            Self::Realloc => unsafe { ward_realloc(std::ptr::null_mut(), OVERSIZE) },
            Self::ReallocAfterMalloc => unsafe {
                let existing = ward_malloc(100);
                assert!(!existing.is_null());
                existing.cast::<u8>().write(42);

                let out = ward_realloc(existing, OVERSIZE);

                // Rejected resize must leave the original block intact.
                assert_eq!(existing.cast::<u8>().read(), 42);
                ward_free(existing);
                out
            },
            Self::New => unsafe { ward_new(OVERSIZE) },
            Self::NewNothrow => unsafe { ward_new_nothrow(OVERSIZE) },
        };
        out as usize
    }
}
