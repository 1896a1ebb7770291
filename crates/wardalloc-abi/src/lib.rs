//! # wardalloc-abi
//!
//! Real-memory `extern "C"` boundary for the wardalloc allocator front.
//!
//! Every entry point applies the core size validator and failure policy
//! before any byte of memory moves; in-bounds requests delegate to the
//! `libc` allocator. Symbols are prefixed (`ward_malloc`, `ward_new`, ...)
//! so the crate can be linked next to the system allocator without
//! shadowing it.

pub mod malloc_abi;
pub mod registry;

pub use malloc_abi::{
    guarded_calloc, guarded_free, guarded_malloc, guarded_new, guarded_new_nothrow,
    guarded_realloc, ward_allocated_size, ward_calloc, ward_free, ward_malloc, ward_new,
    ward_new_nothrow, ward_realloc,
};
