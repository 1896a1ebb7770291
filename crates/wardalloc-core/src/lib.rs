//! # wardalloc-core
//!
//! Safe Rust core of the wardalloc guarded allocator front.
//!
//! This crate decides, for every allocation request larger than the
//! allocator's maximum supported size (or whose total-size computation
//! would overflow), whether the process terminates or the call returns
//! null. The actual memory backend is pluggable; the logical backend in
//! [`backend`] models allocations as offsets so the policy surface can be
//! tested without touching real memory. No `unsafe` code is permitted at
//! the crate level.

#![deny(unsafe_code)]

pub mod backend;
pub mod config;
pub mod front;
pub mod limit;
pub mod policy;
pub mod report;

pub use config::failure_mode;
pub use front::AllocFront;
pub use limit::{MAX_ALLOWED_ALLOC_SIZE, RejectReason, Verdict};
pub use policy::{AllocOrigin, FailureAction, FailureMode};
