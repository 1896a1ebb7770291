//! Size validation.
//!
//! Every allocation entry point funnels its requested size through
//! [`validate_size`] or [`validate_product`] before any backend call. The
//! verdict is a pure function of the request and the limit: no policy
//! lookup, no logging, no allocation happens here.

use thiserror::Error;

/// Largest request the allocator will service, in bytes.
///
/// Requests of exactly this size are accepted; one byte more is rejected.
pub const MAX_ALLOWED_ALLOC_SIZE: usize = 1 << 40;

/// Why a request was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The computed total size is strictly above the supported maximum.
    #[error("requested allocation size {requested:#x} exceeds maximum supported size {limit:#x}")]
    SizeExceeded { requested: usize, limit: usize },
    /// The `count * elem_size` product does not fit in `usize`.
    ///
    /// Classified as exceeding the limit: a wrapped product must never be
    /// allowed to pass as a small request.
    #[error("allocation of {count} elements of {elem_size} bytes overflows the address space")]
    SizeOverflow { count: usize, elem_size: usize },
}

/// Outcome of validating a request.
///
/// `Accepted` carries the total byte count the backend should service
/// (zero-size requests are bumped to one byte, matching `malloc(0)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted(usize),
    Rejected(RejectReason),
}

impl Verdict {
    /// True if the request passed validation.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Validates a single-size request against [`MAX_ALLOWED_ALLOC_SIZE`].
#[must_use]
pub fn validate_size(size: usize) -> Verdict {
    validate_size_with_limit(size, MAX_ALLOWED_ALLOC_SIZE)
}

/// Validates a `count * elem_size` request (the zeroed-allocate shape).
///
/// The product is computed with `checked_mul`; a mathematical overflow is
/// rejected outright rather than wrapped and compared.
#[must_use]
pub fn validate_product(count: usize, elem_size: usize) -> Verdict {
    validate_product_with_limit(count, elem_size, MAX_ALLOWED_ALLOC_SIZE)
}

/// Limit-parameterized form of [`validate_size`], used by tests to probe the
/// boundary without process-sized requests.
#[must_use]
pub fn validate_size_with_limit(size: usize, limit: usize) -> Verdict {
    if size > limit {
        return Verdict::Rejected(RejectReason::SizeExceeded {
            requested: size,
            limit,
        });
    }
    Verdict::Accepted(size.max(1))
}

/// Limit-parameterized form of [`validate_product`].
#[must_use]
pub fn validate_product_with_limit(count: usize, elem_size: usize, limit: usize) -> Verdict {
    let Some(total) = count.checked_mul(elem_size) else {
        return Verdict::Rejected(RejectReason::SizeOverflow { count, elem_size });
    };
    if total > limit {
        return Verdict::Rejected(RejectReason::SizeExceeded {
            requested: total,
            limit,
        });
    }
    Verdict::Accepted(total.max(1))
}
