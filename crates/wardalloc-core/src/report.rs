//! Diagnostic reporting for terminate-mode rejections.
//!
//! The report is a fixed, recognizable set of stderr lines; tests at the
//! process boundary match on [`TERMINATING_LINE`]. Message construction is
//! split from emission so unit tests can check the text without dying.

use std::io::Write;

use crate::config::MODE_ENV_VAR;
use crate::limit::RejectReason;
use crate::policy::AllocOrigin;

/// First line of every terminate-mode report. Stable; matched by the
/// process-boundary tests.
pub const TERMINATING_LINE: &str =
    "wardalloc: allocator is terminating the process instead of returning 0";

/// Builds the full multi-line diagnostic for one rejected request.
#[must_use]
pub fn terminating_report(origin: AllocOrigin, reason: &RejectReason) -> String {
    format!(
        "{TERMINATING_LINE}\nwardalloc: {}: {reason}\nwardalloc: if the caller can handle \
         allocation failure, set {MODE_ENV_VAR}=1\n",
        origin.symbol()
    )
}

/// Emits the diagnostic and ends the process abnormally.
///
/// Stderr is flushed explicitly so the report survives the abort even when
/// the stream is redirected to a pipe.
pub fn die(origin: AllocOrigin, reason: &RejectReason) -> ! {
    let mut stderr = std::io::stderr().lock();
    let _ = stderr.write_all(terminating_report(origin, reason).as_bytes());
    let _ = stderr.flush();
    std::process::abort();
}

/// Ends the process when a validated request cannot be serviced by the
/// backend and the entry point's contract forbids a null return.
pub fn die_out_of_memory(origin: AllocOrigin, size: usize) -> ! {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(
        stderr,
        "{TERMINATING_LINE}\nwardalloc: {}: allocator is out of memory trying to allocate \
         {size:#x} bytes",
        origin.symbol()
    );
    let _ = stderr.flush();
    std::process::abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limit::MAX_ALLOWED_ALLOC_SIZE;

    #[test]
    fn report_carries_fixed_line_and_reason() {
        let reason = RejectReason::SizeExceeded {
            requested: MAX_ALLOWED_ALLOC_SIZE + 1,
            limit: MAX_ALLOWED_ALLOC_SIZE,
        };
        let report = terminating_report(AllocOrigin::Plain, &reason);
        assert!(report.starts_with(TERMINATING_LINE));
        assert!(report.contains("alloc:"));
        assert!(report.contains("exceeds maximum supported size"));
        assert!(report.contains(MODE_ENV_VAR));
    }

    #[test]
    fn report_names_the_rejecting_entry_point() {
        let reason = RejectReason::SizeOverflow {
            count: usize::MAX,
            elem_size: 4096,
        };
        let report = terminating_report(AllocOrigin::Zeroed, &reason);
        assert!(report.contains("alloc_zeroed:"));
        assert!(report.contains("overflows the address space"));
    }
}
