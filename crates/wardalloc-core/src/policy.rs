//! Failure policy resolution.
//!
//! A single process-wide [`FailureMode`] decides what happens when the size
//! validator rejects a request. The one structural exception is the
//! throwing-construction origin: its calling contract forbids a null
//! return, so it terminates even when the global mode is `ReturnNull`.
//! Centralizing that rule here keeps the five entry points from each
//! carrying their own copy of the branch.

/// Process-wide allocation-failure mode.
///
/// Initialized once from configuration before the first allocation and
/// immutable for the lifetime of the process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureMode {
    /// Rejected requests terminate the process with a diagnostic.
    #[default]
    Terminate,
    /// Rejected requests return null where the entry point's contract
    /// allows it.
    ReturnNull,
}

impl FailureMode {
    /// Parse from string (case-insensitive). Unrecognized input falls back
    /// to the safe default, `Terminate`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "null" | "return-null" => Self::ReturnNull,
            _ => Self::Terminate,
        }
    }
}

/// Which entry point produced a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocOrigin {
    /// Plain allocate (`malloc` shape).
    Plain,
    /// Zero-filled count*elem allocate (`calloc` shape).
    Zeroed,
    /// Resize of an existing allocation (`realloc` shape).
    Resize,
    /// Object-construction allocate that must not return null.
    ConstructThrowing,
    /// Object-construction allocate with an explicit no-throw contract.
    ConstructNonThrowing,
}

impl AllocOrigin {
    /// API symbol used in diagnostics and lifecycle records.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Plain => "alloc",
            Self::Zeroed => "alloc_zeroed",
            Self::Resize => "resize",
            Self::ConstructThrowing => "construct",
            Self::ConstructNonThrowing => "construct_nothrow",
        }
    }

    /// True if this entry point's contract permits a null return.
    #[must_use]
    pub const fn may_return_null(self) -> bool {
        !matches!(self, Self::ConstructThrowing)
    }
}

/// Verdict of the failure policy for one rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// End the process after emitting the diagnostic.
    Terminate,
    /// Produce a null result and let the caller continue.
    ReturnNull,
}

/// Resolves a rejected request to a terminal action.
///
/// `Terminate` mode terminates for every origin. `ReturnNull` mode returns
/// null for every origin whose contract allows it; `ConstructThrowing`
/// cannot, and terminates regardless.
#[must_use]
pub const fn on_rejected(mode: FailureMode, origin: AllocOrigin) -> FailureAction {
    match mode {
        FailureMode::Terminate => FailureAction::Terminate,
        FailureMode::ReturnNull => {
            if origin.may_return_null() {
                FailureAction::ReturnNull
            } else {
                FailureAction::Terminate
            }
        }
    }
}
