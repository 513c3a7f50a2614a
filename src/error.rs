use std::error::Error;
use std::fmt::Display;

/// The specific variety of bad argument a caller supplied.
///
/// Debug builds report exactly which variety was hit; release builds collapse
/// all of these into the same [`WfgError::BadArgument`] and the caller is
/// expected to treat them uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadArgumentKind {
    IndexOutOfRange,
    NegativeCount,
    SelfEdge,
    DuplicateHolder,
}

impl Display for BadArgumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BadArgumentKind::IndexOutOfRange => write!(f, "transaction or group index out of range"),
            BadArgumentKind::NegativeCount => write!(f, "negative or invalid count"),
            BadArgumentKind::SelfEdge => write!(f, "a transaction cannot wait on itself"),
            BadArgumentKind::DuplicateHolder => write!(f, "duplicate holder in the same call"),
        }
    }
}

/// Error kinds the WFG can report.
#[derive(Debug)]
pub enum WfgError {
    /// Allocation failed while growing the node, edge, or group arenas.
    OutOfMemory,
    /// The caller passed an invalid argument.
    BadArgument(BadArgumentKind),
    /// The critical section could not be entered (the latch is poisoned).
    LatchFailure,
    /// A cycle search found a graph in an inconsistent state. Fatal for the
    /// current pass; there is no recovery.
    InternalInvariant(&'static str),
}

impl Display for WfgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WfgError::OutOfMemory => write!(f, "out of memory"),
            WfgError::BadArgument(kind) => write!(f, "bad argument: {kind}"),
            WfgError::LatchFailure => write!(f, "failed to acquire the wait-for graph latch"),
            WfgError::InternalInvariant(msg) => write!(f, "internal invariant violated: {msg}"),
        }
    }
}

impl Error for WfgError {}

pub type WfgResult<T> = Result<T, WfgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_argument_display_includes_kind() {
        let e = WfgError::BadArgument(BadArgumentKind::SelfEdge);
        assert!(e.to_string().contains("wait on itself"));
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<E: Error>(_: &E) {}
        assert_error(&WfgError::OutOfMemory);
    }
}
