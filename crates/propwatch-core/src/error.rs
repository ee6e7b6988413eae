#![forbid(unsafe_code)]

//! Errors from kind-dispatched property updates.
//!
//! Every variant is an invalid-argument condition: the caller named a
//! property the subject does not own, passed an unusable sample sequence,
//! or handed over a value of the wrong shape. None of them is a transient
//! runtime failure, and retrying with the same arguments fails again.

use std::fmt;

use crate::subject::PropertyKind;

/// Invalid-argument errors raised by [`crate::subject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectError {
    /// A property name that does not parse to any [`PropertyKind`].
    UnknownKind(String),
    /// The subject has no property of this kind.
    UnsupportedKind(PropertyKind),
    /// A sample sequence with no elements.
    EmptySequence,
    /// Cursor past the end of the sample sequence.
    CursorOutOfBounds { cursor: usize, len: usize },
    /// The value cannot be stored in the property of this kind.
    ValueMismatch {
        kind: PropertyKind,
        expected: &'static str,
    },
}

impl SubjectError {
    /// Always `true`: the whole type is the invalid-argument class, so
    /// every variant is a caller mistake rather than a runtime condition.
    ///
    /// Lets hosts that mix error sources classify a `SubjectError` without
    /// matching on its variants.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        true
    }
}

impl fmt::Display for SubjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind(name) => {
                write!(f, "invalid argument: unknown property kind '{name}'")
            }
            Self::UnsupportedKind(kind) => {
                write!(f, "invalid argument: subject has no '{kind}' property")
            }
            Self::EmptySequence => write!(f, "invalid argument: empty sample sequence"),
            Self::CursorOutOfBounds { cursor, len } => {
                write!(f, "invalid argument: cursor {cursor} out of bounds for length {len}")
            }
            Self::ValueMismatch { kind, expected } => {
                write!(f, "invalid argument: '{kind}' expects {expected}")
            }
        }
    }
}

impl std::error::Error for SubjectError {}
