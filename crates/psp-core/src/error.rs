use thiserror::Error;

/// Fatal decode/encode failures of the archive primitives and the slot codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("unexpected end of data at {pos:#x}: needed {needed} bytes, {available} left")]
    UnexpectedEof {
        pos: usize,
        needed: usize,
        available: usize,
    },
    #[error("unexpected trailing data: {0} bytes left after record")]
    TrailingData(usize),
    #[error("invalid string at {pos:#x}: {reason}")]
    InvalidString { pos: usize, reason: &'static str },
}

/// In-place write rejected because the node holds a different kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("cannot write {value} into {kind} node")]
    KindMismatch {
        kind: &'static str,
        value: &'static str,
    },
    #[error("value {value} out of range for {kind} node")]
    OutOfRange { kind: &'static str, value: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("path not found: {0}")]
    NotFound(String),
    #[error("{kind} node at {path} has no members")]
    NotAContainer { path: String, kind: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("pal has no save parameter to write into")]
    MissingSaveParameter,
    #[error("pal record has no {0} node")]
    MissingNode(&'static str),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Property(#[from] PropertyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
    #[error("{context}: missing field `{field}`")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },
    #[error("{context}: expected {expected}")]
    Invalid {
        context: &'static str,
        expected: &'static str,
    },
    #[error("invalid guid `{0}`")]
    InvalidGuid(String),
}
