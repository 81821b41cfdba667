//! Error types for popover_background

use thiserror::Error;

use crate::style::{StyleKey, StyleValueType};

/// Errors that can occur while writing style values
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleError {
    /// The value's type does not match the key's declared type
    #[error("style key {key:?} holds {expected:?} values, got {found:?}")]
    TypeMismatch {
        key: StyleKey,
        expected: StyleValueType,
        found: StyleValueType,
    },
}

/// Result type for popover_background operations
pub type Result<T> = std::result::Result<T, StyleError>;
