//! Error types for popover_paint

use thiserror::Error;

use crate::shape::PopoverDirection;

/// Errors raised while preparing shape geometry
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    /// The host asked for a direction the shape cannot be laid out in
    #[error("unsupported arrow direction {0:?}: only up, down, left and right can be laid out")]
    UnsupportedDirection(PopoverDirection),
}
