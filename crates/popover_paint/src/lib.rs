//! Popover Shape Geometry
//!
//! Computes the outline of a popover background: a rounded rectangle with a
//! triangular arrow notch on the edge facing the anchor, plus the border
//! stroke that follows the same outline.
//!
//! # Example
//!
//! ```rust
//! use popover_core::Size;
//! use popover_paint::{compute_contour, compute_stroke, ArrowDirection, ArrowGeometry};
//!
//! let arrow = ArrowGeometry::new(40.0, 20.0, 0.0);
//! let contour = compute_contour(Size::new(300.0, 200.0), ArrowDirection::Up, 12.0, arrow);
//! assert!(contour.is_closed());
//!
//! // No border when the width is zero
//! assert!(compute_stroke(&contour, 0.0, popover_core::Color::BLACK).is_none());
//! ```

pub mod border;
pub mod error;
pub mod shape;

pub use border::{compute_stroke, StrokeDescription};
pub use error::ShapeError;
pub use shape::{
    clamped_corner_radii, compute_contour, ArrowDirection, ArrowGeometry, CornerRadii,
    PopoverDirection,
};
