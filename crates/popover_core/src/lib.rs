//! Popover Core Types
//!
//! The shared vocabulary for the popover background crates:
//!
//! - **Geometry**: points, sizes, rectangles and edge insets in local
//!   (y-down) coordinates
//! - **Paint**: colors and fill brushes (solid or tiled image pattern)
//! - **Contour**: closed outlines made of line and circular arc segments
//! - **Stroke**: line width and join configuration for outlines
//!
//! # Example
//!
//! ```rust
//! use popover_core::{Contour, Point};
//!
//! let contour = Contour::new(Point::new(0.0, 0.0))
//!     .line_to(Point::new(10.0, 0.0))
//!     .line_to(Point::new(10.0, 10.0))
//!     .close();
//!
//! assert!(contour.is_closed());
//! assert_eq!(contour.end_point(), contour.start());
//! ```

pub mod contour;
pub mod geometry;
pub mod paint;
pub mod stroke;

pub use contour::{Contour, ContourSegment};
pub use geometry::{EdgeInsets, Point, Rect, Size};
pub use paint::{Brush, Color, ImageBrush};
pub use stroke::{LineJoin, Stroke};
