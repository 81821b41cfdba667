//! Arrow-notched rounded rectangle geometry
//!
//! The outline is built once in an "arrow up" frame and rotated into place:
//!
//! ```text
//!                 ╱╲            ← tip at midpoint + offset
//!  ╭────────────╱    ╲──────╮   ← band of thickness `arrow.height`
//!  │                        │
//!  │                        │
//!  ╰────────────────────────╯
//! ```
//!
//! In that frame `u` runs along the arrow edge and `v` runs away from it.
//! Down, left and right are 180°, 90° and -90° rotations of the same outline,
//! so the traversal stays clockwise for every direction.
//!
//! Every radius is first limited to half the body below the arrow band, so
//! opposite roundings never cross. The two corners beside the arrow edge are
//! then clamped further so their rounding never reaches into the notch.

use std::f32::consts::{FRAC_PI_2, PI};

use popover_core::{Contour, Point, Size};

use crate::error::ShapeError;

// =============================================================================
// Directions
// =============================================================================

/// Arrow direction as supplied by the host's presentation layer
///
/// `Any` means the host has not constrained the direction yet. It is a valid
/// value to store but can never be laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PopoverDirection {
    Up,
    Down,
    Left,
    Right,
    #[default]
    Any,
}

/// One of the four edges an arrow can be laid out on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrowDirection {
    /// Arrow on the top edge, pointing up at the anchor
    Up,
    /// Arrow on the bottom edge
    Down,
    /// Arrow on the left edge
    Left,
    /// Arrow on the right edge
    Right,
}

impl ArrowDirection {
    pub const ALL: [ArrowDirection; 4] = [
        ArrowDirection::Up,
        ArrowDirection::Down,
        ArrowDirection::Left,
        ArrowDirection::Right,
    ];

    /// Whether the arrow points vertically (sits on the top or bottom edge)
    pub fn is_vertical(self) -> bool {
        matches!(self, ArrowDirection::Up | ArrowDirection::Down)
    }
}

impl TryFrom<PopoverDirection> for ArrowDirection {
    type Error = ShapeError;

    fn try_from(direction: PopoverDirection) -> Result<Self, Self::Error> {
        match direction {
            PopoverDirection::Up => Ok(ArrowDirection::Up),
            PopoverDirection::Down => Ok(ArrowDirection::Down),
            PopoverDirection::Left => Ok(ArrowDirection::Left),
            PopoverDirection::Right => Ok(ArrowDirection::Right),
            PopoverDirection::Any => Err(ShapeError::UnsupportedDirection(direction)),
        }
    }
}

impl From<ArrowDirection> for PopoverDirection {
    fn from(direction: ArrowDirection) -> Self {
        match direction {
            ArrowDirection::Up => PopoverDirection::Up,
            ArrowDirection::Down => PopoverDirection::Down,
            ArrowDirection::Left => PopoverDirection::Left,
            ArrowDirection::Right => PopoverDirection::Right,
        }
    }
}

// =============================================================================
// Arrow and corner configuration
// =============================================================================

/// Arrow notch dimensions
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArrowGeometry {
    /// Width of the notch along its edge
    pub base: f32,
    /// Depth of the band reserved for the notch
    pub height: f32,
    /// Signed shift of the tip from the middle of the edge
    ///
    /// Positive moves right on horizontal edges and down on vertical edges.
    pub offset: f32,
}

impl ArrowGeometry {
    pub const fn new(base: f32, height: f32, offset: f32) -> Self {
        Self {
            base,
            height,
            offset,
        }
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }
}

/// Effective radius of each corner after clamping
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

/// Corner radii in the arrow-up frame
#[derive(Clone, Copy, Debug)]
struct FrameRadii {
    /// Corner at the start of the arrow edge
    near_leading: f32,
    /// Corner at the end of the arrow edge
    near_trailing: f32,
    /// Both corners on the opposite edge
    far: f32,
}

/// Maps between the arrow-up frame and local coordinates
#[derive(Clone, Copy, Debug)]
struct EdgeFrame {
    direction: ArrowDirection,
    size: Size,
}

impl EdgeFrame {
    fn new(direction: ArrowDirection, size: Size) -> Self {
        Self {
            direction,
            size: size.non_negative(),
        }
    }

    /// Length of the arrow edge
    fn along(&self) -> f32 {
        if self.direction.is_vertical() {
            self.size.width
        } else {
            self.size.height
        }
    }

    /// Extent away from the arrow edge
    fn depth(&self) -> f32 {
        if self.direction.is_vertical() {
            self.size.height
        } else {
            self.size.width
        }
    }

    /// Offset expressed along the frame's `u` axis
    fn frame_offset(&self, offset: f32) -> f32 {
        match self.direction {
            ArrowDirection::Up | ArrowDirection::Right => offset,
            ArrowDirection::Down | ArrowDirection::Left => -offset,
        }
    }

    /// Rotation applied to arc angles
    fn rotation(&self) -> f32 {
        match self.direction {
            ArrowDirection::Up => 0.0,
            ArrowDirection::Down => PI,
            ArrowDirection::Left => -FRAC_PI_2,
            ArrowDirection::Right => FRAC_PI_2,
        }
    }

    fn to_local(&self, u: f32, v: f32) -> Point {
        let (w, h) = (self.size.width, self.size.height);
        match self.direction {
            ArrowDirection::Up => Point::new(u, v),
            ArrowDirection::Down => Point::new(w - u, h - v),
            ArrowDirection::Left => Point::new(v, h - u),
            ArrowDirection::Right => Point::new(w - v, u),
        }
    }

    /// Local vertex, clamped into the bounds
    fn vertex(&self, u: f32, v: f32) -> Point {
        self.to_local(u, v).clamp_to(self.size)
    }

    fn radii(&self, corner_radius: f32, arrow: ArrowGeometry) -> FrameRadii {
        let along = self.along();
        let band = arrow.height.max(0.0).min(self.depth());
        let tip = along / 2.0 + self.frame_offset(arrow.offset);
        let half_base = arrow.base / 2.0;

        // Clamp radii to half the smaller dimension of the body
        let max_radius = (along / 2.0).min((self.depth() - band) / 2.0).max(0.0);
        let radius = corner_radius.min(max_radius).max(0.0);

        // Room between each near corner and the closer side of the notch
        let lead_room = tip - half_base;
        let trail_room = along - (tip + half_base);

        FrameRadii {
            near_leading: radius.min(lead_room).max(0.0),
            near_trailing: radius.min(trail_room).max(0.0),
            far: radius,
        }
    }
}

/// Effective corner radii for a layout, after clamping the arrow-side corners
pub fn clamped_corner_radii(
    bounds: Size,
    direction: ArrowDirection,
    corner_radius: f32,
    arrow: ArrowGeometry,
) -> CornerRadii {
    let frame = EdgeFrame::new(direction, bounds);
    let FrameRadii {
        near_leading: nl,
        near_trailing: nt,
        far,
    } = frame.radii(corner_radius, arrow);

    let (top_left, top_right, bottom_right, bottom_left) = match direction {
        ArrowDirection::Up => (nl, nt, far, far),
        ArrowDirection::Down => (far, far, nl, nt),
        ArrowDirection::Left => (nt, far, far, nl),
        ArrowDirection::Right => (far, nl, nt, far),
    };

    CornerRadii {
        top_left,
        top_right,
        bottom_right,
        bottom_left,
    }
}

// =============================================================================
// Contour
// =============================================================================

/// Compute the closed outline for a popover background
///
/// The traversal starts just past the rounding of the corner before the
/// arrow, runs along the arrow edge through the notch, then clockwise around
/// the remaining three edges and back. Vertices are clamped and radii are
/// limited so the whole outline, arcs included, stays inside
/// `[0, width] × [0, height]`.
pub fn compute_contour(
    bounds: Size,
    direction: ArrowDirection,
    corner_radius: f32,
    arrow: ArrowGeometry,
) -> Contour {
    let frame = EdgeFrame::new(direction, bounds);
    let along = frame.along();
    let depth = frame.depth();
    let band = arrow.height.max(0.0).min(depth);

    let tip = along / 2.0 + frame.frame_offset(arrow.offset);
    let half_base = arrow.base / 2.0;
    let notch_lead = (tip - half_base).max(0.0).min(along);
    let notch_trail = (tip + half_base).max(0.0).min(along);
    let tip = tip.max(0.0).min(along);

    let r = frame.radii(corner_radius, arrow);
    let rot = frame.rotation();

    tracing::trace!(
        ?direction,
        along,
        depth,
        band,
        tip,
        near_leading = r.near_leading,
        near_trailing = r.near_trailing,
        "computing popover contour"
    );

    let arc = |contour: Contour, cu: f32, cv: f32, radius: f32, start: f32| {
        contour.arc(frame.to_local(cu, cv), radius, start + rot, FRAC_PI_2)
    };

    let mut contour = Contour::new(frame.vertex(r.near_leading, band))
        // Arrow edge and notch
        .line_to(frame.vertex(notch_lead, band))
        .line_to(frame.vertex(tip, 0.0))
        .line_to(frame.vertex(notch_trail, band))
        .line_to(frame.vertex(along - r.near_trailing, band));
    contour = arc(
        contour,
        along - r.near_trailing,
        band + r.near_trailing,
        r.near_trailing,
        PI * 1.5,
    );

    // Trailing edge and far corner
    contour = contour.line_to(frame.vertex(along, depth - r.far));
    contour = arc(contour, along - r.far, depth - r.far, r.far, 0.0);

    // Far edge and far corner
    contour = contour.line_to(frame.vertex(r.far, depth));
    contour = arc(contour, r.far, depth - r.far, r.far, FRAC_PI_2);

    // Leading edge back up to the first corner
    contour = contour.line_to(frame.vertex(0.0, band + r.near_leading));
    contour = arc(
        contour,
        r.near_leading,
        band + r.near_leading,
        r.near_leading,
        PI,
    );

    contour.close()
}
