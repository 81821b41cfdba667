//! Border overlay that follows the popover outline

use popover_core::{Color, Contour, LineJoin, Stroke};

/// A stroke-only outline: same contour as the fill mask, no fill of its own
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeDescription {
    pub contour: Contour,
    pub stroke: Stroke,
    pub color: Color,
}

impl StrokeDescription {
    pub fn width(&self) -> f32 {
        self.stroke.width
    }
}

/// Build the border stroke for a contour
///
/// Returns `None` when `border_width <= 0`: no border is drawn at all.
/// The stroke is centered on the outline, so half of it falls outside the
/// masked fill.
pub fn compute_stroke(
    contour: &Contour,
    border_width: f32,
    border_color: Color,
) -> Option<StrokeDescription> {
    if border_width <= 0.0 || border_width.is_nan() {
        return None;
    }

    Some(StrokeDescription {
        contour: contour.clone(),
        stroke: Stroke::new(border_width).with_join(LineJoin::Miter),
        color: border_color,
    })
}
