//! Closed outlines built from line and circular arc segments
//!
//! A [`Contour`] is the single outline shared by the fill mask and the border
//! stroke of a popover background. Contours are values: a new one is built on
//! every layout pass and replaces the previous one wholesale.
//!
//! Angles are in radians in the y-down local space, so a positive sweep runs
//! clockwise on screen: `0` points right, `π/2` points down.

use smallvec::SmallVec;
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::geometry::{Point, Rect};

/// A single contour segment, starting where the previous one ended
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContourSegment {
    /// Straight line to a point
    Line(Point),
    /// Circular arc around `center`
    ///
    /// If the current point is not on the arc's start, a renderer connects
    /// it to the arc start with a straight line first.
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        sweep: f32,
    },
}

impl ContourSegment {
    /// Point where this segment begins drawing
    pub fn start_point(&self) -> Option<Point> {
        match *self {
            ContourSegment::Line(_) => None,
            ContourSegment::Arc {
                center,
                radius,
                start_angle,
                ..
            } => Some(point_on_circle(center, radius, start_angle)),
        }
    }

    /// Point where this segment ends
    pub fn end_point(&self) -> Point {
        match *self {
            ContourSegment::Line(p) => p,
            ContourSegment::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => point_on_circle(center, radius, start_angle + sweep),
        }
    }
}

fn point_on_circle(center: Point, radius: f32, angle: f32) -> Point {
    Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// A contour outline
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    start: Point,
    segments: SmallVec<[ContourSegment; 16]>,
    closed: bool,
}

impl Contour {
    /// Start a new open contour at `start`
    pub fn new(start: Point) -> Self {
        Self {
            start,
            segments: SmallVec::new(),
            closed: false,
        }
    }

    /// Straight line to a point
    pub fn line_to(mut self, to: Point) -> Self {
        self.segments.push(ContourSegment::Line(to));
        self
    }

    /// Circular arc with a positive (clockwise) or negative sweep
    ///
    /// Zero-radius arcs are dropped; the preceding line already reaches the
    /// corner they would have rounded.
    pub fn arc(mut self, center: Point, radius: f32, start_angle: f32, sweep: f32) -> Self {
        if radius > 0.0 {
            self.segments.push(ContourSegment::Arc {
                center,
                radius,
                start_angle,
                sweep,
            });
        }
        self
    }

    /// Close the contour with a line back to the start point
    pub fn close(mut self) -> Self {
        if self.end_point() != self.start {
            self.segments.push(ContourSegment::Line(self.start));
        }
        self.closed = true;
        self
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn segments(&self) -> &[ContourSegment] {
        &self.segments
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Current end of the outline
    pub fn end_point(&self) -> Point {
        self.segments
            .last()
            .map(ContourSegment::end_point)
            .unwrap_or(self.start)
    }

    /// Every explicit vertex: the start point plus each segment's start
    /// (for arcs) and end point
    pub fn vertices(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.segments.len() * 2 + 1);
        points.push(self.start);
        for segment in &self.segments {
            if let Some(p) = segment.start_point() {
                points.push(p);
            }
            points.push(segment.end_point());
        }
        points
    }

    /// Tight bounding rectangle, including arc extremes
    pub fn bounds(&self) -> Rect {
        let mut rect = Rect::from_points(self.start, self.start);
        for p in self.vertices() {
            rect = rect.expand_to_include(p);
        }

        for segment in &self.segments {
            if let ContourSegment::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } = *segment
            {
                let (lo, hi) = if sweep >= 0.0 {
                    (start_angle, start_angle + sweep)
                } else {
                    (start_angle + sweep, start_angle)
                };
                // Axis extremes sit at multiples of π/2
                let mut k = (lo / FRAC_PI_2).ceil();
                while k * FRAC_PI_2 <= hi {
                    let angle = (k * FRAC_PI_2).rem_euclid(TAU);
                    rect = rect.expand_to_include(point_on_circle(center, radius, angle));
                    k += 1.0;
                }
            }
        }

        rect
    }
}
