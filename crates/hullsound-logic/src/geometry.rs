//! 2D geometry for hull layouts — points, room/opening rectangles, and
//! the line-vs-opening clipping used to measure real propagation paths.
//!
//! Coordinates are world units with +y pointing up.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Below this a segment is treated as parallel to an opening's plane.
const PARALLEL_EPSILON: f32 = 1e-4;

/// A point or direction in the hull plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle (center + full extents).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub cx: f32,
    pub cy: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.cx, self.cy)
    }

    /// Half width, or 0 when the extent is negative or not a number.
    pub fn half_w(&self) -> f32 {
        sane_half(self.width)
    }

    /// Half height, or 0 when the extent is negative or not a number.
    pub fn half_h(&self) -> f32 {
        sane_half(self.height)
    }

    pub fn min_x(&self) -> f32 {
        self.cx - self.half_w()
    }
    pub fn max_x(&self) -> f32 {
        self.cx + self.half_w()
    }
    pub fn min_y(&self) -> f32 {
        self.cy - self.half_h()
    }
    pub fn max_y(&self) -> f32 {
        self.cy + self.half_h()
    }

    /// True if the extents are usable as-is (finite and non-negative).
    pub fn is_well_formed(&self) -> bool {
        self.cx.is_finite()
            && self.cy.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

fn sane_half(extent: f32) -> f32 {
    if extent.is_finite() && extent > 0.0 {
        extent / 2.0
    } else {
        0.0
    }
}

/// Which way an opening is oriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpeningAxis {
    /// Sits in a wall: long axis is y, sound crosses it moving along x.
    Vertical,
    /// Hatch in a floor or ceiling: long axis is x, sound crosses it moving along y.
    Horizontal,
}

/// Point where the line `from → toward` crosses an opening's plane,
/// clamped to the opening's extent along its long axis.
///
/// The line is extended past either endpoint if needed. When the line runs
/// parallel to the opening, the perpendicular projection of `from` is used.
/// A degenerate extent clamps to the opening's center line.
pub fn clip_through_opening(from: Vec2, toward: Vec2, rect: &Rect, axis: OpeningAxis) -> Vec2 {
    match axis {
        OpeningAxis::Vertical => {
            let plane = rect.cx;
            let y = cross_coordinate(from.x, from.y, toward.x, toward.y, plane);
            let y = clamp_span(finite_or(y, rect.cy), rect.min_y(), rect.max_y());
            Vec2::new(plane, finite_or(y, rect.cy))
        }
        OpeningAxis::Horizontal => {
            let plane = rect.cy;
            let x = cross_coordinate(from.y, from.x, toward.y, toward.x, plane);
            let x = clamp_span(finite_or(x, rect.cx), rect.min_x(), rect.max_x());
            Vec2::new(finite_or(x, rect.cx), plane)
        }
    }
}

/// Along-plane coordinate where the line (a0,b0)→(a1,b1) reaches `a = plane`.
fn cross_coordinate(a0: f32, b0: f32, a1: f32, b1: f32, plane: f32) -> f32 {
    let da = a1 - a0;
    if da.abs() < PARALLEL_EPSILON {
        return b0;
    }
    let t = (plane - a0) / da;
    b0 + (b1 - b0) * t
}

/// Like `f32::clamp` but never panics on NaN bounds.
fn clamp_span(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}
