//! Collision detection for circles against rectangles and circles
//!
//! Every moving thing in the arena is a circle; every obstacle is an
//! axis-aligned rectangle. Circle-vs-rectangle uses closest-point clamping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left corner plus extent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    /// Closest point on (or in) the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// Strict interior test
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.x + self.w && p.y > self.y && p.y < self.y + self.h
    }

    /// Rectangles share interior area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Circle overlaps rectangle (closest point strictly inside the radius)
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    center.distance_squared(rect.closest_point(center)) < radius * radius
}

/// Two circles overlap (centres closer than the sum of radii)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Circle overlaps any rectangle in the set
pub fn circle_hits_any(center: Vec2, radius: f32, rects: &[Rect]) -> bool {
    rects.iter().any(|r| circle_rect_overlap(center, radius, r))
}

/// Point lies within the world grown by `margin` on every side
#[inline]
pub fn inside_world_margin(p: Vec2, size: f32, margin: f32) -> bool {
    p.x > -margin && p.x < size + margin && p.y > -margin && p.y < size + margin
}
