//! Math utilities and types
//!
//! Provides the 2D math types used by shapes, bodies and the spatial index.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Rotation2, Vector2};

/// 2D vector type (positions, velocities, forces)
pub type Vec2 = Vector2<f32>;

/// Vectors shorter than this are treated as zero when normalizing
pub const NORMALIZE_EPSILON: f32 = 1.0e-6;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Reciprocal that maps zero to zero.
    ///
    /// Used for inverse mass and inverse inertia, where zero means "infinite".
    pub fn inverse_or_zero(value: f32) -> f32 {
        if value == 0.0 {
            0.0
        } else {
            1.0 / value
        }
    }

    /// Limit `value` to `[-max, max]`, treating the cap by magnitude.
    ///
    /// Unlike `f32::clamp` this never panics; a NaN cap leaves `value` as is.
    pub fn clamp_magnitude(value: f32, max: f32) -> f32 {
        let limit = max.abs();
        value.min(limit).max(-limit)
    }
}

/// Extension trait for `Vec2` with the steering and SAT helpers
pub trait Vec2Ext {
    /// Unit vector in the same direction, or zero for a (near) zero vector
    fn normalize_or_zero(&self) -> Vec2;

    /// Clamp the magnitude to `max_length`, keeping the direction
    fn truncate(&self, max_length: f32) -> Vec2;

    /// Counter-clockwise perpendicular `(-y, x)`
    fn perpendicular(&self) -> Vec2;

    /// Rotate counter-clockwise by `angle` radians
    fn rotated(&self, angle: f32) -> Vec2;

    /// Euclidean distance to another point
    fn distance(&self, other: &Vec2) -> f32;
}

impl Vec2Ext for Vec2 {
    fn normalize_or_zero(&self) -> Vec2 {
        self.try_normalize(NORMALIZE_EPSILON).unwrap_or_else(Vec2::zeros)
    }

    fn truncate(&self, max_length: f32) -> Vec2 {
        let length_sq = self.magnitude_squared();
        if length_sq > max_length * max_length && length_sq > 0.0 {
            self * (max_length / length_sq.sqrt())
        } else {
            *self
        }
    }

    fn perpendicular(&self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    fn rotated(&self, angle: f32) -> Vec2 {
        Rotation2::new(angle) * self
    }

    fn distance(&self, other: &Vec2) -> f32 {
        (self - other).magnitude()
    }
}

/// Axis-aligned rectangle given by its minimum and maximum corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum corner (smallest x and y)
    pub min: Vec2,
    /// Maximum corner (largest x and y)
    pub max: Vec2,
}

impl Rect {
    /// Create a new rectangle from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a rectangle anchored at the origin with the given size
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::zeros(), Vec2::new(width, height))
    }

    /// Create a rectangle centered at a point with given half extents
    pub fn from_center_extents(center: Vec2, extents: Vec2) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the rectangle
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the rectangle
    pub fn extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Width of the rectangle
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the rectangle
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }

    /// Check if `other` lies entirely inside this rectangle (edges inclusive)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min.x >= self.min.x && other.max.x <= self.max.x &&
        other.min.y >= self.min.y && other.max.y <= self.max.y
    }

    /// Check if this rectangle intersects another (touching counts)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    /// Split into four equal quadrants.
    ///
    /// Order: min-x/min-y, max-x/min-y, min-x/max-y, max-x/max-y.
    pub fn quadrants(&self) -> [Rect; 4] {
        let center = self.center();
        [
            Rect::new(self.min, center),
            Rect::new(Vec2::new(center.x, self.min.y), Vec2::new(self.max.x, center.y)),
            Rect::new(Vec2::new(self.min.x, center.y), Vec2::new(center.x, self.max.y)),
            Rect::new(center, self.max),
        ]
    }
}
