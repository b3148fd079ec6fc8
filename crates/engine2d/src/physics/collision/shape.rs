//! Collision shapes
//!
//! A shape is either a circle or a convex polygon. Geometry is stored in
//! local space around the owner's origin; world-space vertices are derived
//! from the current position and rotation and cached until either changes.

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Rect, Rotation2, Vec2, Vec2Ext};
use crate::physics::error::{PhysicsError, PhysicsResult};

/// Serializable description of a shape's local geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeDesc {
    /// Circle around the local origin
    Circle {
        /// Circle radius
        radius: f32,
    },
    /// Convex polygon, vertices in order
    Polygon {
        /// Local-space vertices
        vertices: Vec<Vec2>,
    },
}

/// Collision boundary of a body.
///
/// `radius` always bounds the whole shape from the local origin: it is the
/// circle radius, or the largest vertex distance for a polygon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ShapeDesc", into = "ShapeDesc")]
pub struct Shape {
    local_vertices: Vec<Vec2>,
    radius: f32,
    position: Vec2,
    rotation: f32,
    world_vertices: OnceCell<Vec<Vec2>>,
}

impl Default for Shape {
    /// An empty shape: no vertices and zero radius, which never collides
    fn default() -> Self {
        Self::circle(0.0)
    }
}

impl Shape {
    /// Circle of the given radius
    pub fn circle(radius: f32) -> Self {
        Self {
            local_vertices: Vec::new(),
            radius,
            position: Vec2::zeros(),
            rotation: 0.0,
            world_vertices: OnceCell::new(),
        }
    }

    /// Polygon from local-space vertices.
    ///
    /// The vertices are taken as given; use [`Shape::try_polygon`] to
    /// reject geometry the separating-axis test cannot handle.
    pub fn polygon(vertices: Vec<Vec2>) -> Self {
        let mut shape = Self {
            local_vertices: vertices,
            radius: 0.0,
            position: Vec2::zeros(),
            rotation: 0.0,
            world_vertices: OnceCell::new(),
        };
        shape.radius = shape.calc_minimum_radius();
        shape
    }

    /// Polygon from local-space vertices, validated to be finite and convex
    pub fn try_polygon(vertices: Vec<Vec2>) -> PhysicsResult<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::InvalidShape(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
            return Err(PhysicsError::InvalidShape("polygon has non-finite vertices".to_string()));
        }
        if !is_convex(&vertices) {
            return Err(PhysicsError::InvalidShape("polygon is not convex".to_string()));
        }
        Ok(Self::polygon(vertices))
    }

    /// Axis-aligned box of the given size centered on the local origin
    pub fn rectangle(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::polygon(vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ])
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`
    pub fn regular_polygon(sides: usize, radius: f32) -> Self {
        let step = std::f32::consts::TAU / sides.max(3) as f32;
        let vertices = (0..sides.max(3))
            .map(|i| Vec2::new(radius, 0.0).rotated(step * i as f32))
            .collect();
        Self::polygon(vertices)
    }

    /// Whether the shape can take part in collision
    pub fn is_valid(&self) -> bool {
        self.radius > 0.0
    }

    /// True iff no polygon vertices were supplied
    pub fn is_circle(&self) -> bool {
        self.local_vertices.is_empty()
    }

    /// Bounding radius around the shape's position
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// World position of the local origin
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the shape; invalidates cached vertices when it actually moves
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.world_vertices.take();
        }
    }

    /// Rotation in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Rotate the shape; invalidates cached vertices when it actually turns
    pub fn set_rotation(&mut self, rotation: f32) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.world_vertices.take();
        }
    }

    /// Local-space polygon vertices (empty for a circle)
    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local_vertices
    }

    /// World-space polygon vertices (empty for a circle).
    ///
    /// Computed on first access after a move or rotation, then cached.
    pub fn vertices(&self) -> &[Vec2] {
        self.world_vertices.get_or_init(|| {
            let rotation = Rotation2::new(self.rotation);
            self.local_vertices
                .iter()
                .map(|v| rotation * v + self.position)
                .collect()
        })
    }

    /// Outward unit normal of every polygon edge (empty for a circle)
    pub fn axes(&self) -> Vec<Vec2> {
        let vertices = self.vertices();
        if vertices.len() < 2 {
            return Vec::new();
        }

        // Outward is to the right of each edge for counter-clockwise winding
        let winding = if signed_area(vertices) < 0.0 { -1.0 } else { 1.0 };

        vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(current, next)| {
                let edge = next - current;
                Vec2::new(edge.y, -edge.x).normalize_or_zero() * winding
            })
            .filter(|axis| *axis != Vec2::zeros())
            .collect()
    }

    /// Farthest point of the shape along `direction`.
    ///
    /// For a polygon the first vertex reaching the maximum wins.
    pub fn support_point(&self, direction: &Vec2) -> Vec2 {
        if self.is_circle() {
            return self.position + direction.normalize_or_zero() * self.radius;
        }

        let mut best_projection = f32::NEG_INFINITY;
        let mut best_vertex = self.position;
        for vertex in self.vertices() {
            let projection = vertex.dot(direction);
            if projection > best_projection {
                best_projection = projection;
                best_vertex = *vertex;
            }
        }
        best_vertex
    }

    /// Interval covered by the shape when projected onto `axis`
    pub fn project(&self, axis: &Vec2) -> (f32, f32) {
        let max = self.support_point(axis).dot(axis);
        let min = self.support_point(&-axis).dot(axis);
        (min, max)
    }

    /// Vertex closest to `point` (None for a circle)
    pub fn closest_vertex(&self, point: &Vec2) -> Option<Vec2> {
        self.vertices()
            .iter()
            .copied()
            .min_by(|a, b| {
                (a - point)
                    .magnitude_squared()
                    .total_cmp(&(b - point).magnitude_squared())
            })
    }

    /// Smallest axis-aligned rectangle covering the shape
    pub fn minimum_covered_rect(&self) -> Rect {
        if self.is_circle() {
            return Rect::from_center_extents(self.position, Vec2::new(self.radius, self.radius));
        }

        let vertices = self.vertices();
        let mut min = Vec2::new(f32::MAX, f32::MAX);
        let mut max = Vec2::new(f32::MIN, f32::MIN);
        for vertex in vertices {
            min = min.inf(vertex);
            max = max.sup(vertex);
        }
        Rect::new(min, max)
    }

    /// Scale the local geometry around the local origin
    pub fn scale(&mut self, factor: f32) -> &mut Self {
        if self.is_circle() {
            self.radius *= factor;
        } else {
            for vertex in &mut self.local_vertices {
                *vertex *= factor;
            }
            self.radius = self.calc_minimum_radius();
            self.world_vertices.take();
        }
        self
    }

    /// Shift the local geometry, e.g. to move the pivot of a polygon
    pub fn translate_local(&mut self, offset: Vec2) -> &mut Self {
        if !self.is_circle() {
            for vertex in &mut self.local_vertices {
                *vertex += offset;
            }
            self.radius = self.calc_minimum_radius();
            self.world_vertices.take();
        }
        self
    }

    fn calc_minimum_radius(&self) -> f32 {
        self.local_vertices
            .iter()
            .map(Vec2::magnitude)
            .fold(0.0, f32::max)
    }
}

impl From<ShapeDesc> for Shape {
    fn from(desc: ShapeDesc) -> Self {
        match desc {
            ShapeDesc::Circle { radius } => Self::circle(radius),
            ShapeDesc::Polygon { vertices } => Self::polygon(vertices),
        }
    }
}

impl From<Shape> for ShapeDesc {
    fn from(shape: Shape) -> Self {
        if shape.is_circle() {
            Self::Circle { radius: shape.radius }
        } else {
            Self::Polygon { vertices: shape.local_vertices }
        }
    }
}

/// Twice the signed area; positive for counter-clockwise winding
fn signed_area(vertices: &[Vec2]) -> f32 {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.perp(b))
        .sum()
}

fn is_convex(vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    let mut sign = 0.0_f32;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let c = vertices[(i + 2) % n];
        let turn = (b - a).perp(&(c - b));
        if turn == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}
