//! Debug drawing primitives
//!
//! A frame's worth of simple 2D outlines (lines, circles, polygons,
//! rectangles) for an external renderer to mirror. Nothing here rasterizes.

use nalgebra::Vector4;

use crate::foundation::math::{Rect, Vec2};

/// RGBA color, components in [0, 1]
pub type Color = Vector4<f32>;

/// Outline primitive in world coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line { start: Vec2, end: Vec2, color: Color },

    /// Circle outline
    Circle { center: Vec2, radius: f32, color: Color },

    /// Closed polygon outline through world-space points
    Polygon { points: Vec<Vec2>, color: Color },

    /// Axis-aligned rectangle outline
    Rect { rect: Rect, color: Color },
}

impl DebugShape {
    /// Color the primitive is drawn with
    pub fn color(&self) -> Color {
        match self {
            DebugShape::Line { color, .. }
            | DebugShape::Circle { color, .. }
            | DebugShape::Polygon { color, .. }
            | DebugShape::Rect { color, .. } => *color,
        }
    }

    /// Smallest rectangle covering the primitive
    pub fn bounds(&self) -> Rect {
        match self {
            DebugShape::Line { start, end, .. } => Rect::new(start.inf(end), start.sup(end)),
            DebugShape::Circle { center, radius, .. } => {
                Rect::from_center_extents(*center, Vec2::new(*radius, *radius))
            }
            DebugShape::Polygon { points, .. } => {
                let first = points.first().copied().unwrap_or_else(Vec2::zeros);
                let (min, max) = points
                    .iter()
                    .fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
                Rect::new(min, max)
            }
            DebugShape::Rect { rect, .. } => *rect,
        }
    }
}

/// Collects debug primitives for the current frame
#[derive(Debug)]
pub struct DebugDrawSystem {
    shapes: Vec<DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create an empty, enabled collector
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            enabled: true,
        }
    }

    fn push(&mut self, shape: DebugShape) {
        if self.enabled {
            self.shapes.push(shape);
        }
    }

    /// Draw a line segment
    pub fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color) {
        self.push(DebugShape::Line { start, end, color });
    }

    /// Draw a circle outline
    pub fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DebugShape::Circle { center, radius, color });
    }

    /// Draw a closed polygon outline
    pub fn draw_polygon(&mut self, points: Vec<Vec2>, color: Color) {
        self.push(DebugShape::Polygon { points, color });
    }

    /// Draw an axis-aligned rectangle outline
    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.push(DebugShape::Rect { rect, color });
    }

    /// Primitives collected since the last clear (empty while disabled)
    pub fn shapes(&self) -> &[DebugShape] {
        if self.enabled {
            &self.shapes
        } else {
            &[]
        }
    }

    /// Number of collected primitives
    pub fn shape_count(&self) -> usize {
        self.shapes().len()
    }

    /// Drop every collected primitive
    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}
