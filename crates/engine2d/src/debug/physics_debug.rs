//! Physics debug visualization
//!
//! Mirrors a [`BodyPool`] into debug primitives: each body's collision
//! shape, a short velocity line, and the quadtree node bounds from the
//! last collision pass.

use crate::debug::draw::{Color, DebugDrawSystem, DebugShape};
use crate::foundation::math::Vec2;
use crate::physics::{Body, BodyPool};

/// Color scheme for physics visualization
#[derive(Clone, Debug)]
pub struct PhysicsDebugColors {
    /// Shapes of movable bodies
    pub shape_default: Color,

    /// Shapes of immovable bodies (mass 0)
    pub shape_static: Color,

    /// Shapes of bodies with collision disabled
    pub shape_disabled: Color,

    /// Velocity lines
    pub velocity: Color,

    /// Quadtree node outlines
    pub quadtree: Color,
}

impl Default for PhysicsDebugColors {
    fn default() -> Self {
        Self {
            shape_default: Color::new(0.0, 1.0, 0.0, 0.6),  // Green
            shape_static: Color::new(0.6, 0.6, 0.6, 0.6),   // Grey
            shape_disabled: Color::new(0.3, 0.3, 0.3, 0.3), // Dark, transparent
            velocity: Color::new(1.0, 1.0, 0.0, 0.8),       // Yellow
            quadtree: Color::new(0.5, 0.8, 1.0, 0.15),      // Light blue, transparent
        }
    }
}

/// Physics debug visualizer
///
/// Call [`PhysicsDebugDraw::capture`] once per frame after the collision
/// pass; each capture replaces the previous frame's primitives.
pub struct PhysicsDebugDraw {
    debug_draw: DebugDrawSystem,
    colors: PhysicsDebugColors,

    /// Show collision shapes
    pub show_shapes: bool,

    /// Show velocity lines
    pub show_velocity: bool,

    /// Show quadtree node bounds
    pub show_quadtree: bool,

    /// Length of velocity lines, in ticks of travel
    pub velocity_ticks: f32,
}

impl PhysicsDebugDraw {
    /// Create a new physics debug visualizer
    pub fn new() -> Self {
        Self {
            debug_draw: DebugDrawSystem::new(),
            colors: PhysicsDebugColors::default(),
            show_shapes: true,
            show_velocity: true,
            show_quadtree: false,
            velocity_ticks: 4.0,
        }
    }

    /// Set custom color scheme
    pub fn with_colors(mut self, colors: PhysicsDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Replace this frame's shapes with a snapshot of `pool`
    pub fn capture(&mut self, pool: &BodyPool) {
        self.debug_draw.clear();

        if self.show_quadtree {
            for bounds in pool.quadtree().node_bounds() {
                self.debug_draw.draw_rect(bounds, self.colors.quadtree);
            }
        }

        for (_, body) in pool.iter() {
            if self.show_shapes {
                self.draw_body_shape(body);
            }
            if self.show_velocity && body.velocity() != Vec2::zeros() {
                let start = body.position();
                let end = start + body.velocity() * self.velocity_ticks;
                self.debug_draw.draw_line(start, end, self.colors.velocity);
            }
        }
    }

    /// Draw one body's collision shape
    pub fn draw_body_shape(&mut self, body: &Body) {
        let color = if !body.is_collision_enabled() {
            self.colors.shape_disabled
        } else if body.inv_mass() == 0.0 {
            self.colors.shape_static
        } else {
            self.colors.shape_default
        };

        let shape = body.shape();
        if shape.is_circle() {
            self.debug_draw.draw_circle(shape.position(), shape.radius(), color);
        } else {
            self.debug_draw.draw_polygon(shape.vertices().to_vec(), color);
        }
    }

    /// Primitives from the last capture
    pub fn shapes(&self) -> &[DebugShape] {
        self.debug_draw.shapes()
    }

    /// Enable/disable the entire debug system
    pub fn set_enabled(&mut self, enabled: bool) {
        self.debug_draw.enabled = enabled;
    }

    /// Check if debug system is enabled
    pub fn is_enabled(&self) -> bool {
        self.debug_draw.enabled
    }

    /// Get mutable reference to underlying debug draw system
    pub fn debug_draw_mut(&mut self) -> &mut DebugDrawSystem {
        &mut self.debug_draw
    }
}

impl Default for PhysicsDebugDraw {
    fn default() -> Self {
        Self::new()
    }
}
