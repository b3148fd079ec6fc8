//! Debug module for visualization and debugging tools
//!
//! Produces renderer-agnostic primitives; nothing here draws by itself.

pub mod draw;
pub mod physics_debug;

pub use draw::{Color, DebugShape, DebugDrawSystem};
pub use physics_debug::{PhysicsDebugColors, PhysicsDebugDraw};
