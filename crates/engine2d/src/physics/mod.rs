//! Physics module: bodies, collision detection and response
//!
//! Per tick the caller applies steering forces, then [`BodyPool::step`]
//! integrates every body and runs one collision pass:
//!
//! 1. **Broad phase**: the pool rebuilds its quadtree from each enabled
//!    body's bounding rectangle and retrieves candidates per body.
//! 2. **Narrow phase**: [`CollisionResolver`] runs the exact shape test and,
//!    when the pool responds, separates the pair and applies an impulse.

pub mod body;
pub mod collision;
pub mod error;
pub mod pool;

pub use body::{Body, BodyConfig, BodyHandle, CollisionHandler, UpdateGate};
pub use collision::{
    Contact,
    CollisionResolver,
    ResolverConfig,
    Shape,
    ShapeDesc,
};
pub use error::{PhysicsError, PhysicsResult};
pub use pool::{BodyPool, CollisionStats};

#[cfg(test)]
mod tests;
