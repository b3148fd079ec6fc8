//! Collision geometry, narrow-phase tests and response
//!
//! # Module Organization
//!
//! - [`shape`] - Circle and convex polygon geometry with a cached world transform
//! - [`sat`] - Exact overlap tests and minimum translation vectors
//! - [`resolver`] - Pairwise detection plus positional and impulse response
//!
//! Shapes keep their vertices in local coordinates. World-space vertices are
//! computed on demand and cached until the position or rotation changes.

pub mod shape;
pub mod sat;
pub mod resolver;

pub use shape::{Shape, ShapeDesc};
pub use sat::{find_contact, shapes_overlap, Contact};
pub use resolver::{CollisionResolver, ResolverConfig};
