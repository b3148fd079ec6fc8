//! # engine2d
//!
//! Simulation core for a 2D real-time game: steering-driven bodies,
//! quadtree broad phase, separating-axis narrow phase and impulse response.
//!
//! ## Features
//!
//! - **Shapes**: circles and convex polygons with cached world vertices
//! - **Broad phase**: a quadtree rebuilt every tick
//! - **Narrow phase**: SAT with minimum translation vector
//! - **Bodies**: force integration, update-period gating, steering helpers
//! - **Config**: TOML / RON loading for pools and bodies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine2d::prelude::*;
//!
//! let mut pool = BodyPool::new(Rect::from_size(512.0, 512.0), true);
//! let handle = pool.add(Body::new(BodyConfig::at(Vec2::new(64.0, 64.0))));
//!
//! let mut clock = FixedTimestep::default();
//! for _ in 0..clock.advance(std::time::Duration::from_millis(100)) {
//!     if let Some(body) = pool.get_mut(handle) {
//!         body.seek(Vec2::new(256.0, 256.0), 1.0);
//!     }
//!     pool.step();
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod foundation;
pub mod config;
pub mod spatial;
pub mod physics;
pub mod debug;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        debug::PhysicsDebugDraw,
        foundation::{
            math::{Rect, Vec2, Vec2Ext},
            time::FixedTimestep,
        },
        physics::{
            Body, BodyConfig, BodyHandle, BodyPool, CollisionHandler, CollisionResolver,
            CollisionStats, PhysicsError, PhysicsResult, Shape,
        },
        spatial::{QuadTree, QuadTreeConfig},
    };
}
