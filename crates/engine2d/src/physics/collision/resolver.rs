//! Pairwise collision detection and response
//!
//! Detection is delegated to the narrow phase in [`super::sat`]. Response
//! has two parts:
//!
//! 1. **Positional correction**: the bodies are pushed apart along the
//!    contact normal, each by a share proportional to its inverse mass. A
//!    body with inverse mass 0 never moves.
//! 2. **Impulse**: if the bodies are approaching along the normal, the
//!    relative normal velocity is reflected and damped by the lower of the
//!    two restitution values.
//!
//! Collision callbacks fire on both bodies for every confirmed pair,
//! whether or not a response was applied.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::physics::body::Body;
use super::sat::{self, Contact};
use super::shape::Shape;

/// Tuning for the collision response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Extra distance added to every positional correction so resolved
    /// bodies end up strictly apart instead of exactly touching
    pub separation_slop: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            separation_slop: 1.0e-3,
        }
    }
}

/// Narrow-phase detector and impulse-based responder
#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    config: ResolverConfig,
}

impl CollisionResolver {
    /// Create a resolver with the given response settings
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Response settings in use
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Exact overlap test between two bodies' shapes
    pub fn check_collision(&self, a: &Body, b: &Body) -> bool {
        self.check_shapes(a.shape(), b.shape())
    }

    /// Exact overlap test between two shapes
    pub fn check_shapes(&self, a: &Shape, b: &Shape) -> bool {
        sat::shapes_overlap(a, b)
    }

    /// Detect an overlap and optionally resolve it.
    ///
    /// Returns true when the shapes overlap. Both bodies' collision
    /// handlers are invoked with the other body in that case.
    pub fn check_and_respond_collision(&self, a: &mut Body, b: &mut Body, respond: bool) -> bool {
        let Some(contact) = sat::find_contact(a.shape(), b.shape()) else {
            return false;
        };

        if respond {
            self.respond(a, b, &contact);
        }

        a.notify_collision(b);
        b.notify_collision(a);
        true
    }

    fn respond(&self, a: &mut Body, b: &mut Body, contact: &Contact) {
        let inv_mass_a = a.inv_mass();
        let inv_mass_b = b.inv_mass();
        let inv_mass_sum = inv_mass_a + inv_mass_b;
        if inv_mass_sum <= 0.0 {
            trace!("collision between two immovable bodies, no response");
            return;
        }

        let correction = contact.normal * ((contact.depth + self.config.separation_slop) / inv_mass_sum);
        a.offset(-correction * inv_mass_a);
        b.offset(correction * inv_mass_b);

        let approach_speed = (b.velocity() - a.velocity()).dot(&contact.normal);
        if approach_speed >= 0.0 {
            return;
        }

        let restitution = a.restitution().min(b.restitution());
        let impulse = contact.normal * (-(1.0 + restitution) * approach_speed / inv_mass_sum);
        a.set_velocity(a.velocity() - impulse * inv_mass_a);
        b.set_velocity(b.velocity() + impulse * inv_mass_b);
    }
}
