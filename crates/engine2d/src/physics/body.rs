//! Moving bodies: dynamics state, steering behaviours and integration
//!
//! A body owns its collision [`Shape`] and keeps the shape's transform in
//! sync with its own position and rotation. Steering helpers only add to
//! the accumulated force; motion changes once per tick in [`Body::update`].
//!
//! # Update gating
//!
//! A body with `update_period` N integrates every tick, but only every Nth
//! tick is a "real" update that clears the accumulated force and torque.
//! Acceleration is divided by N, so a force applied once per real update
//! acts over the whole period.

use std::fmt;

use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::config::Config;
use crate::foundation::math::{utils, Rect, Vec2, Vec2Ext};
use crate::physics::collision::Shape;
use crate::physics::error::{PhysicsError, PhysicsResult};

new_key_type! {
    /// Stable handle to a body stored in a [`crate::physics::BodyPool`]
    pub struct BodyHandle;
}

/// Receives a notification for every confirmed collision pair
///
/// Any `FnMut(&Body)` closure implements this trait.
pub trait CollisionHandler {
    /// Called once per detected pair with the other body
    fn on_collision_occurred(&mut self, other: &Body);
}

impl<F> CollisionHandler for F
where
    F: FnMut(&Body),
{
    fn on_collision_occurred(&mut self, other: &Body) {
        self(other);
    }
}

/// Per-body parameters, loadable from TOML or RON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Initial world position
    pub position: Vec2,
    /// Initial rotation in radians
    pub rotation: f32,
    /// Initial linear velocity (units per tick)
    pub velocity: Vec2,
    /// Initial angular velocity (radians per tick)
    pub angular_velocity: f32,
    /// Collision boundary
    pub shape: Shape,
    /// Mass, 0 for an immovable body
    pub mass: f32,
    /// Rotational inertia, 0 for a body that never spins from torque
    pub inertia: f32,
    /// Fraction of velocity lost every tick, in [0, 1]
    pub friction: f32,
    /// Bounciness in collisions, also used as angular damping
    pub restitution: f32,
    /// Cap on linear speed
    pub max_velocity: f32,
    /// Cap on angular speed
    pub max_angular_velocity: f32,
    /// Cap on accumulated force magnitude
    pub max_force: f32,
    /// Cap on accumulated torque magnitude
    pub max_torque: f32,
    /// Whether the body takes part in collision detection
    pub collision_enabled: bool,
    /// Ticks between real updates (1 = every tick)
    pub update_period: u32,
    /// Higher priorities update first
    pub priority: i32,
    /// Seed for the wander angle drift, random when absent
    pub wander_seed: Option<u64>,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            velocity: Vec2::zeros(),
            angular_velocity: 0.0,
            shape: Shape::circle(1.0),
            mass: 1.0,
            inertia: 1.0,
            friction: 0.0,
            restitution: 0.5,
            max_velocity: f32::MAX,
            max_angular_velocity: f32::MAX,
            max_force: f32::MAX,
            max_torque: f32::MAX,
            collision_enabled: true,
            update_period: 1,
            priority: 0,
            wander_seed: None,
        }
    }
}

impl BodyConfig {
    /// Default parameters placed at `position`
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Check every parameter is in range
    pub fn validate(&self) -> PhysicsResult<()> {
        let non_negative = [
            ("mass", self.mass),
            ("inertia", self.inertia),
            ("restitution", self.restitution),
            ("max_velocity", self.max_velocity),
            ("max_angular_velocity", self.max_angular_velocity),
            ("max_force", self.max_force),
            ("max_torque", self.max_torque),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(PhysicsError::InvalidBody(format!("{name} must be >= 0, got {value}")));
            }
        }

        if !(0.0..=1.0).contains(&self.friction) {
            return Err(PhysicsError::InvalidBody(format!(
                "friction must be in [0, 1], got {}",
                self.friction
            )));
        }
        if self.update_period == 0 {
            return Err(PhysicsError::InvalidBody("update_period must be at least 1".to_string()));
        }
        if !(self.position.x.is_finite() && self.position.y.is_finite() && self.rotation.is_finite()) {
            return Err(PhysicsError::InvalidBody("position and rotation must be finite".to_string()));
        }
        Ok(())
    }
}

impl Config for BodyConfig {}

/// Counts ticks between real updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateGate {
    period: u32,
    remaining: u32,
}

impl UpdateGate {
    /// Gate that opens every `period` ticks, starting with the first
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            remaining: 0,
        }
    }

    /// Ticks per real update
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Whether the next call to [`UpdateGate::tick`] opens the gate
    pub fn is_due(&self) -> bool {
        self.remaining == 0
    }

    /// Advance one tick, returning true on a real update
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            self.remaining = self.period - 1;
            true
        } else {
            self.remaining -= 1;
            false
        }
    }
}

struct CollisionCallback(Box<dyn CollisionHandler>);

impl fmt::Debug for CollisionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CollisionCallback")
    }
}

/// Rigid body with linear and angular dynamics
pub struct Body {
    handle: Option<BodyHandle>,
    shape: Shape,

    position: Vec2,
    rotation: f32,
    velocity: Vec2,
    angular_velocity: f32,
    force: Vec2,
    torque: f32,

    mass: f32,
    inv_mass: f32,
    inertia: f32,
    inv_inertia: f32,
    friction: f32,
    restitution: f32,

    max_velocity: f32,
    max_angular_velocity: f32,
    max_force: f32,
    max_torque: f32,

    collision_enabled: bool,
    collision_checked: bool,
    update_gate: UpdateGate,
    priority: i32,

    wander_angle: f32,
    rng: StdRng,
    collision_handler: Option<CollisionCallback>,
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("handle", &self.handle)
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("velocity", &self.velocity)
            .field("angular_velocity", &self.angular_velocity)
            .field("mass", &self.mass)
            .field("collision_enabled", &self.collision_enabled)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new(BodyConfig::default())
    }
}

impl Body {
    /// Create a body without validating its parameters
    pub fn new(config: BodyConfig) -> Self {
        let BodyConfig {
            position,
            rotation,
            velocity,
            angular_velocity,
            mut shape,
            mass,
            inertia,
            friction,
            restitution,
            max_velocity,
            max_angular_velocity,
            max_force,
            max_torque,
            collision_enabled,
            update_period,
            priority,
            wander_seed,
        } = config;

        shape.set_position(position);
        shape.set_rotation(rotation);

        let rng = match wander_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            handle: None,
            shape,
            position,
            rotation,
            velocity,
            angular_velocity,
            force: Vec2::zeros(),
            torque: 0.0,
            mass,
            inv_mass: utils::inverse_or_zero(mass),
            inertia,
            inv_inertia: utils::inverse_or_zero(inertia),
            friction,
            restitution,
            max_velocity,
            max_angular_velocity,
            max_force,
            max_torque,
            collision_enabled,
            collision_checked: false,
            update_gate: UpdateGate::new(update_period),
            priority,
            wander_angle: 0.0,
            rng,
            collision_handler: None,
        }
    }

    /// Create a body after validating its parameters
    pub fn try_new(config: BodyConfig) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // ---- integration ----

    /// Integrate force and torque into velocity and position for one tick
    pub fn update(&mut self) {
        self.velocity = self.estimate_velocity();
        self.angular_velocity = self.estimate_angular_velocity();

        self.set_position(self.position + self.velocity);
        self.set_rotation(self.rotation + self.angular_velocity);

        if self.update_gate.tick() {
            self.force = Vec2::zeros();
            self.torque = 0.0;
        }
    }

    fn tick_period(&self) -> f32 {
        self.update_gate.period() as f32
    }

    /// Velocity the next update would produce from the current force
    fn estimate_velocity(&self) -> Vec2 {
        let acceleration = self.force.truncate(self.max_force) * self.inv_mass / self.tick_period();
        (self.velocity * (1.0 - self.friction) + acceleration).truncate(self.max_velocity)
    }

    fn estimate_angular_velocity(&self) -> f32 {
        let torque = utils::clamp_magnitude(self.torque, self.max_torque);
        let acceleration = torque * self.inv_inertia / self.tick_period();
        utils::clamp_magnitude(
            self.angular_velocity * (1.0 - self.restitution) + acceleration,
            self.max_angular_velocity,
        )
    }

    /// Where the body would be after `ticks` ticks at the velocity its
    /// current force would produce
    pub fn future_position(&self, ticks: f32) -> Vec2 {
        self.position + self.estimate_velocity() * ticks
    }

    /// Zero velocity, angular velocity, force and torque
    pub fn stop(&mut self) {
        self.velocity = Vec2::zeros();
        self.angular_velocity = 0.0;
        self.force = Vec2::zeros();
        self.torque = 0.0;
    }

    /// Move by `delta` without touching velocity
    pub fn offset(&mut self, delta: Vec2) {
        self.set_position(self.position + delta);
    }

    /// Unit vector along the velocity, zero when at rest
    pub fn forward(&self) -> Vec2 {
        self.velocity.normalize_or_zero()
    }

    // ---- forces ----

    /// Add to the accumulated force
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Add a force applied at `lever` from the center, producing torque too
    pub fn add_force_at(&mut self, force: Vec2, lever: Vec2) {
        self.add_force(force);
        self.add_torque(lever.perp(&force));
    }

    /// Add to the accumulated torque
    pub fn add_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    fn add_weighted_force(&mut self, force: Vec2, weight: f32) {
        if weight == 0.0 {
            return;
        }
        self.add_force(force * weight);
    }

    // ---- steering ----

    /// Steer towards `target`
    pub fn seek(&mut self, target: Vec2, weight: f32) {
        let desired = (target - self.position).normalize_or_zero() * self.max_velocity;
        self.add_weighted_force(desired - self.velocity, weight);
    }

    /// Steer away from `target`
    pub fn flee(&mut self, target: Vec2, weight: f32) {
        let desired = (self.position - target).normalize_or_zero() * self.max_velocity;
        self.add_weighted_force(desired - self.velocity, weight);
    }

    /// Steer towards a point on a circle ahead of the body whose angle
    /// drifts randomly by up to `angle_change` per call
    pub fn wander(&mut self, angle_change: f32, wander_radius: f32, weight: f32) {
        let circle_center = self.velocity.normalize_or_zero() * wander_radius;
        let displacement = Vec2::new(0.0, -wander_radius).rotated(self.wander_angle);

        let drift: f32 = self.rng.gen();
        self.wander_angle += drift * angle_change - angle_change * 0.5;

        let desired = (circle_center + displacement).truncate(self.max_force);
        self.add_weighted_force(desired, weight);

        // Force survives skipped ticks when update_period > 1
        self.force = self.force.truncate(self.max_force);
    }

    /// Steer away from every neighbor closer than `range`
    pub fn separate(&mut self, neighbors: &[Vec2], range: f32, weight: f32) {
        let mut away = Vec2::zeros();
        let mut count = 0_u32;

        for neighbor in neighbors {
            let distance = self.position.distance(neighbor);
            if distance > 0.0 && distance < range {
                away += (self.position - neighbor) / distance;
                count += 1;
            }
        }

        if count > 0 {
            let desired = (away / count as f32).truncate(self.max_force);
            self.add_weighted_force(desired, weight);
        }
    }

    /// Pull the body back if its projected position leaves the circle
    pub fn restrict_to_circle(&mut self, center: Vec2, radius: f32) {
        if self.future_position(self.tick_period()).distance(&center) > radius {
            self.push_back_towards(center);
        }
    }

    /// Pull the body back if its projected position leaves the region
    pub fn restrict_to_region(&mut self, region: &Rect) {
        if !region.contains_point(self.future_position(self.tick_period())) {
            self.push_back_towards(region.center());
        }
    }

    fn push_back_towards(&mut self, target: Vec2) {
        trace!("body {:?} leaving bounds, pushing towards {target:?}", self.handle);
        self.velocity = Vec2::zeros();
        self.force = (target - self.position).normalize_or_zero() * self.max_force;
    }

    // ---- collision ----

    /// Install the callback invoked for every confirmed collision
    pub fn set_collision_handler(&mut self, handler: impl CollisionHandler + 'static) {
        self.collision_handler = Some(CollisionCallback(Box::new(handler)));
    }

    /// Remove the collision callback
    pub fn clear_collision_handler(&mut self) {
        self.collision_handler = None;
    }

    pub(crate) fn notify_collision(&mut self, other: &Body) {
        if let Some(CollisionCallback(handler)) = self.collision_handler.as_mut() {
            handler.on_collision_occurred(other);
        }
    }

    pub(crate) fn set_collision_checked(&mut self, checked: bool) {
        self.collision_checked = checked;
    }

    /// Whether the body was already used as a reference in the current pass
    pub fn is_collision_checked(&self) -> bool {
        self.collision_checked
    }

    /// Whether the body takes part in collision detection
    pub fn is_collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    /// Enable or disable collision detection for this body
    pub fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision_enabled = enabled;
    }

    // ---- accessors ----

    /// Handle assigned by the pool, if the body is stored in one
    pub fn handle(&self) -> Option<BodyHandle> {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: Option<BodyHandle>) {
        self.handle = handle;
    }

    /// Collision boundary in world space
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Replace the collision boundary, moving it to the body's transform
    pub fn set_shape(&mut self, mut shape: Shape) {
        shape.set_position(self.position);
        shape.set_rotation(self.rotation);
        self.shape = shape;
    }

    /// World position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Teleport to `position`
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.shape.set_position(position);
    }

    /// Rotation in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set rotation in radians
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.shape.set_rotation(rotation);
    }

    /// Linear velocity
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Set linear velocity
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Angular velocity in radians per tick
    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Set angular velocity
    pub fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.angular_velocity = angular_velocity;
    }

    /// Force accumulated since the last real update
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Torque accumulated since the last real update
    pub fn torque(&self) -> f32 {
        self.torque
    }

    /// Mass, 0 meaning immovable
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set mass and its reciprocal
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.inv_mass = utils::inverse_or_zero(mass);
    }

    /// Reciprocal of mass, 0 for an immovable body
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Rotational inertia
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    /// Set inertia and its reciprocal
    pub fn set_inertia(&mut self, inertia: f32) {
        self.inertia = inertia;
        self.inv_inertia = utils::inverse_or_zero(inertia);
    }

    /// Reciprocal of inertia
    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    /// Fraction of velocity lost per tick
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Set friction
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    /// Collision bounciness and angular damping
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Set restitution
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    /// Linear speed cap
    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    /// Set linear speed cap
    pub fn set_max_velocity(&mut self, max_velocity: f32) {
        self.max_velocity = max_velocity;
    }

    /// Angular speed cap
    pub fn max_angular_velocity(&self) -> f32 {
        self.max_angular_velocity
    }

    /// Set angular speed cap
    pub fn set_max_angular_velocity(&mut self, max_angular_velocity: f32) {
        self.max_angular_velocity = max_angular_velocity;
    }

    /// Force magnitude cap
    pub fn max_force(&self) -> f32 {
        self.max_force
    }

    /// Set force magnitude cap
    pub fn set_max_force(&mut self, max_force: f32) {
        self.max_force = max_force;
    }

    /// Torque magnitude cap
    pub fn max_torque(&self) -> f32 {
        self.max_torque
    }

    /// Set torque magnitude cap
    pub fn set_max_torque(&mut self, max_torque: f32) {
        self.max_torque = max_torque;
    }

    /// Update priority, higher first
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Set update priority
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Gate deciding which ticks are real updates
    pub fn update_gate(&self) -> &UpdateGate {
        &self.update_gate
    }

    /// Change the number of ticks between real updates
    pub fn set_update_period(&mut self, period: u32) {
        self.update_gate = UpdateGate::new(period);
    }

    /// Current wander angle in radians
    pub fn wander_angle(&self) -> f32 {
        self.wander_angle
    }
}
