//! Body pool: storage, broad phase and per-tick stepping
//!
//! A pool owns every body sharing one world region and a quadtree over that
//! region. Each collision pass rebuilds the tree from the current body
//! bounds, then tests every enabled body against the candidates the tree
//! returns. A body is marked checked once it has served as the reference,
//! so each pair is resolved at most once per pass.

use std::cmp::Reverse;

use log::{debug, warn};
use slotmap::SlotMap;

use crate::config::PhysicsConfig;
use crate::foundation::math::{Rect, Vec2, Vec2Ext};
use crate::physics::body::{Body, BodyHandle};
use crate::physics::collision::{CollisionResolver, ResolverConfig};
use crate::physics::error::{PhysicsError, PhysicsResult};
use crate::spatial::{QuadTree, QuadTreeConfig};

/// Counters from one collision pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Bodies inserted into the quadtree
    pub indexed: usize,
    /// Candidate pairs that reached the narrow phase
    pub pairs_tested: usize,
    /// Pairs that actually overlapped
    pub contacts: usize,
}

/// Set of bodies sharing one spatial region
#[derive(Debug)]
pub struct BodyPool {
    bodies: SlotMap<BodyHandle, Body>,
    /// Insertion order, used for deterministic iteration
    order: Vec<BodyHandle>,
    quadtree: QuadTree<BodyHandle>,
    resolver: CollisionResolver,
    respond: bool,
    candidates: Vec<BodyHandle>,
}

impl BodyPool {
    /// Create an empty pool over `region` with default tree and resolver settings
    pub fn new(region: Rect, respond: bool) -> Self {
        Self::with_settings(region, respond, QuadTreeConfig::default(), ResolverConfig::default())
    }

    /// Create an empty pool with explicit tree and resolver settings
    pub fn with_settings(
        region: Rect,
        respond: bool,
        quadtree: QuadTreeConfig,
        resolver: ResolverConfig,
    ) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            order: Vec::new(),
            quadtree: QuadTree::new(region, quadtree),
            resolver: CollisionResolver::new(resolver),
            respond,
            candidates: Vec::new(),
        }
    }

    /// Create an empty pool from simulation settings
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::with_settings(
            config.world_region(),
            config.respond,
            config.quadtree.clone(),
            config.resolver.clone(),
        )
    }

    // ---- storage ----

    /// Take ownership of a body and return its handle
    pub fn add(&mut self, mut body: Body) -> BodyHandle {
        if !body.shape().is_valid() {
            warn!("adding body with an invalid shape, it will never collide");
        }

        let handle = self.bodies.insert_with_key(|handle| {
            body.set_handle(Some(handle));
            body
        });
        self.order.push(handle);
        handle
    }

    /// Remove a body, returning it
    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let mut body = self.bodies.remove(handle)?;
        self.order.retain(|&other| other != handle);
        body.set_handle(None);
        Some(body)
    }

    /// Look up a body
    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Look up a body mutably
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    /// Look up a body, failing on a stale handle
    pub fn try_get(&self, handle: BodyHandle) -> PhysicsResult<&Body> {
        self.bodies.get(handle).ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Look up a body mutably, failing on a stale handle
    pub fn try_get_mut(&mut self, handle: BodyHandle) -> PhysicsResult<&mut Body> {
        self.bodies.get_mut(handle).ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Whether `handle` refers to a body in this pool
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Number of bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the pool has no bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate bodies in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.order
            .iter()
            .filter_map(|&handle| self.bodies.get(handle).map(|body| (handle, body)))
    }

    /// Handles in insertion order
    pub fn handles(&self) -> &[BodyHandle] {
        &self.order
    }

    // ---- settings ----

    /// Whether collisions get an automatic response
    pub fn respond(&self) -> bool {
        self.respond
    }

    /// Switch between automatic response and detection only
    pub fn set_respond(&mut self, respond: bool) {
        self.respond = respond;
    }

    /// World region tracked by the quadtree
    pub fn region(&self) -> Rect {
        self.quadtree.region()
    }

    /// Quadtree as built by the last collision pass
    pub fn quadtree(&self) -> &QuadTree<BodyHandle> {
        &self.quadtree
    }

    /// Narrow-phase resolver
    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    // ---- simulation ----

    /// Handles sorted by descending priority, ties in insertion order
    pub fn update_order(&self) -> Vec<BodyHandle> {
        let mut order = self.order.clone();
        order.sort_by_key(|&handle| Reverse(self.bodies.get(handle).map_or(i32::MIN, Body::priority)));
        order
    }

    /// Run [`Body::update`] on every body, higher priority first.
    ///
    /// Bodies with equal priority update in insertion order.
    pub fn update_bodies(&mut self) {
        for handle in self.update_order() {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.update();
            }
        }
    }

    /// Rebuild the quadtree and detect (and optionally resolve) every
    /// overlapping pair of enabled bodies
    pub fn check_collision(&mut self) -> CollisionStats {
        let mut stats = CollisionStats::default();

        self.quadtree.clear();
        let mut indexed = Vec::with_capacity(self.order.len());
        for &handle in &self.order {
            let Some(body) = self.bodies.get(handle) else { continue };
            if !body.is_collision_enabled() || !body.shape().is_valid() {
                continue;
            }

            if self.quadtree.insert(handle, body.shape().minimum_covered_rect()) {
                indexed.push(handle);
            } else {
                debug!("body {handle:?} at {:?} is outside the tracked region", body.position());
            }
        }
        stats.indexed = indexed.len();

        let mut candidates = std::mem::take(&mut self.candidates);
        for &handle in &indexed {
            let Some(reference) = self.bodies.get(handle) else { continue };
            let query = reference.shape().minimum_covered_rect();

            candidates.clear();
            self.quadtree.retrieve(&mut candidates, &query);

            for &candidate in &candidates {
                let Some([a, b]) = self.bodies.get_disjoint_mut([handle, candidate]) else {
                    continue;
                };
                if b.is_collision_checked() {
                    continue;
                }

                stats.pairs_tested += 1;
                if self.resolver.check_and_respond_collision(a, b, self.respond) {
                    stats.contacts += 1;
                }
            }

            if let Some(reference) = self.bodies.get_mut(handle) {
                reference.set_collision_checked(true);
            }
        }
        self.candidates = candidates;

        for body in self.bodies.values_mut() {
            body.set_collision_checked(false);
        }

        debug!(
            "collision pass: {} indexed, {} pairs tested, {} contacts",
            stats.indexed, stats.pairs_tested, stats.contacts
        );
        stats
    }

    /// One full tick: integrate every body, then run a collision pass
    pub fn step(&mut self) -> CollisionStats {
        self.update_bodies();
        self.check_collision()
    }

    /// Would `handle` overlap any other enabled body if it were at
    /// `candidate_position`?
    ///
    /// Uses only the exact test: no response, no callbacks, and the body
    /// itself is left untouched. Unknown handles never collide.
    pub fn test_collision(&self, handle: BodyHandle, candidate_position: Vec2) -> bool {
        let Some(body) = self.bodies.get(handle) else {
            return false;
        };

        let mut probe = body.shape().clone();
        probe.set_position(candidate_position);

        self.iter()
            .filter(|&(other, _)| other != handle)
            .filter(|(_, other)| other.is_collision_enabled())
            .any(|(_, other)| self.resolver.check_shapes(&probe, other.shape()))
    }

    /// Positions of the other bodies within `range` of `handle`, for
    /// [`Body::separate`]
    pub fn neighbor_positions(&self, handle: BodyHandle, range: f32) -> Vec<Vec2> {
        let Some(body) = self.bodies.get(handle) else {
            return Vec::new();
        };
        let center = body.position();

        self.iter()
            .filter(|&(other, _)| other != handle)
            .map(|(_, other)| other.position())
            .filter(|position| position.distance(&center) < range)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::logging;
    use crate::physics::body::BodyConfig;
    use crate::physics::collision::Shape;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pool() -> BodyPool {
        BodyPool::new(Rect::from_size(100.0, 100.0), true)
    }

    fn circle(x: f32, y: f32) -> Body {
        Body::new(BodyConfig {
            position: Vec2::new(x, y),
            shape: Shape::circle(1.0),
            wander_seed: Some(1),
            ..Default::default()
        })
    }

    #[test]
    fn test_add_remove_keeps_order() {
        let mut pool = pool();
        let a = pool.add(circle(10.0, 10.0));
        let b = pool.add(circle(20.0, 10.0));
        let c = pool.add(circle(30.0, 10.0));

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(b).and_then(Body::handle), Some(b));

        let removed = pool.remove(b).unwrap();
        assert_eq!(removed.handle(), None);
        assert!(!pool.contains(b));
        assert!(matches!(pool.try_get(b), Err(PhysicsError::UnknownBody(_))));
        assert_eq!(pool.handles(), &[a, c]);
    }

    #[test]
    fn test_each_pair_resolved_once() {
        logging::init_for_tests();
        let mut pool = BodyPool::new(Rect::from_size(100.0, 100.0), false);
        let hits: Rc<RefCell<Vec<Vec2>>> = Rc::default();

        for x in [10.0, 11.0, 11.5] {
            let mut body = circle(x, 10.0);
            let log = Rc::clone(&hits);
            body.set_collision_handler(move |other: &Body| log.borrow_mut().push(other.position()));
            pool.add(body);
        }

        let stats = pool.check_collision();
        // All three pairs overlap and each notifies both sides
        assert_eq!(stats.contacts, 3);
        assert_eq!(hits.borrow().len(), 6);
        assert!(pool.iter().all(|(_, body)| !body.is_collision_checked()));
    }

    #[test]
    fn test_disabled_bodies_are_skipped() {
        let mut pool = pool();
        pool.add(circle(10.0, 10.0));
        let mut ghost = circle(10.5, 10.0);
        ghost.set_collision_enabled(false);
        pool.add(ghost);

        let stats = pool.check_collision();
        assert_eq!(stats.indexed, 1);
        assert_eq!(stats.contacts, 0);
    }

    #[test]
    fn test_respond_separates_bodies() {
        let mut pool = pool();
        let a = pool.add(circle(50.0, 50.0));
        let b = pool.add(circle(51.0, 50.0));

        assert_eq!(pool.check_collision().contacts, 1);
        assert_eq!(pool.check_collision().contacts, 0);

        let distance = pool.get(a).unwrap().position().distance(&pool.get(b).unwrap().position());
        assert!(distance > 2.0);
    }

    #[test]
    fn test_outside_region_excluded() {
        let mut pool = pool();
        pool.add(circle(500.0, 500.0));
        pool.add(circle(500.5, 500.0));
        let stats = pool.check_collision();
        assert_eq!(stats.indexed, 0);
        assert_eq!(stats.contacts, 0);
    }

    #[test]
    fn test_test_collision_has_no_side_effects() {
        let mut pool = pool();
        let mover = pool.add(circle(10.0, 10.0));
        pool.add(circle(20.0, 10.0));
        let before = pool.get(mover).unwrap().position();

        assert!(pool.test_collision(mover, Vec2::new(19.0, 10.0)));
        assert!(!pool.test_collision(mover, Vec2::new(15.0, 10.0)));
        assert_eq!(pool.get(mover).unwrap().position(), before);
        assert_eq!(pool.get(mover).unwrap().shape().position(), before);
    }

    #[test]
    fn test_update_order_by_priority() {
        let mut pool = pool();
        let handles: Vec<_> = [0, 5, 0, 9]
            .into_iter()
            .map(|priority| {
                let mut body = circle(10.0, 10.0);
                body.set_priority(priority);
                body.set_velocity(Vec2::new(1.0, 0.0));
                pool.add(body)
            })
            .collect();

        // Ties keep insertion order
        assert_eq!(pool.update_order(), vec![handles[3], handles[1], handles[0], handles[2]]);

        pool.update_bodies();
        assert!(pool.iter().all(|(_, body)| body.position() == Vec2::new(11.0, 10.0)));
    }

    #[test]
    fn test_neighbor_positions() {
        let mut pool = pool();
        let a = pool.add(circle(10.0, 10.0));
        pool.add(circle(12.0, 10.0));
        pool.add(circle(40.0, 10.0));

        assert_eq!(pool.neighbor_positions(a, 5.0), vec![Vec2::new(12.0, 10.0)]);
    }

    #[test]
    fn test_step_integrates_then_collides() {
        let mut pool = pool();
        let a = pool.add(circle(10.0, 10.0));
        let b = pool.add(circle(13.0, 10.0));
        pool.get_mut(a).unwrap().set_velocity(Vec2::new(1.5, 0.0));

        let stats = pool.step();
        assert_eq!(stats.contacts, 1);
        assert!(pool.get(b).unwrap().position().x > 13.0);
    }
}
