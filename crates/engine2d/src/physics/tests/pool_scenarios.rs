//! Whole-pool scenarios driven the way a scene loop drives them

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::PhysicsConfig;
use crate::foundation::logging;
use crate::foundation::math::{Rect, Vec2};
use crate::physics::{Body, BodyConfig, BodyPool, Shape};

fn unit_circle(position: Vec2, mass: f32) -> Body {
    Body::new(BodyConfig {
        position,
        mass,
        shape: Shape::circle(1.0),
        wander_seed: Some(3),
        ..Default::default()
    })
}

#[test]
fn test_finite_body_pushed_off_infinite_body() {
    logging::init_for_tests();
    let mut pool = BodyPool::new(Rect::from_size(20.0, 20.0), true);
    let light = pool.add(unit_circle(Vec2::new(10.0, 10.0), 1.0));
    let heavy = pool.add(unit_circle(Vec2::new(11.5, 10.0), 0.0));

    let stats = pool.check_collision();
    assert_eq!(stats.contacts, 1);

    let light_pos = pool.get(light).unwrap().position();
    let heavy_pos = pool.get(heavy).unwrap().position();
    assert_eq!(heavy_pos, Vec2::new(11.5, 10.0));
    assert!(light_pos.x < 10.0);
    assert_relative_eq!(light_pos.y, 10.0);
    assert!(!pool.resolver().check_collision(pool.get(light).unwrap(), pool.get(heavy).unwrap()));
    assert_eq!(pool.check_collision().contacts, 0);
}

#[test]
fn test_speculative_query_fires_no_callbacks() {
    let mut pool = BodyPool::new(Rect::from_size(50.0, 50.0), true);
    let hits = Rc::new(Cell::new(0));

    let mut handles = Vec::new();
    for i in 0..10 {
        let mut body = unit_circle(Vec2::new(5.0 + i as f32 * 4.0, 25.0), 1.0);
        let counter = Rc::clone(&hits);
        body.set_collision_handler(move |_other: &Body| counter.set(counter.get() + 1));
        handles.push(pool.add(body));
    }

    let mover = handles[0];
    let before = pool.get(mover).unwrap().position();
    let velocity_before = pool.get(mover).unwrap().velocity();

    assert!(pool.test_collision(mover, Vec2::new(9.5, 25.0)));
    assert!(!pool.test_collision(mover, Vec2::new(5.0, 5.0)));

    let body = pool.get(mover).unwrap();
    assert_eq!(body.position(), before);
    assert_eq!(body.velocity(), velocity_before);
    assert_eq!(hits.get(), 0);
}

#[test]
fn test_disabled_body_invisible_to_speculative_query() {
    let mut pool = BodyPool::new(Rect::from_size(50.0, 50.0), true);
    let mover = pool.add(unit_circle(Vec2::new(5.0, 5.0), 1.0));
    let mut ghost = unit_circle(Vec2::new(20.0, 20.0), 1.0);
    ghost.set_collision_enabled(false);
    pool.add(ghost);

    assert!(!pool.test_collision(mover, Vec2::new(20.0, 20.0)));
}

#[test]
fn test_detection_only_pool_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(41);
    let config = PhysicsConfig {
        world_width: 120.0,
        world_height: 120.0,
        respond: false,
        ..Default::default()
    };
    let mut pool = BodyPool::from_config(&config);

    for i in 0..200 {
        let shape = if i % 3 == 0 {
            Shape::rectangle(rng.gen_range(1.0..5.0), rng.gen_range(1.0..5.0))
        } else {
            Shape::circle(rng.gen_range(0.5..2.5))
        };
        pool.add(Body::new(BodyConfig {
            position: Vec2::new(rng.gen_range(2.0..118.0), rng.gen_range(2.0..118.0)),
            shape,
            wander_seed: Some(i),
            ..Default::default()
        }));
    }

    let bodies: Vec<&Body> = pool.iter().map(|(_, body)| body).collect();
    let mut expected = 0;
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            if pool.resolver().check_collision(a, b) {
                expected += 1;
            }
        }
    }
    assert!(expected > 0);

    let stats = pool.check_collision();
    assert_eq!(stats.indexed, 200);
    assert_eq!(stats.contacts, expected);
    assert!(stats.pairs_tested < 200 * 199 / 2);
}

#[test]
fn test_wandering_swarm_respects_force_cap() {
    let region = Rect::from_size(200.0, 200.0);
    let mut pool = BodyPool::new(region, true);
    let mut rng = StdRng::seed_from_u64(9);

    for seed in 0..20 {
        pool.add(Body::new(BodyConfig {
            position: Vec2::new(rng.gen_range(20.0..180.0), rng.gen_range(20.0..180.0)),
            max_force: 0.5,
            max_velocity: 2.0,
            friction: 0.05,
            wander_seed: Some(seed),
            ..Default::default()
        }));
    }

    let handles = pool.handles().to_vec();
    for _ in 0..1000 {
        for &handle in &handles {
            let body = pool.get_mut(handle).unwrap();
            body.wander(0.4, 3.0, 1.0);
            assert!(body.force().magnitude() <= 0.5 + 1e-5);
        }
        pool.step();
    }

    assert!(pool.iter().all(|(_, body)| {
        let position = body.position();
        position.x.is_finite() && position.y.is_finite()
    }));
}

#[test]
fn test_clamped_clock_drives_bounded_ticks() {
    let config = PhysicsConfig::default();
    let mut clock = config.timestep();
    let mut pool = BodyPool::from_config(&config);
    let handle = pool.add(Body::new(BodyConfig {
        position: Vec2::new(100.0, 100.0),
        velocity: Vec2::new(1.0, 0.0),
        ..Default::default()
    }));

    // A two second stall only catches up 200ms: six 30Hz ticks
    let ticks = clock.advance(Duration::from_secs(2));
    assert_eq!(ticks, 6);

    for _ in 0..ticks {
        pool.step();
    }
    assert_relative_eq!(pool.get(handle).unwrap().position().x, 100.0 + ticks as f32);
}
