//! Swarm Demo
//!
//! Headless run of the simulation core:
//! - Wandering circles and boxes that keep apart and stay inside the world
//! - A few immovable pillars they bounce off
//! - Fixed 30Hz ticks driven from synthetic frame times, including a stall
//! - Per-second collision statistics and a debug-draw snapshot at the end
//!
//! Usage: `swarm_demo [physics.toml|physics.ron] [frames]`

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use engine2d::config::{Config, ConfigError, PhysicsConfig};
use engine2d::debug::PhysicsDebugDraw;
use engine2d::foundation::logging;
use engine2d::foundation::math::{Rect, Vec2};
use engine2d::foundation::time::FixedTimestep;
use engine2d::physics::{Body, BodyConfig, BodyHandle, BodyPool, CollisionStats, PhysicsError, Shape};
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

// Swarm composition
const NUM_CIRCLES: usize = 60;
const NUM_BOXES: usize = 20;
const NUM_PILLARS: usize = 4;

// Steering
const WANDER_ANGLE_CHANGE: f32 = 0.5;
const WANDER_RADIUS: f32 = 6.0;
const SEPARATION_RANGE: f32 = 12.0;
const SEPARATION_WEIGHT: f32 = 0.8;
const WORLD_MARGIN: f32 = 16.0;

// Synthetic frame pacing
const DEFAULT_FRAMES: u32 = 600;
const FRAME_TIME: Duration = Duration::from_millis(16);
const STALL_FRAME: u32 = 200;
const STALL_TIME: Duration = Duration::from_secs(1);

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),

    #[error("invalid frame count: {0}")]
    FrameCount(String),
}

struct SwarmApp {
    pool: BodyPool,
    clock: FixedTimestep,
    movers: Vec<BodyHandle>,
    bounds: Rect,
    contacts: Rc<Cell<u64>>,
    debug_draw: PhysicsDebugDraw,

    // Stats accumulated over the current simulated second
    window_stats: CollisionStats,
    window_ticks: u32,
}

impl SwarmApp {
    fn new(config: &PhysicsConfig) -> Result<Self, DemoError> {
        config.validate()?;

        let region = config.world_region();
        let bounds = Rect::new(
            region.min + Vec2::new(WORLD_MARGIN, WORLD_MARGIN),
            region.max - Vec2::new(WORLD_MARGIN, WORLD_MARGIN),
        );

        let mut app = Self {
            pool: BodyPool::from_config(config),
            clock: config.timestep(),
            movers: Vec::new(),
            bounds,
            contacts: Rc::new(Cell::new(0)),
            debug_draw: PhysicsDebugDraw::new(),
            window_stats: CollisionStats::default(),
            window_ticks: 0,
        };
        app.spawn_bodies()?;
        Ok(app)
    }

    fn spawn_bodies(&mut self) -> Result<(), DemoError> {
        let mut rng = StdRng::seed_from_u64(2024);
        let center = self.bounds.center();

        // Pillars on a ring around the center
        for i in 0..NUM_PILLARS {
            let angle = std::f32::consts::TAU * i as f32 / NUM_PILLARS as f32;
            let offset = Vec2::new(angle.cos(), angle.sin()) * self.bounds.extents().x * 0.5;
            let pillar = Body::try_new(BodyConfig {
                position: center + offset,
                shape: Shape::regular_polygon(6, 20.0),
                mass: 0.0,
                inertia: 0.0,
                priority: -1,
                ..Default::default()
            })?;
            self.pool.add(pillar);
        }

        for i in 0..NUM_CIRCLES + NUM_BOXES {
            let shape = if i < NUM_CIRCLES {
                Shape::circle(rng.gen_range(3.0..6.0))
            } else {
                Shape::rectangle(rng.gen_range(4.0..10.0), rng.gen_range(4.0..10.0))
            };
            let position = Vec2::new(
                rng.gen_range(self.bounds.min.x..self.bounds.max.x),
                rng.gen_range(self.bounds.min.y..self.bounds.max.y),
            );

            let mut body = Body::try_new(BodyConfig {
                position,
                rotation: rng.gen_range(0.0..std::f32::consts::TAU),
                shape,
                mass: rng.gen_range(0.5..2.0),
                friction: 0.02,
                restitution: 0.6,
                max_velocity: 3.0,
                max_force: 0.4,
                max_angular_velocity: 0.2,
                max_torque: 0.5,
                update_period: if i % 4 == 0 { 2 } else { 1 },
                wander_seed: Some(i as u64),
                ..Default::default()
            })?;

            let contacts = Rc::clone(&self.contacts);
            body.set_collision_handler(move |_other: &Body| contacts.set(contacts.get() + 1));
            self.movers.push(self.pool.add(body));
        }

        info!(
            "Spawned {} bodies ({} pillars) in {:?}",
            self.pool.len(),
            NUM_PILLARS,
            self.pool.region()
        );
        Ok(())
    }

    /// Scene-loop order: steering, then integration and one collision pass
    fn tick(&mut self) {
        for &handle in &self.movers {
            let neighbors = self.pool.neighbor_positions(handle, SEPARATION_RANGE);
            let Some(body) = self.pool.get_mut(handle) else { continue };

            body.wander(WANDER_ANGLE_CHANGE, WANDER_RADIUS, 1.0);
            body.separate(&neighbors, SEPARATION_RANGE, SEPARATION_WEIGHT);
            body.restrict_to_region(&self.bounds);
        }

        let stats = self.pool.step();
        self.window_stats.indexed = stats.indexed;
        self.window_stats.pairs_tested += stats.pairs_tested;
        self.window_stats.contacts += stats.contacts;
        self.window_ticks += 1;

        if self.window_ticks >= 30 {
            info!(
                "tick {}: {} indexed, {} pairs tested, {} contacts in the last {} ticks",
                self.clock.tick_count(),
                self.window_stats.indexed,
                self.window_stats.pairs_tested,
                self.window_stats.contacts,
                self.window_ticks
            );
            self.window_stats = CollisionStats::default();
            self.window_ticks = 0;
        }
    }

    fn run(&mut self, frames: u32) {
        for frame in 0..frames {
            let elapsed = if frame == STALL_FRAME {
                warn!("Simulating a {STALL_TIME:?} stall at frame {frame}");
                STALL_TIME
            } else {
                FRAME_TIME
            };

            let ticks = self.clock.advance(elapsed);
            for _ in 0..ticks {
                self.tick();
            }
        }

        self.debug_draw.show_quadtree = true;
        self.debug_draw.capture(&self.pool);

        let escaped = self
            .pool
            .iter()
            .filter(|(_, body)| !self.pool.region().contains_point(body.position()))
            .count();
        info!(
            "Finished {} ticks: {} collision callbacks, {} debug primitives, {} bodies outside the world",
            self.clock.tick_count(),
            self.contacts.get(),
            self.debug_draw.shapes().len(),
            escaped
        );
    }
}

fn load_config(path: Option<&str>) -> Result<PhysicsConfig, DemoError> {
    match path {
        Some(path) => {
            info!("Loading physics config from {path}");
            Ok(PhysicsConfig::load_from_file(path)?)
        }
        None => Ok(PhysicsConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let frames = match args.get(1) {
        Some(text) => text
            .parse::<u32>()
            .map_err(|_| DemoError::FrameCount(text.clone()))?,
        None => DEFAULT_FRAMES,
    };

    info!("Starting swarm demo for {frames} frames");
    let mut app = SwarmApp::new(&config)?;
    app.run(frames);
    Ok(())
}
