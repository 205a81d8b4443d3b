//! Procedural obstacle spawning.
//!
//! Spacing is gated on both a frame interval and the distance the rightmost
//! obstacle has travelled from the spawn edge, so fast obstacles cannot bunch
//! up. The only anti-repetition rule: a tall obstacle is never followed by
//! another tall one.

use glam::{Quat, Vec3};
use joyrun_common::{EntityId, Transform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// Primitive obstacle shapes, chosen uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Box,
    Torus,
    Sphere,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Box, ShapeKind::Torus, ShapeKind::Sphere];

    /// Stable index in `0..3`.
    pub fn index(self) -> u8 {
        match self {
            Self::Box => 0,
            Self::Torus => 1,
            Self::Sphere => 2,
        }
    }
}

/// Vertical scale of a short obstacle.
pub const SHORT: u8 = 1;
/// Vertical scale of a tall obstacle.
pub const TALL: u8 = 2;

/// A live obstacle owned by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub shape: ShapeKind,
    pub x: f32,
    /// Center height, derived from `vertical_scale` so the base stays grounded.
    pub y: f32,
    pub vertical_scale: u8,
    /// World units per frame.
    pub speed: f32,
    pub spawn_frame: u64,
    /// Cosmetic Y rotation.
    pub spin: f32,
}

impl Obstacle {
    pub fn is_tall(&self) -> bool {
        self.vertical_scale == TALL
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: Vec3::new(self.x, self.y, 0.0),
            rotation: Quat::from_rotation_y(self.spin),
            scale: Vec3::new(1.0, self.vertical_scale as f32, 1.0),
        }
    }
}

/// Timing/spacing policy plus the RNG that drives shape, speed and height.
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    frames_since_spawn: u32,
    last_was_tall: bool,
    rng: StdRng,
}

impl ObstacleSpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            frames_since_spawn: 0,
            last_was_tall: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn frames_since_spawn(&self) -> u32 {
        self.frames_since_spawn
    }

    /// Forget the timer and the previous height. The RNG stream continues.
    pub fn reset(&mut self) {
        self.frames_since_spawn = 0;
        self.last_was_tall = false;
    }

    /// Count one frame and spawn if both the interval and the clearance allow.
    pub fn tick(&mut self, frame: u64, live: &[Obstacle], config: &SimConfig) -> Option<Obstacle> {
        self.frames_since_spawn += 1;
        if self.frames_since_spawn <= config.min_spawn_interval {
            return None;
        }

        let rightmost = live.iter().map(|o| o.x).reduce(f32::max);
        let clear = rightmost.is_none_or(|x| x <= config.spawn_edge - config.min_clearance);
        if !clear {
            return None;
        }

        let shape = ShapeKind::ALL[self.rng.gen_range(0..ShapeKind::ALL.len())];
        let vertical_scale = if self.last_was_tall {
            SHORT
        } else if self.rng.gen_bool(0.5) {
            TALL
        } else {
            SHORT
        };
        let speed = if config.obstacle_speed_max > config.obstacle_speed_min {
            self.rng
                .gen_range(config.obstacle_speed_min..config.obstacle_speed_max)
        } else {
            config.obstacle_speed_min
        };

        self.frames_since_spawn = 0;
        self.last_was_tall = vertical_scale == TALL;

        Some(Obstacle {
            id: EntityId::new(),
            shape,
            x: config.spawn_edge,
            y: config.obstacle_base_height + (vertical_scale - SHORT) as f32 * config.tall_lift,
            vertical_scale,
            speed,
            spawn_frame: frame,
            spin: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn far_behind(config: &SimConfig) -> Obstacle {
        Obstacle {
            id: EntityId::new(),
            shape: ShapeKind::Box,
            x: config.spawn_edge - config.min_clearance - 1.0,
            y: config.obstacle_base_height,
            vertical_scale: SHORT,
            speed: 0.2,
            spawn_frame: 0,
            spin: 0.0,
        }
    }

    #[test]
    fn waits_for_min_interval() {
        let config = SimConfig::default();
        let mut spawner = ObstacleSpawner::new(1);
        for frame in 1..=u64::from(config.min_spawn_interval) {
            assert!(spawner.tick(frame, &[], &config).is_none());
        }
        let obs = spawner
            .tick(u64::from(config.min_spawn_interval) + 1, &[], &config)
            .unwrap();
        assert_eq!(obs.x, config.spawn_edge);
        assert_eq!(spawner.frames_since_spawn(), 0);
    }

    #[test]
    fn blocked_until_rightmost_clears() {
        let config = SimConfig::default();
        let mut spawner = ObstacleSpawner::new(2);
        let mut near = far_behind(&config);
        near.x = config.spawn_edge - config.min_clearance + 0.5;
        for frame in 1..500 {
            assert!(spawner.tick(frame, std::slice::from_ref(&near), &config).is_none());
        }
        near.x = config.spawn_edge - config.min_clearance;
        assert!(spawner.tick(500, &[near], &config).is_some());
    }

    #[test]
    fn no_two_consecutive_talls() {
        let mut config = SimConfig::default();
        config.min_spawn_interval = 0;
        let mut spawner = ObstacleSpawner::new(7);
        let mut previous_tall = false;
        let mut talls = 0;
        for frame in 1..2000 {
            let obs = spawner.tick(frame, &[], &config).unwrap();
            assert!(!(previous_tall && obs.is_tall()), "two talls in a row at frame {frame}");
            previous_tall = obs.is_tall();
            talls += usize::from(obs.is_tall());
        }
        assert!(talls > 300, "tall obstacles should still be common, got {talls}");
    }

    #[test]
    fn height_follows_scale() {
        let mut config = SimConfig::default();
        config.min_spawn_interval = 0;
        let mut spawner = ObstacleSpawner::new(11);
        for frame in 1..200 {
            let obs = spawner.tick(frame, &[], &config).unwrap();
            let expected = match obs.vertical_scale {
                SHORT => config.obstacle_base_height,
                TALL => config.obstacle_base_height + config.tall_lift,
                other => panic!("unexpected scale {other}"),
            };
            assert!((obs.y - expected).abs() < 1e-6);
            assert!(obs.speed >= config.obstacle_speed_min && obs.speed < config.obstacle_speed_max);
        }
    }

    #[test]
    fn every_shape_appears() {
        let mut config = SimConfig::default();
        config.min_spawn_interval = 0;
        let mut spawner = ObstacleSpawner::new(3);
        let mut seen = [false; 3];
        for frame in 1..300 {
            let obs = spawner.tick(frame, &[], &config).unwrap();
            seen[obs.shape.index() as usize] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut config = SimConfig::default();
        config.min_spawn_interval = 0;
        let mut a = ObstacleSpawner::new(42);
        let mut b = ObstacleSpawner::new(42);
        for frame in 1..50 {
            let x = a.tick(frame, &[], &config).unwrap();
            let y = b.tick(frame, &[], &config).unwrap();
            assert_eq!((x.shape, x.vertical_scale, x.speed), (y.shape, y.vertical_scale, y.speed));
        }
    }

    #[test]
    fn fixed_speed_when_range_is_degenerate() {
        let mut config = SimConfig::default();
        config.min_spawn_interval = 0;
        config.obstacle_speed_max = config.obstacle_speed_min;
        let mut spawner = ObstacleSpawner::new(5);
        let obs = spawner.tick(1, &[], &config).unwrap();
        assert_eq!(obs.speed, config.obstacle_speed_min);
    }

    #[test]
    fn transform_scales_vertically() {
        let config = SimConfig::default();
        let mut obs = far_behind(&config);
        obs.vertical_scale = TALL;
        let t = obs.transform();
        assert_eq!(t.scale, Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(t.position.x, obs.x);
    }
}
