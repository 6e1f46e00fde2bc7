use anyhow::Result;
use bevy_math::Vec2;
use serde::Deserialize;
use serde::Serialize;

use crate::engine::spawn::SpawnOffset;

/// Every tunable of the round in one place. Parsed from json5 the same
/// way map data is, with `Default` producing the canonical values.
///
/// Distances are pixels, speeds are pixels/second, durations are steps
/// (60 steps per second). The y axis grows downward, screen style.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub world_size: Vec2,
    /// Gravity applied to every falling body.
    pub world_gravity: f32,
    /// Extra downward acceleration on the player body.
    pub player_extra_gravity: f32,
    /// Extra downward acceleration on cloud bodies.
    pub cloud_extra_gravity: f32,

    pub player_spawn: Vec2,
    pub player_size: Vec2,
    pub cloud_size: Vec2,

    /// Leftward run speed. Intentionally slower than the rightward one.
    pub move_speed_left: f32,
    pub move_speed_right: f32,
    /// Upward velocity when jumping off the floor.
    pub jump_impulse: f32,
    /// Upward velocity when bouncing off a cloud.
    pub bounce_impulse: f32,
    /// Added to vertical velocity each airborne step below the soft cap.
    /// Keeps the body from hanging mid-air.
    pub fall_nudge: f32,
    pub fall_speed_soft_cap: f32,

    /// Horizontal sweep bounds and stride for the spawn cursor.
    pub spawn_min_x: f32,
    pub spawn_max_x: f32,
    pub spawn_stride: f32,

    /// Vertical placement above the player, one policy per trigger.
    pub fixed_spawn_offset: SpawnOffset,
    pub cadence_spawn_offset: SpawnOffset,
    pub bounce_spawn_offset: SpawnOffset,

    /// Live clouds are capped; spawn attempts at the cap are skipped.
    pub max_clouds: usize,
    /// Cadence timer periods in steps. 60 steps = 1000ms.
    pub slow_spawn_period: u64,
    pub fast_spawn_period: u64,

    pub score_increment: u64,
    pub win_score: u64,

    /// Auto-scroll engages while the player is above this line.
    pub scroll_threshold: f32,
    /// Fraction of the remaining distance recovered per step.
    pub scroll_factor: f32,
    /// Clouds past this line are destroyed.
    pub cull_y: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_size: Vec2::new(800., 600.),
            world_gravity: 300.,
            player_extra_gravity: 200.,
            cloud_extra_gravity: 200.,
            player_spawn: Vec2::new(100., 450.),
            player_size: Vec2::new(40., 40.),
            cloud_size: Vec2::new(80., 30.),
            move_speed_left: 400.,
            move_speed_right: 500.,
            jump_impulse: 450.,
            bounce_impulse: 450.,
            fall_nudge: 5.,
            fall_speed_soft_cap: 300.,
            spawn_min_x: 100.,
            spawn_max_x: 700.,
            spawn_stride: 100.,
            fixed_spawn_offset: SpawnOffset::fixed(360.),
            cadence_spawn_offset: SpawnOffset::range(300., 400.),
            bounce_spawn_offset: SpawnOffset::fixed(360.),
            max_clouds: 8,
            slow_spawn_period: 60,
            fast_spawn_period: 30,
            score_increment: 5,
            win_score: 300,
            scroll_threshold: 400.,
            scroll_factor: 0.05,
            cull_y: 600.,
        }
    }
}

impl GameConfig {
    pub fn from_json5(data: &str) -> Result<Self> {
        Ok(json5::from_str::<Self>(data)?)
    }
}
