use bevy_math::Vec2;
use rand::Rng;

use crate::config::GameConfig;
use crate::engine::GameEngine;
use crate::engine::GamePhase;
use crate::engine::entity::EEntity;
use crate::engine::entity::EngineEntity;
use crate::engine::entity::SEEntity;
use crate::engine::entity::cloud::CloudEntity;
use crate::engine::entity::player::PlayerEntity;
use crate::engine::spawn::CadenceTimer;
use crate::engine::spawn::SpawnCursor;
use crate::entity_struct;

entity_struct!(
    /// Drives cloud creation from two cadence timers at different
    /// periods. Both timers advance the one shared cursor, so their
    /// interleaving within a step is part of the sweep.
    pub struct CloudSpawnEntity {
        pub cursor: SpawnCursor,
        pub slow_timer: CadenceTimer,
        pub fast_timer: CadenceTimer,
    }
);

impl CloudSpawnEntity {
    pub fn new_with_config(id: u128, config: &GameConfig) -> Self {
        Self {
            id,
            cursor: SpawnCursor::default(),
            slow_timer: CadenceTimer::new(config.slow_spawn_period),
            fast_timer: CadenceTimer::new(config.fast_spawn_period),
            ..Default::default()
        }
    }
}

impl SEEntity for CloudSpawnEntity {
    fn step(&self, engine: &GameEngine) -> Self {
        let mut next_self = self.clone();
        // the whole spawner is removed on game over, but gate anyway in
        // case a host keeps a stale instance around
        if engine.phase() != GamePhase::Playing {
            return next_self;
        }
        let step_index = *engine.step_index();
        let config = engine.config();
        let Some(player_y) = engine
            .entities_by_type::<PlayerEntity>()
            .first()
            .map(|player| player.position.y)
        else {
            return next_self;
        };
        let mut rng = self.rng(&step_index);
        // spawn attempts at the cap are skipped outright, the cursor
        // holds its place until a slot frees up
        let mut live = engine.cloud_count();

        if next_self.slow_timer.due(&step_index) {
            next_self.slow_timer.fire(step_index);
            if live < config.max_clouds {
                let x =
                    next_self
                        .cursor
                        .step(config.spawn_min_x, config.spawn_max_x, config.spawn_stride);
                let y = player_y - config.fixed_spawn_offset.sample(&mut rng);
                let cloud = CloudEntity::new(rng.random(), Vec2::new(x, y), config.cloud_size);
                engine.spawn_entity(EngineEntity::Cloud(cloud));
                live += 1;
            }
        }

        if next_self.fast_timer.due(&step_index) {
            next_self.fast_timer.fire(step_index);
            if live < config.max_clouds {
                let x =
                    next_self
                        .cursor
                        .step(config.spawn_min_x, config.spawn_max_x, config.spawn_stride);
                let y = player_y - config.cadence_spawn_offset.sample(&mut rng);
                let cloud = CloudEntity::new(rng.random(), Vec2::new(x, y), config.cloud_size);
                engine.spawn_entity(EngineEntity::Cloud(cloud));
            }
        }
        next_self
    }
}
