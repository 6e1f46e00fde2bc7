//! A game engine instance for a single round.
//!
//! The engine owns the entity set, the score and the round phase, and
//! advances them one fixed step at a time. A step is the smallest unit
//! of time; the host calls `step()` once per frame.
//!
//! Anatomy of a step:
//!   - modification: entities step themselves and schedule entities
//!     for creation/removal through the event channels
//!   - engine events: scheduled spawns/removals/inputs are applied
//!   - scroll: the auto-scroll shifts the world and culls clouds
//!   - game events: bounces are resolved, the win latch is checked
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Result;
use bevy_math::Vec2;
use log::warn;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoroshiro64StarStar;
use serde::Deserialize;
use serde::Serialize;

pub mod actor;
pub mod entity;
pub mod game_event;
pub mod spawn;

use entity::EEntity;
use entity::EngineEntity;
use entity::EntityInput;
use entity::SEEntity;
use entity::cloud::CloudEntity;
use entity::player::PlayerEntity;
use entity::spawner::CloudSpawnEntity;
use game_event::EngineEvent;
use game_event::GameEvent;

use crate::config::GameConfig;

/// One-way round state. The transition to `Finished` is latched; there
/// is no way back to `Playing`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Playing,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEngine {
    pub id: u128,
    pub seed: u64,
    config: GameConfig,

    pub step_index: u64,

    // entity id keyed to struct
    pub entities: BTreeMap<u128, EngineEntity>,

    inputs: HashMap<u128, EntityInput>,

    // engine events may be scheduled for the future, game events may not
    engine_events_by_step: BTreeMap<u64, Vec<EngineEvent>>,

    #[serde(skip, default = "default_game_events")]
    pub game_events: (flume::Sender<GameEvent>, flume::Receiver<GameEvent>),
    #[serde(skip, default = "default_engine_events")]
    pub engine_events: (
        flume::Sender<(u64, EngineEvent)>,
        flume::Receiver<(u64, EngineEvent)>,
    ),

    /// Reseeded each step from `seed`, so rng state never needs to be
    /// stored to replay a round.
    #[serde(skip, default = "default_rng")]
    rng_state: (u64, Xoroshiro64StarStar),

    score: u64,
    phase: GamePhase,
}

fn default_rng() -> (u64, Xoroshiro64StarStar) {
    (u64::MAX, Xoroshiro64StarStar::seed_from_u64(0))
}

fn default_game_events() -> (flume::Sender<GameEvent>, flume::Receiver<GameEvent>) {
    flume::unbounded()
}

fn default_engine_events() -> (
    flume::Sender<(u64, EngineEvent)>,
    flume::Receiver<(u64, EngineEvent)>,
) {
    flume::unbounded()
}

impl GameEngine {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut out = Self {
            id: 0,
            seed,
            config,
            step_index: 0,
            entities: BTreeMap::default(),
            inputs: HashMap::default(),
            engine_events_by_step: BTreeMap::default(),
            game_events: default_game_events(),
            engine_events: default_engine_events(),
            rng_state: (0, Xoroshiro64StarStar::seed_from_u64(seed)),
            score: 0,
            phase: GamePhase::Playing,
        };
        out.id = out.generate_id();
        out
    }

    pub fn id(&self) -> &u128 {
        &self.id
    }

    pub fn seed(&self) -> &u64 {
        &self.seed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn step_index(&self) -> &u64 {
        &self.step_index
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn rng(&mut self) -> &mut Xoroshiro64StarStar {
        if self.rng_state.0 != self.step_index {
            self.rng_state.1 = Xoroshiro64StarStar::seed_from_u64(self.seed + self.step_index);
            self.rng_state.0 = self.step_index;
        }
        &mut self.rng_state.1
    }

    pub fn generate_id(&mut self) -> u128 {
        loop {
            let id = self.rng().random::<u128>();
            if !self.entities.contains_key(&id) {
                return id;
            }
        }
    }

    /// Create the player body at the configured spawn point.
    pub fn insert_player(&mut self) -> u128 {
        let id = self.generate_id();
        let player = PlayerEntity::new(id, self.config.player_spawn, self.config.player_size);
        self.entities.insert(id, EngineEntity::Player(player));
        id
    }

    /// Create the cloud spawner with both cadence timers attached.
    pub fn insert_spawner(&mut self) -> u128 {
        let id = self.generate_id();
        let spawner = CloudSpawnEntity::new_with_config(id, &self.config);
        self.entities.insert(id, EngineEntity::CloudSpawn(spawner));
        id
    }

    pub fn spawn_entity(&self, entity: EngineEntity) {
        self.register_event(Some(self.step_index), EngineEvent::SpawnEntity { entity });
    }

    pub fn remove_entity(&self, entity_id: u128) {
        self.register_event(Some(self.step_index), EngineEvent::RemoveEntity { entity_id });
    }

    /// Register a new input for an entity, applied at the end of the
    /// current step.
    pub fn register_input(&self, entity_id: u128, input: EntityInput) {
        self.register_event(
            Some(self.step_index),
            EngineEvent::Input { entity_id, input },
        );
    }

    pub fn register_event(&self, step_index: Option<u64>, event: EngineEvent) {
        let step_index = step_index.unwrap_or(self.step_index);
        if self.engine_events.0.send((step_index, event)).is_err() {
            warn!("engine event channel closed, dropping event");
        }
    }

    pub fn register_game_event(&self, event: GameEvent) {
        if self.game_events.0.send(event).is_err() {
            warn!("game event channel closed, dropping event");
        }
    }

    pub fn entity_by_id_untyped(&self, id: &u128) -> Option<&EngineEntity> {
        self.entities.get(id)
    }

    pub fn entity_by_id<T: EEntity + 'static>(&self, id: &u128) -> Option<&T> {
        self.entity_by_id_untyped(id)
            .and_then(|entity| entity.get_ref::<T>())
    }

    pub fn entities_by_type<T: EEntity + 'static>(&self) -> Vec<&T> {
        self.entities
            .values()
            .filter_map(|entity| entity.get_ref::<T>())
            .collect()
    }

    pub fn input_for_entity(&self, id: &u128) -> &EntityInput {
        static DEFAULT_INPUT: LazyLock<EntityInput> = LazyLock::new(EntityInput::default);
        self.inputs.get(id).unwrap_or(&DEFAULT_INPUT)
    }

    /// Number of live clouds. The spawn cap is enforced against this.
    pub fn cloud_count(&self) -> usize {
        self.entities_by_type::<CloudEntity>().len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Digest of the current entity set, for determinism audits.
    pub fn step_hash(&self) -> Result<blake3::Hash> {
        let serialized = bincode::serialize(&self.entities)?;
        Ok(blake3::hash(&serialized))
    }

    /// A step is considered complete at the _end_ of this function.
    pub fn step(&mut self) -> Vec<GameEvent> {
        // Execute the modification phase of the step. Entities read the
        // engine as it was (mostly) at the start of the step and return
        // their next version.
        let current = self.entities.clone();
        for (id, entity) in &current {
            let next_entity = entity.step(self);
            self.entities.insert(*id, next_entity);
        }

        // collect engine events in the channel
        for (step_index, event) in self.engine_events.1.drain() {
            if step_index < self.step_index {
                warn!("received an engine event in the past, applying now");
                self.engine_events_by_step
                    .entry(self.step_index)
                    .or_default()
                    .push(event);
                continue;
            }
            self.engine_events_by_step
                .entry(step_index)
                .or_default()
                .push(event);
        }

        if let Some(events) = self.engine_events_by_step.remove(&self.step_index) {
            for event in events {
                match event {
                    EngineEvent::SpawnEntity { entity } => {
                        if let Some(old) = self.entities.insert(entity.id(), entity) {
                            warn!("spawned an entity that already existed: {:?}", old.id());
                        }
                    }
                    EngineEvent::RemoveEntity { entity_id } => {
                        if self.entities.remove(&entity_id).is_none() {
                            warn!("attempted to remove a non-existent entity");
                        }
                    }
                    EngineEvent::Input { entity_id, input } => {
                        self.inputs.insert(entity_id, input);
                    }
                }
            }
        }

        self.apply_scroll();

        // Drain and resolve game events. Resolution may emit follow-up
        // events (score changes); those are appended and surfaced in
        // the same step.
        let mut game_events = self.game_events.1.drain().collect::<Vec<_>>();
        let mut cursor = 0;
        while cursor < game_events.len() {
            let event = game_events[cursor].clone();
            self.process_game_event(&event);
            game_events.extend(self.game_events.1.drain());
            cursor += 1;
        }

        // win condition latch: fires exactly once, on the step the
        // threshold is crossed
        if self.phase == GamePhase::Playing && self.score >= self.config.win_score {
            self.phase = GamePhase::Finished;
            // cancel the cadence timers outright
            let spawner_ids = self
                .entities_by_type::<CloudSpawnEntity>()
                .iter()
                .map(|spawner| spawner.id)
                .collect::<Vec<_>>();
            for id in spawner_ids {
                self.entities.remove(&id);
            }
            game_events.push(GameEvent::GameOver { score: self.score });
        }

        // Officially move to the next step
        self.step_index += 1;

        game_events
    }

    pub fn step_to(&mut self, to_step: &u64) -> Vec<GameEvent> {
        let mut out = vec![];
        while self.step_index < *to_step {
            out.append(&mut self.step());
        }
        out
    }

    /// While the player is above the scroll threshold, shift the player
    /// and every live cloud downward by a fraction of the remaining
    /// distance, culling clouds pushed past the bottom line.
    fn apply_scroll(&mut self) {
        let Some(player_y) = self
            .entities_by_type::<PlayerEntity>()
            .first()
            .map(|player| player.position.y)
        else {
            return;
        };
        if player_y >= self.config.scroll_threshold {
            return;
        }
        let shift = (self.config.scroll_threshold - player_y) * self.config.scroll_factor;
        let mut culled = vec![];
        for (id, entity) in self.entities.iter_mut() {
            match entity {
                EngineEntity::Player(player) => player.position.y += shift,
                EngineEntity::Cloud(cloud) => {
                    cloud.position.y += shift;
                    if cloud.position.y > self.config.cull_y {
                        culled.push(*id);
                    }
                }
                EngineEntity::CloudSpawn(_) => {}
            }
        }
        for id in culled {
            self.entities.remove(&id);
        }
    }

    fn process_game_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::CloudBounce {
                player_id,
                cloud_id,
            } => {
                // scoring ends with the round
                if self.phase != GamePhase::Playing {
                    return;
                }
                // the contacted cloud may have been consumed by an
                // earlier event this step
                if self.entities.remove(cloud_id).is_none() {
                    return;
                }
                self.score += self.config.score_increment;
                let score = self.score;
                self.register_game_event(GameEvent::ScoreChanged { score });

                let mut player_y = None;
                if let Some(entity) = self.entities.get_mut(player_id) {
                    if let Some(player) = entity.get_mut::<PlayerEntity>() {
                        player.velocity.y = -self.config.bounce_impulse;
                        player_y = Some(player.position.y);
                    }
                } else {
                    warn!("cloud bounce for a missing player entity");
                }

                // immediately place a replacement, random x instead of
                // the swept cursor
                if let Some(player_y) = player_y {
                    if self.cloud_count() < self.config.max_clouds {
                        let min_x = self.config.spawn_min_x;
                        let max_x = self.config.spawn_max_x;
                        let offset = self.config.bounce_spawn_offset;
                        let cloud_size = self.config.cloud_size;
                        let id = self.generate_id();
                        let (x, y) = {
                            let rng = self.rng();
                            (
                                rng.random_range(min_x..=max_x),
                                player_y - offset.sample(rng),
                            )
                        };
                        let cloud = CloudEntity::new(id, Vec2::new(x, y), cloud_size);
                        self.entities.insert(id, EngineEntity::Cloud(cloud));
                    }
                }
            }
            GameEvent::ScoreChanged { .. } => {}
            GameEvent::GameOver { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_config() -> GameConfig {
        GameConfig {
            world_gravity: 0.,
            player_extra_gravity: 0.,
            cloud_extra_gravity: 0.,
            fall_nudge: 0.,
            ..GameConfig::default()
        }
    }

    fn insert_cloud(engine: &mut GameEngine, position: Vec2) -> u128 {
        let id = engine.generate_id();
        let cloud = CloudEntity::new(id, position, engine.config().cloud_size);
        engine.entities.insert(id, EngineEntity::Cloud(cloud));
        id
    }

    fn reset_player(engine: &mut GameEngine, player_id: &u128, position: Vec2) {
        let player = engine
            .entities
            .get_mut(player_id)
            .and_then(|entity| entity.get_mut::<PlayerEntity>())
            .unwrap();
        player.position = position;
        player.velocity = Vec2::ZERO;
    }

    #[test]
    fn bounce_scores_consumes_and_replaces() {
        let mut engine = GameEngine::new(static_config(), 13);
        let player_id = engine.insert_player();
        reset_player(&mut engine, &player_id, Vec2::new(100., 500.));
        let cloud_id = insert_cloud(&mut engine, Vec2::new(90., 535.));
        let events = engine.step();
        assert_eq!(engine.score(), 5);
        assert!(events.contains(&GameEvent::ScoreChanged { score: 5 }));
        // the contacted cloud is consumed and a replacement appears
        assert!(engine.entity_by_id::<CloudEntity>(&cloud_id).is_none());
        assert_eq!(engine.cloud_count(), 1);
        let replacement = engine.entities_by_type::<CloudEntity>()[0];
        assert!((100. ..=700.).contains(&replacement.position.x));
        assert_eq!(replacement.position.y, 500. - 360.);
        // and the bounce impulse is applied
        let player = engine.entity_by_id::<PlayerEntity>(&player_id).unwrap();
        assert_eq!(player.velocity.y, -450.);
    }

    #[test]
    fn no_replacement_when_at_the_cap() {
        let mut engine = GameEngine::new(static_config(), 13);
        let player_id = engine.insert_player();
        reset_player(&mut engine, &player_id, Vec2::new(100., 500.));
        insert_cloud(&mut engine, Vec2::new(90., 535.));
        for i in 0..7 {
            insert_cloud(&mut engine, Vec2::new(600., 50. + 10. * i as f32));
        }
        assert_eq!(engine.cloud_count(), 8);
        engine.step();
        assert_eq!(engine.score(), 5);
        // consumed cloud freed a slot, replacement took it back
        assert_eq!(engine.cloud_count(), 8);
        engine.step();
        assert!(engine.cloud_count() <= 8);
    }

    #[test]
    fn win_latch_fires_once_on_the_crossing_step() {
        let mut engine = GameEngine::new(static_config(), 17);
        let player_id = engine.insert_player();
        engine.insert_spawner();
        let mut game_over_count = 0;
        for bounce in 1..=60 {
            reset_player(&mut engine, &player_id, Vec2::new(100., 500.));
            insert_cloud(&mut engine, Vec2::new(90., 535.));
            let events = engine.step();
            let game_overs = events
                .iter()
                .filter(|event| matches!(event, GameEvent::GameOver { .. }))
                .count();
            game_over_count += game_overs;
            if bounce < 60 {
                assert_eq!(engine.phase(), GamePhase::Playing);
                assert_eq!(game_overs, 0);
            } else {
                assert_eq!(engine.phase(), GamePhase::Finished);
                assert_eq!(events.last(), Some(&GameEvent::GameOver { score: 300 }));
                // the spawner is cancelled with the round
                assert!(engine.entities_by_type::<CloudSpawnEntity>().is_empty());
            }
        }
        assert_eq!(game_over_count, 1);
        assert_eq!(engine.score(), 300);
        // the latch never re-fires, and finished rounds stop scoring
        for _ in 0..10 {
            reset_player(&mut engine, &player_id, Vec2::new(100., 500.));
            insert_cloud(&mut engine, Vec2::new(90., 535.));
            let events = engine.step();
            assert!(events.is_empty());
        }
        assert_eq!(engine.score(), 300);
    }

    #[test]
    fn scroll_shifts_player_and_clouds_together() {
        let mut engine = GameEngine::new(static_config(), 19);
        let player_id = engine.insert_player();
        reset_player(&mut engine, &player_id, Vec2::new(100., 350.));
        let near = insert_cloud(&mut engine, Vec2::new(300., 100.));
        engine.step();
        // (400 - 350) * 0.05 = 2.5 applied to player and cloud alike
        let player = engine.entity_by_id::<PlayerEntity>(&player_id).unwrap();
        assert!((player.position.y - 352.5).abs() < 1e-3);
        let cloud = engine.entity_by_id::<CloudEntity>(&near).unwrap();
        assert!((cloud.position.y - 102.5).abs() < 1e-3);
    }

    #[test]
    fn scroll_culls_clouds_past_the_bottom_line() {
        let mut engine = GameEngine::new(static_config(), 19);
        let player_id = engine.insert_player();
        reset_player(&mut engine, &player_id, Vec2::new(100., 300.));
        let keep = insert_cloud(&mut engine, Vec2::new(300., 100.));
        let cull = insert_cloud(&mut engine, Vec2::new(600., 599.));
        engine.step();
        // shift of 5.0 pushes the low cloud past 600
        assert!(engine.entity_by_id::<CloudEntity>(&keep).is_some());
        assert!(engine.entity_by_id::<CloudEntity>(&cull).is_none());
        assert_eq!(engine.cloud_count(), 1);
    }

    #[test]
    fn no_scroll_below_the_threshold() {
        let mut engine = GameEngine::new(static_config(), 19);
        let player_id = engine.insert_player();
        reset_player(&mut engine, &player_id, Vec2::new(100., 450.));
        engine.step();
        let player = engine.entity_by_id::<PlayerEntity>(&player_id).unwrap();
        assert_eq!(player.position.y, 450.);
    }

    #[test]
    fn inputs_apply_on_the_following_step() {
        let mut engine = GameEngine::new(static_config(), 23);
        let player_id = engine.insert_player();
        reset_player(&mut engine, &player_id, Vec2::new(400., 560.));
        engine.register_input(
            player_id,
            EntityInput {
                move_right: true,
                ..Default::default()
            },
        );
        engine.step();
        // registered during step 0, visible to the step 1 modification phase
        assert_eq!(
            engine
                .entity_by_id::<PlayerEntity>(&player_id)
                .unwrap()
                .velocity
                .x,
            0.
        );
        engine.step();
        assert_eq!(
            engine
                .entity_by_id::<PlayerEntity>(&player_id)
                .unwrap()
                .velocity
                .x,
            500.
        );
    }

    #[test]
    fn same_seed_and_script_replays_identically() {
        let run = || {
            let mut engine = GameEngine::new(GameConfig::default(), 777);
            let player_id = engine.insert_player();
            engine.insert_spawner();
            for step in 0..300u64 {
                if step == 30 {
                    engine.register_input(
                        player_id,
                        EntityInput {
                            move_right: true,
                            jump: true,
                            ..Default::default()
                        },
                    );
                }
                if step == 200 {
                    engine.register_input(player_id, EntityInput::default());
                }
                engine.step();
            }
            engine
        };
        let a = run();
        let b = run();
        assert_eq!(a.step_hash().unwrap(), b.step_hash().unwrap());
        assert_eq!(a.score(), b.score());
    }

    #[test]
    fn engine_state_round_trips_through_serde() {
        let mut engine = GameEngine::new(GameConfig::default(), 31);
        engine.insert_player();
        engine.insert_spawner();
        engine.step_to(&90);
        let serialized = bincode::serialize(&engine.entities).unwrap();
        let entities: BTreeMap<u128, EngineEntity> = bincode::deserialize(&serialized).unwrap();
        assert_eq!(entities, engine.entities);
    }
}
