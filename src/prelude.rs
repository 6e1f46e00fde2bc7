//! Common imports for hosts embedding the engine.

pub use crate::STEP_LEN_S;
pub use crate::STEPS_PER_SECOND;
pub use crate::config::GameConfig;
pub use crate::engine::GameEngine;
pub use crate::engine::GamePhase;
pub use crate::engine::entity::EEntity;
pub use crate::engine::entity::EngineEntity;
pub use crate::engine::entity::EntityInput;
pub use crate::engine::entity::SEEntity;
pub use crate::engine::entity::cloud::CloudEntity;
pub use crate::engine::entity::player::PlayerEntity;
pub use crate::engine::entity::spawner::CloudSpawnEntity;
pub use crate::engine::game_event::EngineEvent;
pub use crate::engine::game_event::GameEvent;
pub use crate::engine::spawn::CadenceTimer;
pub use crate::engine::spawn::SpawnCursor;
pub use crate::engine::spawn::SpawnOffset;
