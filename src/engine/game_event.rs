use serde::Deserialize;
use serde::Serialize;

use crate::engine::entity::EngineEntity;
use crate::engine::entity::EntityInput;

/// Events the simulation surfaces to the host. The host renders the
/// score text on `ScoreChanged` and pauses its scene on `GameOver`;
/// the core keeps stepping inertly after the round ends.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum GameEvent {
    /// The player made vertical contact with a cloud. Resolved by the
    /// engine atomically: impulse, score, cloud removal, replacement.
    CloudBounce { player_id: u128, cloud_id: u128 },
    ScoreChanged { score: u64 },
    GameOver { score: u64 },
}

/// Entity lifecycle events, applied at the end of the step they are
/// scheduled for. Entities register these through channels so they
/// only need a shared engine reference while stepping.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum EngineEvent {
    SpawnEntity {
        entity: EngineEntity,
    },
    RemoveEntity {
        entity_id: u128,
    },
    Input {
        entity_id: u128,
        input: EntityInput,
    },
}
