//! cloudhop is a deterministic simulation core for a single-screen
//! cloud-hopping platformer. A player bounces between procedurally
//! spawned cloud platforms, accumulating score on contact, until a
//! score threshold ends the round.
//!
//! The crate owns the spawning/progress rules only. Rendering, asset
//! loading, keyboard polling and wall-clock scheduling are host
//! concerns: the host registers inputs, calls [`engine::GameEngine::step`]
//! once per frame and consumes the returned game events.

pub mod config;
pub mod engine;
pub mod prelude;

pub const STEPS_PER_SECOND: u64 = 60;
pub const STEP_LEN_S: f32 = 1. / STEPS_PER_SECOND as f32;
