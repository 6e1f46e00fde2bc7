use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

/// The ping-pong sweep generator controlling where the next cloud is
/// placed horizontally. Both cadence timers advance the same cursor,
/// so whichever resolves first in a step determines where the other
/// continues the sweep.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpawnCursor {
    pub last_x: f32,
    /// -1 sweeps left, +1 sweeps right.
    pub direction: i8,
}

impl Default for SpawnCursor {
    fn default() -> Self {
        Self {
            last_x: 400.,
            direction: -1,
        }
    }
}

impl SpawnCursor {
    /// Advance the sweep by one stride, clamping to `[min_x, max_x]`
    /// and reversing direction exactly when a step would leave the
    /// bounds. Deterministic, no randomness.
    pub fn step(&mut self, min_x: f32, max_x: f32, stride: f32) -> f32 {
        self.last_x += self.direction as f32 * stride;
        if self.last_x < min_x {
            self.last_x = min_x;
            self.direction = 1;
        } else if self.last_x > max_x {
            self.last_x = max_x;
            self.direction = -1;
        }
        self.last_x
    }
}

/// Vertical placement policy: how far above the player a new cloud
/// appears. A fixed offset is a degenerate range with `min == max`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpawnOffset {
    pub min: f32,
    pub max: f32,
}

impl SpawnOffset {
    pub fn fixed(offset: f32) -> Self {
        Self {
            min: offset,
            max: offset,
        }
    }

    pub fn range(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.min == self.max {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }
}

/// A periodic trigger measured in steps. Unlike a wall-clock timer it
/// is driven by the engine, so replays stay deterministic.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CadenceTimer {
    pub period: u64,
    pub last_fired: u64,
}

impl Default for CadenceTimer {
    fn default() -> Self {
        // never due until configured with a real period
        Self {
            period: u64::MAX,
            last_fired: 0,
        }
    }
}

impl CadenceTimer {
    pub fn new(period: u64) -> Self {
        Self {
            period,
            last_fired: 0,
        }
    }

    pub fn due(&self, step_index: &u64) -> bool {
        *step_index >= self.last_fired.saturating_add(self.period)
    }

    pub fn fire(&mut self, step_index: u64) {
        self.last_fired = step_index;
    }
}
