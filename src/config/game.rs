/// Game configuration constants.
///
/// This module defines the gameplay parameters: player timeouts, pacing,
/// seat and grid limits, and AI tuning.
use std::time::Duration;

/// Time a player has to answer a move request (milliseconds).
pub const CHOICE_TIMEOUT_MS: u64 = 250;

/// Time a player has to finish its per-round setup (milliseconds).
pub const SETUP_TIMEOUT_MS: u64 = 1000;

/// Pause between match creation and the first round, so clients can attach (milliseconds).
pub const START_DELAY_MS: u64 = 1000;

/// Start positions exist for at most four players.
pub const MAX_PLAYERS: usize = 4;

/// Upper bound accepted for either grid dimension on `start`.
pub const MAX_GRID_DIMENSION: usize = 100;

/// Search depth (plies) of the minimax AI.
pub const MINIMAX_DEPTH: u32 = 5;

/// Rough cap on tiles the minimax AI may visit per decision, counted as
/// board tiles times 5 per ply. Larger boards search shallower.
pub const MINIMAX_SEARCH_BUDGET: usize = 1_000_000;

/// Consecutive ticks a disconnected player may drift on default moves before it is eliminated.
pub const DISCONNECTED_GRACE_TICKS: u32 = 40;

pub fn choice_timeout() -> Duration {
    Duration::from_millis(CHOICE_TIMEOUT_MS)
}

pub fn setup_timeout() -> Duration {
    Duration::from_millis(SETUP_TIMEOUT_MS)
}

pub fn start_delay() -> Duration {
    Duration::from_millis(START_DELAY_MS)
}
