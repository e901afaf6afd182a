use serde::{Deserialize, Serialize};

/// Whole-second countdown shared by every session variant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Countdown {
    time_left: u32,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self { time_left: seconds }
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Advance by one second. Returns true once the countdown has run out.
    pub fn tick(&mut self) -> bool {
        self.time_left = self.time_left.saturating_sub(1);
        self.time_left == 0
    }
}

/// Why a session reached its terminal state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    TimeUp,
    ObjectiveMet,
    FinishedEarly,
}

/// Subtract a penalty without going below zero
pub fn apply_penalty(score: u32, penalty: u32) -> u32 {
    score.saturating_sub(penalty)
}
