//! Spot the difference: tap the five differences before time runs out.

use serde::Serialize;

use super::countdown::{apply_penalty, CompletionReason, Countdown};
use crate::types::SessionId;

pub const TOTAL_DIFFERENCES: u32 = 5;
pub const FOUND_POINTS: u32 = 60;
pub const COMPLETION_BONUS: u32 = 100;
pub const MISTAKE_PENALTY: u32 = 15;

#[derive(Debug, Clone, Serialize)]
pub struct SpotSession {
    pub id: SessionId,
    pub score: u32,
    pub found_differences: u32,
    pub total_differences: u32,
    pub mistakes: u32,
    pub time_left: Countdown,
    pub completion: Option<CompletionReason>,
}

impl SpotSession {
    pub fn new(seconds: u32) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            score: 0,
            found_differences: 0,
            total_differences: TOTAL_DIFFERENCES,
            mistakes: 0,
            time_left: Countdown::new(seconds),
            completion: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    /// A difference was tapped. Finding the last one awards the bonus and ends the round.
    pub fn mark_found(&mut self) {
        if self.is_complete() || self.found_differences >= self.total_differences {
            return;
        }
        self.found_differences += 1;
        self.score += FOUND_POINTS;

        if self.found_differences == self.total_differences {
            self.score += COMPLETION_BONUS;
            self.completion = Some(CompletionReason::ObjectiveMet);
        }
    }

    /// A tap that missed every difference
    pub fn mark_mistake(&mut self) {
        if self.is_complete() {
            return;
        }
        self.mistakes += 1;
        self.score = apply_penalty(self.score, MISTAKE_PENALTY);
    }

    pub fn finish_early(&mut self) {
        if self.is_complete() {
            return;
        }
        self.completion = Some(CompletionReason::FinishedEarly);
    }

    /// One second elapsed. Returns true if this tick completed the session.
    pub fn tick(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        if self.time_left.tick() {
            self.completion = Some(CompletionReason::TimeUp);
            return true;
        }
        false
    }
}
