use rand::Rng;
use serde::{Deserialize, Serialize};

use super::charades::CharadesSession;
use super::countdown::CompletionReason;
use super::scavenger::ScavengerSession;
use super::spot::SpotSession;
use crate::config::GameConfig;
use crate::types::{MinigameKind, SessionId};

/// One live mini-game round
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MinigameSession {
    Charades(CharadesSession),
    Scavenger(ScavengerSession),
    Spot(SpotSession),
}

/// Player input addressed to the live session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    CharadesHit,
    CharadesPass,
    SpotFound,
    SpotMistake,
    SpotFinish,
}

impl SessionAction {
    pub fn kind(&self) -> MinigameKind {
        match self {
            Self::CharadesHit | Self::CharadesPass => MinigameKind::Charades,
            Self::SpotFound | Self::SpotMistake | Self::SpotFinish => MinigameKind::Spot,
        }
    }
}

impl MinigameSession {
    pub fn start<R: Rng + ?Sized>(kind: MinigameKind, config: &GameConfig, rng: &mut R) -> Self {
        match kind {
            MinigameKind::Charades => {
                Self::Charades(CharadesSession::new(rng, config.charades_seconds))
            }
            MinigameKind::Scavenger => {
                Self::Scavenger(ScavengerSession::new(rng, config.scavenger_seconds))
            }
            MinigameKind::Spot => Self::Spot(SpotSession::new(config.spot_seconds)),
        }
    }

    pub fn kind(&self) -> MinigameKind {
        match self {
            Self::Charades(_) => MinigameKind::Charades,
            Self::Scavenger(_) => MinigameKind::Scavenger,
            Self::Spot(_) => MinigameKind::Spot,
        }
    }

    pub fn id(&self) -> &SessionId {
        match self {
            Self::Charades(s) => &s.id,
            Self::Scavenger(s) => &s.id,
            Self::Spot(s) => &s.id,
        }
    }

    pub fn score(&self) -> u32 {
        match self {
            Self::Charades(s) => s.score,
            Self::Scavenger(s) => s.score,
            Self::Spot(s) => s.score,
        }
    }

    pub fn time_left(&self) -> u32 {
        match self {
            Self::Charades(s) => s.time_left.time_left(),
            Self::Scavenger(s) => s.time_left.time_left(),
            Self::Spot(s) => s.time_left.time_left(),
        }
    }

    pub fn completion(&self) -> Option<CompletionReason> {
        match self {
            Self::Charades(s) => s.completion,
            Self::Scavenger(s) => s.completion,
            Self::Spot(s) => s.completion,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completion().is_some()
    }

    /// One second elapsed. Returns true if this tick completed the session.
    pub fn tick(&mut self) -> bool {
        match self {
            Self::Charades(s) => s.tick(),
            Self::Scavenger(s) => s.tick(),
            Self::Spot(s) => s.tick(),
        }
    }

    /// Apply a player action. Actions meant for another game are ignored; returns whether it applied.
    pub fn apply<R: Rng + ?Sized>(&mut self, action: SessionAction, rng: &mut R) -> bool {
        if self.is_complete() {
            return false;
        }
        match (self, action) {
            (Self::Charades(s), SessionAction::CharadesHit) => s.hit(rng),
            (Self::Charades(s), SessionAction::CharadesPass) => s.pass(rng),
            (Self::Spot(s), SessionAction::SpotFound) => s.mark_found(),
            (Self::Spot(s), SessionAction::SpotMistake) => s.mark_mistake(),
            (Self::Spot(s), SessionAction::SpotFinish) => s.finish_early(),
            _ => return false,
        }
        true
    }
}
