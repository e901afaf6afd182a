use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::scavenger::{ScanOutcome, ScanTicket};
use super::session::{MinigameSession, SessionAction};
use crate::classifier::Prediction;
use crate::config::{AdvancePolicy, GameConfig};
use crate::history::{record_match, HistoryStore};
use crate::types::*;

/// Match-level effect of an operation, used by the caller to manage timers and screens
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The match sequence did not move
    None,
    /// A new session is live and needs a ticker
    SessionStarted {
        kind: MinigameKind,
        session_id: SessionId,
    },
    /// The match ended and was recorded
    MatchFinished {
        total_score: u32,
        history: Vec<MatchHistoryEntry>,
    },
}

/// Owns the sequence of mini-games, their scores and the match lifecycle
pub struct MatchController {
    config: GameConfig,
    store: Arc<dyn HistoryStore>,
    rng: StdRng,
    match_id: Option<MatchId>,
    in_progress: bool,
    played: BTreeSet<MinigameKind>,
    /// Last known score per game; sessions are dropped once complete
    final_scores: BTreeMap<MinigameKind, u32>,
    session: Option<MinigameSession>,
}

/// Read-only view of the match for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub match_id: Option<MatchId>,
    pub in_progress: bool,
    pub played: Vec<MinigameKind>,
    pub total_score: u32,
    pub session: Option<MinigameSession>,
}

impl MatchController {
    pub fn new(config: GameConfig, store: Arc<dyn HistoryStore>) -> Self {
        Self::with_rng(config, store, StdRng::from_os_rng())
    }

    /// Construct with a fixed random source, for reproducible decks and objectives
    pub fn with_rng(config: GameConfig, store: Arc<dyn HistoryStore>, rng: StdRng) -> Self {
        Self {
            config,
            store,
            rng,
            match_id: None,
            in_progress: false,
            played: BTreeSet::new(),
            final_scores: BTreeMap::new(),
            session: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn match_id(&self) -> Option<&MatchId> {
        self.match_id.as_ref()
    }

    pub fn has_played(&self, kind: MinigameKind) -> bool {
        self.played.contains(&kind)
    }

    pub fn active_session(&self) -> Option<&MinigameSession> {
        self.session.as_ref()
    }

    /// Stored history, newest first
    pub fn history(&self) -> Vec<MatchHistoryEntry> {
        self.store.load()
    }

    /// Sum of the scores of every game played in this match. A live session counts with its
    /// current score; games not played count as 0.
    pub fn total_score(&self) -> u32 {
        let mut scores = self.final_scores.clone();
        if let Some(session) = &self.session {
            scores.insert(session.kind(), session.score());
        }
        self.played
            .iter()
            .map(|kind| scores.get(kind).copied().unwrap_or(0))
            .sum()
    }

    /// Begin a clean match, discarding any live session
    pub fn start_match(&mut self) -> MatchId {
        if let Some(session) = self.session.take() {
            tracing::debug!("Discarding live {} session for new match", session.kind());
        }
        self.played.clear();
        self.final_scores.clear();
        let match_id = ulid::Ulid::new().to_string();
        self.match_id = Some(match_id.clone());
        self.in_progress = true;

        tracing::info!("Match {} started", match_id);
        match_id
    }

    /// Start `kind`. Without a match in progress a new one is started first.
    pub fn select_minigame(&mut self, kind: MinigameKind) -> Transition {
        if !self.in_progress {
            self.start_match();
        }
        tracing::info!(target: "telemetry", minigame = %kind, "minigame_selected");
        self.start_session(kind)
    }

    /// Same as [`Self::select_minigame`] for a wire name; unknown names are ignored
    pub fn select_minigame_by_name(&mut self, name: &str) -> Transition {
        match MinigameKind::from_name(name) {
            Some(kind) => self.select_minigame(kind),
            None => {
                tracing::debug!("Ignoring unknown minigame '{}'", name);
                Transition::None
            }
        }
    }

    fn start_session(&mut self, kind: MinigameKind) -> Transition {
        // A replaced session keeps the score it had reached
        if let Some(previous) = self.session.take() {
            self.final_scores.insert(previous.kind(), previous.score());
        }

        self.played.insert(kind);
        let session = MinigameSession::start(kind, &self.config, &mut self.rng);
        let session_id = session.id().clone();
        self.session = Some(session);

        tracing::info!(target: "telemetry", minigame = %kind, session = %session_id, "minigame_init");
        Transition::SessionStarted { kind, session_id }
    }

    /// Apply a player action to the live session
    pub fn apply_action(&mut self, action: SessionAction) -> Transition {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("Ignoring {:?}: no live session", action);
            return Transition::None;
        };
        if !session.apply(action, &mut self.rng) {
            tracing::debug!("Ignoring {:?} for {} session", action, session.kind());
            return Transition::None;
        }
        self.after_mutation()
    }

    /// One second elapsed for `session_id`. Ticks for any other session are ignored.
    pub fn tick(&mut self, session_id: &str) -> Transition {
        let Some(session) = self.session.as_mut() else {
            return Transition::None;
        };
        if session.id() != session_id {
            tracing::debug!("Ignoring tick for stale session {}", session_id);
            return Transition::None;
        }
        if session.tick() {
            tracing::info!("{} session timed out", session.kind());
        }
        self.after_mutation()
    }

    /// Start a scavenger scan. `None` if no scavenger session is live or a scan is in flight.
    pub fn begin_scan(&mut self) -> Option<ScanTicket> {
        match self.session.as_mut() {
            Some(MinigameSession::Scavenger(session)) => session.begin_scan(),
            _ => None,
        }
    }

    /// Apply a classifier result to the session that issued `ticket`
    pub fn resolve_scan(
        &mut self,
        ticket: &ScanTicket,
        predictions: Option<&[Prediction]>,
    ) -> (Option<ScanOutcome>, Transition) {
        let outcome = match self.session.as_mut() {
            Some(MinigameSession::Scavenger(session)) if session.id == ticket.session_id => {
                session.resolve_scan(ticket, predictions)
            }
            _ => None,
        };
        if outcome.is_none() {
            tracing::debug!("Discarding scan result for session {}", ticket.session_id);
            return (None, Transition::None);
        }
        (outcome, self.after_mutation())
    }

    /// Re-enable scanning once the result has been displayed
    pub fn release_scan(&mut self, ticket: &ScanTicket) -> bool {
        match self.session.as_mut() {
            Some(MinigameSession::Scavenger(session)) => session.release_scan(ticket),
            _ => false,
        }
    }

    fn after_mutation(&mut self) -> Transition {
        match &self.session {
            Some(session) if session.is_complete() => self.on_session_complete(),
            _ => Transition::None,
        }
    }

    /// Retire the completed session and move on to the next game or the leaderboard
    pub fn on_session_complete(&mut self) -> Transition {
        let Some(finished) = self.session.take() else {
            return Transition::None;
        };
        let kind = finished.kind();
        self.final_scores.insert(kind, finished.score());
        tracing::info!(
            "{} session complete ({:?}) with {} points",
            kind,
            finished.completion(),
            finished.score()
        );

        let next = match self.config.advance_policy {
            AdvancePolicy::FixedOrder => kind.successor(),
            AdvancePolicy::NextUnplayed => MinigameKind::ALL
                .into_iter()
                .find(|k| !self.played.contains(k)),
        };

        match next {
            Some(next) => self.start_session(next),
            None => {
                let history = self.finish_match();
                Transition::MatchFinished {
                    total_score: self.final_scores_total(),
                    history,
                }
            }
        }
    }

    fn final_scores_total(&self) -> u32 {
        self.played
            .iter()
            .map(|kind| self.final_scores.get(kind).copied().unwrap_or(0))
            .sum()
    }

    /// End the match: record the total and return the updated history.
    /// Without a match in progress nothing is recorded.
    pub fn finish_match(&mut self) -> Vec<MatchHistoryEntry> {
        if let Some(session) = self.session.take() {
            self.final_scores.insert(session.kind(), session.score());
        }
        if !self.in_progress {
            tracing::debug!("finish_match without a match in progress");
            return self.store.load();
        }

        let total = self.final_scores_total();
        let history = record_match(self.store.as_ref(), MatchHistoryEntry::now(total));
        self.in_progress = false;

        tracing::info!(target: "telemetry", score = total, "match_finished");
        history
    }

    /// Swap in a prepared session, e.g. one with known objectives
    #[cfg(test)]
    pub(crate) fn replace_session(&mut self, session: MinigameSession) {
        self.played.insert(session.kind());
        self.session = Some(session);
    }

    pub fn view(&self) -> MatchView {
        MatchView {
            match_id: self.match_id.clone(),
            in_progress: self.in_progress,
            played: self.played.iter().copied().collect(),
            total_score: self.total_score(),
            session: self.session.clone(),
        }
    }
}
