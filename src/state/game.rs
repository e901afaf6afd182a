use super::AppState;
use crate::game::{MatchController, SessionAction, Transition};
use crate::protocol::ServerMessage;
use crate::ticker;
use crate::types::*;
use tokio::sync::RwLockWriteGuard;

impl AppState {
    /// Start a clean match and show the game selection
    pub async fn start_match(&self) -> MatchId {
        let mut controller = self.controller.write().await;
        let match_id = controller.start_match();
        self.replace_ticker(None);
        self.set_screen(Screen::GameSelection).await;
        drop(controller);

        self.broadcast_snapshot().await;
        match_id
    }

    /// Select a mini-game by wire name. Unknown names change nothing.
    pub async fn select_minigame(&self, name: &str) {
        let mut controller = self.controller.write().await;
        let transition = controller.select_minigame_by_name(name);
        if transition == Transition::None {
            return;
        }
        self.apply_transition(controller, transition).await;
        self.broadcast_snapshot().await;
    }

    pub async fn session_action(&self, action: SessionAction) {
        let mut controller = self.controller.write().await;
        let transition = controller.apply_action(action);
        self.apply_transition(controller, transition).await;
        self.broadcast_snapshot().await;
    }

    /// One second elapsed for `session_id`.
    /// Returns whether that session is still live, i.e. whether its ticker should keep going.
    pub async fn tick_session(&self, session_id: &str) -> bool {
        let mut controller = self.controller.write().await;
        let transition = controller.tick(session_id);
        let live = controller
            .active_session()
            .is_some_and(|session| session.id() == session_id);

        self.apply_transition(controller, transition).await;
        self.broadcast_snapshot().await;
        live
    }

    /// End the match from the presentation layer and show the leaderboard
    pub async fn finish_match(&self) -> Vec<MatchHistoryEntry> {
        let mut controller = self.controller.write().await;
        let history = controller.finish_match();
        self.replace_ticker(None);
        self.set_screen(Screen::Leaderboard).await;
        drop(controller);

        self.broadcast_message(ServerMessage::History {
            entries: history.clone(),
        });
        self.broadcast_snapshot().await;
        history
    }

    pub async fn history(&self) -> Vec<MatchHistoryEntry> {
        self.controller.read().await.history()
    }

    /// Keep timers and screens in line with what the controller did.
    ///
    /// Takes the controller guard that produced `transition`: the ticker slot
    /// is only ever swapped under the controller lock, so the installed ticker
    /// always belongs to the live session.
    pub(crate) async fn apply_transition(
        &self,
        controller: RwLockWriteGuard<'_, MatchController>,
        transition: Transition,
    ) {
        match transition {
            Transition::None => {}
            Transition::SessionStarted { kind, session_id } => {
                tracing::debug!("Starting ticker for {} session {}", kind, session_id);
                let ticker = ticker::spawn_session_ticker(self.clone(), session_id);
                self.replace_ticker(Some(ticker));
                self.set_screen(Screen::Game).await;
            }
            Transition::MatchFinished {
                total_score,
                history,
            } => {
                tracing::info!("Match finished with {} points", total_score);
                self.replace_ticker(None);
                self.set_screen(Screen::Leaderboard).await;
                drop(controller);
                self.broadcast_message(ServerMessage::History { entries: history });
            }
        }
    }
}
