mod game;
mod navigation;
mod scan;

use crate::classifier::Classifier;
use crate::config::GameConfig;
use crate::game::{MatchController, MatchView};
use crate::history::HistoryStore;
use crate::lobby::{Lobby, LobbyView};
use crate::protocol::ServerMessage;
use crate::ticker::SessionTicker;
use crate::types::*;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

/// Current screen plus the screen to go back to when settings close
#[derive(Debug, Clone)]
pub struct Navigation {
    pub screen: Screen,
    pub return_to: Option<Screen>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            screen: Screen::Loading,
            return_to: None,
        }
    }
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Serialize)]
pub struct AppSnapshot {
    pub screen: Screen,
    pub settings: Settings,
    pub lobby: LobbyView,
    #[serde(rename = "match")]
    pub game: MatchView,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RwLock<MatchController>>,
    pub lobby: Arc<RwLock<Lobby>>,
    pub settings: Arc<RwLock<Settings>>,
    pub navigation: Arc<RwLock<Navigation>>,
    pub classifier: Option<Arc<dyn Classifier>>,
    pub config: GameConfig,
    /// Ticker of the live session, if any
    ticker: Arc<Mutex<Option<SessionTicker>>>,
    /// Pending simulated lobby joins
    guests: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Broadcast channel for sending messages to all connected clients
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new(
        config: GameConfig,
        store: Arc<dyn HistoryStore>,
        classifier: Option<Arc<dyn Classifier>>,
    ) -> Self {
        let controller = MatchController::new(config.clone(), store);
        Self::with_controller(controller, classifier)
    }

    /// Build around an existing controller (e.g. one with a seeded rng)
    pub fn with_controller(
        controller: MatchController,
        classifier: Option<Arc<dyn Classifier>>,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            config: controller.config().clone(),
            controller: Arc::new(RwLock::new(controller)),
            lobby: Arc::new(RwLock::new(Lobby::default())),
            settings: Arc::new(RwLock::new(Settings::default())),
            navigation: Arc::new(RwLock::new(Navigation::default())),
            classifier,
            ticker: Arc::new(Mutex::new(None)),
            guests: Arc::new(Mutex::new(None)),
            broadcast: tx,
        }
    }

    pub async fn screen(&self) -> Screen {
        self.navigation.read().await.screen
    }

    pub(crate) async fn set_screen(&self, screen: Screen) {
        let mut navigation = self.navigation.write().await;
        navigation.screen = screen;
        navigation.return_to = None;
    }

    /// Project the current state for the presentation layer
    pub async fn snapshot(&self) -> AppSnapshot {
        let game = self.controller.read().await.view();
        let screen = self.navigation.read().await.screen;
        let settings = self.settings.read().await.clone();
        let lobby = LobbyView::from(&*self.lobby.read().await);
        AppSnapshot {
            screen,
            settings,
            lobby,
            game,
        }
    }

    /// Push a fresh snapshot to every connected client
    pub async fn broadcast_snapshot(&self) {
        let snapshot = self.snapshot().await;
        // No receivers connected is fine
        let _ = self.broadcast.send(ServerMessage::Snapshot(snapshot));
    }

    pub fn broadcast_message(&self, msg: ServerMessage) {
        let _ = self.broadcast.send(msg);
    }

    /// Id of the session the running ticker is bound to
    pub fn ticker_session(&self) -> Option<SessionId> {
        self.ticker_slot()
            .as_ref()
            .map(|ticker| ticker.session_id().clone())
    }

    fn ticker_slot(&self) -> std::sync::MutexGuard<'_, Option<SessionTicker>> {
        // A panicked holder cannot leave the slot half-written
        self.ticker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn replace_ticker(&self, ticker: Option<SessionTicker>) {
        let previous = std::mem::replace(&mut *self.ticker_slot(), ticker);
        if let Some(previous) = previous {
            tracing::debug!("Cancelling ticker for session {}", previous.session_id());
            previous.cancel();
        }
    }

    pub(crate) fn replace_guests(&self, handle: Option<JoinHandle<()>>) {
        let mut slot = self
            .guests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = std::mem::replace(&mut *slot, handle) {
            previous.abort();
        }
    }
}
