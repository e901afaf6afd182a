use crate::lobby::SIMULATED_GUESTS;
use crate::state::AppState;
use crate::types::SessionId;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to the 1 Hz ticker of one session
pub struct SessionTicker {
    session_id: SessionId,
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl SessionTicker {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Stop ticking. A tick that is already being applied runs to completion.
    pub fn cancel(self) {
        let _ = self.cancel.send(());
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawn a background task that ticks `session_id` once per second until the
/// session is no longer live or the ticker is cancelled
pub fn spawn_session_ticker(state: AppState, session_id: SessionId) -> SessionTicker {
    let (cancel, mut cancelled) = oneshot::channel::<()>();
    let id = session_id.clone();

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = &mut cancelled => break,
                _ = interval.tick() => {
                    if !state.tick_session(&id).await {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Ticker for session {} stopped", id);
    });

    SessionTicker {
        session_id,
        cancel,
        handle,
    }
}

/// Spawn a background task that lets the simulated guests join `room_code`
pub fn spawn_simulated_guests(state: AppState, room_code: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started = tokio::time::Instant::now();
        for (name, delay_ms) in SIMULATED_GUESTS {
            tokio::time::sleep_until(started + Duration::from_millis(*delay_ms)).await;
            if !state.add_guest(&room_code, name).await {
                break;
            }
            tracing::debug!("Simulated guest {} joined {}", name, room_code);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::MatchController;
    use crate::history::MemoryHistoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn test_state(seconds: u32) -> AppState {
        let config = GameConfig {
            charades_seconds: seconds,
            spot_seconds: seconds,
            scavenger_seconds: seconds,
            simulate_lobby: false,
            ..GameConfig::default()
        };
        let controller = MatchController::with_rng(
            config,
            Arc::new(MemoryHistoryStore::new()),
            StdRng::seed_from_u64(5),
        );
        AppState::with_controller(controller, None)
    }

    async fn time_left(state: &AppState) -> Option<u32> {
        state
            .controller
            .read()
            .await
            .active_session()
            .map(|s| s.time_left())
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_counts_down_once_per_second() {
        let state = test_state(45);
        state.select_minigame("charades").await;

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(time_left(&state).await, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_game_timeout_stops_ticking() {
        let state = test_state(3);
        state.select_minigame("spot").await;
        assert!(state.ticker_session().is_some());

        // Spot times out after 3 s; fixed order then ends the match
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(!state.controller.read().await.in_progress());
        assert!(state.ticker_session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_ticker_stops() {
        let state = test_state(45);
        state.select_minigame("charades").await;
        tokio::time::sleep(Duration::from_millis(1500)).await;

        state.start_match().await;
        assert!(state.ticker_session().is_none());
        assert_eq!(time_left(&state).await, None);

        let session_id = "not-live".to_string();
        let ticker = spawn_session_ticker(state.clone(), session_id);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(ticker.is_finished());
    }
}
