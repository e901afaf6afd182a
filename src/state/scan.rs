use super::AppState;
use crate::classifier::{Frame, Prediction};
use crate::game::{ScanOutcome, ScanTicket};
use crate::protocol::ServerMessage;

impl AppState {
    /// Run one scavenger scan end to end.
    ///
    /// The controller lock is only held to take and to resolve the ticket, never
    /// across the classifier call. Returns `None` when no scan could be started
    /// (no scavenger session, or a scan already in flight) or when the result
    /// arrived for a session that is no longer live.
    pub async fn request_scan(&self, frame: Option<Frame>) -> Option<ScanOutcome> {
        let ticket = self.controller.write().await.begin_scan();
        let Some(ticket) = ticket else {
            tracing::debug!("Scan request ignored: no scavenger session or scan in flight");
            return None;
        };
        self.broadcast_snapshot().await;

        let predictions = self.classify(frame).await;

        let mut controller = self.controller.write().await;
        let (outcome, transition) = controller.resolve_scan(&ticket, predictions.as_deref());

        if let Some(outcome) = &outcome {
            tracing::info!("Scan for session {}: {:?}", ticket.session_id, outcome);
            self.broadcast_message(ServerMessage::ScanResult {
                outcome: outcome.clone(),
            });
            self.schedule_scan_release(ticket);
        }
        self.apply_transition(controller, transition).await;
        self.broadcast_snapshot().await;

        outcome
    }

    /// Ask the classifier, degrading every failure to "nothing recognised"
    async fn classify(&self, frame: Option<Frame>) -> Option<Vec<Prediction>> {
        let (Some(classifier), Some(frame)) = (self.classifier.as_ref(), frame) else {
            tracing::warn!("Classifier unavailable, rejecting scan");
            tokio::time::sleep(self.config.scan_fallback_delay).await;
            return None;
        };

        match tokio::time::timeout(self.config.scan_timeout, classifier.classify(&frame)).await {
            Ok(Ok(predictions)) => Some(predictions),
            Ok(Err(e)) => {
                tracing::warn!("Classifier '{}' failed: {}", classifier.name(), e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Classifier '{}' timed out after {:?}",
                    classifier.name(),
                    self.config.scan_timeout
                );
                None
            }
        }
    }

    /// Re-enable scanning once the result has been on screen for the display delay
    fn schedule_scan_release(&self, ticket: ScanTicket) {
        let state = self.clone();
        let delay = self.config.scan_display_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let released = state.controller.write().await.release_scan(&ticket);
            if released {
                state.broadcast_snapshot().await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::classifier::{Classifier, ClassifierError, ClassifierResult, Frame, Prediction};
    use crate::config::GameConfig;
    use crate::game::{
        MatchController, MinigameSession, Objective, ScanOutcome, ScavengerSession,
    };
    use crate::history::MemoryHistoryStore;
    use crate::state::AppState;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedClassifier(ClassifierResult<Vec<Prediction>>);

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(&self, _frame: &Frame) -> ClassifierResult<Vec<Prediction>> {
            self.0.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn prediction(label: &str) -> Prediction {
        Prediction {
            label: label.to_string(),
            confidence: 0.9,
        }
    }

    fn objective(targets: &[&str]) -> Objective {
        Objective {
            id: 0,
            question: "¿Qué es?".to_string(),
            hint: "Pista".to_string(),
            icon: "❓".to_string(),
            target_labels: targets.iter().map(|t| t.to_string()).collect(),
            found: false,
        }
    }

    /// State with a live scavenger hunt over known objectives
    async fn scavenger_state(classifier: Option<Arc<dyn Classifier>>) -> AppState {
        let config = GameConfig::default();
        let store = Arc::new(MemoryHistoryStore::new());
        let controller = MatchController::with_rng(config, store, StdRng::seed_from_u64(11));
        let state = AppState::with_controller(controller, classifier);

        state.select_minigame("scavenger").await;
        let mut controller = state.controller.write().await;
        controller.replace_session(MinigameSession::Scavenger(ScavengerSession::with_objectives(
            vec![objective(&["laptop", "notebook"]), objective(&["mug"])],
            90,
        )));
        drop(controller);
        state
    }

    fn frame() -> Option<Frame> {
        Some(Frame::new(vec![0xff, 0xd8, 0xff]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_matching_scan_scores_and_releases_after_delay() {
        let classifier: Arc<dyn Classifier> = Arc::new(FixedClassifier(Ok(vec![
            prediction("laptop, laptop computer"),
            prediction("monitor"),
        ])));
        let state = scavenger_state(Some(classifier)).await;

        let outcome = state.request_scan(frame()).await;
        assert_eq!(
            outcome,
            Some(ScanOutcome::Matched {
                objective_id: 1,
                label: "laptop".to_string()
            })
        );

        {
            let controller = state.controller.read().await;
            let Some(MinigameSession::Scavenger(session)) = controller.active_session() else {
                panic!("scavenger session should still be live");
            };
            assert_eq!(session.score, 100);
            assert_eq!(session.found_count(), 1);
            assert_eq!(session.current_index, 1);
            assert!(session.is_scanning);
        }

        tokio::time::sleep(Duration::from_millis(2100)).await;
        let controller = state.controller.read().await;
        let Some(MinigameSession::Scavenger(session)) = controller.active_session() else {
            panic!("scavenger session should still be live");
        };
        assert!(!session.is_scanning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_classifier_error_is_a_rejection() {
        let classifier: Arc<dyn Classifier> = Arc::new(FixedClassifier(Err(
            ClassifierError::Request("connection refused".to_string()),
        )));
        let state = scavenger_state(Some(classifier)).await;

        let outcome = state.request_scan(frame()).await;
        assert_eq!(outcome, Some(ScanOutcome::Rejected { detected: None }));
        assert_eq!(state.controller.read().await.total_score(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_classifier_scan_falls_back_after_delay() {
        let state = scavenger_state(None).await;
        let started = tokio::time::Instant::now();

        let outcome = state.request_scan(frame()).await;

        assert_eq!(outcome, Some(ScanOutcome::Rejected { detected: None }));
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_scan_outside_scavenger_is_ignored() {
        let classifier: Arc<dyn Classifier> =
            Arc::new(FixedClassifier(Ok(vec![prediction("mug")])));
        let store = Arc::new(MemoryHistoryStore::new());
        let controller = MatchController::with_rng(
            GameConfig::default(),
            store,
            StdRng::seed_from_u64(1),
        );
        let state = AppState::with_controller(controller, Some(classifier));
        state.select_minigame("spot").await;

        assert_eq!(state.request_scan(frame()).await, None);
    }
}
