use crate::game::{ScanOutcome, SessionAction};
use crate::state::AppSnapshot;
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

/// Intents sent by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The client finished its own warm-up (assets, camera permission)
    FinishLoading,
    CreateRoom,
    JoinRoom {
        #[serde(default)]
        room_code: Option<String>,
    },
    ShowMenu,
    ShowInstructions,
    OpenSettings,
    CloseSettings,
    UpdateSettings {
        #[serde(default)]
        music: Option<u32>,
        #[serde(default)]
        sfx: Option<u32>,
        #[serde(default)]
        large_text: Option<bool>,
    },
    StartMatch,
    FinishMatch,
    /// Kind as a string; unknown kinds are ignored rather than rejected
    SelectMinigame {
        minigame: String,
    },
    SessionAction {
        action: SessionAction,
    },
    RequestScan {
        /// Camera frame, base64 or a `data:` URL
        #[serde(default)]
        frame: Option<String>,
    },
    RequestHistory,
}

/// Messages pushed to the presentation layer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        snapshot: AppSnapshot,
        server_now: String,
    },
    Snapshot(AppSnapshot),
    ScanResult {
        outcome: ScanOutcome,
    },
    History {
        entries: Vec<MatchHistoryEntry>,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(code: &str, msg: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            msg: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_intents_parse() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"select_minigame","minigame":"scavenger"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::SelectMinigame {
                minigame: "scavenger".to_string()
            }
        );

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"session_action","action":"charades_pass"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::SessionAction {
                action: SessionAction::CharadesPass
            }
        );

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"finish_loading"}"#).unwrap();
        assert_eq!(msg, ClientMessage::FinishLoading);

        let msg: ClientMessage = serde_json::from_str(r#"{"t":"join_room"}"#).unwrap();
        assert_eq!(msg, ClientMessage::JoinRoom { room_code: None });

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"update_settings","music":30}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::UpdateSettings {
                music: Some(30),
                sfx: None,
                large_text: None
            }
        );
    }

    #[test]
    fn test_unknown_intent_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"t":"host_reset_game"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(
            r#"{"t":"session_action","action":"moonwalk"}"#
        )
        .is_err());
    }

    #[test]
    fn test_server_messages_are_tagged() {
        let json = serde_json::to_value(ServerMessage::ScanResult {
            outcome: ScanOutcome::Matched {
                objective_id: 2,
                label: "mug".to_string(),
            },
        })
        .unwrap();
        assert_eq!(json["t"], "scan_result");
        assert_eq!(json["outcome"]["result"], "matched");
        assert_eq!(json["outcome"]["label"], "mug");

        let json = serde_json::to_value(ServerMessage::error("PARSE_ERROR", "bad")).unwrap();
        assert_eq!(json["t"], "error");
        assert_eq!(json["code"], "PARSE_ERROR");
    }
}
