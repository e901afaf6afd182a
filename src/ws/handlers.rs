//! Client intent dispatch
//!
//! Every intent mutates the shared state, which broadcasts a fresh snapshot to
//! all clients. A direct response is only returned for requests that ask for
//! data (history) or that fail validation at the protocol boundary.

use crate::classifier::Frame;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

/// Handle client messages and return optional response
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    match msg {
        // Navigation
        ClientMessage::FinishLoading => {
            state.finish_loading().await;
            None
        }
        ClientMessage::CreateRoom => {
            state.create_room().await;
            None
        }
        ClientMessage::JoinRoom { room_code } => {
            state.join_room(room_code).await;
            None
        }
        ClientMessage::ShowMenu => {
            state.show_menu().await;
            None
        }
        ClientMessage::ShowInstructions => {
            state.show_instructions().await;
            None
        }
        ClientMessage::OpenSettings => {
            state.open_settings().await;
            None
        }
        ClientMessage::CloseSettings => {
            state.close_settings().await;
            None
        }
        ClientMessage::UpdateSettings {
            music,
            sfx,
            large_text,
        } => {
            state.update_settings(music, sfx, large_text).await;
            None
        }

        // Match
        ClientMessage::StartMatch => {
            state.start_match().await;
            None
        }
        ClientMessage::FinishMatch => {
            let entries = state.finish_match().await;
            Some(ServerMessage::History { entries })
        }
        ClientMessage::SelectMinigame { minigame } => {
            state.select_minigame(&minigame).await;
            None
        }
        ClientMessage::SessionAction { action } => {
            state.session_action(action).await;
            None
        }
        ClientMessage::RequestScan { frame } => handle_request_scan(state, frame),
        ClientMessage::RequestHistory => Some(ServerMessage::History {
            entries: state.history().await,
        }),
    }
}

/// Scans run in the background so the socket keeps serving intents while the
/// classifier works; the outcome arrives as a broadcast `scan_result`.
fn handle_request_scan(state: &Arc<AppState>, frame: Option<String>) -> Option<ServerMessage> {
    let frame = match frame {
        Some(encoded) => match Frame::from_base64(&encoded) {
            Some(frame) => Some(frame),
            None => {
                return Some(ServerMessage::error(
                    "INVALID_FRAME",
                    "Frame is not valid base64 image data",
                ))
            }
        },
        None => None,
    };

    let state = state.clone();
    tokio::spawn(async move {
        state.request_scan(frame).await;
    });
    None
}
