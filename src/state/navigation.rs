use super::AppState;
use crate::lobby::Lobby;
use crate::ticker;
use crate::types::*;

impl AppState {
    /// Leave the loading screen once start-up work is done
    pub async fn finish_loading(&self) {
        {
            let mut navigation = self.navigation.write().await;
            if navigation.screen != Screen::Loading {
                return;
            }
            navigation.screen = Screen::Menu;
        }
        self.broadcast_snapshot().await;
    }

    pub async fn show_menu(&self) {
        self.replace_guests(None);
        self.set_screen(Screen::Menu).await;
        self.broadcast_snapshot().await;
    }

    pub async fn show_instructions(&self) {
        self.set_screen(Screen::Instructions).await;
        self.broadcast_snapshot().await;
    }

    /// Open a new room as host; simulated guests trickle in when enabled
    pub async fn create_room(&self) {
        let lobby = Lobby::host(&mut rand::rng());
        let room_code = lobby.display_code().to_string();
        *self.lobby.write().await = lobby;
        tracing::info!("Created room {}", room_code);

        let guests = self
            .config
            .simulate_lobby
            .then(|| ticker::spawn_simulated_guests(self.clone(), room_code));
        self.replace_guests(guests);

        self.set_screen(Screen::Lobby).await;
        self.broadcast_snapshot().await;
    }

    pub async fn join_room(&self, room_code: Option<String>) {
        self.replace_guests(None);
        let lobby = Lobby::join(room_code);
        tracing::info!("Joined room {}", lobby.display_code());
        *self.lobby.write().await = lobby;

        self.set_screen(Screen::Lobby).await;
        self.broadcast_snapshot().await;
    }

    /// Add a simulated guest, but only to the room it was scheduled for
    pub async fn add_guest(&self, room_code: &str, name: &str) -> bool {
        {
            let mut lobby = self.lobby.write().await;
            if lobby.room_code.as_deref() != Some(room_code) || !lobby.is_host {
                return false;
            }
            if let Err(e) = lobby.add_player(name, false) {
                tracing::debug!("Guest {} not added: {}", name, e);
                return false;
            }
        }
        self.broadcast_snapshot().await;
        true
    }

    pub async fn open_settings(&self) {
        {
            let mut navigation = self.navigation.write().await;
            if navigation.screen == Screen::Settings {
                return;
            }
            navigation.return_to = Some(navigation.screen);
            navigation.screen = Screen::Settings;
        }
        self.broadcast_snapshot().await;
    }

    pub async fn close_settings(&self) {
        {
            let mut navigation = self.navigation.write().await;
            if navigation.screen != Screen::Settings {
                return;
            }
            navigation.screen = navigation.return_to.take().unwrap_or(Screen::Menu);
        }
        self.broadcast_snapshot().await;
    }

    pub async fn update_settings(
        &self,
        music: Option<u32>,
        sfx: Option<u32>,
        large_text: Option<bool>,
    ) {
        self.settings.write().await.apply(music, sfx, large_text);
        self.broadcast_snapshot().await;
    }
}
