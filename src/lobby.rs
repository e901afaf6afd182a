//! Room code and player roster shown in the lobby

use rand::Rng;
use serde::Serialize;

use crate::types::{Player, MAX_PLAYERS};

const ROOM_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ROOM_CODE_LENGTH: usize = 4;

/// Shown instead of a room code until the guest enters one
pub const JOIN_PLACEHOLDER: &str = "JOIN";

pub const HOST_NAME: &str = "Tú (Host)";
pub const GUEST_NAME: &str = "Tú (Jugador)";

/// Guests that "join" a host lobby, with their delay in milliseconds
pub const SIMULATED_GUESTS: &[(&str, u64)] = &[("Ana", 2000), ("Leo", 4000), ("Max", 5500)];

const AVATARS: &[&str] = &[
    "/avatars/avatar-1.svg",
    "/avatars/avatar-2.svg",
    "/avatars/avatar-3.svg",
    "/avatars/avatar-4.svg",
];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LobbyError {
    #[error("lobby is full ({0} players)")]
    Full(usize),

    #[error("player name cannot be empty")]
    EmptyName,
}

/// Generate a random room code
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_CHARS[rng.random_range(0..ROOM_CODE_CHARS.len())] as char)
        .collect()
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Lobby {
    pub room_code: Option<String>,
    pub is_host: bool,
    pub players: Vec<Player>,
}

impl Lobby {
    /// Open a new room as host. The host is the first player.
    pub fn host<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut lobby = Self {
            room_code: Some(generate_room_code(rng)),
            is_host: true,
            players: Vec::new(),
        };
        // An empty lobby always has room for the host
        let _ = lobby.add_player(HOST_NAME, true);
        lobby
    }

    /// Join a room as guest. Without a code the placeholder is shown.
    pub fn join(room_code: Option<String>) -> Self {
        let room_code = room_code
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty());
        let mut lobby = Self {
            room_code,
            is_host: false,
            players: Vec::new(),
        };
        let _ = lobby.add_player(GUEST_NAME, true);
        lobby
    }

    pub fn display_code(&self) -> &str {
        self.room_code.as_deref().unwrap_or(JOIN_PLACEHOLDER)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn open_slots(&self) -> usize {
        MAX_PLAYERS.saturating_sub(self.players.len())
    }

    /// Add a player; avatars are handed out by join position
    pub fn add_player(&mut self, name: &str, is_me: bool) -> Result<Player, LobbyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LobbyError::EmptyName);
        }
        if self.is_full() {
            return Err(LobbyError::Full(MAX_PLAYERS));
        }

        let player = Player {
            id: ulid::Ulid::new().to_string(),
            name: name.to_string(),
            avatar: AVATARS[self.players.len() % AVATARS.len()].to_string(),
            is_me,
        };
        self.players.push(player.clone());
        Ok(player)
    }
}

/// Read-only lobby view for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct LobbyView {
    pub room_code: String,
    pub is_host: bool,
    pub players: Vec<Player>,
    pub open_slots: usize,
    /// "n / 8" counter shown under the grid
    pub player_count: String,
}

impl From<&Lobby> for LobbyView {
    fn from(lobby: &Lobby) -> Self {
        Self {
            room_code: lobby.display_code().to_string(),
            is_host: lobby.is_host,
            players: lobby.players.clone(),
            open_slots: lobby.open_slots(),
            player_count: format!("{} / {}", lobby.players.len(), MAX_PLAYERS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_room_code_format() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let code = generate_room_code(&mut rng);
            assert_eq!(code.len(), ROOM_CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_host_lobby_starts_with_host() {
        let mut rng = StdRng::seed_from_u64(42);
        let lobby = Lobby::host(&mut rng);
        assert!(lobby.is_host);
        assert_eq!(lobby.players.len(), 1);
        assert_eq!(lobby.players[0].name, HOST_NAME);
        assert!(lobby.players[0].is_me);
        assert_eq!(lobby.display_code().len(), ROOM_CODE_LENGTH);
    }

    #[test]
    fn test_join_without_code_shows_placeholder() {
        let lobby = Lobby::join(None);
        assert!(!lobby.is_host);
        assert_eq!(lobby.display_code(), JOIN_PLACEHOLDER);
        assert_eq!(lobby.players[0].name, GUEST_NAME);

        let lobby = Lobby::join(Some(" abcd ".to_string()));
        assert_eq!(lobby.display_code(), "ABCD");
    }

    #[test]
    fn test_lobby_capacity() {
        let mut lobby = Lobby::join(None);
        for i in 1..MAX_PLAYERS {
            lobby.add_player(&format!("Player {}", i), false).unwrap();
        }
        assert!(lobby.is_full());
        assert_eq!(lobby.open_slots(), 0);
        assert_eq!(
            lobby.add_player("Late", false),
            Err(LobbyError::Full(MAX_PLAYERS))
        );
    }

    #[test]
    fn test_avatars_cycle_and_names_validated() {
        let mut lobby = Lobby::join(None);
        for name in ["Ana", "Leo", "Max", "Eva"] {
            lobby.add_player(name, false).unwrap();
        }
        assert_eq!(lobby.players[0].avatar, lobby.players[4].avatar);
        assert_ne!(lobby.players[0].avatar, lobby.players[1].avatar);
        assert_eq!(lobby.add_player("  ", false), Err(LobbyError::EmptyName));
    }

    #[test]
    fn test_avatars_are_served_assets() {
        let static_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
        for avatar in AVATARS {
            let path = static_dir.join(avatar.trim_start_matches('/'));
            assert!(path.is_file(), "missing avatar asset {}", path.display());
        }
    }

    #[test]
    fn test_view_counts() {
        let mut lobby = Lobby::join(None);
        lobby.add_player("Ana", false).unwrap();
        let view = LobbyView::from(&lobby);
        assert_eq!(view.player_count, "2 / 8");
        assert_eq!(view.open_slots, 6);
        assert_eq!(view.room_code, JOIN_PLACEHOLDER);
    }
}
