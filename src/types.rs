use serde::{Deserialize, Serialize};

/// Opaque ID types
pub type MatchId = String;
pub type SessionId = String;
pub type PlayerId = String;

/// Maximum number of entries kept in the match history
pub const HISTORY_LIMIT: usize = 5;

/// Schema version written into every history entry
pub const HISTORY_SCHEMA_VERSION: u32 = 1;

/// Lobby capacity (the player grid shows 8 slots)
pub const MAX_PLAYERS: usize = 8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MinigameKind {
    Charades,
    Scavenger,
    Spot,
}

impl MinigameKind {
    /// Canonical play order
    pub const ALL: [MinigameKind; 3] = [
        MinigameKind::Charades,
        MinigameKind::Scavenger,
        MinigameKind::Spot,
    ];

    /// Parse the wire name of a mini-game. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "charades" => Some(Self::Charades),
            "scavenger" => Some(Self::Scavenger),
            "spot" => Some(Self::Spot),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charades => "charades",
            Self::Scavenger => "scavenger",
            Self::Spot => "spot",
        }
    }

    /// Game that follows this one in the fixed post-game order.
    /// `None` means the match goes to the leaderboard.
    pub fn successor(&self) -> Option<Self> {
        match self {
            Self::Charades => Some(Self::Scavenger),
            Self::Scavenger => Some(Self::Spot),
            Self::Spot => None,
        }
    }
}

impl std::fmt::Display for MinigameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Loading,
    Menu,
    Lobby,
    GameSelection,
    Game,
    Settings,
    Leaderboard,
    Instructions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub avatar: String,
    pub is_me: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub music: u8,
    pub sfx: u8,
    pub large_text: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music: 70,
            sfx: 50,
            large_text: false,
        }
    }
}

impl Settings {
    /// Apply a partial update, clamping volumes to 0..=100
    pub fn apply(&mut self, music: Option<u32>, sfx: Option<u32>, large_text: Option<bool>) {
        if let Some(music) = music {
            self.music = music.min(100) as u8;
        }
        if let Some(sfx) = sfx {
            self.sfx = sfx.min(100) as u8;
        }
        if let Some(large_text) = large_text {
            self.large_text = large_text;
        }
    }
}

/// One finished match as stored in the local history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchHistoryEntry {
    /// ISO8601 timestamp of when the match finished
    #[serde(alias = "date")]
    pub timestamp: String,
    pub score: u32,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_schema_version() -> u32 {
    HISTORY_SCHEMA_VERSION
}

impl MatchHistoryEntry {
    pub fn now(score: u32) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            score,
            schema_version: HISTORY_SCHEMA_VERSION,
        }
    }
}
