//! Runtime configuration loaded from environment variables

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::classifier::ClassifierConfig;

/// How the controller picks the next mini-game after one completes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// charades -> scavenger -> spot -> leaderboard, keyed by the game that just ended
    #[default]
    FixedOrder,
    /// First game in canonical order that has not been played in this match
    NextUnplayed,
}

impl AdvancePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed_order" | "fixed" => Some(Self::FixedOrder),
            "next_unplayed" | "unplayed" => Some(Self::NextUnplayed),
            _ => None,
        }
    }
}

/// Per-game timing and sequencing rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub charades_seconds: u32,
    pub spot_seconds: u32,
    pub scavenger_seconds: u32,
    /// How long a scan result stays on screen before scanning is possible again
    pub scan_display_delay: Duration,
    /// Delay before a scan resolves as a rejection when no classifier is available
    pub scan_fallback_delay: Duration,
    /// Upper bound on a single classification, after which the scan counts as rejected
    pub scan_timeout: Duration,
    pub advance_policy: AdvancePolicy,
    /// Whether host lobbies get simulated guests
    pub simulate_lobby: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            charades_seconds: 45,
            spot_seconds: 60,
            scavenger_seconds: 90,
            scan_display_delay: Duration::from_millis(2000),
            scan_fallback_delay: Duration::from_millis(1000),
            scan_timeout: Duration::from_secs(15),
            advance_policy: AdvancePolicy::FixedOrder,
            simulate_lobby: true,
        }
    }
}

impl GameConfig {
    /// Load game rules from environment variables, keeping defaults for anything unset or invalid
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let advance_policy = match env_value("ADVANCE_POLICY") {
            Some(raw) => AdvancePolicy::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown ADVANCE_POLICY '{}', using fixed_order", raw);
                AdvancePolicy::FixedOrder
            }),
            None => defaults.advance_policy,
        };

        Self {
            charades_seconds: env_parse("CHARADES_SECONDS").unwrap_or(defaults.charades_seconds),
            spot_seconds: env_parse("SPOT_SECONDS").unwrap_or(defaults.spot_seconds),
            scavenger_seconds: env_parse("SCAVENGER_SECONDS")
                .unwrap_or(defaults.scavenger_seconds),
            scan_display_delay: env_parse("SCAN_DISPLAY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.scan_display_delay),
            scan_fallback_delay: env_parse("SCAN_FALLBACK_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.scan_fallback_delay),
            scan_timeout: env_parse("SCAN_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.scan_timeout),
            advance_policy,
            simulate_lobby: env_value("SIMULATE_LOBBY")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(defaults.simulate_lobby),
        }
    }
}

/// Top-level configuration for the server binary
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub history_path: PathBuf,
    pub game: GameConfig,
    pub classifier: ClassifierConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 6574,
            history_path: PathBuf::from("data/match_history.json"),
            game: GameConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            history_path: env_value("HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.history_path),
            game: GameConfig::from_env(),
            classifier: ClassifierConfig::from_env(),
        }
    }
}

/// Read a trimmed, non-empty environment variable
pub(crate) fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

pub(crate) fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_value(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: '{}'", key, raw);
            None
        }
    }
}
