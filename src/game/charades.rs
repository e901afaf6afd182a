//! Charades: act out the card, the team guesses.
//!
//! Each hit is worth 100 points, with a 15 point bonus for every hit after
//! the first one in a streak. Passing costs 20 points and breaks the streak.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;

use super::countdown::{apply_penalty, CompletionReason, Countdown};
use crate::types::SessionId;

pub const HIT_POINTS: u32 = 100;
pub const COMBO_BONUS: u32 = 15;
pub const PASS_PENALTY: u32 = 20;

const CATEGORIES: &[&str] = &["Animales", "Deportes", "Profesiones", "Acciones"];

const CARDS: &[&str] = &[
    "Delfín",
    "Portero",
    "Chef",
    "Patinar",
    "Búho",
    "Astronauta",
    "Bostezar",
    "Saque de tenis",
];

#[derive(Debug, Clone, Serialize)]
pub struct CharadesSession {
    pub id: SessionId,
    pub category: String,
    pub current_card: String,
    #[serde(skip)]
    deck: Vec<String>,
    pub score: u32,
    pub combo: u32,
    /// Hits that earned the combo bonus
    pub combo_bonuses: u32,
    pub hits: u32,
    pub passes: u32,
    pub time_left: Countdown,
    pub completion: Option<CompletionReason>,
}

impl CharadesSession {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, seconds: u32) -> Self {
        let deck: Vec<String> = CARDS.iter().map(|c| c.to_string()).collect();
        Self::with_deck(rng, seconds, deck)
    }

    /// Start a session over a custom deck. An empty deck falls back to the built-in cards.
    pub fn with_deck<R: Rng + ?Sized>(rng: &mut R, seconds: u32, deck: Vec<String>) -> Self {
        let deck = if deck.is_empty() {
            CARDS.iter().map(|c| c.to_string()).collect()
        } else {
            deck
        };
        let category = CATEGORIES
            .choose(rng)
            .map(|c| c.to_string())
            .unwrap_or_default();

        let mut session = Self {
            id: ulid::Ulid::new().to_string(),
            category,
            current_card: String::new(),
            deck,
            score: 0,
            combo: 0,
            combo_bonuses: 0,
            hits: 0,
            passes: 0,
            time_left: Countdown::new(seconds),
            completion: None,
        };
        session.draw_card(rng);
        session
    }

    pub fn deck(&self) -> &[String] {
        &self.deck
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    /// The team guessed the card
    pub fn hit<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_complete() {
            return;
        }
        self.hits += 1;
        self.combo += 1;
        self.score += HIT_POINTS;
        if self.combo > 1 {
            self.score += COMBO_BONUS;
            self.combo_bonuses += 1;
        }
        self.draw_card(rng);
    }

    /// Skip the card
    pub fn pass<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_complete() {
            return;
        }
        self.passes += 1;
        self.combo = 0;
        self.score = apply_penalty(self.score, PASS_PENALTY);
        self.draw_card(rng);
    }

    /// One second elapsed. Returns true if this tick completed the session.
    pub fn tick(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        if self.time_left.tick() {
            self.completion = Some(CompletionReason::TimeUp);
            return true;
        }
        false
    }

    // Draws with replacement, so the same card can come up twice in a row
    fn draw_card<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(card) = self.deck.choose(rng) {
            self.current_card = card.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> (CharadesSession, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        (CharadesSession::new(&mut rng, 45), rng)
    }

    #[test]
    fn test_new_session_draws_from_deck() {
        let (session, _) = session();
        assert!(session.deck().contains(&session.current_card));
        assert!(CATEGORIES.contains(&session.category.as_str()));
        assert_eq!(session.time_left.time_left(), 45);
        assert!(!session.is_complete());
    }

    #[test]
    fn test_three_hits_then_pass() {
        let (mut session, mut rng) = session();
        session.hit(&mut rng);
        session.hit(&mut rng);
        session.hit(&mut rng);
        session.pass(&mut rng);

        assert_eq!(session.score, 310);
        assert_eq!(session.hits, 3);
        assert_eq!(session.passes, 1);
        assert_eq!(session.combo_bonuses, 2);
        assert_eq!(session.combo, 0);
    }

    #[test]
    fn test_combo_bonus_only_after_first_hit_of_streak() {
        let (mut session, mut rng) = session();
        session.hit(&mut rng);
        assert_eq!(session.score, 100);
        session.pass(&mut rng);
        assert_eq!(session.score, 80);
        // New streak: no bonus on its first hit
        session.hit(&mut rng);
        assert_eq!(session.score, 180);
        session.hit(&mut rng);
        assert_eq!(session.score, 295);
        assert_eq!(session.combo, 2);
    }

    #[test]
    fn test_score_never_negative() {
        let (mut session, mut rng) = session();
        for _ in 0..5 {
            session.pass(&mut rng);
            assert_eq!(session.score, 0);
        }
        session.hit(&mut rng);
        session.pass(&mut rng);
        session.pass(&mut rng);
        session.pass(&mut rng);
        session.pass(&mut rng);
        session.pass(&mut rng);
        session.pass(&mut rng);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_times_out_exactly_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = CharadesSession::new(&mut rng, 3);
        assert!(!session.tick());
        assert!(!session.tick());
        assert!(session.tick());
        assert_eq!(session.completion, Some(CompletionReason::TimeUp));
        assert!(!session.tick());
        assert_eq!(session.time_left.time_left(), 0);
    }

    #[test]
    fn test_actions_ignored_after_completion() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = CharadesSession::new(&mut rng, 1);
        session.tick();
        session.hit(&mut rng);
        session.pass(&mut rng);
        assert_eq!(session.score, 0);
        assert_eq!(session.hits, 0);
        assert_eq!(session.passes, 0);
    }

    #[test]
    fn test_custom_deck() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = CharadesSession::with_deck(&mut rng, 45, vec!["Robot".to_string()]);
        assert_eq!(session.current_card, "Robot");
        session.hit(&mut rng);
        assert_eq!(session.current_card, "Robot");

        let fallback = CharadesSession::with_deck(&mut rng, 45, Vec::new());
        assert_eq!(fallback.deck().len(), CARDS.len());
    }
}
