//! Scavenger hunt: point the camera at an object that answers the current riddle.
//!
//! Three objectives are drawn from a fixed pool. A scan hands the current
//! frame to the classifier; the first ranked candidate whose label contains
//! one of the objective's target labels (case-insensitive) counts as found.
//!
//! Scans are two-phase so the classifier can be awaited without holding the
//! session: [`ScavengerSession::begin_scan`] hands out a [`ScanTicket`],
//! [`ScavengerSession::resolve_scan`] applies the classifier result and
//! [`ScavengerSession::release_scan`] re-enables scanning once the result has
//! been on screen long enough. A ticket is only honoured by the session and
//! scan that issued it.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::countdown::{CompletionReason, Countdown};
use crate::classifier::Prediction;
use crate::types::SessionId;

pub const OBJECTIVE_POINTS: u32 = 100;
pub const OBJECTIVES_PER_SESSION: usize = 3;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Objective {
    pub id: u32,
    pub question: String,
    pub hint: String,
    pub icon: String,
    pub target_labels: Vec<String>,
    pub found: bool,
}

impl Objective {
    fn from_pool(entry: &PoolEntry) -> Self {
        Self {
            id: 0,
            question: entry.question.to_string(),
            hint: entry.hint.to_string(),
            icon: entry.icon.to_string(),
            target_labels: entry.targets.iter().map(|t| t.to_string()).collect(),
            found: false,
        }
    }
}

struct PoolEntry {
    question: &'static str,
    hint: &'static str,
    icon: &'static str,
    targets: &'static [&'static str],
}

// Target labels follow the ImageNet class names the camera model reports
const OBJECTIVE_POOL: &[PoolEntry] = &[
    PoolEntry {
        question: "¿Qué usas para escribir en la computadora?",
        hint: "Tiene muchas teclas",
        icon: "⌨️",
        targets: &["computer keyboard", "keyboard", "typewriter keyboard"],
    },
    PoolEntry {
        question: "¿Con qué mueves el cursor?",
        hint: "Tiene botones y rueda",
        icon: "🖱️",
        targets: &["computer mouse", "mouse"],
    },
    PoolEntry {
        question: "¿De qué bebes café?",
        hint: "Tiene un asa",
        icon: "☕",
        targets: &["coffee mug", "cup", "mug", "coffeepot"],
    },
    PoolEntry {
        question: "¿Qué usas para hidratarte?",
        hint: "Generalmente es de plástico",
        icon: "🧴",
        targets: &["water bottle", "bottle", "pop bottle"],
    },
    PoolEntry {
        question: "¿Qué usas para llamar?",
        hint: "Es inteligente",
        icon: "📱",
        targets: &[
            "cellular telephone",
            "cellphone",
            "mobile phone",
            "dial telephone",
        ],
    },
    PoolEntry {
        question: "¿Con qué cambias la TV?",
        hint: "Tiene muchos botones",
        icon: "📺",
        targets: &["remote control", "remote"],
    },
    PoolEntry {
        question: "¿Dónde ves videos?",
        hint: "Tiene pantalla",
        icon: "💻",
        targets: &["laptop", "notebook", "laptop computer", "monitor", "screen"],
    },
    PoolEntry {
        question: "¿Qué usas para jugar?",
        hint: "Tiene palancas",
        icon: "🎮",
        targets: &["joystick", "gamepad", "controller"],
    },
];

/// Proof that a scan was started, required to resolve or release it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
    pub session_id: SessionId,
    pub scan_seq: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ScanOutcome {
    Matched { objective_id: u32, label: String },
    Rejected { detected: Option<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct ScavengerSession {
    pub id: SessionId,
    pub objectives: Vec<Objective>,
    pub current_index: usize,
    pub score: u32,
    pub is_scanning: bool,
    pub last_scan: Option<ScanOutcome>,
    pub time_left: Countdown,
    pub completion: Option<CompletionReason>,
    #[serde(skip)]
    scan_seq: u64,
    #[serde(skip)]
    resolved_seq: u64,
}

impl ScavengerSession {
    /// Draw objectives without replacement from the built-in pool
    pub fn new<R: Rng + ?Sized>(rng: &mut R, seconds: u32) -> Self {
        let mut pool: Vec<Objective> = OBJECTIVE_POOL.iter().map(Objective::from_pool).collect();
        pool.shuffle(rng);
        pool.truncate(OBJECTIVES_PER_SESSION);
        Self::with_objectives(pool, seconds)
    }

    /// Objectives are renumbered 1..=n and reset to unfound
    pub fn with_objectives(objectives: Vec<Objective>, seconds: u32) -> Self {
        let objectives = objectives
            .into_iter()
            .enumerate()
            .map(|(idx, objective)| Objective {
                id: idx as u32 + 1,
                found: false,
                ..objective
            })
            .collect::<Vec<_>>();
        let completion = objectives
            .is_empty()
            .then_some(CompletionReason::ObjectiveMet);

        Self {
            id: ulid::Ulid::new().to_string(),
            objectives,
            current_index: 0,
            score: 0,
            is_scanning: false,
            last_scan: None,
            time_left: Countdown::new(seconds),
            completion,
            scan_seq: 0,
            resolved_seq: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    pub fn current_objective(&self) -> Option<&Objective> {
        self.objectives.get(self.current_index).filter(|o| !o.found)
    }

    pub fn found_count(&self) -> usize {
        self.objectives.iter().filter(|o| o.found).count()
    }

    /// Start a scan. Returns `None` while another scan is in flight or once the session is over.
    pub fn begin_scan(&mut self) -> Option<ScanTicket> {
        if self.is_complete() || self.is_scanning {
            return None;
        }
        self.is_scanning = true;
        self.scan_seq += 1;
        self.last_scan = None;
        Some(ScanTicket {
            session_id: self.id.clone(),
            scan_seq: self.scan_seq,
        })
    }

    fn owns(&self, ticket: &ScanTicket) -> bool {
        ticket.session_id == self.id && ticket.scan_seq == self.scan_seq && self.is_scanning
    }

    /// Apply a classifier result. `None` means the classifier was unavailable or failed.
    /// Returns `None` when the ticket is stale and nothing was applied.
    pub fn resolve_scan(
        &mut self,
        ticket: &ScanTicket,
        predictions: Option<&[Prediction]>,
    ) -> Option<ScanOutcome> {
        // A ticket resolves at most once
        if self.is_complete() || !self.owns(ticket) || self.resolved_seq == ticket.scan_seq {
            return None;
        }
        let objective = self.current_objective()?.clone();
        self.resolved_seq = ticket.scan_seq;
        let predictions = predictions.unwrap_or_default();

        let outcome = match find_match(&objective.target_labels, predictions) {
            Some(prediction) => ScanOutcome::Matched {
                objective_id: objective.id,
                label: display_label(&prediction.label),
            },
            None => ScanOutcome::Rejected {
                detected: predictions.first().map(|p| display_label(&p.label)),
            },
        };

        if matches!(outcome, ScanOutcome::Matched { .. }) {
            self.objectives[self.current_index].found = true;
            self.score += OBJECTIVE_POINTS;
            match self.objectives.iter().position(|o| !o.found) {
                Some(next) => self.current_index = next,
                None => self.completion = Some(CompletionReason::ObjectiveMet),
            }
        }

        self.last_scan = Some(outcome.clone());
        Some(outcome)
    }

    /// Re-enable scanning after the result display delay. Returns true if the flag was cleared.
    pub fn release_scan(&mut self, ticket: &ScanTicket) -> bool {
        if !self.owns(ticket) {
            return false;
        }
        self.is_scanning = false;
        true
    }

    /// One second elapsed. Returns true if this tick completed the session.
    pub fn tick(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        if self.time_left.tick() {
            self.completion = Some(CompletionReason::TimeUp);
            // Any in-flight scan result will no longer match
            self.is_scanning = false;
            self.scan_seq += 1;
            return true;
        }
        false
    }
}

/// First prediction, in classifier rank order, whose label contains any target label
pub fn find_match<'a>(targets: &[String], predictions: &'a [Prediction]) -> Option<&'a Prediction> {
    let targets: Vec<String> = targets
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    predictions.iter().find(|prediction| {
        let label = prediction.label.to_lowercase();
        targets.iter().any(|target| label.contains(target.as_str()))
    })
}

/// Classifier labels can list synonyms ("laptop, laptop computer"); show the first one
fn display_label(label: &str) -> String {
    label.split(',').next().unwrap_or(label).trim().to_string()
}
