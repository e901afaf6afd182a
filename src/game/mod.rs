//! Mini-game sessions and the match controller that sequences them

pub mod charades;
pub mod controller;
pub mod countdown;
pub mod scavenger;
pub mod session;
pub mod spot;

pub use charades::CharadesSession;
pub use controller::{MatchController, MatchView, Transition};
pub use countdown::{CompletionReason, Countdown};
pub use scavenger::{Objective, ScanOutcome, ScanTicket, ScavengerSession};
pub use session::{MinigameSession, SessionAction};
pub use spot::SpotSession;
