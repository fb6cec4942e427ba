//! Game Logic Module
//!
//! The full rules engine. 100% deterministic: every state change flows
//! command -> validator -> reducer -> events -> applier, with all
//! randomness drawn from seed-derived generators.
//!
//! ## Module Structure
//!
//! - `content`: static character/area/card tables and rule configuration
//! - `state`: match state, player state, decks
//! - `command`: inbound command unions
//! - `events`: outbound event unions
//! - `validate`: pure command legality checks
//! - `reducer`: command -> ordered event list
//! - `apply`: the single mutation point, folds events into state
//! - `setup`: lobby -> active transition (roles, decks, turn order)
//! - `win`: win-condition evaluator
//! - `view`: per-viewer redacted projections and legal actions

pub mod content;
pub mod state;
pub mod command;
pub mod events;
pub mod validate;
pub mod reducer;
pub mod apply;
pub mod setup;
pub mod win;
pub mod view;

// Re-export key types
pub use content::{Content, GameConfig, Faction};
pub use state::{MatchState, PlayerState, MatchStatus, Phase, Seat};
pub use command::{Command, AreaAction};
pub use events::{GameEvent, EventData};
pub use validate::CommandError;
pub use view::{ClientView, LegalAction};
pub use win::WinResult;
