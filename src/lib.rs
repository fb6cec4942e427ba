//! # Umbra Game Server
//!
//! Deterministic engine for a turn-based hidden-role deduction game,
//! built for full match replay from a seed and a command log.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       UMBRA SERVER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - Seeded Xorshift128+ PRNG and dice         │
//! │                                                              │
//! │  game/           - Rules engine (deterministic)              │
//! │  ├── content.rs  - Character/area/card tables, rule config   │
//! │  ├── state.rs    - Match, player, and deck state             │
//! │  ├── command.rs  - Inbound command unions                    │
//! │  ├── events.rs   - Outbound event unions                     │
//! │  ├── validate.rs - Pure command legality checks              │
//! │  ├── reducer.rs  - Command -> ordered event list             │
//! │  ├── apply.rs    - The single state mutation point           │
//! │  ├── setup.rs    - Lobby -> active transition                │
//! │  ├── win.rs      - Win-condition evaluator                   │
//! │  └── view.rs     - Per-viewer projections & legal actions    │
//! │                                                              │
//! │  network/        - Sessions (non-deterministic)              │
//! │  ├── session.rs  - Match store and command pipeline          │
//! │  └── worker.rs   - One sequential task per match             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time in any branching path
//! - All randomness from seeded Xorshift128+, re-derived per command
//!   from the match seed and the applied-event counter
//!
//! Given the same seed and the same ordered command log, replaying a
//! match produces **identical state and events** on any platform.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::rng::{DeterministicRng, DiceRoll};
pub use game::content::{Content, GameConfig, Faction};
pub use game::state::{MatchState, PlayerState, MatchStatus, Phase, Seat};
pub use game::command::{Command, AreaAction};
pub use game::events::{GameEvent, EventData};
pub use game::view::{ClientView, LegalAction};
pub use network::session::{SessionManager, SessionError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
