//! Network Layer
//!
//! Session and per-match worker plumbing between transports and the
//! deterministic engine. This layer is **non-deterministic** - all game
//! logic runs through `game/`.

pub mod session;
pub mod worker;

pub use session::{MatchSession, SessionManager, SessionError, JoinResult};
pub use worker::{MatchHandle, spawn};
