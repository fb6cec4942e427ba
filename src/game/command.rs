//! Inbound Commands
//!
//! Closed tagged unions for everything a client may ask the engine to do.
//! Wire names use SCREAMING_SNAKE_CASE; every action variant is statically
//! enumerable by the validator, reducer, and view projector.

use serde::{Serialize, Deserialize};

use crate::game::content::{AreaId, CardId};
use crate::game::state::Seat;

/// One thing a player can do on the area phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaAction {
    DrawWhite,
    DrawBlack,
    DrawHermit {
        target_seat: Seat,
    },
    Heal {
        target_seat: Seat,
        amount: u8,
    },
    Damage {
        target_seat: Seat,
        amount: u8,
    },
    StealEquipment {
        target_seat: Seat,
        equipment_id: CardId,
    },
    /// Decline the area effect. Always available in the area phase.
    Skip,
}

/// A player command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    JoinMatch {
        match_id: String,
        display_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    StartGame {
        match_id: String,
    },
    RollAndMove,
    ChooseArea {
        area_id: AreaId,
    },
    DoAreaAction {
        action: AreaAction,
    },
    Attack {
        target_seat: Seat,
    },
    EndTurn,
    RevealIdentity,
    ResolveHermit {
        card_id: CardId,
        /// Content-driven resolution choice; opaque to the core.
        choice: serde_json::Value,
    },
}

impl Command {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::JoinMatch { .. } => "JOIN_MATCH",
            Command::StartGame { .. } => "START_GAME",
            Command::RollAndMove => "ROLL_AND_MOVE",
            Command::ChooseArea { .. } => "CHOOSE_AREA",
            Command::DoAreaAction { .. } => "DO_AREA_ACTION",
            Command::Attack { .. } => "ATTACK",
            Command::EndTurn => "END_TURN",
            Command::RevealIdentity => "REVEAL_IDENTITY",
            Command::ResolveHermit { .. } => "RESOLVE_HERMIT",
        }
    }
}
