//! Game Events
//!
//! Immutable records of state change. Events are the *only* legitimate
//! channel for mutation: the reducer emits them, the applier folds them.
//! `id` and `timestamp_ms` are delivery metadata; determinism comparisons
//! use `EventData` alone.

use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::rng::DiceRoll;
use crate::game::content::{AreaId, CardId, DeckId, Faction};
use crate::game::state::{Phase, RollContext, Seat};

/// Where damage came from (display metadata).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DamageSource {
    AreaAction,
}

/// Payload of one state change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventData {
    PlayerJoined {
        seat: Seat,
        display_name: String,
    },
    PlayerLeft {
        seat: Seat,
    },
    MatchStarted {
        seats: Vec<Seat>,
        turn_order: Vec<Seat>,
    },
    TurnStarted {
        seat: Seat,
        round: u32,
        phase: Phase,
    },
    DiceRolled {
        seat: Seat,
        roll: DiceRoll,
        context: RollContext,
        must_choose_area: bool,
    },
    PlayerMoved {
        seat: Seat,
        from: Option<AreaId>,
        to: AreaId,
    },
    AreaChoiceResolved {
        seat: Seat,
    },
    /// Discard pile reshuffled into a fresh draw pile. Carries the full
    /// new order so event application never needs the RNG.
    DeckReshuffled {
        deck: DeckId,
        order: Vec<CardId>,
    },
    CardDrawn {
        seat: Seat,
        deck: DeckId,
        card_id: CardId,
    },
    HermitGiven {
        from: Seat,
        to: Seat,
        card_id: CardId,
    },
    HermitResolved {
        seat: Seat,
        card_id: CardId,
    },
    PlayerHealed {
        seat: Seat,
        amount: u8,
        new_hp: u8,
    },
    PlayerDamaged {
        seat: Seat,
        amount: u8,
        new_hp: u8,
        source: DamageSource,
    },
    EquipmentStolen {
        from: Seat,
        to: Seat,
        equipment_id: CardId,
    },
    AttackResolved {
        attacker: Seat,
        target: Seat,
        roll: DiceRoll,
        damage: u8,
        target_hp: u8,
        killed: bool,
    },
    PlayerRevealed {
        seat: Seat,
        character_name: String,
        faction: Faction,
    },
    PlayerDied {
        seat: Seat,
        killed_by: Option<Seat>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        seat: Seat,
    },
    GameEnded {
        winners: Vec<Seat>,
        winning_faction: Option<Faction>,
        reason: String,
    },
    Error {
        code: String,
        message: String,
    },
}

/// An event as delivered: payload plus delivery metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Unique event id.
    pub id: Uuid,
    /// Wall-clock timestamp, milliseconds. Metadata only; never drives
    /// simulation branching.
    pub timestamp_ms: i64,
    #[serde(flatten)]
    pub data: EventData,
}

impl GameEvent {
    /// Wrap a payload with fresh delivery metadata.
    pub fn new(timestamp_ms: i64, data: EventData) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp_ms,
            data,
        }
    }

    /// Convenience constructor for error events.
    pub fn error(timestamp_ms: i64, code: &str, message: impl Into<String>) -> Self {
        Self::new(
            timestamp_ms,
            EventData::Error {
                code: code.to_string(),
                message: message.into(),
            },
        )
    }

    /// Whether this event is an error report.
    pub fn is_error(&self) -> bool {
        matches!(self.data, EventData::Error { .. })
    }
}
