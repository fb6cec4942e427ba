//! Match State Definitions
//!
//! The canonical data model for one match. Uses BTreeMap keyed by seat
//! for deterministic iteration order. Nothing here mutates itself in
//! response to commands; all mutation flows through the event applier.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::rng::{DeterministicRng, DiceRoll};
use crate::game::content::{AreaId, CardId, CharacterId, DeckId, Faction};

/// A stable small integer identifying one player slot within a match.
pub type Seat = u8;

// =============================================================================
// LIFECYCLE & PHASES
// =============================================================================

/// Match lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Lobby,
    Active,
    Ended,
}

/// Sub-step of one player turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Move,
    Area,
    Attack,
    End,
}

/// What a dice roll was for (display metadata).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RollContext {
    Move,
    Attack,
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// One seated participant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Stable user identifier (survives reconnects).
    pub user_id: String,
    pub display_name: String,
    /// Assigned at join time, immutable for the match lifetime.
    pub seat: Seat,
    pub alive: bool,
    pub hp: u8,
    /// Irreversible once set.
    pub revealed: bool,
    /// Secret role; `None` until the match starts.
    pub character_id: Option<CharacterId>,
    /// Held equipment card ids, in acquisition order.
    pub equipment: Vec<CardId>,
    /// `None` means outside the board (pre-first-move).
    pub position: Option<AreaId>,
    pub connected: bool,
}

impl PlayerState {
    /// Create a freshly seated player (lobby defaults).
    pub fn new(user_id: String, display_name: String, seat: Seat) -> Self {
        Self {
            user_id,
            display_name,
            seat,
            alive: true,
            hp: 0,
            revealed: false,
            character_id: None,
            equipment: Vec::new(),
            position: None,
            connected: true,
        }
    }
}

// =============================================================================
// DECKS
// =============================================================================

/// Result of planning a draw against a deck snapshot.
///
/// `reshuffle` carries the full new draw-pile order when the draw pile
/// was empty, so the applier can replay the shuffle without an RNG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawPlan {
    pub card: Option<CardId>,
    pub reshuffle: Option<Vec<CardId>>,
}

/// One card pool: ordered draw pile plus ordered discard pile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckState {
    /// Draw pile; the top card is the last element.
    pub draw: Vec<CardId>,
    pub discard: Vec<CardId>,
}

impl DeckState {
    /// Plan the next draw without mutating the deck.
    ///
    /// An empty draw pile with a non-empty discard pile yields a
    /// reshuffle; both empty yields no card (never an error).
    pub fn plan_draw(&self, rng: &mut DeterministicRng) -> DrawPlan {
        if let Some(card) = self.draw.last() {
            return DrawPlan { card: Some(card.clone()), reshuffle: None };
        }
        if self.discard.is_empty() {
            return DrawPlan { card: None, reshuffle: None };
        }
        let order = rng.shuffled(self.discard.clone());
        DrawPlan {
            card: order.last().cloned(),
            reshuffle: Some(order),
        }
    }
}

/// The three named decks of a match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Decks {
    pub white: DeckState,
    pub black: DeckState,
    pub hermit: DeckState,
}

impl Decks {
    pub fn get(&self, id: DeckId) -> &DeckState {
        match id {
            DeckId::White => &self.white,
            DeckId::Black => &self.black,
            DeckId::Hermit => &self.hermit,
        }
    }

    pub fn get_mut(&mut self, id: DeckId) -> &mut DeckState {
        match id {
            DeckId::White => &mut self.white,
            DeckId::Black => &mut self.black,
            DeckId::Hermit => &mut self.hermit,
        }
    }
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// A hermit card handed off and awaiting resolution by its target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HermitDelivery {
    pub from: Seat,
    pub to: Seat,
    pub card_id: CardId,
}

/// Complete authoritative state of one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Short human-shareable code.
    pub id: String,
    pub status: MatchStatus,
    pub created_at_ms: i64,
    pub started_at_ms: Option<i64>,
    pub ended_at_ms: Option<i64>,

    /// Match-level RNG seed; per-command generators derive from this
    /// plus `events_applied`.
    pub seed: String,
    /// Authoritative clock: incremented once per applied event.
    pub events_applied: u64,

    pub turn_order: Vec<Seat>,
    pub active_seat: Option<Seat>,
    pub phase: Phase,
    pub round: u32,

    /// All players, keyed by seat (deterministic iteration).
    pub players: BTreeMap<Seat, PlayerState>,
    /// Adjacency pairs for combat/theft range; may be randomized per match.
    pub area_pairings: Vec<(AreaId, AreaId)>,
    pub decks: Decks,

    pub last_roll: Option<DiceRoll>,
    pub last_roll_context: Option<RollContext>,
    /// Set while the active player must pick an area (special dice sum).
    pub pending_area_choice: bool,
    pub hermit_delivery: Option<HermitDelivery>,

    pub winners: Option<Vec<Seat>>,
    pub winning_faction: Option<Faction>,
}

impl MatchState {
    /// Create a match in the lobby.
    pub fn new(id: String, seed: String, created_at_ms: i64) -> Self {
        Self {
            id,
            status: MatchStatus::Lobby,
            created_at_ms,
            started_at_ms: None,
            ended_at_ms: None,
            seed,
            events_applied: 0,
            turn_order: Vec::new(),
            active_seat: None,
            phase: Phase::Move,
            round: 0,
            players: BTreeMap::new(),
            area_pairings: Vec::new(),
            decks: Decks::default(),
            last_roll: None,
            last_roll_context: None,
            pending_area_choice: false,
            hermit_delivery: None,
            winners: None,
            winning_faction: None,
        }
    }

    /// Seat a new player; returns the assigned seat.
    pub fn add_player(&mut self, user_id: String, display_name: String) -> Seat {
        let seat = self.players.len() as Seat;
        self.players.insert(seat, PlayerState::new(user_id, display_name, seat));
        seat
    }

    pub fn player(&self, seat: Seat) -> Option<&PlayerState> {
        self.players.get(&seat)
    }

    pub fn player_mut(&mut self, seat: Seat) -> Option<&mut PlayerState> {
        self.players.get_mut(&seat)
    }

    /// Find a player by stable user id.
    pub fn player_by_user(&self, user_id: &str) -> Option<&PlayerState> {
        self.players.values().find(|p| p.user_id == user_id)
    }

    /// The player whose turn it is, if any.
    pub fn active_player(&self) -> Option<&PlayerState> {
        self.active_seat.and_then(|s| self.players.get(&s))
    }

    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| p.alive).count()
    }

    /// Living seats in seat order.
    pub fn alive_seats(&self) -> Vec<Seat> {
        self.players
            .values()
            .filter(|p| p.alive)
            .map(|p| p.seat)
            .collect()
    }

    pub fn has_winner(&self) -> bool {
        self.winners.as_ref().is_some_and(|w| !w.is_empty()) || self.winning_faction.is_some()
    }

    /// Whether two areas form an adjacency pair this match.
    pub fn areas_paired(&self, a: &str, b: &str) -> bool {
        self.area_pairings
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// The area paired with `area`, if any.
    pub fn paired_area(&self, area: &str) -> Option<&AreaId> {
        self.area_pairings.iter().find_map(|(x, y)| {
            if x == area {
                Some(y)
            } else if y == area {
                Some(x)
            } else {
                None
            }
        })
    }

    /// Attack/theft range: same area, or the two areas are paired.
    /// A player outside the board is never in range.
    pub fn in_range(&self, a: &PlayerState, b: &PlayerState) -> bool {
        match (&a.position, &b.position) {
            (Some(pa), Some(pb)) => pa == pb || self.areas_paired(pa, pb),
            _ => false,
        }
    }

    /// Next living seat after `seat` in turn order, wrapping around.
    ///
    /// Returns `None` only when no seat in the order is alive.
    pub fn next_alive_seat_after(&self, seat: Seat) -> Option<Seat> {
        let order = &self.turn_order;
        let current = order.iter().position(|&s| s == seat)?;
        for offset in 1..=order.len() {
            let candidate = order[(current + offset) % order.len()];
            if self.players.get(&candidate).is_some_and(|p| p.alive) {
                return Some(candidate);
            }
        }
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================
