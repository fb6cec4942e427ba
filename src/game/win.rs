//! Win Evaluator
//!
//! Pure check run after every applied command. Returns the first
//! satisfied result in a fixed priority order:
//!
//! 1. nobody alive (degenerate, no winner)
//! 2. shadows wiped out -> living hunters win
//! 3. hunters wiped out -> living shadows win
//! 4. character-specific conditions, evaluated in seat order
//! 5. all revealed living players share one faction -> that faction wins
//!
//! Character conditions are content-driven (`WinCondition` on the
//! roster); the evaluator never hard-codes a character.

use crate::game::content::{Content, Faction, WinCondition};
use crate::game::state::{MatchState, Seat};

/// Outcome of a finished match.
///
/// `winning_faction` is set only for factional wins; a character-specific
/// win names its single winner and no faction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinResult {
    pub winners: Vec<Seat>,
    pub winning_faction: Option<Faction>,
    pub reason: String,
}

/// Evaluate the board for a winner. `None` means play continues.
pub fn evaluate(state: &MatchState, content: &Content) -> Option<WinResult> {
    let faction_of = |seat: Seat| -> Option<Faction> {
        state
            .player(seat)?
            .character_id
            .as_deref()
            .and_then(|id| content.character(id))
            .map(|c| c.faction)
    };

    let seats: Vec<Seat> = state.players.keys().copied().collect();
    let living: Vec<Seat> = seats
        .iter()
        .copied()
        .filter(|&s| state.player(s).is_some_and(|p| p.alive))
        .collect();

    // 1. Nobody left standing.
    if living.is_empty() {
        return Some(WinResult {
            winners: Vec::new(),
            winning_faction: None,
            reason: "no players alive".into(),
        });
    }

    let living_of = |faction: Faction| -> Vec<Seat> {
        living
            .iter()
            .copied()
            .filter(|&s| faction_of(s) == Some(faction))
            .collect()
    };
    let faction_seated =
        |faction: Faction| seats.iter().any(|&s| faction_of(s) == Some(faction));

    // 2 & 3. Faction wipe-out.
    if faction_seated(Faction::Shadow) && living_of(Faction::Shadow).is_empty() {
        return Some(WinResult {
            winners: living_of(Faction::Hunter),
            winning_faction: Some(Faction::Hunter),
            reason: "all shadows eliminated".into(),
        });
    }
    if faction_seated(Faction::Hunter) && living_of(Faction::Hunter).is_empty() {
        return Some(WinResult {
            winners: living_of(Faction::Shadow),
            winning_faction: Some(Faction::Shadow),
            reason: "all hunters eliminated".into(),
        });
    }

    // 4. Character-specific conditions, in seat order.
    let dead_count = seats.len() - living.len();
    for &seat in &seats {
        let Some(player) = state.player(seat) else { continue };
        let Some(character) = player.character_id.as_deref().and_then(|id| content.character(id))
        else {
            continue;
        };
        let satisfied = match character.win_condition {
            WinCondition::Factional => false,
            // Checked after every command, so at the moment of the first
            // death exactly one player is dead.
            WinCondition::FirstToDie => !player.alive && dead_count == 1,
            WinCondition::EquipmentCount { count } => {
                player.alive && player.equipment.len() >= count
            }
            WinCondition::SurviveToLast { count } => player.alive && living.len() <= count,
        };
        if satisfied {
            return Some(WinResult {
                winners: vec![seat],
                winning_faction: None,
                reason: format!("{} fulfilled their own goal", character.name),
            });
        }
    }

    // 5. Every revealed living player belongs to one faction.
    let mut revealed_factions = living
        .iter()
        .filter(|&&s| state.player(s).is_some_and(|p| p.revealed))
        .filter_map(|&s| faction_of(s));
    if let Some(first) = revealed_factions.next() {
        if revealed_factions.all(|f| f == first) {
            return Some(WinResult {
                winners: living_of(first),
                winning_faction: Some(first),
                reason: "only one faction remains revealed".into(),
            });
        }
    }

    None
}

// =============================================================================
// TESTS
// =============================================================================
