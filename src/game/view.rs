//! View Projector
//!
//! Per-viewer redacted projection of match state. This is the only place
//! hidden information crosses to a client: a viewer sees their own
//! character, everyone's public fields, and revealed identities, nothing
//! else. Projected legal actions are kept in exact lockstep with the
//! validator's accept set; a drift between the two is a bug in whichever
//! side moved.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::core::rng::DiceRoll;
use crate::game::content::{
    AreaEffect, AreaId, CardId, CharacterDef, Content, Faction, GameConfig,
};
use crate::game::state::{MatchState, MatchStatus, Phase, RollContext, Seat};

/// One action the viewer may legally submit right now.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalAction {
    RollAndMove,
    ChooseArea { area_id: AreaId },
    DoAreaAction { action: crate::game::command::AreaAction },
    Attack { target_seat: Seat },
    EndTurn,
    RevealIdentity,
    ResolveHermit { card_id: CardId },
}

/// Public face of one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicPlayerView {
    pub seat: Seat,
    pub display_name: String,
    pub alive: bool,
    pub hp: u8,
    pub revealed: bool,
    pub position: Option<AreaId>,
    pub connected: bool,
    pub equipment: Vec<CardId>,
    /// Present only once the player has revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faction: Option<Faction>,
}

/// What one client is allowed to know.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientView {
    pub match_id: String,
    pub status: MatchStatus,
    pub viewer_seat: Option<Seat>,
    pub active_seat: Option<Seat>,
    pub phase: Phase,
    pub round: u32,
    pub players: BTreeMap<Seat, PublicPlayerView>,
    /// The viewer's own secret role, once assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_character: Option<CharacterDef>,
    pub last_roll: Option<DiceRoll>,
    pub last_roll_context: Option<RollContext>,
    pub pending_area_choice: bool,
    pub legal_actions: Vec<LegalAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winners: Option<Vec<Seat>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_faction: Option<Faction>,
}

/// Project the state for one viewer (or a pure spectator).
pub fn project(
    state: &MatchState,
    content: &Content,
    config: &GameConfig,
    viewer: Option<Seat>,
) -> ClientView {
    let players = state
        .players
        .values()
        .map(|p| {
            let identity = p
                .revealed
                .then(|| p.character_id.as_deref())
                .flatten()
                .and_then(|id| content.character(id));
            (p.seat, PublicPlayerView {
                seat: p.seat,
                display_name: p.display_name.clone(),
                alive: p.alive,
                hp: p.hp,
                revealed: p.revealed,
                position: p.position.clone(),
                connected: p.connected,
                equipment: p.equipment.clone(),
                character_name: identity.map(|c| c.name.clone()),
                faction: identity.map(|c| c.faction),
            })
        })
        .collect();

    let your_character = viewer
        .and_then(|seat| state.player(seat))
        .and_then(|p| p.character_id.as_deref())
        .and_then(|id| content.character(id))
        .cloned();

    ClientView {
        match_id: state.id.clone(),
        status: state.status,
        viewer_seat: viewer,
        active_seat: state.active_seat,
        phase: state.phase,
        round: state.round,
        players,
        your_character,
        last_roll: state.last_roll,
        last_roll_context: state.last_roll_context,
        pending_area_choice: state.pending_area_choice,
        legal_actions: viewer.map_or_else(Vec::new, |seat| {
            legal_actions(state, content, config, seat)
        }),
        winners: state.winners.clone(),
        winning_faction: state.winning_faction,
    }
}

/// Every action the validator would accept from `viewer` right now.
pub fn legal_actions(
    state: &MatchState,
    content: &Content,
    config: &GameConfig,
    viewer: Seat,
) -> Vec<LegalAction> {
    use crate::game::command::AreaAction;

    if state.status != MatchStatus::Active || state.has_winner() {
        return Vec::new();
    }
    if state.active_seat != Some(viewer) {
        return Vec::new();
    }
    let Some(active) = state.player(viewer).filter(|p| p.alive) else {
        return Vec::new();
    };

    let living_seats = state.alive_seats();
    let mut actions = Vec::new();

    match state.phase {
        Phase::Move => {
            if state.pending_area_choice {
                for area in &content.areas {
                    if active.position.as_deref() != Some(area.id.as_str()) {
                        actions.push(LegalAction::ChooseArea { area_id: area.id.clone() });
                    }
                }
            } else {
                actions.push(LegalAction::RollAndMove);
            }
        }

        Phase::Area => {
            let area = active.position.as_deref().and_then(|pos| content.area(pos));
            let effects: &[AreaEffect] = area.map_or(&[], |a| a.effects.as_slice());
            for effect in effects {
                match effect {
                    AreaEffect::DrawWhite => {
                        actions.push(LegalAction::DoAreaAction { action: AreaAction::DrawWhite });
                    }
                    AreaEffect::DrawBlack => {
                        actions.push(LegalAction::DoAreaAction { action: AreaAction::DrawBlack });
                    }
                    AreaEffect::DrawHermit => {
                        for &target_seat in &living_seats {
                            actions.push(LegalAction::DoAreaAction {
                                action: AreaAction::DrawHermit { target_seat },
                            });
                        }
                    }
                    AreaEffect::HealOrDamage => {
                        for &target_seat in &living_seats {
                            actions.push(LegalAction::DoAreaAction {
                                action: AreaAction::Heal {
                                    target_seat,
                                    amount: config.heal_amount,
                                },
                            });
                            actions.push(LegalAction::DoAreaAction {
                                action: AreaAction::Damage {
                                    target_seat,
                                    amount: config.damage_amount,
                                },
                            });
                        }
                    }
                    AreaEffect::StealEquipment => {
                        for &target_seat in &living_seats {
                            if target_seat == viewer {
                                continue;
                            }
                            let Some(target) = state.player(target_seat) else { continue };
                            if !state.in_range(active, target) {
                                continue;
                            }
                            for equipment_id in &target.equipment {
                                actions.push(LegalAction::DoAreaAction {
                                    action: AreaAction::StealEquipment {
                                        target_seat,
                                        equipment_id: equipment_id.clone(),
                                    },
                                });
                            }
                        }
                    }
                }
            }
            actions.push(LegalAction::DoAreaAction { action: AreaAction::Skip });
        }

        Phase::Attack => {
            for &target_seat in &living_seats {
                if target_seat == viewer {
                    continue;
                }
                let Some(target) = state.player(target_seat) else { continue };
                if state.in_range(active, target) {
                    actions.push(LegalAction::Attack { target_seat });
                }
            }
            actions.push(LegalAction::EndTurn);
        }

        Phase::End => {
            actions.push(LegalAction::EndTurn);
        }
    }

    // Phase-independent extras.
    if let Some(delivery) = state.hermit_delivery.as_ref().filter(|d| d.to == viewer) {
        actions.push(LegalAction::ResolveHermit { card_id: delivery.card_id.clone() });
    }
    if !active.revealed {
        actions.push(LegalAction::RevealIdentity);
    }

    actions
}

impl LegalAction {
    /// The command this action submits as.
    pub fn to_command(&self) -> crate::game::command::Command {
        use crate::game::command::Command;
        match self {
            LegalAction::RollAndMove => Command::RollAndMove,
            LegalAction::ChooseArea { area_id } => {
                Command::ChooseArea { area_id: area_id.clone() }
            }
            LegalAction::DoAreaAction { action } => {
                Command::DoAreaAction { action: action.clone() }
            }
            LegalAction::Attack { target_seat } => Command::Attack { target_seat: *target_seat },
            LegalAction::EndTurn => Command::EndTurn,
            LegalAction::RevealIdentity => Command::RevealIdentity,
            LegalAction::ResolveHermit { card_id } => Command::ResolveHermit {
                card_id: card_id.clone(),
                choice: serde_json::Value::Null,
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
