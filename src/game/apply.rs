//! Event Applier
//!
//! The single place where match state mutates. Folds events produced by
//! the reducer (or the setup routine) into `MatchState`, one at a time,
//! bumping `events_applied` for each. Application is total: unknown or
//! stale payloads degrade to no-ops rather than panicking, since every
//! event was derived from a validated snapshot.

use tracing::warn;

use crate::game::content::{CardKind, Content};
use crate::game::events::{EventData, GameEvent};
use crate::game::state::{HermitDelivery, MatchState, MatchStatus};

/// Fold one event into the state.
pub fn apply(state: &mut MatchState, content: &Content, event: &GameEvent) {
    state.events_applied += 1;

    match &event.data {
        EventData::PlayerJoined { seat, .. } => {
            // Seat insertion happens in the session (user ids are private
            // and never ride on events); this marks presence.
            if let Some(player) = state.player_mut(*seat) {
                player.connected = true;
            }
        }

        EventData::PlayerLeft { seat } => {
            if let Some(player) = state.player_mut(*seat) {
                player.connected = false;
            }
        }

        EventData::MatchStarted { turn_order, .. } => {
            state.status = MatchStatus::Active;
            state.started_at_ms = Some(event.timestamp_ms);
            state.turn_order = turn_order.clone();
        }

        EventData::TurnStarted { seat, round, phase } => {
            state.active_seat = Some(*seat);
            state.round = *round;
            state.phase = *phase;
            state.pending_area_choice = false;
            state.last_roll = None;
            state.last_roll_context = None;
        }

        EventData::DiceRolled { roll, context, must_choose_area, .. } => {
            state.last_roll = Some(*roll);
            state.last_roll_context = Some(*context);
            state.pending_area_choice = *must_choose_area;
        }

        EventData::PlayerMoved { seat, to, .. } => {
            if let Some(player) = state.player_mut(*seat) {
                player.position = Some(to.clone());
            }
        }

        EventData::AreaChoiceResolved { .. } => {
            state.pending_area_choice = false;
        }

        EventData::DeckReshuffled { deck, order } => {
            let deck = state.decks.get_mut(*deck);
            deck.draw = order.clone();
            deck.discard.clear();
        }

        EventData::CardDrawn { seat, deck, card_id } => {
            let pile = state.decks.get_mut(*deck);
            let drawn = pile.draw.pop();
            if drawn.as_deref() != Some(card_id.as_str()) {
                warn!(deck = ?deck, card_id, "drawn card does not match deck top");
            }
            match content.card(card_id).map(|c| c.kind) {
                Some(CardKind::Equipment) => {
                    if let Some(player) = state.player_mut(*seat) {
                        player.equipment.push(card_id.clone());
                    }
                }
                // Single-use cards resolve on draw and go straight to
                // the discard pile.
                Some(CardKind::SingleUse) | None => {
                    state.decks.get_mut(*deck).discard.push(card_id.clone());
                }
            }
        }

        EventData::HermitGiven { from, to, card_id } => {
            state.decks.hermit.draw.pop();
            state.hermit_delivery = Some(HermitDelivery {
                from: *from,
                to: *to,
                card_id: card_id.clone(),
            });
        }

        EventData::HermitResolved { card_id, .. } => {
            state.hermit_delivery = None;
            state.decks.hermit.discard.push(card_id.clone());
        }

        EventData::PlayerHealed { seat, new_hp, .. } => {
            if let Some(player) = state.player_mut(*seat) {
                player.hp = *new_hp;
            }
        }

        EventData::PlayerDamaged { seat, new_hp, .. } => {
            if let Some(player) = state.player_mut(*seat) {
                player.hp = *new_hp;
            }
        }

        EventData::EquipmentStolen { from, to, equipment_id } => {
            let taken = state.player_mut(*from).and_then(|p| {
                p.equipment
                    .iter()
                    .position(|c| c == equipment_id)
                    .map(|i| p.equipment.remove(i))
            });
            if let (Some(card), Some(thief)) = (taken, state.player_mut(*to)) {
                thief.equipment.push(card);
            }
        }

        EventData::AttackResolved { target, target_hp, .. } => {
            if let Some(player) = state.player_mut(*target) {
                player.hp = *target_hp;
            }
        }

        EventData::PlayerRevealed { seat, .. } => {
            if let Some(player) = state.player_mut(*seat) {
                player.revealed = true;
            }
        }

        EventData::PlayerDied { seat, .. } => {
            if let Some(player) = state.player_mut(*seat) {
                player.alive = false;
                player.hp = 0;
            }
        }

        EventData::PhaseChanged { to, .. } => {
            state.phase = *to;
        }

        EventData::GameEnded { winners, winning_faction, .. } => {
            state.status = MatchStatus::Ended;
            state.ended_at_ms = Some(event.timestamp_ms);
            state.winners = Some(winners.clone());
            state.winning_faction = *winning_faction;
        }

        // Errors change nothing but still advance the event clock, so a
        // rejected command perturbs later RNG derivation the same way on
        // every replay.
        EventData::Error { .. } => {}
    }
}

/// Fold a batch in order.
pub fn apply_all(state: &mut MatchState, content: &Content, events: &[GameEvent]) {
    for event in events {
        apply(state, content, event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
