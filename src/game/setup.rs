//! Match Setup
//!
//! Everything that happens between the lobby and the first turn: secret
//! character assignment, deck shuffles, turn order, and adjacency
//! pairing. All randomness comes from one generator derived from the
//! match seed at event counter zero, so a replay from the same seed
//! reproduces the same match.
//!
//! Character assignment is the one mutation that bypasses the event
//! applier: role identities are secret and must never ride on broadcast
//! events. Everything public flows through the returned events.

use thiserror::Error;
use tracing::info;

use crate::core::rng::DeterministicRng;
use crate::game::content::{Content, Faction, GameConfig, PairingMode};
use crate::game::events::{EventData, GameEvent};
use crate::game::state::{MatchState, MatchStatus, Phase, Seat};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("match is not in the lobby")]
    NotInLobby,
    #[error("need at least {need} players, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },
    #[error("no faction distribution for {players} players")]
    NoDistribution { players: usize },
    #[error("content roster cannot seat {players} players")]
    RosterTooSmall { players: usize },
}

/// Start a lobby match.
///
/// Assigns secret characters and shuffled decks directly on the state,
/// then returns the `MATCH_STARTED` and first `TURN_STARTED` events for
/// the caller to apply and broadcast. RNG draws happen in a fixed
/// order: characters, seat assignment, decks, turn order, pairings.
pub fn start_match(
    state: &mut MatchState,
    content: &Content,
    config: &GameConfig,
    now_ms: i64,
) -> Result<Vec<GameEvent>, SetupError> {
    if state.status != MatchStatus::Lobby {
        return Err(SetupError::NotInLobby);
    }
    let players = state.players.len();
    if players < config.min_players {
        return Err(SetupError::NotEnoughPlayers { have: players, need: config.min_players });
    }
    let (hunters, shadows, neutrals) = config
        .faction_distribution(players)
        .ok_or(SetupError::NoDistribution { players })?;

    let mut rng = DeterministicRng::for_command(&state.seed, state.events_applied);

    // Draw the roster for this match, then shuffle it across seats so
    // seat order reveals nothing about faction counts.
    let mut roster: Vec<String> = Vec::with_capacity(players);
    for (faction, count) in [
        (Faction::Hunter, hunters),
        (Faction::Shadow, shadows),
        (Faction::Neutral, neutrals),
    ] {
        let pool = content.characters_of(faction);
        if pool.len() < count {
            return Err(SetupError::RosterTooSmall { players });
        }
        roster.extend(rng.choose_many(&pool, count).into_iter().map(|c| c.id.clone()));
    }
    rng.shuffle(&mut roster);

    for (player, character_id) in state.players.values_mut().zip(roster) {
        let character = content
            .character(&character_id)
            .ok_or(SetupError::RosterTooSmall { players })?;
        player.hp = character.max_hp;
        player.character_id = Some(character_id);
        player.alive = true;
        player.revealed = false;
        player.position = None;
        player.equipment.clear();
    }

    for deck in [
        crate::game::content::DeckId::White,
        crate::game::content::DeckId::Black,
        crate::game::content::DeckId::Hermit,
    ] {
        let pile = state.decks.get_mut(deck);
        pile.draw = rng.shuffled(content.deck_cards(deck));
        pile.discard.clear();
    }

    let seats: Vec<Seat> = state.players.keys().copied().collect();
    let turn_order = rng.shuffled(seats.clone());

    state.area_pairings = match config.pairing {
        PairingMode::Static => config.static_pairings(content),
        PairingMode::Randomized => {
            let order = rng.shuffled(content.areas.iter().map(|a| a.id.clone()).collect());
            order
                .chunks(2)
                .filter(|pair| pair.len() == 2)
                .map(|pair| (pair[0].clone(), pair[1].clone()))
                .collect()
        }
    };

    info!(
        match_id = %state.id,
        players,
        first_seat = turn_order[0],
        "match starting"
    );

    Ok(vec![
        GameEvent::new(now_ms, EventData::MatchStarted {
            seats,
            turn_order: turn_order.clone(),
        }),
        GameEvent::new(now_ms, EventData::TurnStarted {
            seat: turn_order[0],
            round: 1,
            phase: Phase::Move,
        }),
    ])
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::apply::apply_all;
    use crate::game::content::DeckId;

    fn lobby(seed: &str, players: usize) -> MatchState {
        let mut state = MatchState::new("TEST".into(), seed.into(), 0);
        for i in 0..players {
            state.add_player(format!("u{i}"), format!("P{i}"));
        }
        state
    }

    #[test]
    fn test_start_rejects_short_lobby() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = lobby("seed", 3);

        assert_eq!(
            start_match(&mut state, &content, &config, 0),
            Err(SetupError::NotEnoughPlayers { have: 3, need: 4 })
        );
    }

    #[test]
    fn test_start_rejects_active_match() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = lobby("seed", 4);
        state.status = MatchStatus::Active;

        assert_eq!(start_match(&mut state, &content, &config, 0), Err(SetupError::NotInLobby));
    }

    #[test]
    fn test_start_assigns_roles_per_distribution() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = lobby("seed", 5);

        let events = start_match(&mut state, &content, &config, 10).unwrap();
        apply_all(&mut state, &content, &events);

        assert_eq!(state.status, MatchStatus::Active);
        assert_eq!(state.started_at_ms, Some(10));
        assert_eq!(state.round, 1);
        assert_eq!(state.phase, Phase::Move);
        assert!(state.active_seat.is_some());

        let mut hunters = 0;
        let mut shadows = 0;
        let mut neutrals = 0;
        let mut ids: Vec<&str> = Vec::new();
        for player in state.players.values() {
            let id = player.character_id.as_deref().unwrap();
            ids.push(id);
            let character = content.character(id).unwrap();
            assert_eq!(player.hp, character.max_hp);
            assert!(player.alive);
            assert!(!player.revealed);
            match character.faction {
                Faction::Hunter => hunters += 1,
                Faction::Shadow => shadows += 1,
                Faction::Neutral => neutrals += 1,
            }
        }
        assert_eq!((hunters, shadows, neutrals), (2, 2, 1));

        // No duplicate characters.
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_decks_are_shuffled_permutations() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = lobby("deck-seed", 4);
        let events = start_match(&mut state, &content, &config, 0).unwrap();
        apply_all(&mut state, &content, &events);

        for deck in [DeckId::White, DeckId::Black, DeckId::Hermit] {
            let mut shuffled = state.decks.get(deck).draw.clone();
            let mut expected = content.deck_cards(deck);
            shuffled.sort_unstable();
            expected.sort_unstable();
            assert_eq!(shuffled, expected);
            assert!(state.decks.get(deck).discard.is_empty());
        }
    }

    #[test]
    fn test_turn_order_is_a_seat_permutation() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = lobby("order-seed", 6);
        let events = start_match(&mut state, &content, &config, 0).unwrap();
        apply_all(&mut state, &content, &events);

        let mut order = state.turn_order.clone();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(state.active_seat, Some(state.turn_order[0]));
    }

    #[test]
    fn test_randomized_pairing_covers_every_area() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = lobby("pairing-seed", 4);
        let events = start_match(&mut state, &content, &config, 0).unwrap();
        apply_all(&mut state, &content, &events);

        let mut seen: Vec<&str> = state
            .area_pairings
            .iter()
            .flat_map(|(a, b)| [a.as_str(), b.as_str()])
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), content.areas.len());
    }

    #[test]
    fn test_same_seed_same_setup() {
        let content = Content::standard();
        let config = GameConfig::default();

        let mut a = lobby("replay", 5);
        let mut b = lobby("replay", 5);
        let ea = start_match(&mut a, &content, &config, 0).unwrap();
        let eb = start_match(&mut b, &content, &config, 0).unwrap();
        apply_all(&mut a, &content, &ea);
        apply_all(&mut b, &content, &eb);

        assert_eq!(a, b);

        let mut c = lobby("different", 5);
        let ec = start_match(&mut c, &content, &config, 0).unwrap();
        apply_all(&mut c, &content, &ec);
        // A different seed diverges somewhere in the shuffled state.
        let same_seed_fields = (a.turn_order.clone(), a.decks.clone(), a.area_pairings.clone());
        let other_seed_fields = (c.turn_order.clone(), c.decks.clone(), c.area_pairings.clone());
        assert_ne!(same_seed_fields, other_seed_fields);
    }
}
