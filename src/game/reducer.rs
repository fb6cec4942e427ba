//! Reducer: command -> ordered event list
//!
//! The rule engine. Takes a state snapshot, a per-command RNG, and one
//! command, and returns the events describing every resulting change.
//! Never mutates state; the applier folds the events afterwards. All
//! branching is driven by the command, the snapshot, and RNG draws.

use crate::core::rng::DeterministicRng;
use crate::game::command::{AreaAction, Command};
use crate::game::content::{Content, DeckId, GameConfig};
use crate::game::events::{DamageSource, EventData, GameEvent};
use crate::game::state::{MatchState, Phase, RollContext, Seat};
use crate::game::validate::{validate, CommandError};

/// Everything the reducer needs besides state and RNG.
pub struct ReducerCtx<'a> {
    pub content: &'a Content,
    pub config: &'a GameConfig,
    /// Wall-clock stamp for emitted events (metadata only).
    pub now_ms: i64,
}

impl<'a> ReducerCtx<'a> {
    fn event(&self, data: EventData) -> GameEvent {
        GameEvent::new(self.now_ms, data)
    }

    fn error(&self, err: &CommandError) -> GameEvent {
        GameEvent::error(self.now_ms, err.code(), err.to_string())
    }
}

/// Reduce one command against a state snapshot.
///
/// Re-validates first (defense in depth): an illegal command yields a
/// single error event and nothing else.
pub fn reduce(
    state: &MatchState,
    rng: &mut DeterministicRng,
    ctx: &ReducerCtx,
    command: &Command,
) -> Vec<GameEvent> {
    if let Err(err) = validate(state, ctx.content, ctx.config, command) {
        return vec![ctx.error(&err)];
    }

    // Validation guarantees an active, living player for turn commands.
    let Some(seat) = state.active_seat else {
        return vec![ctx.error(&CommandError::Internal)];
    };

    match command {
        Command::RollAndMove => roll_and_move(state, rng, ctx, seat),
        Command::ChooseArea { area_id } => choose_area(state, ctx, seat, area_id),
        Command::DoAreaAction { action } => area_action(state, rng, ctx, seat, action),
        Command::Attack { target_seat } => attack(state, rng, ctx, seat, *target_seat),
        Command::EndTurn => end_turn(state, ctx, seat),
        Command::RevealIdentity => reveal_identity(state, ctx, seat),
        Command::ResolveHermit { card_id, .. } => resolve_hermit(ctx, seat, card_id),
        // Lobby commands never reach the reducer; the session handles them.
        Command::JoinMatch { .. } | Command::StartGame { .. } => {
            vec![ctx.error(&CommandError::UnsupportedCommand)]
        }
    }
}

/// Roll the dice and move to the routed area.
///
/// A roll equal to the special sum stops here with the choice pending.
/// A roll routing to the mover's current area is a no-op that must be
/// rerolled; the loop is bounded so pathological dice tables cannot
/// spin forever (phase simply stays MOVE when the cap is hit).
fn roll_and_move(
    state: &MatchState,
    rng: &mut DeterministicRng,
    ctx: &ReducerCtx,
    seat: Seat,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let position = state.player(seat).and_then(|p| p.position.clone());

    for _ in 0..ctx.config.reroll_cap {
        let roll = rng.roll_dice();
        let must_choose = roll.sum == ctx.config.special_dice_sum;
        events.push(ctx.event(EventData::DiceRolled {
            seat,
            roll,
            context: RollContext::Move,
            must_choose_area: must_choose,
        }));

        if must_choose {
            return events;
        }

        let Some(area) = ctx.content.area_for_sum(roll.sum) else {
            // Unmapped sum: the roll stands but routes nowhere.
            return events;
        };

        if position.as_deref() == Some(area.id.as_str()) {
            // Landed where we already stand: reroll.
            continue;
        }

        events.push(ctx.event(EventData::PlayerMoved {
            seat,
            from: position.clone(),
            to: area.id.clone(),
        }));
        events.push(ctx.event(EventData::PhaseChanged {
            from: Phase::Move,
            to: Phase::Area,
            seat,
        }));
        return events;
    }

    events
}

fn choose_area(
    state: &MatchState,
    ctx: &ReducerCtx,
    seat: Seat,
    area_id: &str,
) -> Vec<GameEvent> {
    let position = state.player(seat).and_then(|p| p.position.clone());
    vec![
        ctx.event(EventData::PlayerMoved {
            seat,
            from: position,
            to: area_id.to_string(),
        }),
        ctx.event(EventData::AreaChoiceResolved { seat }),
        ctx.event(EventData::PhaseChanged {
            from: Phase::Move,
            to: Phase::Area,
            seat,
        }),
    ]
}

fn area_action(
    state: &MatchState,
    rng: &mut DeterministicRng,
    ctx: &ReducerCtx,
    seat: Seat,
    action: &AreaAction,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let mut active_died = false;

    match action {
        AreaAction::DrawWhite => draw_into(&mut events, state, rng, ctx, seat, DeckId::White),
        AreaAction::DrawBlack => draw_into(&mut events, state, rng, ctx, seat, DeckId::Black),

        AreaAction::DrawHermit { target_seat } => {
            let plan = state.decks.get(DeckId::Hermit).plan_draw(rng);
            if let Some(order) = plan.reshuffle {
                events.push(ctx.event(EventData::DeckReshuffled {
                    deck: DeckId::Hermit,
                    order,
                }));
            }
            if let Some(card_id) = plan.card {
                events.push(ctx.event(EventData::HermitGiven {
                    from: seat,
                    to: *target_seat,
                    card_id,
                }));
            }
        }

        AreaAction::Heal { target_seat, amount } => {
            if let Some(target) = state.player(*target_seat) {
                let max_hp = target
                    .character_id
                    .as_deref()
                    .and_then(|id| ctx.content.character(id))
                    .map(|c| c.max_hp)
                    .unwrap_or(target.hp);
                let new_hp = target.hp.saturating_add(*amount).min(max_hp);
                events.push(ctx.event(EventData::PlayerHealed {
                    seat: *target_seat,
                    amount: *amount,
                    new_hp,
                }));
            }
        }

        AreaAction::Damage { target_seat, amount } => {
            if let Some(target) = state.player(*target_seat) {
                let new_hp = target.hp.saturating_sub(*amount);
                events.push(ctx.event(EventData::PlayerDamaged {
                    seat: *target_seat,
                    amount: *amount,
                    new_hp,
                    source: DamageSource::AreaAction,
                }));
                if new_hp == 0 {
                    events.push(ctx.event(EventData::PlayerDied {
                        seat: *target_seat,
                        killed_by: Some(seat),
                    }));
                    active_died = *target_seat == seat;
                }
            }
        }

        AreaAction::StealEquipment { target_seat, equipment_id } => {
            events.push(ctx.event(EventData::EquipmentStolen {
                from: *target_seat,
                to: seat,
                equipment_id: equipment_id.clone(),
            }));
        }

        AreaAction::Skip => {}
    }

    // Every branch, skip included, hands the turn to the attack phase.
    events.push(ctx.event(EventData::PhaseChanged {
        from: Phase::Area,
        to: Phase::Attack,
        seat,
    }));

    // A self-inflicted death would strand the turn on a dead seat; pass
    // it on immediately. The snapshot still shows `seat` alive, so skip
    // the wrap-around case where nobody else survives.
    if active_died {
        if let Some(next) = state.next_alive_seat_after(seat).filter(|&s| s != seat) {
            events.push(ctx.event(EventData::TurnStarted {
                seat: next,
                round: state.round + 1,
                phase: Phase::Move,
            }));
        }
    }
    events
}

fn draw_into(
    events: &mut Vec<GameEvent>,
    state: &MatchState,
    rng: &mut DeterministicRng,
    ctx: &ReducerCtx,
    seat: Seat,
    deck: DeckId,
) {
    let plan = state.decks.get(deck).plan_draw(rng);
    if let Some(order) = plan.reshuffle {
        events.push(ctx.event(EventData::DeckReshuffled { deck, order }));
    }
    if let Some(card_id) = plan.card {
        events.push(ctx.event(EventData::CardDrawn { seat, deck, card_id }));
    }
}

fn attack(
    state: &MatchState,
    rng: &mut DeterministicRng,
    ctx: &ReducerCtx,
    seat: Seat,
    target_seat: Seat,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let Some(target) = state.player(target_seat) else {
        return vec![ctx.error(&CommandError::InvalidTarget)];
    };

    let roll = rng.roll_dice();
    let damage = roll.difference;
    let target_hp = target.hp.saturating_sub(damage);
    let killed = target_hp == 0;

    events.push(ctx.event(EventData::DiceRolled {
        seat,
        roll,
        context: RollContext::Attack,
        must_choose_area: false,
    }));
    events.push(ctx.event(EventData::AttackResolved {
        attacker: seat,
        target: target_seat,
        roll,
        damage,
        target_hp,
        killed,
    }));
    if killed {
        events.push(ctx.event(EventData::PlayerDied {
            seat: target_seat,
            killed_by: Some(seat),
        }));
    }
    events.push(ctx.event(EventData::PhaseChanged {
        from: Phase::Attack,
        to: Phase::End,
        seat,
    }));
    events
}

fn end_turn(state: &MatchState, ctx: &ReducerCtx, seat: Seat) -> Vec<GameEvent> {
    // At least one living seat is guaranteed: the match would otherwise
    // already have ended.
    let Some(next) = state.next_alive_seat_after(seat) else {
        return vec![ctx.error(&CommandError::Internal)];
    };
    vec![ctx.event(EventData::TurnStarted {
        seat: next,
        round: state.round + 1,
        phase: Phase::Move,
    })]
}

fn reveal_identity(state: &MatchState, ctx: &ReducerCtx, seat: Seat) -> Vec<GameEvent> {
    let character = state
        .player(seat)
        .and_then(|p| p.character_id.as_deref())
        .and_then(|id| ctx.content.character(id));
    let Some(character) = character else {
        return vec![ctx.error(&CommandError::Internal)];
    };
    vec![ctx.event(EventData::PlayerRevealed {
        seat,
        character_name: character.name.clone(),
        faction: character.faction,
    })]
}

fn resolve_hermit(ctx: &ReducerCtx, seat: Seat, card_id: &str) -> Vec<GameEvent> {
    // The delivered card's effect pipeline is content-driven and external;
    // the core records the handoff completing and discards the card.
    vec![ctx.event(EventData::HermitResolved {
        seat,
        card_id: card_id.to_string(),
    })]
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::MatchStatus;

    fn ctx<'a>(content: &'a Content, config: &'a GameConfig) -> ReducerCtx<'a> {
        ReducerCtx { content, config, now_ms: 0 }
    }

    fn started_state(content: &Content) -> MatchState {
        let mut state = MatchState::new("TEST".into(), "S1".into(), 0);
        for i in 0..4 {
            state.add_player(format!("u{i}"), format!("P{i}"));
        }
        state.status = MatchStatus::Active;
        state.turn_order = vec![0, 1, 2, 3];
        state.active_seat = Some(0);
        state.round = 1;
        state.phase = Phase::Move;
        state.area_pairings = vec![
            ("hermit_cabin".into(), "underworld_gate".into()),
            ("church".into(), "cemetery".into()),
            ("weird_woods".into(), "forgotten_altar".into()),
        ];
        let characters = ["warden", "oracle", "revenant", "wraith"];
        for (p, character) in state.players.values_mut().zip(characters) {
            p.character_id = Some(character.to_string());
            p.hp = content.character(character).unwrap().max_hp;
        }
        state.decks.white.draw = content.deck_cards(DeckId::White);
        state.decks.black.draw = content.deck_cards(DeckId::Black);
        state.decks.hermit.draw = content.deck_cards(DeckId::Hermit);
        state
    }

    fn event_types(events: &[GameEvent]) -> Vec<&'static str> {
        events
            .iter()
            .map(|e| match &e.data {
                EventData::DiceRolled { .. } => "DICE_ROLLED",
                EventData::PlayerMoved { .. } => "PLAYER_MOVED",
                EventData::AreaChoiceResolved { .. } => "AREA_CHOICE_RESOLVED",
                EventData::PhaseChanged { .. } => "PHASE_CHANGED",
                EventData::AttackResolved { .. } => "ATTACK_RESOLVED",
                EventData::PlayerDied { .. } => "PLAYER_DIED",
                EventData::CardDrawn { .. } => "CARD_DRAWN",
                EventData::DeckReshuffled { .. } => "DECK_RESHUFFLED",
                EventData::HermitGiven { .. } => "HERMIT_GIVEN",
                EventData::HermitResolved { .. } => "HERMIT_RESOLVED",
                EventData::PlayerHealed { .. } => "PLAYER_HEALED",
                EventData::PlayerDamaged { .. } => "PLAYER_DAMAGED",
                EventData::EquipmentStolen { .. } => "EQUIPMENT_STOLEN",
                EventData::TurnStarted { .. } => "TURN_STARTED",
                EventData::PlayerRevealed { .. } => "PLAYER_REVEALED",
                EventData::Error { .. } => "ERROR",
                _ => "OTHER",
            })
            .collect()
    }

    #[test]
    fn test_illegal_command_yields_single_error_event() {
        let content = Content::standard();
        let config = GameConfig::default();
        let state = started_state(&content);
        let mut rng = DeterministicRng::for_command(&state.seed, 0);

        // Attack during the move phase.
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::Attack { target_seat: 1 },
        );
        assert_eq!(events.len(), 1);
        assert!(events[0].is_error());
    }

    #[test]
    fn test_attack_in_range_resolves() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.phase = Phase::Attack;
        state.player_mut(0).unwrap().position = Some("weird_woods".into());
        state.player_mut(1).unwrap().position = Some("forgotten_altar".into());

        let mut rng = DeterministicRng::for_command("S1", state.events_applied);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::Attack { target_seat: 1 },
        );

        let types = event_types(&events);
        assert_eq!(types[0], "DICE_ROLLED");
        assert_eq!(types[1], "ATTACK_RESOLVED");
        assert_eq!(*types.last().unwrap(), "PHASE_CHANGED");

        match &events[1].data {
            EventData::AttackResolved { roll, damage, target_hp, killed, .. } => {
                assert_eq!(*damage, roll.difference);
                let before = state.player(1).unwrap().hp;
                assert_eq!(*target_hp, before.saturating_sub(*damage));
                assert_eq!(*killed, *target_hp == 0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_attack_kill_emits_death() {
        let content = Content::standard();
        let config = GameConfig::default();

        // Find a counter whose first roll deals nonzero damage.
        let counter = (0..200u64)
            .find(|c| DeterministicRng::for_command("S1", *c).roll_dice().difference > 0)
            .unwrap();

        let mut state = started_state(&content);
        state.events_applied = counter;
        state.phase = Phase::Attack;
        state.player_mut(0).unwrap().position = Some("church".into());
        state.player_mut(1).unwrap().position = Some("church".into());
        state.player_mut(1).unwrap().hp = 1;

        let mut rng = DeterministicRng::for_command("S1", counter);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::Attack { target_seat: 1 },
        );
        assert_eq!(
            event_types(&events),
            vec!["DICE_ROLLED", "ATTACK_RESOLVED", "PLAYER_DIED", "PHASE_CHANGED"]
        );
    }

    #[test]
    fn test_special_sum_stops_with_pending_choice() {
        let content = Content::standard();
        let config = GameConfig::default();

        // Find a counter whose first roll is the special sum.
        let counter = (0..2000u64)
            .find(|c| {
                DeterministicRng::for_command("S1", *c).roll_dice().sum == config.special_dice_sum
            })
            .expect("a special roll must occur somewhere");

        let mut state = started_state(&content);
        state.events_applied = counter;
        let mut rng = DeterministicRng::for_command("S1", counter);
        let events = reduce(&state, &mut rng, &ctx(&content, &config), &Command::RollAndMove);

        assert_eq!(event_types(&events), vec!["DICE_ROLLED"]);
        match &events[0].data {
            EventData::DiceRolled { must_choose_area, .. } => assert!(must_choose_area),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_roll_and_move_moves_and_advances_phase() {
        let content = Content::standard();
        let config = GameConfig::default();

        // Find a counter whose first roll routes somewhere.
        let counter = (0..2000u64)
            .find(|c| {
                DeterministicRng::for_command("S1", *c).roll_dice().sum != config.special_dice_sum
            })
            .unwrap();

        let mut state = started_state(&content);
        state.events_applied = counter;
        let mut rng = DeterministicRng::for_command("S1", counter);
        let events = reduce(&state, &mut rng, &ctx(&content, &config), &Command::RollAndMove);

        // Player starts off-board, so the first mapped roll always moves.
        assert_eq!(
            event_types(&events),
            vec!["DICE_ROLLED", "PLAYER_MOVED", "PHASE_CHANGED"]
        );
        match &events[1].data {
            EventData::PlayerMoved { from, to, .. } => {
                assert!(from.is_none());
                assert!(content.area(to).is_some());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_noop_roll_rerolls_same_turn() {
        let content = Content::standard();
        let config = GameConfig::default();

        // Place the player on the area the first roll routes to, forcing
        // at least one reroll.
        let counter = (0..2000u64)
            .find(|c| {
                let sum = DeterministicRng::for_command("S1", *c).roll_dice().sum;
                sum != config.special_dice_sum && content.area_for_sum(sum).is_some()
            })
            .unwrap();
        let first_sum = DeterministicRng::for_command("S1", counter).roll_dice().sum;
        let first_area = content.area_for_sum(first_sum).unwrap().id.clone();

        let mut state = started_state(&content);
        state.events_applied = counter;
        state.player_mut(0).unwrap().position = Some(first_area.clone());

        let mut rng = DeterministicRng::for_command("S1", counter);
        let events = reduce(&state, &mut rng, &ctx(&content, &config), &Command::RollAndMove);

        let rolls = events
            .iter()
            .filter(|e| matches!(e.data, EventData::DiceRolled { .. }))
            .count();
        assert!(rolls >= 2, "no-op roll must trigger a reroll");
        if let Some(EventData::PlayerMoved { to, .. }) =
            events.iter().map(|e| &e.data).find(|d| matches!(d, EventData::PlayerMoved { .. }))
        {
            assert_ne!(*to, first_area);
        }
    }

    #[test]
    fn test_choose_area_emits_move_resolution_and_phase() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.pending_area_choice = true;
        state.player_mut(0).unwrap().position = Some("church".into());

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::ChooseArea { area_id: "cemetery".into() },
        );
        assert_eq!(
            event_types(&events),
            vec!["PLAYER_MOVED", "AREA_CHOICE_RESOLVED", "PHASE_CHANGED"]
        );
    }

    #[test]
    fn test_choose_current_area_rejected() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.pending_area_choice = true;
        state.player_mut(0).unwrap().position = Some("church".into());

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::ChooseArea { area_id: "church".into() },
        );
        assert_eq!(events.len(), 1);
        assert!(events[0].is_error());
    }

    #[test]
    fn test_draw_from_empty_deck_reshuffles_discard() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.phase = Phase::Area;
        state.player_mut(0).unwrap().position = Some("church".into());
        state.decks.white.draw.clear();
        state.decks.white.discard = vec!["w_first_aid".into(), "w_banishment".into()];

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::DoAreaAction { action: AreaAction::DrawWhite },
        );
        assert_eq!(
            event_types(&events),
            vec!["DECK_RESHUFFLED", "CARD_DRAWN", "PHASE_CHANGED"]
        );
    }

    #[test]
    fn test_draw_with_both_piles_empty_yields_no_card() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.phase = Phase::Area;
        state.player_mut(0).unwrap().position = Some("church".into());
        state.decks.white = Default::default();

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::DoAreaAction { action: AreaAction::DrawWhite },
        );
        // No card, no error: just the phase advancing.
        assert_eq!(event_types(&events), vec!["PHASE_CHANGED"]);
    }

    #[test]
    fn test_heal_clamps_at_role_max() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.phase = Phase::Area;
        state.player_mut(0).unwrap().position = Some("weird_woods".into());
        // Seat 1 is the oracle (max 10), already at full health.
        assert_eq!(state.player(1).unwrap().hp, 10);

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::DoAreaAction {
                action: AreaAction::Heal { target_seat: 1, amount: config.heal_amount },
            },
        );
        match &events[0].data {
            EventData::PlayerHealed { new_hp, .. } => assert_eq!(*new_hp, 10),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_area_damage_can_kill() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.phase = Phase::Area;
        state.player_mut(0).unwrap().position = Some("weird_woods".into());
        state.player_mut(2).unwrap().hp = 1;

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::DoAreaAction {
                action: AreaAction::Damage { target_seat: 2, amount: config.damage_amount },
            },
        );
        assert_eq!(
            event_types(&events),
            vec!["PLAYER_DAMAGED", "PLAYER_DIED", "PHASE_CHANGED"]
        );
    }

    #[test]
    fn test_self_kill_hands_the_turn_over() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.phase = Phase::Area;
        state.player_mut(0).unwrap().position = Some("weird_woods".into());
        state.player_mut(0).unwrap().hp = config.damage_amount;

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::DoAreaAction {
                action: AreaAction::Damage { target_seat: 0, amount: config.damage_amount },
            },
        );
        assert_eq!(
            event_types(&events),
            vec!["PLAYER_DAMAGED", "PLAYER_DIED", "PHASE_CHANGED", "TURN_STARTED"]
        );
        match &events[3].data {
            EventData::TurnStarted { seat, .. } => assert_eq!(*seat, 1),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_skip_still_advances_phase() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.phase = Phase::Area;
        state.player_mut(0).unwrap().position = Some("church".into());

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(
            &state,
            &mut rng,
            &ctx(&content, &config),
            &Command::DoAreaAction { action: AreaAction::Skip },
        );
        assert_eq!(event_types(&events), vec!["PHASE_CHANGED"]);
    }

    #[test]
    fn test_end_turn_skips_dead_seats() {
        let content = Content::standard();
        let config = GameConfig::default();
        let mut state = started_state(&content);
        state.phase = Phase::End;
        state.player_mut(1).unwrap().alive = false;

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(&state, &mut rng, &ctx(&content, &config), &Command::EndTurn);
        match &events[0].data {
            EventData::TurnStarted { seat, round, phase } => {
                assert_eq!(*seat, 2);
                assert_eq!(*round, state.round + 1);
                assert_eq!(*phase, Phase::Move);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_reveal_carries_character_identity() {
        let content = Content::standard();
        let config = GameConfig::default();
        let state = started_state(&content);

        let mut rng = DeterministicRng::for_command("S1", 0);
        let events = reduce(&state, &mut rng, &ctx(&content, &config), &Command::RevealIdentity);
        match &events[0].data {
            EventData::PlayerRevealed { seat, character_name, faction } => {
                assert_eq!(*seat, 0);
                assert_eq!(character_name, "The Warden");
                assert_eq!(*faction, crate::game::content::Faction::Hunter);
            }
            _ => unreachable!(),
        }
    }
}
