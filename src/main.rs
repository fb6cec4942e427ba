//! Umbra Game Server
//!
//! Authoritative engine for a hidden-role deduction game.
//! Runs a scripted demo match and verifies replay determinism.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use umbra::{
    VERSION,
    core::rng::DeterministicRng,
    game::{
        apply::apply_all,
        command::Command,
        content::{Content, GameConfig},
        events::{EventData, GameEvent},
        reducer::{reduce, ReducerCtx},
        setup::start_match,
        state::MatchState,
        view::{legal_actions, LegalAction},
        win::evaluate,
    },
};

const DEMO_SEED: &str = "UMBRA_DEMO";
const DEMO_PLAYERS: usize = 5;
const MAX_COMMANDS: usize = 400;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Umbra Server v{}", VERSION);

    let content = Content::standard();
    let config = GameConfig::default();

    info!("=== Starting Demo Match ===");
    info!("Seed: {}", DEMO_SEED);

    // One stamp for both runs: timestamps are metadata, but the state
    // comparison below includes the lifecycle times.
    let now_ms = Utc::now().timestamp_millis();

    let (final_state, log) = run_match(&content, &config, now_ms, None)?;
    report(&final_state);

    // Replay the recorded command log against a fresh match and check
    // that the same state falls out.
    info!("=== Replaying {} commands ===", log.len());
    let (replayed, _) = run_match(&content, &config, now_ms, Some(&log))?;
    if replayed != final_state {
        bail!("replay diverged from the original run");
    }
    info!("Replay matched the original state exactly");

    Ok(())
}

/// Drive one match to completion (or the command cap).
///
/// With `script` the given commands are replayed verbatim; without it a
/// simple policy picks from the projected legal actions and records what
/// it played.
fn run_match(
    content: &Content,
    config: &GameConfig,
    now_ms: i64,
    script: Option<&[Command]>,
) -> Result<(MatchState, Vec<Command>)> {
    let mut state = MatchState::new("DEMO".into(), DEMO_SEED.into(), now_ms);
    for i in 0..DEMO_PLAYERS {
        state.add_player(format!("user-{i}"), format!("Player {i}"));
    }

    let events = start_match(&mut state, content, config, now_ms)?;
    apply_all(&mut state, content, &events);

    let mut log = Vec::new();
    for step in 0..MAX_COMMANDS {
        if state.has_winner() {
            break;
        }
        let command = match script {
            Some(commands) => match commands.get(step) {
                Some(c) => c.clone(),
                None => break,
            },
            None => {
                let Some(seat) = state.active_seat else { break };
                let Some(command) = pick_action(&state, content, config, seat) else { break };
                command
            }
        };

        let mut rng = DeterministicRng::for_command(&state.seed, state.events_applied);
        let ctx = ReducerCtx { content, config, now_ms };
        let events = reduce(&state, &mut rng, &ctx, &command);
        apply_all(&mut state, content, &events);
        log_highlights(&events);
        log.push(command);

        if !state.has_winner() {
            if let Some(result) = evaluate(&state, content) {
                let ended = GameEvent::new(now_ms, EventData::GameEnded {
                    winners: result.winners,
                    winning_faction: result.winning_faction,
                    reason: result.reason,
                });
                apply_all(&mut state, content, std::slice::from_ref(&ended));
                log_highlights(std::slice::from_ref(&ended));
            }
        }
    }

    Ok((state, log))
}

/// A simple demo policy: attack when possible, otherwise take the first
/// offered action that is not a reveal.
fn pick_action(
    state: &MatchState,
    content: &Content,
    config: &GameConfig,
    seat: u8,
) -> Option<Command> {
    let actions = legal_actions(state, content, config, seat);
    let chosen = actions
        .iter()
        .find(|a| matches!(a, LegalAction::Attack { .. }))
        .or_else(|| actions.iter().find(|a| !matches!(a, LegalAction::RevealIdentity)))?;
    Some(chosen.to_command())
}

fn log_highlights(events: &[GameEvent]) {
    for event in events {
        match &event.data {
            EventData::AttackResolved { attacker, target, damage, killed, .. } => {
                info!("seat {attacker} hit seat {target} for {damage} (killed: {killed})");
            }
            EventData::PlayerDied { seat, .. } => info!("seat {seat} died"),
            EventData::GameEnded { winners, winning_faction, reason } => {
                info!("game over: {reason} (winners {winners:?}, faction {winning_faction:?})");
            }
            _ => {}
        }
    }
}

fn report(state: &MatchState) {
    info!(
        "Final: round {}, {} events applied, {} alive",
        state.round,
        state.events_applied,
        state.alive_count()
    );
    if let Some(winners) = &state.winners {
        info!("Winners: {winners:?} ({:?})", state.winning_faction);
    } else {
        info!("No winner within the demo command budget");
    }
}
