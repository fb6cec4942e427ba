//! Command Validator
//!
//! Pure legality check against the current state-machine position.
//! Never mutates state; every rejection carries a stable code. The
//! reducer re-runs this before emitting anything (defense in depth).

use thiserror::Error;

use crate::game::command::{AreaAction, Command};
use crate::game::content::{AreaEffect, Content, GameConfig};
use crate::game::state::{MatchState, MatchStatus, Phase, PlayerState, Seat};

/// Why a command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("game is not active")]
    MatchNotActive,
    #[error("game has ended")]
    GameOver,
    #[error("no active player")]
    NoActivePlayer,
    #[error("active player is dead")]
    ActivePlayerDead,
    #[error("command is not valid for a running match")]
    UnsupportedCommand,
    #[error("not in move phase")]
    NotMovePhase,
    #[error("must choose an area first")]
    AreaChoicePending,
    #[error("no area choice is pending")]
    NoAreaChoicePending,
    #[error("unknown area")]
    UnknownArea,
    #[error("must choose a different area")]
    SameArea,
    #[error("not in area action phase")]
    NotAreaPhase,
    #[error("this area does not offer that action")]
    ActionNotOffered,
    #[error("invalid target player")]
    InvalidTarget,
    #[error("cannot target yourself")]
    SelfTarget,
    #[error("target is out of range")]
    OutOfRange,
    #[error("target does not hold that equipment")]
    NoSuchEquipment,
    #[error("amount does not match the area rules")]
    WrongAmount,
    #[error("not in attack phase")]
    NotAttackPhase,
    #[error("cannot end turn before completing the move phase")]
    TurnNotEndable,
    #[error("identity already revealed")]
    AlreadyRevealed,
    #[error("no hermit card to resolve")]
    NoHermitPending,
    #[error("that is not the delivered hermit card")]
    WrongHermitCard,
    #[error("internal invariant violation")]
    Internal,
}

impl CommandError {
    /// Stable machine-readable code for the error-event channel.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::MatchNotActive => "MATCH_NOT_ACTIVE",
            CommandError::GameOver => "GAME_OVER",
            CommandError::NoActivePlayer => "NO_ACTIVE_PLAYER",
            CommandError::ActivePlayerDead => "ACTIVE_PLAYER_DEAD",
            CommandError::UnsupportedCommand => "UNSUPPORTED_COMMAND",
            CommandError::NotMovePhase => "NOT_MOVE_PHASE",
            CommandError::AreaChoicePending => "AREA_CHOICE_PENDING",
            CommandError::NoAreaChoicePending => "NO_AREA_CHOICE_PENDING",
            CommandError::UnknownArea => "UNKNOWN_AREA",
            CommandError::SameArea => "SAME_AREA",
            CommandError::NotAreaPhase => "NOT_AREA_PHASE",
            CommandError::ActionNotOffered => "ACTION_NOT_OFFERED",
            CommandError::InvalidTarget => "INVALID_TARGET",
            CommandError::SelfTarget => "SELF_TARGET",
            CommandError::OutOfRange => "OUT_OF_RANGE",
            CommandError::NoSuchEquipment => "NO_SUCH_EQUIPMENT",
            CommandError::WrongAmount => "WRONG_AMOUNT",
            CommandError::NotAttackPhase => "NOT_ATTACK_PHASE",
            CommandError::TurnNotEndable => "TURN_NOT_ENDABLE",
            CommandError::AlreadyRevealed => "ALREADY_REVEALED",
            CommandError::NoHermitPending => "NO_HERMIT_PENDING",
            CommandError::WrongHermitCard => "WRONG_HERMIT_CARD",
            CommandError::Internal => "INTERNAL",
        }
    }
}

/// Check a command against the current state-machine position.
pub fn validate(
    state: &MatchState,
    content: &Content,
    config: &GameConfig,
    command: &Command,
) -> Result<(), CommandError> {
    // Lobby-only commands first; everything else needs an active match.
    if state.status != MatchStatus::Active {
        return match command {
            Command::JoinMatch { .. } | Command::StartGame { .. }
                if state.status == MatchStatus::Lobby =>
            {
                Ok(())
            }
            _ => Err(CommandError::MatchNotActive),
        };
    }
    if matches!(command, Command::JoinMatch { .. } | Command::StartGame { .. }) {
        return Err(CommandError::UnsupportedCommand);
    }

    if state.has_winner() {
        return Err(CommandError::GameOver);
    }

    let active_seat = state.active_seat.ok_or(CommandError::NoActivePlayer)?;
    let active = state
        .player(active_seat)
        .ok_or(CommandError::NoActivePlayer)?;
    if !active.alive {
        return Err(CommandError::ActivePlayerDead);
    }

    match command {
        Command::RollAndMove => validate_roll_and_move(state),
        Command::ChooseArea { area_id } => validate_choose_area(state, content, active, area_id),
        Command::DoAreaAction { action } => {
            validate_area_action(state, content, config, active, action)
        }
        Command::Attack { target_seat } => validate_attack(state, active, *target_seat),
        Command::EndTurn => validate_end_turn(state),
        Command::RevealIdentity => validate_reveal(active),
        Command::ResolveHermit { card_id, .. } => {
            validate_resolve_hermit(state, active_seat, card_id)
        }
        Command::JoinMatch { .. } | Command::StartGame { .. } => {
            Err(CommandError::UnsupportedCommand)
        }
    }
}

fn validate_roll_and_move(state: &MatchState) -> Result<(), CommandError> {
    if state.phase != Phase::Move {
        return Err(CommandError::NotMovePhase);
    }
    if state.pending_area_choice {
        return Err(CommandError::AreaChoicePending);
    }
    Ok(())
}

fn validate_choose_area(
    state: &MatchState,
    content: &Content,
    active: &PlayerState,
    area_id: &str,
) -> Result<(), CommandError> {
    if state.phase != Phase::Move {
        return Err(CommandError::NotMovePhase);
    }
    if !state.pending_area_choice {
        return Err(CommandError::NoAreaChoicePending);
    }
    if content.area(area_id).is_none() {
        return Err(CommandError::UnknownArea);
    }
    if active.position.as_deref() == Some(area_id) {
        return Err(CommandError::SameArea);
    }
    Ok(())
}

fn validate_area_action(
    state: &MatchState,
    content: &Content,
    config: &GameConfig,
    active: &PlayerState,
    action: &AreaAction,
) -> Result<(), CommandError> {
    if state.phase != Phase::Area {
        return Err(CommandError::NotAreaPhase);
    }

    // Skip is universal, even standing nowhere useful.
    if matches!(action, AreaAction::Skip) {
        return Ok(());
    }

    let area = active
        .position
        .as_deref()
        .and_then(|pos| content.area(pos))
        .ok_or(CommandError::ActionNotOffered)?;
    let offers = |effect: AreaEffect| area.effects.contains(&effect);

    match action {
        AreaAction::DrawWhite => {
            if !offers(AreaEffect::DrawWhite) {
                return Err(CommandError::ActionNotOffered);
            }
            Ok(())
        }
        AreaAction::DrawBlack => {
            if !offers(AreaEffect::DrawBlack) {
                return Err(CommandError::ActionNotOffered);
            }
            Ok(())
        }
        AreaAction::DrawHermit { target_seat } => {
            if !offers(AreaEffect::DrawHermit) {
                return Err(CommandError::ActionNotOffered);
            }
            living_target(state, *target_seat)?;
            Ok(())
        }
        AreaAction::Heal { target_seat, amount } => {
            if !offers(AreaEffect::HealOrDamage) {
                return Err(CommandError::ActionNotOffered);
            }
            living_target(state, *target_seat)?;
            if *amount != config.heal_amount {
                return Err(CommandError::WrongAmount);
            }
            Ok(())
        }
        AreaAction::Damage { target_seat, amount } => {
            if !offers(AreaEffect::HealOrDamage) {
                return Err(CommandError::ActionNotOffered);
            }
            living_target(state, *target_seat)?;
            if *amount != config.damage_amount {
                return Err(CommandError::WrongAmount);
            }
            Ok(())
        }
        AreaAction::StealEquipment { target_seat, equipment_id } => {
            if !offers(AreaEffect::StealEquipment) {
                return Err(CommandError::ActionNotOffered);
            }
            let target = living_target(state, *target_seat)?;
            if target.seat == active.seat {
                return Err(CommandError::SelfTarget);
            }
            if !state.in_range(active, target) {
                return Err(CommandError::OutOfRange);
            }
            if !target.equipment.iter().any(|e| e == equipment_id) {
                return Err(CommandError::NoSuchEquipment);
            }
            Ok(())
        }
        AreaAction::Skip => Ok(()),
    }
}

fn validate_attack(
    state: &MatchState,
    active: &PlayerState,
    target_seat: Seat,
) -> Result<(), CommandError> {
    if state.phase != Phase::Attack {
        return Err(CommandError::NotAttackPhase);
    }
    let target = living_target(state, target_seat)?;
    if target.seat == active.seat {
        return Err(CommandError::SelfTarget);
    }
    if !state.in_range(active, target) {
        return Err(CommandError::OutOfRange);
    }
    Ok(())
}

fn validate_end_turn(state: &MatchState) -> Result<(), CommandError> {
    // Turn ends only after the move and area steps are behind us. This
    // also keeps the validator in lockstep with the projected actions.
    match state.phase {
        Phase::Attack | Phase::End => Ok(()),
        Phase::Move | Phase::Area => Err(CommandError::TurnNotEndable),
    }
}

fn validate_reveal(active: &PlayerState) -> Result<(), CommandError> {
    if active.revealed {
        return Err(CommandError::AlreadyRevealed);
    }
    Ok(())
}

fn validate_resolve_hermit(
    state: &MatchState,
    active_seat: Seat,
    card_id: &str,
) -> Result<(), CommandError> {
    let delivery = state
        .hermit_delivery
        .as_ref()
        .filter(|d| d.to == active_seat)
        .ok_or(CommandError::NoHermitPending)?;
    if delivery.card_id != card_id {
        return Err(CommandError::WrongHermitCard);
    }
    Ok(())
}

fn living_target(state: &MatchState, seat: Seat) -> Result<&PlayerState, CommandError> {
    state
        .player(seat)
        .filter(|p| p.alive)
        .ok_or(CommandError::InvalidTarget)
}

// =============================================================================
// TESTS
// =============================================================================
