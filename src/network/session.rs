//! Match Session Management
//!
//! Owns the lifecycle of matches from lobby to completion and runs the
//! full command pipeline against each one: issuer check, validate,
//! reduce, apply, win evaluation. Transport is external; this layer
//! speaks commands in and events/views out.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::rng::DeterministicRng;
use crate::game::apply::apply_all;
use crate::game::command::Command;
use crate::game::content::{Content, GameConfig};
use crate::game::events::{EventData, GameEvent};
use crate::game::reducer::{reduce, ReducerCtx};
use crate::game::setup::{start_match, SetupError};
use crate::game::state::{MatchState, MatchStatus, Seat};
use crate::game::view::{project, ClientView};
use crate::game::win::evaluate;

/// Session-level failures (everything in-game is an error *event* instead).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown match")]
    MatchNotFound,
    #[error("user is not seated in this match")]
    NotInMatch,
    #[error("match is full")]
    MatchFull,
    #[error("match is no longer accepting players")]
    NotInLobby,
    #[error("need at least {need} players, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },
    #[error("match has already started")]
    AlreadyStarted,
}

impl From<SetupError> for SessionError {
    fn from(err: SetupError) -> Self {
        match err {
            SetupError::NotInLobby => SessionError::AlreadyStarted,
            SetupError::NotEnoughPlayers { have, need } => {
                SessionError::NotEnoughPlayers { have, need }
            }
            SetupError::NoDistribution { players } => {
                SessionError::NotEnoughPlayers { have: players, need: 0 }
            }
            SetupError::RosterTooSmall { players } => {
                SessionError::NotEnoughPlayers { have: players, need: 0 }
            }
        }
    }
}

/// Result of joining: the seat taken and the (possibly generated) user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinResult {
    pub seat: Seat,
    pub user_id: String,
    pub reconnected: bool,
}

/// One live match: authoritative state plus shared content tables.
pub struct MatchSession {
    state: MatchState,
    content: Arc<Content>,
    config: GameConfig,
}

impl MatchSession {
    /// Create a match in the lobby. Seat 0 belongs to the creator.
    pub fn create(
        content: Arc<Content>,
        config: GameConfig,
        creator_name: String,
        creator_user_id: Option<String>,
        now_ms: i64,
    ) -> (Self, JoinResult) {
        let raw = Uuid::new_v4();
        let match_id = short_code(&raw);
        // The seed is the full uuid; the code is just a shareable handle.
        let mut state = MatchState::new(match_id.clone(), raw.to_string(), now_ms);

        let user_id = creator_user_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let seat = state.add_player(user_id.clone(), creator_name);
        info!(match_id = %match_id, "match created");

        let mut session = Self { state, content, config };
        session.record(GameEvent::new(now_ms, EventData::PlayerJoined {
            seat,
            display_name: session.state.player(seat).map(|p| p.display_name.clone()).unwrap_or_default(),
        }));

        (session, JoinResult { seat, user_id, reconnected: false })
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Seat a player, or reconnect a known user after the match started.
    pub fn join(
        &mut self,
        display_name: String,
        user_id: Option<String>,
        now_ms: i64,
    ) -> Result<JoinResult, SessionError> {
        // Reconnection path: a known user id re-enters at any lifecycle stage.
        if let Some(id) = user_id.as_deref() {
            if let Some(player) = self.state.player_by_user(id) {
                let seat = player.seat;
                self.record(GameEvent::new(now_ms, EventData::PlayerJoined {
                    seat,
                    display_name: player.display_name.clone(),
                }));
                debug!(match_id = %self.state.id, seat, "player reconnected");
                return Ok(JoinResult { seat, user_id: id.to_string(), reconnected: true });
            }
        }

        if self.state.status != MatchStatus::Lobby {
            return Err(SessionError::NotInLobby);
        }
        if self.state.players.len() >= self.config.max_players {
            return Err(SessionError::MatchFull);
        }

        let user_id = user_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let seat = self.state.add_player(user_id.clone(), display_name.clone());
        self.record(GameEvent::new(now_ms, EventData::PlayerJoined { seat, display_name }));
        debug!(match_id = %self.state.id, seat, "player joined");

        Ok(JoinResult { seat, user_id, reconnected: false })
    }

    /// Mark a player as disconnected. Their seat and role survive for a
    /// later reconnect.
    pub fn disconnect(&mut self, user_id: &str, now_ms: i64) -> Result<(), SessionError> {
        let seat = self
            .state
            .player_by_user(user_id)
            .map(|p| p.seat)
            .ok_or(SessionError::NotInMatch)?;
        self.record(GameEvent::new(now_ms, EventData::PlayerLeft { seat }));
        Ok(())
    }

    /// Lobby -> active. Any seated player may start.
    pub fn start(&mut self, user_id: &str, now_ms: i64) -> Result<Vec<GameEvent>, SessionError> {
        if self.state.player_by_user(user_id).is_none() {
            return Err(SessionError::NotInMatch);
        }
        let events = start_match(&mut self.state, &self.content, &self.config, now_ms)?;
        apply_all(&mut self.state, &self.content, &events);
        Ok(events)
    }

    /// Run one game command through the full pipeline.
    ///
    /// Illegal commands come back as a single applied error event, never
    /// as an `Err`; `Err` is reserved for users with no seat here.
    pub fn handle_command(
        &mut self,
        user_id: &str,
        command: &Command,
        now_ms: i64,
    ) -> Result<Vec<GameEvent>, SessionError> {
        let seat = self
            .state
            .player_by_user(user_id)
            .map(|p| p.seat)
            .ok_or(SessionError::NotInMatch)?;

        debug!(
            match_id = %self.state.id,
            seat,
            command = command.kind(),
            counter = self.state.events_applied,
            "command received"
        );

        // Only the active seat may act; join/start arrive via their own
        // entry points.
        if matches!(command, Command::JoinMatch { .. } | Command::StartGame { .. }) {
            let event = GameEvent::error(now_ms, "UNSUPPORTED_COMMAND", "use the lobby endpoints");
            self.record(event.clone());
            return Ok(vec![event]);
        }
        if self.state.status == MatchStatus::Active && self.state.active_seat != Some(seat) {
            let event = GameEvent::error(now_ms, "NOT_YOUR_TURN", "another player is acting");
            self.record(event.clone());
            return Ok(vec![event]);
        }

        // Derive this command's randomness from the seed and the event
        // counter as it stood when the command arrived.
        let mut rng = DeterministicRng::for_command(&self.state.seed, self.state.events_applied);
        let ctx = ReducerCtx { content: &self.content, config: &self.config, now_ms };
        let mut events = reduce(&self.state, &mut rng, &ctx, command);
        apply_all(&mut self.state, &self.content, &events);

        // Win evaluation runs after every command that touched an active
        // match.
        if self.state.status == MatchStatus::Active && !self.state.has_winner() {
            if let Some(result) = evaluate(&self.state, &self.content) {
                info!(
                    match_id = %self.state.id,
                    winners = ?result.winners,
                    faction = ?result.winning_faction,
                    "match ended"
                );
                let ended = GameEvent::new(now_ms, EventData::GameEnded {
                    winners: result.winners,
                    winning_faction: result.winning_faction,
                    reason: result.reason,
                });
                self.record(ended.clone());
                events.push(ended);
            }
        }

        Ok(events)
    }

    /// Project the match for one user (or a spectator).
    pub fn view_for(&self, user_id: Option<&str>) -> ClientView {
        let seat = user_id
            .and_then(|id| self.state.player_by_user(id))
            .map(|p| p.seat);
        project(&self.state, &self.content, &self.config, seat)
    }

    fn record(&mut self, event: GameEvent) {
        apply_all(&mut self.state, &self.content, std::slice::from_ref(&event));
    }
}

/// All live matches, keyed by shareable code.
pub struct SessionManager {
    matches: BTreeMap<String, MatchSession>,
    content: Arc<Content>,
    config: GameConfig,
}

impl SessionManager {
    pub fn new(content: Content, config: GameConfig) -> Self {
        Self {
            matches: BTreeMap::new(),
            content: Arc::new(content),
            config,
        }
    }

    /// Create a match; returns its code and the creator's seating.
    pub fn create_match(
        &mut self,
        creator_name: String,
        creator_user_id: Option<String>,
        now_ms: i64,
    ) -> (String, JoinResult) {
        let (session, joined) = MatchSession::create(
            Arc::clone(&self.content),
            self.config.clone(),
            creator_name,
            creator_user_id,
            now_ms,
        );
        let match_id = session.state().id.clone();
        self.matches.insert(match_id.clone(), session);
        (match_id, joined)
    }

    pub fn join(
        &mut self,
        match_id: &str,
        display_name: String,
        user_id: Option<String>,
        now_ms: i64,
    ) -> Result<JoinResult, SessionError> {
        self.session_mut(match_id)?.join(display_name, user_id, now_ms)
    }

    pub fn start(
        &mut self,
        match_id: &str,
        user_id: &str,
        now_ms: i64,
    ) -> Result<Vec<GameEvent>, SessionError> {
        self.session_mut(match_id)?.start(user_id, now_ms)
    }

    pub fn handle_command(
        &mut self,
        match_id: &str,
        user_id: &str,
        command: &Command,
        now_ms: i64,
    ) -> Result<Vec<GameEvent>, SessionError> {
        self.session_mut(match_id)?.handle_command(user_id, command, now_ms)
    }

    pub fn view_for(
        &self,
        match_id: &str,
        user_id: Option<&str>,
    ) -> Result<ClientView, SessionError> {
        Ok(self.session(match_id)?.view_for(user_id))
    }

    pub fn session(&self, match_id: &str) -> Result<&MatchSession, SessionError> {
        self.matches.get(match_id).ok_or(SessionError::MatchNotFound)
    }

    pub fn session_mut(&mut self, match_id: &str) -> Result<&mut MatchSession, SessionError> {
        self.matches.get_mut(match_id).ok_or(SessionError::MatchNotFound)
    }

    /// Drop an ended match from the store.
    pub fn remove(&mut self, match_id: &str) -> Option<MatchSession> {
        self.matches.remove(match_id)
    }
}

/// Four-letter shareable match code derived from a uuid.
fn short_code(id: &Uuid) -> String {
    id.as_bytes()
        .iter()
        .take(4)
        .map(|b| char::from(b'A' + b % 26))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Phase;
    use crate::game::view::LegalAction;

    fn manager() -> SessionManager {
        SessionManager::new(Content::standard(), GameConfig::default())
    }

    fn full_lobby(mgr: &mut SessionManager) -> (String, Vec<String>) {
        let (match_id, creator) = mgr.create_match("P0".into(), None, 0);
        let mut users = vec![creator.user_id];
        for i in 1..4 {
            let joined = mgr.join(&match_id, format!("P{i}"), None, 0).unwrap();
            users.push(joined.user_id);
        }
        (match_id, users)
    }

    #[test]
    fn test_create_seats_the_creator_at_zero() {
        let mut mgr = manager();
        let (match_id, joined) = mgr.create_match("Ada".into(), None, 0);
        assert_eq!(joined.seat, 0);
        assert_eq!(match_id.len(), 4);
        assert!(match_id.chars().all(|c| c.is_ascii_uppercase()));

        let view = mgr.view_for(&match_id, Some(&joined.user_id)).unwrap();
        assert_eq!(view.status, MatchStatus::Lobby);
        assert_eq!(view.viewer_seat, Some(0));
    }

    #[test]
    fn test_join_caps_at_max_players() {
        let mut mgr = manager();
        let (match_id, _) = mgr.create_match("P0".into(), None, 0);
        for i in 1..8 {
            mgr.join(&match_id, format!("P{i}"), None, 0).unwrap();
        }
        assert_eq!(
            mgr.join(&match_id, "P8".into(), None, 0),
            Err(SessionError::MatchFull)
        );
    }

    #[test]
    fn test_unknown_match_is_reported() {
        let mut mgr = manager();
        assert_eq!(
            mgr.join("ZZZZ", "Ada".into(), None, 0),
            Err(SessionError::MatchNotFound)
        );
    }

    #[test]
    fn test_start_requires_enough_players() {
        let mut mgr = manager();
        let (match_id, creator) = mgr.create_match("P0".into(), None, 0);
        mgr.join(&match_id, "P1".into(), None, 0).unwrap();

        assert_eq!(
            mgr.start(&match_id, &creator.user_id, 0),
            Err(SessionError::NotEnoughPlayers { have: 2, need: 4 })
        );
    }

    #[test]
    fn test_start_then_no_new_joins() {
        let mut mgr = manager();
        let (match_id, users) = full_lobby(&mut mgr);
        mgr.start(&match_id, &users[0], 0).unwrap();

        assert_eq!(
            mgr.join(&match_id, "late".into(), None, 0),
            Err(SessionError::NotInLobby)
        );
        assert_eq!(
            mgr.start(&match_id, &users[0], 0),
            Err(SessionError::AlreadyStarted)
        );
    }

    #[test]
    fn test_reconnect_after_start_keeps_seat() {
        let mut mgr = manager();
        let (match_id, users) = full_lobby(&mut mgr);
        mgr.start(&match_id, &users[0], 0).unwrap();

        let session = mgr.session_mut(&match_id).unwrap();
        session.disconnect(&users[2], 1).unwrap();
        assert!(!session.state().player(2).unwrap().connected);

        let joined = session.join("P2".into(), Some(users[2].clone()), 2).unwrap();
        assert!(joined.reconnected);
        assert_eq!(joined.seat, 2);
        assert!(session.state().player(2).unwrap().connected);
    }

    #[test]
    fn test_off_turn_command_yields_not_your_turn() {
        let mut mgr = manager();
        let (match_id, users) = full_lobby(&mut mgr);
        mgr.start(&match_id, &users[0], 0).unwrap();

        let active = mgr.session(&match_id).unwrap().state().active_seat.unwrap();
        let bystander = (0..4).find(|&s| s != active).unwrap() as usize;

        let events = mgr
            .handle_command(&match_id, &users[bystander], &Command::RollAndMove, 1)
            .unwrap();
        assert_eq!(events.len(), 1);
        match &events[0].data {
            EventData::Error { code, .. } => assert_eq!(code, "NOT_YOUR_TURN"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_stranger_cannot_command() {
        let mut mgr = manager();
        let (match_id, users) = full_lobby(&mut mgr);
        mgr.start(&match_id, &users[0], 0).unwrap();

        assert_eq!(
            mgr.handle_command(&match_id, "nobody", &Command::RollAndMove, 1),
            Err(SessionError::NotInMatch)
        );
    }

    #[test]
    fn test_turn_plays_through_the_pipeline() {
        let mut mgr = manager();
        let (match_id, users) = full_lobby(&mut mgr);
        mgr.start(&match_id, &users[0], 0).unwrap();

        // Drive the active player through one full turn using only the
        // actions the projector offers.
        for _ in 0..16 {
            let (active, user) = {
                let state = mgr.session(&match_id).unwrap().state();
                let active = state.active_seat.unwrap();
                (active, users[active as usize].clone())
            };
            let view = mgr.view_for(&match_id, Some(&user)).unwrap();
            let action = view
                .legal_actions
                .iter()
                .find(|a| !matches!(a, LegalAction::RevealIdentity))
                .cloned()
                .expect("active player always has a non-reveal action");
            let events = mgr
                .handle_command(&match_id, &user, &action.to_command(), 1)
                .unwrap();
            assert!(events.iter().all(|e| !e.is_error()), "projected action failed");

            let state = mgr.session(&match_id).unwrap().state();
            if state.active_seat != Some(active) {
                // Turn handed over: round advanced, phase reset.
                assert_eq!(state.phase, Phase::Move);
                assert_eq!(state.round, 2);
                return;
            }
        }
        panic!("turn never ended");
    }

    #[test]
    fn test_commands_rejected_after_game_end() {
        let mut mgr = manager();
        let (match_id, users) = full_lobby(&mut mgr);
        mgr.start(&match_id, &users[0], 0).unwrap();

        // Force a finished match, then submit on-turn.
        let active;
        {
            let session = mgr.session_mut(&match_id).unwrap();
            active = session.state.active_seat.unwrap();
            session.state.winners = Some(vec![0]);
            session.state.status = MatchStatus::Ended;
        }
        let events = mgr
            .handle_command(&match_id, &users[active as usize], &Command::RollAndMove, 2)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_error());
    }
}
