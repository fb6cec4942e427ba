//! Per-Match Worker
//!
//! One sequential task per match. Commands for the same match must be
//! processed strictly one at a time and in receipt order, because the
//! reducer derives its RNG from the applied-event counter; a mailbox
//! actor gives that ordering for free while separate matches run fully
//! in parallel.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::game::command::Command;
use crate::game::events::GameEvent;
use crate::game::view::ClientView;
use crate::network::session::{JoinResult, MatchSession, SessionError};

/// Mailbox depth per match.
const MAILBOX_CAPACITY: usize = 64;

/// One request to a match worker.
enum Envelope {
    Join {
        display_name: String,
        user_id: Option<String>,
        now_ms: i64,
        reply: oneshot::Sender<Result<JoinResult, SessionError>>,
    },
    Start {
        user_id: String,
        now_ms: i64,
        reply: oneshot::Sender<Result<Vec<GameEvent>, SessionError>>,
    },
    Command {
        user_id: String,
        command: Command,
        now_ms: i64,
        reply: oneshot::Sender<Result<Vec<GameEvent>, SessionError>>,
    },
    Disconnect {
        user_id: String,
        now_ms: i64,
    },
    View {
        user_id: Option<String>,
        reply: oneshot::Sender<ClientView>,
    },
}

/// Cheap clonable handle to one match's worker task.
#[derive(Clone)]
pub struct MatchHandle {
    match_id: String,
    tx: mpsc::Sender<Envelope>,
}

/// The worker has shut down (match dropped).
#[derive(Debug, thiserror::Error)]
#[error("match worker is gone")]
pub struct WorkerGone;

impl MatchHandle {
    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub async fn join(
        &self,
        display_name: String,
        user_id: Option<String>,
        now_ms: i64,
    ) -> Result<Result<JoinResult, SessionError>, WorkerGone> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Join { display_name, user_id, now_ms, reply })
            .await
            .map_err(|_| WorkerGone)?;
        rx.await.map_err(|_| WorkerGone)
    }

    pub async fn start(
        &self,
        user_id: String,
        now_ms: i64,
    ) -> Result<Result<Vec<GameEvent>, SessionError>, WorkerGone> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Start { user_id, now_ms, reply })
            .await
            .map_err(|_| WorkerGone)?;
        rx.await.map_err(|_| WorkerGone)
    }

    pub async fn command(
        &self,
        user_id: String,
        command: Command,
        now_ms: i64,
    ) -> Result<Result<Vec<GameEvent>, SessionError>, WorkerGone> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Command { user_id, command, now_ms, reply })
            .await
            .map_err(|_| WorkerGone)?;
        rx.await.map_err(|_| WorkerGone)
    }

    pub async fn disconnect(&self, user_id: String, now_ms: i64) -> Result<(), WorkerGone> {
        self.tx
            .send(Envelope::Disconnect { user_id, now_ms })
            .await
            .map_err(|_| WorkerGone)
    }

    pub async fn view(&self, user_id: Option<String>) -> Result<ClientView, WorkerGone> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::View { user_id, reply })
            .await
            .map_err(|_| WorkerGone)?;
        rx.await.map_err(|_| WorkerGone)
    }
}

/// Spawn the worker task owning `session`; the handle is its only door.
pub fn spawn(session: MatchSession) -> MatchHandle {
    let match_id = session.state().id.clone();
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
    tokio::spawn(run(session, rx));
    MatchHandle { match_id, tx }
}

async fn run(mut session: MatchSession, mut rx: mpsc::Receiver<Envelope>) {
    let match_id = session.state().id.clone();
    debug!(match_id = %match_id, "match worker started");

    while let Some(envelope) = rx.recv().await {
        match envelope {
            Envelope::Join { display_name, user_id, now_ms, reply } => {
                let _ = reply.send(session.join(display_name, user_id, now_ms));
            }
            Envelope::Start { user_id, now_ms, reply } => {
                let _ = reply.send(session.start(&user_id, now_ms));
            }
            Envelope::Command { user_id, command, now_ms, reply } => {
                let _ = reply.send(session.handle_command(&user_id, &command, now_ms));
            }
            Envelope::Disconnect { user_id, now_ms } => {
                if let Err(err) = session.disconnect(&user_id, now_ms) {
                    warn!(match_id = %match_id, %err, "disconnect for unknown user");
                }
            }
            Envelope::View { user_id, reply } => {
                let _ = reply.send(session.view_for(user_id.as_deref()));
            }
        }
    }

    debug!(match_id = %match_id, "match worker stopped");
}

// =============================================================================
// TESTS
// =============================================================================
