/*!
A running game driven by player actions and a periodic tick.

A [`Session`] moves a [`Game`] into an actor task. Player dispatches and
scheduler ticks travel through the same queue, so actions are applied one at
a time in arrival order and a tick can never interleave with a half-applied
player action. Every state change is published as a [`Snapshot`].

# Examples

```
use std::time::Duration;
use chain_tycoon::prelude::*;

# #[tokio::main(flavor = "current_thread")]
# async fn main() -> Result<(), SessionError> {
let game = Game::builder().seed(1).build().unwrap();
let session = Session::start(game, Duration::from_secs(4))?;

let outcome = session.dispatch(Action::Build(NodeKind::Dapp)).await?;
assert!(outcome.is_applied());
assert_eq!(session.snapshot().state.nodes.len(), 3);

let game = session.shutdown().await?;
assert_eq!(game.state().nodes.len(), 3);
# Ok(())
# }
```
*/

mod scheduler;

pub use scheduler::{TickScheduler, DEFAULT_TICK_PERIOD};

use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::{JoinError, JoinHandle},
};
use tracing::{debug, info};

use crate::{
    action::{Action, Outcome},
    game::{Game, Snapshot},
};

/// Capacity of the action queue shared by players and the scheduler.
const QUEUE_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("the session is no longer running")]
    Closed,
    #[error("tick interval must be greater than 0")]
    ZeroTickInterval,
    #[error("session task failed")]
    Join(#[from] JoinError),
}

#[derive(Debug)]
struct Command {
    action: Action,
    /// `None` for ticks, which nobody waits on.
    reply: Option<oneshot::Sender<Outcome>>,
}

/// Handle to a game running in the background.
#[derive(Debug)]
pub struct Session {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    scheduler: Option<TickScheduler>,
    actor: JoinHandle<Game>,
}

impl Session {
    /// Starts `game` with a tick every `period`. Must be called from within
    /// a Tokio runtime.
    pub fn start(game: Game, period: Duration) -> Result<Self, SessionError> {
        let mut session = Self::without_ticks(game);
        let scheduler = TickScheduler::start(period, session.commands.clone(), || {
            Command {
                action: Action::Tick,
                reply: None,
            }
        })?;
        session.scheduler = Some(scheduler);

        Ok(session)
    }

    /// Starts `game` without a scheduler. Time only passes through explicit
    /// [`Action::Tick`] dispatches.
    pub fn without_ticks(game: Game) -> Self {
        let (commands, queue) = mpsc::channel(QUEUE_CAPACITY);
        let (publish, snapshots) = watch::channel(game.snapshot());
        let actor = tokio::spawn(run(game, queue, publish));

        info!("session started");

        Session {
            commands,
            snapshots,
            scheduler: None,
            actor,
        }
    }

    /// Queues `action` and waits until it has been applied.
    pub async fn dispatch(&self, action: Action) -> Result<Outcome, SessionError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command {
                action,
                reply: Some(reply),
            })
            .await
            .map_err(|_| SessionError::Closed)?;

        outcome.await.map_err(|_| SessionError::Closed)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Returns a receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Stops the scheduler, applies every action still queued and hands the
    /// game back.
    pub async fn shutdown(self) -> Result<Game, SessionError> {
        let Session {
            commands,
            scheduler,
            actor,
            ..
        } = self;

        let ticks = match scheduler {
            Some(scheduler) => scheduler.stop().await?,
            None => 0,
        };
        // The actor finishes once the last sender is gone.
        drop(commands);
        let game = actor.await?;

        info!(ticks, cycle = game.state().cycle, "session stopped");

        Ok(game)
    }
}

async fn run(
    mut game: Game,
    mut queue: mpsc::Receiver<Command>,
    publish: watch::Sender<Snapshot>,
) -> Game {
    while let Some(Command { action, reply }) = queue.recv().await {
        let outcome = game.dispatch(action);
        if outcome != Outcome::Ignored {
            publish.send_replace(game.snapshot());
        }

        if let Some(reply) = reply {
            if reply.send(outcome).is_err() {
                debug!(?action, "dispatcher went away before the reply");
            }
        }
    }

    game
}
