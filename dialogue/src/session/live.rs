//! Live session — a controller shared between callers and its turn clock.
//!
//! Commands and clock ticks take the same lock and hold it for their full
//! duration, store calls included. Whichever gets the lock first commits;
//! the other then sees a newer generation and is discarded.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::command::{Command, Outcome};
use super::controller::DialogueController;
use super::error::DialogueError;
use super::state::SessionState;
use crate::model::MoveSet;

/// A running dialogue with its tick task.
pub struct LiveSession {
    controller: Arc<Mutex<DialogueController>>,
    ticker: JoinHandle<()>,
}

impl LiveSession {
    /// Take ownership of `controller` and start ticking every `tick`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(controller: DialogueController, tick: Duration) -> Self {
        let controller = Arc::new(Mutex::new(controller));
        let ticker = tokio::spawn(run_ticker(Arc::downgrade(&controller), tick));
        Self { controller, ticker }
    }

    /// Apply a command for whoever holds the turn.
    pub async fn apply(&self, command: Command) -> Result<Outcome, DialogueError> {
        self.controller.lock().await.apply(command).await
    }

    /// Apply a command only if no turn change happened since `generation`.
    pub async fn submit(&self, generation: u64, command: Command) -> Result<Outcome, DialogueError> {
        self.controller
            .lock()
            .await
            .apply_at(generation, command)
            .await
    }

    pub async fn snapshot(&self) -> SessionState {
        self.controller.lock().await.state().clone()
    }

    pub async fn allowed_moves(&self) -> MoveSet {
        self.controller.lock().await.allowed_moves()
    }

    pub async fn generation(&self) -> u64 {
        self.controller.lock().await.generation()
    }

    pub async fn time_remaining(&self) -> Option<Duration> {
        self.controller.lock().await.time_remaining()
    }

    pub async fn abandon(&self) -> Option<Outcome> {
        self.controller.lock().await.abandon()
    }

    pub async fn is_ended(&self) -> bool {
        self.controller.lock().await.is_ended()
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

async fn run_ticker(controller: Weak<Mutex<DialogueController>>, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let Some(controller) = controller.upgrade() else {
            break;
        };
        let mut controller = controller.lock().await;
        if controller.is_ended() {
            debug!(session_id = %controller.id(), "Ticker stopping");
            break;
        }
        controller.tick(Instant::now());
    }
}
