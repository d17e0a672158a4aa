//! Actor-based concurrency primitives
//!
//! The collector assumes items are owned by independently scheduled actors.
//! This module provides the small runtime those actors run on.
//!
//! # Architecture
//!
//! - Each actor is a long-lived task with its own event loop
//! - Actors communicate via unbounded `mpsc` mailboxes, so senders never
//!   wait and messages from one handle are handled in send order
//! - State is owned by the actor, never shared
//! - Replies travel as [`Promise`](crate::Promise)s inside messages, so the
//!   actor that receives a request is the one that settles it
//!
//! # Lifecycle
//!
//! An actor loop ends when one of:
//! - its `CancellationToken` is cancelled
//! - every [`ActorHandle`] has been dropped
//!
//! Messages still queued when the loop ends are dropped. A promise inside such
//! a message is never settled, which stalls any collection waiting on it.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub mod handle;
mod roster;

pub use handle::{ActorHandle, SendError};
pub use roster::Roster;

/// A unit of state that processes one message at a time
#[async_trait]
pub trait Actor: Send + 'static {
  type Message: Send + 'static;

  /// Name used in log lines
  fn name(&self) -> &str {
    "actor"
  }

  async fn handle(&mut self, msg: Self::Message);
}

/// Spawn an actor and return a handle to its mailbox
///
pub fn spawn_actor<A: Actor>(actor: A, cancel: CancellationToken) -> ActorHandle<A::Message> {
  let (tx, rx) = mpsc::unbounded_channel();
  tokio::spawn(run(actor, rx, cancel));
  ActorHandle::new(tx)
}

/// Main actor loop
async fn run<A: Actor>(mut actor: A, mut rx: mpsc::UnboundedReceiver<A::Message>, cancel: CancellationToken) {
  debug!(actor = actor.name(), "Actor started");

  loop {
    tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            info!(actor = actor.name(), "Actor shutting down (cancelled)");
            break;
        }

        msg = rx.recv() => {
            match msg {
                Some(msg) => actor.handle(msg).await,
                None => {
                    debug!(actor = actor.name(), "Actor shutting down (all handles dropped)");
                    break;
                }
            }
        }
    }
  }

  debug!(actor = actor.name(), "Actor stopped");
}
