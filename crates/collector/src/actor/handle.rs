//! Actor handles for communicating with actors
//!
//! Handles are cheap to clone and wrap the mailbox sender. Mailboxes are
//! unbounded, so every send is synchronous and lands in the mailbox before the
//! call returns: messages from one handle arrive in the order they were sent.
//! Besides plain sends the handle provides the promise bridge used by fetch
//! capabilities: [`ActorHandle::fetch_into`] packs a promise into a message so
//! the actor can settle it on its own schedule.

use tokio::sync::mpsc;
use tracing::debug;

use crate::promise::Promise;

// ============================================================================
// Errors
// ============================================================================

/// Error when sending to an actor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
  #[error("Actor has shut down")]
  ActorGone,
}

// ============================================================================
// Actor Handle
// ============================================================================

/// Handle to an actor's mailbox
///
/// The handle is cheap to clone and can be shared across tasks. The actor
/// stops once every handle has been dropped.
#[derive(Debug)]
pub struct ActorHandle<M> {
  tx: mpsc::UnboundedSender<M>,
}

impl<M> Clone for ActorHandle<M> {
  fn clone(&self) -> Self {
    Self { tx: self.tx.clone() }
  }
}

impl<M: Send + 'static> ActorHandle<M> {
  /// Create a new handle from a sender
  pub fn new(tx: mpsc::UnboundedSender<M>) -> Self {
    Self { tx }
  }

  /// Queue a message for the actor
  ///
  /// Never waits, so this can be called from synchronous code such as a fetch
  /// capability. Fails only if the actor has stopped.
  pub fn send(&self, msg: M) -> Result<(), SendError> {
    self.tx.send(msg).map_err(|_| SendError::ActorGone)
  }

  /// Deliver `promise` to the actor inside the message built by `make`
  ///
  /// If the actor is gone the promise is rejected with `SendError::ActorGone`
  /// converted into the caller's error type, so a dead actor cannot stall a
  /// collection.
  pub fn fetch_into<T, E, F>(&self, promise: Promise<T, E>, make: F)
  where
    T: Clone + Send + 'static,
    E: Clone + Send + From<SendError> + 'static,
    F: FnOnce(Promise<T, E>) -> M,
  {
    if self.send(make(promise.clone())).is_err() {
      debug!("Actor gone, rejecting promise");
      let _ = promise.reject(E::from(SendError::ActorGone));
    }
  }

  /// Send a request carrying a fresh promise and return that promise
  ///
  /// # Panics
  ///
  /// Panics when called outside a Tokio runtime, like [`Promise::new`].
  pub fn ask<T, E, F>(&self, make: F) -> Promise<T, E>
  where
    T: Clone + Send + 'static,
    E: Clone + Send + From<SendError> + 'static,
    F: FnOnce(Promise<T, E>) -> M,
  {
    let promise = Promise::new();
    self.fetch_into(promise.clone(), make);
    promise
  }

  /// Whether the actor has stopped receiving messages
  pub fn is_closed(&self) -> bool {
    self.tx.is_closed()
  }
}
