//! Single-assignment promise with callback subscription
//!
//! A [`Promise`] starts pending and is settled exactly once with either a
//! value or an error. Any number of parties may subscribe continuations; each
//! runs once with a clone of the outcome.
//!
//! # Dispatch
//!
//! Continuations never run on the caller's stack. Settling or subscribing
//! only queues work; a drain task spawned on the promise's runtime runs the
//! queue in subscription order. At most one drain task exists per promise at
//! a time, which is what keeps late subscribers behind earlier ones.
//!
//! # Double settlement
//!
//! The second and later calls to [`Promise::settle`] never change the stored
//! outcome and never re-run continuations. Whether the caller hears about it
//! is decided by the promise's [`SettlePolicy`].

use std::{
  collections::VecDeque,
  fmt,
  future::Future,
  panic::{AssertUnwindSafe, catch_unwind},
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use collector_core::SettlePolicy;
use tokio::{runtime::Handle, sync::oneshot};
use tracing::{error, trace, warn};

/// A queued callback waiting for the promise outcome
pub type Continuation<T, E> = Box<dyn FnOnce(Result<T, E>) + Send + 'static>;

// ============================================================================
// Errors
// ============================================================================

/// Errors reported by promise operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromiseError {
  #[error("Promise has already been settled")]
  AlreadySettled,
  #[error("Promise was dropped before it settled")]
  Abandoned,
}

// ============================================================================
// State
// ============================================================================

enum State<T, E> {
  Pending {
    waiting: Vec<Continuation<T, E>>,
  },
  Settled {
    outcome: Result<T, E>,
    queue: VecDeque<Continuation<T, E>>,
    draining: bool,
  },
}

struct Inner<T, E> {
  state: Mutex<State<T, E>>,
  policy: SettlePolicy,
  runtime: Handle,
}

impl<T, E> Inner<T, E> {
  /// Internal state is always left consistent, so a poisoned lock is safe to reuse
  fn lock(&self) -> MutexGuard<'_, State<T, E>> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<T, E> Inner<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  /// Run queued continuations until the queue is empty
  fn drain(&self) {
    loop {
      let (continuation, outcome) = {
        let mut state = self.lock();
        let State::Settled {
          outcome,
          queue,
          draining,
        } = &mut *state
        else {
          return;
        };

        match queue.pop_front() {
          Some(continuation) => (continuation, outcome.clone()),
          None => {
            *draining = false;
            return;
          }
        }
      };

      // A panicking continuation must not strand the ones queued behind it
      if catch_unwind(AssertUnwindSafe(|| continuation(outcome))).is_err() {
        error!("Promise continuation panicked");
      }
    }
  }
}

// ============================================================================
// Promise
// ============================================================================

/// A single-assignment value shared between one settler and many subscribers
///
/// Cloning is cheap and every clone refers to the same promise. The clone
/// handed to a fetch capability is the write side by convention; all clones
/// can subscribe.
pub struct Promise<T, E> {
  inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<T, E> fmt::Debug for Promise<T, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = match &*self.inner.lock() {
      State::Pending { .. } => "pending",
      State::Settled { outcome: Ok(_), .. } => "fulfilled",
      State::Settled { outcome: Err(_), .. } => "rejected",
    };
    f.debug_struct("Promise")
      .field("state", &state)
      .field("policy", &self.inner.policy)
      .finish()
  }
}

impl<T, E> Promise<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  /// Create a pending promise on the current Tokio runtime
  ///
  /// # Panics
  ///
  /// Panics when called outside a Tokio runtime, like `tokio::spawn`.
  pub fn new() -> Self {
    Self::with_policy(SettlePolicy::default())
  }

  /// Create a pending promise with an explicit double-settlement policy
  ///
  /// # Panics
  ///
  /// Panics when called outside a Tokio runtime, like `tokio::spawn`.
  pub fn with_policy(policy: SettlePolicy) -> Self {
    Self::new_in(Handle::current(), policy)
  }

  /// Create a pending promise whose continuations run on `runtime`
  pub fn new_in(runtime: Handle, policy: SettlePolicy) -> Self {
    Self {
      inner: Arc::new(Inner {
        state: Mutex::new(State::Pending { waiting: Vec::new() }),
        policy,
        runtime,
      }),
    }
  }

  /// Settle with a value
  pub fn fulfill(&self, value: T) -> Result<(), PromiseError> {
    self.settle(Ok(value))
  }

  /// Settle with an error
  pub fn reject(&self, error: E) -> Result<(), PromiseError> {
    self.settle(Err(error))
  }

  /// Transition out of the pending state
  ///
  /// Only the first call has any effect. Later calls return `Ok(())` under
  /// [`SettlePolicy::Ignore`] and [`PromiseError::AlreadySettled`] under
  /// [`SettlePolicy::Strict`].
  pub fn settle(&self, outcome: Result<T, E>) -> Result<(), PromiseError> {
    let spawn = {
      let mut state = self.inner.lock();
      let waiting = match &mut *state {
        State::Pending { waiting } => Some(std::mem::take(waiting)),
        State::Settled { .. } => None,
      };
      let Some(waiting) = waiting else {
        drop(state);
        return self.settled_twice();
      };

      let draining = !waiting.is_empty();
      *state = State::Settled {
        outcome,
        queue: waiting.into(),
        draining,
      };
      draining
    };

    if spawn {
      self.spawn_drain();
    }
    Ok(())
  }

  /// Register a continuation to run once with the outcome
  ///
  /// The continuation is queued while the promise is pending. If the promise
  /// is already settled it is scheduled right away, after any continuations
  /// that were subscribed earlier.
  pub fn subscribe<F>(&self, continuation: F)
  where
    F: FnOnce(Result<T, E>) + Send + 'static,
  {
    let spawn = {
      let mut state = self.inner.lock();
      match &mut *state {
        State::Pending { waiting } => {
          waiting.push(Box::new(continuation));
          false
        }
        State::Settled { queue, draining, .. } => {
          queue.push_back(Box::new(continuation));
          !std::mem::replace(draining, true)
        }
      }
    };

    if spawn {
      self.spawn_drain();
    }
  }

  /// Wait for the outcome from async code
  ///
  /// Resolves to [`PromiseError::Abandoned`] if every handle is dropped while
  /// the promise is still pending. If a live handle never settles, the future
  /// never resolves.
  pub fn settled(&self) -> impl Future<Output = Result<Result<T, E>, PromiseError>> + Send + 'static {
    let (tx, rx) = oneshot::channel();
    self.subscribe(move |outcome| {
      let _ = tx.send(outcome);
    });
    async move { rx.await.map_err(|_| PromiseError::Abandoned) }
  }

  /// Whether the promise has left the pending state
  pub fn is_settled(&self) -> bool {
    matches!(&*self.inner.lock(), State::Settled { .. })
  }

  /// A copy of the outcome, if settled
  pub fn peek(&self) -> Option<Result<T, E>> {
    match &*self.inner.lock() {
      State::Pending { .. } => None,
      State::Settled { outcome, .. } => Some(outcome.clone()),
    }
  }

  /// The double-settlement policy this promise was created with
  pub fn policy(&self) -> SettlePolicy {
    self.inner.policy
  }

  /// The runtime continuations are dispatched on
  pub fn runtime(&self) -> &Handle {
    &self.inner.runtime
  }

  fn settled_twice(&self) -> Result<(), PromiseError> {
    match self.inner.policy {
      SettlePolicy::Ignore => {
        trace!("Ignoring settlement of an already settled promise");
        Ok(())
      }
      SettlePolicy::Strict => {
        warn!("Rejected settlement of an already settled promise");
        Err(PromiseError::AlreadySettled)
      }
    }
  }

  fn spawn_drain(&self) {
    let inner = Arc::clone(&self.inner);
    self.inner.runtime.spawn(async move { inner.drain() });
  }
}

impl<T, E> Default for Promise<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
