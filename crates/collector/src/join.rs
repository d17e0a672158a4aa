//! Join combinator: one promise for a whole sequence of promises
//!
//! The derived promise is fulfilled with every input value in the order the
//! inputs were given, no matter which input settles first. Each input gets
//! its own continuation that writes into a slot addressed by the input's
//! original index and decrements a pending counter; the derived promise is
//! settled when the counter reaches zero.
//!
//! Rejections follow [`RejectionPolicy`]:
//!
//! - `FailFast` rejects the derived promise with the first error observed
//!   and ignores every later settlement.
//! - `SettleAll` waits for every input, then rejects with the error of the
//!   lowest-index rejected input.
//!
//! Errors are passed through unchanged.

use std::sync::{Arc, Mutex, PoisonError};

use collector_core::RejectionPolicy;
use tracing::trace;

use crate::promise::Promise;

/// Bookkeeping shared by the per-input continuations of one join
struct JoinState<T, E> {
  slots: Vec<Option<T>>,
  pending: usize,
  /// Lowest-index error seen so far (SettleAll)
  error: Option<(usize, E)>,
  /// The derived promise has been settled
  done: bool,
}

impl<T, E> JoinState<T, E> {
  fn new(len: usize) -> Self {
    Self {
      slots: std::iter::repeat_with(|| None).take(len).collect(),
      pending: len,
      error: None,
      done: false,
    }
  }

  /// Record one input outcome, returning the aggregate once it is decided
  fn record(&mut self, index: usize, outcome: Result<T, E>, policy: RejectionPolicy) -> Option<Result<Vec<T>, E>> {
    if self.done {
      return None;
    }
    self.pending -= 1;

    match outcome {
      Ok(value) => self.slots[index] = Some(value),
      Err(error) => match policy {
        RejectionPolicy::FailFast => {
          self.done = true;
          return Some(Err(error));
        }
        RejectionPolicy::SettleAll => {
          if self.error.as_ref().is_none_or(|(seen, _)| index < *seen) {
            self.error = Some((index, error));
          }
        }
      },
    }

    if self.pending > 0 {
      return None;
    }

    self.done = true;
    match self.error.take() {
      Some((_, error)) => Some(Err(error)),
      None => Some(Ok(std::mem::take(&mut self.slots).into_iter().flatten().collect())),
    }
  }
}

/// Join with the default [`RejectionPolicy::FailFast`]
///
/// # Panics
///
/// Panics when `promises` is empty and no Tokio runtime is running.
pub fn join_all<T, E>(promises: impl IntoIterator<Item = Promise<T, E>>) -> Promise<Vec<T>, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  join_all_with_policy(promises, RejectionPolicy::default())
}

/// Join a sequence of promises into one promise of their values in input order
///
/// An empty sequence yields a promise that is already fulfilled with an
/// empty vector when this function returns. The derived promise of a
/// non-empty join runs on the runtime of the first input.
///
/// # Panics
///
/// Panics when `promises` is empty and no Tokio runtime is running, since the
/// empty result is still a [`Promise`] that needs a runtime for its
/// continuations.
pub fn join_all_with_policy<T, E>(
  promises: impl IntoIterator<Item = Promise<T, E>>,
  policy: RejectionPolicy,
) -> Promise<Vec<T>, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  let promises: Vec<_> = promises.into_iter().collect();

  let Some(first) = promises.first() else {
    let joined = Promise::new();
    // A fresh promise cannot already be settled
    let _ = joined.fulfill(Vec::new());
    return joined;
  };

  let joined = Promise::new_in(first.runtime().clone(), Default::default());
  let state = Arc::new(Mutex::new(JoinState::new(promises.len())));

  for (index, promise) in promises.iter().enumerate() {
    let state = Arc::clone(&state);
    let joined = joined.clone();
    promise.subscribe(move |outcome| {
      let decided = state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .record(index, outcome, policy);

      if let Some(aggregate) = decided {
        trace!(index, ok = aggregate.is_ok(), "Join decided");
        let _ = joined.settle(aggregate);
      }
    });
  }

  joined
}
