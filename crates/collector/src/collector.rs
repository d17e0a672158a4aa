//! The Collector: fan a query out to many items and reduce the answers once
//!
//! ```text
//! apply(items, fetch, reduce)
//!   ├─ item 0 ──fetch──▶ promise 0 ─┐
//!   ├─ item 1 ──fetch──▶ promise 1 ─┼─ join ──▶ reduce(aggregate)
//!   └─ item n ──fetch──▶ promise n ─┘
//! ```
//!
//! The collector never waits. `apply` returns as soon as every fetch has been
//! issued; `reduce` later runs on whichever task dispatches the continuation
//! of the joined promise.
//!
//! There is no timeout. If one fetch never settles its promise the
//! collection never completes. Callers that need bounded latency should use
//! [`Collector::gather`] and wrap the wait in `tokio::time::timeout`.

use collector_core::{CollectorConfig, Config};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
  capability::{Collectable, Reducible},
  join::join_all_with_policy,
  promise::Promise,
};

/// Generic fan-out/fan-in driver
///
/// Holds only its policies; every invocation is independent and keeps no
/// state once its reducer has run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collector {
  config: CollectorConfig,
}

impl Collector {
  /// Create a collector with explicit policies
  pub fn new(config: CollectorConfig) -> Self {
    Self { config }
  }

  /// Create a collector from the `[collector]` config section
  pub fn from_config(config: &Config) -> Self {
    Self::new(config.collector)
  }

  /// The policies this collector applies
  pub fn config(&self) -> &CollectorConfig {
    &self.config
  }

  /// Fetch one value per item and hand the ordered results to `reduce`
  ///
  /// With no items, `reduce` is called with an empty vector before this
  /// method returns and no promise is created. Otherwise `reduce` is called
  /// exactly once after every item's promise is fulfilled, with
  /// `results[i]` belonging to the i-th item. If the join rejects, `reject`
  /// is called on the reducer instead.
  ///
  /// # Panics
  ///
  /// Panics if there are items and no Tokio runtime is running.
  pub fn apply<I, In, Out, E, F, R>(&self, items: I, fetch: F, reduce: R)
  where
    I: IntoIterator<Item = In>,
    F: Collectable<In, Out, E>,
    R: Reducible<Out, E>,
    Out: Clone + Send + 'static,
    E: Clone + Send + 'static,
  {
    let mut items = items.into_iter().peekable();
    if items.peek().is_none() {
      debug!("No items to collect, reducing empty aggregate");
      reduce.reduce(Vec::new());
      return;
    }

    let invocation = Uuid::now_v7();
    let joined = self.fan_out(invocation, items, fetch);

    joined.subscribe(move |outcome| match outcome {
      Ok(results) => {
        debug!(%invocation, results = results.len(), "Collection complete");
        reduce.reduce(results);
      }
      Err(error) => {
        debug!(%invocation, "Collection rejected");
        reduce.reject(error);
      }
    });
  }

  /// Fetch one value per item and return the joined promise
  ///
  /// The promise is already fulfilled with an empty vector when there are
  /// no items. Unlike [`Collector::apply`], the empty case still creates a
  /// promise.
  ///
  /// # Panics
  ///
  /// Panics when no Tokio runtime is running, with or without items.
  pub fn gather<I, In, Out, E, F>(&self, items: I, fetch: F) -> Promise<Vec<Out>, E>
  where
    I: IntoIterator<Item = In>,
    F: Collectable<In, Out, E>,
    Out: Clone + Send + 'static,
    E: Clone + Send + 'static,
  {
    self.fan_out(Uuid::now_v7(), items, fetch)
  }

  /// Create one promise per item, issue its fetch, and join them in order
  fn fan_out<I, In, Out, E, F>(&self, invocation: Uuid, items: I, fetch: F) -> Promise<Vec<Out>, E>
  where
    I: IntoIterator<Item = In>,
    F: Collectable<In, Out, E>,
    Out: Clone + Send + 'static,
    E: Clone + Send + 'static,
  {
    let promises: Vec<Promise<Out, E>> = items
      .into_iter()
      .enumerate()
      .map(|(index, item)| {
        let promise = Promise::with_policy(self.config.settle_policy);
        trace!(%invocation, index, "Issuing fetch");
        fetch.fetch(item, promise.clone());
        promise
      })
      .collect();

    debug!(%invocation, items = promises.len(), "Fanned out collection");
    join_all_with_policy(promises, self.config.rejection_policy)
  }
}
