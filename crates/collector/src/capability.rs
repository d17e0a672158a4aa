//! Caller-supplied capabilities driven by the [`Collector`](crate::Collector)
//!
//! - [`Collectable`] starts one fetch per item. It is handed the promise for
//!   that item and must make sure the promise is eventually settled exactly
//!   once, usually by forwarding it to the actor that owns the item.
//! - [`Reducible`] receives the aggregate once every fetch has completed.
//!
//! Plain closures implement both traits, so most call sites never name them.

use tracing::debug;

use crate::promise::Promise;

/// Issues the asynchronous fetch for a single item
///
/// If an implementation never settles a promise it receives, the collection
/// it belongs to never completes.
pub trait Collectable<In, Out, E> {
  fn fetch(&self, item: In, promise: Promise<Out, E>);
}

impl<In, Out, E, F> Collectable<In, Out, E> for F
where
  F: Fn(In, Promise<Out, E>),
{
  fn fetch(&self, item: In, promise: Promise<Out, E>) {
    self(item, promise)
  }
}

/// Consumes the aggregate of a collection
///
/// Exactly one of `reduce` or `reject` is called for a collection that
/// completes. The default `reject` drops the error, so callers that need to
/// observe failures must override it or use [`on_reject`].
pub trait Reducible<Out, E>: Sized + Send + 'static {
  fn reduce(self, results: Vec<Out>);

  fn reject(self, error: E) {
    drop(error);
    debug!("Collection rejected, reducer skipped");
  }
}

impl<Out, E, F> Reducible<Out, E> for F
where
  F: FnOnce(Vec<Out>) + Send + 'static,
{
  fn reduce(self, results: Vec<Out>) {
    self(results)
  }
}

/// A reducer with an explicit failure channel, built by [`on_reject`]
pub struct OnReject<R, G> {
  reduce: R,
  reject: G,
}

/// Pair a reduce closure with a closure that receives the rejection error
///
/// ```ignore
/// collector.apply(handles, fetch, on_reject(
///   move |names| reply.fulfill(names),
///   move |error| reply.reject(error),
/// ));
/// ```
pub fn on_reject<R, G>(reduce: R, reject: G) -> OnReject<R, G> {
  OnReject { reduce, reject }
}

impl<Out, E, R, G> Reducible<Out, E> for OnReject<R, G>
where
  R: FnOnce(Vec<Out>) + Send + 'static,
  G: FnOnce(E) + Send + 'static,
{
  fn reduce(self, results: Vec<Out>) {
    (self.reduce)(results)
  }

  fn reject(self, error: E) {
    (self.reject)(error)
  }
}
