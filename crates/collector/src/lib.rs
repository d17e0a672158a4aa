//! Fan-out/fan-in queries over actors
//!
//! An owner holding handles to many actors often needs "one value from each".
//! The [`Collector`] issues one asynchronous fetch per item, joins the
//! resulting [`Promise`]s, and calls a reducer exactly once with the values in
//! input order, without the owner ever blocking.
//!
//! ```ignore
//! let collector = Collector::default();
//! collector.apply(
//!   roster.snapshot(),
//!   |worker: ActorHandle<WorkerMessage>, promise| worker.fetch_into(promise, WorkerMessage::Name),
//!   on_reject(move |names| reply.fulfill(names), move |error| reply.reject(error)),
//! );
//! ```
//!
//! Building blocks, leaves first:
//!
//! - [`promise`]: single-assignment promise with ordered, always-deferred
//!   continuations
//! - [`join`]: ordered aggregation of many promises
//! - [`capability`]: the fetch and reduce contracts callers implement
//! - [`collector`]: the driver tying them together
//! - [`actor`]: the mailbox runtime the fetched items usually live on

pub mod actor;
pub mod capability;
pub mod collector;
pub mod join;
pub mod logging;
pub mod promise;


pub use actor::{Actor, ActorHandle, Roster, SendError, spawn_actor};
pub use capability::{Collectable, OnReject, Reducible, on_reject};
pub use collector::Collector;
pub use collector_core::{CollectorConfig, Config, RejectionPolicy, SettlePolicy};
pub use join::{join_all, join_all_with_policy};
pub use promise::{Promise, PromiseError};
