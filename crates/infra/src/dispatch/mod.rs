//! Hand-off of write intents from the API to the worker.
//!
//! ## Design
//!
//! - Dispatch is fire-and-forget from the client's point of view: the API
//!   has already answered 202 before the worker is contacted.
//! - A single attempt is made per job. There is no retry queue.
//! - A timeout does **not** mean the mutation was lost; the worker keeps
//!   going and finalizes the job itself.
//! - A connection that drops after being accepted is treated like a
//!   timeout: the request may have been delivered.
//! - An unreachable worker (no connection at all) leaves the job `pending`
//!   unless [`UnreachablePolicy::MarkFailed`] is configured.
//!
//! ## Components
//!
//! - [`WorkerClient`]: transport seam (HTTP in production, fakes in tests)
//! - [`HttpWorkerClient`]: reqwest-based client with a bounded timeout
//! - [`Dispatcher`]: runs one send per job and applies the policy

pub mod dispatcher;
pub mod worker_client;

pub use dispatcher::{Dispatcher, UnreachablePolicy};
pub use worker_client::{DispatchOutcome, HttpWorkerClient, WorkerClient};
