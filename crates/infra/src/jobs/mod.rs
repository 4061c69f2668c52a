//! Asynchronous write jobs: identity, status tracking, execution.
//!
//! ## Design
//!
//! - A job is a status cell in the store keyed by its own id (`job:<id>`)
//! - The API side creates it `pending` and hands the write to the worker
//! - The worker side applies the mutation and writes exactly one terminal status
//! - No retries, no dedup key, no cross-job ordering
//!
//! ## Components
//!
//! - `JobRegistry`: issues job ids, records and reads status
//! - `WorkerExecutor`: performs create/update/delete and finalizes the job
//! - `ProcessingDelay`: injectable stand-in for real work latency

pub mod delay;
pub mod executor;
pub mod registry;

pub use delay::ProcessingDelay;
pub use executor::{ExecError, WorkerExecutor};
pub use registry::{JobError, JobRegistry};
