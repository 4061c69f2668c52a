//! Direct read path over stored messages.
//!
//! Reads bypass the job pipeline and see whatever the worker has committed
//! so far; there is no read-after-write guarantee relative to a job.

pub mod messages;

pub use messages::MessageReader;
