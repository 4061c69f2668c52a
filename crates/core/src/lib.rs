//! `courier-core`: message and job domain primitives.
//!
//! This crate contains **pure domain** types (no IO, no store access).

pub mod error;
pub mod id;
pub mod intent;
pub mod job;
pub mod message;

pub use error::{DomainError, DomainResult};
pub use id::{JobId, MessageId};
pub use intent::{Operation, WriteIntent};
pub use job::JobStatus;
pub use message::{Content, Message};
