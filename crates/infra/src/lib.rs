//! Infrastructure layer: store collaborator, job registry, dispatch,
//! worker execution, read path and configuration.

pub mod config;
pub mod dispatch;
pub mod jobs;
pub mod read_model;
pub mod store;
pub mod wire;
