//! Client-facing HTTP API: accepts writes as jobs, serves status and reads.

pub mod app;
