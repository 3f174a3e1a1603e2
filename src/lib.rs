//! Webhook delivery worker.
//!
//! Consumes webhook jobs, posts each payload to its endpoint, and publishes
//! one structured delivery log per job.

pub mod config;
pub mod delivery;
pub mod job;
pub mod log;
pub mod pipeline;
pub mod queue;
pub mod time;
pub mod worker;
