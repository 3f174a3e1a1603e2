//! Delivery log records.
//!
//! This module provides:
//! - The outbound record ([`LogItem`], [`LogStatus`])
//! - The outcome formatter ([`LogMessage`])

mod item;
mod message;

#[cfg(test)]
mod message_tests;

pub use item::{LogItem, LogStatus};
pub use message::{LOGS_KEY, LogMessage, RAW_RESPONSE_KEY};
