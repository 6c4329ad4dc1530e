//! Configuration, the outbound delivery boundary, and shared formatting
//! helpers for Herald.
//!
//! Everything environment-sourced is validated once at startup through
//! [`HeraldConfig::from_env`]; the process must not start partially
//! configured. Notification delivery goes through the [`Notifier`] trait so
//! the core pipeline never depends on a concrete chat platform.

pub mod config;
pub mod fmt;
pub mod notify;

pub use config::{ConfigError, HeraldConfig, VoiceLeavePolicy};
pub use fmt::{capitalize, format_duration, format_timestamp, tier_emoji};
pub use notify::{MessageFormat, Notifier};
