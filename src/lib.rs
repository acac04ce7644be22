//! receiverd - receiver management and notification dispatch
//!
//! This library provides the receiver model and its validation, the Slack,
//! PagerDuty and HTTP notifiers, the dispatcher that routes a notification
//! to the right one, and the HTTP API in front of it all.
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod internal_metrics;
pub mod notification;
pub mod receiver;
pub mod services;
pub mod value;

// Re-export core types for convenience
pub use crate::core::*;
