//! # Strings Module
//!
//! Centralizes user-facing strings and log messages.

pub mod help;
pub mod logs;
