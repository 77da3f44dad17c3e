//! # Domain Layer
//!
//! Core definitions, types, and traits of the agent: settings, the rule model and errors.
//! Independent of the transport, serving as the contract for the other layers.

pub mod config;
pub mod error;
pub mod paths;
pub mod rules;
pub mod traits;
