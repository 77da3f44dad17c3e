//! # Infrastructure Layer
//!
//! Concrete implementations touching the outside world: child processes,
//! config files on disk, and the HTTP control channel.

pub mod document;
pub mod executor;
pub mod http;
