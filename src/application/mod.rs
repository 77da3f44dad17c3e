//! # Application Layer
//!
//! Contains the core logic of the agent: message dispatch, template rendering,
//! the polling loop, token bootstrap and logging setup.

pub mod agent;
pub mod bootstrap;
pub mod dispatcher;
pub mod logging;
pub mod template;
