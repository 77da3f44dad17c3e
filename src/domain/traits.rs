//! # Domain Traits
//!
//! Abstract interfaces between the dispatch core and the transport.
//! Lets the agent loop run against the HTTP control server or a test double.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::error::DispatchError;

/// Callback invoked by the transport for each inbound message.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &str) -> Result<String, DispatchError>;
}

/// A message delivered by the control server.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub message: String,
}

/// Abstract interface for the control channel (e.g., HTTP long poll)
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch the next pending job, `None` when there is nothing to do.
    async fn next_job(&self) -> anyhow::Result<Option<Job>>;

    /// Report a successful result.
    async fn succeed(&self, id: &str, output: &str) -> anyhow::Result<()>;

    /// Report a failure.
    async fn fail(&self, id: &str, error: &str) -> anyhow::Result<()>;
}
