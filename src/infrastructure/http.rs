//! # HTTP Control Channel
//!
//! Implements `JobSource` against the control server's agent API.
//! Jobs are pulled with `GET /agent/job` and answered with
//! `PUT /agent/jobs/{id}/succeed` or `/fail`, authenticated by the agent token.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::domain::traits::{Job, JobSource};

/// The server refused the token; retrying cannot help.
#[derive(Error, Debug)]
#[error("control server rejected the agent token (HTTP {0})")]
pub struct Unauthorized(pub u16);

pub struct HttpAgent {
    client: Client,
    server: String,
    token: String,
}

impl HttpAgent {
    pub fn new(server: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(90))
            .user_agent(concat!("skadi/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }

    async fn report(&self, id: &str, outcome: &str, body: &str) -> Result<()> {
        let resp = self
            .client
            .put(self.url(&format!("/agent/jobs/{id}/{outcome}")))
            .bearer_auth(&self.token)
            .body(body.to_string())
            .send()
            .await
            .with_context(|| format!("Failed to report job {id}"))?;
        check_status(resp.status())?;
        Ok(())
    }
}

fn check_status(status: StatusCode) -> Result<()> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Unauthorized(status.as_u16()).into());
    }
    if !status.is_success() {
        anyhow::bail!("control server answered HTTP {status}");
    }
    Ok(())
}

#[async_trait]
impl JobSource for HttpAgent {
    async fn next_job(&self) -> Result<Option<Job>> {
        let resp = self
            .client
            .get(self.url("/agent/job"))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Failed to poll for jobs")?;

        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        check_status(resp.status())?;

        let job = resp.json::<Job>().await.context("Invalid job payload")?;
        Ok(Some(job))
    }

    async fn succeed(&self, id: &str, output: &str) -> Result<()> {
        self.report(id, "succeed", output).await
    }

    async fn fail(&self, id: &str, error: &str) -> Result<()> {
        self.report(id, "fail", error).await
    }
}
