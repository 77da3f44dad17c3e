//! # Agent Loop
//!
//! Pulls jobs from the control channel and hands each one to the message handler
//! on its own task, so slow commands never hold up the next job.
//! On shutdown polling stops and in-flight jobs get a bounded grace period.

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::domain::config::AgentConfig;
use crate::domain::traits::{Job, JobSource, MessageHandler};
use crate::infrastructure::http::Unauthorized;
use crate::strings::logs;

#[derive(Debug, Clone, Copy)]
pub struct AgentOptions {
    pub poll_interval: Duration,
    pub shutdown_grace: Duration,
}

impl From<&AgentConfig> for AgentOptions {
    fn from(config: &AgentConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            shutdown_grace: Duration::from_secs(config.shutdown_grace_secs),
        }
    }
}

/// Runs until `shutdown` resolves or the server rejects the token.
pub async fn run(
    source: Arc<dyn JobSource>,
    handler: Arc<dyn MessageHandler>,
    options: AgentOptions,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    tokio::pin!(shutdown);
    let mut jobs = JoinSet::new();
    let mut idle = false;

    loop {
        while let Some(done) = jobs.try_join_next() {
            if let Err(e) = done {
                tracing::error!("Job task panicked: {}", e);
            }
        }

        if idle {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(options.poll_interval) => {}
            }
        }

        tokio::select! {
            _ = &mut shutdown => break,
            polled = source.next_job() => match polled {
                Ok(Some(job)) => {
                    idle = false;
                    jobs.spawn(process(source.clone(), handler.clone(), job));
                }
                Ok(None) => idle = true,
                Err(e) => {
                    if e.downcast_ref::<Unauthorized>().is_some() {
                        jobs.abort_all();
                        return Err(e);
                    }
                    tracing::warn!("{}", logs::poll_failed(&format!("{e:#}")));
                    idle = true;
                }
            }
        }
    }

    tracing::info!("{}", logs::SHUTDOWN);
    drain(jobs, options.shutdown_grace).await;
    Ok(())
}

async fn drain(mut jobs: JoinSet<()>, grace: Duration) {
    if jobs.is_empty() {
        return;
    }
    tracing::info!("{}", logs::draining(jobs.len(), grace.as_secs()));
    let finished = tokio::time::timeout(grace, async {
        while jobs.join_next().await.is_some() {}
    })
    .await;
    if finished.is_err() {
        tracing::warn!("{}", logs::drain_timeout(jobs.len()));
        // Dropping the tasks drops their children, which are killed on drop.
        jobs.abort_all();
    }
}

async fn process(source: Arc<dyn JobSource>, handler: Arc<dyn MessageHandler>, job: Job) {
    tracing::info!("{}", logs::received(&job.id, &job.message));

    let reported = match handler.handle(&job.message).await {
        Ok(output) => source.succeed(&job.id, &output).await,
        Err(e) => {
            let text = e.to_string();
            tracing::warn!("{}", logs::job_failed(&job.id, &text));
            source.fail(&job.id, &text).await
        }
    };

    if let Err(e) = reported {
        tracing::error!("{}", logs::report_failed(&job.id, &format!("{e:#}")));
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("{}", logs::shutdown_fail(&e.to_string()));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("{}", logs::shutdown_fail(&e.to_string()));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DispatchError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        queue: Mutex<VecDeque<Job>>,
        reports: Mutex<Vec<(String, bool, String)>>,
        reject: bool,
    }

    impl FakeSource {
        fn with_jobs(messages: &[&str]) -> Self {
            let queue = messages
                .iter()
                .enumerate()
                .map(|(i, m)| Job {
                    id: i.to_string(),
                    message: m.to_string(),
                })
                .collect();
            Self {
                queue: Mutex::new(queue),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl JobSource for FakeSource {
        async fn next_job(&self) -> Result<Option<Job>> {
            if self.reject {
                return Err(Unauthorized(401).into());
            }
            Ok(self.queue.lock().unwrap().pop_front())
        }

        async fn succeed(&self, id: &str, output: &str) -> Result<()> {
            self.reports.lock().unwrap().push((id.into(), true, output.into()));
            Ok(())
        }

        async fn fail(&self, id: &str, error: &str) -> Result<()> {
            self.reports.lock().unwrap().push((id.into(), false, error.into()));
            Ok(())
        }
    }

    struct Echo;

    #[async_trait]
    impl MessageHandler for Echo {
        async fn handle(&self, message: &str) -> Result<String, DispatchError> {
            match message.strip_prefix("say ") {
                Some(rest) => Ok(rest.to_string()),
                None => Err(DispatchError::Unsupported(message.to_string())),
            }
        }
    }

    fn options() -> AgentOptions {
        AgentOptions {
            poll_interval: Duration::from_millis(10),
            shutdown_grace: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_jobs_are_answered_until_shutdown() {
        let source = Arc::new(FakeSource::with_jobs(&["say hi", "bogus", "say bye"]));
        run(
            source.clone(),
            Arc::new(Echo),
            options(),
            tokio::time::sleep(Duration::from_millis(300)),
        )
        .await
        .unwrap();

        let mut reports = source.reports.lock().unwrap().clone();
        reports.sort();
        assert_eq!(
            reports,
            vec![
                ("0".to_string(), true, "hi".to_string()),
                ("1".to_string(), false, "unsupported command: bogus".to_string()),
                ("2".to_string(), true, "bye".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_token_stops_the_agent() {
        let source = Arc::new(FakeSource {
            reject: true,
            ..FakeSource::default()
        });
        let err = run(source, Arc::new(Echo), options(), std::future::pending())
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<Unauthorized>().is_some());
    }
}
