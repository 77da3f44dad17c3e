//! # Main Entry Point
//!
//! Two mutually exclusive modes:
//! - `skadi`: load the config, then answer jobs from the control server until signalled.
//! - `skadi <TOKEN>`: write the token into every existing config file and exit.
//!
//! Layers:
//! - Domain: Settings, Rules, Errors
//! - Infrastructure: Executor, Config Document, HTTP Channel
//! - Application: Dispatcher, Bootstrap, Agent Loop, Logging
//! - Interface: CLI

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use crate::application::agent::{self, AgentOptions};
use crate::application::dispatcher::Dispatcher;
use crate::domain::config::{Loaded, Settings};
use crate::infrastructure::executor::Executor;
use crate::infrastructure::http::HttpAgent;
use crate::interface::cli::Cli;
use crate::strings::logs;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let candidates = cli.candidate_paths();

    // Bootstrap mode never starts the agent.
    if let Some(token) = cli.token.as_deref() {
        let _guard = application::logging::init(false, None)?;
        application::bootstrap::bootstrap(token, &candidates).context("Token bootstrap failed")?;
        return Ok(());
    }

    // 1. Load Configuration
    let (settings, loaded_from) = match Settings::load(&candidates)? {
        Loaded::File(path, settings) => (settings, Some(path)),
        Loaded::Defaults => (Settings::default(), None),
    };

    // 2. Logging Setup
    let _guard = application::logging::init(settings.debug, settings.log_file.as_deref())?;
    match &loaded_from {
        Some(path) => tracing::info!("{}", logs::config_loaded(&path.display().to_string())),
        None => {
            let searched: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            tracing::warn!("{}", logs::config_missing(&searched.join(", ")));
        }
    }

    if settings.token.is_empty() {
        anyhow::bail!(logs::TOKEN_REQUIRED);
    }

    // 3. Dispatcher
    let rules = settings.rule_set();
    tracing::info!("{}", logs::agent_start(&settings.server, rules.len()));
    let dispatcher = Dispatcher::new(rules, Executor::from_config(&settings.execution));

    // 4. Agent Loop
    let channel = HttpAgent::new(&settings.server, &settings.token)?;
    agent::run(
        Arc::new(channel),
        Arc::new(dispatcher),
        AgentOptions::from(&settings.agent),
        agent::shutdown_signal(),
    )
    .await
}
