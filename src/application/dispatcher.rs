//! # Dispatcher
//!
//! Matches an inbound message against the rule set and runs the resolved command.
//! Priority is fixed: catalog, shortcuts, prefix commands, templates. First match wins.

use async_trait::async_trait;

use crate::application::template;
use crate::domain::error::DispatchError;
use crate::domain::rules::{ExecutionMode, ExecutionRequest, RuleSet};
use crate::domain::traits::MessageHandler;
use crate::infrastructure::executor::Executor;

/// What a message resolved to, before anything runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Catalog(String),
    Execute(ExecutionRequest),
}

pub struct Dispatcher {
    rules: RuleSet,
    executor: Executor,
}

impl Dispatcher {
    pub fn new(rules: RuleSet, executor: Executor) -> Self {
        Self { rules, executor }
    }

    /// Matches the message exactly as received; surrounding whitespace is significant.
    pub fn resolve(&self, message: &str) -> Result<Resolution, DispatchError> {
        if message == "help" || message == "all" {
            return Ok(Resolution::Catalog(crate::strings::help::catalog(&self.rules)));
        }

        if let Some(rule) = self.rules.shortcuts.iter().find(|s| s.name == message) {
            tracing::info!("{}", crate::strings::logs::matched("shortcut", &rule.name));
            return Ok(Resolution::Execute(ExecutionRequest::new(
                rule.command.as_str(),
                rule.working_dir.as_str(),
                self.rules.shortcut_mode,
            )));
        }

        // The whole message is the command line, not just the part after the prefix.
        if let Some(rule) = self.rules.commands.iter().find(|c| message.starts_with(&c.prefix)) {
            tracing::info!("{}", crate::strings::logs::matched("command", &rule.prefix));
            return Ok(Resolution::Execute(ExecutionRequest::new(
                message,
                rule.working_dir.as_str(),
                ExecutionMode::Shell,
            )));
        }

        let tokens: Vec<&str> = message.split_whitespace().collect();
        if let [name, args @ ..] = tokens.as_slice()
            && !args.is_empty()
            && let Some(rule) = self.rules.templates.iter().find(|t| t.name == *name)
        {
            tracing::info!("{}", crate::strings::logs::matched("template", &rule.name));
            let command_line = template::render(&rule.name, &rule.format, args)?;
            return Ok(Resolution::Execute(ExecutionRequest::new(
                command_line,
                rule.working_dir.as_str(),
                self.rules.template_mode,
            )));
        }

        Err(DispatchError::Unsupported(message.to_string()))
    }

    pub async fn dispatch(&self, message: &str) -> Result<String, DispatchError> {
        match self.resolve(message)? {
            Resolution::Catalog(text) => Ok(text),
            Resolution::Execute(request) => Ok(self.executor.execute(&request).await?),
        }
    }
}

#[async_trait]
impl MessageHandler for Dispatcher {
    async fn handle(&self, message: &str) -> Result<String, DispatchError> {
        self.dispatch(message).await
    }
}
