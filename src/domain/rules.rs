//! # Rule Model
//!
//! The operator's allow-list, loaded once and read-only afterwards.
//! Three ordered categories, scanned by the dispatcher in a fixed order.

use serde::Deserialize;

/// How a command line is turned into a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Split on whitespace, first token is the program. No shell.
    Direct,
    /// Whole line handed to `sh -c`.
    Shell,
}

/// What counts as a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StderrPolicy {
    /// Only a non-zero exit fails; stderr is appended to the output.
    #[default]
    Combined,
    /// Any stderr output fails the run, whatever the exit code.
    Strict,
}

/// Exact-match trigger running a fixed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub name: String,
    pub working_dir: String,
    pub command: String,
}

/// Authorizes any message starting with `prefix` to run verbatim in the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRule {
    pub prefix: String,
    pub working_dir: String,
}

/// First word selects it, remaining words fill `format` positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub working_dir: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub shortcuts: Vec<Shortcut>,
    pub commands: Vec<PrefixRule>,
    pub templates: Vec<Template>,
    pub shortcut_mode: ExecutionMode,
    pub template_mode: ExecutionMode,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            shortcuts: Vec::new(),
            commands: Vec::new(),
            templates: Vec::new(),
            shortcut_mode: ExecutionMode::Direct,
            template_mode: ExecutionMode::Direct,
        }
    }
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty() && self.commands.is_empty() && self.templates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len() + self.commands.len() + self.templates.len()
    }
}

/// A fully resolved command, ready for the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub command_line: String,
    /// Empty means the agent's own working directory.
    pub working_dir: String,
    pub mode: ExecutionMode,
}

impl ExecutionRequest {
    pub fn new(command_line: impl Into<String>, working_dir: impl Into<String>, mode: ExecutionMode) -> Self {
        Self {
            command_line: command_line.into(),
            working_dir: working_dir.into(),
            mode,
        }
    }
}
