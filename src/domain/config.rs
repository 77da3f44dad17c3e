//! # Configuration
//!
//! Loads and parses the agent's configuration file (`skadi.yml`).
//! Defines the structs for the connection settings, the operator's rule lists
//! and the execution policy.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::rules::{ExecutionMode, PrefixRule, RuleSet, Shortcut, StderrPolicy, Template};

pub const DEFAULT_SERVER: &str = "https://api.letserver.run";

/// Main agent configuration structure.
/// Matches the layout of `skadi.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub shortcuts: Vec<ShortcutEntry>,
    #[serde(default)]
    pub commands: Vec<CommandEntry>,
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            token: String::new(),
            server: default_server(),
            log_file: None,
            shortcuts: Vec::new(),
            commands: Vec::new(),
            templates: Vec::new(),
            execution: ExecutionConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShortcutEntry {
    pub short: String,
    #[serde(default)]
    pub dir: Option<String>,
    pub cmd: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommandEntry {
    pub prefix: String,
    #[serde(default)]
    pub dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TemplateEntry {
    pub name: String,
    #[serde(default)]
    pub dir: Option<String>,
    pub temp: String,
}

/// How resolved commands are run. Prefix commands always go through the shell.
#[derive(Debug, Deserialize, Clone)]
pub struct ExecutionConfig {
    #[serde(default = "default_direct")]
    pub shortcuts: ExecutionMode,
    #[serde(default = "default_direct")]
    pub templates: ExecutionMode,
    #[serde(default)]
    pub stderr: StderrPolicy,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            shortcuts: default_direct(),
            templates: default_direct(),
            stderr: StderrPolicy::default(),
            timeout_secs: None,
        }
    }
}

fn default_direct() -> ExecutionMode {
    ExecutionMode::Direct
}

/// Settings for the polling loop against the control server.
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

fn default_poll_interval() -> u64 {
    3
}

fn default_shutdown_grace() -> u64 {
    10
}

/// Outcome of searching the candidate paths.
#[derive(Debug)]
pub enum Loaded {
    /// Parsed from the first existing candidate.
    File(PathBuf, Settings),
    /// No candidate existed; defaults apply.
    Defaults,
}

impl Settings {
    /// Loads the first existing file among `candidates`.
    /// A file that exists but cannot be read or parsed is an error; no file at all is not.
    pub fn load(candidates: &[PathBuf]) -> Result<Loaded> {
        for path in candidates {
            if !path.exists() {
                continue;
            }
            let settings = Self::load_file(path)?;
            return Ok(Loaded::File(path.clone(), settings));
        }
        Ok(Loaded::Defaults)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Builds the immutable rule set the dispatcher works from.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            shortcuts: self
                .shortcuts
                .iter()
                .map(|s| Shortcut {
                    name: s.short.clone(),
                    working_dir: s.dir.clone().unwrap_or_default(),
                    command: s.cmd.clone(),
                })
                .collect(),
            commands: self
                .commands
                .iter()
                .map(|c| PrefixRule {
                    prefix: c.prefix.clone(),
                    working_dir: c.dir.clone().unwrap_or_default(),
                })
                .collect(),
            templates: self
                .templates
                .iter()
                .map(|t| Template {
                    name: t.name.clone(),
                    working_dir: t.dir.clone().unwrap_or_default(),
                    format: t.temp.clone(),
                })
                .collect(),
            shortcut_mode: self.execution.shortcuts,
            template_mode: self.execution.templates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
debug: true
token: "abcdefghij0123456789"
shortcuts:
  - short: uptime
    cmd: /usr/bin/uptime
  - short: deploy
    dir: /srv/app
    cmd: ./deploy.sh
commands:
  - prefix: "git "
    dir: /srv/repo
templates:
  - name: restart
    temp: systemctl restart %s
execution:
  templates: shell
  stderr: strict
  timeout_secs: 30
"#;

    #[test]
    fn test_defaults_applied() {
        let settings = Settings::from_yaml("token: x\n").unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.server, DEFAULT_SERVER);
        assert!(settings.shortcuts.is_empty());
        assert_eq!(settings.execution.shortcuts, ExecutionMode::Direct);
        assert_eq!(settings.execution.stderr, StderrPolicy::Combined);
        assert_eq!(settings.execution.timeout_secs, None);
        assert_eq!(settings.agent.poll_interval_secs, 3);
        assert_eq!(settings.agent.shutdown_grace_secs, 10);
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let settings = Settings::from_yaml("  \n").unwrap();
        assert!(settings.token.is_empty());
        assert_eq!(settings.server, DEFAULT_SERVER);
    }

    #[test]
    fn test_full_sample() {
        let settings = Settings::from_yaml(SAMPLE).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.token, "abcdefghij0123456789");
        assert_eq!(settings.execution.templates, ExecutionMode::Shell);
        assert_eq!(settings.execution.stderr, StderrPolicy::Strict);
        assert_eq!(settings.execution.timeout_secs, Some(30));

        let rules = settings.rule_set();
        assert_eq!(rules.shortcuts.len(), 2);
        assert_eq!(rules.shortcuts[0].name, "uptime");
        assert_eq!(rules.shortcuts[0].working_dir, "");
        assert_eq!(rules.shortcuts[1].working_dir, "/srv/app");
        assert_eq!(rules.commands[0].prefix, "git ");
        assert_eq!(rules.templates[0].format, "systemctl restart %s");
        assert_eq!(rules.template_mode, ExecutionMode::Shell);
    }

    #[test]
    fn test_load_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yml");
        let first = dir.path().join("first.yml");
        let second = dir.path().join("second.yml");
        std::fs::write(&first, "token: first\n").unwrap();
        std::fs::write(&second, "token: second\n").unwrap();

        match Settings::load(&[missing, first.clone(), second]).unwrap() {
            Loaded::File(path, settings) => {
                assert_eq!(path, first);
                assert_eq!(settings.token, "first");
            }
            Loaded::Defaults => panic!("expected a loaded file"),
        }
    }

    #[test]
    fn test_load_without_candidates_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load(&[dir.path().join("nope.yml")]).unwrap();
        assert!(matches!(loaded, Loaded::Defaults));
    }

    #[test]
    fn test_unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skadi.yml");
        std::fs::write(&path, "shortcuts: [unclosed\n").unwrap();
        assert!(Settings::load(&[path]).is_err());
    }
}
