//! # Command Line
//!
//! `skadi` starts the agent; `skadi <TOKEN>` writes a new token into the config files and exits.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "skadi", version, about = "Runs operator-approved commands on request from the control server")]
pub struct Cli {
    /// New agent token to write into the config file(s) instead of starting the agent.
    #[arg(allow_hyphen_values = true)]
    pub token: Option<String>,

    /// Config file to use instead of the default search path. Repeatable.
    #[arg(short, long = "config", value_name = "PATH")]
    pub config: Vec<PathBuf>,
}

impl Cli {
    /// Explicit `--config` paths, or the default search list.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        if self.config.is_empty() {
            crate::domain::paths::candidate_paths()
        } else {
            self.config.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_starts_agent() {
        let cli = Cli::try_parse_from(["skadi"]).unwrap();
        assert!(cli.token.is_none());
        assert_eq!(cli.candidate_paths(), crate::domain::paths::candidate_paths());
    }

    #[test]
    fn test_single_argument_is_token() {
        let cli = Cli::try_parse_from(["skadi", "abcdefghij0123456789"]).unwrap();
        assert_eq!(cli.token.as_deref(), Some("abcdefghij0123456789"));
    }

    #[test]
    fn test_token_may_start_with_hyphen() {
        let cli = Cli::try_parse_from(["skadi", "-abdefgij0123456789x"]).unwrap();
        assert_eq!(cli.token.as_deref(), Some("-abdefgij0123456789x"));
    }

    #[test]
    fn test_extra_arguments_are_a_usage_error() {
        assert!(Cli::try_parse_from(["skadi", "one", "two"]).is_err());
    }

    #[test]
    fn test_config_override() {
        let cli = Cli::try_parse_from(["skadi", "-c", "a.yml", "--config", "b.yml"]).unwrap();
        assert_eq!(cli.candidate_paths(), vec![PathBuf::from("a.yml"), PathBuf::from("b.yml")]);
    }
}
