//! # Command Executor
//!
//! Runs one resolved command as a child process and captures its output.
//! Every call spawns its own process and holds no shared state, so calls may overlap freely.

use std::process::Stdio;
use std::time::Duration;

use crate::domain::config::ExecutionConfig;
use crate::domain::error::ExecutionError;
use crate::domain::rules::{ExecutionMode, ExecutionRequest, StderrPolicy};

#[derive(Debug, Clone)]
pub struct Executor {
    stderr: StderrPolicy,
    timeout: Option<Duration>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(StderrPolicy::Combined, None)
    }
}

impl Executor {
    pub fn new(stderr: StderrPolicy, timeout: Option<Duration>) -> Self {
        Self { stderr, timeout }
    }

    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self::new(config.stderr, config.timeout_secs.map(Duration::from_secs))
    }

    /// Execute a request and wait for the child to exit.
    pub async fn execute(&self, request: &ExecutionRequest) -> Result<String, ExecutionError> {
        let (program, mut cmd) = build_command(request)?;

        if !request.working_dir.is_empty() {
            cmd.current_dir(&request.working_dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            "{}",
            crate::strings::logs::executing(&request.command_line, request.mode, &request.working_dir)
        );

        let child = cmd
            .spawn()
            .map_err(|source| ExecutionError::Spawn { program, source })?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ExecutionError::Timeout(limit))??,
            None => child.wait_with_output().await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        match self.stderr {
            StderrPolicy::Strict => {
                if !output.status.success() {
                    return Err(ExecutionError::Exit {
                        status: output.status.to_string(),
                        output: if stderr.is_empty() { stdout.into_owned() } else { stderr.into_owned() },
                    });
                }
                if !stderr.is_empty() {
                    return Err(ExecutionError::Stderr(stderr.into_owned()));
                }
                Ok(stdout.into_owned())
            }
            StderrPolicy::Combined => {
                let mut result = stdout.into_owned();
                result.push_str(&stderr);
                if output.status.success() {
                    Ok(result)
                } else {
                    Err(ExecutionError::Exit {
                        status: output.status.to_string(),
                        output: result,
                    })
                }
            }
        }
    }
}

fn build_command(request: &ExecutionRequest) -> Result<(String, tokio::process::Command), ExecutionError> {
    if request.command_line.trim().is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    match request.mode {
        ExecutionMode::Direct => {
            let mut parts = request.command_line.split_whitespace();
            let program = parts.next().ok_or(ExecutionError::EmptyCommand)?;
            let mut cmd = tokio::process::Command::new(program);
            cmd.args(parts);
            Ok((program.to_string(), cmd))
        }
        ExecutionMode::Shell => {
            let (shell, flag) = if cfg!(target_os = "windows") { ("cmd", "/C") } else { ("sh", "-c") };
            let mut cmd = tokio::process::Command::new(shell);
            cmd.args([flag, request.command_line.as_str()]);
            Ok((shell.to_string(), cmd))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(line: &str) -> ExecutionRequest {
        ExecutionRequest::new(line, "", ExecutionMode::Shell)
    }

    fn direct(line: &str) -> ExecutionRequest {
        ExecutionRequest::new(line, "", ExecutionMode::Direct)
    }

    #[tokio::test]
    async fn test_direct_mode_runs_program_with_args() {
        let out = Executor::default().execute(&direct("echo hello   world")).await.unwrap();
        assert_eq!(out, "hello world\n");
    }

    #[tokio::test]
    async fn test_direct_mode_does_not_interpret_shell_syntax() {
        let out = Executor::default().execute(&direct("echo a | cat")).await.unwrap();
        assert_eq!(out, "a | cat\n");
    }

    #[tokio::test]
    async fn test_shell_mode_supports_pipes() {
        let out = Executor::default().execute(&shell("printf 'b\\na\\n' | sort")).await.unwrap();
        assert_eq!(out, "a\nb\n");
    }

    #[tokio::test]
    async fn test_working_dir_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        let request = ExecutionRequest::new("pwd", canonical.to_string_lossy(), ExecutionMode::Direct);
        let out = Executor::default().execute(&request).await.unwrap();
        assert_eq!(out.trim(), canonical.to_string_lossy());
    }

    #[tokio::test]
    async fn test_combined_policy_merges_stderr_on_success() {
        let out = Executor::default()
            .execute(&shell("echo out; echo err >&2"))
            .await
            .unwrap();
        assert_eq!(out, "out\nerr\n");
    }

    #[tokio::test]
    async fn test_combined_policy_fails_on_nonzero_exit() {
        let err = Executor::default().execute(&shell("echo boom; exit 3")).await.unwrap_err();
        match err {
            ExecutionError::Exit { output, .. } => assert_eq!(output, "boom\n"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_strict_policy_fails_on_stderr_with_zero_exit() {
        let executor = Executor::new(StderrPolicy::Strict, None);
        let err = executor.execute(&shell("echo out; echo warn >&2")).await.unwrap_err();
        match err {
            ExecutionError::Stderr(text) => assert_eq!(text, "warn\n"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_strict_policy_passes_clean_output() {
        let executor = Executor::new(StderrPolicy::Strict, None);
        let out = executor.execute(&shell("echo clean")).await.unwrap();
        assert_eq!(out, "clean\n");
    }

    #[tokio::test]
    async fn test_spawn_failure_names_program() {
        let err = Executor::default()
            .execute(&direct("/definitely/not/a/binary --flag"))
            .await
            .unwrap_err();
        match err {
            ExecutionError::Spawn { program, .. } => assert_eq!(program, "/definitely/not/a/binary"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let err = Executor::default().execute(&direct("   ")).await.unwrap_err();
        assert!(matches!(err, ExecutionError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let executor = Executor::new(StderrPolicy::Combined, Some(Duration::from_millis(200)));
        let err = executor.execute(&shell("sleep 5")).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Timeout(d) if d == Duration::from_millis(200)));
        assert_eq!(err.to_string(), "command timed out after 200ms");
    }
}
