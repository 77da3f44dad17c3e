use crate::domain::rules::ExecutionMode;

pub fn config_loaded(path: &str) -> String {
    format!("Loaded configuration from {path}")
}

pub fn config_missing(candidates: &str) -> String {
    format!("No configuration file found (searched {candidates}); continuing with defaults and an empty rule set")
}

pub const TOKEN_REQUIRED: &str = "token is required: set it in skadi.yml or run `skadi <token>`";

pub fn agent_start(server: &str, rules: usize) -> String {
    format!("Skadi agent start: server={server}, rules={rules}")
}

pub fn received(id: &str, message: &str) -> String {
    format!("Received job {id}: {message}")
}

pub fn matched(kind: &str, name: &str) -> String {
    format!("Matched {kind} '{name}'")
}

pub fn executing(command: &str, mode: ExecutionMode, dir: &str) -> String {
    let dir = if dir.is_empty() { "." } else { dir };
    format!("Executing ({mode:?}) in {dir}: {command}")
}

pub fn job_failed(id: &str, err: &str) -> String {
    format!("Job {id} failed: {err}")
}

pub fn report_failed(id: &str, err: &str) -> String {
    format!("Failed to report result of job {id}: {err}")
}

pub fn poll_failed(err: &str) -> String {
    format!("Polling control server failed: {err}")
}

pub const SHUTDOWN: &str = "Shutting down...";

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

pub fn draining(count: usize, grace: u64) -> String {
    format!("Waiting up to {grace}s for {count} in-flight job(s)")
}

pub fn drain_timeout(count: usize) -> String {
    format!("Grace period elapsed, abandoning {count} job(s)")
}

pub fn token_written(path: &str) -> String {
    format!("Token written to {path}")
}

pub fn token_restored(path: &str) -> String {
    format!("Restored original contents of {path}")
}

pub fn restore_failed(path: &str, err: &str) -> String {
    format!("Failed to restore {path}: {err}")
}
