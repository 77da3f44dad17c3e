//! # Config Paths
//!
//! Where the agent looks for `skadi.yml`, in search order.

use std::path::PathBuf;

pub const CONFIG_FILE: &str = "skadi.yml";
pub const SYSTEM_CONFIG: &str = "/etc/skadi/skadi.yml";

/// Returns the candidate config paths: working dir, user config dir, then system-wide.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("skadi").join(CONFIG_FILE));
    }
    paths.push(PathBuf::from(SYSTEM_CONFIG));
    paths
}
