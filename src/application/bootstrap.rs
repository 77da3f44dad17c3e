//! # Token Bootstrap
//!
//! Writes a freshly issued token into every existing config file in place.
//! All files are edited in memory first. Each is then replaced atomically through a temp
//! sibling and a rename; if a later file cannot be replaced, the ones already written are
//! restored from their original text.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::error::BootstrapError;
use crate::infrastructure::document::ConfigDocument;

pub const TOKEN_LENGTH: usize = 20;
const TOKEN_KEY: &str = "token";

/// Replaces the `token` value in each existing candidate. Returns the paths written.
pub fn bootstrap(token: &str, candidates: &[PathBuf]) -> Result<Vec<PathBuf>, BootstrapError> {
    let length = token.chars().count();
    if length != TOKEN_LENGTH {
        return Err(BootstrapError::InvalidTokenLength(length));
    }

    let existing: Vec<&PathBuf> = candidates.iter().filter(|path| path.exists()).collect();
    if existing.is_empty() {
        return Err(BootstrapError::NoConfigFound(candidates.to_vec()));
    }

    let mut edits = Vec::with_capacity(existing.len());
    for path in existing {
        let original = std::fs::read_to_string(path).map_err(|source| BootstrapError::Read {
            path: path.clone(),
            source,
        })?;
        let updated = with_token(path, &original, token)?;
        edits.push(Edit {
            path: path.clone(),
            original,
            updated,
        });
    }

    commit(&edits)?;
    Ok(edits.into_iter().map(|edit| edit.path).collect())
}

/// One config file's text before and after the token change.
struct Edit {
    path: PathBuf,
    original: String,
    updated: String,
}

/// Writes every edit, or none of them.
fn commit(edits: &[Edit]) -> Result<(), BootstrapError> {
    for (done, edit) in edits.iter().enumerate() {
        if let Err(source) = replace_file(&edit.path, &edit.updated) {
            rollback(&edits[..done]);
            return Err(BootstrapError::Write {
                path: edit.path.clone(),
                source,
            });
        }
        tracing::info!("{}", crate::strings::logs::token_written(&edit.path.display().to_string()));
    }
    Ok(())
}

fn rollback(written: &[Edit]) {
    for edit in written.iter().rev() {
        let path = edit.path.display().to_string();
        match replace_file(&edit.path, &edit.original) {
            Ok(()) => tracing::warn!("{}", crate::strings::logs::token_restored(&path)),
            Err(e) => tracing::error!("{}", crate::strings::logs::restore_failed(&path, &e.to_string())),
        }
    }
}

/// Replaces `path` with `contents` via a temp file in the same directory, keeping its permissions.
fn replace_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = std::fs::metadata(path) {
        std::fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Returns `text` with its top-level token set to `token` as a double-quoted scalar.
fn with_token(path: &Path, text: &str, token: &str) -> Result<String, BootstrapError> {
    // Reject anything the YAML parser would reject before touching its structure.
    serde_yaml::from_str::<serde_yaml::Value>(text).map_err(|source| BootstrapError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut doc = ConfigDocument::parse(text).map_err(|e| BootstrapError::Unsupported {
        path: path.to_path_buf(),
        line: e.line,
        reason: e.reason,
    })?;

    if !doc.set_scalar(TOKEN_KEY, token) {
        return Err(BootstrapError::TokenKeyMissing(path.to_path_buf()));
    }

    let rendered = doc.to_string();
    let reparsed: serde_yaml::Value = serde_yaml::from_str(&rendered).map_err(|source| BootstrapError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if reparsed.get(TOKEN_KEY).and_then(|v| v.as_str()) != Some(token) {
        return Err(BootstrapError::Verify(path.to_path_buf()));
    }

    Ok(rendered)
}
