//! Source resolution: turn an install string into a local directory.
//!
//! Accepted forms:
//! - local paths (absolute, relative, or `~/`-prefixed)
//! - `git+https://github.com/owner/repo`
//! - `https://github.com/owner/repo`
//! - `github.com/owner/repo` shorthand
//!
//! Remote sources are normalized to an `https://...git` URL and fetched
//! through the [`SourceFetcher`] seam so tests can substitute a fake
//! instead of shelling out to git.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

/// Narrow interface over "fetch this repository URL to a local directory".
pub trait SourceFetcher {
    fn fetch(&self, url: &str) -> Result<PathBuf>;
}

/// Fetches by shallow-cloning with the system `git` binary into a fresh
/// temporary directory that is kept for the caller.
///
/// The subprocess runs without a timeout: a hung remote blocks the calling
/// thread until git itself gives up.
#[derive(Debug, Default)]
pub struct GitFetcher;

impl SourceFetcher for GitFetcher {
    fn fetch(&self, url: &str) -> Result<PathBuf> {
        let dest = tempfile::Builder::new()
            .prefix("amplifier-plugin-")
            .tempdir()?
            .keep();

        tracing::info!(%url, dest = %dest.display(), "cloning plugin repository");
        let output = Command::new("git")
            .args(["clone", "--depth=1", url])
            .arg(&dest)
            .output()
            .map_err(|e| Error::CloneFailed {
                url: url.to_string(),
                reason: format!("failed to run git: {e}"),
            })?;

        if !output.status.success() {
            return Err(Error::CloneFailed {
                url: url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(dest)
    }
}

/// Resolves a source string to a local directory.
///
/// Existing local paths win; otherwise anything that looks like a git
/// reference is normalized and fetched. Everything else is
/// [`Error::InvalidSource`].
pub fn resolve_source(source: &str, fetcher: &dyn SourceFetcher) -> Result<PathBuf> {
    let local = expand_user(source);
    if local.exists() {
        return Ok(local.canonicalize()?);
    }

    if source.starts_with("git+") || source.starts_with("https://") || source.contains("github.com")
    {
        return fetcher.fetch(&normalize_git_url(source));
    }

    Err(Error::InvalidSource(source.to_string()))
}

/// Strips a `git+` prefix, forces `https://`, and appends `.git`.
pub(crate) fn normalize_git_url(source: &str) -> String {
    let mut url = source.strip_prefix("git+").unwrap_or(source).to_string();
    if !url.starts_with("https://") {
        url = format!("https://{url}");
    }
    if !url.ends_with(".git") {
        url.push_str(".git");
    }
    url
}

/// Expands a leading `~/` to the user's home directory.
pub(crate) fn expand_user(source: &str) -> PathBuf {
    if let Some(rest) = source.strip_prefix("~/")
        && let Some(dirs) = directories::UserDirs::new()
    {
        return dirs.home_dir().join(rest);
    }
    PathBuf::from(source)
}
