//! Shared Amplifier configuration documents.
//!
//! Two files at the Amplifier home root are edited in place:
//! `settings.yaml`, whose `config.skills.dirs` list tells the runtime where
//! to look for skills, and `mcp.json`, the merged `mcpServers` mapping.
//! Unknown keys in either document are preserved across edits. Both are
//! whole-file read-modify-write; a malformed existing document is a
//! [`Error::ConfigMerge`] rather than silent data loss.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub(crate) const SETTINGS_FILE: &str = "settings.yaml";
pub(crate) const MCP_CONFIG_FILE: &str = "mcp.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    config: ConfigSection,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigSection {
    #[serde(default)]
    skills: SkillsSection,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SkillsSection {
    #[serde(default)]
    dirs: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

fn load_settings(home: &Path) -> Result<SettingsFile> {
    let path = home.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&content).map_err(|e| Error::ConfigMerge {
        path,
        reason: e.to_string(),
    })
}

fn write_settings(home: &Path, settings: &SettingsFile) -> Result<()> {
    std::fs::create_dir_all(home)?;
    std::fs::write(home.join(SETTINGS_FILE), serde_yaml::to_string(settings)?)?;
    Ok(())
}

/// Appends a skills directory to `config.skills.dirs`. Idempotent: an
/// already-registered directory is left alone.
pub fn add_skills_dir(home: &Path, dir: &Path) -> Result<()> {
    let mut settings = load_settings(home)?;
    let entry = dir.display().to_string();
    if settings.config.skills.dirs.contains(&entry) {
        return Ok(());
    }
    settings.config.skills.dirs.push(entry);
    write_settings(home, &settings)?;
    tracing::debug!(dir = %dir.display(), "registered skills directory");
    Ok(())
}

/// Removes a skills directory from `config.skills.dirs` if present.
pub fn remove_skills_dir(home: &Path, dir: &Path) -> Result<()> {
    if !home.join(SETTINGS_FILE).exists() {
        return Ok(());
    }
    let mut settings = load_settings(home)?;
    let entry = dir.display().to_string();
    let before = settings.config.skills.dirs.len();
    settings.config.skills.dirs.retain(|d| d != &entry);
    if settings.config.skills.dirs.len() != before {
        write_settings(home, &settings)?;
        tracing::debug!(dir = %dir.display(), "unregistered skills directory");
    }
    Ok(())
}

/// Merges a plugin's `mcpServers` mapping into `<home>/mcp.json`, with
/// plugin entries overwriting same-named existing ones.
pub fn merge_mcp_servers(home: &Path, mcp_config: &serde_json::Value) -> Result<()> {
    let Some(servers) = mcp_config.get("mcpServers").and_then(|s| s.as_object()) else {
        return Ok(());
    };

    let path = home.join(MCP_CONFIG_FILE);
    let mut existing = if path.exists() {
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str::<serde_json::Value>(&content).map_err(|e| Error::ConfigMerge {
            path: path.clone(),
            reason: e.to_string(),
        })?
    } else {
        serde_json::json!({})
    };

    let Some(root) = existing.as_object_mut() else {
        return Err(Error::ConfigMerge {
            path,
            reason: "top-level value is not an object".to_string(),
        });
    };
    let merged = root
        .entry("mcpServers")
        .or_insert_with(|| serde_json::json!({}));
    let Some(merged) = merged.as_object_mut() else {
        return Err(Error::ConfigMerge {
            path,
            reason: "mcpServers is not an object".to_string(),
        });
    };
    for (name, config) in servers {
        merged.insert(name.clone(), config.clone());
    }

    std::fs::create_dir_all(home)?;
    std::fs::write(&path, serde_json::to_string_pretty(&existing)?)?;
    Ok(())
}
