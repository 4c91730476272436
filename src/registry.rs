//! Installed-plugin registry persisted at `<home>/plugins.yaml`.
//!
//! The on-disk record is the single source of truth; every operation is a
//! whole-file read-modify-write with no in-memory cache. The file holds an
//! `installed:` mapping keyed by plugin name:
//!
//! ```text
//! installed:
//!   my-plugin:
//!     source: github.com/owner/my-plugin
//!     version: 1.0.0
//!     installed_at: 2026-08-25T10:00:00+00:00
//!     install_path: /home/user/.amplifier/plugins/my-plugin
//!     components:
//!       skills: [commit]
//!       agents: [reviewer]
//!       hooks: true
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub(crate) const REGISTRY_FILE: &str = "plugins.yaml";

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// What was installed for a plugin, one field per component kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hooks: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub mcp: bool,
}

impl ComponentSet {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.agents.is_empty()
            && self.commands.is_empty()
            && !self.hooks
            && !self.mcp
    }

    /// One-line summary, e.g. `2 skills, 1 agents, hooks, mcp`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.skills.is_empty() {
            parts.push(format!("{} skills", self.skills.len()));
        }
        if !self.agents.is_empty() {
            parts.push(format!("{} agents", self.agents.len()));
        }
        if !self.commands.is_empty() {
            parts.push(format!("{} commands", self.commands.len()));
        }
        if self.hooks {
            parts.push("hooks".to_string());
        }
        if self.mcp {
            parts.push("mcp".to_string());
        }
        parts.join(", ")
    }
}

/// Registry record for one installed plugin. The name is the mapping key
/// on disk, not a serialized field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    #[serde(skip)]
    pub name: String,
    pub source: String,
    pub version: String,
    pub installed_at: String,
    pub install_path: PathBuf,
    #[serde(default)]
    pub components: ComponentSet,
}

impl PluginInfo {
    /// Creates a record stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        version: impl Into<String>,
        install_path: impl Into<PathBuf>,
        components: ComponentSet,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            version: version.into(),
            installed_at: chrono::Utc::now().to_rfc3339(),
            install_path: install_path.into(),
            components,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    installed: BTreeMap<String, PluginInfo>,
}

/// Store for the `plugins.yaml` registry.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    path: PathBuf,
}

impl PluginRegistry {
    pub fn new(home: &Path) -> Self {
        Self {
            path: home.join(REGISTRY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all installed plugins. A missing registry file is an empty
    /// registry, not an error.
    pub fn list(&self) -> Result<BTreeMap<String, PluginInfo>> {
        let mut file = self.load()?;
        for (name, info) in &mut file.installed {
            info.name = name.clone();
        }
        Ok(file.installed)
    }

    pub fn get(&self, name: &str) -> Result<Option<PluginInfo>> {
        let mut file = self.load()?;
        Ok(file.installed.remove(name).map(|mut info| {
            info.name = name.to_string();
            info
        }))
    }

    /// Adds or replaces a record, creating the registry file and its
    /// parent directories on first use.
    pub fn register(&self, info: &PluginInfo) -> Result<()> {
        let mut file = self.load()?;
        file.installed.insert(info.name.clone(), info.clone());
        self.write(&file)?;
        tracing::debug!(plugin = %info.name, "registered plugin");
        Ok(())
    }

    /// Removes a record, returning whether it existed.
    pub fn unregister(&self, name: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let mut file = self.load()?;
        if file.installed.remove(name).is_none() {
            return Ok(false);
        }
        self.write(&file)?;
        tracing::debug!(plugin = %name, "unregistered plugin");
        Ok(true)
    }

    fn load(&self) -> Result<RegistryFile> {
        if !self.path.exists() {
            return Ok(RegistryFile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    fn write(&self, file: &RegistryFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_yaml::to_string(file)?)?;
        Ok(())
    }
}
