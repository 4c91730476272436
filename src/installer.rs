//! Install, remove, and update plugins under the Amplifier home.
//!
//! The installer orchestrates the whole pipeline: resolve the source,
//! parse the plugin, materialize each component into the target layout,
//! wire up the shared settings, and record the result in the registry.
//!
//! Failures during resolution or parsing leave no trace on disk. Once file
//! materialization has begun there is no rollback: a failed install can
//! leave partial files behind without a registry record. That limitation
//! is inherited from the original design and is documented rather than
//! fixed.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::parser::{ParsedPlugin, parse_plugin};
use crate::registry::{ComponentSet, PluginInfo, PluginRegistry};
use crate::settings;
use crate::source::{GitFetcher, SourceFetcher, resolve_source};
use crate::translator::translate_agent;

/// Outcome of one install attempt. Never persisted.
#[derive(Debug)]
pub struct InstallResult {
    pub success: bool,
    pub plugin_name: String,
    pub message: String,
    pub installed: ComponentSet,
    pub warnings: Vec<String>,
}

impl InstallResult {
    fn failure(plugin_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            plugin_name: plugin_name.into(),
            message: message.into(),
            installed: ComponentSet::default(),
            warnings: Vec::new(),
        }
    }
}

impl fmt::Display for InstallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.success {
            return write!(f, "✗ Failed to install: {}", self.message);
        }

        write!(f, "✓ Installed {}", self.plugin_name)?;
        if !self.installed.skills.is_empty() {
            write!(f, "\n  skills: {}", self.installed.skills.len())?;
        }
        if !self.installed.agents.is_empty() {
            write!(f, "\n  agents: {}", self.installed.agents.len())?;
        }
        if !self.installed.commands.is_empty() {
            write!(f, "\n  commands: {}", self.installed.commands.len())?;
        }
        if self.installed.hooks {
            write!(f, "\n  hooks: yes")?;
        }
        if self.installed.mcp {
            write!(f, "\n  mcp: yes")?;
        }
        if !self.warnings.is_empty() {
            write!(f, "\nWarnings:")?;
            for warning in &self.warnings {
                write!(f, "\n  ⚠ {warning}")?;
            }
        }
        Ok(())
    }
}

/// Orchestrator for plugin installation against one Amplifier home.
pub struct Installer {
    home: PathBuf,
    registry: PluginRegistry,
    fetcher: Box<dyn SourceFetcher>,
}

impl Installer {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self::with_fetcher(home, Box::new(GitFetcher))
    }

    /// Builds an installer with a custom fetcher, e.g. a fake in tests.
    pub fn with_fetcher(home: impl Into<PathBuf>, fetcher: Box<dyn SourceFetcher>) -> Self {
        let home = home.into();
        let registry = PluginRegistry::new(&home);
        Self {
            home,
            registry,
            fetcher,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Installs a plugin from a source string (local path or git
    /// reference). Reinstalling a registered name requires `force`, which
    /// overwrites the prior record.
    ///
    /// Forced reinstall does not first delete the prior install
    /// directory: skills and hooks subtrees are replaced wholesale, other
    /// files merge file-by-file, so a prior version with a different
    /// component set can leave orphaned files behind.
    pub fn install(&self, source: &str, force: bool) -> InstallResult {
        let plugin_path = match resolve_source(source, self.fetcher.as_ref()) {
            Ok(path) => path,
            Err(e) => {
                return InstallResult::failure("unknown", format!("Failed to resolve source: {e}"));
            }
        };

        let plugin = match parse_plugin(&plugin_path) {
            Ok(plugin) => plugin,
            Err(e) => {
                return InstallResult::failure("unknown", format!("Failed to parse plugin: {e}"));
            }
        };

        let name = plugin.manifest.name.clone();
        match self.materialize(source, &plugin, force) {
            Ok(result) => result,
            Err(e) => InstallResult::failure(name, e.to_string()),
        }
    }

    fn materialize(&self, source: &str, plugin: &ParsedPlugin, force: bool) -> Result<InstallResult> {
        let name = &plugin.manifest.name;

        if self.registry.get(name)?.is_some() && !force {
            return Err(Error::AlreadyInstalled { name: name.clone() });
        }

        let install_path = self.home.join("plugins").join(name);
        std::fs::create_dir_all(&install_path)?;
        tracing::info!(plugin = %name, path = %install_path.display(), "installing plugin");

        let mut installed = ComponentSet::default();
        let mut warnings = Vec::new();

        if plugin.has_skills() {
            installed.skills = self.install_skills(plugin, &install_path)?;
        }
        if plugin.has_agents() {
            installed.agents = self.install_agents(plugin)?;
        }
        if plugin.has_commands() {
            installed.commands = self.install_commands(plugin, &install_path)?;
            warnings
                .push("Commands installed but may need tool-slash-command for full support".into());
        }
        if plugin.has_hooks() {
            self.install_hooks(plugin, &install_path)?;
            installed.hooks = true;
            warnings.push("Hooks installed but require manual bundle configuration".into());
        }
        if plugin.has_mcp() {
            if let Some(mcp_config) = &plugin.mcp_config {
                settings::merge_mcp_servers(&self.home, mcp_config)?;
            }
            installed.mcp = true;
        }

        // Make the copied skills visible to the runtime's search path.
        if plugin.has_skills() {
            settings::add_skills_dir(&self.home, &install_path.join("skills"))?;
        }

        let info = PluginInfo::new(
            name.clone(),
            source,
            plugin.manifest.version.clone(),
            install_path,
            installed.clone(),
        );
        self.registry.register(&info)?;

        Ok(InstallResult {
            success: true,
            plugin_name: name.clone(),
            message: "Installation complete".into(),
            installed,
            warnings,
        })
    }

    /// Removes an installed plugin: shared settings entry, discovery
    /// symlink, translated agents, the private install directory, and
    /// finally the registry record. Cleanup steps are best-effort; the
    /// registry record goes last because it supplies the install path.
    pub fn remove(&self, name: &str) -> Result<String> {
        let info = self
            .registry
            .get(name)?
            .ok_or_else(|| Error::NotInstalled {
                name: name.to_string(),
            })?;

        settings::remove_skills_dir(&self.home, &info.install_path.join("skills"))?;

        let skills_link = self.home.join("skills").join(name);
        if skills_link.symlink_metadata().is_ok() {
            if skills_link.is_symlink() {
                std::fs::remove_file(&skills_link)?;
            } else {
                std::fs::remove_dir_all(&skills_link)?;
            }
        }

        let agents_dir = self.home.join("agents").join(name);
        if agents_dir.is_dir() {
            std::fs::remove_dir_all(&agents_dir)?;
        }

        if info.install_path.is_dir() {
            std::fs::remove_dir_all(&info.install_path)?;
        }

        self.registry.unregister(name)?;
        tracing::info!(plugin = %name, "removed plugin");

        Ok(format!("Removed plugin {name}"))
    }

    /// Reinstalls a plugin from its stored source with forced overwrite.
    pub fn update(&self, name: &str) -> Result<InstallResult> {
        let info = self
            .registry
            .get(name)?
            .ok_or_else(|| Error::NotInstalled {
                name: name.to_string(),
            })?;
        Ok(self.install(&info.source, true))
    }

    /// Copies the skills subtree into the install directory and points the
    /// shared discovery symlink at it.
    fn install_skills(&self, plugin: &ParsedPlugin, install_path: &Path) -> Result<Vec<String>> {
        let copied_skills = install_path.join("skills");
        if copied_skills.exists() {
            std::fs::remove_dir_all(&copied_skills)?;
        }
        copy_dir_all(&plugin.root.join("skills"), &copied_skills)?;

        let link = self.home.join("skills").join(&plugin.manifest.name);
        if let Some(parent) = link.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if link.symlink_metadata().is_ok() {
            if link.is_symlink() {
                std::fs::remove_file(&link)?;
            } else {
                std::fs::remove_dir_all(&link)?;
            }
        }
        symlink_dir(&copied_skills, &link)?;

        Ok(plugin
            .skills
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect())
    }

    /// Translates each agent document and writes it under the shared
    /// agents root.
    fn install_agents(&self, plugin: &ParsedPlugin) -> Result<Vec<String>> {
        let agents_target = self.home.join("agents").join(&plugin.manifest.name);
        std::fs::create_dir_all(&agents_target)?;

        let mut names = Vec::new();
        for agent_path in &plugin.agents {
            let content = std::fs::read_to_string(agent_path)?;
            let translated = translate_agent(&content);
            if let Some(file_name) = agent_path.file_name() {
                std::fs::write(agents_target.join(file_name), translated)?;
            }
            if let Some(stem) = agent_path.file_stem() {
                names.push(stem.to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    /// Copies command files verbatim. Frontmatter translation exists as a
    /// pure function but is not yet wired into installation.
    fn install_commands(&self, plugin: &ParsedPlugin, install_path: &Path) -> Result<Vec<String>> {
        let commands_target = install_path.join("commands");
        std::fs::create_dir_all(&commands_target)?;

        let mut names = Vec::new();
        for cmd_path in &plugin.commands {
            if let Some(file_name) = cmd_path.file_name() {
                std::fs::copy(cmd_path, commands_target.join(file_name))?;
            }
            if let Some(stem) = cmd_path.file_stem() {
                names.push(stem.to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    /// Copies the hooks subtree verbatim. Hook JSON translation exists as
    /// a pure function but installed hooks need manual activation.
    fn install_hooks(&self, plugin: &ParsedPlugin, install_path: &Path) -> Result<()> {
        let hooks_target = install_path.join("hooks");
        if hooks_target.exists() {
            std::fs::remove_dir_all(&hooks_target)?;
        }
        copy_dir_all(&plugin.root.join("hooks"), &hooks_target)
    }
}

fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn symlink_dir(original: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(original, link)?;
    Ok(())
}

#[cfg(windows)]
fn symlink_dir(original: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_dir(original, link)?;
    Ok(())
}
