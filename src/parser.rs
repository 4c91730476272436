//! Plugin directory parsing.
//!
//! Reads a Claude Code plugin tree into a [`ParsedPlugin`] descriptor: the
//! manifest plus the discovered skill, agent, command, hook, and MCP/LSP
//! components. Discovery is deterministic (lexicographically sorted) and
//! purely a snapshot of the filesystem at parse time; nothing is mutated.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub(crate) const MANIFEST_DIR: &str = ".claude-plugin";
pub(crate) const MANIFEST_FILE: &str = "plugin.json";
pub(crate) const SKILL_FILE: &str = "SKILL.md";
const MCP_CONFIG_FILE: &str = ".mcp.json";
const LSP_CONFIG_FILE: &str = ".lsp.json";
const HOOKS_CONFIG_FILE: &str = "hooks.json";
const HOOK_SCRIPT_EXTENSIONS: &[&str] = &["sh", "py", "cmd"];

fn default_name() -> String {
    "unknown".to_string()
}

fn default_version() -> String {
    "0.0.0".to_string()
}

/// Parsed `plugin.json` manifest. Every field is optional in the source
/// document; `name` and `version` fall back to placeholder values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Free-form author mapping (`{"name": ..., "email": ...}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// Component counts reported by [`ParsedPlugin::summary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSummary {
    pub name: String,
    pub version: String,
    pub skills: usize,
    pub agents: usize,
    pub commands: usize,
    pub has_hooks: bool,
    pub has_mcp: bool,
}

/// A fully parsed plugin: read-only view over the source tree at one
/// instant. Every listed path existed under `root` at parse time.
#[derive(Debug)]
pub struct ParsedPlugin {
    pub root: PathBuf,
    pub manifest: PluginManifest,
    /// Skill directories (each contains a `SKILL.md`), sorted.
    pub skills: Vec<PathBuf>,
    /// Agent markdown files, sorted.
    pub agents: Vec<PathBuf>,
    /// Command markdown files, sorted.
    pub commands: Vec<PathBuf>,
    /// Parsed `hooks/hooks.json`, if present.
    pub hooks_config: Option<serde_json::Value>,
    /// Hook script files (`.sh`, `.py`, `.cmd`), sorted.
    pub hooks_scripts: Vec<PathBuf>,
    /// Parsed `.mcp.json`, if present.
    pub mcp_config: Option<serde_json::Value>,
    /// Parsed `.lsp.json`, if present.
    pub lsp_config: Option<serde_json::Value>,
}

impl ParsedPlugin {
    pub fn has_skills(&self) -> bool {
        !self.skills.is_empty()
    }

    pub fn has_agents(&self) -> bool {
        !self.agents.is_empty()
    }

    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    pub fn has_hooks(&self) -> bool {
        self.hooks_config.is_some()
    }

    pub fn has_mcp(&self) -> bool {
        self.mcp_config.is_some()
    }

    pub fn summary(&self) -> PluginSummary {
        PluginSummary {
            name: self.manifest.name.clone(),
            version: self.manifest.version.clone(),
            skills: self.skills.len(),
            agents: self.agents.len(),
            commands: self.commands.len(),
            has_hooks: self.has_hooks(),
            has_mcp: self.has_mcp(),
        }
    }
}

/// Parses a Claude Code plugin directory.
///
/// Fails with [`Error::InvalidPlugin`] when the path is not a directory, no
/// manifest is found at `.claude-plugin/plugin.json` or `plugin.json`, or a
/// present JSON config file does not parse. Missing optional directories
/// are not errors.
pub fn parse_plugin(plugin_path: &Path) -> Result<ParsedPlugin> {
    let root = plugin_path
        .canonicalize()
        .ok()
        .filter(|p| p.is_dir())
        .ok_or_else(|| Error::InvalidPlugin {
            path: plugin_path.to_path_buf(),
            reason: "not a directory".to_string(),
        })?;

    let manifest = parse_manifest(&root)?;

    let skills = discover_skills(&root)?;
    let agents = discover_markdown(&root.join("agents"))?;
    let commands = discover_markdown(&root.join("commands"))?;
    let (hooks_config, hooks_scripts) = discover_hooks(&root)?;
    let mcp_config = load_json_config(&root.join(MCP_CONFIG_FILE))?;
    let lsp_config = load_json_config(&root.join(LSP_CONFIG_FILE))?;

    Ok(ParsedPlugin {
        root,
        manifest,
        skills,
        agents,
        commands,
        hooks_config,
        hooks_scripts,
        mcp_config,
        lsp_config,
    })
}

fn parse_manifest(root: &Path) -> Result<PluginManifest> {
    let mut manifest_path = root.join(MANIFEST_DIR).join(MANIFEST_FILE);
    if !manifest_path.exists() {
        // Alternate location at the plugin root.
        manifest_path = root.join(MANIFEST_FILE);
    }
    if !manifest_path.exists() {
        return Err(Error::InvalidPlugin {
            path: root.to_path_buf(),
            reason: "no plugin.json found".to_string(),
        });
    }

    let content = std::fs::read_to_string(&manifest_path)?;
    serde_json::from_str(&content).map_err(|e| Error::InvalidPlugin {
        path: manifest_path,
        reason: format!("malformed manifest: {e}"),
    })
}

/// Immediate subdirectories of `skills/` that contain a `SKILL.md`.
fn discover_skills(root: &Path) -> Result<Vec<PathBuf>> {
    let skills_dir = root.join("skills");
    if !skills_dir.exists() {
        return Ok(Vec::new());
    }

    let mut skills = Vec::new();
    for entry in std::fs::read_dir(&skills_dir)? {
        let path = entry?.path();
        if path.is_dir() && path.join(SKILL_FILE).exists() {
            skills.push(path);
        }
    }
    skills.sort();
    Ok(skills)
}

/// All `*.md` files directly inside `dir`.
fn discover_markdown(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn discover_hooks(root: &Path) -> Result<(Option<serde_json::Value>, Vec<PathBuf>)> {
    let hooks_dir = root.join("hooks");
    if !hooks_dir.exists() {
        return Ok((None, Vec::new()));
    }

    let hooks_config = load_json_config(&hooks_dir.join(HOOKS_CONFIG_FILE))?;

    let mut scripts = Vec::new();
    for entry in std::fs::read_dir(&hooks_dir)? {
        let path = entry?.path();
        let ext = path.extension().and_then(|e| e.to_str());
        if path.is_file() && ext.is_some_and(|e| HOOK_SCRIPT_EXTENSIONS.contains(&e)) {
            scripts.push(path);
        }
    }
    scripts.sort();
    Ok((hooks_config, scripts))
}

/// Loads an optional JSON config file. Absence is `None`; a present but
/// malformed file is a hard parse failure.
fn load_json_config(path: &Path) -> Result<Option<serde_json::Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&content).map_err(|e| Error::InvalidPlugin {
        path: path.to_path_buf(),
        reason: format!("malformed JSON: {e}"),
    })?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_plugin(parent: &Path) -> PathBuf {
        let plugin_dir = parent.join("test-plugin");
        let config_dir = plugin_dir.join(MANIFEST_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join(MANIFEST_FILE),
            r#"{"name":"test-plugin","version":"1.0.0","description":"A test plugin"}"#,
        )
        .unwrap();

        let skill_dir = plugin_dir.join("skills").join("test-skill");
        std::fs::create_dir_all(&skill_dir).unwrap();
        std::fs::write(
            skill_dir.join(SKILL_FILE),
            "---\nname: test-skill\ndescription: A test skill\n---\n\n# Test Skill\n",
        )
        .unwrap();

        let agents_dir = plugin_dir.join("agents");
        std::fs::create_dir_all(&agents_dir).unwrap();
        std::fs::write(
            agents_dir.join("test-agent.md"),
            "---\nname: test-agent\ndescription: A test agent\n---\n\nYou are a test agent.\n",
        )
        .unwrap();

        let commands_dir = plugin_dir.join("commands");
        std::fs::create_dir_all(&commands_dir).unwrap();
        std::fs::write(
            commands_dir.join("test-cmd.md"),
            "---\ndescription: \"Test command\"\n---\n\nDo something.\n",
        )
        .unwrap();

        plugin_dir
    }

    #[test]
    fn test_manifest_defaults() {
        let manifest: PluginManifest = serde_json::from_str("{}").unwrap();
        assert_eq!(manifest.name, "unknown");
        assert_eq!(manifest.version, "0.0.0");
        assert_eq!(manifest.description, "");
        assert!(manifest.author.is_none());
        assert!(manifest.keywords.is_empty());
    }

    #[test]
    fn test_manifest_full() {
        let manifest: PluginManifest = serde_json::from_str(
            r#"{
                "name": "test",
                "version": "1.0.0",
                "description": "Test",
                "author": {"name": "Test Author"},
                "homepage": "https://example.com",
                "license": "MIT",
                "keywords": ["test", "example"]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.name, "test");
        assert_eq!(manifest.author.unwrap()["name"], "Test Author");
        assert_eq!(manifest.homepage.as_deref(), Some("https://example.com"));
        assert_eq!(manifest.license.as_deref(), Some("MIT"));
        assert_eq!(manifest.keywords, vec!["test", "example"]);
    }

    #[test]
    fn test_parse_valid_plugin() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_test_plugin(dir.path());
        let plugin = parse_plugin(&plugin_dir).unwrap();

        assert_eq!(plugin.manifest.name, "test-plugin");
        assert_eq!(plugin.manifest.version, "1.0.0");
        assert_eq!(plugin.skills.len(), 1);
        assert_eq!(plugin.agents.len(), 1);
        assert_eq!(plugin.commands.len(), 1);
        assert!(plugin.has_skills());
        assert!(plugin.has_agents());
        assert!(plugin.has_commands());
        assert!(!plugin.has_hooks());
        assert!(!plugin.has_mcp());
    }

    #[test]
    fn test_parse_nonexistent_path() {
        let dir = tempdir().unwrap();
        let err = parse_plugin(&dir.path().join("nonexistent")).unwrap_err();
        assert!(matches!(err, Error::InvalidPlugin { .. }));
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_parse_file_is_not_a_plugin() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plugin.md");
        std::fs::write(&file, "not a directory").unwrap();
        let err = parse_plugin(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_parse_missing_manifest() {
        let dir = tempdir().unwrap();
        let plugin_dir = dir.path().join("no-manifest");
        std::fs::create_dir(&plugin_dir).unwrap();

        let err = parse_plugin(&plugin_dir).unwrap_err();
        assert!(err.to_string().contains("no plugin.json"));
    }

    #[test]
    fn test_parse_manifest_at_root_fallback() {
        let dir = tempdir().unwrap();
        let plugin_dir = dir.path().join("root-manifest");
        std::fs::create_dir(&plugin_dir).unwrap();
        std::fs::write(
            plugin_dir.join(MANIFEST_FILE),
            r#"{"name":"root-manifest","version":"0.1.0"}"#,
        )
        .unwrap();

        let plugin = parse_plugin(&plugin_dir).unwrap();
        assert_eq!(plugin.manifest.name, "root-manifest");
    }

    #[test]
    fn test_parse_malformed_manifest() {
        let dir = tempdir().unwrap();
        let plugin_dir = dir.path().join("bad-manifest");
        std::fs::create_dir(&plugin_dir).unwrap();
        std::fs::write(plugin_dir.join(MANIFEST_FILE), "not json").unwrap();

        let err = parse_plugin(&plugin_dir).unwrap_err();
        assert!(err.to_string().contains("malformed manifest"));
    }

    #[test]
    fn test_summary() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_test_plugin(dir.path());
        let summary = parse_plugin(&plugin_dir).unwrap().summary();

        assert_eq!(summary.name, "test-plugin");
        assert_eq!(summary.version, "1.0.0");
        assert_eq!(summary.skills, 1);
        assert_eq!(summary.agents, 1);
        assert_eq!(summary.commands, 1);
        assert!(!summary.has_hooks);
        assert!(!summary.has_mcp);
    }

    #[test]
    fn test_skills_without_definition_file_skipped() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_test_plugin(dir.path());
        std::fs::create_dir_all(plugin_dir.join("skills").join("empty-skill")).unwrap();

        let plugin = parse_plugin(&plugin_dir).unwrap();
        assert_eq!(plugin.skills.len(), 1);
    }

    #[test]
    fn test_discovery_is_sorted() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_test_plugin(dir.path());
        let agents_dir = plugin_dir.join("agents");
        std::fs::write(agents_dir.join("zeta.md"), "z").unwrap();
        std::fs::write(agents_dir.join("alpha.md"), "a").unwrap();

        let plugin = parse_plugin(&plugin_dir).unwrap();
        let names: Vec<_> = plugin
            .agents
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["alpha.md", "test-agent.md", "zeta.md"]);
    }

    #[test]
    fn test_hooks_discovery() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_test_plugin(dir.path());
        let hooks_dir = plugin_dir.join("hooks");
        std::fs::create_dir(&hooks_dir).unwrap();
        std::fs::write(hooks_dir.join("hooks.json"), r#"{"hooks":{}}"#).unwrap();
        std::fs::write(hooks_dir.join("start.sh"), "#!/bin/sh\n").unwrap();
        std::fs::write(hooks_dir.join("check.py"), "pass\n").unwrap();
        std::fs::write(hooks_dir.join("README.md"), "not a script").unwrap();

        let plugin = parse_plugin(&plugin_dir).unwrap();
        assert!(plugin.has_hooks());
        assert_eq!(plugin.hooks_scripts.len(), 2);
    }

    #[test]
    fn test_hooks_dir_without_config() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_test_plugin(dir.path());
        let hooks_dir = plugin_dir.join("hooks");
        std::fs::create_dir(&hooks_dir).unwrap();
        std::fs::write(hooks_dir.join("start.sh"), "#!/bin/sh\n").unwrap();

        let plugin = parse_plugin(&plugin_dir).unwrap();
        assert!(plugin.hooks_config.is_none());
        assert!(!plugin.has_hooks());
        assert_eq!(plugin.hooks_scripts.len(), 1);
    }

    #[test]
    fn test_malformed_mcp_config_fails() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_test_plugin(dir.path());
        std::fs::write(plugin_dir.join(".mcp.json"), "{ broken").unwrap();

        let err = parse_plugin(&plugin_dir).unwrap_err();
        assert!(err.to_string().contains("malformed JSON"));
    }

    #[test]
    fn test_mcp_and_lsp_configs() {
        let dir = tempdir().unwrap();
        let plugin_dir = create_test_plugin(dir.path());
        std::fs::write(
            plugin_dir.join(".mcp.json"),
            r#"{"mcpServers":{"srv":{"command":"run"}}}"#,
        )
        .unwrap();
        std::fs::write(plugin_dir.join(".lsp.json"), r#"{"rust":{}}"#).unwrap();

        let plugin = parse_plugin(&plugin_dir).unwrap();
        assert!(plugin.has_mcp());
        assert!(plugin.lsp_config.is_some());
    }
}
