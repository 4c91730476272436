//! Tool-call adapter exposing plugin management as a single operation.
//!
//! The host runtime registers one `plugins` tool whose JSON arguments
//! select the operation (`install`, `list`, `show`, `remove`, `update`,
//! `validate`). Responses are human-readable text; all real work happens
//! in [`Installer`] and [`PluginRegistry`].

use std::path::PathBuf;

use crate::installer::Installer;
use crate::parser::parse_plugin;
use crate::source::expand_user;

pub const TOOL_NAME: &str = "plugins";

/// Dispatches plugin-management tool calls for one Amplifier home.
pub struct PluginsTool {
    installer: Installer,
}

impl PluginsTool {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            installer: Installer::new(home),
        }
    }

    pub fn with_installer(installer: Installer) -> Self {
        Self { installer }
    }

    /// JSON schema describing the tool, in the shape the runtime's
    /// `register_tool` callback expects.
    pub fn definition() -> serde_json::Value {
        serde_json::json!({
            "name": TOOL_NAME,
            "description": "Manage Claude Code plugins for Amplifier compatibility. \
                            Install, list, show, update, or remove plugins from GitHub or local paths.",
            "parameters": {
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["install", "list", "show", "remove", "update", "validate"],
                        "description": "Operation to perform"
                    },
                    "source": {
                        "type": "string",
                        "description": "Plugin source for install/validate. \
                                        Can be: local path, github.com/owner/repo, or git+https://..."
                    },
                    "name": {
                        "type": "string",
                        "description": "Plugin name for show/remove/update operations"
                    },
                    "force": {
                        "type": "boolean",
                        "description": "Force reinstall if already installed",
                        "default": false
                    }
                },
                "required": ["operation"]
            }
        })
    }

    /// Handles one tool call. Errors come back as readable text, never as
    /// panics or opaque codes.
    pub fn handle(&self, arguments: &serde_json::Value) -> String {
        let Some(operation) = arguments.get("operation").and_then(|o| o.as_str()) else {
            return "Error: 'operation' is required".to_string();
        };

        match operation {
            "install" => self.handle_install(arguments),
            "list" => self.handle_list(),
            "show" => self.handle_show(arguments),
            "remove" => self.handle_remove(arguments),
            "update" => self.handle_update(arguments),
            "validate" => self.handle_validate(arguments),
            other => format!("Unknown operation: {other}"),
        }
    }

    fn handle_install(&self, args: &serde_json::Value) -> String {
        let Some(source) = args.get("source").and_then(|s| s.as_str()) else {
            return "Error: 'source' is required for install operation".to_string();
        };
        let force = args.get("force").and_then(|f| f.as_bool()).unwrap_or(false);
        self.installer.install(source, force).to_string()
    }

    fn handle_list(&self) -> String {
        let plugins = match self.installer.registry().list() {
            Ok(plugins) => plugins,
            Err(e) => return format!("Error: failed to read registry: {e}"),
        };

        if plugins.is_empty() {
            return "No plugins installed.".to_string();
        }

        let mut lines = vec![format!("Installed plugins ({}):", plugins.len())];
        for (name, info) in &plugins {
            lines.push(format!("\n{name} (v{})", info.version));
            lines.push(format!("  Source: {}", info.source));
            if !info.components.is_empty() {
                lines.push(format!("  Components: {}", info.components.describe()));
            }
        }
        lines.join("\n")
    }

    fn handle_show(&self, args: &serde_json::Value) -> String {
        let Some(name) = args.get("name").and_then(|n| n.as_str()) else {
            return "Error: 'name' is required for show operation".to_string();
        };

        let info = match self.installer.registry().get(name) {
            Ok(Some(info)) => info,
            Ok(None) => return format!("Plugin '{name}' is not installed."),
            Err(e) => return format!("Error: failed to read registry: {e}"),
        };

        let mut lines = vec![
            format!("{} (v{})", info.name, info.version),
            format!("  Source: {}", info.source),
            format!("  Installed: {}", info.installed_at),
            format!("  Path: {}", info.install_path.display()),
            String::new(),
            "  Components:".to_string(),
        ];
        if !info.components.skills.is_empty() {
            lines.push(format!("    Skills: {}", info.components.skills.join(", ")));
        }
        if !info.components.agents.is_empty() {
            lines.push(format!("    Agents: {}", info.components.agents.join(", ")));
        }
        if !info.components.commands.is_empty() {
            lines.push(format!(
                "    Commands: {}",
                info.components.commands.join(", ")
            ));
        }
        if info.components.hooks {
            lines.push("    Hooks: configured".to_string());
        }
        if info.components.mcp {
            lines.push("    MCP: configured".to_string());
        }
        lines.join("\n")
    }

    fn handle_remove(&self, args: &serde_json::Value) -> String {
        let Some(name) = args.get("name").and_then(|n| n.as_str()) else {
            return "Error: 'name' is required for remove operation".to_string();
        };
        match self.installer.remove(name) {
            Ok(message) => format!("✓ {message}"),
            Err(e) => format!("✗ {e}"),
        }
    }

    fn handle_update(&self, args: &serde_json::Value) -> String {
        let Some(name) = args.get("name").and_then(|n| n.as_str()) else {
            return "Error: 'name' is required for update operation".to_string();
        };
        match self.installer.update(name) {
            Ok(result) => result.to_string(),
            Err(e) => format!("✗ {e}"),
        }
    }

    fn handle_validate(&self, args: &serde_json::Value) -> String {
        let Some(source) = args.get("source").and_then(|s| s.as_str()) else {
            return "Error: 'source' is required for validate operation".to_string();
        };

        let path = expand_user(source);
        if !path.exists() {
            return format!("Error: Path does not exist: {source}");
        }

        let plugin = match parse_plugin(&path) {
            Ok(plugin) => plugin,
            Err(e) => return format!("✗ Invalid plugin: {e}"),
        };

        let summary = plugin.summary();
        [
            format!("✓ Valid plugin: {}", summary.name),
            format!("  Version: {}", summary.version),
            format!("  Description: {}", plugin.manifest.description),
            String::new(),
            "  Components:".to_string(),
            format!("    Skills: {}", summary.skills),
            format!("    Agents: {}", summary.agents),
            format!("    Commands: {}", summary.commands),
            format!("    Hooks: {}", if summary.has_hooks { "yes" } else { "no" }),
            format!("    MCP: {}", if summary.has_mcp { "yes" } else { "no" }),
        ]
        .join("\n")
    }
}
