//! Pure format conversions from Claude Code metadata to Amplifier's shape.
//!
//! Three independent translations: agent frontmatter regrouping, hook
//! config flattening, and command metadata extraction. None of them touch
//! the filesystem, and the markdown translations never fail — malformed
//! frontmatter degrades to "return the input unchanged" (agents) or
//! defaults (commands) so one bad component cannot poison a plugin.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::frontmatter;

const PLUGIN_ROOT_VAR: &str = "${CLAUDE_PLUGIN_ROOT}";

/// Converts a Claude Code agent document to Amplifier format.
///
/// Claude Code keeps `name`, `description`, and `model` at the top level of
/// the frontmatter; Amplifier groups identity under a `meta` block and
/// selects models through bundle configuration instead:
///
/// ```text
/// ---                          ---
/// name: reviewer               meta:
/// description: Reviews PRs  →    name: reviewer
/// model: inherit                 description: Reviews PRs
/// ---                          ---
/// Prompt...                    Prompt...
/// ```
///
/// Remaining top-level keys are preserved in order after `meta`. Documents
/// without frontmatter, with unparsable frontmatter, or already carrying a
/// `meta` block are returned unchanged.
pub fn translate_agent(content: &str) -> String {
    let (Some(raw), body) = frontmatter::split(content) else {
        return content.to_string();
    };

    let Ok(value) = serde_yaml::from_str::<Value>(raw) else {
        return content.to_string();
    };
    let Some(data) = value.as_mapping() else {
        return content.to_string();
    };

    // Already in Amplifier format.
    if data.contains_key("meta") {
        return content.to_string();
    }

    let mut meta = Mapping::new();
    if let Some(name) = data.get("name") {
        meta.insert("name".into(), name.clone());
    }
    if let Some(description) = data.get("description") {
        meta.insert("description".into(), description.clone());
    }

    let mut translated = Mapping::new();
    translated.insert("meta".into(), Value::Mapping(meta));
    for (key, val) in data {
        // `model` is dropped: Amplifier's bundle config owns model choice.
        if matches!(key.as_str(), Some("name" | "description" | "model")) {
            continue;
        }
        translated.insert(key.clone(), val.clone());
    }

    match serde_yaml::to_string(&Value::Mapping(translated)) {
        Ok(new_frontmatter) => format!("---\n{new_frontmatter}---\n{body}"),
        Err(_) => content.to_string(),
    }
}

/// One translated shell hook: the target event plus the command to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellHook {
    pub event: String,
    pub command: String,
}

/// Amplifier `shell_hooks` configuration produced by [`translate_hooks`].
/// Serializes to `{}` when no handlers survived translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellHooksConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shell_hooks: Vec<ShellHook>,
}

impl ShellHooksConfig {
    pub fn is_empty(&self) -> bool {
        self.shell_hooks.is_empty()
    }
}

/// Converts a parsed Claude Code `hooks.json` to Amplifier `shell_hooks`.
///
/// The source nests handler groups per event; the output is a flat list of
/// `{event, command}` entries. Only `"type": "command"` handlers are kept.
/// `${CLAUDE_PLUGIN_ROOT}` in commands is replaced with `target_root` —
/// the substitution is textual, so a quoted `"${CLAUDE_PLUGIN_ROOT}/...`
/// path keeps its quoting.
pub fn translate_hooks(hooks_config: &serde_json::Value, target_root: &Path) -> ShellHooksConfig {
    let mut shell_hooks = Vec::new();

    let Some(events) = hooks_config.get("hooks").and_then(|h| h.as_object()) else {
        return ShellHooksConfig::default();
    };

    for (cc_event, handlers) in events {
        let event = map_event(cc_event);
        let Some(handlers) = handlers.as_array() else {
            continue;
        };

        for handler in handlers {
            let Some(hooks) = handler.get("hooks").and_then(|h| h.as_array()) else {
                continue;
            };
            for hook in hooks {
                if hook.get("type").and_then(|t| t.as_str()) != Some("command") {
                    continue;
                }
                let command = hook.get("command").and_then(|c| c.as_str()).unwrap_or("");
                shell_hooks.push(ShellHook {
                    event: event.clone(),
                    command: resolve_plugin_root(command, target_root),
                });
            }
        }
    }

    ShellHooksConfig { shell_hooks }
}

/// Maps a Claude Code hook event name to the Amplifier equivalent.
/// Unrecognized names pass through lowercased.
fn map_event(event: &str) -> String {
    match event {
        "SessionStart" => "session_start".to_string(),
        "PreToolUse" => "pre_tool_call".to_string(),
        "PostToolUse" => "post_tool_call".to_string(),
        "Stop" => "session_end".to_string(),
        "Notification" => "notification".to_string(),
        other => other.to_lowercase(),
    }
}

fn resolve_plugin_root(command: &str, target_root: &Path) -> String {
    command.replace(PLUGIN_ROOT_VAR, &target_root.display().to_string())
}

/// Metadata extracted from a Claude Code command document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedCommand {
    pub description: String,
    pub disable_model_invocation: bool,
    pub prompt: String,
}

#[derive(Debug, Default, Deserialize)]
struct CommandFrontmatter {
    #[serde(default)]
    description: String,
    #[serde(default, rename = "disable-model-invocation")]
    disable_model_invocation: bool,
}

/// Extracts command metadata from a Claude Code command document.
///
/// The trimmed body is always the prompt; `description` and the
/// disable-flag come from frontmatter when present and parseable,
/// defaulting to empty/false otherwise. Never fails.
pub fn translate_command(content: &str) -> TranslatedCommand {
    let (raw, body) = frontmatter::split(content);

    let meta = raw
        .and_then(|fm| serde_yaml::from_str::<CommandFrontmatter>(fm).ok())
        .unwrap_or_default();

    TranslatedCommand {
        description: meta.description,
        disable_model_invocation: meta.disable_model_invocation,
        prompt: body.trim().to_string(),
    }
}
