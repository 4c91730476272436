//! # amplifier-plugin-compat
//!
//! Install Claude Code plugins for use with the Amplifier runtime.
//!
//! A Claude Code plugin is a directory with a `.claude-plugin/plugin.json`
//! manifest and any combination of `skills/`, `agents/`, `commands/`,
//! `hooks/`, and `.mcp.json`. This crate parses that layout, rewrites each
//! component's metadata into Amplifier's format, materializes the result
//! under the Amplifier home directory, and tracks what was installed so the
//! operation can be reversed.
//!
//! # Source plugin layout
//!
//! ```text
//! my-plugin/
//! ├── .claude-plugin/
//! │   └── plugin.json
//! ├── skills/
//! │   └── commit/
//! │       └── SKILL.md
//! ├── agents/
//! │   └── reviewer.md
//! ├── commands/
//! │   └── hello.md
//! ├── hooks/
//! │   ├── hooks.json
//! │   └── start.sh
//! └── .mcp.json
//! ```
//!
//! # Target layout under `~/.amplifier`
//!
//! ```text
//! ~/.amplifier/
//! ├── plugins.yaml                 # registry of installed plugins
//! ├── settings.yaml                # config.skills.dirs search paths
//! ├── mcp.json                     # merged mcpServers
//! ├── plugins/
//! │   └── my-plugin/               # private install directory
//! │       ├── skills/
//! │       ├── commands/
//! │       └── hooks/
//! ├── skills/
//! │   └── my-plugin -> plugins/my-plugin/skills
//! └── agents/
//!     └── my-plugin/
//!         └── reviewer.md          # translated to Amplifier frontmatter
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use amplifier_plugin_compat::Installer;
//!
//! let home = amplifier_plugin_compat::default_home().unwrap();
//! let installer = Installer::new(home);
//! let result = installer.install("github.com/owner/my-plugin", false);
//! println!("{result}");
//! ```
//!
//! Concurrent invocations against the same home directory are not
//! supported: the registry and shared config files are whole-file
//! read-modify-write without locking.

use std::path::PathBuf;

pub mod error;
mod frontmatter;
pub mod installer;
pub mod parser;
pub mod registry;
pub mod settings;
pub mod source;
pub mod tool;
pub mod translator;

pub use error::{Error, Result};
pub use installer::{InstallResult, Installer};
pub use parser::{ParsedPlugin, PluginManifest, PluginSummary, parse_plugin};
pub use registry::{ComponentSet, PluginInfo, PluginRegistry};
pub use source::{GitFetcher, SourceFetcher, resolve_source};
pub use tool::PluginsTool;
pub use translator::{
    ShellHook, ShellHooksConfig, TranslatedCommand, translate_agent, translate_command,
    translate_hooks,
};

/// Returns the default Amplifier home directory: `~/.amplifier`.
pub fn default_home() -> Option<PathBuf> {
    directories::UserDirs::new().map(|d| d.home_dir().join(".amplifier"))
}
