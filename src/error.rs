use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot resolve plugin source: {0}")]
    InvalidSource(String),

    #[error("Failed to clone {url}: {reason}")]
    CloneFailed { url: String, reason: String },

    #[error("Invalid plugin at {path}: {reason}")]
    InvalidPlugin { path: PathBuf, reason: String },

    #[error("Plugin '{name}' is already installed (use force to reinstall)")]
    AlreadyInstalled { name: String },

    #[error("Plugin '{name}' is not installed")]
    NotInstalled { name: String },

    #[error("Failed to merge config at {path}: {reason}")]
    ConfigMerge { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidSource("not-a-thing".into());
        assert!(err.to_string().contains("not-a-thing"));

        let err = Error::InvalidPlugin {
            path: PathBuf::from("/plugins/bad"),
            reason: "no plugin.json found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/plugins/bad"));
        assert!(msg.contains("no plugin.json"));

        let err = Error::AlreadyInstalled {
            name: "my-plugin".into(),
        };
        assert!(err.to_string().contains("my-plugin"));

        let err = Error::NotInstalled {
            name: "ghost".into(),
        };
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
