use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::session::AuthSettings;
use crate::validation::MIN_PASSWORD_LEN;

/// Name of the per-user and per-project config directory
pub const CONFIG_DIR: &str = ".visionsync";

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Where account data lives
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Account rules and development switches
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub min_password_len: Option<usize>,
    /// Insert the demo account when no users exist (development only)
    #[serde(default)]
    pub seed_demo_user: Option<bool>,
    /// Drop a restored session whose user is no longer registered
    #[serde(default)]
    pub verify_restored_session: Option<bool>,
}

/// Auth event journal
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct JournalConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    /// File name inside the data dir
    #[serde(default)]
    pub file: Option<String>,
}

fn default_journal_file() -> &'static str {
    "auth.jsonl"
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub journal: JournalConfig,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.visionsync/config.local.toml) > project (.visionsync/config.toml)
    /// > user (~/.visionsync/config.toml) > built-in defaults
    pub fn load() -> Result<Self> {
        Self::load_layered(dirs::home_dir().as_deref(), Path::new("."))
    }

    /// Layered load with explicit home and project roots
    pub fn load_layered(home: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = home {
            let user_config = home.join(CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                config.merge(Self::load_from(&user_config)?);
            }
        }

        let project_config = project_root.join(CONFIG_DIR).join("config.toml");
        if project_config.exists() {
            config.merge(Self::load_from(&project_config)?);
        }

        // Should be gitignored
        let local_config = project_root.join(CONFIG_DIR).join("config.local.toml");
        if local_config.exists() {
            config.merge(Self::load_from(&local_config)?);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority for every set field)
    pub fn merge(&mut self, other: Config) {
        if other.storage.dir.is_some() {
            self.storage.dir = other.storage.dir;
        }

        if other.auth.min_password_len.is_some() {
            self.auth.min_password_len = other.auth.min_password_len;
        }
        if other.auth.seed_demo_user.is_some() {
            self.auth.seed_demo_user = other.auth.seed_demo_user;
        }
        if other.auth.verify_restored_session.is_some() {
            self.auth.verify_restored_session = other.auth.verify_restored_session;
        }

        if other.journal.enabled.is_some() {
            self.journal.enabled = other.journal.enabled;
        }
        if other.journal.file.is_some() {
            self.journal.file = other.journal.file;
        }
    }

    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|d| d.join("visionsync"))
            .unwrap_or_else(|| Path::new(CONFIG_DIR).join("data"))
    }

    /// Journal path, or None when the journal is disabled
    pub fn journal_path(&self) -> Option<PathBuf> {
        if !self.journal.enabled.unwrap_or(true) {
            return None;
        }
        let file = self
            .journal
            .file
            .as_deref()
            .unwrap_or(default_journal_file());
        Some(self.data_dir().join(file))
    }

    pub fn auth_settings(&self) -> AuthSettings {
        let defaults = AuthSettings::default();
        AuthSettings {
            min_password_len: self
                .auth
                .min_password_len
                .unwrap_or(defaults.min_password_len),
            seed_demo_user: self.auth.seed_demo_user.unwrap_or(defaults.seed_demo_user),
            verify_restored_session: self
                .auth
                .verify_restored_session
                .unwrap_or(defaults.verify_restored_session),
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(dir) = &self.storage.dir {
            if dir.as_os_str().is_empty() {
                errors.push(ValidationError {
                    field: "storage.dir".to_string(),
                    message: "Must not be empty".to_string(),
                });
            }
        }

        if let Some(len) = self.auth.min_password_len {
            if len < MIN_PASSWORD_LEN {
                errors.push(ValidationError {
                    field: "auth.min_password_len".to_string(),
                    message: format!("Must be at least {}, got {}", MIN_PASSWORD_LEN, len),
                });
            }
        }

        if let Some(file) = &self.journal.file {
            let path = Path::new(file);
            let plain = path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
            if file.is_empty() || !plain {
                errors.push(ValidationError {
                    field: "journal.file".to_string(),
                    message: format!(
                        "Invalid journal file '{}', expected a relative name inside the data dir",
                        file
                    ),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(root: &Path, name: &str, content: &str) {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let settings = config.auth_settings();
        assert_eq!(settings.min_password_len, 6);
        assert!(!settings.seed_demo_user);
        assert!(!settings.verify_restored_session);
        assert!(config.journal_path().unwrap().ends_with("auth.jsonl"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sections() {
        let config: Config = toml::from_str(
            r#"
[storage]
dir = "/tmp/vs"

[auth]
min_password_len = 8
seed_demo_user = true

[journal]
enabled = false
"#,
        )
        .unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/vs"));
        assert_eq!(config.auth_settings().min_password_len, 8);
        assert!(config.auth_settings().seed_demo_user);
        assert!(config.journal_path().is_none());
    }

    #[test]
    fn test_layered_priority() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        write_config(
            home.path(),
            "config.toml",
            "[auth]\nmin_password_len = 10\nseed_demo_user = true\n",
        );
        write_config(project.path(), "config.toml", "[auth]\nmin_password_len = 8\n");
        write_config(
            project.path(),
            "config.local.toml",
            "[auth]\nverify_restored_session = true\n",
        );

        let config = Config::load_layered(Some(home.path()), project.path()).unwrap();
        let settings = config.auth_settings();
        assert_eq!(settings.min_password_len, 8);
        assert!(settings.seed_demo_user);
        assert!(settings.verify_restored_session);
    }

    #[test]
    fn test_layered_without_files() {
        let project = TempDir::new().unwrap();
        let config = Config::load_layered(None, project.path()).unwrap();
        assert!(config.storage.dir.is_none());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let project = TempDir::new().unwrap();
        write_config(project.path(), "config.toml", "[auth\n");
        assert!(Config::load_layered(None, project.path()).is_err());
    }

    #[test]
    fn test_validate_password_len_floor() {
        let mut config = Config::default();
        config.auth.min_password_len = Some(0);
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("min_password_len"));

        config.auth.min_password_len = Some(1);
        let errors = config.validate().unwrap_err();
        assert!(errors[0].message.contains("at least 6"));

        config.auth.min_password_len = Some(6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_journal_file() {
        let mut config = Config::default();
        config.journal.file = Some("../outside.jsonl".to_string());
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("relative name"));

        config.journal.file = Some("logs/auth.jsonl".to_string());
        assert!(config.validate().is_ok());
    }
}
