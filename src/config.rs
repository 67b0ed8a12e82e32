use crate::error::{Result, TkError};
use crate::reminder::ReminderPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on `reminder_lead_days`, about ten years.
pub const MAX_LEAD_DAYS: i64 = 3650;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_path: String,
    pub log_level: String,
    pub reminder_lead_days: i64,
    pub reminder_hour: u32,
}

impl Config {
    pub fn with_data_path(data_path: &str) -> Self {
        Self {
            data_path: data_path.to_string(),
            ..Self::default()
        }
    }

    pub fn base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(".config")
            .join("tk")
    }

    pub fn config_path() -> PathBuf {
        Self::base_dir().join("config.toml")
    }

    pub fn log_dir() -> PathBuf {
        Self::base_dir().join("logs")
    }

    /// Resolve the storage path from config. Expands ~ to home dir.
    pub fn resolved_data_path(&self) -> PathBuf {
        expand_tilde(&self.data_path)
    }

    /// Lock file sitting next to the storage file.
    pub fn lock_path(&self) -> PathBuf {
        let mut path = self.resolved_data_path().into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    pub fn reminder_policy(&self) -> ReminderPolicy {
        ReminderPolicy {
            lead_days: self.reminder_lead_days,
            hour: self.reminder_hour,
        }
    }

    /// Missing config is not an error; defaults apply.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| TkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        Self::ensure_dir()?;
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| TkError::Config(e.to_string()))?;
        atomic_write(path, content.as_bytes())
    }

    pub fn ensure_dir() -> Result<()> {
        let dir = Self::base_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.data_path.trim().is_empty() {
            return Err(TkError::Config("data_path cannot be empty".to_string()));
        }
        if self.reminder_hour > 23 {
            return Err(TkError::Config(format!(
                "reminder_hour must be 0-23, got {}",
                self.reminder_hour
            )));
        }
        if !(0..=MAX_LEAD_DAYS).contains(&self.reminder_lead_days) {
            return Err(TkError::Config(format!(
                "reminder_lead_days must be 0-{}, got {}",
                MAX_LEAD_DAYS, self.reminder_lead_days
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: "~/.config/tk/tasks.txt".to_string(),
            log_level: "info".to_string(),
            reminder_lead_days: 1,
            reminder_hour: 9,
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Replace `path` with `data` via a temp file in the same directory.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    use std::io::Write;

    let dir = match path.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
        Some(dir) => dir,
        None => {
            return Err(TkError::StorageIo(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no parent directory",
            )))
        }
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| TkError::StorageIo(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::with_data_path("/tmp/tasks.txt");
        config.reminder_hour = 7;
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.reminder_hour, 9);
    }

    #[test]
    fn rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reminder_hour = 30\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(TkError::Config(_))));

        std::fs::write(&path, "reminder_lead_days = 1000000000000\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(TkError::Config(_))));

        std::fs::write(&path, "reminder_lead_days = -1\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(TkError::Config(_))));

        std::fs::write(&path, "not toml at all [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(TkError::Config(_))));
    }

    #[test]
    fn lock_path_sits_beside_data() {
        let config = Config::with_data_path("/tmp/tk/tasks.txt");
        assert_eq!(config.lock_path(), PathBuf::from("/tmp/tk/tasks.txt.lock"));
    }
}
