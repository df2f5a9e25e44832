use anyhow::ensure;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_WORDS_PATH: &str = "words.txt";
pub const DEFAULT_MAX_LINE_WIDTH: usize = 80;
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 250;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub words_path: PathBuf,
    pub max_line_width: usize,
    pub refresh_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            words_path: PathBuf::from(DEFAULT_WORDS_PATH),
            max_line_width: DEFAULT_MAX_LINE_WIDTH,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Replace stored values with whatever was given on the command line
    pub fn with_overrides(
        mut self,
        words_path: Option<PathBuf>,
        max_line_width: Option<usize>,
        refresh_interval_ms: Option<u64>,
    ) -> Self {
        if let Some(path) = words_path {
            self.words_path = path;
        }
        if let Some(width) = max_line_width {
            self.max_line_width = width;
        }
        if let Some(ms) = refresh_interval_ms {
            self.refresh_interval_ms = ms;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.max_line_width > 0, "line width must be at least 1");
        ensure!(
            self.refresh_interval_ms > 0,
            "refresh interval must be at least 1 ms"
        );
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "kstats") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("kstats_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files give the defaults
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        tracing::info!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested/deeper/config.json"));
        let cfg = Config {
            words_path: PathBuf::from("/tmp/corpus.txt"),
            max_line_width: 40,
            refresh_interval_ms: 100,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "max_line_width": 60 }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.max_line_width, 60);
        assert_eq!(cfg.words_path, PathBuf::from(DEFAULT_WORDS_PATH));
        assert_eq!(cfg.refresh_interval_ms, DEFAULT_REFRESH_INTERVAL_MS);
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let cfg = Config::default().with_overrides(None, Some(42), None);
        assert_eq!(cfg.max_line_width, 42);
        assert_eq!(cfg.words_path, PathBuf::from(DEFAULT_WORDS_PATH));
        assert_eq!(cfg.refresh_interval(), Duration::from_millis(250));
    }

    #[test]
    fn validate_rejects_zero_values() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::default()
            .with_overrides(None, Some(0), None)
            .validate()
            .is_err());
        assert!(Config::default()
            .with_overrides(None, None, Some(0))
            .validate()
            .is_err());
    }
}
