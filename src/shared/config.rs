//! Application configuration. Training pipeline sizing, history source, logging.

use serde::Deserialize;

/// Default capacity of the training queue. Bounded channel provides backpressure:
/// when full, `learn` blocks on send().await until a worker consumes.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default number of training workers. The model lock serializes updates, so more
/// workers only overlap tokenization.
pub const DEFAULT_WORKERS: usize = 1;

pub const DEFAULT_MAX_MESSAGES: usize = 1000;
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Raise the log level to debug. Read from REACTOR_DEBUG.
    #[serde(default)]
    pub debug: Option<bool>,

    /// Maximum number of messages retrieved from each channel. Read from REACTOR_MAX_MESSAGES.
    #[serde(default)]
    pub max_messages: Option<usize>,

    /// History page size per request. Read from REACTOR_PAGE_SIZE.
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Max number of messages buffered between producers and workers. Read from REACTOR_QUEUE_CAPACITY.
    #[serde(default)]
    pub queue_capacity: Option<usize>,

    /// Training worker count. Read from REACTOR_WORKERS.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Directory holding one `<channel>.json` export per channel. Read from REACTOR_HISTORY_DIR.
    #[serde(default)]
    pub history_dir: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("REACTOR").try_parsing(true));
        if let Ok(path) = std::env::var("REACTOR_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.unwrap_or(false)
    }

    /// Returns max messages per channel. Defaults to DEFAULT_MAX_MESSAGES.
    pub fn max_messages_or_default(&self) -> usize {
        self.max_messages.unwrap_or(DEFAULT_MAX_MESSAGES)
    }

    pub fn page_size_or_default(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Returns training queue capacity. Defaults to DEFAULT_QUEUE_CAPACITY.
    pub fn queue_capacity_or_default(&self) -> usize {
        self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn workers_or_default(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS)
    }

    pub fn history_dir_or_default(&self) -> String {
        self.history_dir
            .clone()
            .unwrap_or_else(|| "./history".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert!(!cfg.debug_enabled());
        assert_eq!(cfg.max_messages_or_default(), 1000);
        assert_eq!(cfg.page_size_or_default(), 100);
        assert_eq!(cfg.queue_capacity_or_default(), 100);
        assert_eq!(cfg.workers_or_default(), 1);
        assert_eq!(cfg.history_dir_or_default(), "./history");
    }

    #[test]
    fn test_file_source_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reactor.toml");
        std::fs::write(&path, "max_messages = 250\nworkers = 2\ndebug = true\n").unwrap();

        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.max_messages_or_default(), 250);
        assert_eq!(cfg.workers_or_default(), 2);
        assert!(cfg.debug_enabled());
        assert_eq!(cfg.queue_capacity_or_default(), 100);
    }

    #[test]
    fn test_bad_value_is_reported_not_defaulted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reactor.toml");
        std::fs::write(&path, "workers = \"abc\"\nhistory_dir = \"/srv/exports\"\n").unwrap();

        let result: Result<AppConfig, config::ConfigError> = config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()
            .and_then(|c| c.try_deserialize());

        assert!(result.is_err());
    }
}
