//! Application configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::validation::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Default queue endpoint host.
pub const DEFAULT_QUEUE_HOST: &str = "redis";

/// Default queue port.
pub const DEFAULT_QUEUE_PORT: u16 = 6379;

/// Default queue list name.
pub const DEFAULT_QUEUE_LIST: &str = "votes";

/// Default sink endpoint host.
pub const DEFAULT_SINK_HOST: &str = "db";

/// Default sink port.
pub const DEFAULT_SINK_PORT: u16 = 5432;

/// Default sink user.
pub const DEFAULT_SINK_USER: &str = "postgres";

/// Default sink password.
pub const DEFAULT_SINK_PASSWORD: &str = "postgres";

/// Default sink database name.
pub const DEFAULT_SINK_DATABASE: &str = "votes";

/// Default sink connection pool size.
pub const DEFAULT_SINK_POOL_SIZE: u32 = 2;

/// Default sink connect/acquire timeout (10 seconds).
pub const DEFAULT_SINK_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default drain interval (1 second).
pub const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_secs(1);

/// Default base delay between reconnect attempts (1 second).
pub const DEFAULT_RETRY_BASE_INTERVAL: Duration = Duration::from_secs(1);

/// Default cap on the delay between reconnect attempts (30 seconds).
pub const DEFAULT_RETRY_MAX_INTERVAL: Duration = Duration::from_secs(30);

/// Default multiplier applied to the reconnect delay after each attempt.
pub const DEFAULT_RETRY_FACTOR: f64 = 2.0;

/// Default randomization applied to reconnect delays (fraction of the delay).
pub const DEFAULT_RETRY_JITTER: f64 = 0.2;

/// Default number of reconnect attempts before giving up.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u16 = 8;

// =============================================================================
// Queue Configuration
// =============================================================================

/// Queue source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Queue endpoint host (default: "redis").
    pub host: String,

    /// Queue port (default: 6379).
    pub port: u16,

    /// Name of the list to pop votes from (default: "votes").
    pub list: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_QUEUE_HOST.to_string(),
            port: DEFAULT_QUEUE_PORT,
            list: DEFAULT_QUEUE_LIST.to_string(),
        }
    }
}

impl QueueConfig {
    /// Set the queue host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the queue port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the list name.
    pub fn with_list(mut self, list: impl Into<String>) -> Self {
        self.list = list.into();
        self
    }

    /// Connection URL for the queue service.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

// =============================================================================
// Sink Configuration
// =============================================================================

/// Durable sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Sink endpoint host (default: "db").
    pub host: String,

    /// Sink port (default: 5432).
    pub port: u16,

    /// Database user (default: "postgres").
    pub user: String,

    /// Database password (default: "postgres").
    pub password: String,

    /// Database name (default: "votes").
    pub database: String,

    /// Connection pool size (default: 2).
    pub pool_size: u32,

    /// Connect/acquire timeout (default: "10s").
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SINK_HOST.to_string(),
            port: DEFAULT_SINK_PORT,
            user: DEFAULT_SINK_USER.to_string(),
            password: DEFAULT_SINK_PASSWORD.to_string(),
            database: DEFAULT_SINK_DATABASE.to_string(),
            pool_size: DEFAULT_SINK_POOL_SIZE,
            connect_timeout: DEFAULT_SINK_CONNECT_TIMEOUT,
        }
    }
}

impl SinkConfig {
    /// Set the sink host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the sink port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the database credentials.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the connection pool size.
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Target address without credentials, for logging.
    pub fn addr(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

// =============================================================================
// Drain Configuration
// =============================================================================

/// Reconnect/backoff policy applied while the worker is recovering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Base delay before the first reconnect attempt (default: "1s").
    #[serde(with = "humantime_serde")]
    pub base_interval: Duration,

    /// Cap on the delay between reconnect attempts (default: "30s").
    #[serde(with = "humantime_serde")]
    pub max_interval: Duration,

    /// Multiplier applied to the delay after each attempt (default: 2.0).
    pub factor: f64,

    /// Randomization applied to each delay, as a fraction in [0, 1)
    /// (default: 0.2).
    pub jitter: f64,

    /// Number of reconnect attempts before the worker stops (default: 8).
    pub max_attempts: u16,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_interval: DEFAULT_RETRY_BASE_INTERVAL,
            max_interval: DEFAULT_RETRY_MAX_INTERVAL,
            factor: DEFAULT_RETRY_FACTOR,
            jitter: DEFAULT_RETRY_JITTER,
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
        }
    }
}

impl RetryConfig {
    /// Set the base delay.
    pub fn with_base_interval(mut self, base_interval: Duration) -> Self {
        self.base_interval = base_interval;
        self
    }

    /// Set the delay cap.
    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    /// Set the jitter fraction.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the attempt limit.
    pub fn with_max_attempts(mut self, max_attempts: u16) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Drain loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Fixed pause between loop iterations (default: "1s").
    ///
    /// The pause applies whether or not an item was processed, so throughput
    /// is bounded to roughly one item per interval.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Reconnect/backoff policy for transient failures.
    pub retry: RetryConfig,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_DRAIN_INTERVAL,
            retry: RetryConfig::default(),
        }
    }
}

impl DrainConfig {
    /// Set the loop interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Queue source configuration.
    pub queue: QueueConfig,

    /// Durable sink configuration.
    pub sink: SinkConfig,

    /// Drain loop configuration.
    pub drain: DrainConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue.host.is_empty() {
            return Err(ConfigError::ValidationError(
                "queue host cannot be empty".to_string(),
            ));
        }
        if self.queue.port == 0 {
            return Err(ConfigError::ValidationError(
                "queue port must be non-zero".to_string(),
            ));
        }
        if self.queue.list.is_empty() {
            return Err(ConfigError::ValidationError(
                "queue list cannot be empty".to_string(),
            ));
        }

        if self.sink.host.is_empty() {
            return Err(ConfigError::ValidationError(
                "sink host cannot be empty".to_string(),
            ));
        }
        if self.sink.port == 0 {
            return Err(ConfigError::ValidationError(
                "sink port must be non-zero".to_string(),
            ));
        }
        if self.sink.user.is_empty() {
            return Err(ConfigError::ValidationError(
                "sink user cannot be empty".to_string(),
            ));
        }
        if self.sink.database.is_empty() {
            return Err(ConfigError::ValidationError(
                "sink database cannot be empty".to_string(),
            ));
        }
        if self.sink.pool_size == 0 {
            return Err(ConfigError::ValidationError(
                "sink pool_size must be positive".to_string(),
            ));
        }

        if self.drain.interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "drain interval must be non-zero".to_string(),
            ));
        }

        let retry = &self.drain.retry;
        if retry.base_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "retry base_interval must be non-zero".to_string(),
            ));
        }
        if retry.max_interval < retry.base_interval {
            return Err(ConfigError::ValidationError(
                "retry max_interval must be >= base_interval".to_string(),
            ));
        }
        if retry.factor < 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "retry factor must be >= 1.0, got {}",
                retry.factor
            )));
        }
        if !(0.0..1.0).contains(&retry.jitter) {
            return Err(ConfigError::ValidationError(format!(
                "retry jitter must be in [0, 1), got {}",
                retry.jitter
            )));
        }
        if retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry max_attempts must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_queue_config_default() {
        let config = QueueConfig::default();
        assert_eq!(config.host, "redis");
        assert_eq!(config.port, 6379);
        assert_eq!(config.list, "votes");
        assert_eq!(config.url(), "redis://redis:6379/");
    }

    #[test]
    fn test_sink_config_default() {
        let config = SinkConfig::default();
        assert_eq!(config.host, "db");
        assert_eq!(config.port, 5432);
        assert_eq!(config.user, "postgres");
        assert_eq!(config.password, "postgres");
        assert_eq!(config.database, "votes");
        assert_eq!(config.pool_size, DEFAULT_SINK_POOL_SIZE);
        assert_eq!(config.addr(), "db:5432/votes");
    }

    #[test]
    fn test_drain_config_default() {
        let config = DrainConfig::default();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.retry.base_interval, Duration::from_secs(1));
        assert_eq!(config.retry.max_interval, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts, DEFAULT_RETRY_MAX_ATTEMPTS);
    }

    #[test]
    fn test_config_builders() {
        let queue = QueueConfig::default()
            .with_host("127.0.0.1")
            .with_port(6380)
            .with_list("ballots");
        assert_eq!(queue.url(), "redis://127.0.0.1:6380/");
        assert_eq!(queue.list, "ballots");

        let sink = SinkConfig::default()
            .with_host("127.0.0.1")
            .with_credentials("tally", "secret")
            .with_database("elections");
        assert_eq!(sink.addr(), "127.0.0.1:5432/elections");
        assert_eq!(sink.user, "tally");

        let drain = DrainConfig::default()
            .with_interval(Duration::from_millis(250))
            .with_retry(RetryConfig::default().with_max_attempts(3));
        assert_eq!(drain.interval, Duration::from_millis(250));
        assert_eq!(drain.retry.max_attempts, 3);
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_queue_host() {
        let mut config = AppConfig::default();
        config.queue.host = String::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("queue host cannot be empty")
        );
    }

    #[test]
    fn test_config_validation_zero_sink_port() {
        let mut config = AppConfig::default();
        config.sink.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_interval() {
        let mut config = AppConfig::default();
        config.drain.interval = Duration::ZERO;

        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("drain interval must be non-zero")
        );
    }

    #[test]
    fn test_config_validation_invalid_retry() {
        let mut config = AppConfig::default();
        config.drain.retry.jitter = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.drain.retry.factor = 0.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.drain.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.drain.retry.max_interval = Duration::from_millis(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
queue:
  host: queue.internal
sink:
  host: 10.0.0.5
  database: elections
drain:
  interval: 500ms
  retry:
    max_attempts: 3
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.queue.host, "queue.internal");
        // Unset fields fall back to defaults
        assert_eq!(config.queue.port, 6379);
        assert_eq!(config.sink.host, "10.0.0.5");
        assert_eq!(config.sink.database, "elections");
        assert_eq!(config.drain.interval, Duration::from_millis(500));
        assert_eq!(config.drain.retry.max_attempts, 3);
        assert_eq!(config.drain.retry.factor, DEFAULT_RETRY_FACTOR);
    }

    #[test]
    fn test_config_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
queue:
  host: ""
"#
        )
        .unwrap();

        assert!(AppConfig::load(&path).is_err());
    }
}
