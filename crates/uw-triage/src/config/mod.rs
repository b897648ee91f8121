use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub dataset: DatasetConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://underwriting.db?mode=rwc".to_string());

        let csv_path = env::var("PROPERTY_DATA_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("Test").join("Property_data - AI.csv"));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig { database_url },
            dataset: DatasetConfig {
                csv_path: Some(csv_path),
            },
            mail: MailConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the SQLite store holding submissions and process results.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_url: String,
}

/// Optional external property sheet merged over the static catalog.
#[derive(Debug, Clone, Default)]
pub struct DatasetConfig {
    pub csv_path: Option<PathBuf>,
}

/// Outbound mail settings. `smtp` is `None` when any credential is unset.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp: Option<SmtpSettings>,
    pub sender: String,
    pub team_email: String,
    pub base_url: String,
}

impl MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidSmtpPort)?;

        let smtp = match (
            non_empty_var("SMTP_HOST"),
            non_empty_var("SMTP_USER"),
            non_empty_var("SMTP_PASS"),
        ) {
            (Some(host), Some(username), Some(password)) => Some(SmtpSettings {
                host,
                port,
                username,
                password,
            }),
            _ => None,
        };

        let sender = non_empty_var("TRIAGE_SENDER_EMAIL")
            .unwrap_or_else(|| "uwt-agent@example.com".to_string());
        let team_email = non_empty_var("TRIAGE_TEAM_EMAIL").unwrap_or_else(|| sender.clone());
        let base_url = non_empty_var("TRIAGE_BASE_URL")
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        Ok(Self {
            smtp,
            sender,
            team_email,
            base_url,
        })
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp: None,
            sender: "uwt-agent@example.com".to_string(),
            team_email: "uwt-agent@example.com".to_string(),
            base_url: "http://localhost:5173".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidSmtpPort,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidSmtpPort => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

/// Serialises tests that mutate process environment.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "DATABASE_URL",
            "PROPERTY_DATA_CSV",
            "SMTP_HOST",
            "SMTP_PORT",
            "SMTP_USER",
            "SMTP_PASS",
            "TRIAGE_SENDER_EMAIL",
            "TRIAGE_TEAM_EMAIL",
            "TRIAGE_BASE_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(
            config.storage.database_url,
            "sqlite://underwriting.db?mode=rwc"
        );
        assert!(config.mail.smtp.is_none());
        assert_eq!(config.mail.team_email, config.mail.sender);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8000));
    }

    #[test]
    fn smtp_requires_every_credential() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SMTP_HOST", "smtp.example.com");
        env::set_var("SMTP_USER", "agent");
        let partial = AppConfig::load().expect("config loads");
        assert!(partial.mail.smtp.is_none());

        env::set_var("SMTP_PASS", "secret");
        env::set_var("SMTP_PORT", "2525");
        let full = AppConfig::load().expect("config loads");
        let smtp = full.mail.smtp.expect("smtp configured");
        assert_eq!(smtp.port, 2525);
        assert!(!format!("{smtp:?}").contains("secret"));
        reset_env();
    }

    #[test]
    fn rejects_invalid_smtp_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SMTP_PORT", "not-a-port");
        let err = AppConfig::load().expect_err("port must parse");
        assert!(matches!(err, ConfigError::InvalidSmtpPort));
        reset_env();
    }
}
