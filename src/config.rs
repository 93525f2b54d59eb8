//! Application configuration
//!
//! Loaded from a TOML file, by default `~/.config/timeless-hotel/config.toml`.
//! A missing file is created with defaults on first start.
//!
//! ```toml
//! [server]
//! api_host = "0.0.0.0"
//! api_port = 8080
//! shutdown_timeout = 30
//!
//! [database]
//! url = "sqlite://./timeless.db?mode=rwc"
//! max_connections = 10
//!
//! [security]
//! jwt_secret = "change-me-in-production"
//! jwt_expiration_hours = 72
//!
//! [notifications.printer]
//! enabled = false
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::application::AdminSeed;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::DatabaseConfig;

/// Environment variable that overrides the default config location.
pub const CONFIG_ENV: &str = "TIMELESS_CONFIG";

const APP_DIR: &str = "timeless-hotel";

/// Default config file location.
///
/// `$TIMELESS_CONFIG` wins; otherwise the platform config dir, falling back
/// to the working directory when no home is known.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs_next::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── Sections ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub api_host: String,
    pub api_port: u16,
    /// Grace period for in-flight work on shutdown, in seconds
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SecuritySection {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: 72,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSection {
    /// `trace`, `debug`, `info`, `warn` or `error`; `RUST_LOG` takes precedence
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Seed for the first administrator, used only while the staff table is empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdminSection {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Default for AdminSection {
    fn default() -> Self {
        Self {
            email: "admin@timeless.local".to_string(),
            password: "admin123".to_string(),
            first_name: "Hotel".to_string(),
            last_name: "Administrator".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrinterSection {
    pub enabled: bool,
    pub program: String,
    /// First argument handed to `program`; skipped when empty
    pub script: String,
    pub printer_name: String,
}

impl Default for PrinterSection {
    fn default() -> Self {
        Self {
            enabled: false,
            program: "python3".to_string(),
            script: "print_receipt.py".to_string(),
            printer_name: "Receipt_Printer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationsSection {
    /// Receipts are written here as text files; unset means log only
    pub outbox_dir: Option<PathBuf>,
    pub hotel_name: String,
    pub printer: PrinterSection,
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            outbox_dir: None,
            hotel_name: "Timeless Hotel".to_string(),
            printer: PrinterSection::default(),
        }
    }
}

// ── AppConfig ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub security: SecuritySection,
    pub logging: LoggingSection,
    pub admin: AdminSection,
    pub notifications: NotificationsSection,
}

impl AppConfig {
    /// Read the config at `path`, writing defaults there first if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.server.api_host.trim().is_empty() {
            return invalid("server.api_host must not be empty");
        }
        if self.server.api_port == 0 {
            return invalid("server.api_port must be non-zero");
        }
        if self.database.url.trim().is_empty() {
            return invalid("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            return invalid("database.max_connections must be at least 1");
        }
        if self.security.jwt_secret.trim().is_empty() {
            return invalid("security.jwt_secret must not be empty");
        }
        if self.security.jwt_expiration_hours <= 0 {
            return invalid("security.jwt_expiration_hours must be positive");
        }
        if !matches!(self.logging.format.to_lowercase().as_str(), "pretty" | "json") {
            return invalid("logging.format must be \"pretty\" or \"json\"");
        }
        if !self.admin.email.contains('@') {
            return invalid("admin.email must be an email address");
        }
        if self.admin.password.len() < 6 {
            return invalid("admin.password must be at least 6 characters");
        }
        if self.notifications.printer.enabled && self.notifications.printer.program.trim().is_empty()
        {
            return invalid("notifications.printer.program is required when printing is enabled");
        }
        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(
            self.security.jwt_secret.clone(),
            self.security.jwt_expiration_hours,
        )
    }

    pub fn admin_seed(&self) -> AdminSeed {
        AdminSeed {
            email: self.admin.email.clone(),
            password: self.admin.password.clone(),
            first_name: self.admin.first_name.clone(),
            last_name: self.admin.last_name.clone(),
        }
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.api_host, self.server.api_port)
    }
}

impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   API address : {}", self.api_address())?;
        writeln!(f, "   Database    : {}", self.database.connection_url())?;
        writeln!(f, "   Log level   : {} ({})", self.logging.level, self.logging.format)?;
        write!(
            f,
            "   Printer     : {}",
            if self.notifications.printer.enabled {
                self.notifications.printer.printer_name.as_str()
            } else {
                "disabled"
            }
        )
    }
}
