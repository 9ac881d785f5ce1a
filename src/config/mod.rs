use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

/// Smallest accepted `auth.session_secret`, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub uploads_dir: String,
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_secret: String,
    pub session_duration_hours: i64,
    #[serde(default)]
    pub admin_identifiers: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementBackend {
    #[default]
    Sqlite,
    JsonFile,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub announcements: AnnouncementBackend,
    #[serde(default)]
    pub users: UserBackend,
    pub json_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    pub home_limit: i64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { home_limit: 15 }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.static_dir", "static")?
            .set_default("server.uploads_dir", "static/uploads")?
            .set_default("database.url", "sqlite://musiqhub.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("listing.home_limit", 15)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with MUSIQHUB__ prefix, double underscore separates levels)
            // MUSIQHUB__AUTH__ADMIN_IDENTIFIERS takes a comma-separated list
            .add_source(
                Environment::with_prefix("MUSIQHUB")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.admin_identifiers"),
            )

            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Message("server.port must not be 0".to_string()));
        }
        if self.auth.session_duration_hours <= 0 {
            return Err(ConfigError::Message(
                "auth.session_duration_hours must be positive".to_string(),
            ));
        }
        if self.listing.home_limit <= 0 {
            return Err(ConfigError::Message("listing.home_limit must be positive".to_string()));
        }
        if self.storage.announcements == AnnouncementBackend::JsonFile
            && self.storage.json_path.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(ConfigError::Message(
                "storage.json_path is required for the json_file backend".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    /// Everything but the secret, which must come from the environment or a config file.
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                static_dir: "static".to_string(),
                uploads_dir: "static/uploads".to_string(),
                secure_cookies: false,
            },
            database: DatabaseConfig {
                url: "sqlite://musiqhub.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_secret: String::new(),
                session_duration_hours: 24,
                admin_identifiers: Vec::new(),
            },
            storage: StorageConfig::default(),
            listing: ListingConfig::default(),
        }
    }
}
