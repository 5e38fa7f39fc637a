//! Configuration - loaded once at startup from the environment (and `.env`)

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub app_env: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connection_lifetime_secs: u64,
    /// Timeout applied to each single LMS call
    pub lms_timeout_secs: u64,
    /// Upper bound on concurrent membership calls, 1 means sequential
    pub membership_fetch_concurrency: usize,
    pub include_group_categories: bool,
    /// Expose upstream causes in 500 responses
    pub verbose_errors: bool,
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 5000,
            app_env: "development".to_string(),
            database_url: None,
            max_connections: 5,
            connection_lifetime_secs: 300,
            lms_timeout_secs: 10,
            membership_fetch_concurrency: 4,
            include_group_categories: false,
            verbose_errors: false,
            export_dir: None,
        }
    }
}

impl Config {
    /// Loads the configuration from environment variables.
    /// Calls dotenv() first, so a `.env` file in the working directory is honoured.
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);

        let server_port = parse_or(&lookup, "SERVER_PORT", defaults.server_port)
            .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?;

        let app_env = lookup("APP_ENV").unwrap_or(defaults.app_env);

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let max_connections = parse_or(&lookup, "MAX_DB_CONNECTIONS", defaults.max_connections)
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let connection_lifetime_secs = parse_or(
            &lookup,
            "DB_CONNECTION_LIFETIME_SECS",
            defaults.connection_lifetime_secs,
        )
        .map_err(|_| "Invalid DB_CONNECTION_LIFETIME_SECS: must be a positive number".to_string())?;

        let lms_timeout_secs = parse_or(&lookup, "LMS_TIMEOUT_SECS", defaults.lms_timeout_secs)
            .map_err(|_| "Invalid LMS_TIMEOUT_SECS: must be a positive number".to_string())?;
        if lms_timeout_secs == 0 {
            return Err("Invalid LMS_TIMEOUT_SECS: must be greater than zero".to_string());
        }

        let membership_fetch_concurrency = parse_or(
            &lookup,
            "MEMBERSHIP_FETCH_CONCURRENCY",
            defaults.membership_fetch_concurrency,
        )
        .map_err(|_| "Invalid MEMBERSHIP_FETCH_CONCURRENCY: must be a positive number".to_string())?;
        if membership_fetch_concurrency == 0 {
            return Err("Invalid MEMBERSHIP_FETCH_CONCURRENCY: must be at least 1".to_string());
        }

        let include_group_categories = parse_flag(
            &lookup,
            "INCLUDE_GROUP_CATEGORIES",
            defaults.include_group_categories,
        )?;

        let verbose_errors = parse_flag(&lookup, "VERBOSE_ERRORS", defaults.verbose_errors)?;

        let export_dir = lookup("EXPORT_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Config {
            server_host,
            server_port,
            app_env,
            database_url,
            max_connections,
            connection_lifetime_secs,
            lms_timeout_secs,
            membership_fetch_concurrency,
            include_group_categories,
            verbose_errors,
            export_dir,
        })
    }

    pub fn lms_timeout(&self) -> Duration {
        Duration::from_secs(self.lms_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Logs the configuration (hiding secrets)
    pub fn print_info(&self) {
        info!("Server configuration:");
        info!("  Environment: {}", self.app_env);
        info!("  Server address: {}", self.bind_address());
        match &self.database_url {
            Some(url) => {
                info!("  Database: {}", Self::mask_url(url));
                info!("  Max DB connections: {}", self.max_connections);
                info!("  Connection lifetime: {}s", self.connection_lifetime_secs);
            }
            None => info!("  Database: not configured"),
        }
        info!("  LMS timeout: {}s", self.lms_timeout_secs);
        info!(
            "  Membership fetch concurrency: {}",
            self.membership_fetch_concurrency
        );
        info!("  Group categories: {}", self.include_group_categories);
        info!("  Verbose errors: {}", self.verbose_errors);
        match &self.export_dir {
            Some(dir) => info!("  Export dir: {}", dir.display()),
            None => info!("  Export dir: system temp"),
        }
    }

    /// Masks the credentials of a database URL for logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        "***".to_string()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ()>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ()),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(format!("Invalid {}: expected true or false", key)),
        },
    }
}
