use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Settings the listing endpoints read on every request.
#[derive(Debug, Clone)]
pub struct QuerySettings {
    /// Largest page size a caller may receive; bigger requests are clamped.
    pub max_page_size: u64,
    /// Upper bound for any single storage round trip.
    pub timeout: Duration,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            timeout: Duration::from_secs(5),
        }
    }
}

pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_origin: String,
    pub query: QuerySettings,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, `from_env` being the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_hours: parse_or(&lookup, "TOKEN_TTL_HOURS", 24)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", 10)?,
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            query: QuerySettings {
                max_page_size: positive(parse_or(&lookup, "MAX_PAGE_SIZE", 100)?, "MAX_PAGE_SIZE")?,
                timeout: Duration::from_secs(positive(
                    parse_or(&lookup, "QUERY_TIMEOUT_SECS", 5)?,
                    "QUERY_TIMEOUT_SECS",
                )?),
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn positive(value: u64, key: &'static str) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}
