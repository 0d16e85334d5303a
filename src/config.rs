use std::env;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Optional startup seed for the admin account. All three variables must be
/// present for seeding to happen.
#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

/// All externally supplied constants, read once at startup and passed into
/// components explicitly.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub cookie_name: String,
    pub session_ttl_secs: i64,
    pub session_refresh_secs: i64,
    pub salt_size: usize,
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = parse_var("BIND_ADDR", "0.0.0.0:3000")?;
        let cookie_name = env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "session".to_string());
        let session_ttl_secs: i64 = parse_var("SESSION_TTL_SECS", "86400")?;
        let session_refresh_secs: i64 = parse_var("SESSION_REFRESH_SECS", "900")?;
        let salt_size: usize = parse_var("PASSWORD_SALT_SIZE", "16")?;

        if session_refresh_secs >= session_ttl_secs {
            return Err(ConfigError::Invalid {
                name: "SESSION_REFRESH_SECS",
                value: format!("{} (must be below SESSION_TTL_SECS)", session_refresh_secs),
            });
        }

        let admin = match (
            env::var("ADMIN_EMAIL"),
            env::var("ADMIN_USERNAME"),
            env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(nickname), Ok(password)) => Some(AdminSeed {
                email,
                nickname,
                password,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            bind_addr,
            cookie_name,
            session_ttl_secs,
            session_refresh_secs,
            salt_size,
            admin,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|_| ConfigError::Invalid { name, value: raw })
}
