use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub collection: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://todos.db".to_string());

        let collection = lookup("TODO_COLLECTION").unwrap_or_else(|| "todos".to_string());
        if collection.is_empty()
            || !collection.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::Config(format!("invalid collection name '{}'", collection)));
        }

        let host: IpAddr = match lookup("HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::Config(format!("HOST is not an IP address: '{}'", raw)))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: '{}'", raw)))?,
            None => 8080,
        };

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("DB_MAX_CONNECTIONS must be a positive integer: '{}'", raw)))?,
            None => 5,
        };

        Ok(Self {
            database_url,
            collection,
            host,
            port,
            max_connections,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
