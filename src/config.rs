use std::{env, net::SocketAddr, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
    #[error(transparent)]
    DotEnvError(#[from] dotenvy::Error),
}

#[derive(Clone, Debug)] // Clone needed if passed around, Debug for logging
pub struct Config {
    pub bind_address: SocketAddr,
    pub trophies_table_name: String,
    // Store region as string for simplicity here, aws_clients can convert
    pub aws_region: String,
    // Optional endpoint for DynamoDB Local / LocalStack
    pub endpoint_url: Option<String>,
    // Origins allowed to make cross-origin requests (exact match)
    pub allowed_origins: Vec<String>,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    pub max_body_size_mb: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();

        let bind_address_str =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let trophies_table_name = env::var("TROPHIES_TABLE_NAME")
            .map_err(|_| ConfigError::MissingVar("TROPHIES_TABLE_NAME".into()))?;

        let aws_region =
            env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        // Allow overriding endpoint for dynamodb-local/testing
        let endpoint_url = env::var("AWS_ENDPOINT_URL").ok(); // Optional

        let allowed_origins = parse_origins(
            &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string()),
        );

        let rate_limit_max_requests = parse_or_default("RATE_LIMIT_MAX_REQUESTS", 100)?;
        let rate_limit_window_secs = parse_or_default("RATE_LIMIT_WINDOW_SECS", 15 * 60)?;
        let max_body_size_mb = parse_or_default("MAX_BODY_SIZE_MB", 10)?;

        Ok(Config {
            bind_address,
            trophies_table_name,
            aws_region,
            endpoint_url,
            allowed_origins,
            rate_limit_max_requests,
            rate_limit_window_secs,
            max_body_size_mb,
        })
    }

    /// Rate-limit window as a Duration.
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// Request body cap in bytes.
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

/// Splits a comma-separated origin list, trimming whitespace and dropping
/// empty entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_or_default<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidVar(name.into(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_splits_and_trims() {
        let origins = parse_origins("http://localhost:5173, https://trophies.example ,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://trophies.example".to_string()
            ]
        );
    }

    #[test]
    fn parse_origins_empty_input() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins(" , ,").is_empty());
    }

    #[test]
    fn window_and_body_size_conversions() {
        let config = Config {
            bind_address: "127.0.0.1:3000".parse().unwrap(),
            trophies_table_name: "trophies".into(),
            aws_region: "us-east-1".into(),
            endpoint_url: None,
            allowed_origins: vec![],
            rate_limit_max_requests: 100,
            rate_limit_window_secs: 900,
            max_body_size_mb: 10,
        };
        assert_eq!(config.rate_limit_window(), Duration::from_secs(900));
        assert_eq!(config.max_body_size(), 10 * 1024 * 1024);
    }
}
