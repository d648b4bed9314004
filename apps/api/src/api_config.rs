use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use odoolink_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = match env::var("API_PORT") {
            Ok(value) => parse_port(value.as_str())?,
            Err(_) => 3001,
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_port(value: &str) -> Result<u16, AppError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|error| AppError::Validation(format!("invalid API_PORT '{value}': {error}")))
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use odoolink_core::AppError;

    use super::{ApiConfig, parse_port};

    fn config(api_host: &str) -> ApiConfig {
        ApiConfig {
            migrate_only: false,
            database_url: "postgres://localhost/odoolink".to_owned(),
            frontend_url: "http://localhost:3000".to_owned(),
            api_host: api_host.to_owned(),
            api_port: 3001,
        }
    }

    #[test]
    fn socket_address_combines_host_and_port() {
        let address = config("0.0.0.0").socket_address();

        assert_eq!(
            address.ok().map(|address| address.to_string()),
            Some("0.0.0.0:3001".to_owned())
        );
    }

    #[test]
    fn hostname_is_not_accepted_as_bind_address() {
        assert!(matches!(
            config("localhost").socket_address(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn port_must_fit_in_sixteen_bits() {
        assert_eq!(parse_port(" 8080 ").ok(), Some(8080));
        assert!(parse_port("70000").is_err());
    }
}
