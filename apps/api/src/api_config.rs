use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use clubhouse_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

const MIN_INTERNAL_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSourceConfig {
    Http { backend_url: Url, api_key: String },
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub permission_source: PermissionSourceConfig,
    pub permission_cache_ttl: Duration,
    pub permission_fetch_timeout: Duration,
    pub internal_shared_secret: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvLookup(lookup);

        let api_host = env
            .optional("API_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = env.parse_or("API_PORT", 3001_u16)?;
        let frontend_url = env
            .optional("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_owned());

        let permission_source = match env
            .optional("PERMISSION_SOURCE")
            .unwrap_or_else(|| "http".to_owned())
            .as_str()
        {
            "http" => {
                let backend_url = env.required("BACKEND_URL")?;
                let backend_url = Url::parse(backend_url.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid BACKEND_URL '{backend_url}': {error}"))
                })?;
                PermissionSourceConfig::Http {
                    backend_url,
                    api_key: env.required("BACKEND_API_KEY")?,
                }
            }
            "postgres" => PermissionSourceConfig::Postgres {
                database_url: env.required("DATABASE_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "PERMISSION_SOURCE must be either 'http' or 'postgres', got '{other}'"
                )));
            }
        };

        let cache_ttl_seconds = env.parse_or("PERMISSION_CACHE_TTL_SECONDS", 300_u64)?;
        if cache_ttl_seconds == 0 {
            return Err(AppError::Validation(
                "PERMISSION_CACHE_TTL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let fetch_timeout_ms = env.parse_or("PERMISSION_FETCH_TIMEOUT_MS", 10_000_u64)?;
        if fetch_timeout_ms == 0 {
            return Err(AppError::Validation(
                "PERMISSION_FETCH_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        let internal_shared_secret = env.required("INTERNAL_SHARED_SECRET")?;
        if internal_shared_secret.len() < MIN_INTERNAL_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "INTERNAL_SHARED_SECRET must be at least {MIN_INTERNAL_SECRET_LENGTH} characters"
            )));
        }

        Ok(Self {
            api_host,
            api_port,
            frontend_url,
            permission_source,
            permission_cache_ttl: Duration::from_secs(cache_ttl_seconds),
            permission_fetch_timeout: Duration::from_millis(fetch_timeout_ms),
            internal_shared_secret,
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

struct EnvLookup<F>(F);

impl<F> EnvLookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String, AppError> {
        self.optional(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use clubhouse_core::AppError;

    use super::{ApiConfig, PermissionSourceConfig};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(|name| values.get(name).cloned())
    }

    #[test]
    fn http_source_uses_defaults() {
        let config = load(&[
            ("BACKEND_URL", "https://club.backend.example.com"),
            ("BACKEND_API_KEY", "anon-key"),
            ("INTERNAL_SHARED_SECRET", SECRET),
        ]);

        let Ok(config) = config else {
            panic!("config should load");
        };
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert_eq!(config.permission_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.permission_fetch_timeout, Duration::from_secs(10));
        assert!(matches!(
            config.permission_source,
            PermissionSourceConfig::Http { ref api_key, .. } if api_key == "anon-key"
        ));
        assert!(config.socket_address().is_ok());
    }

    #[test]
    fn postgres_source_requires_database_url() {
        let missing = load(&[
            ("PERMISSION_SOURCE", "postgres"),
            ("INTERNAL_SHARED_SECRET", SECRET),
        ]);
        let present = load(&[
            ("PERMISSION_SOURCE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/clubhouse"),
            ("INTERNAL_SHARED_SECRET", SECRET),
        ]);

        assert!(matches!(
            missing,
            Err(AppError::Validation(ref message)) if message.contains("DATABASE_URL")
        ));
        assert!(matches!(
            present.map(|config| config.permission_source),
            Ok(PermissionSourceConfig::Postgres { .. })
        ));
    }

    #[test]
    fn rejects_invalid_values() {
        let base = [
            ("BACKEND_URL", "https://club.backend.example.com"),
            ("BACKEND_API_KEY", "anon-key"),
            ("INTERNAL_SHARED_SECRET", SECRET),
        ];
        let with = |name: &'static str, value: &'static str| {
            let mut pairs = base.to_vec();
            pairs.push((name, value));
            load(&pairs)
        };

        assert!(with("PERMISSION_CACHE_TTL_SECONDS", "0").is_err());
        assert!(with("PERMISSION_FETCH_TIMEOUT_MS", "0").is_err());
        assert!(with("PERMISSION_FETCH_TIMEOUT_MS", "soon").is_err());
        assert!(with("API_PORT", "70000").is_err());
        assert!(with("PERMISSION_SOURCE", "ldap").is_err());
        assert!(with("INTERNAL_SHARED_SECRET", "short").is_err());
        assert!(with("BACKEND_URL", "not a url").is_err());
    }

    #[test]
    fn reads_custom_ttl_and_timeout() {
        let config = load(&[
            ("BACKEND_URL", "https://club.backend.example.com"),
            ("BACKEND_API_KEY", "anon-key"),
            ("INTERNAL_SHARED_SECRET", SECRET),
            ("PERMISSION_CACHE_TTL_SECONDS", "60"),
            ("PERMISSION_FETCH_TIMEOUT_MS", "2500"),
        ]);

        assert!(matches!(
            config,
            Ok(ref config) if config.permission_cache_ttl == Duration::from_secs(60)
                && config.permission_fetch_timeout == Duration::from_millis(2500)
        ));
    }
}
