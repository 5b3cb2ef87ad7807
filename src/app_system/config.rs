//! Runtime configuration, read once from the environment at startup.

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

pub const DEFAULT_JWT_SECRET: &str = "hypermart-dev-secret";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub upload_dir: PathBuf,
    pub max_image_bytes: usize,
    pub cors_origins: Vec<String>,
    pub actor_buffer: usize,
    pub invoice_max_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            session_ttl: Duration::hours(24),
            upload_dir: PathBuf::from("uploads"),
            max_image_bytes: 2 * 1024 * 1024,
            cors_origins: vec!["http://localhost:8080".to_string()],
            actor_buffer: 64,
            invoice_max_attempts: 16,
        }
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn string(&self, var: &str) -> Option<String> {
        (self.lookup)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn number<N>(&self, var: &'static str, default: N) -> Result<N, ConfigError>
    where
        N: std::str::FromStr + PartialOrd + From<u8>,
        N::Err: std::fmt::Display,
    {
        let Some(raw) = self.string(var) else {
            return Ok(default);
        };
        let value = raw.parse::<N>().map_err(|e| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        })?;
        if value < N::from(1) {
            return Err(ConfigError::Invalid {
                var,
                value: raw,
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(value)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source. Unset or blank variables
    /// fall back to their defaults; unparseable ones are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };
        let defaults = Self::default();

        let session_secs: u32 = env.number("SESSION_TTL_SECS", 86_400)?;
        let cors_origins = match env.string("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        Ok(Self {
            host: env.string("HOST").unwrap_or(defaults.host),
            port: env.number("PORT", defaults.port)?,
            jwt_secret: env.string("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            session_ttl: Duration::seconds(i64::from(session_secs)),
            upload_dir: env
                .string("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_image_bytes: env.number("MAX_IMAGE_BYTES", defaults.max_image_bytes)?,
            cors_origins,
            actor_buffer: env.number("ACTOR_BUFFER", defaults.actor_buffer)?,
            invoice_max_attempts: env.number("INVOICE_MAX_ATTEMPTS", defaults.invoice_max_attempts)?,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
