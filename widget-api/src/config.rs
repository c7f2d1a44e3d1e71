//! API Configuration Module
//!
//! Listener, CORS and read-policy settings. Configuration is loaded from
//! environment variables with defaults suitable for local development.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

/// Default listener port.
pub const DEFAULT_PORT: u16 = 8888;

// ============================================================================
// MALFORMED RECORD POLICY
// ============================================================================

/// What multi-row reads do with stored rows that fail to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedRecordPolicy {
    /// Drop the row from the response and log a warning.
    #[default]
    Skip,
    /// Fail the whole request with `MALFORMED_RECORD`.
    Fail,
}

impl FromStr for MalformedRecordPolicy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(ApiError::invalid_input(format!(
                "Unknown malformed record policy '{}', expected 'skip' or 'fail'",
                other
            ))),
        }
    }
}

impl fmt::Display for MalformedRecordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind.
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// How multi-row reads treat undecodable rows.
    pub malformed_records: MalformedRecordPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
            malformed_records: MalformedRecordPolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `WIDGET_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` or `WIDGET_API_PORT`: Listener port (default: 8888)
    /// - `WIDGET_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `WIDGET_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `WIDGET_MALFORMED_RECORDS`: `skip` or `fail` (default: skip)
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();

        let bind_host = std::env::var("WIDGET_API_BIND").unwrap_or(defaults.bind_host);

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("WIDGET_API_PORT").ok())
        {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => defaults.port,
        };

        let cors_origins = std::env::var("WIDGET_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("WIDGET_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let malformed_records = match std::env::var("WIDGET_MALFORMED_RECORDS") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.malformed_records,
        };

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            cors_max_age_secs,
            malformed_records,
        })
    }

    /// The socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8888);
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.malformed_records, MalformedRecordPolicy::Skip);
    }

    #[test]
    fn test_bind_addr() -> ApiResult<()> {
        let config = ApiConfig {
            bind_host: "127.0.0.1".to_string(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.bind_addr()?.to_string(), "127.0.0.1:9000");
        Ok(())
    }

    #[test]
    fn test_bad_bind_host_is_rejected() {
        let config = ApiConfig {
            bind_host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("skip".parse::<MalformedRecordPolicy>().ok(), Some(MalformedRecordPolicy::Skip));
        assert_eq!(" FAIL ".parse::<MalformedRecordPolicy>().ok(), Some(MalformedRecordPolicy::Fail));
        assert!("ignore".parse::<MalformedRecordPolicy>().is_err());
        assert_eq!(MalformedRecordPolicy::Fail.to_string(), "fail");
    }
}
