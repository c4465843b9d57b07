//! Client configuration resolved at startup.
//!
//! Configuration priority: explicit construction > environment variables >
//! development defaults. The development auth bypass is a compile-time cargo
//! feature (`dev-auth`), so release artifacts built without it carry no
//! bypass code path at all.

use serde::{Deserialize, Serialize};
use std::env;

/// Fallback API origin for local development, where the dev server
/// reverse-proxies API calls to the same origin.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

/// Environment variable naming the backend API origin.
pub const API_BASE_ENV: &str = "EDUPATH_API_BASE";

/// Environment variable naming the fixed dev-bypass user id.
#[cfg(feature = "dev-auth")]
pub const DEV_USER_ID_ENV: &str = "EDUPATH_DEV_USER_ID";

/// Development-only auth bypass settings.
///
/// Only exists when the `dev-auth` feature is enabled.
#[cfg(feature = "dev-auth")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevAuth {
    /// Fixed user id the bypass session is synthesized with.
    pub user_id: String,
    /// User type reported for the synthesized session.
    pub user_type: String,
}

/// Runtime configuration consumed by the client core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend API origin, without a trailing slash.
    pub api_base: String,

    /// Development auth bypass; `None` leaves bootstrap on the normal
    /// cookie-based path even in dev builds.
    #[cfg(feature = "dev-auth")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_auth: Option<DevAuth>,
}

impl ClientConfig {
    /// Creates a configuration with the given API origin.
    pub fn new(api_base: impl Into<String>) -> Self {
        let mut api_base = api_base.into();
        while api_base.ends_with('/') {
            api_base.pop();
        }
        Self {
            api_base,
            #[cfg(feature = "dev-auth")]
            dev_auth: None,
        }
    }

    /// Resolves configuration from the environment.
    ///
    /// Falls back to [`DEFAULT_API_BASE`] when `EDUPATH_API_BASE` is unset,
    /// matching the same-origin reverse-proxy setup used in development.
    pub fn from_env() -> Self {
        let api_base =
            env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        #[allow(unused_mut)]
        let mut config = Self::new(api_base);

        #[cfg(feature = "dev-auth")]
        {
            config.dev_auth = env::var(DEV_USER_ID_ENV).ok().map(|user_id| DevAuth {
                user_id,
                user_type: "student".to_string(),
            });
        }

        config
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}
