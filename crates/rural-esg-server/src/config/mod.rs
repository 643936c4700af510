// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub session_ttl: Duration,
    pub session_purge_interval: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            session_purge_interval: Duration::from_secs(60),
            cookie_name: "esg_sid".to_string(),
            cookie_secure: false,
        }
    }
}

/// OIDC endpoints and client credentials. Any standards-compliant
/// provider works; the defaults only make `AppState` constructible in
/// tests and are useless against a real identity provider.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub state_secret: String,
    pub post_login_redirect: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authorize_url: "http://localhost:9000/authorize".to_string(),
            token_url: "http://localhost:9000/token".to_string(),
            userinfo_url: "http://localhost:9000/userinfo".to_string(),
            client_id: "rural-esg".to_string(),
            client_secret: String::new(),
            callback_url: "http://localhost:8080/api/callback".to_string(),
            state_secret: "dev-state-secret".to_string(),
            post_login_redirect: "/".to_string(),
        }
    }
}

pub fn validate_startup_config_contract(api: &ApiConfig, auth: &AuthConfig) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("max_body_bytes must be > 0".to_string());
    }
    if api.session_ttl.is_zero() || api.session_purge_interval.is_zero() {
        return Err("session ttl and purge interval must be > 0".to_string());
    }
    if api.cookie_name.is_empty() {
        return Err("cookie_name must not be empty".to_string());
    }
    if auth.state_secret.is_empty() {
        return Err("state_secret must not be empty".to_string());
    }
    if api.cookie_secure && !auth.callback_url.starts_with("https://") {
        return Err("cookie_secure=true requires an https callback_url".to_string());
    }
    Ok(())
}
