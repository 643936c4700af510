// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use chrono::Utc;
use rural_esg_server::{
    build_router, validate_startup_config_contract, ApiConfig, AppState, AuthConfig,
};
use rural_esg_store::SqliteStore;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("ESG_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env_string("ESG_BIND", "0.0.0.0:8080");
    let db_path = PathBuf::from(env_string("ESG_DATABASE_PATH", "data/esg.sqlite"));

    let api_cfg = ApiConfig {
        max_body_bytes: env_usize("ESG_MAX_BODY_BYTES", 64 * 1024),
        session_ttl: Duration::from_secs(env_u64("ESG_SESSION_TTL_SECS", 7 * 24 * 60 * 60)),
        session_purge_interval: env_duration_ms("ESG_SESSION_PURGE_INTERVAL_MS", 60_000),
        cookie_name: env_string("ESG_COOKIE_NAME", "esg_sid"),
        cookie_secure: env_bool("ESG_COOKIE_SECURE", false),
    };
    let auth_defaults = AuthConfig::default();
    let auth_cfg = AuthConfig {
        authorize_url: env_string("ESG_OIDC_AUTHORIZE_URL", &auth_defaults.authorize_url),
        token_url: env_string("ESG_OIDC_TOKEN_URL", &auth_defaults.token_url),
        userinfo_url: env_string("ESG_OIDC_USERINFO_URL", &auth_defaults.userinfo_url),
        client_id: env_string("ESG_OIDC_CLIENT_ID", &auth_defaults.client_id),
        client_secret: env_string("ESG_OIDC_CLIENT_SECRET", &auth_defaults.client_secret),
        callback_url: env_string("ESG_OIDC_CALLBACK_URL", &auth_defaults.callback_url),
        state_secret: env_string("ESG_STATE_SECRET", &auth_defaults.state_secret),
        post_login_redirect: env_string(
            "ESG_POST_LOGIN_REDIRECT",
            &auth_defaults.post_login_redirect,
        ),
    };
    validate_startup_config_contract(&api_cfg, &auth_cfg)?;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
        }
    }
    let store = Arc::new(
        SqliteStore::open(&db_path)
            .map_err(|e| format!("cannot open store at {}: {e}", db_path.display()))?,
    );
    info!("store opened at {}", db_path.display());

    let state = AppState::with_config(store.clone(), api_cfg, auth_cfg);
    let app = build_router(state.clone());

    let purge_interval = state.api.session_purge_interval;
    let store_bg = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_interval);
        loop {
            interval.tick().await;
            match store_bg.purge_expired_sessions(Utc::now()) {
                Ok(0) => {}
                Ok(purged) => info!("purged {purged} expired sessions"),
                Err(e) => error!("session purge failed: {e}"),
            }
        }
    });

    let addr: std::net::SocketAddr = bind_addr
        .parse()
        .map_err(|e| format!("invalid bind addr {bind_addr}: {e}"))?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().map_err(|e| format!("socket v4 failed: {e}"))?
    } else {
        tokio::net::TcpSocket::new_v6().map_err(|e| format!("socket v6 failed: {e}"))?
    };
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket
        .set_keepalive(env_bool("ESG_TCP_KEEPALIVE_ENABLED", true))
        .map_err(|e| format!("set_keepalive failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    let listener: TcpListener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;
    info!("rural-esg-server listening on {bind_addr}");

    let accepting = state.accepting_requests.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            // Fail readiness first so load balancers stop routing here,
            // then drain the in-flight requests.
            accepting.store(false, Ordering::Relaxed);
            let drain_ms = env_u64("ESG_SHUTDOWN_DRAIN_MS", 5000);
            tokio::time::sleep(Duration::from_millis(drain_ms)).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
