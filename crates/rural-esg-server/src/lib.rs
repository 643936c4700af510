// SPDX-License-Identifier: Apache-2.0

//! HTTP service for rural-property ESG evaluations.
//!
//! Public surface: evaluation submission and the fixed question catalog.
//! Dashboard reads sit behind a session cookie issued by the OIDC login
//! flow. All persistence goes through [`rural_esg_store::SqliteStore`].

#![forbid(unsafe_code)]

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rural_esg_api::{
    map_error, parse_list_evaluations_params, ApiError, CreateEvaluationDto, EvaluationDto,
    QuestionDto, StatsDto, UserDto, API_VERSION,
};
use rural_esg_model::{questions, UpsertUser};
use rural_esg_store::{EvaluationFilter, SqliteStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

mod auth;
pub mod config;
mod http;
mod telemetry;

pub use config::{validate_startup_config_contract, ApiConfig, AuthConfig};

use telemetry::metrics::RequestMetrics;

pub const CRATE_NAME: &str = "rural-esg-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub ready: Arc<AtomicBool>,
    pub accepting_requests: Arc<AtomicBool>,
    pub(crate) metrics: Arc<RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
    pub(crate) http_client: reqwest::Client,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self::with_config(store, ApiConfig::default(), AuthConfig::default())
    }

    #[must_use]
    pub fn with_config(store: Arc<SqliteStore>, api: ApiConfig, auth: AuthConfig) -> Self {
        Self {
            store,
            api,
            auth,
            ready: Arc::new(AtomicBool::new(true)),
            accepting_requests: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            http_client: reqwest::Client::new(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handlers::landing_handler))
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(telemetry::metrics::metrics_handler))
        .route("/v1/version", get(http::handlers::version_handler))
        .route("/api/questions", get(http::handlers::questions_handler))
        .route(
            "/api/evaluations",
            post(http::handlers::create_evaluation_handler)
                .get(http::handlers::list_evaluations_handler),
        )
        .route(
            "/api/evaluations/stats",
            get(http::handlers::stats_handler),
        )
        .route(
            "/api/evaluations/:id",
            get(http::handlers::get_evaluation_handler),
        )
        .route("/api/auth/user", get(auth::current_user_handler))
        .route("/api/login", get(auth::login_handler))
        .route("/api/callback", get(auth::callback_handler))
        .route("/api/logout", get(auth::logout_handler))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
