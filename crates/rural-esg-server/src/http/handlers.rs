// SPDX-License-Identifier: Apache-2.0

use crate::auth::require_session;
use crate::*;
use axum::extract::rejection::JsonRejection;
use sha2::{Digest, Sha256};

pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    (status, Json(json!({"error": err}))).into_response()
}

pub(crate) fn error_status(err: &ApiError) -> StatusCode {
    StatusCode::from_u16(map_error(err)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub(crate) fn store_failure(err: &rural_esg_store::StoreError) -> ApiError {
    tracing::error!("store failure: {err}");
    ApiError::internal("storage failure")
}

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

pub(crate) async fn finish(
    state: &AppState,
    route: &'static str,
    started: Instant,
    request_id: &str,
    resp: Response,
) -> Response {
    state
        .metrics
        .observe_request(route, resp.status(), started.elapsed())
        .await;
    with_request_id(resp, request_id)
}

fn is_draining(state: &AppState) -> bool {
    !state.accepting_requests.load(Ordering::Relaxed)
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn if_none_match(headers: &HeaderMap) -> Option<String> {
    headers
        .get("if-none-match")
        .and_then(|v| v.to_str().ok())
        .map(std::string::ToString::to_string)
}

pub(crate) async fn landing_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let html = format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Rural ESG</title></head><body>\
<h1>Rural ESG Evaluation Service</h1>\
<p>Version: <code>{}</code></p>\
<h2>Endpoints</h2>\
<ul>\
<li><a href=\"/api/questions\">/api/questions</a></li>\
<li><code>POST /api/evaluations</code></li>\
<li><a href=\"/api/evaluations\">/api/evaluations</a> (requires login)</li>\
<li><a href=\"/api/evaluations/stats\">/api/evaluations/stats</a> (requires login)</li>\
<li><a href=\"/api/login\">/api/login</a></li>\
<li><a href=\"/healthz\">/healthz</a> | <a href=\"/readyz\">/readyz</a> | <a href=\"/metrics\">/metrics</a> | <a href=\"/v1/version\">/v1/version</a></li>\
</ul>\
</body></html>",
        env!("CARGO_PKG_VERSION"),
    );
    let mut resp = Response::new(Body::from(html));
    resp.headers_mut().insert(
        "content-type",
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    finish(&state, "/", started, &request_id, resp).await
}

pub(crate) async fn healthz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let resp = (StatusCode::OK, "ok").into_response();
    finish(&state, "/healthz", started, &request_id, resp).await
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let resp = if state.ready.load(Ordering::Relaxed) && !is_draining(&state) {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
    };
    finish(&state, "/readyz", started, &request_id, resp).await
}

pub(crate) async fn version_handler(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let payload = json!({
        "api_version": API_VERSION,
        "service": {
            "crate": CRATE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "config_schema_version": config::CONFIG_SCHEMA_VERSION,
        }
    });
    let mut resp = Json(payload).into_response();
    if let Ok(value) = HeaderValue::from_str("public, max-age=30") {
        resp.headers_mut().insert("cache-control", value);
    }
    finish(&state, "/v1/version", started, &request_id, resp).await
}

/// The catalog is a compile-time constant, so the ETag is stable for a
/// given build and revalidation is free.
pub(crate) async fn questions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let items: Vec<QuestionDto> = questions().iter().map(QuestionDto::from).collect();
    let resp = match serde_json::to_vec(&items) {
        Ok(bytes) => {
            let etag = format!("\"{}\"", sha256_hex(&bytes));
            if if_none_match(&headers).as_deref() == Some(etag.as_str()) {
                let mut resp = StatusCode::NOT_MODIFIED.into_response();
                if let Ok(v) = HeaderValue::from_str(&etag) {
                    resp.headers_mut().insert("etag", v);
                }
                resp
            } else {
                let mut resp = Response::new(Body::from(bytes));
                resp.headers_mut()
                    .insert("content-type", HeaderValue::from_static("application/json"));
                if let Ok(v) = HeaderValue::from_str(&etag) {
                    resp.headers_mut().insert("etag", v);
                }
                resp
            }
        }
        Err(e) => {
            let err = ApiError::internal(&format!("json serialization failed: {e}"));
            api_error_response(error_status(&err), err)
        }
    };
    finish(&state, "/api/questions", started, &request_id, resp).await
}

pub(crate) async fn create_evaluation_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateEvaluationDto>, JsonRejection>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    if is_draining(&state) {
        let resp = api_error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::internal("server is draining"),
        );
        return finish(&state, "/api/evaluations", started, &request_id, resp).await;
    }
    let resp = match create_evaluation(&state, body) {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => api_error_response(error_status(&err), err),
    };
    finish(&state, "/api/evaluations", started, &request_id, resp).await
}

fn create_evaluation(
    state: &AppState,
    body: Result<Json<CreateEvaluationDto>, JsonRejection>,
) -> Result<EvaluationDto, ApiError> {
    let Json(dto) = body.map_err(|rejection| {
        ApiError::validation_failed(json!([
            {"field": "body", "reason": rejection.body_text()}
        ]))
    })?;
    let new = dto.validate()?;
    let stored = state
        .store
        .create_evaluation(&new, Utc::now())
        .map_err(|e| store_failure(&e))?;
    tracing::info!(
        id = stored.id,
        property_name = %stored.property_name,
        "evaluation created"
    );
    Ok(EvaluationDto::from(stored))
}

pub(crate) async fn list_evaluations_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(raw): Query<BTreeMap<String, String>>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match list_evaluations(&state, &headers, &raw) {
        Ok(items) => Json(items).into_response(),
        Err(err) => api_error_response(error_status(&err), err),
    };
    finish(&state, "/api/evaluations", started, &request_id, resp).await
}

fn list_evaluations(
    state: &AppState,
    headers: &HeaderMap,
    raw: &BTreeMap<String, String>,
) -> Result<Vec<EvaluationDto>, ApiError> {
    require_session(state, headers)?;
    let params = parse_list_evaluations_params(raw)?;
    let filter = EvaluationFilter {
        search: params.search,
        cutoff: params.period.cutoff(Utc::now()),
    };
    let rows = state
        .store
        .list_evaluations(&filter)
        .map_err(|e| store_failure(&e))?;
    Ok(rows.into_iter().map(EvaluationDto::from).collect())
}

pub(crate) async fn stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match evaluation_stats(&state, &headers) {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => api_error_response(error_status(&err), err),
    };
    finish(&state, "/api/evaluations/stats", started, &request_id, resp).await
}

fn evaluation_stats(state: &AppState, headers: &HeaderMap) -> Result<StatsDto, ApiError> {
    require_session(state, headers)?;
    let stats = state
        .store
        .evaluation_stats(Utc::now())
        .map_err(|e| store_failure(&e))?;
    Ok(StatsDto::from(stats))
}

pub(crate) async fn get_evaluation_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::extract::Path(raw_id): axum::extract::Path<String>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match get_evaluation(&state, &headers, &raw_id) {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => api_error_response(error_status(&err), err),
    };
    finish(&state, "/api/evaluations/:id", started, &request_id, resp).await
}

fn get_evaluation(
    state: &AppState,
    headers: &HeaderMap,
    raw_id: &str,
) -> Result<EvaluationDto, ApiError> {
    require_session(state, headers)?;
    let id: i64 = raw_id
        .parse()
        .map_err(|_| ApiError::invalid_param("id", raw_id))?;
    let record = state
        .store
        .get_evaluation(id)
        .map_err(|e| store_failure(&e))?
        .ok_or_else(|| ApiError::not_found("evaluation"))?;
    Ok(EvaluationDto::from(record))
}
