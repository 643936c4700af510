// SPDX-License-Identifier: Apache-2.0

//! Session-cookie authentication and the OIDC login flow.
//!
//! Sessions live server-side in the store; the cookie carries only an
//! opaque id. The login `state` parameter is an HMAC-signed timestamped
//! token, so the callback accepts only redirects this server initiated.

use crate::http::handlers::{
    api_error_response, error_status, finish, propagated_request_id, store_failure,
};
use crate::*;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const LOGIN_STATE_MAX_AGE_SECS: i64 = 600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LoginState {
    pub issued_at: i64,
    pub nonce: String,
}

pub(crate) fn encode_login_state(payload: &LoginState, secret: &[u8]) -> Result<String, ApiError> {
    let bytes = serde_json::to_vec(payload)
        .map_err(|_| ApiError::internal("cannot encode login state"))?;
    let payload_part = URL_SAFE_NO_PAD.encode(bytes);
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| ApiError::internal("invalid state secret"))?;
    mac.update(payload_part.as_bytes());
    let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{payload_part}.{sig_part}"))
}

/// The signature is checked before the payload is parsed; expired and
/// future-dated tokens are rejected the same way as forged ones.
pub(crate) fn decode_login_state(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<LoginState, ApiError> {
    let reject = || ApiError::invalid_param("state", "unverifiable");
    let (payload_part, sig_part) = token.split_once('.').ok_or_else(reject)?;
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| reject())?;
    mac.update(payload_part.as_bytes());
    let sig = URL_SAFE_NO_PAD.decode(sig_part).map_err(|_| reject())?;
    mac.verify_slice(&sig).map_err(|_| reject())?;
    let bytes = URL_SAFE_NO_PAD.decode(payload_part).map_err(|_| reject())?;
    let payload: LoginState = serde_json::from_slice(&bytes).map_err(|_| reject())?;
    let age = now.timestamp() - payload.issued_at;
    if !(0..=LOGIN_STATE_MAX_AGE_SECS).contains(&age) {
        return Err(reject());
    }
    Ok(payload)
}

pub(crate) fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    for pair in raw.split(';') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        if key == name && !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

pub(crate) struct AuthSession {
    pub(crate) user_id: String,
}

/// Unknown, expired and malformed sessions all collapse into the same
/// opaque 401.
pub(crate) fn require_session(state: &AppState, headers: &HeaderMap) -> Result<AuthSession, ApiError> {
    let sid = session_cookie(headers, &state.api.cookie_name).ok_or_else(ApiError::unauthorized)?;
    let record = state
        .store
        .get_session(&sid, Utc::now())
        .map_err(|e| store_failure(&e))?
        .ok_or_else(ApiError::unauthorized)?;
    let user_id = record
        .sess
        .get("user_id")
        .and_then(Value::as_str)
        .ok_or_else(ApiError::unauthorized)?;
    Ok(AuthSession {
        user_id: user_id.to_string(),
    })
}

fn session_cookie_header(api: &ApiConfig, sid: &str, max_age_secs: u64) -> String {
    let mut cookie = format!(
        "{}={sid}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}",
        api.cookie_name
    );
    if api.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn set_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(cookie) {
        response.headers_mut().insert("set-cookie", v);
    }
    response
}

pub(crate) async fn current_user_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match current_user(&state, &headers) {
        Ok(user) => Json(UserDto::from(user)).into_response(),
        Err(err) => api_error_response(error_status(&err), err),
    };
    finish(&state, "/api/auth/user", started, &request_id, resp).await
}

fn current_user(state: &AppState, headers: &HeaderMap) -> Result<rural_esg_model::User, ApiError> {
    let session = require_session(state, headers)?;
    state
        .store
        .get_user(&session.user_id)
        .map_err(|e| store_failure(&e))?
        // The user row is gone; the session is stale.
        .ok_or_else(ApiError::unauthorized)
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let login_state = LoginState {
        issued_at: Utc::now().timestamp(),
        nonce: Uuid::new_v4().to_string(),
    };
    let resp = match encode_login_state(&login_state, state.auth.state_secret.as_bytes()) {
        Ok(token) => {
            let url = format!(
                "{}?response_type=code&client_id={}&redirect_uri={}&scope=openid%20email%20profile&state={token}",
                state.auth.authorize_url,
                urlencoding::encode(&state.auth.client_id),
                urlencoding::encode(&state.auth.callback_url),
            );
            Redirect::temporary(&url).into_response()
        }
        Err(err) => api_error_response(error_status(&err), err),
    };
    finish(&state, "/api/login", started, &request_id, resp).await
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoClaims {
    sub: String,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

async fn exchange_code(state: &AppState, code: &str) -> Result<UserInfoClaims, ApiError> {
    let provider_failure = |context: &str, e: reqwest::Error| {
        tracing::error!("{context} failed: {e}");
        ApiError::internal("identity provider unavailable")
    };
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", state.auth.client_id.as_str()),
        ("client_secret", state.auth.client_secret.as_str()),
        ("redirect_uri", state.auth.callback_url.as_str()),
    ];
    let token: TokenResponse = state
        .http_client
        .post(&state.auth.token_url)
        .form(&form)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| provider_failure("token exchange", e))?
        .json()
        .await
        .map_err(|e| provider_failure("token decode", e))?;
    state
        .http_client
        .get(&state.auth.userinfo_url)
        .bearer_auth(&token.access_token)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| provider_failure("userinfo fetch", e))?
        .json()
        .await
        .map_err(|e| provider_failure("userinfo decode", e))
}

async fn complete_login(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<Response, ApiError> {
    let token = params
        .get("state")
        .ok_or_else(|| ApiError::invalid_param("state", ""))?;
    decode_login_state(token, state.auth.state_secret.as_bytes(), Utc::now())?;
    let code = params
        .get("code")
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::invalid_param("code", ""))?;

    let claims = exchange_code(state, code).await?;
    let user = state
        .store
        .upsert_user(
            &UpsertUser {
                id: claims.sub,
                email: claims.email,
                first_name: claims.given_name,
                last_name: claims.family_name,
                profile_image_url: claims.picture,
            },
            Utc::now(),
        )
        .map_err(|e| store_failure(&e))?;

    let sid = Uuid::new_v4().to_string();
    let ttl_secs = state.api.session_ttl.as_secs();
    let expire = Utc::now() + chrono::Duration::seconds(ttl_secs as i64);
    state
        .store
        .create_session(&sid, &json!({"user_id": user.id}), expire)
        .map_err(|e| store_failure(&e))?;
    tracing::info!(user_id = %user.id, "login completed");

    let resp = Redirect::to(&state.auth.post_login_redirect).into_response();
    Ok(set_cookie(
        resp,
        &session_cookie_header(&state.api, &sid, ttl_secs),
    ))
}

pub(crate) async fn callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match complete_login(&state, &params).await {
        Ok(resp) => resp,
        Err(err) => api_error_response(error_status(&err), err),
    };
    finish(&state, "/api/callback", started, &request_id, resp).await
}

pub(crate) async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match logout(&state, &headers) {
        Ok(resp) => resp,
        Err(err) => api_error_response(error_status(&err), err),
    };
    finish(&state, "/api/logout", started, &request_id, resp).await
}

fn logout(state: &AppState, headers: &HeaderMap) -> Result<Response, ApiError> {
    if let Some(sid) = session_cookie(headers, &state.api.cookie_name) {
        state.store.delete_session(&sid).map_err(|e| store_failure(&e))?;
    }
    let resp = Redirect::to(&state.auth.post_login_redirect).into_response();
    Ok(set_cookie(
        resp,
        &session_cookie_header(&state.api, "", 0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &[u8] = b"unit-test-secret";

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn login_state_round_trips() {
        let payload = LoginState {
            issued_at: 1_000_000,
            nonce: "abc".to_string(),
        };
        let token = encode_login_state(&payload, SECRET).expect("encode");
        let decoded = decode_login_state(&token, SECRET, at(1_000_030)).expect("decode");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn tampered_login_state_is_rejected() {
        let payload = LoginState {
            issued_at: 1_000_000,
            nonce: "abc".to_string(),
        };
        let token = encode_login_state(&payload, SECRET).expect("encode");
        let mut forged = token.clone();
        forged.replace_range(0..1, "A");
        assert!(decode_login_state(&forged, SECRET, at(1_000_030)).is_err());
        assert!(decode_login_state(&token, b"other-secret", at(1_000_030)).is_err());
        assert!(decode_login_state("not-a-token", SECRET, at(1_000_030)).is_err());
    }

    #[test]
    fn expired_and_future_login_states_are_rejected() {
        let payload = LoginState {
            issued_at: 1_000_000,
            nonce: "abc".to_string(),
        };
        let token = encode_login_state(&payload, SECRET).expect("encode");
        assert!(decode_login_state(&token, SECRET, at(1_000_000 + 601)).is_err());
        assert!(decode_login_state(&token, SECRET, at(999_999)).is_err());
        assert!(decode_login_state(&token, SECRET, at(1_000_600)).is_ok());
    }

    #[test]
    fn session_cookie_is_extracted_by_name() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; esg_sid=abc123; lang=pt"),
        );
        assert_eq!(session_cookie(&headers, "esg_sid").as_deref(), Some("abc123"));
        assert_eq!(session_cookie(&headers, "sid"), None);
        assert_eq!(session_cookie(&HeaderMap::new(), "esg_sid"), None);
    }

    #[test]
    fn secure_flag_follows_config() {
        let api = ApiConfig::default();
        let cookie = session_cookie_header(&api, "abc", 3600);
        assert_eq!(cookie, "esg_sid=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600");
        let secure = ApiConfig {
            cookie_secure: true,
            ..ApiConfig::default()
        };
        assert!(session_cookie_header(&secure, "abc", 3600).ends_with("; Secure"));
    }
}
