// SPDX-License-Identifier: Apache-2.0

use chrono::{Duration as ChronoDuration, Utc};
use rural_esg_model::UpsertUser;
use rural_esg_server::{build_router, AppState};
use rural_esg_store::SqliteStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(cookie) = cookie {
        req.push_str(&format!("Cookie: {cookie}\r\n"));
    }
    if let Some(body) = body {
        req.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\n",
            body.len()
        ));
    }
    req.push_str("\r\n");
    if let Some(body) = body {
        req.push_str(body);
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, head.to_string(), body.to_string())
}

async fn get(addr: std::net::SocketAddr, path: &str) -> (u16, String, String) {
    send_raw(addr, "GET", path, None, None).await
}

fn submission(property_name: &str, value: u8) -> Value {
    let answers: serde_json::Map<String, Value> = (1..=41)
        .map(|id: u16| (id.to_string(), Value::from(u64::from(value))))
        .collect();
    let per_question = u64::from(value);
    let classification = match value {
        1 => "REATIVA",
        2 => "NORMATIVA",
        _ => "PROATIVA",
    };
    json!({
        "propertyName": property_name,
        "answers": answers,
        "environmentalScore": 25 * per_question,
        "socialScore": 8 * per_question,
        "governanceScore": 8 * per_question,
        "environmentalClassification": classification,
        "socialClassification": classification,
        "governanceClassification": classification,
    })
}

struct TestServer {
    addr: std::net::SocketAddr,
    store: Arc<SqliteStore>,
    _tmp: tempfile::TempDir,
}

async fn spawn_server() -> TestServer {
    let tmp = tempdir().expect("tempdir");
    let store =
        Arc::new(SqliteStore::open(&tmp.path().join("esg.sqlite")).expect("open store"));
    let app = build_router(AppState::new(store.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    TestServer {
        addr,
        store,
        _tmp: tmp,
    }
}

fn seed_session(store: &SqliteStore, sid: &str, user_id: &str) {
    store
        .upsert_user(
            &UpsertUser {
                id: user_id.to_string(),
                email: Some("gestor@example.com".to_string()),
                first_name: Some("Ana".to_string()),
                last_name: Some("Souza".to_string()),
                profile_image_url: None,
            },
            Utc::now(),
        )
        .expect("seed user");
    store
        .create_session(
            sid,
            &json!({"user_id": user_id}),
            Utc::now() + ChronoDuration::hours(1),
        )
        .expect("seed session");
}

#[tokio::test]
async fn golden_public_endpoints_return_stable_shapes() {
    let server = spawn_server().await;

    let (status, _, body) = get(server.addr, "/healthz").await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");

    let (status, _, body) = get(server.addr, "/readyz").await;
    assert_eq!(status, 200);
    assert_eq!(body, "ready");

    let (status, _, body) = get(server.addr, "/v1/version").await;
    assert_eq!(status, 200);
    let version: Value = serde_json::from_str(&body).expect("version json");
    assert_eq!(version["api_version"], "v1");
    assert_eq!(version["service"]["crate"], "rural-esg-server");

    let (status, head, body) = get(server.addr, "/api/questions").await;
    assert_eq!(status, 200);
    assert!(head.to_lowercase().contains("etag:"));
    let catalog: Value = serde_json::from_str(&body).expect("questions json");
    let items = catalog.as_array().expect("question array");
    assert_eq!(items.len(), 41);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[0]["dimension"], "environmental");
    assert_eq!(items[40]["dimension"], "governance");

    let (status, _, body) = get(server.addr, "/metrics").await;
    assert_eq!(status, 200);
    assert!(body.contains("esg_http_requests_total"));
    assert!(body.contains("route=\"/healthz\""));
}

#[tokio::test]
async fn evaluation_submission_is_verified_server_side() {
    let server = spawn_server().await;

    let valid = submission("Fazenda Santa Clara", 3).to_string();
    let (status, _, body) =
        send_raw(server.addr, "POST", "/api/evaluations", None, Some(&valid)).await;
    assert_eq!(status, 201);
    let created: Value = serde_json::from_str(&body).expect("created json");
    assert_eq!(created["propertyName"], "Fazenda Santa Clara");
    assert_eq!(created["environmentalScore"], 75);
    assert_eq!(created["environmentalClassification"], "PROATIVA");
    assert!(created["id"].as_i64().expect("id") >= 1);

    // Client-supplied scores that disagree with the answers are rejected.
    let mut forged = submission("Fazenda Santa Clara", 1);
    forged["environmentalScore"] = json!(75);
    forged["environmentalClassification"] = json!("PROATIVA");
    let (status, _, body) = send_raw(
        server.addr,
        "POST",
        "/api/evaluations",
        None,
        Some(&forged.to_string()),
    )
    .await;
    assert_eq!(status, 400);
    let err: Value = serde_json::from_str(&body).expect("error json");
    assert_eq!(err["error"]["code"], "ValidationFailed");

    let mut incomplete = submission("Fazenda Santa Clara", 2);
    incomplete["answers"].as_object_mut().expect("answers").remove("17");
    let (status, _, _) = send_raw(
        server.addr,
        "POST",
        "/api/evaluations",
        None,
        Some(&incomplete.to_string()),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _, _) =
        send_raw(server.addr, "POST", "/api/evaluations", None, Some("{not json")).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn dashboard_reads_require_a_session() {
    let server = spawn_server().await;

    for path in [
        "/api/evaluations",
        "/api/evaluations/stats",
        "/api/evaluations/1",
        "/api/auth/user",
    ] {
        let (status, _, body) = get(server.addr, path).await;
        assert_eq!(status, 401, "{path} must be gated");
        let err: Value = serde_json::from_str(&body).expect("error json");
        assert_eq!(err["error"]["code"], "Unauthorized");
    }

    let (status, _, _) = send_raw(
        server.addr,
        "GET",
        "/api/evaluations",
        Some("esg_sid=not-a-session"),
        None,
    )
    .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn session_holders_can_read_evaluations_and_stats() {
    let server = spawn_server().await;
    seed_session(&server.store, "it-session", "user-1");
    let cookie = Some("esg_sid=it-session");

    let body = submission("Sitio Boa Vista", 2).to_string();
    let (status, _, created) =
        send_raw(server.addr, "POST", "/api/evaluations", None, Some(&body)).await;
    assert_eq!(status, 201);
    let created: Value = serde_json::from_str(&created).expect("created json");
    let id = created["id"].as_i64().expect("id");

    let (status, _, body) =
        send_raw(server.addr, "GET", "/api/evaluations", cookie, None).await;
    assert_eq!(status, 200);
    let listed: Value = serde_json::from_str(&body).expect("list json");
    let items = listed.as_array().expect("list array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id);

    let (status, _, body) = send_raw(
        server.addr,
        "GET",
        "/api/evaluations?search=boa+vista&period=month",
        cookie,
        None,
    )
    .await;
    assert_eq!(status, 200);
    let filtered: Value = serde_json::from_str(&body).expect("filtered json");
    assert_eq!(filtered.as_array().expect("filtered array").len(), 1);

    let (status, _, _) = send_raw(
        server.addr,
        "GET",
        "/api/evaluations?period=fortnight",
        cookie,
        None,
    )
    .await;
    assert_eq!(status, 400);

    let (status, _, body) = send_raw(
        server.addr,
        "GET",
        "/api/evaluations/stats",
        cookie,
        None,
    )
    .await;
    assert_eq!(status, 200);
    let stats: Value = serde_json::from_str(&body).expect("stats json");
    assert_eq!(stats["totalEvaluations"], 1);
    assert_eq!(stats["uniqueProperties"], 1);
    assert_eq!(stats["avgEnvironmentalScore"], 50);
    assert_eq!(stats["thisMonth"], 1);

    let (status, _, body) = send_raw(
        server.addr,
        "GET",
        &format!("/api/evaluations/{id}"),
        cookie,
        None,
    )
    .await;
    assert_eq!(status, 200);
    let fetched: Value = serde_json::from_str(&body).expect("evaluation json");
    assert_eq!(fetched["propertyName"], "Sitio Boa Vista");

    let (status, _, _) =
        send_raw(server.addr, "GET", "/api/evaluations/abc", cookie, None).await;
    assert_eq!(status, 400);

    let (status, _, _) =
        send_raw(server.addr, "GET", "/api/evaluations/99999", cookie, None).await;
    assert_eq!(status, 404);

    let (status, _, body) =
        send_raw(server.addr, "GET", "/api/auth/user", cookie, None).await;
    assert_eq!(status, 200);
    let user: Value = serde_json::from_str(&body).expect("user json");
    assert_eq!(user["id"], "user-1");
    assert_eq!(user["email"], "gestor@example.com");
}

#[tokio::test]
async fn logout_clears_the_session() {
    let server = spawn_server().await;
    seed_session(&server.store, "logout-session", "user-2");
    let cookie = Some("esg_sid=logout-session");

    let (status, _, _) = send_raw(server.addr, "GET", "/api/auth/user", cookie, None).await;
    assert_eq!(status, 200);

    let (status, head, _) = send_raw(server.addr, "GET", "/api/logout", cookie, None).await;
    assert_eq!(status, 303);
    assert!(head.to_lowercase().contains("set-cookie: esg_sid=;"));

    let (status, _, _) = send_raw(server.addr, "GET", "/api/auth/user", cookie, None).await;
    assert_eq!(status, 401);
}
