// SPDX-License-Identifier: Apache-2.0

use crate::*;

const METRIC_SUBSYSTEM: &str = "esg";
const METRIC_VERSION: &str = env!("CARGO_PKG_VERSION");

fn percentile_ns(values: &[u64], pct: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut v = values.to_vec();
    v.sort_unstable();
    let idx = ((v.len() as f64 - 1.0) * pct).round() as usize;
    v[idx]
}

#[derive(Default)]
pub(crate) struct RequestMetrics {
    pub(crate) counts: Mutex<HashMap<(String, u16), u64>>,
    pub(crate) latency_ns: Mutex<HashMap<String, Vec<u64>>>,
}

impl RequestMetrics {
    pub(crate) async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        latency_map
            .entry(route.to_string())
            .or_default()
            .push(latency.as_nanos() as u64);
    }
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = http::handlers::make_request_id(&state);
    let started = Instant::now();

    let counts = state.metrics.counts.lock().await.clone();
    let mut count_lines: Vec<_> = counts.into_iter().collect();
    count_lines.sort_by(|a, b| a.0.cmp(&b.0));
    let mut body = String::new();
    for ((route, status), count) in count_lines {
        body.push_str(&format!(
            "esg_http_requests_total{{subsystem=\"{METRIC_SUBSYSTEM}\",version=\"{METRIC_VERSION}\",route=\"{route}\",status=\"{status}\"}} {count}\n"
        ));
    }
    let latencies = state.metrics.latency_ns.lock().await.clone();
    let mut latency_lines: Vec<_> = latencies.into_iter().collect();
    latency_lines.sort_by(|a, b| a.0.cmp(&b.0));
    for (route, vals) in latency_lines {
        body.push_str(&format!(
            "esg_http_request_latency_p95_seconds{{subsystem=\"{METRIC_SUBSYSTEM}\",version=\"{METRIC_VERSION}\",route=\"{route}\"}} {:.6}\n",
            percentile_ns(&vals, 0.95) as f64 / 1_000_000_000.0
        ));
    }

    let resp = (StatusCode::OK, body).into_response();
    state
        .metrics
        .observe_request("/metrics", StatusCode::OK, started.elapsed())
        .await;
    http::handlers::with_request_id(resp, &request_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_of_empty_sample_is_zero() {
        assert_eq!(percentile_ns(&[], 0.95), 0);
    }

    #[test]
    fn percentile_picks_from_sorted_samples() {
        let mut samples: Vec<u64> = (1..=100).collect();
        samples.reverse();
        assert_eq!(percentile_ns(&samples, 0.95), 95);
        assert_eq!(percentile_ns(&samples, 0.0), 1);
        assert_eq!(percentile_ns(&samples, 1.0), 100);
    }

    #[tokio::test]
    async fn observe_request_accumulates_per_route_and_status() {
        let metrics = RequestMetrics::default();
        metrics
            .observe_request("/api/evaluations", StatusCode::CREATED, Duration::from_millis(3))
            .await;
        metrics
            .observe_request("/api/evaluations", StatusCode::CREATED, Duration::from_millis(5))
            .await;
        metrics
            .observe_request("/api/evaluations", StatusCode::BAD_REQUEST, Duration::from_millis(1))
            .await;
        let counts = metrics.counts.lock().await;
        assert_eq!(counts[&("/api/evaluations".to_string(), 201)], 2);
        assert_eq!(counts[&("/api/evaluations".to_string(), 400)], 1);
        drop(counts);
        let latencies = metrics.latency_ns.lock().await;
        assert_eq!(latencies["/api/evaluations"].len(), 3);
    }
}
