// HTTP repository implementation against the population API
use crate::application::population_repository::{PopulationRepository, RequestError};
use crate::domain::filter::FilterDescriptor;
use crate::domain::metadata::Metadata;
use crate::domain::population::{LatestSnapshot, Sample};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpPopulationApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPopulationApi {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_history_url(&self, descriptor: &FilterDescriptor) -> String {
        format!("{}/api/history?{}", self.base_url, history_query(descriptor))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RequestError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let is_json = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.contains("application/json"));
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status.as_u16(), is_json, &body);
            tracing::debug!("{} failed with status {}: {}", url, status, message);
            return Err(RequestError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| RequestError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PopulationRepository for HttpPopulationApi {
    async fn fetch_metadata(&self) -> Result<Metadata, RequestError> {
        self.get_json(&format!("{}/api/metadata", self.base_url)).await
    }

    async fn fetch_latest(&self) -> Result<LatestSnapshot, RequestError> {
        self.get_json(&format!("{}/api/latest", self.base_url)).await
    }

    async fn fetch_history(&self, descriptor: &FilterDescriptor) -> Result<Vec<Sample>, RequestError> {
        let samples: Vec<Sample> = self.get_json(&self.build_history_url(descriptor)).await?;
        tracing::debug!("Received {} samples", samples.len());
        Ok(samples)
    }
}

/// Serialize the fields a descriptor actually sets.
///
/// Unset fields, zero step/limit and blank aggregation are left out so the
/// server applies its defaults. `is_f2p` goes out as `1`/`0`.
pub fn history_query(descriptor: &FilterDescriptor) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();

    if let Some(start) = descriptor.start {
        params.push(("start", to_iso(start)));
    }
    if let Some(end) = descriptor.end {
        params.push(("end", to_iso(end)));
    }
    params.push(("unit", descriptor.granularity.unit.as_str().to_string()));
    if let Some(step) = descriptor.granularity.step.filter(|&s| s > 0) {
        params.push(("step", step.to_string()));
    }
    if let Some(limit) = descriptor.limit.filter(|&l| l > 0) {
        params.push(("limit", limit.to_string()));
    }
    if let Some(agg) = descriptor.aggregation.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        params.push(("agg", agg.to_string()));
    }
    if let Some(world_id) = descriptor.world_id {
        params.push(("world_id", world_id.to_string()));
    }
    if let Some(location_id) = descriptor.location_id {
        params.push(("location_id", location_id.to_string()));
    }
    if let Some(is_f2p) = descriptor.is_f2p {
        params.push(("is_f2p", if is_f2p { "1" } else { "0" }.to_string()));
    }

    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Pick the message to surface for a failed request. JSON bodies yield their
/// `error` or `message` field, other bodies their raw text, and anything
/// empty falls back to a generic status line.
pub fn error_message(status: u16, is_json: bool, body: &str) -> String {
    let from_json = is_json
        .then(|| serde_json::from_str::<serde_json::Value>(body).ok())
        .flatten()
        .and_then(|value| {
            ["error", "message"].iter().find_map(|field| {
                value
                    .get(field)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        });

    let fallback = || format!("Server responded {}", status);
    if is_json {
        return from_json.unwrap_or_else(fallback);
    }
    (!body.trim().is_empty())
        .then(|| body.to_string())
        .unwrap_or_else(fallback)
}

fn to_iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::Granularity;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn api(base_url: String) -> HttpPopulationApi {
        HttpPopulationApi::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_history_query_omits_unset_fields() {
        let descriptor = FilterDescriptor::new(Granularity::default());
        assert_eq!(history_query(&descriptor), "unit=hour");

        let blank = FilterDescriptor {
            aggregation: Some("  ".to_string()),
            limit: Some(0),
            ..FilterDescriptor::new(Granularity::default())
        };
        assert_eq!(history_query(&blank), "unit=hour");
    }

    #[test]
    fn test_history_query_full() {
        let descriptor = FilterDescriptor {
            start: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()),
            granularity: Granularity::minutes(5),
            limit: Some(288),
            aggregation: Some("avg".to_string()),
            world_id: Some(2),
            location_id: Some(7),
            is_f2p: Some(false),
        };

        assert_eq!(
            history_query(&descriptor),
            "start=2024-05-01T00%3A00%3A00.000Z&end=2024-05-02T00%3A00%3A00.000Z\
             &unit=minute&step=5&limit=288&agg=avg&world_id=2&location_id=7&is_f2p=0"
        );
    }

    #[test]
    fn test_is_f2p_only_when_set() {
        let base = FilterDescriptor::new(Granularity::default());
        assert!(!history_query(&base).contains("is_f2p"));
        assert!(history_query(&base.with_f2p(true)).ends_with("is_f2p=1"));
        assert!(history_query(&base.with_f2p(false)).ends_with("is_f2p=0"));
    }

    #[test]
    fn test_error_message_precedence() {
        assert_eq!(error_message(400, true, r#"{"error":"range too large"}"#), "range too large");
        assert_eq!(error_message(404, true, r#"{"message":"not here"}"#), "not here");
        assert_eq!(error_message(500, false, "Internal Server Error"), "Internal Server Error");
        assert_eq!(error_message(502, false, ""), "Server responded 502");
        assert_eq!(error_message(500, true, r#"{"detail":"x"}"#), "Server responded 500");
        assert_eq!(error_message(500, true, r#"{"error":""}"#), "Server responded 500");
        assert_eq!(error_message(503, true, ""), "Server responded 503");
    }

    #[tokio::test]
    async fn test_fetch_history_parses_samples() {
        let router = Router::new().route(
            "/api/history",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let count = if params.get("is_f2p").map(String::as_str) == Some("1") { 40 } else { 60 };
                Json(json!([
                    {"timestamp": "2024-05-01T10:00:00Z", "count": count},
                    {"timestamp": "2024-05-01 11:00:00", "count": count + 1},
                ]))
            }),
        );
        let api = api(spawn_stub(router).await);

        let all = api.fetch_history(&FilterDescriptor::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].count, 60);
        assert_eq!(all[1].timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap());

        let f2p = api
            .fetch_history(&FilterDescriptor::default().with_f2p(true))
            .await
            .unwrap();
        assert_eq!(f2p[0].count, 40);
    }

    #[tokio::test]
    async fn test_fetch_history_surfaces_server_error() {
        let router = Router::new().route(
            "/api/history",
            get(|| async {
                (StatusCode::BAD_REQUEST, Json(json!({"error": "range too large"}))).into_response()
            }),
        );
        let api = api(spawn_stub(router).await);

        let err = api.fetch_history(&FilterDescriptor::default()).await.unwrap_err();
        assert_eq!(
            err,
            RequestError::Server {
                status: 400,
                message: "range too large".to_string()
            }
        );
        assert_eq!(err.to_string(), "range too large");
    }

    #[tokio::test]
    async fn test_fetch_history_plain_text_and_empty_errors() {
        let router = Router::new()
            .route(
                "/api/history",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database is locked") }),
            )
            .route("/api/latest", get(|| async { StatusCode::BAD_GATEWAY }));
        let api = api(spawn_stub(router).await);

        let err = api.fetch_history(&FilterDescriptor::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "database is locked");

        let err = api.fetch_latest().await.unwrap_err();
        assert_eq!(err.to_string(), "Server responded 502");
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_parse_error() {
        let router = Router::new().route(
            "/api/history",
            get(|| async { Json(json!({"rows": []})) }),
        );
        let api = api(spawn_stub(router).await);

        let err = api.fetch_history(&FilterDescriptor::default()).await.unwrap_err();
        assert!(matches!(err, RequestError::Parse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = api(format!("http://{}", addr));
        let err = api.fetch_metadata().await.unwrap_err();
        assert!(matches!(err, RequestError::Network(_)));
    }

    #[tokio::test]
    async fn test_fetch_metadata_and_latest() {
        let router = Router::new()
            .route(
                "/api/metadata",
                get(|| async {
                    Json(json!({
                        "worlds": [1, 2],
                        "locations": [{"id": 1, "name": "Australia"}],
                        "activities": []
                    }))
                }),
            )
            .route(
                "/api/latest",
                get(|| async {
                    Json(json!({
                        "timestamp": "2024-05-01T10:00:00",
                        "count": 98765,
                        "f2p_count": 12000,
                        "members_count": 80000,
                        "breakdown_timestamp": null
                    }))
                }),
            );
        let api = api(format!("{}/", spawn_stub(router).await));

        let metadata = api.fetch_metadata().await.unwrap();
        assert_eq!(metadata.worlds, vec![1, 2]);
        assert_eq!(metadata.locations[0].name, "Australia");

        let latest = api.fetch_latest().await.unwrap();
        assert_eq!(latest.count, 98765);
        assert_eq!(latest.breakdown(), Some((12000, 80000)));
        assert_eq!(latest.breakdown_timestamp, None);
    }
}
