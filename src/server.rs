use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::batch::{self, RunOptions, RunReport};
use crate::error::InvocationError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub path: Option<String>,
    pub operation: Option<String>,
    pub number_pages: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidRequest(#[from] InvocationError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/process-pdfs", post(process_pdfs))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, router()).await?;
    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn process_pdfs(Json(req): Json<ProcessRequest>) -> Result<Json<RunReport>, ApiError> {
    let (root, operation) =
        batch::parse_invocation(req.path.as_deref(), req.operation.as_deref())?;
    let options = RunOptions {
        number_pages: req.number_pages.unwrap_or(true),
    };

    info!(root = %root.display(), %operation, "processing request");
    let report = tokio::task::spawn_blocking(move || batch::run(&root, operation, &options))
        .await
        .map_err(anyhow::Error::from)??;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn post_json(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/process-pdfs")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_split_request_returns_report() {
        let root = tempfile::tempdir().unwrap();
        fixtures::write_pdf(root.path(), "a.pdf", 3, "a");

        let (status, body) = post_json(json!({ "path": root.path() })).await;
        assert_eq!(status, StatusCode::OK);

        let report: RunReport = serde_json::from_value(body).unwrap();
        assert_eq!(report.processed_count, 1);
        assert_eq!(report.generated_count, 3);
        assert!(root.path().join("a_pagina3.pdf").exists());
    }

    #[tokio::test]
    async fn test_merge_request_without_numbers() {
        let root = tempfile::tempdir().unwrap();
        fixtures::write_pdf(root.path(), "a.pdf", 1, "a");
        fixtures::write_pdf(root.path(), "b.pdf", 2, "b");

        let (status, body) = post_json(json!({
            "path": root.path(),
            "operation": "merge",
            "numberPages": false,
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generatedCount"], 1);

        let dir_name = root.path().file_name().unwrap().to_string_lossy().to_string();
        let output = root.path().join(format!("{}_003.pdf", dir_name));
        let texts = fixtures::page_texts(&output);
        assert!(texts.iter().all(|t| !t.contains("(001)")));
    }

    #[tokio::test]
    async fn test_bad_requests_are_400() {
        let root = tempfile::tempdir().unwrap();

        let (status, body) = post_json(json!({ "operation": "split" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);

        let (status, body) = post_json(json!({ "path": root.path(), "operation": "shred" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("shred"));

        let missing = root.path().join("missing");
        let (status, _) = post_json(json!({ "path": missing })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
