//! HttpGateway - reqwest implementation of [`RemoteGateway`].
//!
//! Every transport error, non-2xx status and `success: false` body is turned
//! into a [`CodechatError`] here. The file-tree query is the one exception:
//! its "nothing ingested yet" body is returned as-is for the store to read.

use std::time::Duration;

use async_trait::async_trait;
use codechat_core::config::ClientConfig;
use codechat_core::gateway::{
    ChatRequest, ChatResponse, ExplainRequest, ExplainResponse, FileTreeResponse, HealthStatus,
    RemoteGateway, ResetResponse, UploadResponse,
};
use codechat_core::ingest::{ChunkingConfig, FileCandidate, RepositoryUrl};
use codechat_core::session::SessionSnapshot;
use codechat_core::{CodechatError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Gateway that talks to the analysis backend over HTTP.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    ingestion_timeout: Duration,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("codechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CodechatError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
            ingestion_timeout: config.ingestion_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/", self.base_url)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Sends `request` with `timeout` and decodes a 2xx JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<T> {
        tracing::debug!("[HttpGateway] -> {}", operation);

        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(operation, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body).unwrap_or_else(|| status.to_string());
            tracing::warn!("[HttpGateway] {} failed ({}): {}", operation, status, detail);
            return Err(CodechatError::gateway(operation, detail));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(operation, timeout, e))?;
        decode(operation, &body)
    }
}

fn transport_error(operation: &'static str, timeout: Duration, err: reqwest::Error) -> CodechatError {
    if err.is_timeout() {
        tracing::warn!(
            "[HttpGateway] {} exceeded {}s deadline",
            operation,
            timeout.as_secs()
        );
        CodechatError::timeout(operation, timeout.as_secs())
    } else {
        tracing::warn!("[HttpGateway] {} transport error: {}", operation, err);
        CodechatError::gateway(operation, err.to_string())
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        CodechatError::gateway(operation, format!("Unexpected response body: {}", e))
    })
}

/// Extracts FastAPI's `{"detail": ...}` error text, if present.
fn error_detail(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Rejects a `success: false` body, carrying the backend's own text.
fn require_success(operation: &'static str, success: bool, message: &str) -> Result<()> {
    if success {
        return Ok(());
    }
    let message = if message.trim().is_empty() {
        "Backend reported failure".to_string()
    } else {
        message.to_string()
    };
    Err(CodechatError::gateway(operation, message))
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn health(&self) -> Result<HealthStatus> {
        self.send("health", self.client.get(self.endpoint("/")), self.request_timeout)
            .await
    }

    async fn session_info(&self) -> Result<SessionSnapshot> {
        self.send(
            "session-info",
            self.client.get(self.endpoint("/session-info")),
            self.request_timeout,
        )
        .await
    }

    async fn reset_session(&self) -> Result<ResetResponse> {
        let response: ResetResponse = self
            .send(
                "reset-session",
                self.client.post(self.endpoint("/reset-session")),
                self.request_timeout,
            )
            .await?;
        require_success("reset-session", response.success, &response.message)?;
        Ok(response)
    }

    async fn file_tree(&self) -> Result<FileTreeResponse> {
        let response: FileTreeResponse = self
            .send(
                "file-tree",
                self.client.get(self.endpoint("/file-tree")),
                self.request_timeout,
            )
            .await?;
        if response.is_error() {
            let message = response.error.clone().unwrap_or_default();
            return Err(CodechatError::gateway("file-tree", message));
        }
        Ok(response)
    }

    async fn upload_files(
        &self,
        files: &[FileCandidate],
        config: &ChunkingConfig,
    ) -> Result<UploadResponse> {
        let mut form = Form::new().text("config", serde_json::to_string(config)?);
        for file in files {
            let bytes = tokio::fs::read(&file.path).await?;
            let mime = mime_guess::from_path(&file.path).first_or_octet_stream();
            let part = Part::bytes(bytes)
                .file_name(file.name.clone())
                .mime_str(mime.essence_str())
                .map_err(|e| CodechatError::gateway("upload-file", e.to_string()))?;
            form = form.part("files", part);
        }

        let response: UploadResponse = self
            .send(
                "upload-file",
                self.client.post(self.endpoint("/upload-file")).multipart(form),
                self.ingestion_timeout,
            )
            .await?;
        require_success("upload-file", response.success, &response.message)?;
        tracing::info!("[HttpGateway] Uploaded {} file(s): {}", files.len(), response.message);
        Ok(response)
    }

    async fn upload_github(
        &self,
        repository: &RepositoryUrl,
        config: &ChunkingConfig,
    ) -> Result<UploadResponse> {
        // The backend clones the default branch; `repository.branch` is not sent.
        let form = Form::new()
            .text("repo_url", repository.clone_url())
            .text("chunk_size", config.chunk_size.to_string())
            .text("chunk_overlap", config.chunk_overlap.to_string());

        let response: UploadResponse = self
            .send(
                "upload-github",
                self.client.post(self.endpoint("/upload-github")).multipart(form),
                self.ingestion_timeout,
            )
            .await?;
        require_success("upload-github", response.success, &response.message)?;
        tracing::info!("[HttpGateway] Ingested {}: {}", repository.slug(), response.message);
        Ok(response)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response: ChatResponse = self
            .send(
                "chat",
                self.client.post(self.endpoint("/chat")).json(request),
                self.request_timeout,
            )
            .await?;
        require_success("chat", response.success, &response.response)?;
        Ok(response)
    }

    async fn explain_file(&self, file_path: &str) -> Result<ExplainResponse> {
        let request = ExplainRequest {
            file_path: file_path.to_string(),
        };
        let response: ExplainResponse = self
            .send(
                "explain-file",
                self.client.post(self.endpoint("/explain-file")).json(&request),
                self.request_timeout,
            )
            .await?;
        require_success("explain-file", response.success, &response.response)?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> HttpGateway {
        let config = ClientConfig {
            api_base_url: base.to_string(),
            ..ClientConfig::default()
        };
        HttpGateway::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_building() {
        let gateway = gateway("http://localhost:8000/");
        assert_eq!(gateway.endpoint("/"), "http://localhost:8000/");
        assert_eq!(gateway.endpoint("/chat"), "http://localhost:8000/chat");
        assert_eq!(gateway.endpoint("file-tree"), "http://localhost:8000/file-tree");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let gateway = gateway("https://example.com/api");
        assert_eq!(
            gateway.endpoint("/session-info"),
            "https://example.com/api/session-info"
        );
    }

    #[test]
    fn test_timeouts_follow_config() {
        let config = ClientConfig {
            request_timeout_secs: 5,
            ingestion_timeout_secs: 120,
            ..ClientConfig::default()
        };
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(gateway.request_timeout, Duration::from_secs(5));
        assert_eq!(gateway.ingestion_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(
            error_detail(r#"{"detail": "No code repository loaded"}"#).as_deref(),
            Some("No code repository loaded")
        );
        assert_eq!(
            error_detail(r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#)
                .map(|d| d.contains("field required")),
            Some(true)
        );
        assert_eq!(error_detail("Internal Server Error"), None);
    }

    #[test]
    fn test_failed_body_becomes_gateway_error() {
        let response: ChatResponse = decode(
            "chat",
            r#"{"success": false, "response": "No code repository has been uploaded yet.",
                "metadata": {"chunks_found": 0}}"#,
        )
        .unwrap();
        let err = require_success("chat", response.success, &response.response).unwrap_err();
        assert!(err.is_gateway());
        assert!(err.to_string().contains("No code repository"));
    }

    #[test]
    fn test_failure_without_text_gets_generic_message() {
        let err = require_success("reset-session", false, "  ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Gateway error during reset-session: Backend reported failure"
        );
    }

    #[test]
    fn test_malformed_body_is_gateway_error() {
        let err = decode::<SessionSnapshot>("session-info", "<html>").unwrap_err();
        assert!(err.is_gateway());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_upload_response_decoding() {
        let response: UploadResponse = decode(
            "upload-file",
            r#"{"success": true, "message": "Processed 42 chunks from 3 files",
                "namespace": "abc", "config": {"chunk_size": 800, "chunk_overlap": 100}}"#,
        )
        .unwrap();
        assert_eq!(response.config, Some(ChunkingConfig::default()));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_gateway_error() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig {
            api_base_url: format!("http://{}", addr),
            request_timeout_secs: 2,
            ..ClientConfig::default()
        };
        let gateway = HttpGateway::new(&config).unwrap();
        let err = gateway.session_info().await.unwrap_err();
        assert!(err.is_gateway());
        assert!(err.to_string().contains("session-info"));
    }
}
