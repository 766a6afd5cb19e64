//! HTTP transport seam between [`crate::HttpModelClient`] and the network.
//!
//! The client only needs "POST this JSON, give me status and body". Keeping
//! that behind [`Transport`] lets tests script server behaviour without a
//! socket.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::error_chain;
use serde_json::Value;
use thiserror::Error;

/// One outgoing JSON request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer: Option<String>,
    pub body: Value,
}

/// Status and body of whatever the server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// The request produced no HTTP response at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: &HttpRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the underlying client. `timeout` of `None` means requests may
    /// block indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError(format!("failed to build HTTP client: {}", error_chain(&err))))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, request: &HttpRequest) -> Result<TransportResponse, TransportError> {
        // `.json()` also sets `Content-Type: application/json`.
        let mut builder = self.client.post(&request.url).json(&request.body);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError(error_chain(&err)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError(format!("failed to read response body: {}", error_chain(&err))))?;
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Accepts one connection, answers it with `status` and `body`, and yields
    /// the raw request text it received.
    pub(crate) async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        (format!("http://{addr}"), handle)
    }

    /// A localhost URL nothing is listening on.
    pub(crate) async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn request(url: String, bearer: Option<&str>) -> HttpRequest {
        HttpRequest {
            url,
            bearer: bearer.map(str::to_string),
            body: json!({"model": "llama3", "prompt": "hi", "stream": false}),
        }
    }

    #[tokio::test]
    async fn posts_json_with_bearer_and_returns_status_and_body() {
        let (base, server) = serve_once("200 OK", r#"{"response":"X"}"#).await;
        let transport = ReqwestTransport::new(None).unwrap();

        let response = transport
            .post_json(&request(format!("{base}/api/generate"), Some("secret")))
            .await
            .unwrap();
        assert_eq!(
            response,
            TransportResponse {
                status: 200,
                body: r#"{"response":"X"}"#.to_string(),
            }
        );

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/generate HTTP/1.1\r\n"), "{raw}");
        let lower = raw.to_ascii_lowercase();
        assert!(lower.contains("content-type: application/json"), "{raw}");
        assert!(lower.contains("authorization: bearer secret"), "{raw}");
        let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(body).unwrap(),
            json!({"model": "llama3", "prompt": "hi", "stream": false})
        );
    }

    #[tokio::test]
    async fn omits_authorization_without_bearer() {
        let (base, server) = serve_once("200 OK", "{}").await;
        let transport = ReqwestTransport::new(None).unwrap();

        transport.post_json(&request(base, None)).await.unwrap();

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(!raw.contains("authorization:"), "{raw}");
    }

    #[tokio::test]
    async fn non_200_status_and_body_pass_through() {
        let (base, server) = serve_once("404 Not Found", r#"{"error":"model not found"}"#).await;
        let transport = ReqwestTransport::new(None).unwrap();

        let response = transport.post_json(&request(base, None)).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, r#"{"error":"model not found"}"#);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connection_failure_keeps_the_underlying_cause() {
        let transport = ReqwestTransport::new(None).unwrap();

        let err = transport
            .post_json(&request(closed_port_url().await, None))
            .await
            .unwrap_err();
        assert!(err.0.starts_with("error sending request"), "{err}");
        assert!(err.0.to_ascii_lowercase().contains("connection refused"), "{err}");
    }
}
