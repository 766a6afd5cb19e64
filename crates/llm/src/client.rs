//! [`pipeline::ModelClient`] over HTTP.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use pipeline::{Generation, GenerationError, Latency, ModelClient, ModelResponse, Payload};
use tracing::{debug, info, instrument};

use crate::config::ModelServerConfig;
use crate::transport::{HttpRequest, ReqwestTransport, Transport, TransportError};

/// Sends each payload to `URL_GENERATE` and normalises the answer.
///
/// Exactly one request per call; no retries.
#[derive(Clone)]
pub struct HttpModelClient {
    endpoint: String,
    api_key: Option<String>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for HttpModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpModelClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HttpModelClient {
    /// Builds a client with a real `reqwest` transport.
    pub fn new(config: &ModelServerConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &ModelServerConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: config.url_generate.clone(),
            api_key: config.api_key.clone(),
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    #[instrument(skip_all, fields(url = %self.endpoint, model = %payload.model(), target = %payload.target()))]
    async fn generate(&self, payload: &Payload) -> Result<Generation, GenerationError> {
        let body = payload.to_json();
        info!(url = %self.endpoint, "Making request");
        debug!(payload = %body, "Payload");

        let request = HttpRequest {
            url: self.endpoint.clone(),
            bearer: self.api_key.clone(),
            body,
        };

        let started = Instant::now();
        let response = self
            .transport
            .post_json(&request)
            .await
            .map_err(|err| GenerationError::Transport {
                endpoint: self.endpoint.clone(),
                message: err.to_string(),
            })?;
        let latency = Latency::new(started.elapsed());

        match response.status {
            200 => {
                let generation = Generation::from_response(latency, ModelResponse::parse(&response.body));
                info!(latency = %generation.latency, schema = ?generation.schema, "Generation complete");
                Ok(generation)
            }
            401 => Err(GenerationError::Authentication {
                endpoint: self.endpoint.clone(),
            }),
            status => Err(GenerationError::Http {
                status,
                body: response.body,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, TransportResponse};
    use pipeline::{GenerationOptions, ModelName, ResponseSchema};

    const URL: &str = "http://localhost:11434/api/generate";

    fn payload() -> Payload {
        Payload::build(
            "ollama",
            ModelName::new("llama3").unwrap(),
            "Write requirements",
            GenerationOptions::new().with_temperature(0.7),
        )
        .unwrap()
    }

    fn client_answering(status: u16, body: &'static str) -> HttpModelClient {
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(1).returning(move |_| {
            Ok(TransportResponse {
                status,
                body: body.to_string(),
            })
        });
        HttpModelClient::with_transport(&ModelServerConfig::new(URL), Arc::new(transport))
    }

    #[tokio::test]
    async fn generate_shape_is_flattened_with_rounded_latency() {
        let client = client_answering(200, r#"{"model":"llama3","response":"X","done":true}"#);
        let generation = client.generate(&payload()).await.unwrap();

        let (latency, text) = generation.as_legacy_outcome();
        assert_eq!(text, "X");
        assert!(latency >= 0.0);
        assert_eq!(latency, (latency * 1000.0).round() / 1000.0);
        assert_eq!(generation.schema, ResponseSchema::Generate);
    }

    #[tokio::test]
    async fn chat_shape_is_flattened() {
        let client = client_answering(200, r#"{"choices":[{"message":{"content":"Y"}}]}"#);
        let generation = client.generate(&payload()).await.unwrap();
        assert_eq!(generation.text, "Y");
        assert_eq!(generation.schema, ResponseSchema::Chat);
    }

    #[tokio::test]
    async fn unknown_shape_is_passed_through() {
        let client = client_answering(200, r#"{"result":"Z"}"#);
        let generation = client.generate(&payload()).await.unwrap();
        assert_eq!(generation.schema, ResponseSchema::Unknown);
        assert_eq!(generation.text, r#"{"result":"Z"}"#);
    }

    #[tokio::test]
    async fn unauthorized_yields_authentication_guidance() {
        let client = client_answering(401, "unauthorized");
        let err = client.generate(&payload()).await.unwrap_err();

        assert_eq!(err, GenerationError::Authentication { endpoint: URL.to_string() });
        let (latency, message) = err.as_legacy_outcome();
        assert_eq!(latency, -1.0);
        assert!(message.contains("Authentication issue"));
        assert!(message.contains("API_KEY"));
    }

    #[tokio::test]
    async fn other_status_reports_status_and_body() {
        let client = client_answering(404, r#"{"error":"model 'llama3' not found"}"#);
        let err = client.generate(&payload()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"!!ERROR!! HTTP Response=404, {"error":"model 'llama3' not found"}"#
        );
    }

    #[tokio::test]
    async fn transport_failure_embeds_cause_and_endpoint() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .times(1)
            .returning(|_| Err(TransportError("connection refused".to_string())));
        let client = HttpModelClient::with_transport(&ModelServerConfig::new(URL), Arc::new(transport));

        let err = client.generate(&payload()).await.unwrap_err();
        let (latency, message) = err.as_legacy_outcome();
        assert_eq!(latency, -1.0);
        assert!(message.contains("connection refused"));
        assert!(message.contains(URL));
    }

    #[tokio::test]
    async fn unreachable_server_reports_the_os_cause() {
        let url = format!("{}/api/generate", crate::transport::tests::closed_port_url().await);
        let client = HttpModelClient::new(&ModelServerConfig::new(&url)).unwrap();

        let err = client.generate(&payload()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("!!ERROR!! Request failed: "), "{message}");
        assert!(message.to_ascii_lowercase().contains("connection refused"), "{message}");
        assert!(message.contains(&format!("You need to adjust _config with URL({url})")), "{message}");
    }

    #[tokio::test]
    async fn request_carries_body_and_bearer() {
        let mut transport = MockTransport::new();
        let expected_body = payload().to_json();
        transport
            .expect_post_json()
            .withf(move |req| {
                req.url == URL && req.bearer.as_deref() == Some("sk-test") && req.body == expected_body
            })
            .times(1)
            .returning(|_| {
                Ok(TransportResponse {
                    status: 200,
                    body: r#"{"response":"ok"}"#.to_string(),
                })
            });
        let config = ModelServerConfig::new(URL).with_api_key("sk-test");
        let client = HttpModelClient::with_transport(&config, Arc::new(transport));

        assert_eq!(client.generate(&payload()).await.unwrap().text, "ok");
    }

    #[tokio::test]
    async fn no_bearer_without_api_key() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .withf(|req| req.bearer.is_none())
            .times(1)
            .returning(|_| {
                Ok(TransportResponse {
                    status: 200,
                    body: r#"{"response":"ok"}"#.to_string(),
                })
            });
        let config = ModelServerConfig::new(URL).with_api_key("");
        let client = HttpModelClient::with_transport(&config, Arc::new(transport));
        assert!(client.generate(&payload()).await.is_ok());
    }
}
