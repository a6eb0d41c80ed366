// # HTTP Publisher
//
// Sends the current address to a configured HTTP destination — a webhook, a
// status endpoint, or a DNS-update gateway that accepts a JSON body.
//
// ## Single-shot discipline
//
// One call makes ONE request and classifies the outcome; retry and backoff
// are owned by the cycle controller:
//
// - 2xx → acknowledged; a JSON `id` field in the response, when present,
//   becomes the receipt's confirmation
// - 401/403 and other 4xx → fatal (auth or client error; a retry with the
//   same request will not help)
// - 408, 429, 5xx, and transport failures → retryable
//
// ## Security
//
// The bearer token never appears in logs or in Debug output.

use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;

use ipup_core::config::{PublishMethod, PublisherConfig};
use ipup_core::traits::{PublishReceipt, Publisher, PublisherFactory};
use ipup_core::{ComponentRegistry, Error, Result};

/// Publisher POSTing (or PUTting) the address to one HTTP destination
pub struct HttpPublisher {
    /// Destination URL
    url: String,

    /// HTTP method to use
    method: PublishMethod,

    /// Optional bearer token; never logged
    token: Option<String>,

    /// HTTP client with a bounded per-request timeout
    client: reqwest::Client,
}

// Custom Debug implementation that hides the bearer token
impl std::fmt::Debug for HttpPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPublisher")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl HttpPublisher {
    /// Create a publisher for one destination
    pub fn new(
        url: impl Into<String>,
        method: PublishMethod,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            method,
            token,
            client,
        })
    }
}

/// Classify a non-success response into the fatal/retryable taxonomy
fn classify_failure(status: reqwest::StatusCode, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::publish_fatal(format!(
            "destination rejected credentials: HTTP {}",
            status
        )),
        408 => Error::publish_retryable(format!("destination request timeout: HTTP {}", status)),
        429 => Error::publish_retryable(format!("destination rate limited: HTTP {}", status)),
        500..=599 => Error::publish_retryable(format!(
            "destination server error: HTTP {} - {}",
            status, body
        )),
        _ => Error::publish_fatal(format!(
            "destination refused the request: HTTP {} - {}",
            status, body
        )),
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    /// Send the address to the destination, once
    ///
    /// The request body is `{"ip": "<address>"}`. A JSON response carrying an
    /// `id` field yields a receipt with that confirmation; any other 2xx body
    /// is accepted without one.
    async fn publish(&self, ip: IpAddr) -> Result<PublishReceipt> {
        tracing::info!(%ip, url = %self.url, "publishing address");

        let request = match self.method {
            PublishMethod::Post => self.client.post(&self.url),
            PublishMethod::Put => self.client.put(&self.url),
        };

        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .json(&serde_json::json!({ "ip": ip.to_string() }))
            .send()
            .await
            .map_err(|e| {
                // All transport failures (timeout, refused connection, reset)
                // are transient from this cycle's point of view
                Error::publish_retryable(format!("request to {} failed: {}", self.url, e))
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(classify_failure(status, body.trim()));
        }

        let confirmation = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(String::from));

        tracing::debug!(%ip, status = %status, ?confirmation, "destination acknowledged");

        Ok(PublishReceipt { confirmation })
    }

    fn destination_name(&self) -> &str {
        &self.url
    }
}

/// Factory for creating HTTP publishers
pub struct HttpPublisherFactory;

impl PublisherFactory for HttpPublisherFactory {
    fn create(&self, config: &PublisherConfig) -> Result<Box<dyn Publisher>> {
        match config {
            PublisherConfig::Http {
                url,
                method,
                token,
                timeout_secs,
            } => {
                if url.is_empty() {
                    return Err(Error::config("publisher URL is required"));
                }

                Ok(Box::new(HttpPublisher::new(
                    url.clone(),
                    *method,
                    token.clone(),
                    Duration::from_secs(*timeout_secs),
                )?))
            }
            _ => Err(Error::config("invalid config for HTTP publisher")),
        }
    }
}

/// Register the HTTP publisher with a registry
pub fn register(registry: &ComponentRegistry) {
    registry.register_publisher("http", Box::new(HttpPublisherFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_fatal() {
        let err = classify_failure(reqwest::StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, Error::PublishFatal(_)), "got {:?}", err);

        let err = classify_failure(reqwest::StatusCode::FORBIDDEN, "");
        assert!(matches!(err, Error::PublishFatal(_)), "got {:?}", err);
    }

    #[test]
    fn client_errors_are_fatal() {
        let err = classify_failure(reqwest::StatusCode::NOT_FOUND, "no such hook");
        assert!(matches!(err, Error::PublishFatal(_)), "got {:?}", err);

        let err = classify_failure(reqwest::StatusCode::UNPROCESSABLE_ENTITY, "");
        assert!(matches!(err, Error::PublishFatal(_)), "got {:?}", err);
    }

    #[test]
    fn timeouts_rate_limits_and_server_errors_are_retryable() {
        for status in [
            reqwest::StatusCode::REQUEST_TIMEOUT,
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            reqwest::StatusCode::BAD_GATEWAY,
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = classify_failure(status, "");
            assert!(err.is_retryable(), "{} should be retryable", status);
        }
    }

    #[test]
    fn factory_creation() {
        let factory = HttpPublisherFactory;

        let config = PublisherConfig::Http {
            url: "https://example.net/ip".to_string(),
            method: PublishMethod::Post,
            token: Some("secret_token_12345".to_string()),
            timeout_secs: 5,
        };

        assert!(factory.create(&config).is_ok());
    }

    #[test]
    fn factory_rejects_empty_url() {
        let factory = HttpPublisherFactory;

        let config = PublisherConfig::Http {
            url: String::new(),
            method: PublishMethod::Post,
            token: None,
            timeout_secs: 5,
        };

        assert!(factory.create(&config).is_err());
    }

    #[test]
    fn token_not_exposed_in_debug() {
        let publisher = HttpPublisher::new(
            "https://example.net/ip",
            PublishMethod::Put,
            Some("secret_token_12345".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        let debug_str = format!("{:?}", publisher);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("HttpPublisher"));
    }

    #[test]
    fn destination_name_is_the_url() {
        let publisher = HttpPublisher::new(
            "https://example.net/ip",
            PublishMethod::Post,
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(publisher.destination_name(), "https://example.net/ip");
    }
}
