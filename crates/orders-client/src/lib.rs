use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

mod api;
mod error;

pub use api::OrdersApi;
pub use error::ClientError;

#[derive(Clone)]
pub struct OrdersClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

/// HTTP client for the orders resource. The base URL is fixed at
/// construction; endpoint paths are joined onto it.
#[derive(Clone)]
pub struct OrdersClient {
    base: Url,
    client: reqwest::Client,
}

impl OrdersClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<OrdersClientBuilder> {
        let mut base = Url::parse(base_url).context("invalid base url")?;
        // Url::join drops the last segment unless the base ends with a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(OrdersClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.client.request(method, self.url(path)?))
    }

    /// Executes the request and returns the body of a 2xx response. A 204
    /// yields `None` and its body is never read.
    pub(crate) async fn send(&self, req: RequestBuilder) -> Result<Option<Vec<u8>>, ClientError> {
        let request = req.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "orders api request");

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, %path, error = %e, "orders api unreachable");
                return Err(ClientError::Network(e));
            }
        };

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(e) if status.is_success() => {
                tracing::warn!(%method, %path, error = %e, "orders api response body unreadable");
                return Err(ClientError::Network(e));
            }
            Err(e) => {
                // The status alone still describes the failure.
                tracing::debug!(%method, %path, error = %e, "error response body unreadable");
                Vec::new()
            }
        };
        if !status.is_success() {
            let message = error::error_message(status.as_u16(), &body);
            tracing::warn!(%method, %path, status = status.as_u16(), %message, "orders api request failed");
            return Err(ClientError::Request {
                status: status.as_u16(),
                message,
            });
        }
        Ok(Some(body))
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: Option<Vec<u8>>) -> Result<T, ClientError> {
    let body = body.ok_or_else(|| ClientError::Decode("missing response body".into()))?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

impl OrdersClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<OrdersClient> {
        if let Some(client) = self.client {
            return Ok(OrdersClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("failed to build http client")?;
        Ok(OrdersClient {
            base: self.base,
            client,
        })
    }
}
