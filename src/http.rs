//! Outbound calls made by non-simulated `http` nodes.

use crate::error::BoxError;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;

/// A fully resolved request issued by an `http` node.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Upper-cased method, e.g. `GET` or `POST`
    pub method: String,
    pub url: String,
    /// Sent as the JSON body
    pub body: Value,
}

/// Performs outbound requests on behalf of the engine.
///
/// Implement this to route `http` nodes through your own client, or to
/// stub the network in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends `request` and returns the response body as text.
    async fn send(&self, request: HttpRequest) -> Result<String, BoxError>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().build()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<String, BoxError> {
        let method = Method::from_bytes(request.method.as_bytes())?;
        debug!("Sending {} {}", method, request.url);

        let response = self
            .client
            .request(method, &request.url)
            .json(&request.body)
            .send()
            .await?;

        // Non-2xx responses still count as a response; their body is returned
        Ok(response.text().await?)
    }
}
