//! The send seam between steps and the network

use crate::request::ApiRequest;
use crate::response::ApiResponse;
use async_trait::async_trait;
use reqwest::Client;
use scribe_core::{Result, ScribeError};
use tracing::{debug, instrument};

/// Sends one request and returns the observed response.
///
/// Transport failures are errors; any HTTP status, including 4xx and 5xx,
/// is a successful send.
#[async_trait]
pub trait HttpSender: Send + Sync {
    fn base_url(&self) -> &str;

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: Client,
    base_url: String,
}

impl ReqwestSender {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = request.url(&self.base_url)?;
        let mut builder = self.client.request(request.method.into(), url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.cookies.is_empty() {
            let cookie = request
                .cookies
                .iter()
                .map(|(n, v)| format!("{n}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header("Cookie", cookie);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        } else if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| ScribeError::HttpError {
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await.map_err(|e| ScribeError::HttpError {
            reason: format!("reading response body: {e}"),
        })?;

        debug!(status, bytes = body.len(), "Response received");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
