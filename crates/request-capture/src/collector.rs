//! Evidence-capturing sender decorator

use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::sender::HttpSender;
use async_trait::async_trait;
use scribe_core::{EvidenceEntry, EvidenceLog, Result};
use tracing::debug;

/// Wraps a sender and appends one [`EvidenceEntry`] per completed exchange.
///
/// The request is forwarded as given and the response returned as received.
/// A transport error leaves the log untouched.
pub struct EvidenceCollector<S> {
    inner: S,
    log: EvidenceLog,
}

impl<S: HttpSender> EvidenceCollector<S> {
    pub fn new(inner: S, log: EvidenceLog) -> Self {
        Self { inner, log }
    }

    pub fn log(&self) -> &EvidenceLog {
        &self.log
    }

    /// Points the collector at another scenario's log.
    pub fn set_log(&mut self, log: EvidenceLog) {
        self.log = log;
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn entry(&self, request: &ApiRequest, response: &ApiResponse) -> EvidenceEntry {
        let base_url = self.inner.base_url();
        let uri = request
            .url(base_url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{base_url}{}", request.resolved_path()));

        EvidenceEntry {
            method: request.method.as_str().to_string(),
            uri,
            headers: request.headers.clone(),
            request_body: request.body.clone().unwrap_or_default(),
            status: response.status,
            response_body: response.body.clone(),
            proxy: None,
            query_params: request.query.clone(),
            path_params: request.path_params.clone(),
            form_params: request.form.clone(),
            cookies: request.cookies.clone(),
            multipart: Vec::new(),
        }
    }
}

#[async_trait]
impl<S: HttpSender> HttpSender for EvidenceCollector<S> {
    fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let response = self.inner.send(request).await?;

        self.log.push(self.entry(request, &response));
        debug!(
            method = %request.method,
            status = response.status,
            captured = self.log.len(),
            "Exchange captured"
        );

        Ok(response)
    }
}
