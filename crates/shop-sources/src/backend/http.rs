//! REST backend

use super::{QueryParams, SourceBackend};
use crate::config::SourceConfig;
use crate::error::{ConfigError, SourceError};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use shop_model::{RecordId, Resource};
use std::time::Duration;

/// JSON-over-HTTP backend
///
/// Collections live at `<base>/<path>` and records at `<base>/<path>/<id>`.
/// Every request carries the configured timeout; non-2xx responses become
/// [`SourceError::Status`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: SourceConfig,
    base: Url,
    client: Client,
}

impl HttpBackend {
    /// Create backend
    ///
    /// # Errors
    /// [`ConfigError`] when the base URL is unusable or the client cannot be
    /// built.
    pub fn new(config: SourceConfig, timeout: Duration) -> Result<Self, ConfigError> {
        let base = config.url()?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Resolved URL for a collection or a record
    #[must_use]
    pub fn url(&self, resource: Resource, id: Option<&RecordId>) -> Url {
        let mut url = self.base.clone();
        // Base URLs are validated as hierarchical in `SourceConfig::url`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(self.config.path(resource).split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        query: Option<&QueryParams>,
        body: Option<&Value>,
    ) -> Result<Value, SourceError> {
        let url_text = url.to_string();
        tracing::debug!(source = %self.config.name, %method, url = %url_text, "Sending request");

        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(&url_text, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url_text,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::from_reqwest(&url_text, &e))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode {
            url: url_text,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SourceBackend for HttpBackend {
    async fn list(&self, resource: Resource, query: &QueryParams) -> Result<Value, SourceError> {
        self.send(Method::GET, self.url(resource, None), Some(query), None)
            .await
    }

    async fn get(&self, resource: Resource, id: &RecordId) -> Result<Value, SourceError> {
        self.send(Method::GET, self.url(resource, Some(id)), None, None)
            .await
    }

    async fn create(&self, resource: Resource, body: &Value) -> Result<Value, SourceError> {
        self.send(Method::POST, self.url(resource, None), None, Some(body))
            .await
    }

    async fn update(
        &self,
        resource: Resource,
        id: &RecordId,
        body: &Value,
    ) -> Result<Value, SourceError> {
        self.send(Method::PUT, self.url(resource, Some(id)), None, Some(body))
            .await
    }

    async fn delete(&self, resource: Resource, id: &RecordId) -> Result<(), SourceError> {
        match self
            .send(Method::DELETE, self.url(resource, Some(id)), None, None)
            .await
        {
            // Delete bodies are informational; a 2xx is enough.
            Ok(_) | Err(SourceError::Decode { .. }) => Ok(()),
            Err(error) => Err(error),
        }
    }
}
