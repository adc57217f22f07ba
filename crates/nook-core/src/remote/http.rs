//! REST binding for the hosted document store.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::util::{compact_text, is_http_url, normalize_text_option};

use super::{JsonMap, RecordKind, RemoteStore};

/// HTTP client for a document-store REST API.
///
/// Collections map to `{base}/{kind}s` (`/categorys` is deliberately not
/// special-cased; the backend routes on the singular tag plus `s`).
#[derive(Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpRemoteStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpRemoteStore")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            auth_token: None,
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Attach a bearer token to every request
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = normalize_text_option(Some(token.into()));
        self
    }

    fn collection_url(&self, kind: RecordKind) -> String {
        format!("{}/{}s", self.base_url, kind.as_str())
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Remote(parse_api_error(status, &body)))
    }
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn create(&self, kind: RecordKind, payload: &JsonMap) -> Result<String> {
        let response = self
            .apply_auth(self.client.post(self.collection_url(kind)))
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await?;

        let response = Self::expect_success(response).await?;
        let created = response.json::<CreateResponse>().await?;
        Ok(created.id)
    }

    async fn update(&self, kind: RecordKind, id: &str, payload: &JsonMap) -> Result<()> {
        let url = format!("{}/{}", self.collection_url(kind), id);
        let response = self
            .apply_auth(self.client.patch(url))
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await?;

        Self::expect_success(response).await?;
        Ok(())
    }

    async fn delete(&self, kind: RecordKind, id: &str) -> Result<()> {
        let url = format!("{}/{}", self.collection_url(kind), id);
        let response = self
            .apply_auth(self.client.delete(url))
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::expect_success(response).await?;
        Ok(())
    }

    async fn query(
        &self,
        kind: RecordKind,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<JsonMap>> {
        let rendered = match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        let response = self
            .apply_auth(self.client.get(self.collection_url(kind)))
            .query(&[(field, rendered.as_str())])
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = Self::expect_success(response).await?;
        Ok(response.json::<Vec<JsonMap>>().await?)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let base_url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidInput("Remote base URL must not be empty".to_string()))?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "Remote base URL must include http:// or https://".to_string(),
        ))
    }
}
