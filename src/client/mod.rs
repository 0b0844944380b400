//! Backend collaborator contract and its HTTP implementation.
//!
//! [`EntryApi`] is the seam the entry session talks through; tests mock
//! it, production uses [`HttpEntryApi`]. All failures surface as typed
//! [`EntryError`]s: nothing at this boundary panics, and no call is
//! retried automatically.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use crate::auth;
use crate::config::ApiConfig;
use crate::dto::{ApiResponse, BatchPayload, LookupResponse};
use crate::errors::EntryError;
use crate::models::{CodeSource, CodeValue};

/// The five collaborator calls of the entry workflow.
#[async_trait]
pub trait EntryApi: Send + Sync {
    /// Checks whether `code` is eligible for acceptance against the given
    /// source document. Eligibility is decided by the body-level success
    /// marker, never by the HTTP status alone.
    async fn lookup_code(
        &self,
        source: &CodeSource,
        code: &CodeValue,
    ) -> Result<LookupResponse, EntryError>;

    async fn create_batch(&self, payload: &BatchPayload) -> Result<ApiResponse, EntryError>;

    async fn update_batch(
        &self,
        batch_id: Uuid,
        payload: &BatchPayload,
    ) -> Result<ApiResponse, EntryError>;

    /// Deletes all persisted codes of one container server-side.
    async fn delete_container(&self, batch_ref: &str, ordinal: u32) -> Result<(), EntryError>;

    /// Deletes exactly one persisted code record.
    async fn delete_code(&self, record_id: Uuid) -> Result<(), EntryError>;
}

/// `reqwest`-backed [`EntryApi`] implementation.
///
/// The bearer credential is read from [`crate::auth`] on every request;
/// requests without a stored token simply go out unauthenticated and the
/// backend answers accordingly.
#[derive(Debug, Clone)]
pub struct HttpEntryApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpEntryApi {
    pub fn new(config: &ApiConfig) -> Result<Self, EntryError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| EntryError::Config(format!("invalid api.base_url: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, EntryError> {
        self.base_url
            .join(path)
            .map_err(|e| EntryError::Config(format!("invalid endpoint path {path:?}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match auth::store().bearer() {
            Some(bearer) => request.header(AUTHORIZATION, bearer),
            None => request,
        }
    }

    async fn read_api_response(response: Response) -> Result<ApiResponse, EntryError> {
        let status = response.status();
        match response.json::<ApiResponse>().await {
            Ok(body) => Ok(body),
            Err(_) if status.is_success() => Ok(ApiResponse::ok()),
            Err(_) => Err(EntryError::submission(format!(
                "server returned {status}"
            ))),
        }
    }

    async fn read_delete_response(response: Response) -> Result<(), EntryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let msg = response
            .json::<ApiResponse>()
            .await
            .ok()
            .and_then(|b| b.msg)
            .unwrap_or_else(|| format!("server returned {status}"));
        Err(EntryError::deletion(msg))
    }
}

#[async_trait]
impl EntryApi for HttpEntryApi {
    #[instrument(skip(self))]
    async fn lookup_code(
        &self,
        source: &CodeSource,
        code: &CodeValue,
    ) -> Result<LookupResponse, EntryError> {
        let url = self.endpoint("codes/lookup")?;
        let mut request = self.client.get(url).query(&[("code", code.as_str())]);
        if let CodeSource::WorkOrder(doc) = source {
            request = request.query(&[("doc", doc.as_str())]);
        }
        let response = self.authorize(request).send().await?;
        let status = response.status();
        debug!(%status, %code, "lookup response");

        if status.is_success() {
            return Ok(response.json::<LookupResponse>().await?);
        }
        // Non-2xx means "not eligible" regardless of body shape.
        let msg = response
            .json::<LookupResponse>()
            .await
            .ok()
            .and_then(|b| b.msg);
        Ok(LookupResponse {
            code: status.as_u16().to_string(),
            msg,
        })
    }

    #[instrument(skip(self, payload))]
    async fn create_batch(&self, payload: &BatchPayload) -> Result<ApiResponse, EntryError> {
        let url = self.endpoint("batches")?;
        let response = self.authorize(self.client.post(url).json(payload)).send().await?;
        Self::read_api_response(response).await
    }

    #[instrument(skip(self, payload))]
    async fn update_batch(
        &self,
        batch_id: Uuid,
        payload: &BatchPayload,
    ) -> Result<ApiResponse, EntryError> {
        let url = self.endpoint(&format!("batches/{batch_id}"))?;
        let response = self.authorize(self.client.put(url).json(payload)).send().await?;
        Self::read_api_response(response).await
    }

    #[instrument(skip(self))]
    async fn delete_container(&self, batch_ref: &str, ordinal: u32) -> Result<(), EntryError> {
        let url = self.endpoint(&format!("batches/{batch_ref}/containers/{ordinal}"))?;
        let response = self.authorize(self.client.delete(url)).send().await?;
        Self::read_delete_response(response).await
    }

    #[instrument(skip(self))]
    async fn delete_code(&self, record_id: Uuid) -> Result<(), EntryError> {
        let url = self.endpoint(&format!("codes/{record_id}"))?;
        let response = self.authorize(self.client.delete(url)).send().await?;
        Self::read_delete_response(response).await
    }
}
