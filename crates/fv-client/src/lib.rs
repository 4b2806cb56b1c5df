//! HTTP client for the finvision REST API.
//!
//! [`ApiClient`] implements every API trait from `fv_core::api`, so the same
//! pipeline, panel, attendance and backup flows run against the real backend.

use async_trait::async_trait;
use chrono::Utc;
use fv_api_types::{
    AddRemarkRequest, ApiErrorBody, ApiLead, ApiRemark, AttendanceResponse, AttendanceToday,
    CoordinatesRequest, LeadListResponse, LeadPayload, LoginRequest, LoginResponse, RemarkResponse,
    RestoreResponse, StageResponse, UpdateStageRequest,
};
use fv_core::api::{AdminApi, ApiError, AttendanceApi, AuthApi, LeadApi};
use fv_core::types::Stage;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status. `message` is the server's
    /// own text when it sent one.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// An authenticated call was attempted without a token.
    #[error("missing bearer token")]
    MissingToken,

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Transport failure: connect, timeout, TLS.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status: 401, .. } | ClientError::MissingToken => ApiError::Unauthorized,
            ClientError::Api { status, message } => ApiError::Rejected { status, message },
            ClientError::Serde(e) => ApiError::Decode(e.to_string()),
            ClientError::Http(e) if e.is_connect() => {
                ApiError::Network(format!("could not connect to the server ({e})"))
            }
            ClientError::Http(e) if e.is_timeout() => ApiError::Network("request timed out".into()),
            ClientError::Http(e) => ApiError::Network(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    /// `base_url` includes the API prefix, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // -- request helpers ----------------------------------------------------

    fn request(&self, method: Method, path: &str, auth: bool) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, &url);
        if !auth {
            return Ok(builder);
        }
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(builder.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let resp = builder.send().await?;
        let status = resp.status();
        let url = resp.url().path().to_string();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .map(|b| b.message)
                .filter(|m| !m.is_empty())
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            tracing::debug!(%url, status = status.as_u16(), %message, "request rejected");
            return Err(ClientError::Api { status: status.as_u16(), message });
        }

        tracing::debug!(%url, status = status.as_u16(), "request ok");
        Ok(serde_json::from_str(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path, true)?).await
    }

    async fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::POST, path, true)?.json(body)).await
    }

    async fn put<B: serde::Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::PUT, path, true)?.json(body)).await
    }
}

#[async_trait(?Send)]
impl LeadApi for ApiClient {
    async fn list_leads(&self) -> std::result::Result<Vec<ApiLead>, ApiError> {
        let resp: LeadListResponse = self.get("/leads").await?;
        Ok(resp.into_leads())
    }

    async fn create_lead(&self, payload: &LeadPayload) -> std::result::Result<ApiLead, ApiError> {
        Ok(self.post("/leads", payload).await?)
    }

    async fn update_lead(&self, id: &str, payload: &LeadPayload) -> std::result::Result<ApiLead, ApiError> {
        Ok(self.put(&format!("/leads/{id}"), payload).await?)
    }

    async fn update_stage(&self, id: &str, stage: Stage) -> std::result::Result<StageResponse, ApiError> {
        let body = UpdateStageRequest { stage: stage.as_str().to_string() };
        Ok(self.put(&format!("/leads/{id}/stage"), &body).await?)
    }

    async fn add_remark(&self, id: &str, text: &str, author: &str) -> std::result::Result<ApiRemark, ApiError> {
        let body = AddRemarkRequest {
            text: text.to_string(),
            author: author.to_string(),
            timestamp: Utc::now(),
        };
        let resp: RemarkResponse = self.post(&format!("/leads/{id}/remarks"), &body).await?;
        Ok(resp.note)
    }
}

#[async_trait(?Send)]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> std::result::Result<LoginResponse, ApiError> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        let req = self.request(Method::POST, "/auth/login", false)?.json(&body);
        Ok(self.send(req).await?)
    }
}

#[async_trait(?Send)]
impl AttendanceApi for ApiClient {
    async fn today(&self) -> std::result::Result<AttendanceToday, ApiError> {
        Ok(self.get("/attendance/today").await?)
    }

    async fn check_in(&self, at: CoordinatesRequest) -> std::result::Result<AttendanceResponse, ApiError> {
        Ok(self.post("/attendance/check-in", &at).await?)
    }

    async fn check_out(&self, at: CoordinatesRequest) -> std::result::Result<AttendanceResponse, ApiError> {
        Ok(self.post("/attendance/check-out", &at).await?)
    }
}

#[async_trait(?Send)]
impl AdminApi for ApiClient {
    async fn backup(&self) -> std::result::Result<Value, ApiError> {
        Ok(self.get("/admin/backup").await?)
    }

    async fn restore(&self, document: &Value) -> std::result::Result<RestoreResponse, ApiError> {
        Ok(self.post("/admin/restore", document).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert!(!client.has_token());
    }

    #[test]
    fn status_401_maps_to_unauthorized() {
        let err = ClientError::Api { status: 401, message: "jwt expired".into() };
        assert_eq!(ApiError::from(err), ApiError::Unauthorized);
    }

    #[test]
    fn rejection_keeps_server_message() {
        let err = ClientError::Api { status: 403, message: "Outside branch radius".into() };
        assert_eq!(
            ApiError::from(err),
            ApiError::Rejected { status: 403, message: "Outside branch radius".into() }
        );
    }

    #[test]
    fn authenticated_request_without_token_fails_early() {
        let client = ApiClient::new("http://localhost:5000/api");
        let err = client.request(Method::GET, "/leads", true).unwrap_err();
        assert!(matches!(err, ClientError::MissingToken));
    }
}
