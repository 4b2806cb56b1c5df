//! The REST boundary as seen by the client core.
//!
//! Every screen talks to the backend through one of these traits. The CLI
//! implements them with `reqwest`, the browser UI with `fetch`, and tests
//! with in-memory recorders. Futures are not required to be `Send` because
//! the browser's fetch futures are not.

use async_trait::async_trait;
use fv_api_types::{
    ApiLead, ApiRemark, AttendanceResponse, AttendanceToday, CoordinatesRequest, LeadPayload,
    LoginResponse, RestoreResponse, StageResponse,
};
use serde_json::Value;

use crate::types::Stage;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Transport failure: connection refused, DNS, aborted fetch.
    #[error("network error: {0}")]
    Network(String),

    /// 401 from the server, or no token available for an authenticated call.
    #[error("not signed in")]
    Unauthorized,

    /// Non-2xx response. `message` is the server's own text, unmodified.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

#[async_trait(?Send)]
pub trait LeadApi {
    /// `GET /leads`: the full list for the signed-in user.
    async fn list_leads(&self) -> Result<Vec<ApiLead>, ApiError>;

    /// `POST /leads`
    async fn create_lead(&self, payload: &LeadPayload) -> Result<ApiLead, ApiError>;

    /// `PUT /leads/:id` with the entire draft.
    async fn update_lead(&self, id: &str, payload: &LeadPayload) -> Result<ApiLead, ApiError>;

    /// `PUT /leads/:id/stage`
    async fn update_stage(&self, id: &str, stage: Stage) -> Result<StageResponse, ApiError>;

    /// `POST /leads/:id/remarks`
    async fn add_remark(&self, id: &str, text: &str, author: &str) -> Result<ApiRemark, ApiError>;
}

#[async_trait(?Send)]
pub trait AuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;
}

#[async_trait(?Send)]
pub trait AttendanceApi {
    async fn today(&self) -> Result<AttendanceToday, ApiError>;
    async fn check_in(&self, at: CoordinatesRequest) -> Result<AttendanceResponse, ApiError>;
    async fn check_out(&self, at: CoordinatesRequest) -> Result<AttendanceResponse, ApiError>;
}

#[async_trait(?Send)]
pub trait AdminApi {
    /// `GET /admin/backup`: the raw backup document.
    async fn backup(&self) -> Result<Value, ApiError>;

    /// `POST /admin/restore`
    async fn restore(&self, document: &Value) -> Result<RestoreResponse, ApiError>;
}
