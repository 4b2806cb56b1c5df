use async_trait::async_trait;
use chrono::Utc;
use fv_api_types::{
    AddRemarkRequest, ApiErrorBody, ApiLead, ApiRemark, AttendanceResponse, AttendanceToday,
    CoordinatesRequest, LeadListResponse, LeadPayload, LoginRequest, LoginResponse, RemarkResponse,
    RestoreResponse, StageResponse, UpdateStageRequest,
};
use fv_core::api::{AdminApi, ApiError, AttendanceApi, AuthApi, LeadApi};
use fv_core::config::ApiConfig;
use fv_core::types::Stage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

/// Base URL used when the page does not override it.
pub fn default_api_base() -> String {
    ApiConfig::default().base_url
}

/// `fetch`-backed implementation of the client API traits.
///
/// Cheap to build; pages create one per action from the current session
/// token.
#[derive(Debug, Clone, PartialEq)]
pub struct WebApi {
    base_url: String,
    token: Option<String>,
}

impl WebApi {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), token }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
        auth: bool,
    ) -> Result<T, ApiError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let url = self.url(path);
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_network)?;
        let headers = request.headers();
        headers.set("Accept", "application/json").map_err(js_network)?;
        if body.is_some() {
            headers.set("Content-Type", "application/json").map_err(js_network)?;
        }
        if auth {
            let token = self.token.as_deref().ok_or(ApiError::Unauthorized)?;
            headers
                .set("Authorization", &format!("Bearer {token}"))
                .map_err(js_network)?;
        }

        let window = web_sys::window().ok_or_else(|| ApiError::Network("no global window".into()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_network)?;
        let resp: Response = resp_value.dyn_into().map_err(js_network)?;
        let text = JsFuture::from(resp.text().map_err(js_network)?)
            .await
            .map_err(js_network)?
            .as_string()
            .unwrap_or_default();

        if !resp.ok() {
            return Err(rejection(resp.status(), &resp.status_text(), &text));
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send("GET", path, None, true).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send("POST", path, Some(encode(body)?), true).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send("PUT", path, Some(encode(body)?), true).await
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn js_network(err: JsValue) -> ApiError {
    ApiError::Network(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Map a non-2xx response to an [`ApiError`]. The server's own message is
/// kept verbatim; 401 always means the session is gone.
pub fn rejection(status: u16, status_text: &str, body: &str) -> ApiError {
    if status == 401 {
        return ApiError::Unauthorized;
    }
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| {
            if status_text.is_empty() {
                format!("Request failed with status {status}")
            } else {
                status_text.to_string()
            }
        });
    ApiError::Rejected { status, message }
}

#[async_trait(?Send)]
impl LeadApi for WebApi {
    async fn list_leads(&self) -> Result<Vec<ApiLead>, ApiError> {
        let resp: LeadListResponse = self.get("/leads").await?;
        Ok(resp.into_leads())
    }

    async fn create_lead(&self, payload: &LeadPayload) -> Result<ApiLead, ApiError> {
        self.post("/leads", payload).await
    }

    async fn update_lead(&self, id: &str, payload: &LeadPayload) -> Result<ApiLead, ApiError> {
        self.put(&format!("/leads/{id}"), payload).await
    }

    async fn update_stage(&self, id: &str, stage: Stage) -> Result<StageResponse, ApiError> {
        let body = UpdateStageRequest { stage: stage.as_str().to_string() };
        self.put(&format!("/leads/{id}/stage"), &body).await
    }

    async fn add_remark(&self, id: &str, text: &str, author: &str) -> Result<ApiRemark, ApiError> {
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
impl AuthApi for WebApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        self.send("POST", "/auth/login", Some(encode(&body)?), false).await
    }
}

#[async_trait(?Send)]
impl AttendanceApi for WebApi {
    async fn today(&self) -> Result<AttendanceToday, ApiError> {
        self.get("/attendance/today").await
    }

    async fn check_in(&self, at: CoordinatesRequest) -> Result<AttendanceResponse, ApiError> {
        self.post("/attendance/check-in", &at).await
    }

    async fn check_out(&self, at: CoordinatesRequest) -> Result<AttendanceResponse, ApiError> {
        self.post("/attendance/check-out", &at).await
    }
}

#[async_trait(?Send)]
impl AdminApi for WebApi {
    async fn backup(&self) -> Result<Value, ApiError> {
        self.get("/admin/backup").await
    }

    async fn restore(&self, document: &Value) -> Result<RestoreResponse, ApiError> {
        self.post("/admin/restore", document).await
    }
}
