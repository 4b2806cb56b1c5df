//! Wire types for the FinVision REST API.
//!
//! These mirror the JSON the backend sends and accepts. Enum-like fields
//! (`stage`, `leadSource`, ...) stay as plain strings here so that a record
//! carrying a value the client does not know still decodes; the typed views
//! live in `fv-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Leads ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiLead {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub lead_source: String,
    #[serde(default)]
    pub course_category: String,
    #[serde(default)]
    pub batch_section: String,
    #[serde(default)]
    pub batch_type: String,
    /// ISO date or datetime as sent by the server; only the date part is used.
    #[serde(default)]
    pub follow_up_date: Option<String>,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub converted: bool,
    #[serde(default)]
    pub remarks: Vec<ApiRemark>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ApiRemark {
    #[serde(default, alias = "note")]
    pub text: String,
    #[serde(default, alias = "addedBy")]
    pub author: String,
    #[serde(default, alias = "createdAt")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// `GET /leads` answers either `{ "leads": [...] }` or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LeadListResponse {
    Wrapped { leads: Vec<ApiLead> },
    Bare(Vec<ApiLead>),
}

impl LeadListResponse {
    pub fn into_leads(self) -> Vec<ApiLead> {
        match self {
            LeadListResponse::Wrapped { leads } => leads,
            LeadListResponse::Bare(leads) => leads,
        }
    }
}

/// Body of `POST /leads` and `PUT /leads/:id`. The update sends the whole draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    pub full_name: String,
    pub mobile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    pub lead_source: String,
    pub course_category: String,
    #[serde(default)]
    pub batch_section: String,
    pub batch_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<String>,
    pub stage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStageRequest {
    pub stage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StageResponse {
    #[serde(default)]
    pub stage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRemarkRequest {
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RemarkResponse {
    #[serde(default)]
    pub note: ApiRemark,
}

// ── Auth ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ApiUser {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: ApiUser,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiErrorBody {
    #[serde(default, alias = "error")]
    pub message: String,
}

// ── Attendance ──

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceToday {
    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LocationInfo {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub location_info: Option<LocationInfo>,
}

// ── Admin ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RestoreResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_list_accepts_wrapped_and_bare() {
        let wrapped: LeadListResponse =
            serde_json::from_str(r#"{"leads":[{"_id":"a1","fullName":"Asha Rao"}]}"#).unwrap();
        let leads = wrapped.into_leads();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, "a1");

        let bare: LeadListResponse =
            serde_json::from_str(r#"[{"id":"b2","stage":"Admission"},{"id":"b3"}]"#).unwrap();
        let leads = bare.into_leads();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].stage, "Admission");
        assert_eq!(leads[1].stage, "");
    }

    #[test]
    fn lead_decodes_camel_case_fields() {
        let json = r#"{
            "_id": "65f0",
            "fullName": "Asha Rao",
            "mobile": "9876543210",
            "leadSource": "Referral",
            "courseCategory": "Basic",
            "batchType": "Free",
            "followUpDate": "2026-10-20T00:00:00.000Z",
            "stage": "Enquiry",
            "remarks": [{"note": "called", "addedBy": "priya", "createdAt": "2026-10-16T09:30:00Z"}]
        }"#;
        let lead: ApiLead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.full_name, "Asha Rao");
        assert_eq!(lead.lead_source, "Referral");
        assert_eq!(lead.remarks[0].text, "called");
        assert_eq!(lead.remarks[0].author, "priya");
        assert!(lead.remarks[0].timestamp.is_some());
        assert!(lead.email.is_none());
    }

    #[test]
    fn payload_skips_empty_optionals() {
        let payload = LeadPayload {
            full_name: "Asha Rao".into(),
            mobile: "9876543210".into(),
            lead_source: "Referral".into(),
            course_category: "Basic".into(),
            batch_type: "Free".into(),
            stage: "Enquiry".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["fullName"], "Asha Rao");
        assert!(value.get("email").is_none());
        assert!(value.get("followUpDate").is_none());
    }

    #[test]
    fn attendance_response_location_is_optional() {
        let resp: AttendanceResponse = serde_json::from_str(
            r#"{"message":"Checked in","locationInfo":{"branch":"Pune","distance":42.5}}"#,
        )
        .unwrap();
        assert_eq!(resp.location_info.unwrap().branch, "Pune");

        let resp: AttendanceResponse = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert!(resp.location_info.is_none());
    }

    #[test]
    fn error_body_reads_error_alias() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"error":"too far"}"#).unwrap();
        assert_eq!(body.message, "too far");
    }
}
