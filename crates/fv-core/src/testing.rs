//! In-memory backend used by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use fv_api_types::{ApiLead, ApiRemark, LeadPayload, StageResponse};

use crate::api::{ApiError, LeadApi};
use crate::types::Stage;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(LeadPayload),
    Update(String, LeadPayload),
    Stage(String, Stage),
    Remark(String, String),
}

#[derive(Default)]
struct Inner {
    leads: Vec<ApiLead>,
    calls: Vec<Call>,
    next_id: u32,
    list_error: Option<ApiError>,
    write_error: Option<ApiError>,
}

#[derive(Default)]
pub struct RecordingApi {
    inner: Mutex<Inner>,
}

pub fn lead(id: &str, name: &str, stage: &str) -> ApiLead {
    ApiLead {
        id: id.to_string(),
        full_name: name.to_string(),
        mobile: "9000000000".to_string(),
        lead_source: "Referral".to_string(),
        course_category: "Basic".to_string(),
        batch_type: "Free".to_string(),
        stage: stage.to_string(),
        ..Default::default()
    }
}

impl RecordingApi {
    pub fn with_leads(leads: Vec<ApiLead>) -> Self {
        let api = Self::default();
        api.inner.lock().unwrap().leads = leads;
        api
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn fail_list(&self, err: ApiError) {
        self.inner.lock().unwrap().list_error = Some(err);
    }

    pub fn fail_writes(&self, err: ApiError) {
        self.inner.lock().unwrap().write_error = Some(err);
    }

    fn apply_payload(lead: &mut ApiLead, p: &LeadPayload) {
        lead.full_name = p.full_name.clone();
        lead.mobile = p.mobile.clone();
        lead.email = p.email.clone();
        lead.age = p.age;
        lead.education = p.education.clone();
        lead.city = p.city.clone();
        lead.occupation = p.occupation.clone();
        lead.lead_source = p.lead_source.clone();
        lead.course_category = p.course_category.clone();
        lead.batch_section = p.batch_section.clone();
        lead.batch_type = p.batch_type.clone();
        lead.follow_up_date = p.follow_up_date.clone();
        lead.stage = p.stage.clone();
    }
}

#[async_trait(?Send)]
impl LeadApi for RecordingApi {
    async fn list_leads(&self) -> Result<Vec<ApiLead>, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::List);
        match &inner.list_error {
            Some(e) => Err(e.clone()),
            None => Ok(inner.leads.clone()),
        }
    }

    async fn create_lead(&self, payload: &LeadPayload) -> Result<ApiLead, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Create(payload.clone()));
        if let Some(e) = &inner.write_error {
            return Err(e.clone());
        }
        inner.next_id += 1;
        let mut created = ApiLead {
            id: format!("lead-{}", inner.next_id),
            created_at: Some(Utc::now()),
            ..Default::default()
        };
        Self::apply_payload(&mut created, payload);
        inner.leads.push(created.clone());
        Ok(created)
    }

    async fn update_lead(&self, id: &str, payload: &LeadPayload) -> Result<ApiLead, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Update(id.to_string(), payload.clone()));
        if let Some(e) = &inner.write_error {
            return Err(e.clone());
        }
        let lead = inner
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(ApiError::Rejected { status: 404, message: "Lead not found".into() })?;
        Self::apply_payload(lead, payload);
        Ok(lead.clone())
    }

    async fn update_stage(&self, id: &str, stage: Stage) -> Result<StageResponse, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Stage(id.to_string(), stage));
        if let Some(e) = &inner.write_error {
            return Err(e.clone());
        }
        let lead = inner
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(ApiError::Rejected { status: 404, message: "Lead not found".into() })?;
        lead.stage = stage.as_str().to_string();
        Ok(StageResponse { stage: lead.stage.clone() })
    }

    async fn add_remark(&self, id: &str, text: &str, author: &str) -> Result<ApiRemark, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Remark(id.to_string(), text.to_string()));
        if let Some(e) = &inner.write_error {
            return Err(e.clone());
        }
        let lead = inner
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(ApiError::Rejected { status: 404, message: "Lead not found".into() })?;
        let remark = ApiRemark {
            text: text.to_string(),
            author: author.to_string(),
            timestamp: Some(Utc::now()),
        };
        lead.remarks.push(remark.clone());
        Ok(remark)
    }
}
