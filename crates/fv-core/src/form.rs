use fv_api_types::{ApiLead, LeadPayload};

use crate::api::{ApiError, LeadApi};
use crate::store::fetch_all;
use crate::types::{BatchType, CourseCategory, LeadSource, Stage};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("mobile number must be 10 digits")]
    Mobile,
    #[error("email address is not valid")]
    Email,
    #[error("age must be a whole number")]
    Age,
    #[error("follow-up date must be YYYY-MM-DD")]
    FollowUpDate,
    #[error("remark cannot be empty")]
    EmptyRemark,
}

/// Free-text form state for adding or editing a lead.
///
/// Optional fields are plain strings; blank means "not set".
#[derive(Debug, Clone, PartialEq)]
pub struct LeadForm {
    pub full_name: String,
    pub mobile: String,
    pub email: String,
    pub age: String,
    pub education: String,
    pub city: String,
    pub occupation: String,
    pub lead_source: LeadSource,
    pub course_category: CourseCategory,
    pub batch_section: String,
    pub batch_type: BatchType,
    pub follow_up_date: String,
    pub stage: Stage,
    /// Stored labels with no matching variant, sent back as-is.
    pub kept: KeptLabels,
}

/// Raw labels from an existing record that this client does not know.
///
/// A `Some` entry wins over the typed field in [`LeadForm::validate`] until
/// the matching setter picks a known value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeptLabels {
    pub stage: Option<String>,
    pub lead_source: Option<String>,
    pub course_category: Option<String>,
    pub batch_type: Option<String>,
}

impl Default for LeadForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            mobile: String::new(),
            email: String::new(),
            age: String::new(),
            education: String::new(),
            city: String::new(),
            occupation: String::new(),
            lead_source: LeadSource::WalkIn,
            course_category: CourseCategory::Basic,
            batch_section: String::new(),
            batch_type: BatchType::Free,
            follow_up_date: String::new(),
            stage: Stage::Enquiry,
            kept: KeptLabels::default(),
        }
    }
}

fn opt(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Parse a stored label, remembering it in `kept` when it is unknown.
fn known_or_kept<T>(
    raw: &str,
    parse: fn(&str) -> Option<T>,
    fallback: T,
    kept: &mut Option<String>,
) -> T {
    match parse(raw) {
        Some(v) => v,
        None => {
            *kept = Some(raw.to_string());
            fallback
        }
    }
}

fn label(kept: Option<&str>, known: &str) -> String {
    kept.unwrap_or(known).to_string()
}

impl LeadForm {
    /// Pre-fill from an existing record. Unknown enum labels are kept
    /// verbatim so saving other fields does not rewrite them.
    pub fn from_lead(lead: &ApiLead) -> Self {
        let defaults = Self::default();
        let mut kept = KeptLabels::default();
        Self {
            full_name: lead.full_name.clone(),
            mobile: lead.mobile.clone(),
            email: lead.email.clone().unwrap_or_default(),
            age: lead.age.map(|a| a.to_string()).unwrap_or_default(),
            education: lead.education.clone().unwrap_or_default(),
            city: lead.city.clone().unwrap_or_default(),
            occupation: lead.occupation.clone().unwrap_or_default(),
            lead_source: known_or_kept(
                &lead.lead_source,
                LeadSource::parse,
                defaults.lead_source,
                &mut kept.lead_source,
            ),
            course_category: known_or_kept(
                &lead.course_category,
                CourseCategory::parse,
                defaults.course_category,
                &mut kept.course_category,
            ),
            batch_section: lead.batch_section.clone(),
            batch_type: known_or_kept(
                &lead.batch_type,
                BatchType::parse,
                defaults.batch_type,
                &mut kept.batch_type,
            ),
            follow_up_date: lead
                .follow_up_date
                .as_deref()
                .and_then(|d| d.get(..10))
                .unwrap_or_default()
                .to_string(),
            stage: known_or_kept(&lead.stage, Stage::parse, defaults.stage, &mut kept.stage),
            kept,
        }
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        self.kept.stage = None;
    }

    pub fn set_lead_source(&mut self, source: LeadSource) {
        self.lead_source = source;
        self.kept.lead_source = None;
    }

    pub fn set_course_category(&mut self, course: CourseCategory) {
        self.course_category = course;
        self.kept.course_category = None;
    }

    pub fn set_batch_type(&mut self, batch: BatchType) {
        self.batch_type = batch;
        self.kept.batch_type = None;
    }

    pub fn validate(&self) -> Result<LeadPayload, ValidationError> {
        let full_name = opt(&self.full_name).ok_or(ValidationError::Required("full name"))?;
        let mobile = opt(&self.mobile).ok_or(ValidationError::Required("mobile"))?;
        if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::Mobile);
        }

        let email = opt(&self.email);
        if let Some(e) = &email {
            let valid = e
                .split_once('@')
                .is_some_and(|(user, host)| !user.is_empty() && host.contains('.'));
            if !valid {
                return Err(ValidationError::Email);
            }
        }

        let age = match opt(&self.age) {
            Some(a) => Some(a.parse::<u32>().map_err(|_| ValidationError::Age)?),
            None => None,
        };

        let follow_up_date = opt(&self.follow_up_date);
        if let Some(d) = &follow_up_date {
            chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| ValidationError::FollowUpDate)?;
        }

        Ok(LeadPayload {
            full_name,
            mobile,
            email,
            age,
            education: opt(&self.education),
            city: opt(&self.city),
            occupation: opt(&self.occupation),
            lead_source: label(self.kept.lead_source.as_deref(), self.lead_source.as_str()),
            course_category: label(self.kept.course_category.as_deref(), self.course_category.as_str()),
            batch_section: self.batch_section.trim().to_string(),
            batch_type: label(self.kept.batch_type.as_deref(), self.batch_type.as_str()),
            follow_up_date,
            stage: label(self.kept.stage.as_deref(), self.stage.as_str()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CreateLeadError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("could not create lead: {0}")]
    Create(ApiError),
    #[error("lead created but the list could not be refreshed: {0}")]
    Refresh(ApiError),
}

/// Validate, `POST /leads`, then re-fetch the whole list.
///
/// Returns the created record and the fresh list. Validation failures send
/// nothing.
pub async fn create_lead(
    api: &dyn LeadApi,
    form: &LeadForm,
) -> Result<(ApiLead, Vec<ApiLead>), CreateLeadError> {
    let payload = form.validate()?;
    let created = api.create_lead(&payload).await.map_err(|e| {
        tracing::warn!(error = %e, "lead creation failed");
        CreateLeadError::Create(e)
    })?;
    tracing::info!(lead_id = %created.id, stage = %payload.stage, "lead created");
    let leads = fetch_all(api).await.map_err(CreateLeadError::Refresh)?;
    Ok((created, leads))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{lead, Call, RecordingApi};

    fn asha() -> LeadForm {
        LeadForm {
            full_name: "Asha Rao".into(),
            mobile: "9876543210".into(),
            lead_source: LeadSource::Referral,
            course_category: CourseCategory::Basic,
            batch_type: BatchType::Free,
            ..Default::default()
        }
    }

    #[test]
    fn defaults_to_enquiry() {
        let payload = asha().validate().unwrap();
        assert_eq!(payload.stage, "Enquiry");
        assert_eq!(payload.lead_source, "Referral");
        assert!(payload.email.is_none());
    }

    #[test]
    fn name_and_mobile_required() {
        let mut form = asha();
        form.full_name = "   ".into();
        assert_eq!(form.validate(), Err(ValidationError::Required("full name")));

        let mut form = asha();
        form.mobile.clear();
        assert_eq!(form.validate(), Err(ValidationError::Required("mobile")));
    }

    #[test]
    fn rejects_malformed_fields() {
        let mut form = asha();
        form.mobile = "98765".into();
        assert_eq!(form.validate(), Err(ValidationError::Mobile));

        let mut form = asha();
        form.email = "asha.example.com".into();
        assert_eq!(form.validate(), Err(ValidationError::Email));

        let mut form = asha();
        form.age = "twenty".into();
        assert_eq!(form.validate(), Err(ValidationError::Age));

        let mut form = asha();
        form.follow_up_date = "20/10/2026".into();
        assert_eq!(form.validate(), Err(ValidationError::FollowUpDate));
    }

    #[test]
    fn from_lead_round_trips_known_values() {
        let mut existing = lead("7", "Ravi", "Paid Batch");
        existing.age = Some(24);
        existing.follow_up_date = Some("2026-11-01T00:00:00.000Z".into());
        let form = LeadForm::from_lead(&existing);
        assert_eq!(form.stage, Stage::PaidBatch);
        assert_eq!(form.age, "24");
        assert_eq!(form.follow_up_date, "2026-11-01");
        let payload = form.validate().unwrap();
        assert_eq!(payload.age, Some(24));
    }

    #[test]
    fn unknown_labels_survive_validation() {
        let mut legacy = lead("8", "Meera", "Prospect");
        legacy.lead_source = "Website".into();
        legacy.course_category = "Options Masterclass".into();
        let form = LeadForm::from_lead(&legacy);
        assert_eq!(form.kept.stage.as_deref(), Some("Prospect"));
        assert!(form.kept.batch_type.is_none());

        let payload = form.validate().unwrap();
        assert_eq!(payload.stage, "Prospect");
        assert_eq!(payload.lead_source, "Website");
        assert_eq!(payload.course_category, "Options Masterclass");
        assert_eq!(payload.batch_type, "Free");
    }

    #[test]
    fn picking_a_value_replaces_kept_label() {
        let mut legacy = lead("8", "Meera", "Enquiry");
        legacy.lead_source = "Website".into();
        let mut form = LeadForm::from_lead(&legacy);
        form.set_lead_source(LeadSource::Google);
        assert!(form.kept.lead_source.is_none());
        assert_eq!(form.validate().unwrap().lead_source, "Google");
    }

    #[tokio::test]
    async fn create_posts_then_refreshes() {
        let api = RecordingApi::with_leads(vec![]);
        let (created, leads) = create_lead(&api, &asha()).await.unwrap();

        assert_eq!(created.full_name, "Asha Rao");
        assert_eq!(leads.len(), 1);
        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], Call::Create(_)));
        assert_eq!(calls[1], Call::List);
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let api = RecordingApi::with_leads(vec![]);
        let mut form = asha();
        form.mobile = "12".into();
        let err = create_lead(&api, &form).await.unwrap_err();
        assert_eq!(err, CreateLeadError::Invalid(ValidationError::Mobile));
        assert!(api.calls().is_empty());
    }
}
