use fv_api_types::ApiLead;

use crate::api::{ApiError, LeadApi};

/// Client-side holder of the signed-in user's leads.
///
/// The list is only ever replaced as a whole with a fresh server snapshot;
/// nothing patches individual records in place.
#[derive(Debug, Clone, Default)]
pub struct LeadStore {
    leads: Vec<ApiLead>,
    generation: u64,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leads(&self) -> &[ApiLead] {
        &self.leads
    }

    pub fn get(&self, id: &str) -> Option<&ApiLead> {
        self.leads.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    /// Number of snapshots applied so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swap in a complete snapshot.
    pub fn replace(&mut self, leads: Vec<ApiLead>) {
        self.leads = leads;
        self.generation += 1;
    }

    /// Fetch the whole list and replace the current one. On failure the
    /// previous snapshot stays.
    pub async fn refresh(&mut self, api: &dyn LeadApi) -> Result<(), ApiError> {
        let leads = fetch_all(api).await?;
        self.replace(leads);
        Ok(())
    }
}

/// `GET /leads` with logging; shared by every post-mutation refresh.
pub async fn fetch_all(api: &dyn LeadApi) -> Result<Vec<ApiLead>, ApiError> {
    match api.list_leads().await {
        Ok(leads) => {
            tracing::debug!(count = leads.len(), "lead list fetched");
            Ok(leads)
        }
        Err(e) => {
            tracing::warn!(error = %e, "lead list fetch failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{lead, RecordingApi};

    #[tokio::test]
    async fn refresh_replaces_wholesale() {
        let api = RecordingApi::with_leads(vec![lead("1", "A", "Enquiry"), lead("2", "B", "Admission")]);
        let mut store = LeadStore::new();
        store.replace(vec![lead("9", "Old", "Enquiry")]);

        store.refresh(&api).await.unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get("9").is_none());
        assert_eq!(store.get("2").unwrap().full_name, "B");
        assert_eq!(store.generation(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let api = RecordingApi::with_leads(vec![]);
        api.fail_list(ApiError::Network("offline".into()));
        let mut store = LeadStore::new();
        store.replace(vec![lead("1", "A", "Enquiry")]);

        let err = store.refresh(&api).await.unwrap_err();

        assert_eq!(err, ApiError::Network("offline".into()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.generation(), 1);
    }
}
