//! Admin backup download and restore.

use chrono::NaiveDateTime;
use fv_api_types::RestoreResponse;
use serde_json::Value;

use crate::api::{AdminApi, ApiError};
use crate::confirm::Confirm;

pub const RESTORE_WARNING: &str =
    "Restoring a backup will REPLACE all current data. This cannot be undone. Continue?";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackupError {
    #[error("backup file is not valid JSON: {0}")]
    Malformed(String),
    #[error("invalid backup file: missing \"{0}\"")]
    MissingField(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A backup document: a JSON object carrying at least `version` and `data`.
/// Everything else is passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupDocument {
    raw: Value,
}

impl BackupDocument {
    pub fn parse(text: &str) -> Result<Self, BackupError> {
        let raw: Value =
            serde_json::from_str(text).map_err(|e| BackupError::Malformed(e.to_string()))?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self, BackupError> {
        let Some(obj) = raw.as_object() else {
            return Err(BackupError::Malformed("expected a JSON object".into()));
        };
        for field in ["version", "data"] {
            if obj.get(field).map_or(true, Value::is_null) {
                return Err(BackupError::MissingField(field));
            }
        }
        Ok(Self { raw })
    }

    /// `version` rendered for prompts, whether the server sent a string or a
    /// number.
    pub fn version(&self) -> String {
        match &self.raw["version"] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    pub fn to_pretty_json(&self) -> Result<String, BackupError> {
        serde_json::to_string_pretty(&self.raw).map_err(|e| BackupError::Malformed(e.to_string()))
    }
}

/// `finvision-backup-<YYYY-MM-DD>T<HH-MM-SS>.json`
pub fn backup_filename(now: NaiveDateTime) -> String {
    format!("finvision-backup-{}.json", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// `GET /admin/backup`, checked for the same shape restore requires.
pub async fn download_backup(api: &dyn AdminApi) -> Result<BackupDocument, BackupError> {
    let raw = api.backup().await?;
    let doc = BackupDocument::from_value(raw)?;
    tracing::info!(version = %doc.version(), "backup downloaded");
    Ok(doc)
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    Cancelled,
    Restored(RestoreResponse),
}

/// Ask twice, then `POST /admin/restore`. Declining either prompt sends
/// nothing.
pub async fn restore(
    api: &dyn AdminApi,
    doc: &BackupDocument,
    confirm: &mut dyn Confirm,
) -> Result<RestoreOutcome, BackupError> {
    if !confirm.confirm(RESTORE_WARNING) {
        return Ok(RestoreOutcome::Cancelled);
    }
    let last = format!("Restore backup version {} now?", doc.version());
    if !confirm.confirm(&last) {
        return Ok(RestoreOutcome::Cancelled);
    }

    let resp = api.restore(doc.as_value()).await.map_err(|e| {
        tracing::warn!(error = %e, "restore failed");
        e
    })?;
    tracing::info!(version = %doc.version(), "backup restored");
    Ok(RestoreOutcome::Restored(resp))
}
