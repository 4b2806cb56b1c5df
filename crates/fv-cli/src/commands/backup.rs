use std::path::{Path, PathBuf};

use fv_core::backup::{backup_filename, download_backup, restore, BackupDocument, BackupError, RestoreOutcome};

use super::{friendly_error, Context, TerminalConfirm};

fn backup_error(err: BackupError) -> anyhow::Error {
    match err {
        BackupError::Api(e) => friendly_error(e),
        other => other.into(),
    }
}

/// Download a backup into `<out>/finvision-backup-<timestamp>.json`.
pub async fn download(ctx: &Context, out: Option<&Path>) -> anyhow::Result<PathBuf> {
    let client = ctx.api_client()?;
    let doc = download_backup(&client).await.map_err(backup_error)?;

    let dir = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&ctx.config.export.output_dir));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(backup_filename(chrono::Local::now().naive_local()));
    std::fs::write(&path, doc.to_pretty_json().map_err(backup_error)?)?;

    println!("Backup (version {}) saved to {}", doc.version(), path.display());
    Ok(path)
}

/// Validate a backup file, confirm twice, then restore it.
pub async fn upload(ctx: &Context, file: &Path, yes: bool) -> anyhow::Result<RestoreOutcome> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", file.display()))?;
    let doc = BackupDocument::parse(&text).map_err(backup_error)?;
    let client = ctx.api_client()?;

    let mut confirm = TerminalConfirm { assume_yes: yes };
    let outcome = restore(&client, &doc, &mut confirm).await.map_err(backup_error)?;
    match &outcome {
        RestoreOutcome::Cancelled => println!("Restore cancelled."),
        RestoreOutcome::Restored(resp) if resp.message.is_empty() => println!("Restore complete."),
        RestoreOutcome::Restored(resp) => println!("{}", resp.message),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::commands::test_support::{serve, signed_in};

    #[tokio::test]
    async fn backup_then_restore_round_trip() {
        let restored: Arc<Mutex<Vec<Value>>> = Arc::default();
        let app = Router::new()
            .route(
                "/api/admin/backup",
                get(|| async { Json(json!({ "version": "2.1", "data": { "leads": [{ "_id": "1" }] } })) }),
            )
            .route(
                "/api/admin/restore",
                post(|State(seen): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(json!({ "message": "Data restored successfully" }))
                }),
            )
            .with_state(restored.clone());
        let base = serve(app).await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&base, &dir, "admin");

        let path = download(&ctx, None).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("finvision-backup-") && name.ends_with(".json"));

        let outcome = upload(&ctx, &path, true).await.unwrap();
        assert!(matches!(outcome, RestoreOutcome::Restored(_)));
        let seen = restored.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["data"]["leads"][0]["_id"], "1");
    }

    #[tokio::test]
    async fn malformed_file_is_rejected_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        // Nothing listens here; a request would fail with a network error.
        let ctx = signed_in("http://127.0.0.1:9/api", &dir, "admin");
        let file = dir.path().join("bad.json");
        std::fs::write(&file, r#"{"data": {}}"#).unwrap();

        let err = upload(&ctx, &file, true).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid backup file: missing \"version\"");
    }
}
