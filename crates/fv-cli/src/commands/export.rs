use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fv_core::csv_export::{export_filename, to_csv};
use fv_core::filter::LeadFilter;
use fv_core::stats::{mis_rows, LeadStats};
use fv_core::store::fetch_all;

use super::leads::FilterArgs;
use super::{friendly_error, Context};

fn output_dir(ctx: &Context, out: Option<&Path>) -> PathBuf {
    out.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&ctx.config.export.output_dir))
}

fn write(dir: &Path, name: &str, text: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, text)?;
    Ok(path)
}

/// Write the filtered lead list to `leads_<date>.csv`.
pub async fn leads(
    ctx: &Context,
    filter: &FilterArgs,
    out: Option<&Path>,
    today: NaiveDate,
) -> anyhow::Result<PathBuf> {
    let client = ctx.api_client()?;
    let leads = fetch_all(&client).await.map_err(friendly_error)?;
    let visible = LeadFilter::from(filter).apply(&leads);
    let text = to_csv(visible.iter().copied())?;
    let path = write(&output_dir(ctx, out), &export_filename("leads", today), &text)?;
    tracing::info!(rows = visible.len(), path = %path.display(), "lead export written");
    println!("Exported {} lead(s) to {}", visible.len(), path.display());
    Ok(path)
}

/// Write the MIS summary (stage counts and conversion rate) to
/// `mis_<date>.csv`.
pub async fn mis(ctx: &Context, out: Option<&Path>, today: NaiveDate) -> anyhow::Result<PathBuf> {
    let client = ctx.api_client()?;
    let leads = fetch_all(&client).await.map_err(friendly_error)?;
    let rows = mis_rows(&LeadStats::compute(&leads, today));
    let text = to_csv(&rows)?;
    let path = write(&output_dir(ctx, out), &export_filename("mis", today), &text)?;
    println!("Exported MIS report to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use axum::{routing::get, Json, Router};
    use fv_core::csv_export::parse_csv;
    use fv_core::types::Stage;
    use serde_json::json;

    use super::*;
    use crate::commands::test_support::{serve, signed_in};

    fn app() -> Router {
        Router::new().route(
            "/api/leads",
            get(|| async {
                Json(json!({ "leads": [
                    { "_id": "1", "fullName": "Asha Rao", "mobile": "9876543210", "stage": "Enquiry" },
                    { "_id": "2", "fullName": "Kumar, Ravi", "mobile": "9123456780", "stage": "Counselling" },
                    { "_id": "3", "fullName": "Meera", "mobile": "9000000001", "stage": "Enquiry" }
                ]}))
            }),
        )
    }

    #[tokio::test]
    async fn filtered_lead_export_round_trips() {
        let base = serve(app()).await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&base, &dir, "admin");
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let filter = FilterArgs { stage: Some(Stage::Enquiry), ..Default::default() };

        let path = leads(&ctx, &filter, None, today).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "leads_2026-10-16.csv");
        let table = parse_csv(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.values("Name").unwrap(), vec!["Asha Rao", "Meera"]);
        assert_eq!(table.values("Mobile").unwrap(), vec!["9876543210", "9000000001"]);
        assert_eq!(table.values("Stage").unwrap(), vec!["Enquiry", "Enquiry"]);
    }

    #[tokio::test]
    async fn mis_export_ends_with_rate() {
        let base = serve(app()).await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&base, &dir, "admin");
        let out = dir.path().join("reports");
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let path = mis(&ctx, Some(&out), today).await.unwrap();

        assert_eq!(path, out.join("mis_2026-10-16.csv"));
        let table = parse_csv(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(table.headers, vec!["Metric", "Value"]);
        assert_eq!(table.rows.last().unwrap(), &vec!["Conversion Rate".to_string(), "0%".to_string()]);
    }
}
