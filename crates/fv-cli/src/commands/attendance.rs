use fv_api_types::AttendanceToday;
use fv_core::api::AttendanceApi;
use fv_core::attendance::{mark_attendance, AttendanceAction, AttendanceError, FixedPosition, GeoOptions};

use super::{friendly_error, Context};

fn render_today(today: &AttendanceToday) -> String {
    let fmt = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    format!(
        "Today\n  status:    {}\n  check-in:  {}\n  check-out: {}\n",
        today.status.as_deref().unwrap_or("not marked"),
        fmt(today.check_in_time),
        fmt(today.check_out_time),
    )
}

pub async fn status(ctx: &Context) -> anyhow::Result<AttendanceToday> {
    let client = ctx.api_client()?;
    let today = client.today().await.map_err(friendly_error)?;
    print!("{}", render_today(&today));
    Ok(today)
}

/// Check in or out from a fixed position. Today's status is fetched first so
/// an action already done is refused without posting.
pub async fn mark(ctx: &Context, action: AttendanceAction, lat: f64, lon: f64) -> anyhow::Result<()> {
    let client = ctx.api_client()?;
    let last = match client.today().await {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!(error = %e, "could not load today's attendance, letting the server decide");
            None
        }
    };
    let options = GeoOptions::from(&ctx.config.attendance);
    let here = FixedPosition::new(lat, lon);

    let outcome = mark_attendance(&client, &here, &options, action, last.as_ref())
        .await
        .map_err(|e| match e {
            AttendanceError::Api(api) => friendly_error(api),
            other => other.into(),
        })?;
    println!("{}", outcome.summary());
    if let Some(today) = &outcome.today {
        print!("{}", render_today(today));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::commands::test_support::{serve, signed_in};

    type Posts = Arc<Mutex<Vec<Value>>>;

    fn app(today: Value, posts: Posts, reject: bool) -> Router {
        Router::new()
            .route("/api/attendance/today", get(move || async move { Json(today) }))
            .route(
                "/api/attendance/check-in",
                post(move |State(p): State<Posts>, Json(body): Json<Value>| async move {
                    p.lock().unwrap().push(body);
                    if reject {
                        (StatusCode::BAD_REQUEST, Json(json!({ "message": "You are 3.2 km from the nearest branch" })))
                    } else {
                        (StatusCode::OK, Json(json!({
                            "message": "Checked in successfully",
                            "locationInfo": { "branch": "Pune Camp", "distance": 35.0 }
                        })))
                    }
                }),
            )
            .with_state(posts)
    }

    #[tokio::test]
    async fn check_in_posts_coordinates() {
        let posts: Posts = Arc::default();
        let base = serve(app(json!({}), posts.clone(), false)).await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&base, &dir, "staff");

        mark(&ctx, AttendanceAction::CheckIn, 18.5204, 73.8567).await.unwrap();

        let posts = posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["latitude"], 18.5204);
        assert_eq!(posts[0]["longitude"], 73.8567);
    }

    #[tokio::test]
    async fn distance_rejection_is_shown_verbatim() {
        let posts: Posts = Arc::default();
        let base = serve(app(json!({}), posts, true)).await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&base, &dir, "staff");

        let err = mark(&ctx, AttendanceAction::CheckIn, 0.0, 0.0).await.unwrap_err();
        assert_eq!(err.to_string(), "You are 3.2 km from the nearest branch");
    }

    #[tokio::test]
    async fn second_check_in_is_refused_locally() {
        let posts: Posts = Arc::default();
        let today = json!({ "checkInTime": "2026-10-16T03:30:00Z", "status": "present" });
        let base = serve(app(today, posts.clone(), false)).await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = signed_in(&base, &dir, "staff");

        let err = mark(&ctx, AttendanceAction::CheckIn, 1.0, 1.0).await.unwrap_err();
        assert_eq!(err.to_string(), "You have already checked in today.");
        assert!(posts.lock().unwrap().is_empty());
    }
}
