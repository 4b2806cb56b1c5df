use fv_core::session::{route_for, sign_in, LoginError, Route};

use super::{friendly_error, Context};

/// Sign in and store the token and user in the session file.
pub async fn login(ctx: &Context, email: &str, password: &str) -> anyhow::Result<()> {
    let client = ctx.anonymous_client();
    let mut session = ctx.session()?;
    let route = sign_in(&client, &mut session, email, password)
        .await
        .map_err(|e| match e {
            LoginError::Api(api) => friendly_error(api),
            other => other.into(),
        })?;

    let user = session.current_user().map(|u| u.name.as_str()).unwrap_or(email);
    println!("Signed in as {user}");
    println!("  dashboard: {}", describe(route));
    Ok(())
}

pub fn logout(ctx: &Context) -> anyhow::Result<()> {
    let mut session = ctx.session()?;
    if !session.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    session.logout()?;
    println!("Signed out.");
    Ok(())
}

pub fn whoami(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.session()?;
    match session.current_user() {
        Some(user) => {
            println!("{} <{}>", user.name, user.email);
            println!("  role:      {}", user.role);
            println!("  dashboard: {}", describe(route_for(&session)));
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

fn describe(route: Route) -> &'static str {
    match route {
        Route::Login => "none (unrecognised role)",
        Route::AdminDashboard => "admin",
        Route::StaffDashboard => "staff",
        Route::StudentDashboard => "student",
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::commands::test_support::{context, serve};

    #[tokio::test]
    async fn login_persists_session() {
        let app = Router::new().route(
            "/api/auth/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "priya@example.com");
                Json(json!({
                    "token": "jwt-abc",
                    "user": { "_id": "u1", "name": "Priya", "email": "priya@example.com", "role": "telecaller" }
                }))
            }),
        );
        let base = serve(app).await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&base, &dir);

        login(&ctx, "priya@example.com", "pw").await.unwrap();

        let session = ctx.session().unwrap();
        assert_eq!(session.token(), Some("jwt-abc"));
        assert_eq!(route_for(&session), Route::StaffDashboard);

        logout(&ctx).unwrap();
        assert!(!ctx.session().unwrap().is_authenticated());
    }

    #[tokio::test]
    async fn bad_credentials_leave_no_session() {
        let app = Router::new().route(
            "/api/auth/login",
            post(|| async {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid email or password" })))
            }),
        );
        let base = serve(app).await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&base, &dir);

        let err = login(&ctx, "priya@example.com", "wrong").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!ctx.session().unwrap().is_authenticated());
    }
}
