pub mod attendance;
pub mod auth;
pub mod backup;
pub mod export;
pub mod leads;
pub mod stats;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use fv_client::ApiClient;
use fv_core::api::ApiError;
use fv_core::config::Config;
use fv_core::confirm::Confirm;
use fv_core::session::{FileStore, SessionStore};

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub api_url: String,
    pub config: Config,
    pub session_path: PathBuf,
}

impl Context {
    pub fn new(config: Config, api_url_flag: Option<&str>) -> Self {
        let api_url = config.resolve_api_url(api_url_flag);
        let session_path = config.session_path();
        Self { api_url, config, session_path }
    }

    pub fn session(&self) -> anyhow::Result<SessionStore<FileStore>> {
        let store = FileStore::open(&self.session_path)?;
        Ok(SessionStore::hydrate(store)?)
    }

    /// Client without credentials, for `login`.
    pub fn anonymous_client(&self) -> ApiClient {
        ApiClient::new(&self.api_url)
    }

    /// Client carrying the stored bearer token.
    pub fn api_client(&self) -> anyhow::Result<ApiClient> {
        let session = self.session()?;
        let Some(token) = session.token() else {
            anyhow::bail!("Not signed in. Run `finvision login` first.");
        };
        Ok(ApiClient::new(&self.api_url).with_token(token))
    }

    pub fn author_name(&self) -> anyhow::Result<String> {
        Ok(self.session()?.author_name().to_string())
    }
}

/// Map API errors to user-facing messages. Server rejections are shown as
/// the server worded them.
pub fn friendly_error(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Network(msg) => anyhow::anyhow!(
            "Could not reach the finvision API: {msg}\n  \
             (hint: check --api-url or {})",
            fv_core::config::API_URL_ENV
        ),
        ApiError::Unauthorized => {
            anyhow::anyhow!("Your session has expired or is invalid. Run `finvision login` again.")
        }
        ApiError::Rejected { message, .. } => anyhow::anyhow!(message),
        ApiError::Decode(msg) => anyhow::anyhow!("Unexpected response from the server: {msg}"),
    }
}

/// `y/N` prompt on the terminal, or a fixed yes with `--yes`.
pub struct TerminalConfirm {
    pub assume_yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{prompt} [y/N] ");
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::Router;
    use fv_api_types::ApiUser;

    pub async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    /// Context pointing at `api_url` with a session file in `dir`.
    pub fn context(api_url: &str, dir: &tempfile::TempDir) -> Context {
        let mut config = Config::default();
        config.session.storage_path = dir.path().join("session.json").display().to_string();
        config.export.output_dir = dir.path().display().to_string();
        Context::new(config, Some(api_url))
    }

    pub fn signed_in(api_url: &str, dir: &tempfile::TempDir, role: &str) -> Context {
        let ctx = context(api_url, dir);
        let mut session = ctx.session().unwrap();
        let user = ApiUser {
            id: "u1".into(),
            name: "Priya".into(),
            email: "priya@example.com".into(),
            role: role.into(),
        };
        session.login("test-token", user).unwrap();
        ctx
    }
}
