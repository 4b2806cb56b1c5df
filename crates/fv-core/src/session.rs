//! Signed-in session: bearer token plus the user record, persisted in a small
//! key-value store under fixed keys.
//!
//! The store is an explicit object handed to whoever needs it. The browser
//! backs it with `localStorage`, the CLI with a JSON file, tests with memory.

use std::collections::BTreeMap;

use fv_api_types::ApiUser;

use crate::api::{ApiError, AuthApi};
use crate::types::UserRole;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Minimal string key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(feature = "fs")]
pub use file::FileStore;

#[cfg(feature = "fs")]
mod file {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use super::{KeyValueStore, SessionError};

    /// All keys in one JSON object on disk, rewritten on every change.
    #[derive(Debug)]
    pub struct FileStore {
        path: PathBuf,
        entries: BTreeMap<String, String>,
    }

    impl FileStore {
        /// Open the file, treating a missing file as empty.
        pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
            let path = path.into();
            let entries = match std::fs::read_to_string(&path) {
                Ok(text) if text.trim().is_empty() => BTreeMap::new(),
                Ok(text) => serde_json::from_str(&text)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
                Err(e) => return Err(e.into()),
            };
            Ok(Self { path, entries })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush(&self) -> Result<(), SessionError> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let json = serde_json::to_string_pretty(&self.entries)?;
            std::fs::write(&self.path, json)?;
            Ok(())
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
            Ok(self.entries.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
            self.entries.insert(key.to_string(), value.to_string());
            self.flush()
        }

        fn remove(&mut self, key: &str) -> Result<(), SessionError> {
            if self.entries.remove(key).is_some() {
                self.flush()?;
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

pub struct SessionStore<S> {
    storage: S,
    token: Option<String>,
    user: Option<ApiUser>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Read `token` and `user` from storage. An unreadable user entry, or a
    /// token without a user, clears both keys.
    pub fn hydrate(mut storage: S) -> Result<Self, SessionError> {
        let token = storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user = match storage.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<ApiUser>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "stored user is corrupt, clearing session");
                    None
                }
            },
            None => None,
        };

        match (token, user) {
            (Some(token), Some(user)) => Ok(Self { storage, token: Some(token), user: Some(user) }),
            (None, None) => Ok(Self { storage, token: None, user: None }),
            _ => {
                storage.remove(TOKEN_KEY)?;
                storage.remove(USER_KEY)?;
                Ok(Self { storage, token: None, user: None })
            }
        }
    }

    pub fn login(&mut self, token: &str, user: ApiUser) -> Result<(), SessionError> {
        let raw = serde_json::to_string(&user)?;
        self.storage.set(TOKEN_KEY, token)?;
        self.storage.set(USER_KEY, &raw)?;
        tracing::info!(user = %user.email, role = %user.role, "signed in");
        self.token = Some(token.to_string());
        self.user = Some(user);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.token = None;
        self.user = None;
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        tracing::info!("signed out");
        Ok(())
    }

    pub fn current_user(&self) -> Option<&ApiUser> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().and_then(|u| UserRole::parse(&u.role))
    }

    /// Display name used as the author of new remarks.
    pub fn author_name(&self) -> &str {
        self.user.as_ref().map(|u| u.name.as_str()).unwrap_or("Unknown")
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    AdminDashboard,
    StaffDashboard,
    StudentDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::AdminDashboard => "/admin",
            Route::StaffDashboard => "/staff",
            Route::StudentDashboard => "/student",
        }
    }
}

/// Landing screen for the current session. No token, or a role this client
/// does not know, goes to the login screen.
pub fn route_for<S: KeyValueStore>(session: &SessionStore<S>) -> Route {
    if !session.is_authenticated() {
        return Route::Login;
    }
    match session.role() {
        Some(UserRole::Admin) => Route::AdminDashboard,
        Some(role) if role.is_staff_like() => Route::StaffDashboard,
        Some(UserRole::Student) => Route::StudentDashboard,
        _ => Route::Login,
    }
}

// ---------------------------------------------------------------------------
// Sign-in flow
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Call `POST /auth/login` and persist the result. The session is only
/// written when the server accepts the credentials.
pub async fn sign_in<S: KeyValueStore>(
    api: &dyn AuthApi,
    session: &mut SessionStore<S>,
    email: &str,
    password: &str,
) -> Result<Route, LoginError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(LoginError::Missing("email"));
    }
    if password.is_empty() {
        return Err(LoginError::Missing("password"));
    }
    let resp = api.login(email, password).await.map_err(|e| {
        tracing::warn!(error = %e, "login rejected");
        e
    })?;
    session.login(&resp.token, resp.user)?;
    Ok(route_for(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fv_api_types::LoginResponse;
    use std::cell::Cell;

    fn user(role: &str) -> ApiUser {
        ApiUser {
            id: "u1".into(),
            name: "Priya".into(),
            email: "priya@example.com".into(),
            role: role.into(),
        }
    }

    #[test]
    fn empty_storage_routes_to_login() {
        let session = SessionStore::hydrate(MemoryStore::new()).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(route_for(&session), Route::Login);
    }

    #[test]
    fn login_persists_and_hydrates() {
        let mut session = SessionStore::hydrate(MemoryStore::new()).unwrap();
        session.login("tok-1", user("telecaller")).unwrap();
        assert_eq!(route_for(&session), Route::StaffDashboard);

        let storage = session.storage().clone();
        let restored = SessionStore::hydrate(storage).unwrap();
        assert_eq!(restored.token(), Some("tok-1"));
        assert_eq!(restored.current_user().unwrap().name, "Priya");
        assert_eq!(restored.author_name(), "Priya");
    }

    #[test]
    fn routes_by_role() {
        for (role, route) in [
            ("admin", Route::AdminDashboard),
            ("counselor", Route::StaffDashboard),
            ("staff", Route::StaffDashboard),
            ("student", Route::StudentDashboard),
            ("auditor", Route::Login),
        ] {
            let mut session = SessionStore::hydrate(MemoryStore::new()).unwrap();
            session.login("t", user(role)).unwrap();
            assert_eq!(route_for(&session), route, "role {role}");
        }
    }

    #[test]
    fn logout_clears_both_keys() {
        let mut session = SessionStore::hydrate(MemoryStore::new()).unwrap();
        session.login("t", user("admin")).unwrap();
        session.logout().unwrap();
        assert!(session.current_user().is_none());
        assert_eq!(session.storage().get(TOKEN_KEY).unwrap(), None);
        assert_eq!(session.storage().get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_user_clears_session() {
        let mut storage = MemoryStore::new();
        storage.set(TOKEN_KEY, "t").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();
        let session = SessionStore::hydrate(storage).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.storage().get(TOKEN_KEY).unwrap(), None);
    }

    struct FakeAuth {
        accept: bool,
        calls: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl AuthApi for FakeAuth {
        async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
            self.calls.set(self.calls.get() + 1);
            if self.accept {
                Ok(LoginResponse { token: "jwt".into(), user: ApiUser { email: email.into(), ..user("admin") } })
            } else {
                Err(ApiError::Rejected { status: 401, message: "Invalid credentials".into() })
            }
        }
    }

    #[tokio::test]
    async fn sign_in_writes_session_only_on_success() {
        let mut session = SessionStore::hydrate(MemoryStore::new()).unwrap();
        let bad = FakeAuth { accept: false, calls: Cell::new(0) };
        let err = sign_in(&bad, &mut session, "a@b.co", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(!session.is_authenticated());

        let good = FakeAuth { accept: true, calls: Cell::new(0) };
        let route = sign_in(&good, &mut session, " a@b.co ", "x").await.unwrap();
        assert_eq!(route, Route::AdminDashboard);
        assert_eq!(session.current_user().unwrap().email, "a@b.co");
    }

    #[tokio::test]
    async fn sign_in_requires_credentials() {
        let mut session = SessionStore::hydrate(MemoryStore::new()).unwrap();
        let api = FakeAuth { accept: true, calls: Cell::new(0) };
        let err = sign_in(&api, &mut session, "", "x").await.unwrap_err();
        assert!(matches!(err, LoginError::Missing("email")));
        assert_eq!(api.calls.get(), 0);
    }

    #[cfg(feature = "fs")]
    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set(TOKEN_KEY, "abc").unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
    }
}
