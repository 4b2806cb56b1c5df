use fv_core::session::{KeyValueStore, SessionError, SessionStore};
use web_sys::Storage;

/// `window.localStorage`, looked up on every access.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn local_storage() -> Result<Storage, SessionError> {
    web_sys::window()
        .ok_or_else(|| SessionError::Storage("no global window".into()))?
        .local_storage()
        .map_err(|e| SessionError::Storage(format!("{e:?}")))?
        .ok_or_else(|| SessionError::Storage("localStorage is disabled".into()))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| SessionError::Storage(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| SessionError::Storage(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        local_storage()?
            .remove_item(key)
            .map_err(|e| SessionError::Storage(format!("{e:?}")))
    }
}

/// Session as currently persisted in the browser.
pub fn browser_session() -> Result<SessionStore<LocalStorage>, SessionError> {
    SessionStore::hydrate(LocalStorage)
}
