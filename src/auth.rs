//! Process-wide bearer token storage.
//!
//! The token's acquisition and refresh lifecycle belongs to the host
//! application; this module only holds the current credential so the HTTP
//! client can read it on every request.

use once_cell::sync::Lazy;
use std::sync::RwLock;

static STORE: Lazy<TokenStore> = Lazy::new(TokenStore::default);

#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn set(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into());
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }

    /// Current credential formatted as an `Authorization` header value.
    pub fn bearer(&self) -> Option<String> {
        self.token
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| format!("Bearer {t}")))
    }
}

/// The process-wide store read by [`crate::client::HttpEntryApi`].
pub fn store() -> &'static TokenStore {
    &STORE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_formats_and_clears() {
        let store = TokenStore::default();
        assert_eq!(store.bearer(), None);

        store.set("abc.def.ghi");
        assert_eq!(store.bearer().as_deref(), Some("Bearer abc.def.ghi"));

        store.clear();
        assert_eq!(store.bearer(), None);
    }
}
