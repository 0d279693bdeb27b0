/// Client-side credential storage.
///
/// Holds at most one access/refresh pair for the life of the process.
/// Writes happen at login and at the end of a refresh cycle; a failed
/// refresh clears everything (forced logout).

use std::sync::Mutex;

use crate::auth::TokenPair;

#[derive(Default)]
pub struct TokenStore {
    inner: Mutex<Option<TokenPair>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, pair: TokenPair) {
        *self.inner.lock().unwrap() = Some(pair);
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .as_ref()
            .map(|pair| pair.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .as_ref()
            .map(|pair| pair.refresh_token.clone())
    }

    pub fn clear(&self) {
        *self.inner.lock().unwrap() = None;
    }
}
