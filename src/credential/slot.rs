use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::Mutex;

use super::server::TokenResponse;
use crate::cache::Cache;
use crate::error::WechatError;
use crate::types::AccessToken;

/// One cache entry plus the lock that serializes refreshes of it
pub(crate) struct TokenSlot {
    cache: Arc<dyn Cache>,
    key: String,
    expiry_buffer: Duration,
    refresh_lock: Mutex<()>,
}

impl TokenSlot {
    pub(crate) fn new(cache: Arc<dyn Cache>, key: String, expiry_buffer: Duration) -> Self {
        Self {
            cache,
            key,
            expiry_buffer,
            refresh_lock: Mutex::new(()),
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn expiry_buffer(&self) -> Duration {
        self.expiry_buffer
    }

    pub(crate) fn set_expiry_buffer(&mut self, buffer: Duration) {
        self.expiry_buffer = buffer;
    }

    /// Returns the cached token, or runs `fetch` once and caches its result.
    pub(crate) async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<String, WechatError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TokenResponse, WechatError>>,
    {
        if let Some(token) = self.cache.get(&self.key) {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        if let Some(token) = self.cache.get(&self.key) {
            return Ok(token);
        }

        debug!("access token cache miss for {}, requesting a new one", self.key);

        let response = fetch().await?;
        let token = AccessToken::new(response.access_token).map_err(WechatError::Token)?;
        let ttl = effective_ttl(response.expires_in, self.expiry_buffer)?;

        self.cache.set(&self.key, token.as_str(), ttl)?;
        debug!("cached access token under {} for {:?}", self.key, ttl);

        Ok(token.into_string())
    }
}

/// `expires_in` minus the buffer; the result must be strictly positive
pub(crate) fn effective_ttl(expires_in: i64, buffer: Duration) -> Result<Duration, WechatError> {
    let buffer_secs = i64::try_from(buffer.as_secs()).unwrap_or(i64::MAX);
    let secs = expires_in.saturating_sub(buffer_secs);
    if secs <= 0 {
        return Err(WechatError::Token(format!(
            "expires_in of {expires_in}s does not exceed the {buffer_secs}s expiry buffer"
        )));
    }
    Ok(Duration::from_secs(secs.unsigned_abs()))
}
