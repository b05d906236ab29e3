//! Access token acquisition and caching
//!
//! A provider returns a bearer token for one principal. Tokens live in a shared
//! [`Cache`](crate::cache::Cache) under `"{prefix}_access_token_{principal}"`,
//! with a TTL shortened by an expiry buffer so the cached copy always expires
//! before the one on the WeChat side.
//!
//! Concurrent callers of one provider never race to the token endpoint: a
//! cache miss takes a provider-scoped lock and re-reads the cache before
//! issuing a request, so callers that lose the race get the winner's token.
//! The lock is per process. Providers in other processes sharing a network
//! cache may still fetch concurrently.

mod default;
pub mod server;
mod slot;
mod work;

pub use default::DefaultAccessToken;
pub use work::WorkAccessToken;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::WechatError;

/// Cache key prefix for official accounts
pub const CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX: &str = "gowechat_officialaccount_";
/// Cache key prefix for mini programs
pub const CACHE_KEY_MINI_PROGRAM_PREFIX: &str = "gowechat_miniprogram_";
/// Cache key prefix for WeChat Work
pub const CACHE_KEY_WORK_PREFIX: &str = "gowechat_work_";

/// Subtracted from `expires_in` before a token is cached
pub const DEFAULT_EXPIRY_BUFFER: Duration = Duration::from_secs(1500);

pub type CredentialFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, WechatError>> + Send + 'a>>;

/// Source of access tokens for product APIs.
///
/// Products hold an `Arc<dyn AccessTokenHandle>`, so a custom implementation
/// (a central token service, a test double) can replace the built-in providers.
pub trait AccessTokenHandle: Send + Sync {
    /// Returns a valid access token, fetching one if none is cached.
    fn get_access_token(&self) -> CredentialFuture<'_>;
}

/// Builds the cache key for a principal under a namespace prefix
pub fn cache_key(prefix: &str, principal_id: &str) -> String {
    format!("{prefix}_access_token_{principal_id}")
}

/// Checks an issuance base URL and drops any trailing `/`.
///
/// # Errors
/// Returns `WechatError::Config` unless `url` is an absolute http(s) URL.
pub(crate) fn normalize_base_url(url: &str) -> Result<String, WechatError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| WechatError::Config(format!("invalid base URL {url:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
        return Err(WechatError::Config(format!(
            "base URL must be an http(s) URL with a host, got {url:?}"
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}
