use std::sync::Arc;
use std::time::Duration;

use super::server::{self, TokenResponse};
use super::slot::TokenSlot;
use super::{
    cache_key, normalize_base_url, AccessTokenHandle, CredentialFuture, DEFAULT_EXPIRY_BUFFER,
};
use crate::cache::Cache;
use crate::client::{HttpTransport, DEFAULT_BASE_URL};
use crate::error::WechatError;
use crate::types::{AppId, AppSecret};

/// Access token provider for official accounts and mini programs.
///
/// Tokens come from `GET /cgi-bin/token`, or from `POST /cgi-bin/stable_token`
/// with `force_refresh` when the stable mode is enabled.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use wechat_sdk::cache::MemoryCache;
/// use wechat_sdk::client::WechatClient;
/// use wechat_sdk::credential::{AccessTokenHandle, DefaultAccessToken, CACHE_KEY_MINI_PROGRAM_PREFIX};
/// use wechat_sdk::types::{AppId, AppSecret};
///
/// let provider = DefaultAccessToken::new(
///     AppId::new("wx1234567890abcdef")?,
///     AppSecret::new("your_secret")?,
///     CACHE_KEY_MINI_PROGRAM_PREFIX,
///     Some(Arc::new(MemoryCache::new())),
///     Arc::new(WechatClient::builder().build()?),
///     false,
/// )?;
/// let token = provider.get_access_token().await?;
/// ```
pub struct DefaultAccessToken {
    app_id: AppId,
    app_secret: AppSecret,
    use_stable_access_token: bool,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    slot: TokenSlot,
}

impl std::fmt::Debug for DefaultAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultAccessToken")
            .field("app_id", &self.app_id)
            .field("use_stable_access_token", &self.use_stable_access_token)
            .field("base_url", &self.base_url)
            .field("cache_key", &self.slot.key())
            .finish_non_exhaustive()
    }
}

impl DefaultAccessToken {
    /// Create a provider for `app_id`.
    ///
    /// # Errors
    /// Returns `WechatError::Config` if `cache` is `None`.
    pub fn new(
        app_id: AppId,
        app_secret: AppSecret,
        cache_key_prefix: &str,
        cache: Option<Arc<dyn Cache>>,
        transport: Arc<dyn HttpTransport>,
        use_stable_access_token: bool,
    ) -> Result<Self, WechatError> {
        let cache = cache.ok_or_else(|| {
            WechatError::Config("a cache is required for the access token provider".to_string())
        })?;
        let key = cache_key(cache_key_prefix, app_id.as_str());

        Ok(Self {
            app_id,
            app_secret,
            use_stable_access_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            transport,
            slot: TokenSlot::new(cache, key, DEFAULT_EXPIRY_BUFFER),
        })
    }

    /// Send issuance requests to `url` instead of `https://api.weixin.qq.com`
    ///
    /// # Errors
    /// Returns `WechatError::Config` if `url` is not an absolute http(s) URL.
    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Result<Self, WechatError> {
        self.base_url = normalize_base_url(url.as_ref())?;
        Ok(self)
    }

    /// Change the margin subtracted from `expires_in` before caching
    ///
    /// Default: 1500 seconds
    pub fn with_expiry_buffer(mut self, buffer: Duration) -> Self {
        self.slot.set_expiry_buffer(buffer);
        self
    }

    pub fn app_id(&self) -> &str {
        self.app_id.as_str()
    }

    pub fn cache_key(&self) -> &str {
        self.slot.key()
    }

    pub fn expiry_buffer(&self) -> Duration {
        self.slot.expiry_buffer()
    }

    pub fn uses_stable_access_token(&self) -> bool {
        self.use_stable_access_token
    }

    async fn fetch(&self) -> Result<TokenResponse, WechatError> {
        if self.use_stable_access_token {
            server::post_token_from_server(
                self.transport.as_ref(),
                &self.base_url,
                self.app_id.as_str(),
                self.app_secret.as_str(),
            )
            .await
        } else {
            let url = server::access_token_url(
                &self.base_url,
                self.app_id.as_str(),
                self.app_secret.as_str(),
            );
            server::get_token_from_server(self.transport.as_ref(), &url).await
        }
    }
}

impl AccessTokenHandle for DefaultAccessToken {
    fn get_access_token(&self) -> CredentialFuture<'_> {
        Box::pin(self.slot.get_or_fetch(|| self.fetch()))
    }
}
