use std::sync::Arc;
use std::time::Duration;

use super::server::{self, TokenResponse};
use super::slot::TokenSlot;
use super::{
    cache_key, normalize_base_url, AccessTokenHandle, CredentialFuture, DEFAULT_EXPIRY_BUFFER,
};
use crate::cache::Cache;
use crate::client::{HttpTransport, WORK_BASE_URL};
use crate::error::WechatError;
use crate::types::{CorpId, CorpSecret};

/// Access token provider for WeChat Work (enterprise) applications.
///
/// Tokens come from `GET https://qyapi.weixin.qq.com/cgi-bin/gettoken`.
pub struct WorkAccessToken {
    corp_id: CorpId,
    corp_secret: CorpSecret,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    slot: TokenSlot,
}

impl std::fmt::Debug for WorkAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkAccessToken")
            .field("corp_id", &self.corp_id)
            .field("base_url", &self.base_url)
            .field("cache_key", &self.slot.key())
            .finish_non_exhaustive()
    }
}

impl WorkAccessToken {
    /// Create a provider for `corp_id`.
    ///
    /// # Errors
    /// Returns `WechatError::Config` if `cache` is `None`.
    pub fn new(
        corp_id: CorpId,
        corp_secret: CorpSecret,
        cache_key_prefix: &str,
        cache: Option<Arc<dyn Cache>>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, WechatError> {
        let cache = cache.ok_or_else(|| {
            WechatError::Config("a cache is required for the work access token provider".to_string())
        })?;
        let key = cache_key(cache_key_prefix, corp_id.as_str());

        Ok(Self {
            corp_id,
            corp_secret,
            base_url: WORK_BASE_URL.to_string(),
            transport,
            slot: TokenSlot::new(cache, key, DEFAULT_EXPIRY_BUFFER),
        })
    }

    /// Send issuance requests to `url` instead of `https://qyapi.weixin.qq.com`
    ///
    /// # Errors
    /// Returns `WechatError::Config` if `url` is not an absolute http(s) URL.
    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Result<Self, WechatError> {
        self.base_url = normalize_base_url(url.as_ref())?;
        Ok(self)
    }

    pub fn with_expiry_buffer(mut self, buffer: Duration) -> Self {
        self.slot.set_expiry_buffer(buffer);
        self
    }

    pub fn corp_id(&self) -> &str {
        self.corp_id.as_str()
    }

    pub fn cache_key(&self) -> &str {
        self.slot.key()
    }

    async fn fetch(&self) -> Result<TokenResponse, WechatError> {
        let url = server::work_access_token_url(
            &self.base_url,
            self.corp_id.as_str(),
            self.corp_secret.as_str(),
        );
        server::get_token_from_server(self.transport.as_ref(), &url).await
    }
}

impl AccessTokenHandle for WorkAccessToken {
    fn get_access_token(&self) -> CredentialFuture<'_> {
        Box::pin(self.slot.get_or_fetch(|| self.fetch()))
    }
}
