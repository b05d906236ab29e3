//! Official account (公众号) client

use std::sync::Arc;

use serde::Deserialize;

use crate::cache::Cache;
use crate::client::HttpTransport;
use crate::context::Context;
use crate::credential::{AccessTokenHandle, DefaultAccessToken, CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX};
use crate::error::WechatError;
use crate::types::{AppId, AppSecret};

/// Official account configuration
#[derive(Clone, Deserialize)]
pub struct Config {
    pub app_id: AppId,
    pub app_secret: AppSecret,
    /// Server token used to verify message push signatures
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub encoding_aes_key: String,
    /// Fetch tokens from `/cgi-bin/stable_token` instead of `/cgi-bin/token`
    #[serde(default, rename = "useStableAccessToken")]
    pub use_stable_access_token: bool,
    #[serde(skip)]
    pub cache: Option<Arc<dyn Cache>>,
}

impl Config {
    pub fn new(app_id: AppId, app_secret: AppSecret) -> Self {
        Self {
            app_id,
            app_secret,
            token: String::new(),
            encoding_aes_key: String::new(),
            use_stable_access_token: false,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_stable_access_token(mut self, enabled: bool) -> Self {
        self.use_stable_access_token = enabled;
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("use_stable_access_token", &self.use_stable_access_token)
            .field("cache", &self.cache.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

/// Official account API entry point
#[derive(Debug, Clone)]
pub struct OfficialAccount {
    ctx: Context<Config>,
}

impl OfficialAccount {
    /// # Errors
    /// Returns `WechatError::Config` if the config has no cache.
    pub fn new(config: Config, transport: Arc<dyn HttpTransport>) -> Result<Self, WechatError> {
        let handle = DefaultAccessToken::new(
            config.app_id.clone(),
            config.app_secret.clone(),
            CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
            config.cache.clone(),
            transport,
            config.use_stable_access_token,
        )?;

        Ok(Self {
            ctx: Context::new(Arc::new(config), Arc::new(handle)),
        })
    }

    /// Use a custom way of obtaining access tokens
    pub fn set_access_token_handle(&mut self, handle: Arc<dyn AccessTokenHandle>) {
        self.ctx.set_access_token_handle(handle);
    }

    pub fn context(&self) -> &Context<Config> {
        &self.ctx
    }

    pub async fn get_access_token(&self) -> Result<String, WechatError> {
        self.ctx.get_access_token().await
    }
}
