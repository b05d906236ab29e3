//! WeChat Work (企业微信) client

use std::sync::Arc;

use serde::Deserialize;

use crate::cache::Cache;
use crate::client::HttpTransport;
use crate::context::Context;
use crate::credential::{AccessTokenHandle, WorkAccessToken, CACHE_KEY_WORK_PREFIX};
use crate::error::WechatError;
use crate::types::{CorpId, CorpSecret};

/// WeChat Work application configuration
#[derive(Clone, Deserialize)]
pub struct Config {
    pub corp_id: CorpId,
    pub corp_secret: CorpSecret,
    #[serde(skip)]
    pub cache: Option<Arc<dyn Cache>>,
}

impl Config {
    pub fn new(corp_id: CorpId, corp_secret: CorpSecret) -> Self {
        Self {
            corp_id,
            corp_secret,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("corp_id", &self.corp_id)
            .field("cache", &self.cache.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

/// WeChat Work API entry point
#[derive(Debug, Clone)]
pub struct Work {
    ctx: Context<Config>,
}

impl Work {
    /// # Errors
    /// Returns `WechatError::Config` if the config has no cache.
    pub fn new(config: Config, transport: Arc<dyn HttpTransport>) -> Result<Self, WechatError> {
        let handle = WorkAccessToken::new(
            config.corp_id.clone(),
            config.corp_secret.clone(),
            CACHE_KEY_WORK_PREFIX,
            config.cache.clone(),
            transport,
        )?;

        Ok(Self {
            ctx: Context::new(Arc::new(config), Arc::new(handle)),
        })
    }

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
