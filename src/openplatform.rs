//! Open platform (开放平台) client

use std::sync::Arc;

use serde::Deserialize;

use crate::cache::Cache;
use crate::error::WechatError;
use crate::types::{AppId, AppSecret};

/// Open platform (third-party platform) configuration
#[derive(Clone, Deserialize)]
pub struct Config {
    pub app_id: AppId,
    pub app_secret: AppSecret,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub encoding_aes_key: String,
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
            .field("app_id", &self.app_id)
            .field("cache", &self.cache.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

/// Open platform API entry point
#[derive(Clone)]
pub struct OpenPlatform {
    config: Arc<Config>,
    cache: Arc<dyn Cache>,
}

impl std::fmt::Debug for OpenPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenPlatform")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenPlatform {
    /// # Errors
    /// Returns `WechatError::Config` if the config has no cache.
    pub fn new(config: Config) -> Result<Self, WechatError> {
        let cache = config
            .cache
            .clone()
            .ok_or_else(|| WechatError::Config("open platform requires a cache".to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            cache,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Cache shared with accounts authorized through this platform
    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }
}
