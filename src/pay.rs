//! WeChat Pay (微信支付) entry point

use std::sync::Arc;

use serde::Deserialize;

use crate::error::WechatError;
use crate::types::AppId;

/// Merchant configuration
#[derive(Clone, Deserialize)]
pub struct Config {
    pub app_id: AppId,
    pub mch_id: String,
    /// API key used to sign merchant requests
    pub key: String,
    #[serde(default)]
    pub notify_url: String,
}

impl Config {
    pub fn new(app_id: AppId, mch_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            app_id,
            mch_id: mch_id.into(),
            key: key.into(),
            notify_url: String::new(),
        }
    }

    pub fn with_notify_url(mut self, url: impl Into<String>) -> Self {
        self.notify_url = url.into();
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("mch_id", &self.mch_id)
            .field("notify_url", &self.notify_url)
            .finish_non_exhaustive()
    }
}

/// Payment API entry point.
///
/// Pay requests are signed with the merchant key, so no access token is involved.
#[derive(Debug, Clone)]
pub struct Pay {
    config: Arc<Config>,
}

impl Pay {
    /// # Errors
    /// Returns `WechatError::Config` if the merchant id or key is empty.
    pub fn new(config: Config) -> Result<Self, WechatError> {
        if config.mch_id.is_empty() {
            return Err(WechatError::Config("pay requires a merchant id".to_string()));
        }
        if config.key.is_empty() {
            return Err(WechatError::Config("pay requires a merchant key".to_string()));
        }
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
