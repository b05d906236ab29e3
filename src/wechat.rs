use std::sync::Arc;

use crate::cache::Cache;
use crate::client::{HttpTransport, WechatClient};
use crate::error::WechatError;
use crate::miniprogram::{self, MiniProgram};
use crate::officialaccount::{self, OfficialAccount};
use crate::openplatform::{self, OpenPlatform};
use crate::pay::{self, Pay};
use crate::work::{self, Work};

/// Entry point handing a shared cache and HTTP transport to every product.
///
/// A config that already carries a cache keeps it; otherwise the default cache
/// set with [`set_cache`](Self::set_cache) is used.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use wechat_sdk::{cache::MemoryCache, officialaccount, types::{AppId, AppSecret}, Wechat};
///
/// let mut wechat = Wechat::new()?;
/// wechat.set_cache(Arc::new(MemoryCache::new()));
///
/// let account = wechat.official_account(officialaccount::Config::new(
///     AppId::new("wx1234567890abcdef")?,
///     AppSecret::new("your_secret")?,
/// ))?;
/// let token = account.get_access_token().await?;
/// ```
#[derive(Clone)]
pub struct Wechat {
    cache: Option<Arc<dyn Cache>>,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for Wechat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wechat")
            .field("cache", &self.cache.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl Wechat {
    /// Create a facade backed by a default [`WechatClient`]
    pub fn new() -> Result<Self, WechatError> {
        let client = WechatClient::builder().build()?;
        Ok(Self::with_transport(Arc::new(client)))
    }

    /// Create a facade that sends every token request through `transport`
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            cache: None,
            transport,
        }
    }

    /// Set the default cache for product configs that have none
    pub fn set_cache(&mut self, cache: Arc<dyn Cache>) {
        self.cache = Some(cache);
    }

    fn fill_cache(&self, cache: &mut Option<Arc<dyn Cache>>) {
        if cache.is_none() {
            cache.clone_from(&self.cache);
        }
    }

    pub fn official_account(
        &self,
        mut config: officialaccount::Config,
    ) -> Result<OfficialAccount, WechatError> {
        self.fill_cache(&mut config.cache);
        OfficialAccount::new(config, Arc::clone(&self.transport))
    }

    pub fn mini_program(&self, mut config: miniprogram::Config) -> Result<MiniProgram, WechatError> {
        self.fill_cache(&mut config.cache);
        MiniProgram::new(config, Arc::clone(&self.transport))
    }

    pub fn work(&self, mut config: work::Config) -> Result<Work, WechatError> {
        self.fill_cache(&mut config.cache);
        Work::new(config, Arc::clone(&self.transport))
    }

    pub fn open_platform(
        &self,
        mut config: openplatform::Config,
    ) -> Result<OpenPlatform, WechatError> {
        self.fill_cache(&mut config.cache);
        OpenPlatform::new(config)
    }

    /// Payments are signed with the merchant key, so the default cache is not applied.
    pub fn pay(&self, config: pay::Config) -> Result<Pay, WechatError> {
        Pay::new(config)
    }
}
