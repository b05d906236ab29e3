//! Shared context of a product client
//!
//! Every product (official account, mini program, work) pairs its config with
//! an access token handle. The handle can be swapped after construction.

use std::sync::Arc;

use crate::credential::AccessTokenHandle;
use crate::error::WechatError;

/// Config plus access token handle of one product client
pub struct Context<C> {
    config: Arc<C>,
    access_token_handle: Arc<dyn AccessTokenHandle>,
}

impl<C> Clone for Context<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            access_token_handle: Arc::clone(&self.access_token_handle),
        }
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for Context<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("access_token_handle", &"AccessTokenHandle { .. }")
            .finish()
    }
}

impl<C> Context<C> {
    pub fn new(config: Arc<C>, access_token_handle: Arc<dyn AccessTokenHandle>) -> Self {
        Self {
            config,
            access_token_handle,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn access_token_handle(&self) -> &Arc<dyn AccessTokenHandle> {
        &self.access_token_handle
    }

    /// Replace the handle used by every later [`get_access_token`](Self::get_access_token)
    pub fn set_access_token_handle(&mut self, handle: Arc<dyn AccessTokenHandle>) {
        self.access_token_handle = handle;
    }

    pub async fn get_access_token(&self) -> Result<String, WechatError> {
        self.access_token_handle.get_access_token().await
    }
}
