//! WeChat platform SDK for Rust
//!
//! Clients for official accounts, mini programs, WeChat Work, the open
//! platform and WeChat Pay, built around a shared access token cache.
//!
//! ## Access tokens
//!
//! Every product API call needs an `access_token`. The providers in
//! [`credential`] fetch it from WeChat, keep it in a [`Cache`](cache::Cache)
//! with a TTL 1500 seconds shorter than the server's `expires_in`, and make
//! sure concurrent callers on one provider trigger a single fetch.
//!
//! | Product | Provider | Issuance endpoint |
//! |---------|----------|-------------------|
//! | Official account | [`credential::DefaultAccessToken`] | `/cgi-bin/token` or `/cgi-bin/stable_token` |
//! | Mini program | [`credential::DefaultAccessToken`] | `/cgi-bin/token` |
//! | WeChat Work | [`credential::WorkAccessToken`] | `qyapi.weixin.qq.com/cgi-bin/gettoken` |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wechat_sdk::cache::MemoryCache;
//! use wechat_sdk::types::{AppId, AppSecret};
//! use wechat_sdk::{miniprogram, Wechat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut wechat = Wechat::new()?;
//!     wechat.set_cache(Arc::new(MemoryCache::new()));
//!
//!     let mini = wechat.mini_program(miniprogram::Config::new(
//!         AppId::new("wx1234567890abcdef")?,
//!         AppSecret::new("your_secret")?,
//!     ))?;
//!
//!     let token = mini.get_access_token().await?;
//!     println!("token: {}", token);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cache`] - Cache contract and in-memory implementation
//! - [`client`] - HTTP transport contract and reqwest client
//! - [`context`] - Config plus access token handle shared by product clients
//! - [`credential`] - Access token providers and issuance calls
//! - [`error`] - Error types
//! - [`middleware`] - Tower middleware for the HTTP client
//! - [`pay`] - WeChat Pay merchant entry point
//! - [`types`] - Validated identifiers
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! use wechat_sdk::WechatError;
//!
//! match mini.get_access_token().await {
//!     Ok(token) => { /* call the API */ }
//!     Err(WechatError::Api { code, message }) => {
//!         eprintln!("API error: {} - {}", code, message);
//!     }
//!     Err(WechatError::Http(e)) => {
//!         eprintln!("HTTP error: {}", e);
//!     }
//!     Err(e) => {
//!         eprintln!("Other error: {}", e);
//!     }
//! }
//! ```

pub mod cache;
pub mod client;
pub mod context;
pub mod credential;
pub mod error;
pub mod middleware;
pub mod miniprogram;
pub mod officialaccount;
pub mod openplatform;
pub mod pay;
pub mod types;
mod wechat;
pub mod work;

pub use cache::{Cache, MemoryCache};
pub use client::{HttpTransport, WechatClient};
pub use credential::{AccessTokenHandle, DefaultAccessToken, WorkAccessToken};
pub use error::WechatError;
pub use wechat::Wechat;
