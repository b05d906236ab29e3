//! Middleware components for the WeChat HTTP transport.
//!
//! Middleware follows the Tower `Layer`/`Service` pattern and is attached to a
//! [`WechatClient`](crate::client::WechatClient) with
//! [`with_middleware`](crate::client::WechatClient::with_middleware).
//!
//! ```ignore
//! use wechat_sdk::client::WechatClient;
//! use wechat_sdk::middleware::LoggingMiddleware;
//!
//! let client = WechatClient::builder()
//!     .build()?
//!     .with_middleware(LoggingMiddleware::new());
//! ```

// Re-export tower types for convenience
pub use tower::{Layer, Service};

mod logging;

pub use logging::{LoggingMiddleware, LoggingMiddlewareService};
