//! HTTP transport for WeChat API calls
//!
//! [`HttpTransport`] is the seam credential providers depend on;
//! [`WechatClient`] is the reqwest-backed implementation.

mod transport;
pub use transport::{HttpTransport, TransportFuture};

mod wechat_client;
pub use wechat_client::{WechatClient, WechatClientBuilder};

pub(crate) use wechat_client::{DEFAULT_BASE_URL, WORK_BASE_URL};
