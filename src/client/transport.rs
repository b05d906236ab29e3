use std::future::Future;
use std::pin::Pin;

use crate::error::WechatError;

/// Boxed future returned by [`HttpTransport`] calls, resolving to the raw response body
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<u8>, WechatError>> + Send + 'a>>;

/// Minimal HTTP contract used by the token issuance calls.
///
/// Implementations own timeouts and connection handling. Any failure to reach
/// the server or a non-success status must be reported as an error; the body
/// of a successful response is returned undecoded.
pub trait HttpTransport: Send + Sync {
    /// Issues a GET to a fully-parameterized URL.
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a>;

    /// Issues a POST with `body` serialized as JSON.
    fn post_json<'a>(&'a self, url: &'a str, body: serde_json::Value) -> TransportFuture<'a>;
}
