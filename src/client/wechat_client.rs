//! WeChat HTTP Client
//!
//! Provides the reqwest-backed [`HttpTransport`] used by default.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use reqwest::{Client, Request, Response};
use tower::{Layer, Service};

use super::transport::{HttpTransport, TransportFuture};
use crate::error::{HttpError, WechatError};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.weixin.qq.com";
pub(crate) const WORK_BASE_URL: &str = "https://qyapi.weixin.qq.com";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, reqwest::Error>> + Send>>;
type MiddlewareExecutor = Arc<dyn Fn(Request) -> MiddlewareFuture + Send + Sync>;

/// WeChat API Client
///
/// Reusable HTTP client shared by every credential provider and product.
/// Built with reqwest for async HTTP requests.
#[derive(Clone)]
pub struct WechatClient {
    http: Client,
    middleware_executor: Option<MiddlewareExecutor>,
}

impl std::fmt::Debug for WechatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatClient")
            .field(
                "middleware_executor",
                &self.middleware_executor.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}

impl WechatClient {
    /// Create a new client builder
    pub fn builder() -> WechatClientBuilder {
        WechatClientBuilder::default()
    }

    /// Routes every request sent through [`HttpTransport`] via `middleware`.
    ///
    /// The layer wraps a copy of this client without middleware, so layering
    /// twice replaces the previous pipeline instead of nesting it.
    pub fn with_middleware<L>(mut self, middleware: L) -> Self
    where
        L: Layer<WechatClient>,
        L::Service: Service<Request, Response = Response, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        let bare = WechatClient {
            http: self.http.clone(),
            middleware_executor: None,
        };
        self.middleware_executor = Some(make_middleware_executor(middleware.layer(bare)));
        self
    }

    async fn send_request(&self, request: Request) -> Result<Response, reqwest::Error> {
        if let Some(executor) = &self.middleware_executor {
            (executor)(request).await
        } else {
            self.http.execute(request).await
        }
    }

    async fn execute(&self, request: Request) -> Result<Vec<u8>, WechatError> {
        let response = self.send_request(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: response.url().path().to_string(),
            }
            .into());
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn make_middleware_executor<S>(service: S) -> MiddlewareExecutor
where
    S: Service<Request, Response = Response, Error = reqwest::Error> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    let service = Arc::new(service);

    Arc::new(move |request: Request| {
        let mut service = (*service).clone();
        let future: MiddlewareFuture = Box::pin(async move { service.call(request).await });
        future
    })
}

impl HttpTransport for WechatClient {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        Box::pin(async move {
            let request = self.http.get(url).build()?;
            self.execute(request).await
        })
    }

    fn post_json<'a>(&'a self, url: &'a str, body: serde_json::Value) -> TransportFuture<'a> {
        Box::pin(async move {
            let request = self.http.post(url).json(&body).build()?;
            self.execute(request).await
        })
    }
}

impl Service<Request> for WechatClient {
    type Response = Response;
    type Error = reqwest::Error;
    type Future = MiddlewareFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let client = self.http.clone();
        Box::pin(async move { client.execute(req).await })
    }
}

/// Builder for WechatClient
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use wechat_sdk::client::WechatClient;
///
/// let client = WechatClient::builder()
///     .timeout(Duration::from_secs(15))
///     .build()
///     .unwrap();
/// # let _ = client;
/// ```
#[derive(Debug, Default)]
pub struct WechatClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl WechatClientBuilder {
    /// Set the total timeout for requests
    ///
    /// Default: 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the WechatClient
    ///
    /// # Errors
    /// Returns an error if the underlying reqwest client cannot be created
    pub fn build(self) -> Result<WechatClient, WechatError> {
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(WechatClient {
            http: client,
            middleware_executor: None,
        })
    }
}
