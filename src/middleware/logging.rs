use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use log::{debug, info, Level};
use reqwest::{Request, Response, Url};
use tower::{Layer, Service};

const LOG_TARGET: &str = "wechat_sdk::http";

/// Query parameters whose values never reach the log output
const SENSITIVE_PARAMS: &[&str] = &[
    "access_token",
    "appsecret",
    "secret",
    "corpsecret",
    "session_key",
    "password",
    "token",
    "authorization",
];

/// Logs each outgoing request and its response status.
///
/// Credentials in the query string (`secret`, `corpsecret`, `access_token`, ...)
/// are replaced with `[REDACTED]`. Requests are logged at `info` by default or
/// at `debug` when built with [`verbose`](Self::verbose).
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    level: Level,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self { level: Level::Info }
    }

    pub fn verbose(mut self) -> Self {
        self.level = Level::Debug;
        self
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for LoggingMiddleware {
    type Service = LoggingMiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddlewareService {
            inner,
            level: self.level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingMiddlewareService<S> {
    inner: S,
    level: Level,
}

pub(crate) fn redact_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if SENSITIVE_PARAMS
                .iter()
                .any(|s| key.eq_ignore_ascii_case(s))
            {
                "[REDACTED]".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

fn emit(level: Level, message: std::fmt::Arguments<'_>) {
    if level == Level::Debug {
        debug!(target: LOG_TARGET, "{}", message);
    } else {
        info!(target: LOG_TARGET, "{}", message);
    }
}

impl<S> Service<Request> for LoggingMiddlewareService<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method = req.method().clone();
        let url = redact_url(req.url());
        let level = self.level;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            emit(level, format_args!(">>> {method} {url}"));

            let start = Instant::now();
            let response = inner.call(req).await?;
            let status = response.status();

            emit(
                level,
                format_args!(
                    "<<< {} {} ({:?})",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or(""),
                    start.elapsed()
                ),
            );

            Ok(response)
        })
    }
}
