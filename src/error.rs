use thiserror::Error;

use crate::cache::CacheError;

/// Transport-level failures
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// WeChat SDK error types
#[derive(Debug, Error)]
pub enum WechatError {
    #[error("HTTP request error: {0}")]
    Http(#[from] HttpError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WeChat API error (code={code}): {message}")]
    Api { code: i32, message: String },

    #[error("Access token error: {0}")]
    Token(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl WechatError {
    /// Turns a WeChat `errcode`/`errmsg` pair into a result.
    ///
    /// `errcode == 0` means success; anything else becomes [`WechatError::Api`].
    pub fn check_api(code: i32, message: &str) -> Result<(), WechatError> {
        if code == 0 {
            return Ok(());
        }
        Err(WechatError::Api {
            code,
            message: message.to_string(),
        })
    }

    /// The platform error code, if this is an API error
    pub fn api_code(&self) -> Option<i32> {
        match self {
            WechatError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WechatError {
    fn from(e: reqwest::Error) -> Self {
        WechatError::Http(HttpError::Reqwest(e))
    }
}
