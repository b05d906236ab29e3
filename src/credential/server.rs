//! Token issuance calls against the WeChat servers
//!
//! These functions always go to the network; caching is the providers' job.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::client::HttpTransport;
use crate::error::WechatError;

pub const ACCESS_TOKEN_PATH: &str = "/cgi-bin/token";
pub const STABLE_ACCESS_TOKEN_PATH: &str = "/cgi-bin/stable_token";
pub const WORK_ACCESS_TOKEN_PATH: &str = "/cgi-bin/gettoken";

/// Unreserved characters (RFC 3986) stay as they are in query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Body of `POST /cgi-bin/stable_token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StableAccessTokenRequest {
    pub appid: String,
    pub secret: String,
    pub grant_type: String,
    pub force_refresh: bool,
}

impl StableAccessTokenRequest {
    /// A `client_credential` request that always mints a fresh token
    pub fn force_refresh(appid: &str, secret: &str) -> Self {
        Self {
            appid: appid.to_string(),
            secret: secret.to_string(),
            grant_type: "client_credential".to_string(),
            force_refresh: true,
        }
    }
}

/// Response of every token issuance endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub errcode: i32,
    #[serde(default)]
    pub errmsg: String,
}

impl TokenResponse {
    pub fn is_success(&self) -> bool {
        self.errcode == 0
    }
}

fn encode(value: &str) -> percent_encoding::PercentEncode<'_> {
    utf8_percent_encode(value, QUERY_VALUE)
}

/// `GET /cgi-bin/token` URL for an app id and secret
pub fn access_token_url(base_url: &str, appid: &str, secret: &str) -> String {
    format!(
        "{base_url}{ACCESS_TOKEN_PATH}?grant_type=client_credential&appid={}&secret={}",
        encode(appid),
        encode(secret)
    )
}

/// `GET /cgi-bin/gettoken` URL for a WeChat Work corp id and secret
pub fn work_access_token_url(base_url: &str, corp_id: &str, corp_secret: &str) -> String {
    format!(
        "{base_url}{WORK_ACCESS_TOKEN_PATH}?corpid={}&corpsecret={}",
        encode(corp_id),
        encode(corp_secret)
    )
}

fn decode(body: &[u8]) -> Result<TokenResponse, WechatError> {
    let response: TokenResponse = serde_json::from_slice(body)?;
    WechatError::check_api(response.errcode, &response.errmsg)?;
    Ok(response)
}

/// Fetches a token with a GET to a fully-parameterized issuance URL.
///
/// # Errors
/// - `WechatError::Http` if the request fails
/// - `WechatError::Json` if the body is not a token response
/// - `WechatError::Api` if `errcode` is non-zero, whatever else the body holds
pub async fn get_token_from_server(
    transport: &dyn HttpTransport,
    url: &str,
) -> Result<TokenResponse, WechatError> {
    let body = transport.get(url).await?;
    decode(&body)
}

/// Fetches a stable token with `force_refresh: true`.
///
/// Same error rules as [`get_token_from_server`].
pub async fn post_token_from_server(
    transport: &dyn HttpTransport,
    base_url: &str,
    appid: &str,
    secret: &str,
) -> Result<TokenResponse, WechatError> {
    let url = format!("{base_url}{STABLE_ACCESS_TOKEN_PATH}");
    let request = StableAccessTokenRequest::force_refresh(appid, secret);
    let body = transport
        .post_json(&url, serde_json::to_value(&request)?)
        .await?;
    decode(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_success_parse() {
        let json = r#"{"access_token": "ACCESS_TOKEN", "expires_in": 7200}"#;
        let response = decode(json.as_bytes()).unwrap();
        assert!(response.is_success());
        assert_eq!(response.access_token, "ACCESS_TOKEN");
        assert_eq!(response.expires_in, 7200);
    }

    #[test]
    fn test_nonzero_errcode_wins_over_token() {
        let json = r#"{"access_token": "ignored", "expires_in": 7200, "errcode": 40013, "errmsg": "invalid appid"}"#;
        let err = decode(json.as_bytes()).unwrap_err();
        assert_eq!(err.api_code(), Some(40013));
    }

    #[test]
    fn test_zero_errcode_is_success() {
        let json = r#"{"access_token": "tok", "expires_in": 7200, "errcode": 0, "errmsg": "ok"}"#;
        assert!(decode(json.as_bytes()).is_ok());
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = decode(b"<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, WechatError::Json(_)));
    }

    #[test]
    fn test_stable_request_body() {
        let request = StableAccessTokenRequest::force_refresh("wx1234567890abcdef", "secret");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "appid": "wx1234567890abcdef",
                "secret": "secret",
                "grant_type": "client_credential",
                "force_refresh": true
            })
        );
    }

    #[test]
    fn test_access_token_url() {
        let url = access_token_url("https://api.weixin.qq.com", "wx1234567890abcdef", "s3cr3t");
        assert_eq!(
            url,
            "https://api.weixin.qq.com/cgi-bin/token?grant_type=client_credential&appid=wx1234567890abcdef&secret=s3cr3t"
        );
    }

    #[test]
    fn test_url_values_are_encoded() {
        let url = work_access_token_url("https://qyapi.weixin.qq.com", "ww1", "a&b=c d");
        assert_eq!(
            url,
            "https://qyapi.weixin.qq.com/cgi-bin/gettoken?corpid=ww1&corpsecret=a%26b%3Dc%20d"
        );
    }
}
