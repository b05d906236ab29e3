//! Basic usage example for wechat-sdk
//!
//! Run with:
//! WECHAT_APP_ID=wx... WECHAT_APP_SECRET=... cargo run --example basic_usage

use std::sync::Arc;

use wechat_sdk::{
    cache::MemoryCache,
    middleware::LoggingMiddleware,
    miniprogram,
    types::{AppId, AppSecret},
    Wechat, WechatClient, WechatError,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app_id = std::env::var("WECHAT_APP_ID").unwrap_or_else(|_| "wx1234567890abcdef".into());
    let app_secret =
        std::env::var("WECHAT_APP_SECRET").unwrap_or_else(|_| "your_app_secret_here".into());

    let client = WechatClient::builder()
        .build()?
        .with_middleware(LoggingMiddleware::new());

    let mut wechat = Wechat::with_transport(Arc::new(client));
    wechat.set_cache(Arc::new(MemoryCache::new()));

    let mini = wechat.mini_program(miniprogram::Config::new(
        AppId::new(app_id)?,
        AppSecret::new(app_secret)?,
    ))?;

    match mini.get_access_token().await {
        Ok(token) => println!("access token: {}...", &token[..token.len().min(8)]),
        Err(WechatError::Api { code, message }) => {
            println!("WeChat rejected the credentials: {} - {}", code, message)
        }
        Err(e) => return Err(e.into()),
    }

    // Served from the cache, no second request.
    let again = mini.get_access_token().await;
    println!("second call ok: {}", again.is_ok());

    Ok(())
}
