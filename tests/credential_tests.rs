use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};
use wechat_sdk::cache::{Cache, CacheError, MemoryCache};
use wechat_sdk::client::{HttpTransport, TransportFuture};
use wechat_sdk::credential::{
    AccessTokenHandle, DefaultAccessToken, WorkAccessToken, CACHE_KEY_MINI_PROGRAM_PREFIX,
    CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX, CACHE_KEY_WORK_PREFIX,
};
use wechat_sdk::error::HttpError;
use wechat_sdk::types::{AppId, AppSecret, CorpId, CorpSecret};
use wechat_sdk::WechatError;

const APP_ID: &str = "wx1234567890abcdef";
const APP_SECRET: &str = "secret1234567890ab";

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Get(String),
    Post(String, Value),
}

/// Answers every request with the same body and records what was asked.
struct StubTransport {
    response: Value,
    delay: Duration,
    calls: Mutex<Vec<Call>>,
    count: AtomicU32,
}

impl StubTransport {
    fn new(response: Value) -> Self {
        Self {
            response,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            count: AtomicU32::new(0),
        }
    }

    fn token(token: &str, expires_in: i64) -> Self {
        Self::new(json!({ "access_token": token, "expires_in": expires_in }))
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    async fn respond(&self, call: Call) -> Result<Vec<u8>, WechatError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(call);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(serde_json::to_vec(&self.response)?)
    }
}

impl HttpTransport for StubTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        Box::pin(self.respond(Call::Get(url.to_string())))
    }

    fn post_json<'a>(&'a self, url: &'a str, body: Value) -> TransportFuture<'a> {
        Box::pin(self.respond(Call::Post(url.to_string(), body)))
    }
}

/// Fails the test if the provider touches the network.
struct PanickingTransport;

impl HttpTransport for PanickingTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        panic!("unexpected GET {url}");
    }

    fn post_json<'a>(&'a self, url: &'a str, _body: Value) -> TransportFuture<'a> {
        panic!("unexpected POST {url}");
    }
}

struct UnreachableTransport;

impl HttpTransport for UnreachableTransport {
    fn get<'a>(&'a self, _url: &'a str) -> TransportFuture<'a> {
        Box::pin(async { Err(HttpError::Transport("connection refused".to_string()).into()) })
    }

    fn post_json<'a>(&'a self, _url: &'a str, _body: Value) -> TransportFuture<'a> {
        Box::pin(async { Err(HttpError::Transport("connection refused".to_string()).into()) })
    }
}

/// Memory cache that remembers every write.
#[derive(Default)]
struct RecordingCache {
    inner: MemoryCache,
    writes: Mutex<Vec<(String, String, Duration)>>,
}

impl Cache for RecordingCache {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.writes
            .lock()
            .push((key.to_string(), value.to_string(), ttl));
        self.inner.set(key, value, ttl)
    }
}

struct ReadOnlyCache;

impl Cache for ReadOnlyCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("read-only replica".to_string()))
    }
}

fn app_provider(
    prefix: &str,
    cache: Arc<dyn Cache>,
    transport: Arc<dyn HttpTransport>,
    stable: bool,
) -> DefaultAccessToken {
    DefaultAccessToken::new(
        AppId::new(APP_ID).unwrap(),
        AppSecret::new(APP_SECRET).unwrap(),
        prefix,
        Some(cache),
        transport,
        stable,
    )
    .unwrap()
}

#[tokio::test]
async fn test_cache_hit_never_calls_transport() {
    let cache = Arc::new(MemoryCache::new());
    let provider = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        cache.clone(),
        Arc::new(PanickingTransport),
        false,
    );
    cache
        .set(provider.cache_key(), "cached_token", Duration::from_secs(600))
        .unwrap();

    for _ in 0..3 {
        assert_eq!(provider.get_access_token().await.unwrap(), "cached_token");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_flight_under_contention() {
    let transport =
        Arc::new(StubTransport::token("shared_token", 7200).with_delay(Duration::from_millis(50)));
    let provider = Arc::new(app_provider(
        CACHE_KEY_MINI_PROGRAM_PREFIX,
        Arc::new(MemoryCache::new()),
        transport.clone(),
        false,
    ));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.get_access_token().await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;

    assert_eq!(transport.count(), 1);
    for result in results {
        assert_eq!(result.unwrap().unwrap(), "shared_token");
    }
}

#[tokio::test]
async fn test_ttl_is_expires_in_minus_buffer() {
    let cache = Arc::new(RecordingCache::default());
    let provider = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        cache.clone(),
        Arc::new(StubTransport::token("ttl_token", 7200)),
        false,
    );

    provider.get_access_token().await.unwrap();

    let writes = cache.writes.lock().clone();
    assert_eq!(writes.len(), 1);
    let (key, value, ttl) = &writes[0];
    assert_eq!(key, provider.cache_key());
    assert_eq!(value, "ttl_token");
    assert_eq!(*ttl, Duration::from_secs(5700));
}

#[tokio::test]
async fn test_custom_expiry_buffer() {
    let cache = Arc::new(RecordingCache::default());
    let provider = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        cache.clone(),
        Arc::new(StubTransport::token("short_lived", 300)),
        false,
    )
    .with_expiry_buffer(Duration::from_secs(60));

    provider.get_access_token().await.unwrap();

    assert_eq!(cache.writes.lock()[0].2, Duration::from_secs(240));
}

#[tokio::test]
async fn test_expiry_shorter_than_buffer_is_rejected() {
    let cache = Arc::new(RecordingCache::default());
    let provider = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        cache.clone(),
        Arc::new(StubTransport::token("too_short", 1200)),
        false,
    );

    let err = provider.get_access_token().await.unwrap_err();

    assert!(matches!(err, WechatError::Token(_)));
    assert!(cache.writes.lock().is_empty());
}

#[tokio::test]
async fn test_platform_error_propagates_and_caches_nothing() {
    let cache = Arc::new(RecordingCache::default());
    let provider = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        cache.clone(),
        Arc::new(StubTransport::new(
            json!({ "errcode": 40001, "errmsg": "invalid credential" }),
        )),
        false,
    );

    let err = provider.get_access_token().await.unwrap_err();

    assert_eq!(err.api_code(), Some(40001));
    assert!(err.to_string().contains("40001"));
    assert!(cache.writes.lock().is_empty());
    assert_eq!(cache.get(provider.cache_key()), None);
}

#[tokio::test]
async fn test_transport_error_propagates() {
    let provider = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        Arc::new(MemoryCache::new()),
        Arc::new(UnreachableTransport),
        false,
    );

    let err = provider.get_access_token().await.unwrap_err();

    assert!(matches!(err, WechatError::Http(HttpError::Transport(_))));
}

#[tokio::test]
async fn test_cache_write_failure_is_an_error() {
    let transport = Arc::new(StubTransport::token("unstored", 7200));
    let provider = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        Arc::new(ReadOnlyCache),
        transport.clone(),
        false,
    );

    let err = provider.get_access_token().await.unwrap_err();
    assert!(matches!(err, WechatError::Cache(CacheError::Backend(_))));

    // Nothing was cached, so the next call fetches again.
    assert!(provider.get_access_token().await.is_err());
    assert_eq!(transport.count(), 2);
}

#[tokio::test]
async fn test_namespace_isolation() {
    let cache = Arc::new(MemoryCache::new());
    let mini = app_provider(
        CACHE_KEY_MINI_PROGRAM_PREFIX,
        cache.clone(),
        Arc::new(PanickingTransport),
        false,
    );
    let official_transport = Arc::new(StubTransport::token("official_token", 7200));
    let official = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        cache.clone(),
        official_transport.clone(),
        false,
    );
    assert_ne!(mini.cache_key(), official.cache_key());

    cache
        .set(mini.cache_key(), "mini_token", Duration::from_secs(600))
        .unwrap();

    assert_eq!(official.get_access_token().await.unwrap(), "official_token");
    assert_eq!(mini.get_access_token().await.unwrap(), "mini_token");
    assert_eq!(official_transport.count(), 1);
}

#[tokio::test]
async fn test_standard_mode_uses_get() {
    let transport = Arc::new(StubTransport::token("standard", 7200));
    let provider = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        Arc::new(MemoryCache::new()),
        transport.clone(),
        false,
    );

    provider.get_access_token().await.unwrap();

    assert_eq!(
        transport.calls(),
        vec![Call::Get(format!(
            "https://api.weixin.qq.com/cgi-bin/token?grant_type=client_credential&appid={APP_ID}&secret={APP_SECRET}"
        ))]
    );
}

#[tokio::test]
async fn test_stable_mode_posts_force_refresh() {
    let transport = Arc::new(StubTransport::token("stable", 7200));
    let provider = app_provider(
        CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
        Arc::new(MemoryCache::new()),
        transport.clone(),
        true,
    );

    assert_eq!(provider.get_access_token().await.unwrap(), "stable");
    assert_eq!(
        transport.calls(),
        vec![Call::Post(
            "https://api.weixin.qq.com/cgi-bin/stable_token".to_string(),
            json!({
                "appid": APP_ID,
                "secret": APP_SECRET,
                "grant_type": "client_credential",
                "force_refresh": true
            })
        )]
    );
}

#[tokio::test]
async fn test_work_provider_uses_gettoken() {
    let transport = Arc::new(StubTransport::token("work_token", 7200));
    let cache = Arc::new(RecordingCache::default());
    let provider = WorkAccessToken::new(
        CorpId::new("ww1234567890").unwrap(),
        CorpSecret::new("corp_secret").unwrap(),
        CACHE_KEY_WORK_PREFIX,
        Some(cache.clone()),
        transport.clone(),
    )
    .unwrap();

    assert_eq!(provider.get_access_token().await.unwrap(), "work_token");
    assert_eq!(provider.get_access_token().await.unwrap(), "work_token");

    assert_eq!(
        transport.calls(),
        vec![Call::Get(
            "https://qyapi.weixin.qq.com/cgi-bin/gettoken?corpid=ww1234567890&corpsecret=corp_secret"
                .to_string()
        )]
    );
    let writes = cache.writes.lock().clone();
    assert_eq!(writes[0].0, "gowechat_work__access_token_ww1234567890");
    assert_eq!(writes[0].2, Duration::from_secs(5700));
}

#[tokio::test]
async fn test_providers_are_usable_as_trait_objects() {
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    let handles: Vec<Arc<dyn AccessTokenHandle>> = vec![
        Arc::new(app_provider(
            CACHE_KEY_MINI_PROGRAM_PREFIX,
            cache.clone(),
            Arc::new(StubTransport::token("from_default", 7200)),
            false,
        )),
        Arc::new(
            WorkAccessToken::new(
                CorpId::new("ww1234567890").unwrap(),
                CorpSecret::new("corp_secret").unwrap(),
                CACHE_KEY_WORK_PREFIX,
                Some(cache.clone()),
                Arc::new(StubTransport::token("from_work", 7200)),
            )
            .unwrap(),
        ),
    ];

    let mut tokens = Vec::new();
    for handle in &handles {
        tokens.push(handle.get_access_token().await.unwrap());
    }
    assert_eq!(tokens, vec!["from_default", "from_work"]);
}
