use redis::AsyncCommands;
use snip_cache::RedisUrlCache;
use snip_core::{CacheKey, ShortenedUrl, UrlCache};
use snip_test_infra::RedisServer;
use std::time::Duration;

async fn setup() -> (RedisServer, RedisUrlCache) {
    let server = RedisServer::new()
        .await
        .expect("failed to start redis container");
    let conn = server.connection().await.expect("failed to connect");
    (server, RedisUrlCache::new(conn))
}

#[tokio::test]
#[ignore = "requires docker"]
async fn redis_cache_get_and_set() {
    let (_server, cache) = setup().await;
    let key = CacheKey::Token("gB0NV05e");
    let record = ShortenedUrl::new(1, "https://example.org");

    assert!(cache.get(&key).await.unwrap().is_none());

    cache
        .set(&key, &record, Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(cache.get(&key).await.unwrap(), Some(record));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn redis_cache_sets_expiry_on_write() {
    let (server, cache) = setup().await;
    let key = CacheKey::OriginalUrl("https://example.org");
    let record = ShortenedUrl::new(7, "https://example.org");

    cache
        .set(&key, &record, Duration::from_secs(120))
        .await
        .unwrap();

    let mut conn = server.connection().await.unwrap();
    let ttl: i64 = conn.ttl("snip:original:https://example.org").await.unwrap();
    assert!(ttl > 0 && ttl <= 120, "unexpected ttl {ttl}");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn redis_cache_entries_expire() {
    let (_server, cache) = setup().await;
    let key = CacheKey::Token("abcd");
    let record = ShortenedUrl::new(3, "https://example.org/expiring");

    cache
        .set(&key, &record, Duration::from_secs(1))
        .await
        .unwrap();
    assert!(cache.get(&key).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(2_100)).await;

    assert!(cache.get(&key).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn redis_cache_reports_invalid_data() {
    let (server, cache) = setup().await;

    let mut conn = server.connection().await.unwrap();
    let _: () = conn.set("snip:token:bad", "not json").await.unwrap();

    let err = cache.get(&CacheKey::Token("bad")).await.unwrap_err();
    assert!(matches!(err, snip_core::CacheError::InvalidData(_)));
}
