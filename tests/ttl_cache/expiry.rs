use signalhub_cache::TtlCache;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn entry_expires_after_ttl() {
    let cache: TtlCache<&str> = TtlCache::builder().build();

    cache.set_with_ttl("k", "v", Duration::from_millis(100));
    assert_eq!(cache.get("k"), Some("v"));

    tokio::time::advance(Duration::from_millis(150)).await;
    assert_eq!(cache.get("k"), None);
    assert!(!cache.has("k"));
}

#[tokio::test(start_paused = true)]
async fn entry_is_live_until_ttl_has_strictly_passed() {
    let cache: TtlCache<u32> = TtlCache::builder().build();
    cache.set_with_ttl("k", 1, Duration::from_millis(100));

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(cache.get("k"), Some(1));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(cache.get("k"), None);
}

#[tokio::test(start_paused = true)]
async fn default_ttl_applies_to_plain_set() {
    let cache: TtlCache<u32> = TtlCache::builder()
        .default_ttl(Duration::from_secs(1))
        .build();
    cache.set("k", 1);

    tokio::time::advance(Duration::from_millis(900)).await;
    assert!(cache.has("k"));
    tokio::time::advance(Duration::from_millis(200)).await;
    assert!(!cache.has("k"));
}

#[tokio::test(start_paused = true)]
async fn sweeper_removes_unread_entries() {
    let expired = Arc::new(AtomicUsize::new(0));
    let e = Arc::clone(&expired);
    let cache: TtlCache<u32> = TtlCache::builder()
        .sweep_interval(Duration::from_secs(1))
        .on_expired(move |count| {
            e.fetch_add(count, Ordering::SeqCst);
        })
        .build();
    let sweeper = cache.start_sweeper();

    cache.set_with_ttl("short", 1, Duration::from_millis(500));
    cache.set_with_ttl("long", 2, Duration::from_secs(60));
    assert_eq!(cache.len(), 2);

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(cache.len(), 1);
    assert_eq!(expired.load(Ordering::SeqCst), 1);
    assert_eq!(cache.stats().expirations, 1);
    sweeper.stop();
}

#[tokio::test(start_paused = true)]
async fn sweep_reports_removed_count() {
    let cache: TtlCache<u32> = TtlCache::builder().build();
    for i in 0..5 {
        cache.set_with_ttl(format!("k{i}"), i, Duration::from_millis(10));
    }
    cache.set_with_ttl("keep", 9, Duration::from_secs(10));

    tokio::time::advance(Duration::from_millis(20)).await;
    assert_eq!(cache.sweep(), 5);
    assert_eq!(cache.sweep(), 0);
    assert_eq!(cache.get("keep"), Some(9));
}
