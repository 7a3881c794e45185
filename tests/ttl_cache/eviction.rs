use signalhub_cache::TtlCache;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn full_cache_evicts_single_oldest_entry() {
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let ev = Arc::clone(&evicted);
    let cache: TtlCache<usize> = TtlCache::builder()
        .max_size(3)
        .on_eviction(move |key| ev.lock().unwrap().push(key.to_string()))
        .build();

    for i in 0..3 {
        cache.set(format!("k{i}"), i);
        tokio::time::advance(Duration::from_millis(1)).await;
    }
    cache.set("k3", 3);

    assert_eq!(cache.len(), 3);
    assert!(!cache.has("k0"));
    assert!(cache.has("k1") && cache.has("k2") && cache.has("k3"));
    assert_eq!(*evicted.lock().unwrap(), vec!["k0".to_string()]);
    assert_eq!(cache.stats().evictions, 1);
}

#[tokio::test(start_paused = true)]
async fn oldest_write_not_oldest_read_is_evicted() {
    let cache: TtlCache<usize> = TtlCache::builder().max_size(2).build();

    cache.set("a", 1);
    tokio::time::advance(Duration::from_millis(1)).await;
    cache.set("b", 2);
    tokio::time::advance(Duration::from_millis(1)).await;

    // reading "a" does not refresh it
    assert_eq!(cache.get("a"), Some(1));
    cache.set("c", 3);

    assert!(!cache.has("a"));
    assert!(cache.has("b"));
}

#[tokio::test(start_paused = true)]
async fn overwriting_in_full_cache_does_not_evict() {
    let cache: TtlCache<usize> = TtlCache::builder().max_size(2).build();
    cache.set("a", 1);
    tokio::time::advance(Duration::from_millis(1)).await;
    cache.set("b", 2);

    cache.set("a", 10);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a"), Some(10));
    assert_eq!(cache.get("b"), Some(2));
    assert_eq!(cache.stats().evictions, 0);
}

#[tokio::test]
async fn invalidate_pattern_removes_matching_keys() {
    let cache: TtlCache<u32> = TtlCache::builder().build();
    cache.set("assistants:list:aaa", 1);
    cache.set("assistants:list:bbb", 2);
    cache.set("assistants:chat:x:ccc", 3);

    assert_eq!(cache.invalidate_pattern("^assistants:list:"), 2);
    assert_eq!(cache.len(), 1);

    assert_eq!(cache.invalidate_pattern("(unclosed"), 0);
    assert_eq!(cache.len(), 1);
}
