use signalhub_cache::TtlCache;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinSet;

#[tokio::test]
async fn concurrent_misses_each_run_the_producer() {
    let cache: TtlCache<String> = TtlCache::builder().build();
    let calls = Arc::new(AtomicUsize::new(0));

    let producer = |calls: Arc<AtomicUsize>| {
        move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, std::io::Error>("value".to_string())
        }
    };

    let (a, b) = tokio::join!(
        cache.get_or_set("k", producer(Arc::clone(&calls))),
        cache.get_or_set("k", producer(Arc::clone(&calls))),
    );

    assert_eq!(a.unwrap(), "value");
    assert_eq!(b.unwrap(), "value");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // once stored, later reads are served from the cache
    let c = cache
        .get_or_set("k", producer(Arc::clone(&calls)))
        .await
        .unwrap();
    assert_eq!(c, "value");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_handles_across_tasks() {
    let cache: TtlCache<usize> = TtlCache::builder().max_size(1000).build();
    let mut tasks = JoinSet::new();

    for t in 0..8 {
        let cache = cache.clone();
        tasks.spawn(async move {
            for i in 0..100 {
                let key = format!("t{t}:k{i}");
                cache.set(key.clone(), i);
                assert_eq!(cache.get(&key), Some(i));
            }
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    assert_eq!(cache.len(), 800);
    let stats = cache.stats();
    assert_eq!(stats.hits, 800);
    assert_eq!(stats.misses, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bounded_under_concurrent_writes() {
    let cache: TtlCache<usize> = TtlCache::builder().max_size(50).build();
    let mut tasks = JoinSet::new();

    for t in 0..4 {
        let cache = cache.clone();
        tasks.spawn(async move {
            for i in 0..200 {
                cache.set(format!("t{t}:k{i}"), i);
            }
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    assert_eq!(cache.len(), 50);
    assert_eq!(cache.stats().evictions, 750);
}
