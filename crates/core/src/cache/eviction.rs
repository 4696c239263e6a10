//! Count-based eviction for a named store.

use super::connection::CacheStorage;
use crate::Error;

/// Trim the named store to at most `max_entries`, oldest insertions first.
///
/// Keys are re-enumerated after every single deletion, so entries written
/// concurrently by other tasks are accounted for on the next pass. The bound
/// is soft: a writer racing this loop can leave the store briefly above
/// `max_entries` until the next call.
///
/// Returns the number of entries deleted by this call.
pub async fn limit_cache_size(storage: &CacheStorage, store_name: &str, max_entries: usize) -> Result<u64, Error> {
    let store = storage.open_store(store_name).await?;
    let mut deleted = 0u64;

    loop {
        let keys = store.keys().await?;
        if keys.len() <= max_entries {
            break;
        }
        if store.delete(&keys[0]).await? {
            deleted += 1;
        }
    }

    if deleted > 0 {
        tracing::debug!(store = store_name, deleted, max_entries, "evicted oldest entries");
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Headers, Request, Response};
    use url::Url;

    fn asset(i: usize) -> Request {
        Request::get(Url::parse(&format!("https://app.example/assets/{i}.png")).unwrap())
    }

    #[tokio::test]
    async fn test_under_limit_is_untouched() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let store = storage.open_store("runtime-cache-v1").await.unwrap();
        for i in 0..3 {
            store.put(&asset(i), Response::new(200, Headers::new(), "x")).await.unwrap();
        }

        assert_eq!(limit_cache_size(&storage, "runtime-cache-v1", 3).await.unwrap(), 0);
        assert_eq!(store.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_evicts_oldest_first() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let store = storage.open_store("runtime-cache-v1").await.unwrap();
        for i in 0..10 {
            store.put(&asset(i), Response::new(200, Headers::new(), "x")).await.unwrap();
        }

        let deleted = limit_cache_size(&storage, "runtime-cache-v1", 4).await.unwrap();
        assert_eq!(deleted, 6);

        let kept: Vec<Request> = store.keys().await.unwrap();
        let expected: Vec<Request> = (6..10).map(asset).collect();
        assert_eq!(kept, expected);
    }

    #[tokio::test]
    async fn test_zero_limit_empties_store() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let store = storage.open_store("runtime-cache-v1").await.unwrap();
        store.put(&asset(0), Response::new(200, Headers::new(), "x")).await.unwrap();

        limit_cache_size(&storage, "runtime-cache-v1", 0).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_writers_converge() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let store = storage.open_store("runtime-cache-v1").await.unwrap();
        let mut tasks = tokio::task::JoinSet::new();

        for i in 0..40 {
            store.put(&asset(i), Response::new(200, Headers::new(), "x")).await.unwrap();
            let storage = storage.clone();
            tasks.spawn(async move { limit_cache_size(&storage, "runtime-cache-v1", 8).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let kept = store.keys().await.unwrap();
        let expected: Vec<Request> = (32..40).map(asset).collect();
        assert_eq!(kept, expected);
    }
}
