use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Entries younger than `ttl` are fresh; older ones are kept until
/// overwritten, but `get` no longer returns them.
#[derive(Debug, Clone)]
pub struct Cache<K, V> {
    data: Arc<Mutex<HashMap<K, (V, Instant)>>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> Cache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let data = self.data.lock().await;
        if let Some((value, timestamp)) = data.get(key) {
            if timestamp.elapsed() < self.ttl {
                return Some(value.clone());
            }
        }
        None
    }

    pub async fn set(&self, key: K, value: V) {
        let mut data = self.data.lock().await;
        data.insert(key, (value, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_go_stale() {
        let cache = Cache::new(Duration::from_secs(30));
        cache.set("new", 3).await;
        assert_eq!(cache.get(&"new").await, Some(3));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get(&"new").await, Some(3));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(&"new").await, None);
    }

    #[tokio::test]
    async fn test_set_overwrites_and_refreshes() {
        let cache = Cache::new(Duration::from_secs(30));
        cache.set("all", vec![1, 2]).await;
        cache.set("all", vec![3]).await;
        assert_eq!(cache.get(&"all").await, Some(vec![3]));
        assert!(cache.get(&"new").await.is_none());
    }
}
