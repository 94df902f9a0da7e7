/*
 *  cache.rs
 *
 *  MirrorS - on the wall
 *	(c) 2020-26 Stuart Hunter
 *
 *	TODO:
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use mini_moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// String-keyed TTL cache shared across clones. Geocoding and the slower
/// upstream feeds sit behind one of these so repeated refreshes do not
/// hammer the provider.
#[derive(Clone)]
pub struct TtlCache<V> {
    cache: Arc<Cache<String, V>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self {
            cache: Arc::new(cache),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        // mini-moka keys are Arc<String>; lookups must borrow as &String.
        self.cache.get(&key.to_string())
    }

    pub fn insert(&self, key: &str, value: V) {
        self.cache.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_then_expire() {
        let cache: TtlCache<String> = TtlCache::new(10, Duration::from_millis(20));
        cache.insert("salem", "38.63,-88.95".to_string());
        assert_eq!(cache.get("salem").as_deref(), Some("38.63,-88.95"));
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get("salem"), None);
    }

    #[test]
    fn miss_on_unknown_key() {
        let cache: TtlCache<u32> = TtlCache::new(10, Duration::from_secs(60));
        assert_eq!(cache.get("nowhere"), None);
    }

    #[test]
    fn clones_share_entries() {
        let cache: TtlCache<u32> = TtlCache::new(10, Duration::from_secs(60));
        let other = cache.clone();
        cache.insert("k", 7);
        assert_eq!(other.get("k"), Some(7));
    }
}
