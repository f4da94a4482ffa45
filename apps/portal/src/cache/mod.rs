//! Resource cache: typed, user-scoped, write-through local persistence.
//!
//! Every entry lives under `"<user>_<resource>"` so switching accounts never
//! shows another user's data. Reads never fail: an absent or corrupt entry
//! yields the caller's default. Writes are synchronous and fire-and-forget.

pub mod store;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;

pub use store::{CacheStore, FileStore, MemoryStore};

/// Structured cache key: owning user plus resource name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user: String,
    pub resource: String,
}

impl CacheKey {
    pub fn new(user: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.user, self.resource)
    }
}

/// One cached resource of type `T`.
pub struct ResourceCache<T> {
    store: Arc<dyn CacheStore>,
    key: CacheKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> ResourceCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn CacheStore>, key: CacheKey) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    /// Stored value, or `default` when absent, unreadable or corrupt. A corrupt
    /// entry is removed so the next write starts clean.
    pub fn read_or(&self, default: T) -> T {
        match self.try_read() {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(key = %self.key, "Cache miss, using default");
                default
            }
            Err(e) => {
                warn!(key = %self.key, "Discarding unreadable cache entry: {e}");
                self.clear();
                default
            }
        }
    }

    pub fn read(&self) -> T
    where
        T: Default,
    {
        self.read_or(T::default())
    }

    /// Distinguishes absent (`Ok(None)`) from corrupt (`Err`).
    pub fn try_read(&self) -> Result<Option<T>, AppError> {
        let raw = self.store.get(&self.key.to_string())?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Persists `value`, overwriting any prior entry. Failures are logged, not returned.
    pub fn write(&self, value: &T) {
        if let Err(e) = self.try_write(value) {
            warn!(key = %self.key, "Cache write failed: {e}");
        }
    }

    pub fn try_write(&self, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(&self.key.to_string(), &raw)?;
        Ok(())
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key.to_string()) {
            warn!(key = %self.key, "Cache clear failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserSkillProfile;
    use serde_json::json;

    fn memory() -> Arc<dyn CacheStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            CacheKey::new("a@b.com", "applications").to_string(),
            "a@b.com_applications"
        );
    }

    #[test]
    fn test_absent_returns_default() {
        let cache: ResourceCache<Vec<u32>> = ResourceCache::new(memory(), CacheKey::new("u", "r"));
        assert_eq!(cache.read(), Vec::<u32>::new());
        assert_eq!(cache.read_or(vec![7]), vec![7]);
    }

    #[test]
    fn test_write_then_read() {
        let cache: ResourceCache<UserSkillProfile> =
            ResourceCache::new(memory(), CacheKey::new("u", "skills"));
        let profile: UserSkillProfile = ["Rust", "Go"].into_iter().collect();
        cache.write(&profile);
        assert_eq!(cache.read(), profile);
    }

    #[test]
    fn test_corrupt_entry_falls_back_to_default() {
        let store = memory();
        store.set("u_skills", "{not json").unwrap();
        let cache: ResourceCache<Vec<String>> =
            ResourceCache::new(store, CacheKey::new("u", "skills"));
        assert!(cache.try_read().is_err());
        assert_eq!(cache.read_or(vec!["fallback".to_string()]), vec!["fallback"]);
        // the corrupt entry is gone afterwards
        assert!(cache.try_read().unwrap().is_none());
    }

    #[test]
    fn test_users_are_isolated() {
        let store = memory();
        let alice: ResourceCache<serde_json::Value> =
            ResourceCache::new(store.clone(), CacheKey::new("alice@x.com", "skills"));
        let bob: ResourceCache<serde_json::Value> =
            ResourceCache::new(store, CacheKey::new("bob@x.com", "skills"));
        alice.write(&json!(["rust"]));
        assert_eq!(bob.read_or(json!([])), json!([]));
        assert_eq!(alice.read_or(json!([])), json!(["rust"]));
    }

    #[test]
    fn test_file_backed_users_with_similar_emails_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn CacheStore> = Arc::new(FileStore::open(dir.path()).unwrap());
        let alice: ResourceCache<Vec<String>> =
            ResourceCache::new(store.clone(), CacheKey::new("a+b@x.com", "skills"));
        let bob: ResourceCache<Vec<String>> =
            ResourceCache::new(store, CacheKey::new("a_b@x.com", "skills"));

        alice.write(&vec!["alice-secret".to_string()]);
        assert!(bob.read().is_empty());
        assert_eq!(alice.read(), vec!["alice-secret".to_string()]);
    }

    #[test]
    fn test_file_backed_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = CacheKey::new("a@b.com", "jobs");
        {
            let store: Arc<dyn CacheStore> = Arc::new(FileStore::open(dir.path()).unwrap());
            ResourceCache::<Vec<String>>::new(store, key.clone()).write(&vec!["1".to_string()]);
        }
        let store: Arc<dyn CacheStore> = Arc::new(FileStore::open(dir.path()).unwrap());
        let cache = ResourceCache::<Vec<String>>::new(store, key);
        assert_eq!(cache.read(), vec!["1".to_string()]);
    }
}
