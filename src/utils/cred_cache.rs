/// OAuth token as handed to the credential cache. The cache never looks
/// inside it.
#[derive(Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct OAuthTokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_on: i64,
    pub token_type: String,
    pub tenant: String,
    pub active_directory_endpoint: String,
}

impl std::fmt::Debug for OAuthTokenInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokenInfo")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .field("token_type", &self.token_type)
            .field("tenant", &self.tenant)
            .field("active_directory_endpoint", &self.active_directory_endpoint)
            .finish()
    }
}

/// Persistent storage behind a [`CredCache`]. Calls are already serialised
/// by the cache.
pub trait TokenStore: Send {
    fn has_cached_token(&mut self, key_name: &str) -> crate::Result<bool>;
    fn remove_cached_token(&mut self, key_name: &str) -> crate::Result<()>;
    fn save_token(&mut self, key_name: &str, token: &OAuthTokenInfo) -> crate::Result<()>;
    fn load_token(&mut self, key_name: &str) -> crate::Result<Option<OAuthTokenInfo>>;
}

/// Session keyring backend. Not implemented on this platform: every
/// operation succeeds and nothing is ever found.
#[derive(Debug, Default)]
pub struct SessionKeyring {
    // set once the key's permissions have been verified
    is_perm_set: bool,
}

impl SessionKeyring {
    pub fn is_perm_set(&self) -> bool {
        self.is_perm_set
    }
}

impl TokenStore for SessionKeyring {
    fn has_cached_token(&mut self, _key_name: &str) -> crate::Result<bool> {
        Ok(false)
    }

    fn remove_cached_token(&mut self, _key_name: &str) -> crate::Result<()> {
        Ok(())
    }

    fn save_token(&mut self, _key_name: &str, _token: &OAuthTokenInfo) -> crate::Result<()> {
        Ok(())
    }

    fn load_token(&mut self, _key_name: &str) -> crate::Result<Option<OAuthTokenInfo>> {
        Ok(None)
    }
}

/// Keeps tokens for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tokens: std::collections::HashMap<String, OAuthTokenInfo>,
}

impl TokenStore for MemoryStore {
    fn has_cached_token(&mut self, key_name: &str) -> crate::Result<bool> {
        Ok(self.tokens.contains_key(key_name))
    }

    fn remove_cached_token(&mut self, key_name: &str) -> crate::Result<()> {
        self.tokens.remove(key_name);
        Ok(())
    }

    fn save_token(&mut self, key_name: &str, token: &OAuthTokenInfo) -> crate::Result<()> {
        self.tokens.insert(key_name.to_owned(), token.clone());
        Ok(())
    }

    fn load_token(&mut self, key_name: &str) -> crate::Result<Option<OAuthTokenInfo>> {
        Ok(self.tokens.get(key_name).cloned())
    }
}

/// Serialises all access to one cached token.
///
/// The lock is released only when the store call returns. If the store
/// panics the lock stays held and every later caller on this instance
/// blocks for good, so nobody ever reads a store left half-written.
pub struct CredCache<S: TokenStore = SessionKeyring> {
    key_name: String,
    store: std::sync::Mutex<S>,
}

impl CredCache<SessionKeyring> {
    pub fn new(options: crate::utils::config::CredCacheOptions) -> Self {
        Self::with_store(options, SessionKeyring::default())
    }
}

impl<S: TokenStore> CredCache<S> {
    pub fn with_store(options: crate::utils::config::CredCacheOptions, store: S) -> Self {
        crate::log_debug!("Credential cache created for key {}", options.key_name);
        Self {
            key_name: options.key_name,
            store: std::sync::Mutex::new(store),
        }
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn has_cached_token(&self) -> crate::Result<bool> {
        self.with_locked_store(|store, key_name| store.has_cached_token(key_name))
    }

    pub fn remove_cached_token(&self) -> crate::Result<()> {
        self.with_locked_store(|store, key_name| store.remove_cached_token(key_name))
    }

    pub fn save_token(&self, token: &OAuthTokenInfo) -> crate::Result<()> {
        self.with_locked_store(|store, key_name| store.save_token(key_name, token))
    }

    pub fn load_token(&self) -> crate::Result<Option<OAuthTokenInfo>> {
        self.with_locked_store(|store, key_name| store.load_token(key_name))
    }

    fn with_locked_store<T>(
        &self,
        op: impl FnOnce(&mut S, &str) -> crate::Result<T>,
    ) -> crate::Result<T> {
        // ManuallyDrop keeps the guard from unlocking during an unwind.
        // The mutex can therefore never be poisoned by this type.
        let mut guard = std::mem::ManuallyDrop::new(
            self.store
                .lock()
                .map_err(|_| crate::Error::CacheUnavailable)?,
        );
        let result = op(&mut **guard, &self.key_name);
        drop(std::mem::ManuallyDrop::into_inner(guard));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::CredCacheOptions;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn token(access: &str) -> OAuthTokenInfo {
        OAuthTokenInfo {
            access_token: access.to_owned(),
            refresh_token: "refresh".to_owned(),
            expires_on: 1_700_000_000,
            token_type: "Bearer".to_owned(),
            ..OAuthTokenInfo::default()
        }
    }

    #[test]
    fn session_keyring_has_nothing_cached() {
        let cache = CredCache::new(CredCacheOptions::new("user1"));

        assert!(!cache.has_cached_token().unwrap());
        assert_eq!(cache.load_token().unwrap(), None);
        assert!(cache.remove_cached_token().is_ok());
    }

    #[test]
    fn session_keyring_forgets_saved_tokens() {
        let cache = CredCache::new(CredCacheOptions::new("user1"));

        cache.save_token(&token("abc")).unwrap();

        assert_eq!(cache.load_token().unwrap(), None);
        assert!(!cache.has_cached_token().unwrap());
    }

    #[test]
    fn memory_store_round_trips_a_token() {
        let cache = CredCache::with_store(CredCacheOptions::new("user1"), MemoryStore::default());
        let tok = token("abc");

        cache.save_token(&tok).unwrap();
        assert!(cache.has_cached_token().unwrap());
        assert_eq!(cache.load_token().unwrap(), Some(tok));

        cache.remove_cached_token().unwrap();
        assert!(!cache.has_cached_token().unwrap());
        assert_eq!(cache.load_token().unwrap(), None);
    }

    #[test]
    fn store_errors_pass_through() {
        struct Failing;

        impl TokenStore for Failing {
            fn has_cached_token(&mut self, _: &str) -> crate::Result<bool> {
                Err(crate::Error::TokenStore("keyring locked".into()))
            }
            fn remove_cached_token(&mut self, _: &str) -> crate::Result<()> {
                Ok(())
            }
            fn save_token(&mut self, _: &str, _: &OAuthTokenInfo) -> crate::Result<()> {
                Ok(())
            }
            fn load_token(&mut self, _: &str) -> crate::Result<Option<OAuthTokenInfo>> {
                Ok(None)
            }
        }

        let cache = CredCache::with_store(CredCacheOptions::new("user1"), Failing);

        let err = cache.has_cached_token().unwrap_err();
        assert_eq!(err.to_string(), "token store error: keyring locked");
        // lock released after an error return
        assert_eq!(cache.load_token().unwrap(), None);
    }

    struct Exclusive {
        active: Arc<AtomicUsize>,
        max_seen: Arc<AtomicUsize>,
    }

    impl Exclusive {
        fn enter(&self) {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_micros(200));
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl TokenStore for Exclusive {
        fn has_cached_token(&mut self, _: &str) -> crate::Result<bool> {
            self.enter();
            Ok(false)
        }
        fn remove_cached_token(&mut self, _: &str) -> crate::Result<()> {
            self.enter();
            Ok(())
        }
        fn save_token(&mut self, _: &str, _: &OAuthTokenInfo) -> crate::Result<()> {
            self.enter();
            Ok(())
        }
        fn load_token(&mut self, _: &str) -> crate::Result<Option<OAuthTokenInfo>> {
            self.enter();
            Ok(None)
        }
    }

    #[test]
    fn store_calls_never_overlap() {
        let max_seen = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(CredCache::with_store(
            CredCacheOptions::new("user1"),
            Exclusive {
                active: Arc::new(AtomicUsize::new(0)),
                max_seen: Arc::clone(&max_seen),
            },
        ));

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        match i % 4 {
                            0 => assert!(!cache.has_cached_token().unwrap()),
                            1 => cache.remove_cached_token().unwrap(),
                            2 => cache.save_token(&token("t")).unwrap(),
                            _ => assert!(cache.load_token().unwrap().is_none()),
                        }
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    struct PanicsOnSave;

    impl TokenStore for PanicsOnSave {
        fn has_cached_token(&mut self, _: &str) -> crate::Result<bool> {
            Ok(false)
        }
        fn remove_cached_token(&mut self, _: &str) -> crate::Result<()> {
            Ok(())
        }
        fn save_token(&mut self, _: &str, _: &OAuthTokenInfo) -> crate::Result<()> {
            panic!("store corrupted mid-write");
        }
        fn load_token(&mut self, _: &str) -> crate::Result<Option<OAuthTokenInfo>> {
            Ok(None)
        }
    }

    #[test]
    fn panicking_store_keeps_the_cache_locked() {
        let cache = Arc::new(CredCache::with_store(
            CredCacheOptions::new("user1"),
            PanicsOnSave,
        ));

        let faulting = Arc::clone(&cache);
        let outcome = std::thread::spawn(move || faulting.save_token(&token("t"))).join();
        assert!(outcome.is_err());

        assert!(cache.store.try_lock().is_err());
        assert!(!cache.store.is_poisoned());

        let (tx, rx) = std::sync::mpsc::channel();
        let waiter = Arc::clone(&cache);
        std::thread::spawn(move || {
            let _ = tx.send(waiter.load_token().is_ok());
        });
        assert_eq!(
            rx.recv_timeout(std::time::Duration::from_millis(200)),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout)
        );
    }

    #[test]
    fn token_debug_hides_secrets() {
        let rendered = format!("{:?}", token("very-secret"));
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("Bearer"));
    }

    #[test]
    fn session_keyring_starts_without_permissions() {
        assert!(!SessionKeyring::default().is_perm_set());
    }
}
