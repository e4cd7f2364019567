/// Mode bits for files created by [`crate::utils::sys::create_sized_file`].
pub const DEFAULT_FILE_PERM: u32 = 0o644;

pub const CRED_CACHE_KEY_ENV: &str = "TRANSFER_CRED_CACHE_KEY";
pub const DEFAULT_CRED_CACHE_KEY_PREFIX: &str = "transfer-oauth-token";

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct CredCacheOptions {
    /// Name of the cached key. Should be scoped to the user identity.
    pub key_name: String,
}

impl CredCacheOptions {
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
        }
    }

    /// `<prefix>-<uid>`, so a process started via `su` does not pick up
    /// another user's token.
    pub fn for_current_user(prefix: &str) -> Self {
        // SAFETY: getuid has no preconditions and cannot fail.
        let uid = unsafe { libc::getuid() };
        Self::new(format!("{prefix}-{uid}"))
    }

    /// `TRANSFER_CRED_CACHE_KEY` when set and non-empty, the per-user
    /// default key otherwise.
    pub fn from_env() -> Self {
        match std::env::var(CRED_CACHE_KEY_ENV) {
            Ok(key_name) if !key_name.is_empty() => {
                crate::log_debug!("Using credential cache key from {}", CRED_CACHE_KEY_ENV);
                Self::new(key_name)
            }
            _ => Self::for_current_user(DEFAULT_CRED_CACHE_KEY_PREFIX),
        }
    }
}
