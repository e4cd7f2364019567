pub mod utils;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("stat({}) failed: {source}", .path.display())]
    FileStat {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to open {}: {source}", .path.display())]
    FileOpen {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to resize {} to {size} bytes: {source}", .path.display())]
    FileResize {
        path: std::path::PathBuf,
        size: i64,
        source: std::io::Error,
    },
    #[error("token store error: {0}")]
    TokenStore(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("credential cache is unavailable")]
    CacheUnavailable,
}

pub type Result<T> = std::result::Result<T, Error>;
