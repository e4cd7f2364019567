pub mod config;
pub mod cred_cache;
pub mod logging;
pub mod sys;
pub mod transfer;
pub mod windows;
