//! Logging for the library and `transfer-info`.
//!
//! Everything goes through the `log_*!` macros below, which compile to
//! nothing without the `logging` feature. Library code stays at debug and
//! trace; only the binary logs at info and above.

#[cfg(feature = "logging")]
use std::io::Write;

#[cfg(feature = "logging")]
const DEFAULT_FILTER: &str = "warn,transfer_platform=info,transfer_info=info";

/// Installs the global logger once per process. `RUST_LOG` (also read from
/// a `.env` file) replaces `DEFAULT_FILTER`. Later calls are ignored.
#[cfg(feature = "logging")]
pub fn init() {
    dotenvy::dotenv().ok();
    let installed = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(DEFAULT_FILTER),
    )
    .format(|buf, record| {
        writeln!(
            buf,
            "[{} {:<5} {}] {}",
            buf.timestamp_millis(),
            record.level(),
            record.target(),
            record.args()
        )
    })
    .try_init();

    if installed.is_err() {
        crate::log_debug!("Logger already installed");
    }
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        log::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        log::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        log::trace!($($arg)*)
    };
}

/// Debug-level line with the error appended as `- Error: {:?}`.
#[macro_export]
macro_rules! log_debug_with_context {
    ($e:ident, $fmt:literal $(, $arg:expr)*) => {
        #[cfg(feature = "logging")]
        log::debug!(
            concat!($fmt, " - Error: {:?}"),
            $($arg,)*
            $e
        );
        #[cfg(not(feature = "logging"))]
        {
            let _ = &$e;
        }
    };
}
