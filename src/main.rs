use transfer_platform::{log_debug, log_error, log_info, log_warn};

/// What a run printed and whether any path failed.
#[derive(Debug, Default)]
struct Report {
    lines: Vec<String>,
    errors: Vec<String>,
}

impl Report {
    fn failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Stats every path on the blocking pool, keeping argument order.
async fn inspect(paths: Vec<std::path::PathBuf>) -> Report {
    let tasks: Vec<_> = paths
        .into_iter()
        .map(|path| {
            tokio::task::spawn_blocking(move || {
                let info = transfer_platform::utils::sys::query_file_info(&path);
                (path, info)
            })
        })
        .collect();

    let mut report = Report::default();
    for task in tasks {
        match task.await {
            Ok((path, Ok(info))) => {
                let line = serde_json::json!({ "path": path.display().to_string(), "info": info });
                report.lines.push(line.to_string());
            }
            Ok((_, Err(e))) => {
                log_warn!("{}", e);
                report.errors.push(e.to_string());
            }
            Err(e) => {
                log_error!("File info task failed: {}", e);
                report.errors.push(e.to_string());
            }
        }
    }
    report
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    #[cfg(feature = "logging")]
    transfer_platform::utils::logging::init();

    let mut args = std::env::args_os();
    let program = args
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or("transfer-info".to_owned());
    let paths: Vec<std::path::PathBuf> = args.map(std::path::PathBuf::from).collect();

    if paths.is_empty() {
        eprintln!("Usage: {program} <path>...");
        return std::process::ExitCode::FAILURE;
    }

    let options = transfer_platform::utils::config::CredCacheOptions::from_env();
    log_debug!("Credential cache key: {}", options.key_name);

    log_info!("Querying file information for {} path(s)", paths.len());
    let report = inspect(paths).await;

    for line in &report.lines {
        println!("{line}");
    }
    for error in &report.errors {
        eprintln!("{error}");
    }

    if report.failed() {
        std::process::ExitCode::FAILURE
    } else {
        std::process::ExitCode::SUCCESS
    }
}
