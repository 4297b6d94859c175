use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not consulted. Dependencies stay at warn.
pub fn default_directives(debug: bool) -> &'static str {
    if debug {
        "warn,drawing2ai=debug"
    } else {
        "warn,drawing2ai=info"
    }
}

/// Splits a log file path into the directory and file name the appender wants.
pub fn split_log_path(path: &Path) -> Option<(PathBuf, OsString)> {
    let file_name = path.file_name()?.to_os_string();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some((dir, file_name))
}

/// Installs the global subscriber. `RUST_LOG` is honoured only in debug mode.
/// When `log_file` is set, output is mirrored into that file without colours.
/// Calling this twice is harmless; the first subscriber wins.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let filter = if debug {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(true)))
    } else {
        EnvFilter::new(default_directives(false))
    };

    let file_layer = log_file
        .as_deref()
        .and_then(split_log_path)
        .map(|(dir, file_name)| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(tracing_appender::rolling::never(dir, file_name))
        });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();
    if installed.is_ok() {
        let verbose = debug;
        tracing::debug!(verbose, "logging initialised");
    }
}
