//! Diagnostic logging setup.
//!
//! Verbosity comes from `LUMIERA_LOG` using the usual `tracing` directive
//! syntax (`debug`, `lumiera=trace,reqwest=warn`, ...). The full-screen UI
//! must never write to the terminal, so it logs to a file or nowhere.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "LUMIERA_LOG";
const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to this file.
    File(PathBuf),
    Stderr,
    Discard,
}

impl LogTarget {
    /// Where logs go: the `--log` file when given, otherwise stderr for
    /// one-shot commands and nowhere for the UI.
    pub fn select(log_file: Option<PathBuf>, interactive: bool) -> Self {
        match log_file {
            Some(path) => LogTarget::File(path),
            None if interactive => LogTarget::Discard,
            None => LogTarget::Stderr,
        }
    }
}

fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init(target: LogTarget) -> Result<(), Box<dyn Error>> {
    let directives = std::env::var(LOG_FILTER_ENV).ok();
    let filter = env_filter(directives.as_deref());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::Discard => builder.with_writer(std::io::sink).try_init(),
    };
    Ok(())
}
