use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` when set, else the level from config or `-v`.
fn filter_for(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Plain-text logs for an interactive `finvision` session.
///
/// Everything goes to stderr so tables, boards and CSV printed on stdout can
/// be piped untouched. Repeat calls keep the first subscriber.
pub fn init_logging(app_name: &str, default_level: &str) {
    let installed = fmt()
        .with_env_filter(filter_for(default_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(app = app_name, format = "text", "logging ready");
    }
}

/// One JSON object per line on stderr, for `--json-logs` runs under scripts
/// or cron where the output is collected.
pub fn init_logging_json(app_name: &str, default_level: &str) {
    let installed = fmt()
        .json()
        .with_env_filter(filter_for(default_level))
        .with_writer(std::io::stderr)
        .with_current_span(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(app = app_name, format = "json", "logging ready");
    }
}

/// Level for a `-v` count: the configured level at 0, then debug, then trace.
pub fn level_for_verbosity(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}
