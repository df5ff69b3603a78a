use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Console output for interactive runs, JSON lines for log collectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

fn default_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        "timetable_admin=debug,info"
    } else {
        "timetable_admin=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// RUST_LOG 優先，否則依 verbose 決定層級
pub fn init_logger(verbose: bool, format: LogFormat) {
    let json = format == LogFormat::Json;

    let compact_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
    });
    let json_layer = json.then(|| fmt::layer().with_target(true).json());

    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(compact_layer)
        .with(json_layer)
        .init();
}
