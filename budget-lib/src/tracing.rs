use tracing::level_filters::LevelFilter;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;

/// Maps the number of `-v` flags to a log level. Without any, only warnings and errors are shown.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Installs the global subscriber. Logs go to stderr so that stdout only carries the summary.
pub fn init(level: LevelFilter) -> Result<(), SetGlobalDefaultError> {
    let subscriber = registry::Registry::default()
        .with(level)
        .with(tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)
}
