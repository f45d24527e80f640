use anyhow::{Context, Result};
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

// env_filter = trace|debug|info|warn|error|off, RUST_LOG takes precedence
pub fn get_subscriber<Sink>(env_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(sink)
        .with_thread_names(true)
        .with_target(false)
        .finish()
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<()> {
    set_global_default(subscriber).context("Failed to install tracing subscriber")
}

/// Logs go to stderr; stdout carries the overlay feed.
pub fn init(env_filter: &str) -> Result<()> {
    init_subscriber(get_subscriber(env_filter, std::io::stderr))
}
