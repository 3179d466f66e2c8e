//! Structured log output on standard output

use std::io::IsTerminal;
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// Subscriber writing plain-text events to `writer`
///
/// Progress messages are emitted at `info`; `quiet` raises the default level
/// to `warn`. `RUST_LOG` overrides both. `ansi` enables colour escapes.
pub fn log_subscriber<W>(quiet: bool, ansi: bool, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let default_level = if quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .finish()
}

/// Install the global `tracing` subscriber on standard output
///
/// Colour is only used when standard output is a terminal. Installing twice
/// is a no-op.
pub fn init_logging(quiet: bool) {
    let ansi = std::io::stdout().is_terminal();
    let installed = log_subscriber(quiet, ansi, std::io::stdout).try_init();

    // The only failure is an already installed global subscriber, which keeps logging
    if let Err(err) = installed {
        tracing::debug!("logging already initialised: {err}");
    }
}
