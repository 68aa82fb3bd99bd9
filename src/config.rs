use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Record store sidecar for the school administration app.
///
/// Reads one JSON request per line on stdin and answers one JSON response per
/// line on stdout.
#[derive(Parser, Debug)]
#[command(name = "escuelasd")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Workspace directory to open at startup (otherwise use `workspace.select`)
    #[arg(long, env = "ESCUELASD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Log filter, e.g. `info` or `escuelasd=debug`
    #[arg(long, env = "ESCUELASD_LOG", default_value = "info")]
    pub log_level: String,
}

/// Logs go to stderr; stdout carries the protocol.
pub fn init_logging(args: &Args) {
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}
