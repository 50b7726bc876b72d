//! Pipeworks session runner (default binary).
//!
//! Plays one or more rounds driven by line-delimited JSON on stdin and writes
//! replies and events to stdout. Logs go to stderr, filtered by `RUST_LOG`.

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pipeworks::adapter::{run_session, Session, SessionConfig};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pipeworks=info,pipeworks_core=info,pipeworks_adapter=info")
    });

    // stdout carries the protocol, so logs must stay on stderr.
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = SessionConfig::from_env();
    config
        .game
        .validate()
        .context("invalid PIPEWORKS_* configuration")?;

    let session = Session::from_config(&config).context("setting up first round")?;
    info!(seed = config.seed, tick_ms = config.tick_ms, "pipeworks ready");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let session = run_session(stdin, stdout, session, config.tick_ms).await?;

    info!(
        round_id = session.round().round_id(),
        score = session.round().score().total,
        "stdin closed, exiting"
    );
    Ok(())
}
