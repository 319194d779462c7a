//! Diagnostics on stderr. Stdout is reserved for the documents a command
//! prints, so that output can be piped into a file.

use anyhow::Result;
use tracing_subscriber::{
    fmt::{format::FmtSpan, Layer as FmtLayer},
    layer::SubscriberExt as _,
    EnvFilter, Registry,
};

pub(crate) struct Options {
    pub verbose: bool,
    pub color: bool,
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `--verbose` when it is set and valid.
pub(crate) fn set_up(options: &Options) -> Result<()> {
    let default_directive = if options.verbose { "trace" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let span_events = if options.verbose {
        // enter/exit too
        FmtSpan::FULL
    } else {
        FmtSpan::NEW | FmtSpan::CLOSE
    };

    let fmt_layer = FmtLayer::new()
        .with_writer(std::io::stderr)
        .with_target(options.verbose)
        .with_span_events(span_events)
        .with_ansi(options.color);
    let subscriber = Registry::default().with(filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to set up tracing: {}", e))?;
    Ok(())
}
