//! cerror demo
//!
//! Registers a small catalog, fails a batch of simulated shard
//! connections in parallel, aggregates the failures and prints them.
//!
//! # Environment Variables
//!
//! - `CERROR_LOG=debug` - Log filter (default `info`)
//! - `CERROR_STACK=0` - Disable stack capture
//! - `CERROR_MAX_FRAMES=8` - Frames kept per capture
//!
//! ```text
//! CERROR_LOG=debug cargo run -p cerror-demo -- --workers 3 --mode verbose
//! ```

use std::io;
use std::thread;

use cerror::{catalog, renew, CError, CatalogError, ErrorReport, MultiError, RenderMode};
use clap::{Parser, ValueEnum};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Compact,
    Quoted,
    Verbose,
}

impl From<Mode> for RenderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Compact => RenderMode::Compact,
            Mode::Quoted => RenderMode::CompactQuoted,
            Mode::Verbose => RenderMode::Verbose,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cerror-demo", about = "Render aggregated catalog errors")]
struct Args {
    /// Rendering mode
    #[arg(long, value_enum, default_value_t = Mode::Compact)]
    mode: Mode,

    /// Print the JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Number of simulated shard workers
    #[arg(long, default_value_t = 3)]
    workers: usize,
}

const HDR_DAS: &str = "DAS";
const HDR_API: &str = "API";

fn register_catalog() -> Result<(), CatalogError> {
    catalog::init(|b| {
        b.register(HDR_DAS, 1001, "failed to connect to %s: %s")?;
        b.register(HDR_DAS, 1100, "%d of %d shard(s) unavailable")?;
        b.register(HDR_API, 500, "request %s failed")?;
        Ok(())
    })
    .map(|_| ())
}

/// Stand-in for a driver call.
fn dial(shard: usize) -> io::Result<()> {
    if shard % 2 == 0 {
        Err(io::Error::new(io::ErrorKind::TimedOut, "i/o timeout"))
    } else {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"))
    }
}

fn run_batch(workers: usize) -> Option<CError> {
    let connect = CError::new(catalog::lookup(HDR_DAS, 1001), None);
    let collected = Mutex::new(MultiError::new());

    thread::scope(|s| {
        for shard in 0..workers {
            let connect = &connect;
            let collected = &collected;
            s.spawn(move || {
                if let Err(e) = dial(shard) {
                    let host = format!("shard-{}", shard);
                    let kind = e.kind();
                    let err = connect.wrap_with(&[&host, &kind], e);
                    tracing::debug!(code = %err.code(), shard, "shard failed");
                    collected.lock().append(err);
                }
            });
        }
    });

    let failures = collected.into_inner().error_or_nil()?;
    let failed = failures.len();
    let batch = CError::new(catalog::lookup(HDR_DAS, 1100), Some(failures.into()));
    Some(renew!(batch, failed, workers))
}

fn main() {
    let filter = EnvFilter::try_from_env("CERROR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = register_catalog() {
        tracing::error!(error = %e, "catalog registration failed");
        std::process::exit(2);
    }

    let Some(batch) = run_batch(args.workers) else {
        println!("all {} shard(s) healthy", args.workers);
        return;
    };

    let top = renew!(
        CError::new(catalog::lookup(HDR_API, 500), Some(batch.into())),
        "/orders"
    );
    tracing::info!(code = %top.code(), "batch failed");

    if args.json {
        let report = ErrorReport::from_node(&top, matches!(args.mode, Mode::Verbose));
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!(error = %e, "report serialization failed"),
        }
    } else {
        println!("{}", top.render(args.mode.into()));
    }
}
