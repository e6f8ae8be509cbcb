//! Speedup, efficiency and best/worst LMUL summaries for RISC-V vector benchmark results,
//! printed as text and drawn as a six panel dashboard.

pub mod bench;
pub mod config;
pub mod datasets;
pub mod error;
pub mod lmul;
pub mod plot;
pub mod report;
pub mod summary;

pub use bench::Observation;
pub use error::{DataError, Error, Result};
pub use lmul::Lmul;
pub use summary::{summarize, Summary, SummaryRecord};

use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout only carries the report. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Opens the rendered image with the platform viewer. Failure is only logged.
pub fn display(path: &Path) {
    let viewer = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    if let Err(e) = std::process::Command::new(viewer).arg(path).spawn() {
        warn!(viewer, error = %e, "can't display {}", path.display());
    }
}
