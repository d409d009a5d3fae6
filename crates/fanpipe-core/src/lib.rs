//! fanpipe core - concurrent image transformation pipeline.
//!
//! Source images are decoded, resized, converted to grayscale, fanned out
//! into one rotated copy per configured angle, and written next to their
//! inputs under an output directory.
//!
//! # Architecture
//!
//! Every stage is a task connected to the next by a bounded channel, so a
//! slow saver throttles the loader instead of buffering the whole run:
//!
//! ```text
//! paths → Load → Resize → Grayscale → Rotate (×N) → Save → records
//!          └─ load errors                            └─ save errors
//! ```
//!
//! Per-item failures never stop the run; they are reported through a
//! [`ReportSink`] and counted in the [`RunSummary`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fanpipe_core::{Config, LogSink, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> fanpipe_core::Result<()> {
//!     let config = Config::load()?;
//!     let orchestrator = Orchestrator::new(&config)?;
//!
//!     let paths = vec!["images/a.jpg".into(), "images/c.jpg".into()];
//!     let summary = orchestrator.run(paths, Arc::new(LogSink)).await?;
//!     println!("saved {} of {}", summary.saved, summary.save_attempts);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, Error, PipelineError, Result};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    Codec, FileDiscovery, FsCodec, ImageOps, LogSink, Orchestrator, PathRewrite, ReportSink,
    StandardOps,
};
pub use types::{ErrorRecord, ErrorSource, OutputRecord, RunSummary, SaveRecord, SaveStatus};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_orchestrator_fans_out_four_ways() {
        let orchestrator = Orchestrator::new(&Config::default()).unwrap();
        assert_eq!(orchestrator.fan_out(), 4);
    }
}
