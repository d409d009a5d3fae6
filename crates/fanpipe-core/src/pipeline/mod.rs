//! Image transformation pipeline.
//!
//! Each stage runs as its own task and hands jobs to the next over a bounded
//! channel:
//! - **loader**: decode sources and derive output paths
//! - **transform**: resize, then convert to grayscale
//! - **rotator**: fan each image out into one copy per rotation angle
//! - **saver**: encode and write, one record per item
//! - **orchestrator**: wires the stages and drains results and errors
//!
//! Supporting pieces: **channel** (stage plumbing), **codec** and **ops**
//! (collaborator traits), **paths** (output path rules), **discovery**,
//! **hash** and **sink** (result reporting).

pub mod channel;
pub mod codec;
pub mod discovery;
pub mod hash;
pub mod job;
pub mod loader;
pub mod ops;
pub mod orchestrator;
pub mod paths;
pub mod rotator;
pub mod saver;
pub mod sink;
pub mod transform;

// Re-exports for convenient access
pub use channel::{PipelineStage, StageStats};
pub use codec::{Codec, FsCodec, SavedFile};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use hash::Hasher;
pub use job::Job;
pub use loader::Loader;
pub use ops::{ImageOps, Rotation, StandardOps};
pub use orchestrator::Orchestrator;
pub use paths::{derive_rotated, PathRewrite};
pub use rotator::Rotator;
pub use saver::Saver;
pub use sink::{LogSink, ReportSink};
pub use transform::{GrayscaleConverter, Resizer};
