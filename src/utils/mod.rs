//! Filesystem helpers shared by the run pipeline.
//!
//! - [`scratch`] - self-removing scratch directory for manifest copies and
//!   exported lock artifacts

pub mod scratch;

pub use scratch::ScratchDir;
