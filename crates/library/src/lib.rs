//! Collection scanning, duplicate grouping and reorganization planning.
//!
//! The pipeline runs in two halves. The pure half — [`plan::group`],
//! [`plan::select`], [`plan::plan`], [`report`] — is synchronous and
//! side-effect-free: given the same records it always produces the same
//! plan, which makes dry runs and tests trivial. The I/O half — [`scan`],
//! [`execute`], [`prune`] — touches the filesystem and treats every
//! per-file failure as survivable: log, skip, continue.

pub mod error;
pub mod execute;
pub mod plan;
pub mod prune;
mod record;
pub mod report;
pub mod scan;
#[cfg(test)]
mod testutil;

pub use crate::record::{BookFormat, EbookRecord};
