//! Catalog synchronization engine.
//!
//! The [`Synchronizer`] reconciles a local bundle directory with a
//! filtered subset of the remote catalog:
//!
//! ```text
//! list catalog ──► include/exclude filter ──► bounded parallel downloads
//!                                                      │
//!                         progress tracker ◄───────────┤ (side channel)
//!                                                      ▼
//!                                            outcome aggregation
//!                                                      │
//!                              all succeeded? ── yes ──► write manifest
//!                                    │
//!                                    no ──► PartialFailure, no manifest
//! ```
//!
//! Downloads never abort each other: every task runs to completion and its
//! result is captured as a [`DownloadOutcome`]. Only after all outcomes
//! are in does the run decide between committing the manifest and failing
//! with the full list of broken bundles. A run that fails commits nothing.

mod engine;
mod options;
mod pool;
mod types;

pub use engine::{Synchronizer, UpdateStatus, BUNDLE_EXTENSION};
pub use options::{default_concurrency, SyncOptions};
pub use pool::run_limited;
pub use types::{DownloadOutcome, SyncError, TaskError};
