//! History scanner
//!
//! Consumes an object stream and builds the repository-wide size aggregate.
//!
//! # Architecture
//!
//! - **cache**: Write-once descriptor cache with reference-counted release
//! - **engine**: Dependency-resolving traversal over the object stream
//! - **progress**: Progress counter, cancellation flag and display
//!
//! Object sources live next door in `repository::source` and
//! `repository::git_source`.

mod cache;
mod engine;
mod progress;

pub use cache::SizeCache;
pub use engine::{EngineStats, ScanCtx};
pub use progress::{
    CancelFlag, IndicatifProgress, NoopProgress, ProgressCounter, ProgressHandle, ProgressObserver,
    ProgressReporter, VerboseProgress,
};

use log::debug;
use std::time::Instant;

use crate::error::ScanError;
use crate::model::HistorySize;

use super::source::ObjectSource;

/// Scans an object stream into a [`HistorySize`]
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    progress: ProgressCounter,
    cancel: CancelFlag,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report finalized objects through `counter`
    pub fn with_progress(mut self, counter: ProgressCounter) -> Self {
        self.progress = counter;
        self
    }

    /// Abort the scan once `flag` is set
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn progress(&self) -> &ProgressCounter {
        &self.progress
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Drain `source` and return the finished aggregate
    ///
    /// Either every reachable object is scored or an error is returned;
    /// there is no partial result.
    pub fn scan<S: ObjectSource + ?Sized>(&self, source: &mut S) -> Result<HistorySize, ScanError> {
        let start = Instant::now();
        let mut ctx = ScanCtx::new(&self.progress, &self.cancel);

        for refname in source.references() {
            ctx.record_reference(refname);
        }

        while let Some(raw) = source.next_object()? {
            if self.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            ctx.accept(raw, &*source)?;
        }

        let retained = ctx.cached_descriptors();
        let (history, stats) = ctx.finish()?;
        debug!(
            "Scanned {} objects ({} duplicates, peak {} pending, {} descriptors retained) in {:?}",
            stats.finalized,
            stats.duplicates,
            stats.peak_pending,
            retained,
            start.elapsed()
        );
        Ok(history)
    }
}
