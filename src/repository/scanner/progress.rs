//! Progress reporting abstraction
//!
//! The scan only bumps an atomic counter. Rendering (indicatif) happens in a
//! separate observer task that samples the counter, so it never slows the
//! scan down and never changes its result.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Number of objects finalized so far
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter(Arc<AtomicU64>);

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Request to abort a running scan
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A handle to an active progress display
pub trait ProgressHandle: Send + Sync {
    fn set_position(&self, pos: u64);
    fn finish(&self);
}

/// Factory for creating progress handles
pub trait ProgressReporter: Send + Sync {
    fn start(&self, label: &str) -> Box<dyn ProgressHandle>;
}

/// Indicatif-based progress reporter for CLI usage
pub struct IndicatifProgress;

impl ProgressReporter for IndicatifProgress {
    fn start(&self, label: &str) -> Box<dyn ProgressHandle> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template(&format!(
                    "{{spinner:.green}} {}: {{pos}} objects ({{per_sec}})",
                    label
                ))
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Box::new(IndicatifHandle(pb))
    }
}

struct IndicatifHandle(ProgressBar);

impl ProgressHandle for IndicatifHandle {
    fn set_position(&self, pos: u64) {
        self.0.set_position(pos);
        self.0.tick();
    }

    fn finish(&self) {
        self.0.finish_and_clear();
    }
}

/// No-op progress reporter for benchmarks and quiet mode
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _label: &str) -> Box<dyn ProgressHandle> {
        Box::new(NoopHandle)
    }
}

struct NoopHandle;

impl ProgressHandle for NoopHandle {
    fn set_position(&self, _pos: u64) {}
    fn finish(&self) {}
}

/// Progress reporter that only shows output when enabled
pub struct VerboseProgress {
    enabled: bool,
}

impl VerboseProgress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl ProgressReporter for VerboseProgress {
    fn start(&self, label: &str) -> Box<dyn ProgressHandle> {
        if self.enabled {
            IndicatifProgress.start(label)
        } else {
            NoopProgress.start(label)
        }
    }
}

/// Background task that mirrors a [`ProgressCounter`] into a progress display
pub struct ProgressObserver {
    stop: oneshot::Sender<()>,
    task: JoinHandle<u64>,
}

impl ProgressObserver {
    /// Must be called from within a tokio runtime
    pub fn spawn(counter: ProgressCounter, handle: Box<dyn ProgressHandle>, every: Duration) -> Self {
        let (stop, mut stopped) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = tick.tick() => handle.set_position(counter.get()),
                    _ = &mut stopped => break,
                }
            }
            // The last sample always reflects the final count.
            let last = counter.get();
            handle.set_position(last);
            handle.finish();
            last
        });
        Self { stop, task }
    }

    /// Stop observing; returns the final count shown
    pub async fn finish(self) -> u64 {
        let _ = self.stop.send(());
        self.task.await.unwrap_or_default()
    }
}
