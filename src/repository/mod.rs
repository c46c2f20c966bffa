mod filter;
mod git_source;
mod names;
mod scanner;
mod source;

pub use filter::{Pattern, Polarity, ReferenceFilter, Rule};
pub use git_source::{GitObjectSource, RefSelection};
pub use scanner::{
    CancelFlag, EngineStats, IndicatifProgress, NoopProgress, ProgressCounter, ProgressHandle,
    ProgressObserver, ProgressReporter, ScanCtx, Scanner, SizeCache, VerboseProgress,
};
pub use source::{ChildMode, ChildRef, MemorySource, ObjectSource, RawObject};
