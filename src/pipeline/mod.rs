//! The cleaning run: one reader, a pool of workers staging survivors under
//! order-preserving keys, and a merge that restores input order.

pub mod context;
pub mod merge;
pub mod orchestrator;
pub mod staging;

pub use context::{console_sink, EventSink, RunContext, RunEvent, RunPhase};
pub use merge::{merge_staged, MergeSummary};
pub use orchestrator::{detect_input_platform, run_pipeline, PipelineOptions, RunSummary};
pub use staging::{DiskStaging, MemoryStaging, StageKey, StagingArea, StagingMode};
