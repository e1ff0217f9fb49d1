use crate::platform::Platform;
use crate::sequence_processor::core::ProcessingStats;
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use indicatif::ProgressBar;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RunPhase {
    Idle,
    ReadingAndWorking,
    Draining,
    Merging,
    ExtendingPostMerge,
    Done,
}

/// Events published while a cleaning run moves through its phases.
#[derive(Clone, Debug)]
pub enum RunEvent {
    PhaseChanged { phase: RunPhase },
    PlatformDetected { platform: Platform },
    ChunkSubmitted { index: u64, records: usize },
    WorkersJoined { stats: ProcessingStats },
    Merged { artifacts: u64, bytes: u64 },
    ExtensionFinished { name: String, ok: bool },
    Failed { error: String },
}

pub type EventSink = Arc<dyn Fn(&RunEvent) + Send + Sync>;

/// Run state threaded through the pipeline in place of global counters.
pub struct RunContext {
    phase: RunPhase,
    started: Instant,
    sink: Option<EventSink>,
}

impl RunContext {
    pub fn new(sink: Option<EventSink>) -> Self {
        Self {
            phase: RunPhase::Idle,
            started: Instant::now(),
            sink,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn advance_to(&mut self, phase: RunPhase) {
        log::debug!("Run phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.emit(RunEvent::PhaseChanged { phase });
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(sink) = &self.sink {
            sink(&event);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Sink that logs every event and drives a console spinner.
pub fn console_sink() -> anyhow::Result<EventSink> {
    let progress: ProgressBar = ProgressBarBuilder::new("Starting")
        .with_template("{spinner:.green} [{elapsed_precise}] {msg}")
        .with_tick()
        .build()?;

    Ok(Arc::new(move |event: &RunEvent| match event {
        RunEvent::PhaseChanged { phase } => {
            log::info!("Phase: {:?}", phase);
            progress.set_message(format!("{:?}", phase));
            if *phase == RunPhase::Done {
                progress.finish_and_clear();
            }
        }
        RunEvent::PlatformDetected { platform } => {
            log::info!("Detected sequencing platform: {}", platform.display_name());
        }
        RunEvent::ChunkSubmitted { index, records } => {
            log::trace!("Chunk {} submitted with {} records", index, records);
            progress.set_message(format!("Cleaning chunk {}", index + 1));
        }
        RunEvent::WorkersJoined { stats } => {
            log::info!(
                "Workers finished: {} records, {} passed, {} rejected, {} malformed",
                stats.processed,
                stats.passed,
                stats.rejected,
                stats.malformed
            );
        }
        RunEvent::Merged { artifacts, bytes } => {
            log::info!("Merged {} records ({} bytes)", artifacts, bytes);
        }
        RunEvent::ExtensionFinished { name, ok } => {
            if *ok {
                log::info!("Extension {} completed", name);
            } else {
                log::warn!("Extension {} did not complete", name);
            }
        }
        RunEvent::Failed { error } => {
            progress.abandon_with_message(format!("Failed: {}", error));
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_phase_changes_are_published() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: EventSink = Arc::new(move |event: &RunEvent| {
            if let RunEvent::PhaseChanged { phase } = event {
                sink_seen.lock().unwrap().push(*phase);
            }
        });

        let mut ctx = RunContext::new(Some(sink));
        assert_eq!(ctx.phase(), RunPhase::Idle);
        ctx.advance_to(RunPhase::ReadingAndWorking);
        ctx.advance_to(RunPhase::Draining);
        ctx.emit(RunEvent::Merged { artifacts: 1, bytes: 2 });

        assert_eq!(ctx.phase(), RunPhase::Draining);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![RunPhase::ReadingAndWorking, RunPhase::Draining]
        );
    }
}
