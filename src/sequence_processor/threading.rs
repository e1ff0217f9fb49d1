use super::core::*;
use crate::error::{CleanError, Result};
use crate::pipeline::staging::{StageKey, StagingArea};
use crossbeam_channel::{bounded, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Fixed set of cleaning workers fed through a bounded channel.
///
/// Each worker owns a clone of the processor, cleans whole chunks and stages
/// every surviving record under `(chunk.index, position)`. The first staging
/// error raises a shared flag; the feeding side checks it and stops early.
pub struct ThreadPool {
    handles: Vec<thread::JoinHandle<Result<ProcessingStats>>>,
    tx: Sender<Chunk>,
    failed: Arc<AtomicBool>,
    num_threads: usize,
}

impl ThreadPool {
    pub fn new<P: SequenceProcessor>(
        processor: P,
        staging: Arc<dyn StagingArea>,
        num_threads: usize,
    ) -> Self {
        let num_threads = num_threads.max(1);
        let (tx, rx) = bounded::<Chunk>(num_threads * 2);
        let failed = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(num_threads);

        for _ in 0..num_threads {
            let rx = rx.clone();
            let staging = staging.clone();
            let failed = failed.clone();
            let mut worker_processor = processor.clone();
            let handle = thread::spawn(move || {
                let mut local_stats = ProcessingStats::default();
                while let Ok(chunk) = rx.recv() {
                    if failed.load(Ordering::Relaxed) {
                        continue;
                    }
                    local_stats.chunks += 1;
                    for (position, sequence) in chunk.sequences.into_iter().enumerate() {
                        let Some(cleaned) =
                            worker_processor.process_sequence(sequence, &mut local_stats)
                        else {
                            continue;
                        };
                        let key = StageKey::new(chunk.index, position as u32);
                        if let Err(e) = staging.stage(key, &cleaned.render()) {
                            log::error!("Worker failed to stage chunk {}: {}", chunk.index, e);
                            failed.store(true, Ordering::Relaxed);
                            return Err(e);
                        }
                    }
                }
                Ok(local_stats)
            });
            handles.push(handle);
        }

        ThreadPool {
            handles,
            tx,
            failed,
            num_threads,
        }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Blocks while the queue is full.
    pub fn send(&self, chunk: Chunk) -> Result<()> {
        self.tx.send(chunk).map_err(|_| CleanError::WorkersStopped)
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    /// Close the queue, join every worker and sum their counters. The first
    /// worker error, if any, is returned after all workers have stopped.
    pub fn finish(self) -> Result<ProcessingStats> {
        drop(self.tx);

        let mut stats = ProcessingStats::default();
        let mut first_error = None;
        for handle in self.handles {
            match handle.join() {
                Ok(Ok(worker_stats)) => stats.merge(&worker_stats),
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(_) => {
                    if first_error.is_none() {
                        first_error = Some(CleanError::WorkerPanicked);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }
}
