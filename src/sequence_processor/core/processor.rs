use super::sequence::Sequence;
use super::stats::ProcessingStats;

pub trait SequenceProcessor: Send + Clone + 'static {
    /// Clean one record. Returns the record to stage, or `None` when it was
    /// dropped. Each worker owns its own clone of the processor.
    fn process_sequence(
        &mut self,
        sequence: Sequence,
        stats: &mut ProcessingStats,
    ) -> Option<Sequence>;
}
