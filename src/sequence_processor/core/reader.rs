use super::sequence::Sequence;
use anyhow::Result;

pub trait SequenceReader {
    /// Next record in file order, `None` at end of input.
    fn next_sequence(&mut self) -> Result<Option<Sequence>>;
}
