pub mod core;
pub mod readers;
pub mod threading;
mod cleaning_processor;

pub use cleaning_processor::CleaningProcessor;
pub use self::core::processor::SequenceProcessor;
