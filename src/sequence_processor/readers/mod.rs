mod fastx;

pub use fastx::{input_compression, open_decoded, peek_headers, ChunkReader, FastxReader};
