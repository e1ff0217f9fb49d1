use crate::sequence_processor::core::*;
use anyhow::{Context, Result};
use niffler::compression::Format;
use niffler::get_reader;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Line-grouping reader for four-line and two-line record files.
/// Compressed inputs are decoded transparently.
pub struct FastxReader {
    reader: Box<dyn BufRead>,
    format: RecordFormat,
    line: Vec<u8>,
}

impl FastxReader {
    pub fn new(path: &Path, format: RecordFormat) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input {}", path.display()))?;
        let (inner_reader, _compression) = get_reader(Box::new(file))
            .with_context(|| format!("Failed to detect compression of {}", path.display()))?;
        Ok(Self::from_reader(
            BufReader::with_capacity(4 * 1024 * 1024, inner_reader),
            format,
        ))
    }

    pub fn from_reader<R: BufRead + 'static>(reader: R, format: RecordFormat) -> Self {
        Self {
            reader: Box::new(reader),
            format,
            line: Vec::with_capacity(1024),
        }
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }
}

impl SequenceReader for FastxReader {
    fn next_sequence(&mut self) -> Result<Option<Sequence>> {
        let expected = self.format.lines_per_record();
        let mut lines: Vec<Vec<u8>> = Vec::with_capacity(expected);

        while lines.len() < expected {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                break;
            }
            let trimmed = self.line.trim_ascii();
            // Blank lines between records are not part of any record.
            if lines.is_empty() && trimmed.is_empty() {
                continue;
            }
            lines.push(trimmed.to_vec());
        }

        if lines.is_empty() {
            return Ok(None);
        }
        // A short group at end of file is still handed on; workers drop it
        // as incomplete.
        Ok(Some(Sequence::from_lines(lines, self.format)))
    }
}

/// Groups records into chunks of `chunk_size`, numbering each chunk with a
/// strictly increasing sequence index starting at zero.
pub struct ChunkReader<R: SequenceReader> {
    reader: R,
    chunk_size: usize,
    next_index: u64,
    finished: bool,
}

impl<R: SequenceReader> ChunkReader<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            next_index: 0,
            finished: false,
        }
    }

    fn read_chunk(&mut self) -> Result<Option<Chunk>> {
        let mut sequences = Vec::with_capacity(self.chunk_size);
        while sequences.len() < self.chunk_size {
            match self.reader.next_sequence()? {
                Some(sequence) => sequences.push(sequence),
                None => {
                    self.finished = true;
                    break;
                }
            }
        }

        if sequences.is_empty() {
            return Ok(None);
        }
        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(Chunk { index, sequences }))
    }
}

impl<R: SequenceReader> Iterator for ChunkReader<R> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Header lines of the first `records` records, used for platform detection.
pub fn peek_headers(path: &Path, format: RecordFormat, records: usize) -> Result<Vec<String>> {
    let mut reader = FastxReader::new(path, format)?;
    let mut headers = Vec::with_capacity(records);
    while headers.len() < records {
        match reader.next_sequence()? {
            Some(sequence) => headers.push(sequence.id),
            None => break,
        }
    }
    Ok(headers)
}

/// Compression format of the input, sniffed from its magic bytes.
pub fn input_compression(path: &Path) -> Result<Format> {
    let (_reader, format) = niffler::from_path(path)
        .with_context(|| format!("Failed to detect compression of {}", path.display()))?;
    Ok(format)
}

/// Open a possibly compressed file for line scanning.
pub fn open_decoded(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input {}", path.display()))?;
    let (inner_reader, _compression): (Box<dyn Read>, _) = get_reader(Box::new(file))?;
    Ok(Box::new(BufReader::with_capacity(1024 * 1024, inner_reader)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader_for(text: &'static str, format: RecordFormat) -> FastxReader {
        FastxReader::from_reader(Cursor::new(text.as_bytes()), format)
    }

    #[test]
    fn test_reads_four_line_records() {
        let mut reader = reader_for("@r1\nACGT\n+\nIIII\n@r2\nGGCC\n+\nHHHH\n", RecordFormat::Fastq);
        let first = reader.next_sequence().unwrap().unwrap();
        assert_eq!(first.id, "@r1");
        assert_eq!(first.data, b"ACGT");
        assert_eq!(first.quality, b"IIII");
        let second = reader.next_sequence().unwrap().unwrap();
        assert_eq!(second.id, "@r2");
        assert!(reader.next_sequence().unwrap().is_none());
    }

    #[test]
    fn test_trims_crlf_and_skips_blank_lines_between_records() {
        let mut reader = reader_for(">a\r\nACGT\r\n\n\n>b\nTT\n", RecordFormat::Fasta);
        let a = reader.next_sequence().unwrap().unwrap();
        assert_eq!(a.id, ">a");
        assert_eq!(a.data, b"ACGT");
        let b = reader.next_sequence().unwrap().unwrap();
        assert_eq!(b.id, ">b");
        assert!(reader.next_sequence().unwrap().is_none());
    }

    #[test]
    fn test_trailing_partial_record_is_returned_incomplete() {
        let mut reader = reader_for("@r1\nACGT\n+\nIIII\n@r2\nAC", RecordFormat::Fastq);
        assert!(reader.next_sequence().unwrap().unwrap().is_complete());
        let partial = reader.next_sequence().unwrap().unwrap();
        assert!(!partial.is_complete());
        assert_eq!(partial.metadata.lines_read, 2);
        assert!(reader.next_sequence().unwrap().is_none());
    }

    #[test]
    fn test_chunks_are_indexed_in_file_order() {
        let text = ">1\nA\n>2\nC\n>3\nG\n>4\nT\n>5\nA\n";
        let chunks: Vec<Chunk> = ChunkReader::new(reader_for(text, RecordFormat::Fasta), 2)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(chunks.len(), 3);
        let indices: Vec<u64> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(chunks[2].sequences.len(), 1);
        assert_eq!(chunks[2].sequences[0].id, ">5");
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let mut chunks = ChunkReader::new(reader_for("", RecordFormat::Fastq), 10);
        assert!(chunks.next().is_none());
    }
}
