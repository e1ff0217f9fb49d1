use crate::error::CleanError;
use std::path::Path;

/// Line layout of a read file, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RecordFormat {
    /// `@id`, bases, `+...`, quality
    Fastq,
    /// `>id`, bases
    Fasta,
}

impl RecordFormat {
    pub fn lines_per_record(&self) -> usize {
        match self {
            RecordFormat::Fastq => 4,
            RecordFormat::Fasta => 2,
        }
    }

    /// Pick the format from the extension, looking through a trailing
    /// compression suffix (`reads.fq.gz` is a FASTQ file).
    pub fn from_path(path: &Path) -> Result<Self, CleanError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_lowercase();
        let name = ["gz", "bz2", "xz", "zst"]
            .iter()
            .find_map(|ext| name.strip_suffix(&format!(".{}", ext)))
            .unwrap_or(&name);

        match Path::new(name).extension().and_then(|ext| ext.to_str()) {
            Some("fastq") | Some("fq") => Ok(RecordFormat::Fastq),
            Some("fasta") | Some("fa") => Ok(RecordFormat::Fasta),
            _ => Err(CleanError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub id: String,
    pub data: Vec<u8>,
    /// The `+` line of four-line records, empty for two-line records.
    pub separator: String,
    /// Phred-encoded qualities, empty for two-line records.
    pub quality: Vec<u8>,
    pub metadata: SequenceMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceMetadata {
    pub format: RecordFormat,
    /// Number of input lines the record was assembled from.
    pub lines_read: usize,
}

impl Sequence {
    /// Build a record from consecutive, already trimmed lines. Missing
    /// trailing lines leave the corresponding fields empty.
    pub fn from_lines(lines: Vec<Vec<u8>>, format: RecordFormat) -> Self {
        let lines_read = lines.len();
        let mut fields = lines.into_iter();
        let id = String::from_utf8_lossy(&fields.next().unwrap_or_default()).into_owned();
        let data = fields.next().unwrap_or_default();
        let (separator, quality) = match format {
            RecordFormat::Fastq => (
                String::from_utf8_lossy(&fields.next().unwrap_or_default()).into_owned(),
                fields.next().unwrap_or_default(),
            ),
            RecordFormat::Fasta => (String::new(), Vec::new()),
        };

        Sequence {
            id,
            data,
            separator,
            quality,
            metadata: SequenceMetadata { format, lines_read },
        }
    }

    pub fn fastq(id: &str, data: &str, quality: &str) -> Self {
        Sequence {
            id: id.to_string(),
            data: data.as_bytes().to_vec(),
            separator: "+".to_string(),
            quality: quality.as_bytes().to_vec(),
            metadata: SequenceMetadata {
                format: RecordFormat::Fastq,
                lines_read: 4,
            },
        }
    }

    pub fn fasta(id: &str, data: &str) -> Self {
        Sequence {
            id: id.to_string(),
            data: data.as_bytes().to_vec(),
            separator: String::new(),
            quality: Vec::new(),
            metadata: SequenceMetadata {
                format: RecordFormat::Fasta,
                lines_read: 2,
            },
        }
    }

    /// True when every line of the record was present in the input.
    pub fn is_complete(&self) -> bool {
        self.metadata.lines_read == self.metadata.format.lines_per_record()
    }

    /// Bases and qualities must pair up one to one when qualities exist.
    pub fn is_well_formed(&self) -> bool {
        self.quality.is_empty() || self.quality.len() == self.data.len()
    }

    /// Truncate bases and qualities together.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
        if self.quality.len() >= len {
            self.quality.truncate(len);
        }
    }

    /// Output lines of the record, each terminated by a newline.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.id.len() + self.data.len() + self.separator.len() + self.quality.len() + 4,
        );
        out.extend_from_slice(self.id.as_bytes());
        out.push(b'\n');
        out.extend_from_slice(&self.data);
        out.push(b'\n');
        if self.metadata.format == RecordFormat::Fastq {
            out.extend_from_slice(self.separator.as_bytes());
            out.push(b'\n');
            out.extend_from_slice(&self.quality);
            out.push(b'\n');
        }
        out
    }
}

/// A batch of consecutive records tagged with the reader's sequence index.
#[derive(Debug)]
pub struct Chunk {
    pub index: u64,
    pub sequences: Vec<Sequence>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            RecordFormat::from_path(Path::new("reads.fastq")).unwrap(),
            RecordFormat::Fastq
        );
        assert_eq!(
            RecordFormat::from_path(Path::new("/data/READS.FQ.GZ")).unwrap(),
            RecordFormat::Fastq
        );
        assert_eq!(
            RecordFormat::from_path(Path::new("contigs.fa")).unwrap(),
            RecordFormat::Fasta
        );
        assert!(RecordFormat::from_path(Path::new("reads.bam")).is_err());
        assert!(RecordFormat::from_path(Path::new("reads.gz")).is_err());
    }

    #[test]
    fn test_render_four_line_record() {
        let seq = Sequence::fastq("@r1", "ACGT", "IIII");
        assert_eq!(seq.render(), b"@r1\nACGT\n+\nIIII\n".to_vec());
    }

    #[test]
    fn test_render_two_line_record() {
        let seq = Sequence::fasta(">r1", "ACGT");
        assert_eq!(seq.render(), b">r1\nACGT\n".to_vec());
    }

    #[test]
    fn test_partial_record_is_incomplete() {
        let seq = Sequence::from_lines(vec![b"@r1".to_vec(), b"ACGT".to_vec()], RecordFormat::Fastq);
        assert!(!seq.is_complete());
        assert!(seq.quality.is_empty());
    }

    #[test]
    fn test_truncate_keeps_quality_in_step() {
        let mut seq = Sequence::fastq("@r1", "ACGTACGT", "IIIIHHHH");
        seq.truncate(3);
        assert_eq!(seq.data, b"ACG");
        assert_eq!(seq.quality, b"III");
        assert!(seq.is_well_formed());
    }
}
