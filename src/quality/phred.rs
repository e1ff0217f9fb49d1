/// Offset of Sanger / Illumina 1.8+ qualities.
pub const PHRED33_OFFSET: u8 = 33;
/// Offset of Illumina 1.3-1.7 qualities.
pub const PHRED64_OFFSET: u8 = 64;
/// Highest character expected in Phred+33 data ('J', Q41).
pub const PHRED33_MAX_CHAR: u8 = b'J';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityEncoding {
    Phred33,
    Phred64,
}

impl QualityEncoding {
    pub fn offset(&self) -> u8 {
        match self {
            QualityEncoding::Phred33 => PHRED33_OFFSET,
            QualityEncoding::Phred64 => PHRED64_OFFSET,
        }
    }
}

/// Phred+64 when more than half of the characters sit above the Phred+33
/// range, Phred+33 otherwise.
pub fn detect_quality_offset(quality: &[u8]) -> QualityEncoding {
    let high = quality.iter().filter(|&&q| q > PHRED33_MAX_CHAR).count();
    if high * 2 > quality.len() {
        QualityEncoding::Phred64
    } else {
        QualityEncoding::Phred33
    }
}

pub fn decode_quality(quality: &[u8], encoding: QualityEncoding) -> Vec<u8> {
    let offset = encoding.offset();
    quality.iter().map(|&q| q.saturating_sub(offset)).collect()
}

/// Number of positions whose decoded score is below `min_score`.
pub fn count_bad_bases(quality: &[u8], min_score: u8) -> usize {
    let offset = detect_quality_offset(quality).offset();
    quality
        .iter()
        .filter(|&&q| q.saturating_sub(offset) < min_score)
        .count()
}

/// A quality string passes while its low-scoring positions stay within the
/// `max_bad_bases` tolerance. Two-line records carry no qualities and pass.
pub fn validate_quality(quality: &[u8], min_score: u8, max_bad_bases: usize) -> bool {
    count_bad_bases(quality, min_score) <= max_bad_bases
}

pub fn mean_quality(quality: &[u8]) -> Option<f64> {
    if quality.is_empty() {
        return None;
    }
    let encoding = detect_quality_offset(quality);
    let total: u64 = decode_quality(quality, encoding)
        .iter()
        .map(|&q| q as u64)
        .sum();
    Some(total as f64 / quality.len() as f64)
}
