//! Pure record-cleaning rules. The rules are the same for every platform;
//! the [`PlatformProfile`] only decides which adapters and limits apply.

mod adapter;
mod filters;
mod phred;

pub use adapter::{find_subsequence, trim_adapter};
pub use filters::{has_homopolymer_run, is_valid_length};
pub use phred::{
    count_bad_bases, decode_quality, detect_quality_offset, mean_quality, validate_quality,
    QualityEncoding,
};

use crate::config::PlatformProfile;
use crate::sequence_processor::core::Sequence;

/// Trim adapters, then keep the record only if its qualities, length and
/// homopolymer content are all within the profile's limits.
pub fn clean_sequence(sequence: Sequence, profile: &PlatformProfile) -> Option<Sequence> {
    let thresholds = &profile.thresholds;
    let sequence = trim_adapter(sequence, &profile.adapters);

    if !validate_quality(
        &sequence.quality,
        thresholds.min_phred_score,
        thresholds.max_bad_bases,
    ) {
        return None;
    }
    if !is_valid_length(&sequence.data, thresholds.min_bases) {
        return None;
    }
    if thresholds.max_homopolymer_run > 0
        && has_homopolymer_run(&sequence.data, thresholds.max_homopolymer_run)
    {
        return None;
    }
    Some(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityThresholds;
    use crate::platform::Platform;

    fn profile(homopolymer: usize) -> PlatformProfile {
        PlatformProfile {
            platform: Platform::IonTorrent,
            adapters: vec!["CCATCTCATCCC".to_string()],
            thresholds: QualityThresholds {
                min_phred_score: 20,
                min_bases: 8,
                max_homopolymer_run: homopolymer,
                max_bad_bases: 2,
            },
        }
    }

    #[test]
    fn test_passing_record_is_trimmed() {
        let seq = Sequence::fastq("@r", "ACGTACGTACCATCTCATCCCAA", "IIIIIIIIII#############");
        let cleaned = clean_sequence(seq, &profile(0)).unwrap();
        assert_eq!(cleaned.data, b"ACGTACGTA");
        assert_eq!(cleaned.quality, b"IIIIIIIII");
    }

    #[test]
    fn test_too_many_bad_bases_rejected() {
        let seq = Sequence::fastq("@r", "ACGTACGTAC", "IIIIIII###");
        assert!(clean_sequence(seq, &profile(0)).is_none());
    }

    #[test]
    fn test_short_after_trimming_rejected() {
        let seq = Sequence::fastq("@r", "ACGCCATCTCATCCCTT", "IIIIIIIIIIIIIIIII");
        assert!(clean_sequence(seq, &profile(0)).is_none());
    }

    #[test]
    fn test_homopolymer_rule_only_when_configured() {
        let seq = Sequence::fastq("@r", "ACAAAAAAAAGT", "IIIIIIIIIIII");
        assert!(clean_sequence(seq.clone(), &profile(0)).is_some());
        assert!(clean_sequence(seq, &profile(6)).is_none());
    }

    #[test]
    fn test_two_line_records_skip_quality_check() {
        let seq = Sequence::fasta(">r", "ACGTACGTACGT");
        assert!(clean_sequence(seq, &profile(6)).is_some());
    }
}
