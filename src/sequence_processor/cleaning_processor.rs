use crate::config::PlatformProfile;
use crate::plugins::RecordHooks;
use crate::quality::clean_sequence;
use crate::sequence_processor::core::{ProcessingStats, Sequence, SequenceProcessor};
use std::sync::Arc;

/// Applies the platform profile to each record, then the per-record
/// extension chain to the survivors.
#[derive(Clone)]
pub struct CleaningProcessor {
    profile: Arc<PlatformProfile>,
    hooks: RecordHooks,
}

impl CleaningProcessor {
    pub fn new(profile: Arc<PlatformProfile>, hooks: RecordHooks) -> Self {
        Self { profile, hooks }
    }
}

impl SequenceProcessor for CleaningProcessor {
    fn process_sequence(
        &mut self,
        sequence: Sequence,
        stats: &mut ProcessingStats,
    ) -> Option<Sequence> {
        stats.processed += 1;

        if !sequence.is_complete() || !sequence.is_well_formed() {
            log::debug!("Dropping malformed record '{}'", sequence.id);
            stats.malformed += 1;
            return None;
        }

        let Some(cleaned) = clean_sequence(sequence, &self.profile) else {
            stats.rejected += 1;
            return None;
        };
        stats.passed += 1;

        if self.hooks.is_empty() {
            Some(cleaned)
        } else {
            Some(self.hooks.apply(cleaned, stats))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityThresholds;
    use crate::platform::Platform;
    use crate::sequence_processor::core::RecordFormat;

    fn processor() -> CleaningProcessor {
        let profile = PlatformProfile {
            platform: Platform::Illumina,
            adapters: vec!["AGATCGGAAGAGC".to_string()],
            thresholds: QualityThresholds {
                min_phred_score: 25,
                min_bases: 4,
                max_homopolymer_run: 0,
                max_bad_bases: 1,
            },
        };
        CleaningProcessor::new(Arc::new(profile), RecordHooks::default())
    }

    #[test]
    fn test_counts_each_outcome() {
        let mut p = processor();
        let mut stats = ProcessingStats::default();

        assert!(p
            .process_sequence(Sequence::fastq("@ok", "ACGTACGT", "IIIIIIII"), &mut stats)
            .is_some());
        assert!(p
            .process_sequence(Sequence::fastq("@low", "ACGTACGT", "II######"), &mut stats)
            .is_none());
        assert!(p
            .process_sequence(Sequence::fastq("@bad", "ACGTACGT", "III"), &mut stats)
            .is_none());
        assert!(p
            .process_sequence(
                Sequence::from_lines(vec![b"@tail".to_vec()], RecordFormat::Fastq),
                &mut stats
            )
            .is_none());

        assert_eq!(stats.processed, 4);
        assert_eq!(stats.passed, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.malformed, 2);
    }

    #[test]
    fn test_two_line_records_skip_quality_rules() {
        let mut p = processor();
        let mut stats = ProcessingStats::default();
        let out = p
            .process_sequence(Sequence::fasta(">r1", "ACGTAGATCGGAAGAGCTT"), &mut stats)
            .unwrap();
        assert_eq!(out.data, b"ACGT");
    }
}
