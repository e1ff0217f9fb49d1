use maria::config::{PlatformProfile, QualityThresholds};
use maria::pipeline::{StageKey, StagingArea};
use maria::plugins::RecordHooks;
use maria::sequence_processor::core::{RecordFormat, Sequence};
use maria::sequence_processor::readers::{ChunkReader, FastxReader};
use maria::sequence_processor::threading::ThreadPool;
use maria::sequence_processor::CleaningProcessor;
use maria::{CleanError, Platform};
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Accepts every key but remembers any key it has seen before.
#[derive(Default)]
struct CollisionDetector {
    seen: Mutex<HashSet<StageKey>>,
    collisions: Mutex<Vec<StageKey>>,
}

impl StagingArea for CollisionDetector {
    fn stage(&self, key: StageKey, _bytes: &[u8]) -> maria::Result<()> {
        if !self.seen.lock().unwrap().insert(key) {
            self.collisions.lock().unwrap().push(key);
        }
        Ok(())
    }

    fn staged_keys(&self) -> maria::Result<Vec<StageKey>> {
        Ok(self.seen.lock().unwrap().iter().copied().collect())
    }

    fn read_artifact(&self, _key: StageKey) -> maria::Result<Vec<u8>> {
        Err(CleanError::StagingUnavailable("write-only".to_string()))
    }

    fn clear(&self) -> maria::Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "collision detector".to_string()
    }
}

fn lenient_profile() -> Arc<PlatformProfile> {
    Arc::new(PlatformProfile {
        platform: Platform::Illumina,
        adapters: vec!["AGATCGGAAGAGC".to_string()],
        thresholds: QualityThresholds {
            min_phred_score: 20,
            min_bases: 4,
            max_homopolymer_run: 0,
            max_bad_bases: 0,
        },
    })
}

fn input(records: usize) -> String {
    (0..records)
        .map(|i| format!("@A1:1:FC:1:1:{}:1\nACGTACGT\n+\nIIIIIIII\n", i))
        .collect()
}

#[test]
fn every_staged_key_is_unique_across_workers() {
    for (threads, chunk_size) in [(1, 1), (3, 7), (8, 2), (16, 50)] {
        let staging = Arc::new(CollisionDetector::default());
        let processor = CleaningProcessor::new(lenient_profile(), RecordHooks::default());
        let pool = ThreadPool::new(processor, staging.clone(), threads);

        let reader = FastxReader::from_reader(Cursor::new(input(500).into_bytes()), RecordFormat::Fastq);
        for chunk in ChunkReader::new(reader, chunk_size) {
            pool.send(chunk.unwrap()).unwrap();
        }
        let stats = pool.finish().unwrap();

        assert_eq!(stats.passed, 500);
        assert!(staging.collisions.lock().unwrap().is_empty());
        assert_eq!(staging.staged_keys().unwrap().len(), 500);
    }
}

#[test]
fn keys_follow_chunk_index_and_position() {
    let staging = Arc::new(CollisionDetector::default());
    let processor = CleaningProcessor::new(lenient_profile(), RecordHooks::default());
    let pool = ThreadPool::new(processor, staging.clone(), 4);

    let reader = FastxReader::from_reader(Cursor::new(input(10).into_bytes()), RecordFormat::Fastq);
    for chunk in ChunkReader::new(reader, 4) {
        pool.send(chunk.unwrap()).unwrap();
    }
    pool.finish().unwrap();

    let mut keys = staging.staged_keys().unwrap();
    keys.sort();
    let expected: Vec<StageKey> = [(0, 0), (0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2), (1, 3), (2, 0), (2, 1)]
        .into_iter()
        .map(|(chunk, position)| StageKey::new(chunk, position))
        .collect();
    assert_eq!(keys, expected);
}

#[test]
fn rejected_records_leave_gaps_not_shifts() {
    let staging = Arc::new(CollisionDetector::default());
    let processor = CleaningProcessor::new(lenient_profile(), RecordHooks::default());
    let pool = ThreadPool::new(processor, staging.clone(), 2);

    let chunk = maria::sequence_processor::core::Chunk {
        index: 0,
        sequences: vec![
            Sequence::fastq("@a", "ACGTACGT", "IIIIIIII"),
            Sequence::fastq("@b", "ACGTACGT", "IIII####"),
            Sequence::fastq("@c", "ACGTACGT", "IIIIIIII"),
        ],
    };
    pool.send(chunk).unwrap();
    pool.finish().unwrap();

    let mut keys = staging.staged_keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec![StageKey::new(0, 0), StageKey::new(0, 2)]);
}
