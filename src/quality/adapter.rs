use crate::sequence_processor::core::Sequence;

/// Position of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Cut the record at the first adapter found, trying adapters in list order.
/// Only the first adapter that matches is applied; empty adapter strings are
/// ignored. Records without any adapter are returned unchanged.
pub fn trim_adapter(mut sequence: Sequence, adapters: &[String]) -> Sequence {
    for adapter in adapters {
        if let Some(pos) = find_subsequence(&sequence.data, adapter.as_bytes()) {
            sequence.truncate(pos);
            break;
        }
    }
    sequence
}
