pub fn is_valid_length(data: &[u8], min_bases: usize) -> bool {
    data.len() >= min_bases
}

/// True when some maximal run of one repeated base is longer than `max_run`.
pub fn has_homopolymer_run(data: &[u8], max_run: usize) -> bool {
    let mut run = 0usize;
    let mut previous = None;
    for &base in data {
        if Some(base) == previous {
            run += 1;
        } else {
            run = 1;
            previous = Some(base);
        }
        if run > max_run {
            return true;
        }
    }
    false
}
