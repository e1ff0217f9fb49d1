use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Platform {
    Illumina,
    OxfordNanopore,
    PacBio,
    IonTorrent,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Illumina,
        Platform::OxfordNanopore,
        Platform::PacBio,
        Platform::IonTorrent,
    ];

    /// Name used as the key in the adapter and threshold configuration files.
    pub fn config_name(&self) -> &'static str {
        match self {
            Platform::Illumina => "Illumina",
            Platform::OxfordNanopore => "OxfordNanopore",
            Platform::PacBio => "PacBio",
            Platform::IonTorrent => "IonTorrent",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Illumina => "Illumina",
            Platform::OxfordNanopore => "Oxford Nanopore",
            Platform::PacBio => "PacBio",
            Platform::IonTorrent => "Ion Torrent",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "illumina" => Ok(Platform::Illumina),
            "oxfordnanopore" | "nanopore" | "ont" => Ok(Platform::OxfordNanopore),
            "pacbio" => Ok(Platform::PacBio),
            "iontorrent" => Ok(Platform::IonTorrent),
            _ => Err(format!("unknown sequencing platform '{}'", s)),
        }
    }
}

// Lower-cased vendor and instrument names seen as whole fields in Ion
// Torrent headers. "ion_torrent" arrives as the two fields "ion", "torrent".
const ION_TORRENT_TOKENS: [&str; 7] = [
    "ionxpress",
    "iontorrent",
    "thermo",
    "pgm",
    "proton",
    "genexus",
    "s5",
];

/// Classify a single header line. Families are tried in priority order and
/// the first one that matches wins.
pub fn detect_platform_from_header(line: &str) -> Option<Platform> {
    if is_illumina_header(line) {
        return Some(Platform::Illumina);
    }
    if line.contains('@') && line.contains("runid") {
        return Some(Platform::OxfordNanopore);
    }
    if is_pacbio_header(line) {
        return Some(Platform::PacBio);
    }
    if is_ion_torrent_header(line) {
        return Some(Platform::IonTorrent);
    }
    None
}

/// Scan sample header lines in order and return the platform of the first
/// line any heuristic recognizes.
pub fn detect_platform<S: AsRef<str>>(headers: &[S]) -> Option<Platform> {
    headers
        .iter()
        .find_map(|line| detect_platform_from_header(line.as_ref()))
}

// Run/lane markers: NextSeq "@NS" instrument ids, a ":1:" lane field or the
// seven-field instrument:run:flowcell:lane:tile:x:y layout.
// Example: @A00123:123:HXXXYDRXX:1:1101:1000:1000 1:N:0:ATCACG
fn is_illumina_header(line: &str) -> bool {
    if line.contains("@NS") || line.contains(":1:") {
        return true;
    }
    let name = line.split_whitespace().next().unwrap_or("");
    name.matches(':').count() >= 6
}

// Movie-name prefix m<instrument>_<date>_<time>/<zmw>/... or a ccs read marker.
// Example: @m64023e_230414_133043/1/ccs
fn is_pacbio_header(line: &str) -> bool {
    if line.starts_with(">m") || line.contains("ccs") {
        return true;
    }
    let name = line.trim_start_matches(['@', '>']);
    if name.starts_with('m') && name.contains('/') {
        let parts: Vec<&str> = name.split('/').collect();
        return parts.len() >= 2 && parts[0].contains('_');
    }
    false
}

// Fields are the alphanumeric runs of the header, so "@reads5_001" holds
// "reads5" and never the "s5" instrument name.
fn is_ion_torrent_header(line: &str) -> bool {
    let lowered = line.to_lowercase();
    let fields: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|field| !field.is_empty())
        .collect();
    fields.iter().any(|field| ION_TORRENT_TOKENS.contains(field))
        || fields.windows(2).any(|pair| pair == ["ion", "torrent"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_illumina_lane_marker() {
        let headers = ["@A00123:123:HXXXYDRXX:1:1101:1000:1000 1:N:0:ATCACG"];
        assert_eq!(detect_platform(&headers), Some(Platform::Illumina));
        assert_eq!(
            detect_platform(&["@NS500123_run_sample"]),
            Some(Platform::Illumina)
        );
    }

    #[test]
    fn test_detects_nanopore_runid() {
        let headers =
            ["@0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d runid=8f2c ch=12 start_time=2023-01-01"];
        assert_eq!(detect_platform(&headers), Some(Platform::OxfordNanopore));
    }

    #[test]
    fn test_detects_pacbio_movie_names() {
        assert_eq!(
            detect_platform(&["@m64023e_230414_133043/1/ccs"]),
            Some(Platform::PacBio)
        );
        assert_eq!(
            detect_platform(&[">m54006_160504_020705/4194370/0_5231"]),
            Some(Platform::PacBio)
        );
    }

    #[test]
    fn test_detects_ion_torrent_tokens() {
        assert_eq!(
            detect_platform(&["@IonXpress_001 read ZXN5H"]),
            Some(Platform::IonTorrent)
        );
        assert_eq!(
            detect_platform(&["@run_from_PGM_chip"]),
            Some(Platform::IonTorrent)
        );
    }

    #[test]
    fn test_ion_torrent_tokens_need_field_boundaries() {
        assert_eq!(detect_platform(&["@reads5_001"]), None);
        assert_eq!(detect_platform(&["@sample_pgmx"]), None);
        assert_eq!(detect_platform(&["@thermostable_read 12"]), None);
        assert_eq!(detect_platform(&["@lion torrential"]), None);
        assert_eq!(
            detect_platform(&["@Ion_Torrent_run7 S5 chip"]),
            Some(Platform::IonTorrent)
        );
        assert_eq!(
            detect_platform(&["@ZXN5H:01234:00567 s5"]),
            Some(Platform::IonTorrent)
        );
    }

    #[test]
    fn test_priority_order_within_a_line() {
        // Both a lane marker and a ccs token: the Illumina family is tried first.
        assert_eq!(
            detect_platform(&["@ccs:1:lane"]),
            Some(Platform::Illumina)
        );
    }

    #[test]
    fn test_first_recognized_line_wins() {
        let headers = ["@read_without_markers", "@m64023e_230414_133043/1/ccs", "@NS5001:1:x"];
        assert_eq!(detect_platform(&headers), Some(Platform::PacBio));
    }

    #[test]
    fn test_unidentified_sample() {
        assert_eq!(detect_platform(&["@read1", "@read2"]), None);
        assert_eq!(detect_platform::<&str>(&[]), None);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let headers = vec![
            "@plain".to_string(),
            "@x runid=abc".to_string(),
            "@NS500:1:y".to_string(),
        ];
        let first = detect_platform(&headers);
        for _ in 0..10 {
            assert_eq!(detect_platform(&headers), first);
        }
        assert_eq!(first, Some(Platform::OxfordNanopore));
    }

    #[test]
    fn test_parse_config_names_and_aliases() {
        assert_eq!("OxfordNanopore".parse(), Ok(Platform::OxfordNanopore));
        assert_eq!("Oxford Nanopore".parse(), Ok(Platform::OxfordNanopore));
        assert_eq!("Ion Torrent".parse(), Ok(Platform::IonTorrent));
        assert!("Sanger".parse::<Platform>().is_err());
        for platform in Platform::ALL {
            assert_eq!(platform.config_name().parse(), Ok(platform));
        }
    }
}
