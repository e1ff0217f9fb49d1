use super::{Extension, PluginError};
use crate::sequence_processor::core::Sequence;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes a gzip copy of the merged output next to it as `<out>.gz`.
pub struct CompressFile;

impl Extension for CompressFile {
    fn name(&self) -> &str {
        "compressFile"
    }

    fn supports_post_merge(&self) -> bool {
        true
    }

    fn process(&self, path: &Path) -> Result<(), PluginError> {
        let zip_path = with_suffix(path, ".gz");
        let mut input =
            BufReader::new(File::open(path).map_err(|e| PluginError::io(self.name(), e))?);
        let mut writer = niffler::to_path(
            &zip_path,
            niffler::compression::Format::Gzip,
            niffler::Level::Six,
        )
        .map_err(|e| PluginError::failed(self.name(), e.to_string()))?;

        io::copy(&mut input, &mut writer).map_err(|e| PluginError::io(self.name(), e))?;
        writer.flush().map_err(|e| PluginError::io(self.name(), e))?;

        log::info!("Compressed output written to {}", zip_path.display());
        Ok(())
    }
}

/// Writes the SHA-256 of the merged output as `<out>.sha256`.
pub struct Checksum;

impl Checksum {
    pub fn hexdigest(path: &Path) -> io::Result<String> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl Extension for Checksum {
    fn name(&self) -> &str {
        "checksum"
    }

    fn supports_post_merge(&self) -> bool {
        true
    }

    fn process(&self, path: &Path) -> Result<(), PluginError> {
        let digest = Self::hexdigest(path).map_err(|e| PluginError::io(self.name(), e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sidecar = with_suffix(path, ".sha256");
        std::fs::write(&sidecar, format!("{}  {}\n", digest, file_name))
            .map_err(|e| PluginError::io(self.name(), e))?;
        log::info!("Checksum written to {}", sidecar.display());
        Ok(())
    }
}

/// Drops the free-text comment after the read name in each header.
pub struct StripComment;

impl Extension for StripComment {
    fn name(&self) -> &str {
        "stripComment"
    }

    fn supports_records(&self) -> bool {
        true
    }

    fn process_record(&self, mut sequence: Sequence) -> Result<Sequence, PluginError> {
        if let Some(end) = sequence.id.find(char::is_whitespace) {
            sequence.id.truncate(end);
        }
        Ok(sequence)
    }
}
