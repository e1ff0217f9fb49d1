use super::{Extension, PluginError};
use crate::sequence_processor::core::Sequence;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// An executable in the plugin directory.
///
/// Post-merge: `<exe> process <path>`.
/// Per-record: `<exe> process-record`, reading the rendered record on stdin
/// and writing the rewritten record, same line count, on stdout.
/// A non-zero exit status is a failure of that call.
pub struct ExternalExtension {
    name: String,
    executable: PathBuf,
}

impl ExternalExtension {
    pub fn new(name: &str, executable: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            executable,
        }
    }

    fn check_status(&self, status: std::process::ExitStatus, stderr: &[u8]) -> Result<(), PluginError> {
        if status.success() {
            return Ok(());
        }
        Err(PluginError::failed(
            &self.name,
            format!(
                "exited with {}: {}",
                status,
                String::from_utf8_lossy(stderr).trim()
            ),
        ))
    }
}

impl Extension for ExternalExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_post_merge(&self) -> bool {
        true
    }

    fn supports_records(&self) -> bool {
        true
    }

    fn process(&self, path: &Path) -> Result<(), PluginError> {
        let output = Command::new(&self.executable)
            .arg("process")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PluginError::io(&self.name, e))?;
        self.check_status(output.status, &output.stderr)
    }

    fn process_record(&self, sequence: Sequence) -> Result<Sequence, PluginError> {
        let mut child = Command::new(&self.executable)
            .arg("process-record")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PluginError::io(&self.name, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&sequence.render())
                .map_err(|e| PluginError::io(&self.name, e))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|e| PluginError::io(&self.name, e))?;
        self.check_status(output.status, &output.stderr)?;

        let format = sequence.metadata.format;
        let lines: Vec<Vec<u8>> = output
            .stdout
            .split(|&b| b == b'\n')
            .map(|line| line.trim_ascii().to_vec())
            .take(format.lines_per_record())
            .collect();
        let rewritten = Sequence::from_lines(lines, format);
        if !rewritten.is_complete() || rewritten.id.is_empty() {
            return Err(PluginError::failed(
                &self.name,
                format!(
                    "expected {} output lines for record {}",
                    format.lines_per_record(),
                    sequence.id
                ),
            ));
        }
        Ok(rewritten)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_record_round_trip_through_executable() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(
            dir.path(),
            "lower",
            "[ \"$1\" = process-record ] || exit 3\ntr 'ACGT' 'acgt'",
        );
        let ext = ExternalExtension::new("lower", exe);
        let out = ext
            .process_record(Sequence::fastq("@r1", "ACGT", "IIII"))
            .unwrap();
        assert_eq!(out.data, b"acgt");
        assert_eq!(out.id, "@r1");
        assert_eq!(out.quality, b"IIII");
    }

    #[test]
    fn test_non_zero_exit_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(dir.path(), "fail", "echo nope >&2\nexit 1");
        let ext = ExternalExtension::new("fail", exe);
        let err = ext.process(&dir.path().join("out.fq")).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_truncated_record_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(dir.path(), "half", "head -n 2");
        let ext = ExternalExtension::new("half", exe);
        assert!(ext
            .process_record(Sequence::fastq("@r1", "ACGT", "IIII"))
            .is_err());
    }
}
