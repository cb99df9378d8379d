use std::ffi::{OsStr, OsString};
use std::process::{Command, Stdio};

use tracing::debug;

use super::ToolRunner;
use crate::error::{Error, Result};

/// Runs the archiver as a child process.
///
/// Stdin and stderr are inherited from the plugin process; stdout is
/// collected and returned once the child exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, program: &OsStr, args: &[OsString]) -> Result<Vec<u8>> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .stdout(Stdio::piped())
            .output()
            .map_err(|source| Error::Spawn {
                program: program.to_os_string(),
                source,
            })?;

        debug!(status = ?output.status, bytes = output.stdout.len(), "archiver finished");

        if !output.status.success() {
            return Err(Error::ToolFailed {
                program: program.to_os_string(),
                code: output.status.code(),
            });
        }
        Ok(output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Result<Vec<u8>> {
        ProcessRunner.run(
            OsStr::new("/bin/sh"),
            &[OsString::from("-c"), OsString::from(script)],
        )
    }

    #[test]
    fn captures_stdout_bytes() {
        let out = sh(r"printf 'a\377b\n'").unwrap();
        assert_eq!(out, b"a\xffb\n");
    }

    #[test]
    fn empty_output_is_ok() {
        assert!(sh("true").unwrap().is_empty());
    }

    #[test]
    fn non_zero_exit_is_tool_failure() {
        match sh("exit 3") {
            Err(Error::ToolFailed { code, .. }) => assert_eq!(code, Some(3)),
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = ProcessRunner
            .run(OsStr::new("/nonexistent/extfs-archiver"), &[])
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
