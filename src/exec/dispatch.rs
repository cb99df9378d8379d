use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Command, CommandSpec, ToolRunner};
use crate::error::Result;

/// Build the argument vector (without the program name) for one archiver call.
///
/// Positional arguments follow the archive path: both `src` and `dst` when
/// both are given, otherwise whichever one is present.
pub fn build_args(
    spec: &CommandSpec,
    command: Command,
    archive: &Path,
    src: Option<&OsStr>,
    dst: Option<&OsStr>,
) -> Vec<OsString> {
    let mut args = Vec::with_capacity(4);
    args.push(OsString::from(spec.flag(command).to_string()));
    args.push(archive.as_os_str().to_os_string());
    args.extend(src.into_iter().chain(dst).map(OsStr::to_os_string));
    args
}

/// Issues archiver commands against one archive file.
pub struct Dispatcher {
    spec: CommandSpec,
    archive: PathBuf,
    runner: Box<dyn ToolRunner>,
}

impl Dispatcher {
    pub fn new(spec: CommandSpec, archive: PathBuf, runner: Box<dyn ToolRunner>) -> Self {
        Self {
            spec,
            archive,
            runner,
        }
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// Run `command` and return the archiver's raw stdout.
    pub fn invoke(
        &self,
        command: Command,
        src: Option<&OsStr>,
        dst: Option<&OsStr>,
    ) -> Result<Vec<u8>> {
        let args = build_args(&self.spec, command, &self.archive, src, dst);
        debug!(%command, program = ?self.spec.executable, ?args, "invoking archiver");
        self.runner.run(&self.spec.executable, &args)
    }
}
