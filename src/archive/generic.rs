use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{Archive, ArchiveHandle, Status};
use crate::config::Config;
use crate::exec::{Command, CommandSpec, ProcessRunner, ToolRunner};
use crate::listing::LinePattern;
use crate::listing::names::bytes_to_os;

/// Archiver used when the configuration names none.
pub const DEFAULT_ARCHIVER: &str = "archiver_name";

/// Plugin for any archiver following the `l`/`r`/`w`/`d` convention.
///
/// Settings, from the `[generic]` section of the host ini file:
///
/// - `archiver`: executable to run
/// - `pattern`: listing regex overriding [`LinePattern::DEFAULT`]
///
/// Directories cannot be created or removed explicitly.
pub struct GenericArchive {
    handle: ArchiveHandle,
}

impl GenericArchive {
    pub fn open_with(path: &Path, config: Config, runner: Box<dyn ToolRunner>) -> Result<Self> {
        let executable = config.get("archiver").unwrap_or(DEFAULT_ARCHIVER).to_string();
        let pattern = match config.get("pattern") {
            Some(pattern) => LinePattern::new(pattern).context("invalid `pattern' option")?,
            None => LinePattern::default(),
        };

        let handle = ArchiveHandle::open_with(path, CommandSpec::new(executable), &pattern, runner)?
            .with_config(config);
        Ok(Self { handle })
    }
}

fn not_found(stored: &OsStr) -> Status {
    eprintln!("{}: no such file in archive", stored.to_string_lossy());
    Status::Failure
}

impl Archive for GenericArchive {
    const NAME: &'static str = "Generic";
    const CONFIG_KEYS: &'static [&'static str] = &["archiver", "pattern"];

    fn open(path: &Path, config: Config) -> Result<Self> {
        Self::open_with(path, config, Box::new(ProcessRunner))
    }

    fn handle(&self) -> &ArchiveHandle {
        &self.handle
    }

    fn copy_out(&self, stored: &OsStr, dst: &Path) -> Result<Status> {
        let done = self
            .handle
            .invoke_on_member(Command::Read, stored, Some(dst.as_os_str()))?;
        Ok(done.map_or_else(|| not_found(stored), |_| Status::Success))
    }

    fn copy_in(&self, stored: &OsStr, src: &Path) -> Result<Status> {
        // Replacing an existing member must address its real name.
        let target = match self.handle.real_name(stored) {
            Some(real) => bytes_to_os(real),
            None => stored.to_os_string(),
        };
        self.handle
            .invoke(Command::Write, Some(src.as_os_str()), Some(&target))?;
        Ok(Status::Success)
    }

    fn remove(&self, stored: &OsStr) -> Result<Status> {
        let done = self.handle.invoke_on_member(Command::Delete, stored, None)?;
        Ok(done.map_or_else(|| not_found(stored), |_| Status::Success))
    }

    fn run(&self, stored: &OsStr) -> Result<Status> {
        let Some(real) = self.handle.real_name(stored) else {
            return Ok(not_found(stored));
        };
        let real = bytes_to_os(real);

        let dir = tempfile::tempdir().context("failed to create temporary directory")?;
        let file_name = Path::new(&real)
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| "extfs-run".into());
        let local = dir.path().join(file_name);

        self.handle
            .invoke(Command::Read, Some(&real), Some(local.as_os_str()))?;
        make_executable(&local)?;

        info!(path = %local.display(), "running extracted member");
        let status = std::process::Command::new(&local)
            .status()
            .with_context(|| format!("failed to execute {}", local.display()))?;
        Ok(if status.success() {
            Status::Success
        } else {
            Status::Failure
        })
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("archiver did not extract {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o700);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<()> {
    std::fs::metadata(path)
        .with_context(|| format!("archiver did not extract {}", path.display()))?;
    Ok(())
}
