//! Archive handles and the extfs operation set.
//!
//! Midnight Commander runs an extfs helper once per operation:
//!
//! ```text
//! helper list    ARCHIVE
//! helper copyout ARCHIVE STORED_NAME LOCAL_FILE
//! helper copyin  ARCHIVE STORED_NAME LOCAL_FILE
//! helper rm      ARCHIVE STORED_NAME
//! helper mkdir   ARCHIVE DIR
//! helper rmdir   ARCHIVE DIR
//! helper run     ARCHIVE STORED_NAME
//! ```
//!
//! Each run opens a fresh [`ArchiveHandle`], which lists the archive once,
//! and then calls one method of [`Archive`]. Plugins implement the methods
//! their archiver supports; the rest report "not supported".

mod generic;

pub use generic::GenericArchive;

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::config::Config;
use crate::error::Error;
use crate::exec::{Command, CommandSpec, Dispatcher, ProcessRunner, ToolRunner};
use crate::listing::names::bytes_to_os;
use crate::listing::{ArchiveSnapshot, LineParser};

/// Outcome of one extfs operation, reported to the host as the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// The plugin does not implement the operation.
    Unsupported,
    /// The operation ran but could not be completed, e.g. unknown member.
    Failure,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Unsupported | Status::Failure => 1,
        }
    }
}

/// Report that `operation` is not available and return [`Status::Unsupported`].
pub fn unsupported(operation: &str) -> Status {
    eprintln!("{operation}: not supported");
    Status::Unsupported
}

/// An opened archive: its path, one snapshot of its contents and the means
/// to run further archiver commands on it.
pub struct ArchiveHandle {
    dispatcher: Dispatcher,
    snapshot: ArchiveSnapshot,
    uid: u32,
    gid: u32,
    config: Option<Config>,
}

impl ArchiveHandle {
    /// Open `path` and list it with the archiver described by `spec`.
    pub fn open(
        path: impl AsRef<Path>,
        spec: CommandSpec,
        parser: &dyn LineParser,
    ) -> crate::Result<Self> {
        Self::open_with(path, spec, parser, Box::new(ProcessRunner))
    }

    /// Like [`open`](Self::open) but running the archiver through `runner`.
    pub fn open_with(
        path: impl AsRef<Path>,
        spec: CommandSpec,
        parser: &dyn LineParser,
        runner: Box<dyn ToolRunner>,
    ) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ArchiveNotFound(path.to_path_buf()));
        }

        let (uid, gid) = process_ids();
        let dispatcher = Dispatcher::new(spec, PathBuf::from(path), runner);
        let output = dispatcher.invoke(Command::List, None, None)?;
        let snapshot = ArchiveSnapshot::from_listing(&output, parser, uid, gid);
        debug!(archive = %path.display(), entries = snapshot.len(), "archive opened");

        Ok(Self {
            dispatcher,
            snapshot,
            uid,
            gid,
            config: None,
        })
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn path(&self) -> &Path {
        self.dispatcher.archive()
    }

    pub fn snapshot(&self) -> &ArchiveSnapshot {
        &self.snapshot
    }

    pub fn spec(&self) -> &CommandSpec {
        self.dispatcher.spec()
    }

    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn gid(&self) -> u32 {
        self.gid
    }

    /// Real archiver path for a name the host passed in.
    pub fn real_name(&self, display_name: &OsStr) -> Option<&[u8]> {
        self.snapshot.resolve_real_name_os(display_name)
    }

    /// Run an archiver command with optional positional arguments.
    pub fn invoke(
        &self,
        command: Command,
        src: Option<&OsStr>,
        dst: Option<&OsStr>,
    ) -> crate::Result<Vec<u8>> {
        self.dispatcher.invoke(command, src, dst)
    }

    /// Run `command` on the member shown as `display_name`.
    ///
    /// Returns `Ok(None)` when no member has that name.
    pub fn invoke_on_member(
        &self,
        command: Command,
        display_name: &OsStr,
        extra: Option<&OsStr>,
    ) -> crate::Result<Option<Vec<u8>>> {
        let Some(real) = self.real_name(display_name) else {
            return Ok(None);
        };
        let real = bytes_to_os(real);
        self.invoke(command, Some(&real), extra).map(Some)
    }

    /// Write the snapshot in extfs listing format.
    pub fn write_listing(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let format = self.spec().item_format;
        for entry in &self.snapshot {
            format(entry, out)?;
        }
        out.flush()
    }
}

/// The extfs operations of one plugin.
///
/// Only [`open`](Archive::open) and [`handle`](Archive::handle) are
/// required. `list` prints the snapshot; every other operation reports
/// [`Status::Unsupported`] unless the plugin overrides it.
pub trait Archive: Sized {
    /// Plugin name; its lower-cased form names the config section.
    const NAME: &'static str;

    /// Config options the plugin reads.
    const CONFIG_KEYS: &'static [&'static str] = &[];

    /// Open the archive at `path`.
    fn open(path: &Path, config: Config) -> Result<Self>;

    fn handle(&self) -> &ArchiveHandle;

    /// Print the archive contents.
    fn list(&self, out: &mut dyn Write) -> Result<Status> {
        self.handle().write_listing(out)?;
        Ok(Status::Success)
    }

    /// Extract `stored` into the local file `dst`.
    fn copy_out(&self, stored: &OsStr, dst: &Path) -> Result<Status> {
        let _ = (stored, dst);
        Ok(unsupported("copyout"))
    }

    /// Store the local file `src` as `stored`.
    fn copy_in(&self, stored: &OsStr, src: &Path) -> Result<Status> {
        let _ = (stored, src);
        Ok(unsupported("copyin"))
    }

    /// Delete `stored` from the archive.
    fn remove(&self, stored: &OsStr) -> Result<Status> {
        let _ = stored;
        Ok(unsupported("rm"))
    }

    fn make_dir(&self, dir: &OsStr) -> Result<Status> {
        let _ = dir;
        Ok(unsupported("mkdir"))
    }

    fn remove_dir(&self, dir: &OsStr) -> Result<Status> {
        let _ = dir;
        Ok(unsupported("rmdir"))
    }

    /// Execute `stored` from the archive.
    fn run(&self, stored: &OsStr) -> Result<Status> {
        let _ = stored;
        Ok(unsupported("run"))
    }
}

/// Real user and group id of this process.
pub fn process_ids() -> (u32, u32) {
    #[cfg(unix)]
    {
        // SAFETY: getuid/getgid take no arguments and cannot fail.
        unsafe { (libc::getuid() as u32, libc::getgid() as u32) }
    }

    #[cfg(not(unix))]
    {
        (0, 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::listing::LinePattern;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::ffi::OsString;
    use std::rc::Rc;

    /// Replays canned archiver output and records every call.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedRunner {
        pub calls: Rc<RefCell<Vec<Vec<OsString>>>>,
        replies: Rc<RefCell<VecDeque<crate::Result<Vec<u8>>>>>,
    }

    impl ScriptedRunner {
        pub fn reply(self, output: &[u8]) -> Self {
            self.replies.borrow_mut().push_back(Ok(output.to_vec()));
            self
        }

        pub fn fail(self, code: i32) -> Self {
            self.replies.borrow_mut().push_back(Err(Error::ToolFailed {
                program: OsString::from("fake"),
                code: Some(code),
            }));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl ToolRunner for ScriptedRunner {
        fn run(&self, _program: &OsStr, args: &[OsString]) -> crate::Result<Vec<u8>> {
            self.calls.borrow_mut().push(args.to_vec());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// A plugin overriding nothing.
    struct Bare(ArchiveHandle);

    impl Archive for Bare {
        const NAME: &'static str = "Bare";

        fn open(_path: &Path, _config: Config) -> Result<Self> {
            unreachable!("tests build the handle directly")
        }

        fn handle(&self) -> &ArchiveHandle {
            &self.0
        }
    }

    fn archive_file() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    fn open(runner: &ScriptedRunner, path: &Path) -> crate::Result<ArchiveHandle> {
        ArchiveHandle::open_with(
            path,
            CommandSpec::new("fake"),
            &LinePattern::default(),
            Box::new(runner.clone()),
        )
    }

    #[test]
    fn missing_archive_fails_before_spawning() {
        let runner = ScriptedRunner::default();
        let dir = tempfile::tempdir().unwrap();
        let err = open(&runner, &dir.path().join("nope.arc")).err().unwrap();
        assert!(matches!(err, Error::ArchiveNotFound(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn open_lists_once() {
        let file = archive_file();
        let runner = ScriptedRunner::default()
            .reply(b"-rw-r--r-- 1000 1000     123 2023-10-22 10:00 foo.txt\n");
        let handle = open(&runner, file.path()).unwrap();

        assert_eq!(handle.snapshot().len(), 1);
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], [OsString::from("l"), file.path().as_os_str().to_os_string()]);
    }

    #[test]
    fn open_propagates_listing_failure() {
        let file = archive_file();
        let runner = ScriptedRunner::default().fail(2);
        let err = open(&runner, file.path()).err().unwrap();
        assert!(matches!(err, Error::ToolFailed { code: Some(2), .. }));
    }

    #[test]
    fn empty_listing_lists_successfully() {
        let file = archive_file();
        let runner = ScriptedRunner::default().reply(b"");
        let bare = Bare(open(&runner, file.path()).unwrap());

        let mut out = Vec::new();
        assert_eq!(bare.list(&mut out).unwrap(), Status::Success);
        assert!(out.is_empty());
    }

    #[test]
    fn default_list_prints_item_lines() {
        let file = archive_file();
        let runner = ScriptedRunner::default()
            .reply(b"-rw-r--r-- 1000 1000     123 2023-10-22 10:00  foo.txt\n");
        let bare = Bare(open(&runner, file.path()).unwrap());

        let mut out = Vec::new();
        bare.list(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-rw-r--r--   1 1000     1000          123 2023-10-22 10:00 ~foo.txt\n"
        );
    }

    #[test]
    fn unsupported_operations_spawn_nothing() {
        let file = archive_file();
        let runner = ScriptedRunner::default().reply(b"");
        let bare = Bare(open(&runner, file.path()).unwrap());
        let name = OsStr::new("x");

        let statuses = [
            bare.copy_in(name, Path::new("/tmp/x")).unwrap(),
            bare.copy_out(name, Path::new("/tmp/x")).unwrap(),
            bare.remove(name).unwrap(),
            bare.make_dir(name).unwrap(),
            bare.remove_dir(name).unwrap(),
            bare.run(name).unwrap(),
        ];
        for status in statuses {
            assert_eq!(status, Status::Unsupported);
            assert_ne!(status.code(), 0);
        }
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn invoke_on_member_uses_real_name() {
        let file = archive_file();
        let runner = ScriptedRunner::default()
            .reply(b"-rw-r--r-- 0 0 1 2023-10-22 10:00  a b\n")
            .reply(b"");
        let handle = open(&runner, file.path()).unwrap();

        let out = handle
            .invoke_on_member(Command::Delete, OsStr::new("~a b"), None)
            .unwrap();
        assert_eq!(out, Some(Vec::new()));
        assert_eq!(runner.calls.borrow()[1][2], OsString::from(" a b"));

        let missing = handle
            .invoke_on_member(Command::Delete, OsStr::new("zzz"), None)
            .unwrap();
        assert_eq!(missing, None);
        assert_eq!(runner.call_count(), 2);
    }

    #[test]
    fn config_is_attached() {
        let file = archive_file();
        let runner = ScriptedRunner::default();
        let handle = open(&runner, file.path())
            .unwrap()
            .with_config(Config::default());
        assert!(handle.config().is_some());
    }
}
