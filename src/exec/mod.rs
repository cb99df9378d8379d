//! Invoking the external archiver.
//!
//! Every archive operation boils down to one call of the archiver executable:
//!
//! ```text
//! <executable> <flag> <archive> [src] [dst]
//! ```
//!
//! where `<flag>` is the single character the archiver uses for one of the
//! four logical commands (list, read, write, delete). The standard output is
//! captured as raw bytes; standard error is left attached to the terminal so
//! the archiver can report problems to the user directly.
//!
//! Process execution sits behind the [`ToolRunner`] trait so that the layers
//! above can be driven without spawning anything.

mod dispatch;
mod process;

pub use dispatch::{Dispatcher, build_args};
pub use process::ProcessRunner;

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Write};

use crate::error::Result;
use crate::listing::DirectoryEntry;
use crate::listing::entry::write_item;

/// Runs an external program and returns what it wrote to stdout.
pub trait ToolRunner {
    /// Run `program` with `args` to completion.
    ///
    /// Implementations must report a non-zero exit as
    /// [`Error::ToolFailed`](crate::Error::ToolFailed).
    fn run(&self, program: &OsStr, args: &[OsString]) -> Result<Vec<u8>>;
}

/// Logical archiver commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    List,
    Read,
    Write,
    Delete,
}

impl Command {
    pub const ALL: [Command; 4] = [Command::List, Command::Read, Command::Write, Command::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Read => "read",
            Command::Write => "write",
            Command::Delete => "delete",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes one entry in listing format.
pub type ItemFormatter = fn(&DirectoryEntry, &mut dyn Write) -> io::Result<()>;

/// How to talk to one archiver: its executable, the flag for each command
/// and the line format used when a plugin prints its own listing.
#[derive(Clone)]
pub struct CommandSpec {
    pub executable: OsString,
    list: char,
    read: char,
    write: char,
    delete: char,
    pub item_format: ItemFormatter,
}

impl CommandSpec {
    /// Spec with the conventional `l`, `r`, `w` and `d` flags.
    pub fn new(executable: impl Into<OsString>) -> Self {
        Self {
            executable: executable.into(),
            list: 'l',
            read: 'r',
            write: 'w',
            delete: 'd',
            item_format: write_item,
        }
    }

    /// Override the flag used for `command`.
    pub fn with_flag(mut self, command: Command, flag: char) -> Self {
        match command {
            Command::List => self.list = flag,
            Command::Read => self.read = flag,
            Command::Write => self.write = flag,
            Command::Delete => self.delete = flag,
        }
        self
    }

    pub fn with_item_format(mut self, format: ItemFormatter) -> Self {
        self.item_format = format;
        self
    }

    pub fn flag(&self, command: Command) -> char {
        match command {
            Command::List => self.list,
            Command::Read => self.read,
            Command::Write => self.write,
            Command::Delete => self.delete,
        }
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("executable", &self.executable)
            .field("list", &self.list)
            .field("read", &self.read)
            .field("write", &self.write)
            .field("delete", &self.delete)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags() {
        let spec = CommandSpec::new("lha");
        let flags: String = Command::ALL.iter().map(|c| spec.flag(*c)).collect();
        assert_eq!(flags, "lrwd");
    }

    #[test]
    fn overridden_flag_only_changes_one_command() {
        let spec = CommandSpec::new("unadf").with_flag(Command::Read, 'x');
        assert_eq!(spec.flag(Command::Read), 'x');
        assert_eq!(spec.flag(Command::List), 'l');
        assert_eq!(spec.flag(Command::Delete), 'd');
    }
}
