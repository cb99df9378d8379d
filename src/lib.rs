//! # extfs-archive
//!
//! Building blocks for Midnight Commander extfs helpers that wrap an
//! external archiver.
//!
//! A helper is run once per operation. It opens the archive, which runs the
//! archiver's list command and parses the output into an
//! [`ArchiveSnapshot`], then performs one operation by calling the archiver
//! again with the right flag and member names.
//!
//! ## Features
//!
//! - Pluggable listing parsers, with a regex-based [`LinePattern`]
//! - Member names handled as raw bytes, never assumed to be UTF-8
//! - Workaround for extfs dropping leading spaces from file names
//! - Optional per-plugin settings from `~/.config/mc/ini`
//! - A ready-made command line via [`cli::run`]
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::process::ExitCode;
//!
//! use extfs_archive::{Archive, ArchiveHandle, CommandSpec, Config, LinePattern, cli};
//!
//! /// Read-only plugin: listing works, everything else reports "not supported".
//! struct Uarc(ArchiveHandle);
//!
//! impl Archive for Uarc {
//!     const NAME: &'static str = "UArc";
//!
//!     fn open(path: &Path, _config: Config) -> anyhow::Result<Self> {
//!         let handle = ArchiveHandle::open(path, CommandSpec::new("unarc"), &LinePattern::default())?;
//!         Ok(Self(handle))
//!     }
//!
//!     fn handle(&self) -> &ArchiveHandle {
//!         &self.0
//!     }
//! }
//!
//! fn main() -> ExitCode {
//!     cli::run::<Uarc>()
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod listing;

pub use archive::{Archive, ArchiveHandle, GenericArchive, Status};
pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};
pub use exec::{Command, CommandSpec, Dispatcher, ProcessRunner, ToolRunner};
pub use listing::{ArchiveSnapshot, DirectoryEntry, LineParser, LinePattern, map_name};
