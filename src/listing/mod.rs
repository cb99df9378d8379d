//! Archive listings.
//!
//! This module turns the archiver's listing output into a [`ArchiveSnapshot`]
//! and back into the line format Midnight Commander's extfs expects.
//!
//! ## Architecture
//!
//! - [`parser`]: per-line field extraction ([`LineParser`], [`LinePattern`])
//! - [`names`]: display-name mapping and byte/OS-string conversions
//! - [`snapshot`]: the ordered, immutable set of entries of one archive
//! - [`entry`]: the entry type and the extfs item-line writer
//!
//! ## Names are bytes
//!
//! Archive member names are kept as raw bytes from end to end. They are only
//! turned into OS strings at the process boundary, which is lossless on Unix.

pub mod entry;
pub mod names;
pub mod parser;
pub mod snapshot;

pub use entry::DirectoryEntry;
pub use names::{map_name, map_name_str};
pub use parser::{LineParser, LinePattern, ParsedLine};
pub use snapshot::ArchiveSnapshot;
