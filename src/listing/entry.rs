use std::borrow::Cow;
use std::io::{self, Write};

use super::names::map_name;
use super::parser::ParsedLine;

/// One member of an archive listing.
///
/// Text fields hold raw bytes exactly as the archiver printed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub size: u64,
    pub perms: Vec<u8>,
    pub uid: u32,
    pub gid: u32,
    pub date: Vec<u8>,
    pub time: Vec<u8>,
    /// Path to hand back to the archiver.
    pub real_path: Vec<u8>,
    /// Path shown to (and received from) the host.
    pub display_name: Vec<u8>,
}

impl DirectoryEntry {
    /// Complete a parsed line, falling back to `uid`/`gid` for missing ids.
    pub fn from_parsed(line: ParsedLine, uid: u32, gid: u32) -> Self {
        let display_name = map_name(&line.fpath).into_owned();
        Self {
            size: line.size,
            perms: line.perms,
            uid: line.uid.unwrap_or(uid),
            gid: line.gid.unwrap_or(gid),
            date: line.date,
            time: line.time,
            real_path: line.fpath,
            display_name,
        }
    }

    pub fn display_name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.display_name)
    }
}

/// Write `entry` as one extfs listing line.
///
/// ```text
/// <perms>   1 <uid:<8> <gid:<8> <size:>8> <date> <time> <display name>
/// ```
pub fn write_item(entry: &DirectoryEntry, out: &mut dyn Write) -> io::Result<()> {
    out.write_all(&entry.perms)?;
    write!(out, "   1 {:<8} {:<8} {:>8} ", entry.uid, entry.gid, entry.size)?;
    out.write_all(&entry.date)?;
    out.write_all(b" ")?;
    out.write_all(&entry.time)?;
    out.write_all(b" ")?;
    out.write_all(&entry.display_name)?;
    out.write_all(b"\n")
}
