use std::collections::HashSet;
use std::ffi::OsStr;

use tracing::{debug, trace, warn};

use super::entry::DirectoryEntry;
use super::names::os_to_bytes;
use super::parser::LineParser;

/// The contents of an archive as listed once at open time.
///
/// Entries keep the archiver's order. The snapshot is never refreshed;
/// reopen the archive to observe changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSnapshot {
    entries: Vec<DirectoryEntry>,
}

impl ArchiveSnapshot {
    /// Build a snapshot from raw listing output.
    ///
    /// Lines the parser rejects are skipped. `uid`/`gid` fill in ids the
    /// archiver does not report. When two members map to the same display
    /// name only the first is kept.
    pub fn from_listing(output: &[u8], parser: &dyn LineParser, uid: u32, gid: u32) -> Self {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for line in output.split(|b| *b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            let Some(parsed) = parser.parse_line(line) else {
                if !line.is_empty() {
                    trace!(line = %String::from_utf8_lossy(line), "skipping listing line");
                }
                continue;
            };

            let entry = DirectoryEntry::from_parsed(parsed, uid, gid);
            if !seen.insert(entry.display_name.clone()) {
                warn!(
                    name = %entry.display_name_lossy(),
                    "duplicate display name in listing, keeping the first entry"
                );
                continue;
            }
            entries.push(entry);
        }

        debug!(entries = entries.len(), "archive snapshot built");
        Self { entries }
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DirectoryEntry> {
        self.entries.iter()
    }

    /// Entry whose display name is `display_name`.
    pub fn find(&self, display_name: &[u8]) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.display_name == display_name)
    }

    /// Real archiver path for a name shown to the host.
    pub fn resolve_real_name(&self, display_name: &[u8]) -> Option<&[u8]> {
        self.find(display_name).map(|entry| entry.real_path.as_slice())
    }

    /// [`resolve_real_name`](Self::resolve_real_name) for a name received as
    /// an OS string, e.g. a command-line argument.
    pub fn resolve_real_name_os(&self, display_name: &OsStr) -> Option<&[u8]> {
        self.resolve_real_name(&os_to_bytes(display_name))
    }
}

impl<'a> IntoIterator for &'a ArchiveSnapshot {
    type Item = &'a DirectoryEntry;
    type IntoIter = std::slice::Iter<'a, DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
