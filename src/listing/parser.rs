//! Listing line parsing.
//!
//! Archivers print their listings in many shapes, so field extraction is a
//! strategy supplied by each plugin through the [`LineParser`] trait. The
//! usual implementation is [`LinePattern`], a byte-oriented regular
//! expression with seven named groups:
//!
//! | group   | meaning                                   |
//! |---------|-------------------------------------------|
//! | `size`  | size in bytes, decimal                    |
//! | `perms` | symbolic permissions, kept verbatim       |
//! | `uid`   | owner id; may be empty                    |
//! | `gid`   | group id; may be empty                    |
//! | `date`  | date text, kept verbatim                  |
//! | `time`  | time text, kept verbatim                  |
//! | `fpath` | member path as the archiver expects it    |
//!
//! Lines that do not match are skipped by the caller; headers, footers and
//! blank lines are expected in archiver output.

use regex::bytes::{Captures, Regex};

use crate::error::{Error, Result};

/// Fields every listing pattern must capture.
pub const FIELDS: [&str; 7] = ["size", "perms", "uid", "gid", "date", "time", "fpath"];

/// One matched listing line, before defaults and name mapping are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub size: u64,
    pub perms: Vec<u8>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub date: Vec<u8>,
    pub time: Vec<u8>,
    pub fpath: Vec<u8>,
}

/// Extracts entry fields from one line of archiver output.
pub trait LineParser {
    /// Parse `line` (without its trailing newline), or `None` to skip it.
    fn parse_line(&self, line: &[u8]) -> Option<ParsedLine>;
}

/// Regex-driven [`LineParser`].
#[derive(Debug, Clone)]
pub struct LinePattern {
    regex: Regex,
}

impl LinePattern {
    /// `perms uid gid size date time path`, as printed by `ls -ln`-like tools.
    ///
    /// Exactly one blank separates the time from the path so that names
    /// starting with spaces keep them.
    pub const DEFAULT: &'static str = r"(?-u)^(?P<perms>[-a-zA-Z][-a-zA-Z]{9})\s+(?P<uid>\d*)\s+(?P<gid>\d*)\s+(?P<size>\d+)\s+(?P<date>\S+)\s+(?P<time>\d{1,2}:\d{2}(?::\d{2})?)\s(?P<fpath>.+)$";

    /// Compile `pattern`, checking that it names all of [`FIELDS`].
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        let names: Vec<&str> = regex.capture_names().flatten().collect();
        let missing: Vec<&str> = FIELDS
            .iter()
            .copied()
            .filter(|field| !names.contains(field))
            .collect();
        if !missing.is_empty() {
            return Err(Error::Pattern(format!(
                "missing named group(s): {}",
                missing.join(", ")
            )));
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for LinePattern {
    fn default() -> Self {
        Self::new(Self::DEFAULT).expect("default listing pattern is valid")
    }
}

impl LineParser for LinePattern {
    fn parse_line(&self, line: &[u8]) -> Option<ParsedLine> {
        let caps = self.regex.captures(line)?;
        Some(ParsedLine {
            size: number(&caps, "size")?,
            perms: field(&caps, "perms"),
            uid: number(&caps, "uid"),
            gid: number(&caps, "gid"),
            date: field(&caps, "date"),
            time: field(&caps, "time"),
            fpath: field(&caps, "fpath"),
        })
    }
}

fn field(caps: &Captures<'_>, name: &str) -> Vec<u8> {
    caps.name(name)
        .map(|m| m.as_bytes().to_vec())
        .unwrap_or_default()
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    let m = caps.name(name)?;
    std::str::from_utf8(m.as_bytes()).ok()?.parse().ok()
}
