use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the archive protocol layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No such file or directory `{}'", .0.display())]
    ArchiveNotFound(PathBuf),

    #[error("failed to start `{}': {source}", program.to_string_lossy())]
    Spawn {
        program: OsString,
        #[source]
        source: std::io::Error,
    },

    /// The archiver ran but exited unsuccessfully. `code` is `None` when it
    /// was killed by a signal.
    #[error("`{}' exited with {}", program.to_string_lossy(), describe_code(*code))]
    ToolFailed { program: OsString, code: Option<i32> },

    #[error("invalid listing pattern: {0}")]
    Pattern(String),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error("option `{key}' has invalid {kind} value `{value}'")]
    Config {
        key: String,
        value: String,
        kind: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;
