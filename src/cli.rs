use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::archive::{Archive, Status};
use crate::config::Config;

/// Environment variable holding the log filter, e.g. `EXTFS_LOG=debug`.
pub const LOG_ENV: &str = "EXTFS_LOG";

#[derive(Parser, Debug)]
#[command(version)]
#[command(about = "Midnight Commander extfs helper", long_about = None)]
#[command(after_help = "Examples:\n  \
  helper list foo.arc                          print contents of foo.arc\n  \
  helper copyout foo.arc dir/a.txt /tmp/a.txt  extract dir/a.txt\n  \
  helper copyin foo.arc dir/b.txt ./b.txt      store ./b.txt as dir/b.txt")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Verb,
}

#[derive(Subcommand, Debug)]
pub enum Verb {
    /// List contents of archive
    #[command(disable_help_flag = true, disable_version_flag = true)]
    List {
        /// Archive filename
        #[arg(allow_hyphen_values = true)]
        archive: PathBuf,
    },

    /// Copy file into archive
    #[command(disable_help_flag = true, disable_version_flag = true)]
    Copyin {
        /// Archive filename
        #[arg(allow_hyphen_values = true)]
        archive: PathBuf,
        /// Name to store the file under
        #[arg(allow_hyphen_values = true)]
        stored: OsString,
        /// Local file to read
        #[arg(allow_hyphen_values = true)]
        src: PathBuf,
    },

    /// Copy file out of archive
    #[command(disable_help_flag = true, disable_version_flag = true)]
    Copyout {
        /// Archive filename
        #[arg(allow_hyphen_values = true)]
        archive: PathBuf,
        /// File inside the archive
        #[arg(allow_hyphen_values = true)]
        stored: OsString,
        /// Local file to write
        #[arg(allow_hyphen_values = true)]
        dst: PathBuf,
    },

    /// Delete file from archive
    #[command(disable_help_flag = true, disable_version_flag = true)]
    Rm {
        /// Archive filename
        #[arg(allow_hyphen_values = true)]
        archive: PathBuf,
        /// File inside the archive
        #[arg(allow_hyphen_values = true)]
        target: OsString,
    },

    /// Create directory in archive
    #[command(disable_help_flag = true, disable_version_flag = true)]
    Mkdir {
        /// Archive filename
        #[arg(allow_hyphen_values = true)]
        archive: PathBuf,
        /// Directory inside the archive
        #[arg(allow_hyphen_values = true)]
        target: OsString,
    },

    /// Remove directory from archive
    #[command(disable_help_flag = true, disable_version_flag = true)]
    Rmdir {
        /// Archive filename
        #[arg(allow_hyphen_values = true)]
        archive: PathBuf,
        /// Directory inside the archive
        #[arg(allow_hyphen_values = true)]
        target: OsString,
    },

    /// Execute archived file
    #[command(disable_help_flag = true, disable_version_flag = true)]
    Run {
        /// Archive filename
        #[arg(allow_hyphen_values = true)]
        archive: PathBuf,
        /// File inside the archive
        #[arg(allow_hyphen_values = true)]
        target: OsString,
    },
}

impl Verb {
    pub fn archive(&self) -> &Path {
        match self {
            Verb::List { archive }
            | Verb::Copyin { archive, .. }
            | Verb::Copyout { archive, .. }
            | Verb::Rm { archive, .. }
            | Verb::Mkdir { archive, .. }
            | Verb::Rmdir { archive, .. }
            | Verb::Run { archive, .. } => archive,
        }
    }
}

/// Open the archive named on the command line and perform the verb,
/// writing listings to `out`.
pub fn execute<A: Archive>(verb: &Verb, config: Config, out: &mut dyn Write) -> Result<Status> {
    let archive = A::open(verb.archive(), config)?;

    match verb {
        Verb::List { .. } => archive.list(out),
        Verb::Copyin { stored, src, .. } => archive.copy_in(stored, src),
        Verb::Copyout { stored, dst, .. } => archive.copy_out(stored, dst),
        Verb::Rm { target, .. } => archive.remove(target),
        Verb::Mkdir { target, .. } => archive.make_dir(target),
        Verb::Rmdir { target, .. } => archive.remove_dir(target),
        Verb::Run { target, .. } => archive.run(target),
    }
}

/// Send log output to stderr; stdout carries the listing.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point for a plugin binary.
///
/// Usage errors exit with status 2 (printed by clap). Unsupported
/// operations and every failure, including the archiver exiting
/// unsuccessfully, exit with status 1.
pub fn run<A: Archive>() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let config = Config::load(A::NAME, A::CONFIG_KEYS);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match execute::<A>(&cli.command, config, &mut out) {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_every_verb() {
        let cases: [&[&str]; 7] = [
            &["h", "list", "a.arc"],
            &["h", "copyin", "a.arc", "in/name", "local"],
            &["h", "copyout", "a.arc", "in/name", "local"],
            &["h", "rm", "a.arc", "x"],
            &["h", "mkdir", "a.arc", "x"],
            &["h", "rmdir", "a.arc", "x"],
            &["h", "run", "a.arc", "x"],
        ];
        for args in cases {
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.command.archive(), Path::new("a.arc"));
        }
    }

    #[test]
    fn copyin_keeps_stored_name_first() {
        let cli = Cli::try_parse_from(["h", "copyin", "a.arc", "in/name", "local"]).unwrap();
        match cli.command {
            Verb::Copyin { stored, src, .. } => {
                assert_eq!(stored, "in/name");
                assert_eq!(src, PathBuf::from("local"));
            }
            other => panic!("unexpected verb {other:?}"),
        }
    }

    #[test]
    fn wrong_arity_is_a_usage_error() {
        for args in [
            &["h"][..],
            &["h", "list"],
            &["h", "rm", "a.arc"],
            &["h", "copyout", "a.arc", "x"],
            &["h", "explode", "a.arc"],
        ] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_ne!(err.kind(), ErrorKind::DisplayHelp);
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn member_names_may_start_with_dashes() {
        let cli = Cli::try_parse_from(["h", "rm", "a.arc", "-readme"]).unwrap();
        match cli.command {
            Verb::Rm { target, .. } => assert_eq!(target, "-readme"),
            other => panic!("unexpected verb {other:?}"),
        }

        let cli = Cli::try_parse_from(["h", "copyout", "a.arc", "-readme", "-out"]).unwrap();
        match cli.command {
            Verb::Copyout { stored, dst, .. } => {
                assert_eq!(stored, "-readme");
                assert_eq!(dst, PathBuf::from("-out"));
            }
            other => panic!("unexpected verb {other:?}"),
        }
    }

    #[test]
    fn help_and_version_names_reach_the_plugin() {
        for name in ["--help", "-h", "--version", "-V"] {
            let cli = Cli::try_parse_from(["h", "run", "a.arc", name]).unwrap();
            match cli.command {
                Verb::Run { target, .. } => assert_eq!(target, name),
                other => panic!("unexpected verb {other:?}"),
            }
        }
        let cli = Cli::try_parse_from(["h", "copyin", "a.arc", "--help", "-h"]).unwrap();
        assert!(matches!(cli.command, Verb::Copyin { .. }));
    }
}
