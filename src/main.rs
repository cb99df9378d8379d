//! Extfs helper for archivers following the `l`/`r`/`w`/`d` convention.
//!
//! The archiver executable and listing pattern are read from the `[generic]`
//! section of Midnight Commander's ini file.

use std::process::ExitCode;

use extfs_archive::{GenericArchive, cli};

fn main() -> ExitCode {
    cli::run::<GenericArchive>()
}
