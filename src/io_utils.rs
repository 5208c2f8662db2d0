//! CLI-facing error wrapping and path derivation for the binaries.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.msg.fmt(f)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Format a user friendly I/O error message with suggestions.
pub fn format_io_error(operation: &str, path: &Path, err: &io::Error) -> String {
    use io::ErrorKind::*;
    let suggestion = match err.kind() {
        NotFound => "Check that the file exists and the path is correct.",
        PermissionDenied => "Check permissions or run as a different user.",
        UnexpectedEof => "File appears truncated or corrupted.",
        WriteZero => "Disk may be full. Free up space and try again.",
        _ => "Check permissions or free up disk space.",
    };
    format!(
        "Error {} '{}': {}. {}",
        operation,
        path.display(),
        err,
        suggestion
    )
}

/// Convert an I/O error into a CLI error with context.
pub fn io_cli_error(operation: &str, path: &Path, err: io::Error) -> CliError {
    CliError {
        msg: format_io_error(operation, path, &err),
        source: Some(Box::new(err)),
    }
}

/// Simple CLI error from string.
pub fn simple_cli_error(msg: &str) -> CliError {
    CliError {
        msg: msg.to_string(),
        source: None,
    }
}

/// Invalid file extension error.
pub fn extension_error(path: &Path) -> CliError {
    CliError {
        msg: format!(
            "Invalid file extension for '{}'. Expected .hf. Check the input file.",
            path.display()
        ),
        source: None,
    }
}

/// Convert an Arbor library error into a CLI error with a hint.
pub fn arbor_cli_error(context: &str, err: crate::ArborError) -> CliError {
    CliError {
        msg: format!("{}: {}", context, cli_hint(&err)),
        source: Some(Box::new(err)),
    }
}

/// Return an actionable hint for an Arbor error variant.
pub fn cli_hint(err: &crate::ArborError) -> String {
    use crate::ArborError::*;
    match err {
        CorruptTree(msg) => format!("{msg}. Rebuild the .tree file from the source data."),
        Io(io) => format!("{io}"),
        Internal(msg) => format!("{msg}. This is a bug."),
    }
}

/// Where the `.tree` artifact for an input lives: the input path with its
/// final extension replaced by `.tree`.
pub fn tree_path(input: &Path) -> PathBuf {
    input.with_extension("tree")
}

/// Default compressed output: the input path with `.hf` appended.
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".hf");
    PathBuf::from(name)
}

/// The `.tree` artifact a compressed file decodes with by default: strip
/// the `.hf` suffix back off, then derive as for the source file.
pub fn tree_path_for_compressed(input: &Path) -> PathBuf {
    tree_path(&input.with_extension(""))
}
