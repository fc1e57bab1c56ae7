//! Closed error taxonomy shared by every `mtag-*` crate.
//!
//! Mirrors the layering of `anni_flac::error::FlacError` /
//! `anni_workspace::WorkspaceError`: one `thiserror` enum per crate-family
//! concern, with `#[from]` conversions bridging lower layers into higher
//! ones so callers only ever match on [`MtagError`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Filesystem operation a [`MtagError::FileOperation`] failed during.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read,
    Write,
    Save,
    Stat,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileOp::Read => "read",
            FileOp::Write => "write",
            FileOp::Save => "save",
            FileOp::Stat => "stat",
        })
    }
}

/// Metadata direction a [`MtagError::Metadata`] failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOp {
    Read,
    Write,
}

impl fmt::Display for MetadataOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetadataOp::Read => "read",
            MetadataOp::Write => "write",
        })
    }
}

/// Audio files carry at least this many bytes of header before any tag
/// frame can be recognized; short buffers get a hint referencing it.
pub const MIN_HEADER_BYTES: u64 = 1024;

fn human_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.2} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.2} KiB", b / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn short_buffer_hint(bytes: u64) -> &'static str {
    if bytes < MIN_HEADER_BYTES {
        "; audio files carry at least one KiB of header"
    } else {
        ""
    }
}

/// The closed error-kind set of the engine.
#[derive(Error, Debug)]
pub enum MtagError {
    #[error("engine initialization failed: {message}")]
    Initialization { message: String },

    #[error("unrecognized or truncated container ({}){}{}", human_size(*size), detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default(), short_buffer_hint(*size))]
    InvalidFormat { size: u64, detail: Option<String> },

    #[error("operation requires one of {required:?}, found {found:?}")]
    UnsupportedFormat {
        required: Vec<&'static str>,
        found: Option<&'static str>,
    },

    #[error("failed to {op} {path}: {source}", path = path.display())]
    FileOperation {
        op: FileOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {op} metadata{}: {message}", field.as_ref().map(|f| format!(" field `{f}`")).unwrap_or_default())]
    Metadata {
        op: MetadataOp,
        field: Option<String>,
        message: String,
    },

    #[error("memory error ({}): {message}", human_size(*size))]
    Memory { size: u64, message: String },

    #[error("required host capability unavailable: {capability}")]
    Environment { capability: String },

    #[error("worker error: {message}")]
    Worker { message: String },

    #[error("sandbox error: {message}")]
    Sandbox { message: String },
}

impl MtagError {
    pub fn invalid_format(size: u64, detail: impl Into<Option<String>>) -> Self {
        MtagError::InvalidFormat {
            size,
            detail: detail.into(),
        }
    }

    pub fn file_op(op: FileOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MtagError::FileOperation {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn metadata_read(field: impl Into<Option<String>>, message: impl Into<String>) -> Self {
        MtagError::Metadata {
            op: MetadataOp::Read,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn metadata_write(field: impl Into<Option<String>>, message: impl Into<String>) -> Self {
        MtagError::Metadata {
            op: MetadataOp::Write,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_format(required: Vec<&'static str>, found: Option<&'static str>) -> Self {
        MtagError::UnsupportedFormat { required, found }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MtagError::Initialization { .. } => "Initialization",
            MtagError::InvalidFormat { .. } => "InvalidFormat",
            MtagError::UnsupportedFormat { .. } => "UnsupportedFormat",
            MtagError::FileOperation { .. } => "FileOperation",
            MtagError::Metadata { .. } => "Metadata",
            MtagError::Memory { .. } => "Memory",
            MtagError::Environment { .. } => "Environment",
            MtagError::Worker { .. } => "Worker",
            MtagError::Sandbox { .. } => "Sandbox",
        }
    }

    pub fn is_invalid_format(&self) -> bool {
        matches!(self, MtagError::InvalidFormat { .. })
    }

    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, MtagError::UnsupportedFormat { .. })
    }

    pub fn is_file_operation(&self, op: FileOp) -> bool {
        matches!(self, MtagError::FileOperation { op: o, .. } if *o == op)
    }

    pub fn is_metadata(&self, op: MetadataOp) -> bool {
        matches!(self, MtagError::Metadata { op: o, .. } if *o == op)
    }

    pub fn is_worker(&self) -> bool {
        matches!(self, MtagError::Worker { .. })
    }

    pub fn is_sandbox(&self) -> bool {
        matches!(self, MtagError::Sandbox { .. })
    }

    pub fn is_environment(&self) -> bool {
        matches!(self, MtagError::Environment { .. })
    }
}

pub type Result<T> = std::result::Result<T, MtagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_format_hints_short_buffers() {
        let err = MtagError::invalid_format(512, None);
        assert!(err.to_string().contains("at least one KiB"));
        assert!(err.is_invalid_format());
    }

    #[test]
    fn invalid_format_skips_hint_past_threshold() {
        let err = MtagError::invalid_format(4096, "bad magic".to_string());
        assert!(!err.to_string().contains("at least one KiB"));
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn kind_guards_match_only_their_variant() {
        let err = MtagError::Worker {
            message: "timed out".into(),
        };
        assert!(err.is_worker());
        assert!(!err.is_sandbox());
        assert_eq!(err.kind(), "Worker");
    }

    #[test]
    fn file_operation_guard_checks_the_specific_op() {
        let err = MtagError::file_op(
            FileOp::Read,
            "/nonexistent/file.mp3",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.is_file_operation(FileOp::Read));
        assert!(!err.is_file_operation(FileOp::Write));
    }
}
