use std::fmt;
use std::io;
use std::path::PathBuf;

/// A source of audio-file bytes, tagged by how it should be read rather
/// than duck-typed: a filesystem path, an in-memory buffer, or a streamed
/// source with optional seek support and a known or unknown size.
pub enum Input {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Stream(Box<dyn StreamSource>),
}

impl Input {
    pub fn path(p: impl Into<PathBuf>) -> Self {
        Input::Path(p.into())
    }

    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Input::Bytes(b.into())
    }

    pub fn as_path(&self) -> Option<&std::path::Path> {
        match self {
            Input::Path(p) => Some(p.as_path()),
            _ => None,
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Path(p) => write!(f, "Input::Path({})", p.display()),
            Input::Bytes(b) => write!(f, "Input::Bytes({} bytes)", b.len()),
            Input::Stream(_) => write!(f, "Input::Stream(..)"),
        }
    }
}

/// A streamed byte source with a known (or unknown) total size. Sources
/// without seek support (network streams, a non-seekable stdin pipe) must
/// return `false` from `supports_seek`; the loader falls back to a full
/// read for them rather than refusing outright.
pub trait StreamSource: Send {
    fn size(&self) -> Option<u64>;
    fn supports_seek(&self) -> bool;
    fn read_all(&mut self) -> io::Result<Vec<u8>>;
    /// Reads exactly `len` bytes starting at `offset`. Only called when
    /// `supports_seek()` is true.
    fn read_range(&mut self, offset: u64, len: u64) -> io::Result<Vec<u8>>;
}
