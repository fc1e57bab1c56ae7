use crate::input::{Input, StreamSource};
use mtag_error::{FileOp, MtagError};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

/// Options controlling a [`load`] call.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub partial: bool,
    pub max_header: u32,
    pub max_footer: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            partial: false,
            max_header: 1_048_576,
            max_footer: 131_072,
        }
    }
}

/// A handle the audio-file object keeps around to re-materialize the full
/// bytes later, if it was opened partially and later needs promotion to a
/// full load before `save_to_file`.
#[derive(Debug, Clone)]
pub enum OriginalSource {
    Path(PathBuf),
}

pub struct LoadedBytes {
    pub bytes: Vec<u8>,
    pub is_partial: bool,
    pub original: Option<OriginalSource>,
}

/// Loads bytes for `input` according to `opts`.
///
/// - `partial = false`: always a full read.
/// - `partial = true` over a path: stats the file; if it is larger than
///   `max_header + max_footer`, reads `[0, max_header)` and
///   `[size - max_footer, size)` and concatenates them, faithfully (no
///   padding) so format autodetection and trailer tags still line up at
///   their real offsets.
/// - `partial = true` over a stream: same strategy if the stream knows
///   its size and supports seeking; otherwise falls back to a full read.
pub fn load(input: &mut Input, opts: &LoadOptions) -> Result<LoadedBytes, MtagError> {
    match input {
        Input::Bytes(b) => Ok(LoadedBytes {
            bytes: b.clone(),
            is_partial: false,
            original: None,
        }),
        Input::Path(path) => load_path(path, opts),
        Input::Stream(stream) => load_stream(stream.as_mut(), opts),
    }
}

fn load_path(path: &PathBuf, opts: &LoadOptions) -> Result<LoadedBytes, MtagError> {
    if !opts.partial {
        let bytes = std::fs::read(path).map_err(|e| MtagError::file_op(FileOp::Read, path, e))?;
        return Ok(LoadedBytes {
            bytes,
            is_partial: false,
            original: None,
        });
    }

    let metadata =
        std::fs::metadata(path).map_err(|e| MtagError::file_op(FileOp::Stat, path, e))?;
    let size = metadata.len();
    let header = opts.max_header as u64;
    let footer = opts.max_footer as u64;

    if size > header + footer {
        let mut file = File::open(path).map_err(|e| MtagError::file_op(FileOp::Read, path, e))?;
        let mut bytes = Vec::with_capacity((header + footer) as usize);

        let mut head_buf = vec![0u8; header as usize];
        file.read_exact(&mut head_buf)
            .map_err(|e| MtagError::file_op(FileOp::Read, path, e))?;
        bytes.extend_from_slice(&head_buf);

        file.seek(SeekFrom::Start(size - footer))
            .map_err(|e| MtagError::file_op(FileOp::Read, path, e))?;
        let mut tail_buf = vec![0u8; footer as usize];
        file.read_exact(&mut tail_buf)
            .map_err(|e| MtagError::file_op(FileOp::Read, path, e))?;
        bytes.extend_from_slice(&tail_buf);

        Ok(LoadedBytes {
            bytes,
            is_partial: true,
            original: Some(OriginalSource::Path(path.clone())),
        })
    } else {
        let bytes = std::fs::read(path).map_err(|e| MtagError::file_op(FileOp::Read, path, e))?;
        Ok(LoadedBytes {
            bytes,
            is_partial: false,
            original: None,
        })
    }
}

fn load_stream(stream: &mut dyn StreamSource, opts: &LoadOptions) -> Result<LoadedBytes, MtagError> {
    let io_err = |e: std::io::Error| MtagError::file_op(FileOp::Read, "<stream>", e);

    if !opts.partial || !stream.supports_seek() {
        let bytes = stream.read_all().map_err(io_err)?;
        return Ok(LoadedBytes {
            bytes,
            is_partial: false,
            original: None,
        });
    }

    let Some(size) = stream.size() else {
        let bytes = stream.read_all().map_err(io_err)?;
        return Ok(LoadedBytes {
            bytes,
            is_partial: false,
            original: None,
        });
    };

    let header = opts.max_header as u64;
    let footer = opts.max_footer as u64;

    if size > header + footer {
        let mut bytes = stream.read_range(0, header).map_err(io_err)?;
        let tail = stream.read_range(size - footer, footer).map_err(io_err)?;
        bytes.extend_from_slice(&tail);
        Ok(LoadedBytes {
            bytes,
            is_partial: true,
            original: None,
        })
    } else {
        let bytes = stream.read_all().map_err(io_err)?;
        Ok(LoadedBytes {
            bytes,
            is_partial: false,
            original: None,
        })
    }
}
