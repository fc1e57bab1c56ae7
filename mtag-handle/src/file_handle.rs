use crate::native::NativeHandle;
use mtag_error::{FileOp, MtagError};
use mtag_fs::{load, Input, LoadOptions, LoadedBytes, OriginalSource};
use mtag_model::{AudioProperties, BasicTag, ContainerFormat, Picture, PropertyMap, Rating};

/// Lifecycle state of a [`FileHandle`]. Once `Disposed`, every accessor
/// returns a `Metadata` error rather than panicking — mirroring the
/// owning-value semantics of `anni_workspace::AnniWorkspace`, where a
/// dropped workspace handle stays inert instead of crashing callers that
/// hold a stale reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Loaded,
    Saved,
    Disposed,
}

/// The stateful audio-file object built on top of [`NativeHandle`]. Owns
/// the original load source so a partially-loaded file can be promoted to
/// a full read transparently when an operation needs bytes it doesn't
/// have (e.g. `save_to_file` on a file that was opened with only its
/// header and footer in memory).
pub struct FileHandle {
    native: NativeHandle,
    original: Option<OriginalSource>,
    is_partial: bool,
    state: State,
    properties_cache: Option<AudioProperties>,
}

impl FileHandle {
    /// Opens `input` according to `opts`, promoting a header+footer
    /// partial read if the native parser can't make sense of the
    /// truncated bytes (some containers carry essential structure outside
    /// both windows, e.g. a large FLAC SEEKTABLE).
    pub fn open(mut input: Input, opts: LoadOptions) -> Result<Self, MtagError> {
        let LoadedBytes {
            bytes,
            is_partial,
            original,
        } = load(&mut input, &opts)?;

        match NativeHandle::load_from_bytes(bytes) {
            Ok(native) => Ok(FileHandle {
                native,
                original,
                is_partial,
                state: State::Loaded,
                properties_cache: None,
            }),
            Err(_) if is_partial => {
                let full_opts = LoadOptions {
                    partial: false,
                    ..opts
                };
                let LoadedBytes { bytes, .. } = load(&mut input, &full_opts)?;
                let native = NativeHandle::load_from_bytes(bytes)?;
                Ok(FileHandle {
                    native,
                    original: None,
                    is_partial: false,
                    state: State::Loaded,
                    properties_cache: None,
                })
            }
            Err(err) => Err(err),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, MtagError> {
        let native = NativeHandle::load_from_bytes(bytes)?;
        Ok(FileHandle {
            native,
            original: None,
            is_partial: false,
            state: State::Loaded,
            properties_cache: None,
        })
    }

    fn ensure_live(&self) -> Result<(), MtagError> {
        if self.state == State::Disposed {
            Err(MtagError::metadata_read(
                None,
                "operation attempted on a disposed file handle",
            ))
        } else {
            Ok(())
        }
    }

    pub fn is_valid(&self) -> bool {
        self.native.is_valid()
    }

    pub fn format(&self) -> ContainerFormat {
        self.native.format()
    }

    pub fn is_partial(&self) -> bool {
        self.is_partial
    }

    pub fn tag(&self) -> Result<BasicTag, MtagError> {
        self.ensure_live()?;
        Ok(self.native.basic_tag())
    }

    pub fn set_tag(&mut self, tag: &BasicTag) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.native.set_basic_tag(tag)?;
        self.properties_cache = None;
        self.state = State::Loaded;
        Ok(())
    }

    /// Audio properties are immutable once computed; cached after first
    /// access since recomputing them means re-scanning frame headers.
    pub fn audio_properties(&mut self) -> Result<AudioProperties, MtagError> {
        self.ensure_live()?;
        if let Some(cached) = &self.properties_cache {
            return Ok(cached.clone());
        }
        let props = self
            .native
            .audio_properties()
            .ok_or_else(|| MtagError::metadata_read(None, "container carries no audio properties"))?;
        self.properties_cache = Some(props.clone());
        Ok(props)
    }

    pub fn get_property(&self, key: &str) -> Result<Option<String>, MtagError> {
        self.ensure_live()?;
        Ok(self.native.get_property(key))
    }

    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.native.set_property(key, value)
    }

    pub fn properties(&self) -> Result<PropertyMap, MtagError> {
        self.ensure_live()?;
        Ok(self.native.get_properties())
    }

    pub fn set_properties(&mut self, properties: &PropertyMap) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.native.set_properties(properties)
    }

    pub fn is_mp4(&self) -> bool {
        self.native.is_mp4()
    }

    pub fn get_mp4_item(&self, name: &str) -> Result<Option<String>, MtagError> {
        self.ensure_live()?;
        self.native.get_mp4_item(name)
    }

    pub fn set_mp4_item(&mut self, name: &str, value: &str) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.native.set_mp4_item(name, value)
    }

    pub fn remove_mp4_item(&mut self, name: &str) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.native.remove_mp4_item(name)
    }

    pub fn pictures(&self) -> Result<Vec<Picture>, MtagError> {
        self.ensure_live()?;
        Ok(self.native.get_pictures())
    }

    pub fn set_pictures(&mut self, pictures: &[Picture]) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.native.set_pictures(pictures)
    }

    pub fn add_picture(&mut self, picture: &Picture) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.native.add_picture(picture)
    }

    pub fn remove_pictures(&mut self) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.native.remove_pictures()
    }

    pub fn ratings(&self) -> Result<Vec<Rating>, MtagError> {
        self.ensure_live()?;
        Ok(self.native.get_ratings())
    }

    pub fn set_ratings(&mut self, ratings: &[Rating]) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.native.set_ratings(ratings)
    }

    /// Writes pending edits into the in-memory buffer. Does not touch the
    /// original file; use [`FileHandle::save_to_file`] for that. Refused
    /// on a partially-loaded handle, since its buffer is missing the body
    /// bytes between header and footer — callers that hit this should
    /// use `save_to_file`, which promotes to a full read first.
    pub fn save(&mut self) -> Result<(), MtagError> {
        self.ensure_live()?;
        if self.is_partial {
            let path = match &self.original {
                Some(OriginalSource::Path(path)) => path.clone(),
                None => std::path::PathBuf::new(),
            };
            return Err(MtagError::file_op(
                FileOp::Save,
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "save refused on a partially-loaded handle; use save_to_file to promote and persist",
                ),
            ));
        }
        self.native.save()?;
        self.state = State::Saved;
        Ok(())
    }

    /// Persists the in-memory buffer to `path`. If this handle was opened
    /// as a header+footer partial read, promotes to a full in-memory copy
    /// first by re-reading the original path, since a partial buffer is
    /// missing the body bytes between header and footer.
    pub fn save_to_file(&mut self, path: &std::path::Path) -> Result<(), MtagError> {
        self.ensure_live()?;
        self.promote_if_partial()?;
        self.native.save()?;
        self.state = State::Saved;
        std::fs::write(path, self.native.get_buffer())
            .map_err(|e| MtagError::file_op(FileOp::Write, path, e))
    }

    fn promote_if_partial(&mut self) -> Result<(), MtagError> {
        if !self.is_partial {
            return Ok(());
        }
        let Some(OriginalSource::Path(path)) = &self.original else {
            return Err(MtagError::metadata_write(
                None,
                "partial handle has no original source to promote from",
            ));
        };
        let bytes = std::fs::read(path).map_err(|e| MtagError::file_op(FileOp::Read, path, e))?;
        let mut promoted = NativeHandle::load_from_bytes(bytes)?;
        promoted.set_basic_tag(&self.native.basic_tag())?;
        promoted.set_properties(&self.native.get_properties())?;
        promoted.set_pictures(&self.native.get_pictures())?;
        promoted.set_ratings(&self.native.get_ratings())?;
        self.native = promoted;
        self.is_partial = false;
        Ok(())
    }

    pub fn get_file_buffer(&self) -> Result<&[u8], MtagError> {
        self.ensure_live()?;
        Ok(self.native.get_buffer())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.state == State::Loaded
    }

    /// Idempotent: disposing an already-disposed handle is a no-op rather
    /// than an error.
    pub fn dispose(&mut self) {
        self.state = State::Disposed;
    }
}
