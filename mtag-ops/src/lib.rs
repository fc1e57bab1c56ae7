//! Single-file read/write operations built on [`mtag_handle::FileHandle`].
//! Grounded on the shape of `anni`'s `flac` subcommand operations (read,
//! export, modify-in-place) generalized across every supported container
//! instead of FLAC alone, and reworked to operate over [`Input`] (a path,
//! an in-memory buffer, or a caller-supplied stream) rather than a path
//! alone, so a host embedding this crate without direct filesystem access
//! can still read and transform a file it already has bytes for.

use mtag_error::MtagError;
use mtag_fs::{Input, LoadOptions};
use mtag_handle::FileHandle;
use mtag_model::{AudioProperties, BasicTag, ContainerFormat, Picture, PictureKind, PropertyMap, Rating};
use std::path::Path;
use std::time::{Duration, Instant};

fn partial_opts() -> LoadOptions {
    LoadOptions {
        partial: true,
        ..LoadOptions::default()
    }
}

/// A write operation needs every body byte to produce a correct output
/// buffer, so it always opens in full regardless of how large the file is.
fn full_opts() -> LoadOptions {
    LoadOptions::default()
}

/// Writes pending edits into the handle's in-memory buffer and returns it,
/// disposing the handle either way.
fn finish_buffer(mut handle: FileHandle) -> Result<Vec<u8>, MtagError> {
    let result = handle.save().and_then(|_| handle.get_file_buffer().map(|b| b.to_vec()));
    handle.dispose();
    result
}

/// Reads the basic tag from `input` without keeping the handle open.
/// Opened eligible for the partial-load fast path — a tag read never
/// needs the file's body bytes.
pub fn read_tags(input: Input) -> Result<BasicTag, MtagError> {
    let mut handle = FileHandle::open(input, partial_opts())?;
    let tag = handle.tag();
    handle.dispose();
    tag
}

/// Overwrites `input`'s tag with `tag` verbatim (no merge with the
/// existing tag — callers that want merge-in semantics use
/// [`update_tags`]) and returns the post-save buffer. Never writes to
/// disk on its own; a caller with a path-backed input that wants the
/// change persisted writes the returned bytes back itself, or uses
/// [`update_tags`] for the read-modify-write-to-disk shape.
pub fn apply_tags(input: Input, tag: &BasicTag) -> Result<Vec<u8>, MtagError> {
    let mut handle = FileHandle::open(input, full_opts())?;
    handle.set_tag(tag)?;
    finish_buffer(handle)
}

/// Merges `partial` onto the file's existing tag (fields left at their
/// default "unset" value in `partial` are left untouched) and writes the
/// result back to `path` in place. Requires a path — there is no "in
/// place" target for a bytes- or stream-backed input, which is what
/// distinguishes this from [`apply_tags`].
pub fn update_tags(path: impl AsRef<Path>, partial: &BasicTag) -> Result<BasicTag, MtagError> {
    let path = path.as_ref();
    let mut handle = FileHandle::open(Input::path(path), full_opts())?;
    let merged = handle.tag()?.merge_onto(partial);
    handle.set_tag(&merged)?;
    handle.save_to_file(path)?;
    handle.dispose();
    Ok(merged)
}

/// Resets `input`'s tag to all-default ("unset") values and returns the
/// post-save buffer.
pub fn clear_tags(input: Input) -> Result<Vec<u8>, MtagError> {
    apply_tags(input, &BasicTag::cleared())
}

pub fn read_properties(input: Input) -> Result<AudioProperties, MtagError> {
    let mut handle = FileHandle::open(input, partial_opts())?;
    let props = handle.audio_properties();
    handle.dispose();
    props
}

pub fn read_format(input: Input) -> Result<ContainerFormat, MtagError> {
    let mut handle = FileHandle::open(input, partial_opts())?;
    let format = handle.format();
    handle.dispose();
    Ok(format)
}

/// Whether `input` can be opened and parsed as a recognized audio
/// container. Never propagates the underlying error; callers that need
/// the reason should call [`read_format`] or [`read_tags`] directly.
pub fn is_valid_audio_file(input: Input) -> bool {
    match FileHandle::open(input, partial_opts()) {
        Ok(mut handle) => {
            let valid = handle.is_valid();
            handle.dispose();
            valid
        }
        Err(_) => false,
    }
}

pub fn read_extended_properties(input: Input) -> Result<PropertyMap, MtagError> {
    let mut handle = FileHandle::open(input, partial_opts())?;
    let props = handle.properties();
    handle.dispose();
    props
}

pub fn write_extended_properties(input: Input, properties: &PropertyMap) -> Result<Vec<u8>, MtagError> {
    let mut handle = FileHandle::open(input, full_opts())?;
    handle.set_properties(properties)?;
    finish_buffer(handle)
}

pub fn read_pictures(input: Input) -> Result<Vec<Picture>, MtagError> {
    let mut handle = FileHandle::open(input, partial_opts())?;
    let pictures = handle.pictures();
    handle.dispose();
    pictures
}

pub fn write_pictures(input: Input, pictures: &[Picture]) -> Result<Vec<u8>, MtagError> {
    let mut handle = FileHandle::open(input, full_opts())?;
    handle.set_pictures(pictures)?;
    finish_buffer(handle)
}

pub fn add_picture(input: Input, picture: &Picture) -> Result<Vec<u8>, MtagError> {
    let mut handle = FileHandle::open(input, full_opts())?;
    handle.add_picture(picture)?;
    finish_buffer(handle)
}

/// Removes every picture from `input`.
pub fn clear_pictures(input: Input) -> Result<Vec<u8>, MtagError> {
    let mut handle = FileHandle::open(input, full_opts())?;
    handle.remove_pictures()?;
    finish_buffer(handle)
}

/// Finds the first picture of `kind` among `input`'s pictures.
pub fn find_picture_by_type(input: Input, kind: PictureKind) -> Result<Option<Picture>, MtagError> {
    let pictures = read_pictures(input)?;
    Ok(pictures.into_iter().find(|p| p.kind == kind))
}

/// Replaces the first picture of `kind` with `picture` (which is forced to
/// carry the same `kind`), or appends it if none of that kind exists yet.
pub fn replace_picture_by_type(input: Input, kind: PictureKind, picture: &Picture) -> Result<Vec<u8>, MtagError> {
    let mut handle = FileHandle::open(input, full_opts())?;
    let mut pictures = handle.pictures()?;
    let replacement = Picture::new(picture.mime_type.clone(), picture.data.clone(), kind);
    match pictures.iter().position(|p| p.kind == kind) {
        Some(index) => pictures[index] = replacement,
        None => pictures.push(replacement),
    }
    handle.set_pictures(&pictures)?;
    finish_buffer(handle)
}

/// Returns the bytes of the first front-cover picture, or of the first
/// picture at all if none is typed as front cover, or `None` if `input`
/// carries no pictures.
pub fn read_cover_art(input: Input) -> Result<Option<Vec<u8>>, MtagError> {
    let pictures = read_pictures(input)?;
    let cover = pictures
        .iter()
        .find(|p| p.kind == PictureKind::FrontCover)
        .or_else(|| pictures.first());
    Ok(cover.map(|p| p.data.clone()))
}

/// Sets `input`'s front-cover picture to `data`/`mime_type`, replacing any
/// existing front cover, and returns the post-save buffer.
pub fn apply_cover_art(input: Input, data: Vec<u8>, mime_type: impl Into<String>) -> Result<Vec<u8>, MtagError> {
    let picture = Picture::new(mime_type.into(), data, PictureKind::FrontCover);
    replace_picture_by_type(input, PictureKind::FrontCover, &picture)
}

pub fn read_ratings(input: Input) -> Result<Vec<Rating>, MtagError> {
    let mut handle = FileHandle::open(input, partial_opts())?;
    let ratings = handle.ratings();
    handle.dispose();
    ratings
}

pub fn write_ratings(input: Input, ratings: &[Rating]) -> Result<Vec<u8>, MtagError> {
    let mut handle = FileHandle::open(input, full_opts())?;
    handle.set_ratings(ratings)?;
    finish_buffer(handle)
}

/// Reads every field worth shipping across a boundary in one shot: basic
/// tag, audio properties (absent for a container that carries none),
/// extended properties, pictures, and ratings.
pub fn read_metadata(input: Input) -> Result<mtag_wire::FileMetadataEnvelope, MtagError> {
    let mut handle = FileHandle::open(input, partial_opts())?;
    let tag = handle.tag()?;
    let properties = handle.audio_properties().ok();
    let extended = handle.properties()?;
    let pictures = handle.pictures()?;
    let ratings = handle.ratings()?;
    handle.dispose();
    Ok(mtag_wire::FileMetadataEnvelope {
        tag,
        properties,
        extended,
        pictures,
        ratings,
    })
}

/// Options shared by every `*_batch` helper below.
pub struct BatchOptions {
    /// How many inputs are opened and parsed at once. Bounded by running
    /// the batch through a worker pool sized to this number rather than
    /// the shared process-wide pool, so one caller's batch can't starve
    /// another's.
    pub concurrency: usize,
    /// Invoked once per completed item, in submission order, as
    /// `(completed, total)`.
    pub on_progress: Option<Box<dyn Fn(usize, usize) + Send + Sync>>,
    /// When `false`, the batch stops folding further results into the
    /// report as soon as it reaches the first failed item (in submission
    /// order); items already dispatched to the pool still run to
    /// completion, their results are simply not collected.
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            concurrency: mtag_worker::shared().size(),
            on_progress: None,
            continue_on_error: true,
        }
    }
}

/// The outcome of running a batch of inputs through one operation:
/// per-item successes and failures, keyed by the item's position in the
/// input list, plus how long the whole batch took.
pub struct BatchReport<T> {
    pub results: Vec<(usize, T)>,
    pub errors: Vec<(usize, MtagError)>,
    pub duration_ms: u64,
}

const BATCH_ITEM_TIMEOUT: Duration = Duration::from_secs(300);

fn run_batch<T, F>(inputs: Vec<Input>, options: &BatchOptions, op: F) -> BatchReport<T>
where
    F: Fn(Input) -> Result<T, MtagError> + Send + Sync + 'static,
    T: Send + 'static,
{
    let started = Instant::now();
    let total = inputs.len();
    let pool = mtag_worker::WorkerPool::new(options.concurrency.max(1));
    let op = std::sync::Arc::new(op);
    let jobs: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            let op = op.clone();
            move || op(input)
        })
        .collect();

    let mut results = Vec::new();
    let mut errors = Vec::new();
    for (index, outcome) in pool.run_many(BATCH_ITEM_TIMEOUT, jobs).into_iter().enumerate() {
        match outcome {
            Ok(Ok(value)) => results.push((index, value)),
            Ok(Err(err)) | Err(err) => {
                let fatal = !options.continue_on_error;
                errors.push((index, err));
                if fatal {
                    if let Some(progress) = &options.on_progress {
                        progress(index + 1, total);
                    }
                    break;
                }
            }
        }
        if let Some(progress) = &options.on_progress {
            progress(index + 1, total);
        }
    }

    BatchReport {
        results,
        errors,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

pub fn read_tags_batch(inputs: Vec<Input>, options: BatchOptions) -> BatchReport<BasicTag> {
    run_batch(inputs, &options, read_tags)
}

pub fn read_properties_batch(inputs: Vec<Input>, options: BatchOptions) -> BatchReport<AudioProperties> {
    run_batch(inputs, &options, read_properties)
}

pub fn read_metadata_batch(inputs: Vec<Input>, options: BatchOptions) -> BatchReport<mtag_wire::FileMetadataEnvelope> {
    run_batch(inputs, &options, read_metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn minimal_flac_path(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let mut bytes = b"fLaC".to_vec();
        bytes.push(0x80);
        bytes.extend_from_slice(&[0, 0, 34]);
        bytes.extend_from_slice(&[0u8; 34]);
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&bytes).unwrap();
        path
    }

    #[test]
    fn apply_then_read_round_trips_basic_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "track.flac");

        let tag = BasicTag {
            title: "Title".into(),
            artist: "Artist".into(),
            ..BasicTag::default()
        };
        let buffer = apply_tags(Input::path(&path), &tag).unwrap();
        let read_back = read_tags(Input::bytes(buffer)).unwrap();
        assert_eq!(read_back.title, "Title");
        assert_eq!(read_back.artist, "Artist");
    }

    #[test]
    fn apply_tags_does_not_touch_the_original_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "track.flac");
        apply_tags(
            Input::path(&path),
            &BasicTag {
                title: "Title".into(),
                ..BasicTag::default()
            },
        )
        .unwrap();
        assert_eq!(read_tags(Input::path(&path)).unwrap().title, "");
    }

    #[test]
    fn update_tags_preserves_untouched_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "track.flac");

        let first = apply_tags(
            Input::path(&path),
            &BasicTag {
                title: "Original".into(),
                album: "Album".into(),
                ..BasicTag::default()
            },
        )
        .unwrap();
        std::fs::write(&path, &first).unwrap();

        update_tags(
            &path,
            &BasicTag {
                title: "Updated".into(),
                ..BasicTag::default()
            },
        )
        .unwrap();

        let result = read_tags(Input::path(&path)).unwrap();
        assert_eq!(result.title, "Updated");
        assert_eq!(result.album, "Album");
    }

    #[test]
    fn clear_tags_resets_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "track.flac");
        let tagged = apply_tags(
            Input::path(&path),
            &BasicTag {
                title: "Title".into(),
                ..BasicTag::default()
            },
        )
        .unwrap();
        let cleared = clear_tags(Input::bytes(tagged)).unwrap();
        assert_eq!(read_tags(Input::bytes(cleared)).unwrap(), BasicTag::default());
    }

    #[test]
    fn is_valid_audio_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.flac");
        std::fs::write(&path, b"not a flac file").unwrap();
        assert!(!is_valid_audio_file(Input::path(&path)));
    }

    #[test]
    fn read_cover_art_falls_back_to_first_picture_when_none_is_front_cover() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "track.flac");
        assert_eq!(read_cover_art(Input::path(&path)).unwrap(), None);

        let back = Picture::new("image/jpeg", vec![9, 9, 9], PictureKind::BackCover);
        let with_picture = add_picture(Input::path(&path), &back).unwrap();
        assert_eq!(
            read_cover_art(Input::bytes(with_picture)).unwrap(),
            Some(vec![9, 9, 9])
        );
    }

    #[test]
    fn apply_cover_art_replaces_an_existing_front_cover() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "track.flac");
        let once = apply_cover_art(Input::path(&path), vec![1, 2, 3], "image/png").unwrap();
        let twice = apply_cover_art(Input::bytes(once), vec![4, 5, 6], "image/png").unwrap();

        let pictures = read_pictures(Input::bytes(twice)).unwrap();
        let covers: Vec<_> = pictures.iter().filter(|p| p.kind == PictureKind::FrontCover).collect();
        assert_eq!(covers.len(), 1);
        assert_eq!(covers[0].data, vec![4, 5, 6]);
    }

    #[test]
    fn read_tags_batch_reports_one_result_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = minimal_flac_path(&dir, "a.flac");
        let b = minimal_flac_path(&dir, "b.flac");
        let bad = dir.path().join("bad.flac");
        std::fs::write(&bad, b"not flac").unwrap();

        let inputs = vec![Input::path(&a), Input::path(&b), Input::path(&bad)];
        let report = read_tags_batch(
            inputs,
            BatchOptions {
                concurrency: 2,
                ..BatchOptions::default()
            },
        );
        assert_eq!(report.results.len() + report.errors.len(), 3);
        assert_eq!(report.errors.len(), 1);
        assert!(report.duration_ms < 60_000);
    }

    #[test]
    fn read_tags_batch_invokes_progress_once_per_completion() {
        let dir = tempfile::tempdir().unwrap();
        let inputs: Vec<Input> = (0..4)
            .map(|i| Input::path(minimal_flac_path(&dir, &format!("{i}.flac"))))
            .collect();

        let completed = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let completed_clone = completed.clone();
        let report = read_tags_batch(
            inputs,
            BatchOptions {
                concurrency: 2,
                on_progress: Some(Box::new(move |_done, _total| {
                    completed_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                })),
                continue_on_error: true,
            },
        );
        assert_eq!(report.results.len(), 4);
        assert_eq!(completed.load(std::sync::atomic::Ordering::SeqCst), 4);
    }
}
