//! Folder-scale operations built on [`mtag_ops`]: recursive scanning,
//! bulk tag updates, duplicate detection, and metadata export. Grounded
//! on the recursive directory-walk shape of
//! `anni_workspace::AnniWorkspace::scan` generalized from album/disc
//! folders to arbitrary audio libraries, walking with
//! [`mtag_fs::PathWalker`] rather than hand-rolled recursion, with the
//! per-file work dispatched through [`mtag_worker::WorkerPool`] so a
//! scan over thousands of files amortizes thread-spawn cost across one
//! bounded-size pool instead of one call per file.

use mtag_error::MtagError;
use mtag_fs::{has_extension, normalize_extension, Input, PathWalker};
use mtag_model::{AudioProperties, BasicTag};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One file's outcome within an update pass. A batch never aborts on the
/// first failure — every file gets its own outcome so one corrupt file
/// among thousands doesn't stop the rest from being processed.
#[derive(Debug, Clone)]
pub enum FileOutcome<T> {
    Ok(T),
    Failed(String),
}

/// The four ReplayGain property keys plus Apple Sound Check, read as a
/// unit since every scan entry reports them together.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DynamicsInfo {
    #[serde(rename = "replayGainTrackGain")]
    pub replay_gain_track_gain: Option<String>,
    #[serde(rename = "replayGainTrackPeak")]
    pub replay_gain_track_peak: Option<String>,
    #[serde(rename = "replayGainAlbumGain")]
    pub replay_gain_album_gain: Option<String>,
    #[serde(rename = "replayGainAlbumPeak")]
    pub replay_gain_album_peak: Option<String>,
    #[serde(rename = "appleSoundCheck")]
    pub apple_sound_check: Option<String>,
}

/// One successfully scanned file's full record: basic tag, optional
/// audio properties, whether it carries at least one picture, and its
/// dynamics fields. Files that failed to read are reported separately in
/// [`FolderScanResult::errors`] rather than folded in here.
#[derive(Debug, Clone)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub tag: BasicTag,
    pub properties: Option<AudioProperties>,
    pub has_cover_art: bool,
    pub dynamics: DynamicsInfo,
}

/// One file that failed during a scan, with the path it failed on and a
/// human-readable reason.
#[derive(Debug, Clone)]
pub struct ScanError {
    pub path: PathBuf,
    pub message: String,
}

/// The result of a folder scan: successful entries and failures reported
/// separately, the number of matching files found before any `max_files`
/// cap was applied, the number actually processed, and how long the
/// whole pass took.
#[derive(Debug, Clone)]
pub struct FolderScanResult {
    pub files: Vec<ScanEntry>,
    pub errors: Vec<ScanError>,
    pub total_found: usize,
    pub total_processed: usize,
    pub duration_ms: u64,
}

/// Options controlling a [`scan_folder_full`] call.
pub struct ScanOptions {
    pub recursive: bool,
    /// File extensions to match, case- and dot-insensitive. Empty means
    /// "use every extension this library recognizes" (see
    /// [`default_extensions`]) — never "match everything", which would
    /// hand non-audio files to the parser only to watch them fail.
    pub extensions: Vec<String>,
    /// Audio properties require scanning frame headers; disabled by
    /// default since many callers only need the tag.
    pub include_properties: bool,
    /// How many files are opened and parsed at once.
    pub concurrency: usize,
    /// Caps how many matching files are actually processed, after
    /// `total_found` is computed against the full match set.
    pub max_files: Option<usize>,
    /// Invoked once per completed file, in submission order, as
    /// `(completed, total_processed)`.
    pub on_progress: Option<Box<dyn Fn(usize, usize) + Send + Sync>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            recursive: true,
            extensions: Vec::new(),
            include_properties: false,
            concurrency: mtag_worker::shared().size(),
            max_files: None,
            on_progress: None,
        }
    }
}

/// Default extensions recognized across the supported container matrix.
pub fn default_extensions() -> Vec<String> {
    ["mp3", "mp4", "m4a", "flac", "ogg", "oga", "opus", "wav"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn resolved_extensions(extensions: &[String]) -> Vec<String> {
    if extensions.is_empty() {
        default_extensions()
    } else {
        extensions.iter().map(|e| normalize_extension(e)).collect()
    }
}

fn read_dynamics(path: &Path) -> DynamicsInfo {
    let props = mtag_ops::read_extended_properties(Input::path(path)).unwrap_or_default();
    let is_mp4 = mtag_ops::read_format(Input::path(path))
        .map(|f| matches!(f, mtag_model::ContainerFormat::Mp4))
        .unwrap_or(false);
    let apple_sound_check = if is_mp4 {
        mtag_handle::FileHandle::open(mtag_fs::Input::path(path), mtag_fs::LoadOptions::default())
            .ok()
            .and_then(|h| h.get_mp4_item("iTunNORM").ok().flatten())
    } else {
        props.get_one("APPLE_SOUND_CHECK").map(|s| s.to_string())
    };
    DynamicsInfo {
        replay_gain_track_gain: props.get_one("REPLAYGAIN_TRACK_GAIN").map(|s| s.to_string()),
        replay_gain_track_peak: props.get_one("REPLAYGAIN_TRACK_PEAK").map(|s| s.to_string()),
        replay_gain_album_gain: props.get_one("REPLAYGAIN_ALBUM_GAIN").map(|s| s.to_string()),
        replay_gain_album_peak: props.get_one("REPLAYGAIN_ALBUM_PEAK").map(|s| s.to_string()),
        apple_sound_check,
    }
}

fn scan_one(path: PathBuf, include_properties: bool) -> Result<ScanEntry, (PathBuf, String)> {
    let tag = match mtag_ops::read_tags(Input::path(&path)) {
        Ok(tag) => tag,
        Err(err) => return Err((path, err.to_string())),
    };
    let properties = if include_properties {
        mtag_ops::read_properties(Input::path(&path)).ok()
    } else {
        None
    };
    let has_cover_art = mtag_ops::read_pictures(Input::path(&path))
        .map(|pics| !pics.is_empty())
        .unwrap_or(false);
    let dynamics = read_dynamics(&path);
    Ok(ScanEntry {
        path,
        tag,
        properties,
        has_cover_art,
        dynamics,
    })
}

const SCAN_ITEM_TIMEOUT: Duration = Duration::from_secs(300);

/// Walks `root` (recursively unless `options.recursive` is false),
/// dispatching every matching file's read to a worker pool sized to
/// `options.concurrency` so the scan amortizes thread-spawn overhead
/// across the whole pass instead of paying it once per file.
pub fn scan_folder_full(root: impl AsRef<Path>, options: ScanOptions) -> FolderScanResult {
    let started = Instant::now();
    let normalized = resolved_extensions(&options.extensions);

    let mut paths: Vec<PathBuf> = PathWalker::new(root.as_ref(), options.recursive)
        .filter(|path| has_extension(path, &normalized))
        .collect();
    let total_found = paths.len();
    if let Some(max) = options.max_files {
        paths.truncate(max);
    }
    let total_processed = paths.len();

    let pool = mtag_worker::WorkerPool::new(options.concurrency.max(1));
    let include_properties = options.include_properties;
    let jobs: Vec<_> = paths
        .into_iter()
        .map(|path| move || scan_one(path, include_properties))
        .collect();

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for (index, outcome) in pool.run_many(SCAN_ITEM_TIMEOUT, jobs).into_iter().enumerate() {
        match outcome {
            Ok(Ok(entry)) => files.push(entry),
            Ok(Err((path, message))) => errors.push(ScanError { path, message }),
            Err(err) => errors.push(ScanError {
                path: PathBuf::new(),
                message: err.to_string(),
            }),
        }
        if let Some(progress) = &options.on_progress {
            progress(index + 1, total_processed);
        }
    }

    FolderScanResult {
        files,
        errors,
        total_found,
        total_processed,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

/// Convenience wrapper over [`scan_folder_full`] for callers that only
/// need the default options shape for `root`/`recursive`/`extensions`.
pub fn scan_folder(root: impl AsRef<Path>, recursive: bool, extensions: &[String]) -> FolderScanResult {
    scan_folder_full(
        root,
        ScanOptions {
            recursive,
            extensions: extensions.to_vec(),
            include_properties: true,
            ..ScanOptions::default()
        },
    )
}

#[derive(Debug, Clone)]
pub struct UpdateEntry {
    pub path: PathBuf,
    pub outcome: FileOutcome<BasicTag>,
}

/// Merges `partial` onto every matching file's existing tag. Per-file
/// failures are collected rather than propagated, matching the partial-
/// failure tolerance of [`scan_folder`].
pub fn update_folder_tags(
    root: impl AsRef<Path>,
    recursive: bool,
    extensions: &[String],
    partial: &BasicTag,
) -> Vec<UpdateEntry> {
    let normalized = resolved_extensions(extensions);
    PathWalker::new(root.as_ref(), recursive)
        .filter(|path| has_extension(path, &normalized))
        .map(|path| {
            let outcome = match mtag_ops::update_tags(&path, partial) {
                Ok(tag) => FileOutcome::Ok(tag),
                Err(err) => FileOutcome::Failed(err.to_string()),
            };
            UpdateEntry { path, outcome }
        })
        .collect()
}

/// A group of files whose requested tag fields are identical.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub key: String,
    pub paths: Vec<PathBuf>,
}

/// Groups `entries` by a composite key joining the requested tag
/// `fields` (one of `title`, `artist`, `album`) with `|`, skipping empty
/// fields so an unset field doesn't force an artificial mismatch with
/// another file that also left it unset. Only groups with more than one
/// member are returned.
pub fn find_duplicates(entries: &[(PathBuf, BasicTag)], fields: &[&str]) -> Vec<DuplicateGroup> {
    let mut groups: HashMap<String, Vec<PathBuf>> = HashMap::new();
    for (path, tag) in entries {
        let key = fields
            .iter()
            .map(|field| field_value(tag, field))
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join("|");
        if key.is_empty() {
            continue;
        }
        groups.entry(key).or_default().push(path.clone());
    }
    groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(key, mut paths)| {
            paths.sort();
            DuplicateGroup { key, paths }
        })
        .collect()
}

fn field_value<'a>(tag: &'a BasicTag, field: &str) -> &'a str {
    match field {
        "title" => &tag.title,
        "artist" => &tag.artist,
        "album" => &tag.album,
        "genre" => &tag.genre,
        "comment" => &tag.comment,
        _ => "",
    }
}

#[derive(Debug, Clone, Serialize)]
struct ExportedTags {
    title: String,
    artist: String,
    album: String,
    comment: String,
    genre: String,
    year: u32,
    track: u32,
}

impl From<&BasicTag> for ExportedTags {
    fn from(tag: &BasicTag) -> Self {
        ExportedTags {
            title: tag.title.clone(),
            artist: tag.artist.clone(),
            album: tag.album.clone(),
            comment: tag.comment.clone(),
            genre: tag.genre.clone(),
            year: tag.year,
            track: tag.track,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ExportedProperties {
    length: u32,
    bitrate: u32,
    #[serde(rename = "sampleRate")]
    sample_rate: u32,
    channels: u8,
}

impl From<&AudioProperties> for ExportedProperties {
    fn from(props: &AudioProperties) -> Self {
        ExportedProperties {
            length: props.length_seconds,
            bitrate: props.bitrate_kbps,
            sample_rate: props.sample_rate_hz,
            channels: props.channels,
        }
    }
}

/// One exported file, matching the `export_folder_metadata` JSON schema:
/// tags plus optional properties, cover-art presence, and dynamics.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub tags: ExportedTags,
    pub properties: Option<ExportedProperties>,
    #[serde(rename = "hasCoverArt")]
    pub has_cover_art: bool,
    pub dynamics: DynamicsInfo,
}

/// Scans `root` and serializes every successfully read file's tag,
/// properties, cover-art presence, and dynamics as JSON. Files that
/// failed to read are omitted from the document — callers that need
/// per-file failures should use [`scan_folder_full`] directly instead.
pub fn export_folder_metadata(
    root: impl AsRef<Path>,
    recursive: bool,
    extensions: &[String],
) -> Result<String, MtagError> {
    let result = scan_folder_full(
        root,
        ScanOptions {
            recursive,
            extensions: extensions.to_vec(),
            include_properties: true,
            ..ScanOptions::default()
        },
    );
    let exported: Vec<ExportedFile> = result
        .files
        .into_iter()
        .map(|entry| ExportedFile {
            path: entry.path,
            tags: ExportedTags::from(&entry.tag),
            properties: entry.properties.as_ref().map(ExportedProperties::from),
            has_cover_art: entry.has_cover_art,
            dynamics: entry.dynamics,
        })
        .collect();
    serde_json::to_string_pretty(&exported)
        .map_err(|e| MtagError::metadata_write(None, format!("failed to serialize export: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_flac(dir: &Path, name: &str) -> PathBuf {
        let mut bytes = b"fLaC".to_vec();
        bytes.push(0x80);
        bytes.extend_from_slice(&[0, 0, 34]);
        bytes.extend_from_slice(&[0u8; 34]);
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&bytes).unwrap();
        path
    }

    #[test]
    fn scan_folder_tolerates_one_bad_file_among_good_ones() {
        let dir = tempfile::tempdir().unwrap();
        write_flac(dir.path(), "good.flac");
        std::fs::write(dir.path().join("bad.flac"), b"not flac").unwrap();

        let result = scan_folder(dir.path(), true, &[]);
        assert_eq!(result.total_found, 2);
        assert_eq!(result.total_processed, 2);
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.duration_ms < 60_000);
    }

    #[test]
    fn empty_extensions_defaults_to_the_recognized_container_set_not_everything() {
        let dir = tempfile::tempdir().unwrap();
        write_flac(dir.path(), "track.flac");
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let result = scan_folder(dir.path(), true, &[]);
        assert_eq!(result.total_found, 1);
        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn max_files_caps_processing_but_not_the_reported_total_found() {
        let dir = tempfile::tempdir().unwrap();
        write_flac(dir.path(), "a.flac");
        write_flac(dir.path(), "b.flac");
        write_flac(dir.path(), "c.flac");

        let result = scan_folder_full(
            dir.path(),
            ScanOptions {
                max_files: Some(2),
                ..ScanOptions::default()
            },
        );
        assert_eq!(result.total_found, 3);
        assert_eq!(result.total_processed, 2);
        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn progress_callback_fires_once_per_processed_file() {
        let dir = tempfile::tempdir().unwrap();
        write_flac(dir.path(), "a.flac");
        write_flac(dir.path(), "b.flac");

        let completed = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let completed_clone = completed.clone();
        scan_folder_full(
            dir.path(),
            ScanOptions {
                on_progress: Some(Box::new(move |_done, _total| {
                    completed_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                })),
                ..ScanOptions::default()
            },
        );
        assert_eq!(completed.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn find_duplicates_skips_empty_fields_and_requires_more_than_one_match() {
        let entries = vec![
            (PathBuf::from("a.mp3"), BasicTag { artist: "X".into(), ..BasicTag::default() }),
            (PathBuf::from("b.mp3"), BasicTag { artist: "X".into(), ..BasicTag::default() }),
            (PathBuf::from("c.mp3"), BasicTag::default()),
        ];
        let groups = find_duplicates(&entries, &["artist", "title"]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths.len(), 2);
    }

    #[test]
    fn export_folder_metadata_produces_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        write_flac(dir.path(), "track.flac");
        let json = export_folder_metadata(dir.path(), true, &[]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_array());
    }
}
