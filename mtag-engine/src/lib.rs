//! Top-level façade: wires the stateful file handle, the folder batch
//! scanner, the worker pool, the sandbox boundary, and the wire codec
//! into the one entry point library consumers hold onto, grounded on the
//! singleton-facade shape of `anni_workspace::AnniWorkspace` (one struct
//! per root, constructed once, every higher-level operation a method on
//! it).

use mtag_batch::{
    export_folder_metadata, find_duplicates, scan_folder, scan_folder_full, update_folder_tags, DuplicateGroup,
    ScanEntry, UpdateEntry,
};
use mtag_error::{FileOp, MtagError};
use mtag_fs::{Input, LoadOptions, RuntimeCapabilities};
use mtag_handle::FileHandle;
use mtag_model::{BasicTag, Picture};
use mtag_sandbox::{MultiRootSandbox, SandboxConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sizing for the engine's private worker pool, distinct from the
/// process-wide shared pool every other crate falls back to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkerPoolOptions {
    /// `None` defers to the process-wide shared pool; `Some(n)` gives
    /// this engine its own pool of `n` threads instead.
    pub size: Option<usize>,
}

/// Engine-wide configuration, mirroring the kebab-case /
/// `deny_unknown_fields` convention of `anni_workspace::config::WorkspaceConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct EngineOptions {
    /// Bytes of header read before a file is promoted to a full load.
    #[serde(default = "default_max_header")]
    pub max_header_bytes: u32,
    /// Bytes of footer read before a file is promoted to a full load.
    #[serde(default = "default_max_footer")]
    pub max_footer_bytes: u32,
    /// Above this many files, [`Engine::process_files`] dispatches
    /// through the worker pool instead of running sequentially on the
    /// calling thread.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    /// Per-file timeout when dispatched through the worker pool.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
    /// Whether batch-style operations may dispatch through a worker pool
    /// at all. `false` forces every batch call onto the calling thread,
    /// sequentially, regardless of `parallel_threshold`.
    #[serde(default = "default_true")]
    pub use_worker_pool: bool,
    /// Sizing for this engine's private pool; see [`WorkerPoolOptions`].
    #[serde(default)]
    pub worker_pool_options: WorkerPoolOptions,
    /// Whether this engine constructs a sandbox at all. `false` leaves
    /// [`Engine::sandbox`] returning `None` even if `sandbox_config` is set.
    #[serde(default)]
    pub use_sandbox: bool,
    /// Named preopen mounts for the sandbox, required when `use_sandbox`
    /// is set.
    #[serde(default)]
    pub sandbox_config: Option<SandboxConfig>,
    /// Forces every load to skip the header+footer partial-load fast
    /// path, opening every file in full. Useful for hosts whose byte
    /// source doesn't support the seeking a partial load needs.
    #[serde(default)]
    pub force_buffer_mode: bool,
}

fn default_max_header() -> u32 {
    1_048_576
}
fn default_max_footer() -> u32 {
    131_072
}
fn default_parallel_threshold() -> usize {
    8
}
fn default_task_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            max_header_bytes: default_max_header(),
            max_footer_bytes: default_max_footer(),
            parallel_threshold: default_parallel_threshold(),
            task_timeout_secs: default_task_timeout_secs(),
            use_worker_pool: default_true(),
            worker_pool_options: WorkerPoolOptions::default(),
            use_sandbox: false,
            sandbox_config: None,
            force_buffer_mode: false,
        }
    }
}

impl EngineOptions {
    fn load_options(&self, partial: bool) -> LoadOptions {
        LoadOptions {
            partial: partial && !self.force_buffer_mode,
            max_header: self.max_header_bytes,
            max_footer: self.max_footer_bytes,
        }
    }
}

/// The library's one entry point. Holds engine-wide configuration, the
/// runtime capability probe taken at construction time, and the
/// optional private worker pool / sandbox configured on it; every
/// operation below is a method on it rather than a free function, the
/// way every `AnniWorkspace` operation hangs off the workspace root it
/// was constructed against.
pub struct Engine {
    options: EngineOptions,
    capabilities: RuntimeCapabilities,
    worker_pool: Option<mtag_worker::WorkerPool>,
    sandbox: Option<MultiRootSandbox>,
}

impl Engine {
    /// Probes host capabilities and validates `options` before returning
    /// a ready-to-use engine. A host missing filesystem or threading
    /// capability still constructs successfully; individual operations
    /// that need them fail with `Environment` at call time instead.
    pub fn initialize(options: EngineOptions) -> Result<Self, MtagError> {
        if options.max_header_bytes == 0 || options.max_footer_bytes == 0 {
            return Err(MtagError::Initialization {
                message: "max_header_bytes and max_footer_bytes must be non-zero".to_string(),
            });
        }
        if options.use_sandbox && options.sandbox_config.is_none() {
            return Err(MtagError::Initialization {
                message: "use_sandbox is set but no sandbox_config was provided".to_string(),
            });
        }

        let worker_pool = options
            .worker_pool_options
            .size
            .map(mtag_worker::WorkerPool::new);
        let sandbox = options
            .use_sandbox
            .then(|| options.sandbox_config.clone().map(MultiRootSandbox::new))
            .flatten();

        Ok(Engine {
            options,
            capabilities: RuntimeCapabilities::detect(),
            worker_pool,
            sandbox,
        })
    }

    pub fn capabilities(&self) -> RuntimeCapabilities {
        self.capabilities
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// This engine's sandbox, if `use_sandbox` was configured.
    pub fn sandbox(&self) -> Option<&MultiRootSandbox> {
        self.sandbox.as_ref()
    }

    /// This engine's own worker pool if it was given a dedicated size,
    /// otherwise the process-wide shared pool.
    fn pool_ref(&self) -> &mtag_worker::WorkerPool {
        self.worker_pool.as_ref().unwrap_or_else(|| mtag_worker::shared())
    }

    /// Opens `input`, eligible for the header+footer partial-load path
    /// unless `force_buffer_mode` is set.
    pub fn open(&self, input: Input) -> Result<FileHandle, MtagError> {
        if matches!(input, Input::Path(_)) && !self.capabilities.filesystem {
            return Err(MtagError::Environment {
                capability: "filesystem".to_string(),
            });
        }
        FileHandle::open(input, self.options.load_options(true))
    }

    /// Opens `input` always by a full read, skipping the partial-load
    /// fast path — useful when a caller already knows it will rewrite
    /// most of the file (e.g. `copy_with_tags`).
    pub fn open_full(&self, input: Input) -> Result<FileHandle, MtagError> {
        if matches!(input, Input::Path(_)) && !self.capabilities.filesystem {
            return Err(MtagError::Environment {
                capability: "filesystem".to_string(),
            });
        }
        FileHandle::open(input, self.options.load_options(false))
    }

    /// Merges `partial` onto `path`'s existing tag and writes the result
    /// back in place.
    pub fn update_file(&self, path: impl AsRef<Path>, partial: &BasicTag) -> Result<BasicTag, MtagError> {
        let path = path.as_ref();
        let mut handle = self.open(Input::path(path))?;
        let merged = handle.tag()?.merge_onto(partial);
        handle.set_tag(&merged)?;
        handle.save_to_file(path)?;
        handle.dispose();
        Ok(merged)
    }

    /// Copies `src` to `dest` byte-for-byte, then applies `tag` to the
    /// copy, leaving `src` untouched.
    pub fn copy_with_tags(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, tag: &BasicTag) -> Result<(), MtagError> {
        let src = src.as_ref();
        let dest = dest.as_ref();
        std::fs::copy(src, dest).map_err(|e| MtagError::file_op(FileOp::Write, dest, e))?;
        let mut handle = self.open_full(Input::path(dest))?;
        handle.set_tag(tag)?;
        let result = handle.save_to_file(dest);
        handle.dispose();
        result
    }

    /// Recursively scans `root`, reading each matching file's basic tag.
    pub fn scan_folder(&self, root: impl AsRef<Path>, recursive: bool, extensions: &[String]) -> mtag_batch::FolderScanResult {
        scan_folder(root, recursive, extensions)
    }

    pub fn update_folder_tags(
        &self,
        root: impl AsRef<Path>,
        recursive: bool,
        extensions: &[String],
        partial: &BasicTag,
    ) -> Vec<UpdateEntry> {
        update_folder_tags(root, recursive, extensions, partial)
    }

    pub fn find_duplicates(&self, entries: &[(PathBuf, BasicTag)], fields: &[&str]) -> Vec<DuplicateGroup> {
        find_duplicates(entries, fields)
    }

    /// Scans `root` with properties disabled (duplicate detection only
    /// needs the basic tag) and groups files by the composite key.
    pub fn find_duplicates_in_folder(
        &self,
        root: impl AsRef<Path>,
        recursive: bool,
        extensions: &[String],
        fields: &[&str],
    ) -> Vec<DuplicateGroup> {
        let result = scan_folder_full(
            root,
            mtag_batch::ScanOptions {
                recursive,
                extensions: extensions.to_vec(),
                include_properties: false,
                ..mtag_batch::ScanOptions::default()
            },
        );
        let entries: Vec<(PathBuf, BasicTag)> = result.files.into_iter().map(|entry: ScanEntry| (entry.path, entry.tag)).collect();
        find_duplicates(&entries, fields)
    }

    /// Scans `root` and writes a JSON document describing every file's
    /// tag, properties, cover-art presence, and dynamics.
    pub fn export_folder_metadata(
        &self,
        root: impl AsRef<Path>,
        recursive: bool,
        extensions: &[String],
    ) -> Result<String, MtagError> {
        export_folder_metadata(root, recursive, extensions)
    }

    /// Runs `op` over every path in `paths`. Below
    /// `options.parallel_threshold` files — or whenever `use_worker_pool`
    /// is disabled — this runs sequentially on the calling thread; for a
    /// handful of files, worker-pool dispatch overhead outweighs any
    /// parallelism gained. At or above the threshold, each file is
    /// dispatched to this engine's pool (its own, if sized, otherwise the
    /// shared one) with a per-file timeout, so one wedged file can't
    /// stall the whole batch.
    pub fn process_files<F, T>(&self, paths: Vec<PathBuf>, op: F) -> Vec<(PathBuf, Result<T, MtagError>)>
    where
        F: Fn(&Path) -> Result<T, MtagError> + Send + Sync + 'static,
        T: Send + 'static,
    {
        if !self.options.use_worker_pool || paths.len() < self.options.parallel_threshold || !self.capabilities.threading {
            return paths
                .into_iter()
                .map(|path| {
                    let result = op(&path);
                    (path, result)
                })
                .collect();
        }

        let op = std::sync::Arc::new(op);
        let timeout = Duration::from_secs(self.options.task_timeout_secs);
        let pool = self.pool_ref();

        paths
            .into_iter()
            .map(|path| {
                let op = op.clone();
                let path_for_task = path.clone();
                let result = pool.run(timeout, move || op(&path_for_task)).unwrap_or_else(Err);
                (path, result)
            })
            .collect()
    }

    /// Runs `calls` in order against the single file handle opened from
    /// `input`, returning one [`MethodCallResult`] per call. Later calls
    /// in the list see the edits made by earlier ones (e.g. a
    /// `read_tags` call after an `apply_tags` call observes the applied
    /// tag), matching a caller issuing a short script of operations
    /// against one file in one round trip.
    pub fn batch_operations(&self, input: Input, calls: &[MethodCall]) -> Result<Vec<MethodCallResult>, MtagError> {
        let mut handle = self.open_full(input)?;
        let results = run_method_calls(&mut handle, calls);
        handle.dispose();
        Ok(results)
    }

    /// Runs the same ordered `calls` script across every path in
    /// `paths`, dispatched through this engine's worker pool. Each
    /// worker encodes its file's result list with [`mtag_wire::encode`]
    /// before it crosses the pool's channel back to the caller, which
    /// decodes it with [`mtag_wire::decode`] — exercising the wire codec
    /// as a genuine boundary rather than an always-in-process call.
    pub fn batch_operations_many(
        &self,
        paths: Vec<PathBuf>,
        calls: Vec<MethodCall>,
    ) -> Vec<(PathBuf, Result<Vec<MethodCallResult>, MtagError>)> {
        let calls = std::sync::Arc::new(calls);
        let timeout = Duration::from_secs(self.options.task_timeout_secs);
        let pool = self.pool_ref();
        let options = self.options.load_options(false);

        let jobs: Vec<_> = paths
            .iter()
            .cloned()
            .map(|path| {
                let calls = calls.clone();
                let options = options.clone();
                move || -> Result<Vec<u8>, MtagError> {
                    let mut handle = FileHandle::open(Input::path(&path), options)?;
                    let results = run_method_calls(&mut handle, &calls);
                    handle.dispose();
                    mtag_wire::encode(&results)
                }
            })
            .collect();

        paths
            .into_iter()
            .zip(pool.run_many(timeout, jobs))
            .map(|(path, outcome)| {
                let decoded = outcome
                    .and_then(|err_or_bytes| err_or_bytes)
                    .and_then(|bytes| mtag_wire::decode::<Vec<MethodCallResult>>(&bytes));
                (path, decoded)
            })
            .collect()
    }

    /// Reads `virtual_path`'s basic tag through this engine's sandbox,
    /// bridging the sandbox's async API to this façade's synchronous
    /// calling convention with a one-off current-thread runtime rather
    /// than requiring every `Engine` caller to become async.
    pub fn read_tags_sandboxed(&self, virtual_path: &str) -> Result<BasicTag, MtagError> {
        let sandbox = self.sandbox.as_ref().ok_or_else(|| MtagError::Sandbox {
            message: "this engine was not configured with a sandbox".to_string(),
        })?;
        block_on_current_thread(sandbox.read_tags(virtual_path))
    }

    pub fn write_tags_sandboxed(&self, virtual_path: &str, tag: &BasicTag) -> Result<(), MtagError> {
        let sandbox = self.sandbox.as_ref().ok_or_else(|| MtagError::Sandbox {
            message: "this engine was not configured with a sandbox".to_string(),
        })?;
        block_on_current_thread(sandbox.write_tags(virtual_path, tag))
    }
}

fn block_on_current_thread<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to start a current-thread runtime for a sandbox bridge call")
        .block_on(future)
}

/// One call in a [`Engine::batch_operations`] script: a method name plus
/// its JSON-encoded arguments (ignored for methods that take none, e.g.
/// `read_tags`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, args: serde_json::Value) -> Self {
        MethodCall { method: method.into(), args }
    }

    pub fn no_args(method: impl Into<String>) -> Self {
        MethodCall::new(method, serde_json::Value::Null)
    }
}

/// The outcome of one [`MethodCall`]: its return value encoded as JSON,
/// or the message of whatever [`MtagError`] it failed with. Kept as a
/// plain externally-tagged enum (serde's default representation) rather
/// than an internally-tagged one, since this crosses `mtag_wire`'s
/// `bincode` boundary and bincode can't deserialize an internally-tagged
/// enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MethodCallOutcome {
    Ok { value: serde_json::Value },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodCallResult {
    pub method: String,
    pub outcome: MethodCallOutcome,
}

fn run_method_calls(handle: &mut FileHandle, calls: &[MethodCall]) -> Vec<MethodCallResult> {
    calls
        .iter()
        .map(|call| MethodCallResult {
            method: call.method.clone(),
            outcome: dispatch_call(handle, call),
        })
        .collect()
}

/// The closed set of methods a [`MethodCall`] may name. Unlike
/// [`mtag_ops`]'s free functions, each call here runs against the same
/// already-open handle, so a script can read, modify, and read again
/// within one round trip.
fn dispatch_call(handle: &mut FileHandle, call: &MethodCall) -> MethodCallOutcome {
    let outcome = (|| -> Result<serde_json::Value, MtagError> {
        match call.method.as_str() {
            "read_tags" => to_json(&handle.tag()?),
            "apply_tags" => {
                let tag: BasicTag = from_json(&call.args)?;
                handle.set_tag(&tag)?;
                to_json(&tag)
            }
            "clear_tags" => {
                let cleared = BasicTag::cleared();
                handle.set_tag(&cleared)?;
                to_json(&cleared)
            }
            "read_properties" => to_json(&handle.audio_properties()?),
            "read_pictures" => to_json(&handle.pictures()?),
            "add_picture" => {
                let picture: Picture = from_json(&call.args)?;
                handle.add_picture(&picture)?;
                to_json(&picture)
            }
            other => Err(MtagError::metadata_read(None, format!("unknown batch method `{other}`"))),
        }
    })();

    match outcome {
        Ok(value) => MethodCallOutcome::Ok { value },
        Err(err) => MethodCallOutcome::Error { message: err.to_string() },
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, MtagError> {
    serde_json::to_value(value).map_err(|e| MtagError::metadata_read(None, format!("failed to encode result: {e}")))
}

fn from_json<T: for<'de> Deserialize<'de>>(value: &serde_json::Value) -> Result<T, MtagError> {
    serde_json::from_value(value.clone()).map_err(|e| MtagError::metadata_write(None, format!("failed to decode arguments: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn minimal_flac_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
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
    fn initialize_rejects_zero_sized_windows() {
        let options = EngineOptions {
            max_header_bytes: 0,
            ..EngineOptions::default()
        };
        assert!(Engine::initialize(options).is_err());
    }

    #[test]
    fn initialize_rejects_sandbox_flag_without_config() {
        let options = EngineOptions {
            use_sandbox: true,
            ..EngineOptions::default()
        };
        assert!(Engine::initialize(options).is_err());
    }

    #[test]
    fn update_file_merges_and_persists() {
        let engine = Engine::initialize(EngineOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "a.flac");
        engine
            .update_file(
                &path,
                &BasicTag {
                    title: "First".into(),
                    ..BasicTag::default()
                },
            )
            .unwrap();
        let merged = engine
            .update_file(
                &path,
                &BasicTag {
                    album: "Second".into(),
                    ..BasicTag::default()
                },
            )
            .unwrap();
        assert_eq!(merged.title, "First");
        assert_eq!(merged.album, "Second");
    }

    #[test]
    fn copy_with_tags_leaves_source_untouched() {
        let engine = Engine::initialize(EngineOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let src = minimal_flac_path(&dir, "src.flac");
        let dest = dir.path().join("dest.flac");
        engine
            .copy_with_tags(
                &src,
                &dest,
                &BasicTag {
                    title: "Copied".into(),
                    ..BasicTag::default()
                },
            )
            .unwrap();
        assert_eq!(mtag_ops::read_tags(Input::path(&src)).unwrap().title, "");
        assert_eq!(mtag_ops::read_tags(Input::path(&dest)).unwrap().title, "Copied");
    }

    #[test]
    fn process_files_runs_sequentially_below_threshold() {
        let engine = Engine::initialize(EngineOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![minimal_flac_path(&dir, "a.flac"), minimal_flac_path(&dir, "b.flac")];
        let results = engine.process_files(paths, |path| mtag_ops::read_tags(Input::path(path)));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn process_files_stays_sequential_when_worker_pool_is_disabled() {
        let engine = Engine::initialize(EngineOptions {
            use_worker_pool: false,
            parallel_threshold: 1,
            ..EngineOptions::default()
        })
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..20).map(|i| minimal_flac_path(&dir, &format!("{i}.flac"))).collect();
        let results = engine.process_files(paths, |path| mtag_ops::read_tags(Input::path(path)));
        assert_eq!(results.len(), 20);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn batch_operations_runs_an_ordered_script_against_one_handle() {
        let engine = Engine::initialize(EngineOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "track.flac");

        let calls = vec![
            MethodCall::new(
                "apply_tags",
                serde_json::to_value(BasicTag {
                    title: "Scripted".into(),
                    ..BasicTag::default()
                })
                .unwrap(),
            ),
            MethodCall::no_args("read_tags"),
        ];
        let results = engine.batch_operations(Input::path(&path), &calls).unwrap();
        assert_eq!(results.len(), 2);
        match &results[1].outcome {
            MethodCallOutcome::Ok { value } => assert_eq!(value["title"], "Scripted"),
            MethodCallOutcome::Error { message } => panic!("unexpected error: {message}"),
        }
    }

    #[test]
    fn batch_operations_reports_an_unknown_method_without_aborting_the_script() {
        let engine = Engine::initialize(EngineOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "track.flac");

        let calls = vec![MethodCall::no_args("not_a_real_method"), MethodCall::no_args("read_tags")];
        let results = engine.batch_operations(Input::path(&path), &calls).unwrap();
        assert!(matches!(results[0].outcome, MethodCallOutcome::Error { .. }));
        assert!(matches!(results[1].outcome, MethodCallOutcome::Ok { .. }));
    }

    #[test]
    fn batch_operations_many_dispatches_through_the_wire_codec_boundary() {
        let engine = Engine::initialize(EngineOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![minimal_flac_path(&dir, "a.flac"), minimal_flac_path(&dir, "b.flac")];

        let calls = vec![MethodCall::no_args("read_tags")];
        let results = engine.batch_operations_many(paths, calls);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn sandboxed_tag_round_trips_through_a_configured_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_flac_path(&dir, "track.flac");
        let mut preopens = std::collections::HashMap::new();
        preopens.insert("music".to_string(), dir.path().to_path_buf());

        let engine = Engine::initialize(EngineOptions {
            use_sandbox: true,
            sandbox_config: Some(SandboxConfig { preopens }),
            ..EngineOptions::default()
        })
        .unwrap();

        let virtual_path = format!("music/{}", path.file_name().unwrap().to_string_lossy());
        engine
            .write_tags_sandboxed(
                &virtual_path,
                &BasicTag {
                    title: "Sandboxed Engine".into(),
                    ..BasicTag::default()
                },
            )
            .unwrap();
        let tag = engine.read_tags_sandboxed(&virtual_path).unwrap();
        assert_eq!(tag.title, "Sandboxed Engine");
    }

    #[test]
    fn sandboxed_call_without_a_configured_sandbox_fails_clearly() {
        let engine = Engine::initialize(EngineOptions::default()).unwrap();
        let err = engine.read_tags_sandboxed("music/track.flac").unwrap_err();
        assert!(err.is_sandbox());
    }

    #[test]
    fn version_reports_the_crate_version() {
        let engine = Engine::initialize(EngineOptions::default()).unwrap();
        assert!(!engine.version().is_empty());
    }
}
