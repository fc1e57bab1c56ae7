//! A preopen-rooted virtual filesystem boundary for untrusted batch
//! input, grounded on the async-trait extractor pattern used throughout
//! `annil` (a request-scoped value is validated once at the boundary,
//! and every caller downstream only ever sees the validated form).
//! Here the boundary validates a virtual path against a preopened root
//! before any real filesystem call is made on its behalf.

use async_trait::async_trait;
use mtag_error::MtagError;
use mtag_model::{AudioProperties, BasicTag};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// An operation a sandboxed filesystem can perform on a validated path.
#[async_trait]
pub trait SandboxFs: Send + Sync {
    async fn read(&self, virtual_path: &str) -> Result<Vec<u8>, MtagError>;
    async fn write(&self, virtual_path: &str, data: &[u8]) -> Result<(), MtagError>;
    async fn list(&self, virtual_path: &str) -> Result<Vec<String>, MtagError>;
}

/// Resolves `virtual_path` against `root`, rejecting any path whose
/// normalized components climb above the root (`..` segments that would
/// otherwise escape it) or that are absolute on their own. Mirrors how a
/// WASI preopen validates guest paths before they ever reach a host
/// syscall: normalization happens on the *requested* path, never by
/// trusting `..` resolution from a symlink or the real filesystem.
pub fn resolve_virtual_path(root: &Path, virtual_path: &str) -> Result<PathBuf, MtagError> {
    if virtual_path.is_empty() {
        return Ok(root.to_path_buf());
    }

    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(virtual_path).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(MtagError::Sandbox {
                        message: format!("path `{virtual_path}` escapes the sandboxed root"),
                    });
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(MtagError::Sandbox {
                    message: format!("path `{virtual_path}` must be relative to the sandbox root"),
                });
            }
        }
    }

    Ok(resolved)
}

/// A [`SandboxFs`] rooted at a single real directory. Every operation
/// resolves its virtual path through [`resolve_virtual_path`] before
/// touching disk; there is no privilege to escape the preopened root
/// short of a symlink planted inside it, which this sandbox does not
/// attempt to detect (a concern for the caller's input source, not this
/// boundary).
pub struct PreopenSandbox {
    root: PathBuf,
}

impl PreopenSandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PreopenSandbox { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads `virtual_path`'s basic tag without ever letting the parsing
    /// library see a host path outside this sandbox's root.
    pub async fn read_tags(&self, virtual_path: &str) -> Result<BasicTag, MtagError> {
        let bytes = self.read(virtual_path).await?;
        let handle = mtag_handle::FileHandle::from_bytes(bytes)?;
        handle.tag()
    }

    /// Reads `virtual_path`'s audio properties.
    pub async fn read_properties(&self, virtual_path: &str) -> Result<AudioProperties, MtagError> {
        let bytes = self.read(virtual_path).await?;
        let mut handle = mtag_handle::FileHandle::from_bytes(bytes)?;
        handle.audio_properties()
    }

    /// Applies `tag` to `virtual_path` and writes the result back through
    /// the sandbox boundary.
    pub async fn write_tags(&self, virtual_path: &str, tag: &BasicTag) -> Result<(), MtagError> {
        let bytes = self.read(virtual_path).await?;
        let mut handle = mtag_handle::FileHandle::from_bytes(bytes)?;
        handle.set_tag(tag)?;
        handle.save()?;
        let buffer = handle.get_file_buffer()?.to_vec();
        handle.dispose();
        self.write(virtual_path, &buffer).await
    }

    /// This sandbox runs in-process (no subprocess runtime to supervise),
    /// so it's always available once constructed.
    pub fn is_running(&self) -> bool {
        true
    }

    /// No-op: there is no subprocess to tear down for an in-process
    /// preopen sandbox. Kept so callers that hold a `PreopenSandbox`
    /// through a trait-like lifecycle don't need a special case.
    pub fn shutdown(&self) {}
}

/// Declarative sandbox configuration: a map of virtual mount prefixes to
/// the host directory each one is preopened against. A virtual path
/// presented to [`MultiRootSandbox`] is always `<prefix>/<rest>`; `rest`
/// is resolved against the matching prefix's host directory exactly as
/// [`PreopenSandbox`] resolves a single root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SandboxConfig {
    pub preopens: HashMap<String, PathBuf>,
}

/// A [`SandboxFs`] multiplexing several named [`PreopenSandbox`] mounts,
/// for callers that need more than one sandboxed root distinguished by a
/// virtual prefix (e.g. one mount per batch job's input and output
/// directories).
pub struct MultiRootSandbox {
    mounts: HashMap<String, PreopenSandbox>,
}

impl MultiRootSandbox {
    pub fn new(config: SandboxConfig) -> Self {
        let mounts = config
            .preopens
            .into_iter()
            .map(|(prefix, root)| (prefix, PreopenSandbox::new(root)))
            .collect();
        MultiRootSandbox { mounts }
    }

    fn resolve(&self, virtual_path: &str) -> Result<(&PreopenSandbox, &str), MtagError> {
        let (prefix, rest) = virtual_path.split_once('/').unwrap_or((virtual_path, ""));
        self.mounts
            .get(prefix)
            .map(|sandbox| (sandbox, rest))
            .ok_or_else(|| MtagError::Sandbox {
                message: format!("no preopen mounted at `{prefix}`"),
            })
    }

    pub async fn read_tags(&self, virtual_path: &str) -> Result<BasicTag, MtagError> {
        let (sandbox, rest) = self.resolve(virtual_path)?;
        sandbox.read_tags(rest).await
    }

    pub async fn read_properties(&self, virtual_path: &str) -> Result<AudioProperties, MtagError> {
        let (sandbox, rest) = self.resolve(virtual_path)?;
        sandbox.read_properties(rest).await
    }

    pub async fn write_tags(&self, virtual_path: &str, tag: &BasicTag) -> Result<(), MtagError> {
        let (sandbox, rest) = self.resolve(virtual_path)?;
        sandbox.write_tags(rest, tag).await
    }

    /// This sandbox runs in-process, so it's available as soon as it
    /// carries at least one mount.
    pub fn is_running(&self) -> bool {
        !self.mounts.is_empty()
    }

    pub fn shutdown(&self) {}
}

#[async_trait]
impl SandboxFs for MultiRootSandbox {
    async fn read(&self, virtual_path: &str) -> Result<Vec<u8>, MtagError> {
        let (sandbox, rest) = self.resolve(virtual_path)?;
        sandbox.read(rest).await
    }

    async fn write(&self, virtual_path: &str, data: &[u8]) -> Result<(), MtagError> {
        let (sandbox, rest) = self.resolve(virtual_path)?;
        sandbox.write(rest, data).await
    }

    async fn list(&self, virtual_path: &str) -> Result<Vec<String>, MtagError> {
        let (sandbox, rest) = self.resolve(virtual_path)?;
        sandbox.list(rest).await
    }
}

#[async_trait]
impl SandboxFs for PreopenSandbox {
    async fn read(&self, virtual_path: &str) -> Result<Vec<u8>, MtagError> {
        let real_path = resolve_virtual_path(&self.root, virtual_path)?;
        tokio::fs::read(&real_path)
            .await
            .map_err(|e| MtagError::file_op(mtag_error::FileOp::Read, real_path, e))
    }

    async fn write(&self, virtual_path: &str, data: &[u8]) -> Result<(), MtagError> {
        let real_path = resolve_virtual_path(&self.root, virtual_path)?;
        if let Some(parent) = real_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MtagError::file_op(mtag_error::FileOp::Write, parent, e))?;
        }
        tokio::fs::write(&real_path, data)
            .await
            .map_err(|e| MtagError::file_op(mtag_error::FileOp::Write, real_path, e))
    }

    async fn list(&self, virtual_path: &str) -> Result<Vec<String>, MtagError> {
        let real_path = resolve_virtual_path(&self.root, virtual_path)?;
        let mut entries = tokio::fs::read_dir(&real_path)
            .await
            .map_err(|e| MtagError::file_op(mtag_error::FileOp::Stat, real_path.clone(), e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MtagError::file_op(mtag_error::FileOp::Stat, real_path.clone(), e))?
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_dir_within_bounds_is_allowed() {
        let root = Path::new("/sandbox/root");
        let resolved = resolve_virtual_path(root, "a/b/../c").unwrap();
        assert_eq!(resolved, Path::new("/sandbox/root/a/c"));
    }

    #[test]
    fn parent_dir_escaping_root_is_rejected() {
        let root = Path::new("/sandbox/root");
        let err = resolve_virtual_path(root, "../escape").unwrap_err();
        assert!(err.is_sandbox());
    }

    #[test]
    fn absolute_virtual_path_is_rejected() {
        let root = Path::new("/sandbox/root");
        let err = resolve_virtual_path(root, "/etc/passwd").unwrap_err();
        assert!(err.is_sandbox());
    }

    #[tokio::test]
    async fn write_then_read_round_trips_through_the_sandbox() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = PreopenSandbox::new(dir.path());
        sandbox.write("nested/track.flac", b"hello").await.unwrap();
        let bytes = sandbox.read("nested/track.flac").await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    fn minimal_flac() -> Vec<u8> {
        let mut bytes = b"fLaC".to_vec();
        bytes.push(0x80);
        bytes.extend_from_slice(&[0, 0, 34]);
        bytes.extend_from_slice(&[0u8; 34]);
        bytes
    }

    #[tokio::test]
    async fn write_tags_then_read_tags_round_trips_through_the_sandbox() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = PreopenSandbox::new(dir.path());
        sandbox.write("track.flac", &minimal_flac()).await.unwrap();

        let tag = mtag_model::BasicTag {
            title: "Sandboxed".into(),
            ..mtag_model::BasicTag::default()
        };
        sandbox.write_tags("track.flac", &tag).await.unwrap();

        let read_back = sandbox.read_tags("track.flac").await.unwrap();
        assert_eq!(read_back.title, "Sandboxed");
        assert!(sandbox.is_running());
    }

    #[tokio::test]
    async fn read_rejects_traversal_even_when_the_target_exists_outside_root() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"nope").unwrap();
        let inner_root = outer.path().join("inner");
        std::fs::create_dir(&inner_root).unwrap();
        let sandbox = PreopenSandbox::new(&inner_root);

        let result = sandbox.read("../secret.txt").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_sandbox());
    }

    fn multi_root(prefixes: &[(&str, &Path)]) -> MultiRootSandbox {
        let mut preopens = HashMap::new();
        for (prefix, root) in prefixes {
            preopens.insert(prefix.to_string(), root.to_path_buf());
        }
        MultiRootSandbox::new(SandboxConfig { preopens })
    }

    #[tokio::test]
    async fn multi_root_sandbox_dispatches_by_virtual_prefix() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let sandbox = multi_root(&[("in", input_dir.path()), ("out", output_dir.path())]);

        sandbox.write("in/track.bin", b"source").await.unwrap();
        sandbox.write("out/track.bin", b"rendered").await.unwrap();

        assert_eq!(sandbox.read("in/track.bin").await.unwrap(), b"source");
        assert_eq!(sandbox.read("out/track.bin").await.unwrap(), b"rendered");
        assert!(input_dir.path().join("track.bin").exists());
        assert!(output_dir.path().join("track.bin").exists());
    }

    #[tokio::test]
    async fn multi_root_sandbox_keeps_mounts_isolated_from_each_other() {
        let a_dir = tempfile::tempdir().unwrap();
        let b_dir = tempfile::tempdir().unwrap();
        let sandbox = multi_root(&[("a", a_dir.path()), ("b", b_dir.path())]);

        sandbox.write("a/only_here.txt", b"a-data").await.unwrap();
        assert!(a_dir.path().join("only_here.txt").exists());
        assert!(!b_dir.path().join("only_here.txt").exists());
    }

    #[tokio::test]
    async fn multi_root_sandbox_rejects_an_unknown_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = multi_root(&[("known", dir.path())]);

        let err = sandbox.read("missing/track.bin").await.unwrap_err();
        assert!(err.is_sandbox());
    }

    #[tokio::test]
    async fn multi_root_sandbox_write_tags_then_read_tags_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = multi_root(&[("music", dir.path())]);
        sandbox.write("music/track.flac", &minimal_flac()).await.unwrap();

        let tag = mtag_model::BasicTag {
            title: "Multi-root".into(),
            ..mtag_model::BasicTag::default()
        };
        sandbox.write_tags("music/track.flac", &tag).await.unwrap();

        let read_back = sandbox.read_tags("music/track.flac").await.unwrap();
        assert_eq!(read_back.title, "Multi-root");
        assert!(sandbox.is_running());
    }
}
