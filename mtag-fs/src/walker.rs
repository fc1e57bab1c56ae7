use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Depth-first directory walker used by the batch scanner, grounded on
/// `anni_common::fs::PathWalker`. Unlike that walker this one never panics
/// on a permission error partway through a directory — it simply skips
/// the unreadable entry, since a bulk scan must tolerate one bad directory
/// among thousands.
pub struct PathWalker {
    pending_dirs: VecDeque<PathBuf>,
    pending_files: VecDeque<PathBuf>,
    recursive: bool,
}

impl PathWalker {
    pub fn new(root: impl Into<PathBuf>, recursive: bool) -> Self {
        let mut pending_dirs = VecDeque::new();
        pending_dirs.push_back(root.into());
        PathWalker {
            pending_dirs,
            pending_files: VecDeque::new(),
            recursive,
        }
    }

    fn fill_from_next_dir(&mut self) {
        while self.pending_files.is_empty() {
            let Some(dir) = self.pending_dirs.pop_front() else {
                return;
            };
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            let mut children: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
            children.sort();

            for path in children {
                let Ok(meta) = path.metadata() else {
                    continue;
                };
                if meta.is_dir() {
                    if self.recursive {
                        self.pending_dirs.push_back(path);
                    }
                } else if meta.is_file() {
                    self.pending_files.push_back(path);
                }
            }
        }
    }
}

impl Iterator for PathWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_files.is_empty() {
            self.fill_from_next_dir();
        }
        self.pending_files.pop_front()
    }
}

/// Lowercases and strips a leading dot from a user-supplied extension, the
/// normalization applied to `scan_folder`'s `extensions` option.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    extensions.iter().any(|e| *e == ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_nested_directories_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b/2.flac"), b"").unwrap();
        fs::write(dir.path().join("a.mp3"), b"").unwrap();
        fs::write(dir.path().join("b/1.mp3"), b"").unwrap();

        let found: Vec<_> = PathWalker::new(dir.path(), true)
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(found, vec!["a.mp3", "1.mp3", "2.flac"]);
    }

    #[test]
    fn non_recursive_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/nested.mp3"), b"").unwrap();
        fs::write(dir.path().join("top.mp3"), b"").unwrap();

        let found: Vec<_> = PathWalker::new(dir.path(), false).collect();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn extension_filter_normalizes_case_and_dot() {
        let exts = vec![normalize_extension(".MP3"), normalize_extension("flac")];
        assert!(has_extension(Path::new("song.Mp3"), &exts));
        assert!(has_extension(Path::new("song.flac"), &exts));
        assert!(!has_extension(Path::new("song.wav"), &exts));
    }
}
