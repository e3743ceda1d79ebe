use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use ging_core::traits::FetchTransport;
use ging_core::types::{SourceFile, SourceTree};
use ging_core::{Error, Result};

/// Reads package directories from `<gopath>/src/<import path>`.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    gopath: PathBuf,
}

impl LocalTransport {
    pub fn new(gopath: impl Into<PathBuf>) -> Self {
        Self { gopath: gopath.into() }
    }

    pub fn package_dir(&self, import_path: &str) -> PathBuf {
        self.gopath.join("src").join(import_path)
    }
}

impl FetchTransport for LocalTransport {
    fn get(&self, import_path: &str) -> Result<SourceTree> {
        let dir = self.package_dir(import_path);
        if !dir.is_dir() {
            return Err(Error::fetch(import_path, format!("{} is not a directory", dir.display())));
        }
        let mut tree = SourceTree::new(import_path);
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::fetch(import_path, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let data = std::fs::read(entry.path()).map_err(|e| Error::fetch(import_path, e))?;
            tree.files.push(SourceFile { name: file_name(entry.path()), data });
        }
        debug!(import_path, dir = %dir.display(), files = tree.files.len(), "read local package");
        Ok(tree)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_regular_files_in_name_order() {
        let gopath = tempfile::tempdir().expect("tempdir");
        let dir = gopath.path().join("src/example.com/pkg");
        std::fs::create_dir_all(dir.join("internal")).expect("mkdir");
        std::fs::write(dir.join("b.go"), "package pkg\n").expect("write");
        std::fs::write(dir.join("a.go"), "package pkg\n").expect("write");
        std::fs::write(dir.join("internal/c.go"), "package internal\n").expect("write");

        let tree = LocalTransport::new(gopath.path()).get("example.com/pkg").expect("get");
        let names: Vec<_> = tree.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.go", "b.go"]);
        assert_eq!(tree.import_path, "example.com/pkg");
    }

    #[test]
    fn missing_directory_is_a_fetch_error() {
        let gopath = tempfile::tempdir().expect("tempdir");
        let err = LocalTransport::new(gopath.path()).get("example.com/missing").expect_err("missing");
        assert!(err.is_retryable());
    }
}
