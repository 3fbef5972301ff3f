//! Shared functionality which is used in unit- and integration-tests


pub(crate) use builder::ClassFileBuilder;

use std::path::{Path, PathBuf};

/// Write a minimal class file for `internal_name` under `root`, creating the package
/// directory chain, and return its path.
pub(crate) fn write_class(root: &Path, internal_name: &str) -> PathBuf {
    write_class_bytes(root, internal_name, ClassFileBuilder::new(internal_name).build())
}

/// Write `bytes` as the class file for `internal_name` under `root`.
pub(crate) fn write_class_bytes(root: &Path, internal_name: &str, bytes: Vec<u8>) -> PathBuf {
    let mut path = root.to_path_buf();
    let mut segments = internal_name.split('/').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            path.push(segment);
        } else {
            path.push(format!("{segment}.class"));
        }
    }

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, bytes).unwrap();
    path
}
