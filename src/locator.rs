//! Discovery of compiled class files under an output directory.

use std::path::{Path, PathBuf};

use crate::{loader::CLASS_EXTENSION, Error, Result};

/// Walks an output directory for class files.
///
/// Discovery order is deterministic: the collected paths are sorted before they are
/// returned, so pipeline runs over the same tree always process units in the same order.
pub struct ClassFileLocator;

impl ClassFileLocator {
    /// Collect every `.class` file under `directory`, sorted.
    ///
    /// A missing directory yields the empty set - it means nothing was compiled, which
    /// is a no-op for instrumentation, not an error.
    ///
    /// # Arguments
    /// * `directory` - The output directory to walk
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if a directory in the tree cannot be listed.
    pub fn find_classes(directory: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        if directory.is_dir() {
            Self::walk(directory, &mut found)?;
            found.sort();
        }

        Ok(found)
    }

    fn walk(directory: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
        let entries =
            std::fs::read_dir(directory).map_err(|source| Error::io(directory, source))?;

        for entry in entries {
            let entry = entry.map_err(|source| Error::io(directory, source))?;
            let path = entry.path();

            if path.is_dir() {
                Self::walk(&path, found)?;
            } else if path
                .extension()
                .is_some_and(|extension| extension == CLASS_EXTENSION)
            {
                found.push(path);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_class_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("com/example")).unwrap();
        std::fs::write(dir.path().join("com/example/B.class"), b"b").unwrap();
        std::fs::write(dir.path().join("com/example/A.class"), b"a").unwrap();
        std::fs::write(dir.path().join("Top.class"), b"t").unwrap();
        std::fs::write(dir.path().join("README.txt"), b"not a class").unwrap();

        let found = ClassFileLocator::find_classes(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("Top.class"),
                dir.path().join("com/example/A.class"),
                dir.path().join("com/example/B.class"),
            ]
        );
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does/not/exist");

        assert!(ClassFileLocator::find_classes(&missing).unwrap().is_empty());
    }
}
