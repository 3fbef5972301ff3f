//! The per-class transformation unit.
//!
//! A [`crate::unit::ClassUnit`] owns everything the pipeline needs to know about one
//! compiled class: where it lives on disk, its parsed structural model, and its current
//! byte image. The unit is single-use per transformation run - it is created when the
//! class is discovered, carried through every agent, and discarded once the final
//! write-back has happened.
//!
//! # Byte Image vs. Structural Model
//!
//! The structural model is parsed exactly once, from the file contents present at
//! construction time, and answers name queries for the rest of the unit's life. The byte
//! image is what evolves: it starts as the model's canonical serialization, and every
//! accepted replacement becomes the new image (and the new file content) before the next
//! agent runs, so chained agents observe each other's output.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use classweave::{loader::ClasspathLoader, ClassUnit};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let deps = Arc::new(ClasspathLoader::new(Vec::new()));
//! let unit = ClassUnit::from_path(
//!     Path::new("target/classes/com/example/Foo.class"),
//!     deps,
//! )?;
//!
//! assert_eq!(unit.qualified_name(), "com.example.Foo");
//! assert_eq!(unit.internal_name(), "com/example/Foo");
//! assert_eq!(unit.package_root_dir()?, Path::new("target/classes"));
//! # Ok::<(), classweave::Error>(())
//! ```

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    classfile::ClassModel,
    file::File,
    loader::{LoadedClass, ResourceLoader, ScopedLoader},
    Error, Result,
};

/// One compiled class under transformation.
///
/// Holds the source path (the write-back target), a shared reference to the dependency
/// scope, the parse-once structural model, and the evolving byte image. See the module
/// documentation for the lifecycle.
pub struct ClassUnit {
    source_path: PathBuf,
    dependency_loader: Arc<dyn ResourceLoader>,
    model: ClassModel,
    /// Current byte image; starts as the model's serialization, replaced on overwrite
    current: Vec<u8>,
}

impl ClassUnit {
    /// Create a unit from the class file at `path`.
    ///
    /// Reads the file once and parses the structural model from exactly those bytes.
    ///
    /// # Arguments
    /// * `path` - Location of the compiled class file
    /// * `dependency_loader` - The shared dependency scope, used later when scoped
    ///   loaders for this unit are resolved
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if the file cannot be read, or
    /// [`crate::Error::Malformed`] (carrying the path) if its contents do not parse as a
    /// class file.
    pub fn from_path(path: &Path, dependency_loader: Arc<dyn ResourceLoader>) -> Result<ClassUnit> {
        let file = File::from_file(path)?;

        let model = match ClassModel::parse(file.data()) {
            Ok(model) => model,
            Err(error @ Error::Io { .. }) => return Err(error),
            Err(error) => {
                return Err(malformed_error!("{}: {}", path.display(), error));
            }
        };

        let current = model.to_bytes();

        Ok(ClassUnit {
            source_path: path.to_path_buf(),
            dependency_loader,
            model,
            current,
        })
    }

    /// The on-disk location this unit was read from and writes back to.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// The shared dependency scope this unit resolves against.
    #[must_use]
    pub fn dependency_loader(&self) -> &Arc<dyn ResourceLoader> {
        &self.dependency_loader
    }

    /// The parsed structural model.
    #[must_use]
    pub fn model(&self) -> &ClassModel {
        &self.model
    }

    /// The dot-separated fully qualified class name, e.g. `com.example.Foo`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.model.qualified_name()
    }

    /// The slash-separated internal class name required by the transform contract.
    #[must_use]
    pub fn internal_name(&self) -> &str {
        self.model.class_name()
    }

    /// The directory that acts as classpath root for this class.
    ///
    /// Computed from the file's parent directory by ascending one level per package
    /// segment; a default-package class resolves to the file's immediate parent. The
    /// result mirrors the on-disk layout convention of one directory per package
    /// segment.
    ///
    /// # Errors
    /// Returns [`crate::Error::LoaderConstruction`] if the path has fewer ancestors than
    /// the class has package segments - the layout does not match the class name.
    pub fn package_root_dir(&self) -> Result<PathBuf> {
        let mut root = self.source_path.parent();
        for _ in self.internal_name().chars().filter(|c| *c == '/') {
            root = root.and_then(Path::parent);
        }

        match root {
            Some(root) => Ok(root.to_path_buf()),
            None => Err(Error::LoaderConstruction {
                path: self.source_path.clone(),
            }),
        }
    }

    /// Bind this unit's class identity to `loader`, producing the loadable class object
    /// handed to agents.
    ///
    /// The loader is consumed: it defines this one class and nothing else, and the model
    /// cannot be re-bound to a second loader through the same handle. One fresh loader
    /// (and one bind) per agent invocation.
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if the loader cannot resolve this unit's own
    /// class, which indicates a package layout inconsistent with the class name.
    pub fn materialize(&self, loader: ScopedLoader) -> Result<LoadedClass> {
        LoadedClass::define(self.qualified_name(), self.internal_name(), loader)
    }

    /// The unit's current byte image.
    ///
    /// Before any replacement this is the model's canonical serialization; after a
    /// replacement it is the latest accepted replacement, so chained agents compose.
    #[must_use]
    pub fn current_bytes(&self) -> &[u8] {
        &self.current
    }

    /// Replace the on-disk file contents and the in-memory byte image.
    ///
    /// The write goes through a temporary file in the same directory followed by a
    /// rename, so a partial write never leaves a corrupt class file visible to
    /// subsequent readers.
    ///
    /// # Arguments
    /// * `bytes` - The complete replacement class file
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] carrying the unit's path on any I/O failure.
    pub fn overwrite(&mut self, bytes: &[u8]) -> Result<()> {
        let directory = self.source_path.parent().unwrap_or(Path::new("."));

        let mut staged = tempfile::NamedTempFile::new_in(directory)
            .map_err(|source| Error::io(&self.source_path, source))?;
        staged
            .write_all(bytes)
            .map_err(|source| Error::io(&self.source_path, source))?;
        staged
            .persist(&self.source_path)
            .map_err(|persist| Error::io(&self.source_path, persist.error))?;

        self.current = bytes.to_vec();
        Ok(())
    }
}

impl std::fmt::Debug for ClassUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassUnit")
            .field("source_path", &self.source_path)
            .field("class_name", &self.model.class_name())
            .finish_non_exhaustive()
    }
}
