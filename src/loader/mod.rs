//! Layered class resolution scopes for the transformation pipeline.
//!
//! Agents transforming a class may need to resolve that class's own bytes or those of its
//! dependencies. This module provides the two-level lookup structure the pipeline hands to
//! every agent invocation:
//!
//! - [`crate::loader::ResourceLoader`] - The capability trait for the shared dependency
//!   scope; implementations resolve an internal class name to raw class file bytes.
//! - [`crate::loader::ClasspathLoader`] - The provided implementation over an ordered list
//!   of classpath directories, with the output directory itself filtered out to avoid
//!   loader cycles.
//! - [`crate::loader::ScopedLoader`] - The transient per-invocation scope: the package
//!   root of the class being transformed is consulted first, then the shared dependency
//!   scope. Never cached, never shared between invocations.
//! - [`crate::loader::ProtectionContext`] - The protection context a class is defined
//!   under, recording its code-source root.
//! - [`crate::loader::LoadedClass`] - A class identity bound to the scoped loader that
//!   defined it. Construction consumes the loader, so one loader defines at most one
//!   class.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use classweave::loader::{ClasspathLoader, ResourceLoader, ScopedLoader};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let deps = Arc::new(ClasspathLoader::new(vec![PathBuf::from("deps/classes")]));
//! let scoped = ScopedLoader::new(PathBuf::from("target/classes"), deps);
//!
//! if let Some(bytes) = scoped.load_class("com/example/Foo")? {
//!     println!("resolved {} bytes", bytes.len());
//! }
//! # Ok::<(), classweave::Error>(())
//! ```

pub(crate) mod resolver;

pub use resolver::ClassLoaderResolver;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{Error, Result};

/// File extension of compiled class files, without the leading dot.
pub const CLASS_EXTENSION: &str = "class";

/// Capability for resolving an internal class name to raw class file bytes.
///
/// This is the seam behind which the dependency classpath lives. The pipeline treats the
/// dependency scope as opaque: anything that can answer "give me the bytes of
/// `com/example/Foo`, or tell me you don't have them" can serve as the parent of a
/// [`crate::loader::ScopedLoader`] - a directory set, an archive reader, or a test stub.
pub trait ResourceLoader: Send + Sync {
    /// Resolve `internal_name` (slash-separated, without extension) to class file bytes.
    ///
    /// Returns `Ok(None)` if this scope does not know the class; that is not an error,
    /// resolution simply continues elsewhere or ends.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if a candidate file exists but cannot be read.
    fn load_class(&self, internal_name: &str) -> Result<Option<Vec<u8>>>;
}

/// Dependency scope over an ordered list of classpath directories.
///
/// Entries are consulted in order; the first hit wins. Archive entries are not handled by
/// this implementation - callers with archive classpaths supply their own
/// [`crate::loader::ResourceLoader`].
pub struct ClasspathLoader {
    entries: Vec<PathBuf>,
}

impl ClasspathLoader {
    /// Create a loader over the given classpath directories.
    ///
    /// # Arguments
    /// * `entries` - Classpath directories in resolution order
    #[must_use]
    pub fn new(entries: Vec<PathBuf>) -> ClasspathLoader {
        ClasspathLoader { entries }
    }

    /// Create a loader over `entries` with any entry equal to `output_directory` removed.
    ///
    /// The output directory being instrumented must not appear in its own dependency
    /// scope, otherwise resolution cycles back into the files currently being rewritten.
    #[must_use]
    pub fn with_output_filtered(entries: Vec<PathBuf>, output_directory: &Path) -> ClasspathLoader {
        ClasspathLoader {
            entries: entries
                .into_iter()
                .filter(|entry| entry != output_directory)
                .collect(),
        }
    }

    /// The classpath directories this loader consults.
    #[must_use]
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }
}

impl ResourceLoader for ClasspathLoader {
    fn load_class(&self, internal_name: &str) -> Result<Option<Vec<u8>>> {
        for entry in &self.entries {
            if let Some(bytes) = read_class_under(entry, internal_name)? {
                return Ok(Some(bytes));
            }
        }

        Ok(None)
    }
}

/// Transient two-level resolution scope for one (class, agent) invocation.
///
/// The local scope is the package root directory of the class being transformed; the
/// parent is the shared dependency scope. The local scope is consulted first. A fresh
/// `ScopedLoader` is constructed per invocation by
/// [`crate::loader::ClassLoaderResolver::resolve`] and discarded when the invocation
/// returns.
pub struct ScopedLoader {
    root: PathBuf,
    parent: Arc<dyn ResourceLoader>,
}

impl ScopedLoader {
    /// Create a scope rooted at `root` with `parent` as fallback.
    ///
    /// # Arguments
    /// * `root` - The package root directory forming the local scope
    /// * `parent` - The shared dependency scope
    #[must_use]
    pub fn new(root: PathBuf, parent: Arc<dyn ResourceLoader>) -> ScopedLoader {
        ScopedLoader { root, parent }
    }

    /// The local root directory of this scope.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The protection context classes defined through this scope carry.
    #[must_use]
    pub fn protection_context(&self) -> ProtectionContext {
        ProtectionContext {
            code_source: self.root.clone(),
        }
    }
}

impl ResourceLoader for ScopedLoader {
    fn load_class(&self, internal_name: &str) -> Result<Option<Vec<u8>>> {
        if let Some(bytes) = read_class_under(&self.root, internal_name)? {
            return Ok(Some(bytes));
        }

        self.parent.load_class(internal_name)
    }
}

/// The protection context a class was defined under.
///
/// Records the code-source root - the classpath root the class's bytes came from. Part
/// of the fixed transform contract handed to every agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionContext {
    code_source: PathBuf,
}

impl ProtectionContext {
    /// The classpath root the class originates from.
    #[must_use]
    pub fn code_source(&self) -> &Path {
        &self.code_source
    }
}

/// A class identity bound to the scoped loader that defined it.
///
/// This is the "class object being redefined" of the transform contract. Construction
/// consumes the [`crate::loader::ScopedLoader`]: a scope defines at most one class, and a
/// structural model cannot be re-bound to a second scope, because the first bind took the
/// loader by value.
pub struct LoadedClass {
    name: String,
    loader: ScopedLoader,
    protection: ProtectionContext,
}

impl LoadedClass {
    /// Define a class through `loader`, consuming the loader.
    ///
    /// The loader must actually be able to resolve the class it is defining; a scope that
    /// cannot see its own class indicates a package layout that does not match the class
    /// name.
    ///
    /// # Arguments
    /// * `qualified_name` - The dot-separated binary name of the class
    /// * `internal_name` - The slash-separated form used for resolution
    /// * `loader` - The defining scope, consumed
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if the scope cannot resolve `internal_name`.
    pub fn define(
        qualified_name: String,
        internal_name: &str,
        loader: ScopedLoader,
    ) -> Result<LoadedClass> {
        if loader.load_class(internal_name)?.is_none() {
            return Err(Error::Error(format!(
                "Should not happen. Scoped loader rooted at {} cannot resolve {}",
                loader.root().display(),
                internal_name
            )));
        }

        let protection = loader.protection_context();
        Ok(LoadedClass {
            name: qualified_name,
            loader,
            protection,
        })
    }

    /// The dot-separated binary name of the class.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The loader that defined this class.
    #[must_use]
    pub fn loader(&self) -> &ScopedLoader {
        &self.loader
    }

    /// The protection context this class was defined under.
    #[must_use]
    pub fn protection(&self) -> &ProtectionContext {
        &self.protection
    }
}

/// Resolve `internal_name` to a file under `root`, reading it if present.
fn read_class_under(root: &Path, internal_name: &str) -> Result<Option<Vec<u8>>> {
    let mut candidate = root.to_path_buf();
    let mut segments = internal_name.split('/').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            candidate.push(segment);
        } else {
            // Appended rather than set_extension: simple names may contain dots
            candidate.push(format!("{segment}.{CLASS_EXTENSION}"));
        }
    }

    if !candidate.is_file() {
        return Ok(None);
    }

    match std::fs::read(&candidate) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(source) => Err(Error::io(&candidate, source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::write_class;

    #[test]
    fn classpath_resolution_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_class(second.path(), "com/example/OnlyInSecond");
        let winner = write_class(first.path(), "com/example/InBoth");
        let loser = write_class(second.path(), "com/example/InBoth");
        std::fs::write(&loser, b"shadowed copy").unwrap();

        let loader = ClasspathLoader::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);

        assert!(loader
            .load_class("com/example/OnlyInSecond")
            .unwrap()
            .is_some());
        assert!(loader.load_class("com/example/Missing").unwrap().is_none());

        // First entry wins for duplicated classes
        let expected = std::fs::read(&winner).unwrap();
        assert_eq!(
            loader.load_class("com/example/InBoth").unwrap().unwrap(),
            expected
        );
    }

    #[test]
    fn output_directory_is_filtered() {
        let output = tempfile::tempdir().unwrap();
        let deps = tempfile::tempdir().unwrap();

        let loader = ClasspathLoader::with_output_filtered(
            vec![output.path().to_path_buf(), deps.path().to_path_buf()],
            output.path(),
        );

        assert_eq!(loader.entries(), &[deps.path().to_path_buf()]);
    }

    #[test]
    fn scoped_loader_prefers_local_root() {
        let local = tempfile::tempdir().unwrap();
        let deps = tempfile::tempdir().unwrap();
        write_class(local.path(), "com/example/Foo");
        write_class(deps.path(), "com/example/Bar");

        let parent = Arc::new(ClasspathLoader::new(vec![deps.path().to_path_buf()]));
        let scoped = ScopedLoader::new(local.path().to_path_buf(), parent);

        assert!(scoped.load_class("com/example/Foo").unwrap().is_some());
        assert!(scoped.load_class("com/example/Bar").unwrap().is_some());
        assert!(scoped.load_class("com/example/Baz").unwrap().is_none());
        assert_eq!(scoped.protection_context().code_source(), local.path());
    }

    #[test]
    fn define_requires_resolvable_class() {
        let local = tempfile::tempdir().unwrap();
        write_class(local.path(), "com/example/Foo");

        let parent: Arc<dyn ResourceLoader> = Arc::new(ClasspathLoader::new(Vec::new()));
        let loader = ScopedLoader::new(local.path().to_path_buf(), Arc::clone(&parent));
        let loaded =
            LoadedClass::define("com.example.Foo".to_string(), "com/example/Foo", loader)
                .unwrap();
        assert_eq!(loaded.name(), "com.example.Foo");
        assert_eq!(loaded.protection().code_source(), local.path());

        let loader = ScopedLoader::new(local.path().to_path_buf(), parent);
        assert!(
            LoadedClass::define("com.example.Gone".to_string(), "com/example/Gone", loader)
                .is_err()
        );
    }
}
