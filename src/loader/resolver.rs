//! Construction of per-invocation scoped loaders.

use std::sync::Arc;

use crate::{
    loader::{ResourceLoader, ScopedLoader},
    unit::ClassUnit,
    Result,
};

/// Builds the transient [`crate::loader::ScopedLoader`] for one (class, agent) invocation.
///
/// One resolver call per invocation, no caching: even two classes sharing a package root
/// get independent loaders. The redundant construction is cheap and keeps invocations
/// isolated from each other.
pub struct ClassLoaderResolver;

impl ClassLoaderResolver {
    /// Build a fresh scope for `unit`, chained to `dependency_loader`.
    ///
    /// # Arguments
    /// * `unit` - The class the scope is rooted at
    /// * `dependency_loader` - The shared dependency scope used as parent
    ///
    /// # Errors
    /// Returns [`crate::Error::LoaderConstruction`] if the unit's package root cannot be
    /// derived from its path - an internal invariant violation, since units are
    /// discovered under the package root in the first place.
    pub fn resolve(
        unit: &ClassUnit,
        dependency_loader: Arc<dyn ResourceLoader>,
    ) -> Result<ScopedLoader> {
        let root = unit.package_root_dir()?;
        Ok(ScopedLoader::new(root, dependency_loader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{loader::ClasspathLoader, test::ClassFileBuilder};

    #[test]
    fn resolves_fresh_scope_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("com/example");
        std::fs::create_dir_all(&class_dir).unwrap();
        let path = class_dir.join("Foo.class");
        std::fs::write(&path, ClassFileBuilder::new("com/example/Foo").build()).unwrap();

        let deps: Arc<dyn ResourceLoader> = Arc::new(ClasspathLoader::new(Vec::new()));
        let unit = ClassUnit::from_path(&path, Arc::clone(&deps)).unwrap();

        let first = ClassLoaderResolver::resolve(&unit, Arc::clone(&deps)).unwrap();
        let second = ClassLoaderResolver::resolve(&unit, deps).unwrap();

        assert_eq!(first.root(), dir.path());
        assert_eq!(second.root(), dir.path());
    }
}
