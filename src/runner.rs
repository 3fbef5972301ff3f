//! The build-step driver tying discovery, agents and the pipeline together.
//!
//! This is the thin outer layer a build integration calls once per module: it checks the
//! guard conditions, assembles the dependency scope, instantiates the configured agents
//! (eagerly, before any file is touched), discovers the class files and hands everything
//! to the [`crate::pipeline::TransformationPipeline`].
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use classweave::{AgentRegistry, InstrumentationConfig, InstrumentationRunner};
//! use std::path::PathBuf;
//!
//! let mut registry = AgentRegistry::new();
//! // ... register agents ...
//!
//! let config = InstrumentationConfig {
//!     output_directory: PathBuf::from("target/classes"),
//!     classpath_elements: vec![PathBuf::from("deps/classes")],
//!     agents: vec!["com.example.TimerAgent".to_string()],
//! };
//!
//! InstrumentationRunner::new(config, registry).execute()?;
//! # Ok::<(), classweave::Error>(())
//! ```

use std::{path::PathBuf, sync::Arc};

use crate::{
    agent::AgentRegistry,
    loader::{ClasspathLoader, ResourceLoader},
    locator::ClassFileLocator,
    pipeline::TransformationPipeline,
    unit::ClassUnit,
    Result,
};

/// Configuration of one instrumentation run.
pub struct InstrumentationConfig {
    /// The compiled output directory to instrument
    pub output_directory: PathBuf,
    /// Dependency classpath entries; the output directory itself is filtered out
    pub classpath_elements: Vec<PathBuf>,
    /// Fully qualified agent names, applied in this order to every class
    pub agents: Vec<String>,
}

/// Executes one instrumentation run over a compiled output directory.
pub struct InstrumentationRunner {
    config: InstrumentationConfig,
    registry: AgentRegistry,
}

impl InstrumentationRunner {
    /// Create a runner for `config`, resolving agent names against `registry`.
    #[must_use]
    pub fn new(config: InstrumentationConfig, registry: AgentRegistry) -> InstrumentationRunner {
        InstrumentationRunner { config, registry }
    }

    /// Run the instrumentation step.
    ///
    /// An absent output directory is a no-op: nothing was compiled, so there is nothing
    /// to instrument. Agent configuration errors surface before any class file has been
    /// read or modified.
    ///
    /// # Errors
    /// Propagates agent configuration errors, unit construction errors and
    /// [`crate::Error::Transformation`] from the pipeline. Any error means the run is
    /// incomplete and the output must not be shipped.
    pub fn execute(&self) -> Result<()> {
        let output_directory = &self.config.output_directory;
        tracing::info!(
            "Starting instrumentation of <{}>",
            output_directory.display()
        );

        if !output_directory.is_dir() {
            tracing::info!(
                "Canceling since {} does not exist",
                output_directory.display()
            );
            return Ok(());
        }

        let agents = self.registry.instantiate_all(&self.config.agents)?;

        let dependency_loader: Arc<dyn ResourceLoader> =
            Arc::new(ClasspathLoader::with_output_filtered(
                self.config.classpath_elements.clone(),
                output_directory,
            ));

        let class_files = ClassFileLocator::find_classes(output_directory)?;
        let mut units = Vec::with_capacity(class_files.len());
        for path in &class_files {
            units.push(ClassUnit::from_path(path, Arc::clone(&dependency_loader))?);
        }

        TransformationPipeline::new(dependency_loader).run(&mut units, &agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::ClassFileBuilder;

    #[test]
    fn missing_output_directory_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstrumentationConfig {
            output_directory: dir.path().join("never-compiled"),
            classpath_elements: Vec::new(),
            agents: vec!["com.example.NotEvenRegistered".to_string()],
        };

        // The guard fires before agent instantiation, matching the original lifecycle
        InstrumentationRunner::new(config, AgentRegistry::new())
            .execute()
            .unwrap();
    }

    #[test]
    fn unresolvable_agent_leaves_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("com/example");
        std::fs::create_dir_all(&class_dir).unwrap();
        let path = class_dir.join("Foo.class");
        let original = ClassFileBuilder::new("com/example/Foo").build();
        std::fs::write(&path, &original).unwrap();

        let config = InstrumentationConfig {
            output_directory: dir.path().to_path_buf(),
            classpath_elements: Vec::new(),
            agents: vec!["com.example.Missing".to_string()],
        };

        let error = InstrumentationRunner::new(config, AgentRegistry::new())
            .execute()
            .unwrap_err();
        assert!(matches!(error, crate::Error::AgentNotFound(_)));
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }
}
