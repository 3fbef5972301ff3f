//! The sequential transformation pipeline.
//!
//! The pipeline is a deterministic double loop: every discovered class unit, in
//! discovery order, is handed to every agent, in configuration order. Each (unit, agent)
//! invocation gets a fresh scoped loader and sees the unit's current byte image -
//! including any replacement an earlier agent in the chain produced, because accepted
//! replacements are written through to disk and to the unit before the next agent runs.
//!
//! There is no partial-success mode: the first failure anywhere aborts the whole run,
//! wrapped with the identity of the class and agent involved. Replacements already
//! written through before the failure stay on disk; units after the failure point are
//! never touched.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use classweave::{
//!     loader::ClasspathLoader, AgentRegistry, ClassUnit, TransformationPipeline,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn agents() -> classweave::AgentRegistry { classweave::AgentRegistry::new() }
//! let deps = Arc::new(ClasspathLoader::new(Vec::new()));
//! let mut units = vec![ClassUnit::from_path(
//!     Path::new("target/classes/com/example/Foo.class"),
//!     Arc::clone(&deps) as _,
//! )?];
//! let agents = agents().instantiate_all(&["com.example.TimerAgent".to_string()])?;
//!
//! TransformationPipeline::new(deps).run(&mut units, &agents)?;
//! # Ok::<(), classweave::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    agent::AgentHandle,
    loader::{ClassLoaderResolver, ResourceLoader},
    unit::ClassUnit,
    Error, Result,
};

/// Applies an ordered sequence of agents to an ordered sequence of class units.
pub struct TransformationPipeline {
    dependency_loader: Arc<dyn ResourceLoader>,
}

impl TransformationPipeline {
    /// Create a pipeline resolving against `dependency_loader`.
    ///
    /// # Arguments
    /// * `dependency_loader` - The shared dependency scope every scoped loader chains to
    #[must_use]
    pub fn new(dependency_loader: Arc<dyn ResourceLoader>) -> TransformationPipeline {
        TransformationPipeline { dependency_loader }
    }

    /// Run every agent over every unit.
    ///
    /// Completion without error is the only success outcome.
    ///
    /// # Arguments
    /// * `units` - Class units in discovery order; mutated as replacements land
    /// * `agents` - Instantiated agents in configuration order
    ///
    /// # Errors
    /// Returns [`crate::Error::Transformation`] wrapping the first failure, carrying the
    /// class and agent identity. The run stops at that point.
    pub fn run(&self, units: &mut [ClassUnit], agents: &[AgentHandle]) -> Result<()> {
        tracing::info!(
            "Transforming {} class(es) with {} agent(s)",
            units.len(),
            agents.len()
        );

        for unit in units.iter_mut() {
            let class = unit.qualified_name();
            for agent in agents {
                tracing::debug!("Applying agent <{}> to <{}>", agent.name(), class);

                if let Err(source) = self.apply(unit, agent) {
                    return Err(Error::Transformation {
                        class: class.clone(),
                        agent: agent.name().to_string(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// One (unit, agent) invocation: fresh scope, materialize, invoke, write through.
    fn apply(
        &self,
        unit: &mut ClassUnit,
        agent: &AgentHandle,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let loader = ClassLoaderResolver::resolve(unit, Arc::clone(&self.dependency_loader))?;
        let loaded = unit.materialize(loader)?;

        let class_bytes = unit.current_bytes().to_vec();
        let replacement = agent.transformer().transform(
            loaded.loader(),
            unit.internal_name(),
            &loaded,
            loaded.protection(),
            &class_bytes,
        )?;

        if let Some(bytes) = replacement {
            tracing::debug!(
                "Agent <{}> replaced {} byte(s) of <{}>",
                agent.name(),
                bytes.len(),
                unit.internal_name()
            );
            unit.overwrite(&bytes)?;
        }

        Ok(())
    }
}
