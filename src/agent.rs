//! Transformation agents and their registry.
//!
//! Agents are the externally supplied logic of the whole system: each one receives a
//! class through the fixed five-argument transform contract and may return replacement
//! bytes. This module defines that contract ([`crate::agent::ClassTransformer`]) and the
//! construction side ([`crate::agent::AgentRegistry`]): a registration table mapping
//! fully qualified agent names to zero-argument factories, consulted eagerly before any
//! class file is touched.
//!
//! # The Registry Contract
//!
//! A registered factory produces an opaque component (`Box<dyn Any>`); instantiation
//! checks that the component actually is a boxed [`crate::agent::ClassTransformer`].
//! This keeps the three configuration failure modes distinct and user-diagnosable:
//!
//! - name not registered → [`crate::Error::AgentNotFound`]
//! - factory raised → [`crate::Error::AgentInstantiation`]
//! - component is not a transformer → [`crate::Error::AgentContract`]
//!
//! # Usage Examples
//!
//! ```rust
//! use classweave::agent::{AgentRegistry, ClassTransformer, TransformOutcome};
//! use classweave::loader::{LoadedClass, ProtectionContext, ScopedLoader};
//!
//! #[derive(Default)]
//! struct NopAgent;
//!
//! impl ClassTransformer for NopAgent {
//!     fn transform(
//!         &self,
//!         _loader: &ScopedLoader,
//!         _class_name: &str,
//!         _class_being_redefined: &LoadedClass,
//!         _protection: &ProtectionContext,
//!         _class_bytes: &[u8],
//!     ) -> TransformOutcome {
//!         Ok(None)
//!     }
//! }
//!
//! let mut registry = AgentRegistry::new();
//! registry.register::<NopAgent>("com.example.NopAgent");
//!
//! let agents = registry.instantiate_all(&["com.example.NopAgent".to_string()])?;
//! assert_eq!(agents[0].name(), "com.example.NopAgent");
//! # Ok::<(), classweave::Error>(())
//! ```

use std::{any::Any, collections::HashMap};

use crate::{
    loader::{LoadedClass, ProtectionContext, ScopedLoader},
    Error, Result,
};

/// Error type agents may raise; opaque to the pipeline, preserved as the cause of the
/// wrapping [`crate::Error::Transformation`].
pub type AgentError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one transform invocation: `Ok(None)` means no replacement, `Ok(Some(bytes))`
/// is a complete replacement class file.
pub type TransformOutcome = std::result::Result<Option<Vec<u8>>, AgentError>;

/// The fixed transform contract every agent satisfies.
///
/// One invocation per (class, agent) pair per run. Arguments match the standard
/// class-transform signature: the defining loader, the internal (slash-separated) class
/// name, the class object being redefined, its protection context, and the class's
/// current bytes.
///
/// Implementations must treat the invocation as their only look at the class: the
/// pipeline never calls the same agent twice for the same unit in one run.
pub trait ClassTransformer {
    /// Inspect `class_bytes` and return a replacement, or `None` to leave the class
    /// untouched.
    ///
    /// # Errors
    /// Any error aborts the entire transformation run; it is surfaced with the class and
    /// agent identity attached.
    fn transform(
        &self,
        loader: &ScopedLoader,
        class_name: &str,
        class_being_redefined: &LoadedClass,
        protection: &ProtectionContext,
        class_bytes: &[u8],
    ) -> TransformOutcome;
}

/// Factory producing one opaque component per call.
pub type ComponentFactory =
    Box<dyn Fn() -> std::result::Result<Box<dyn Any>, AgentError> + Send + Sync>;

/// An instantiated agent together with the name it was configured under.
///
/// The configured name travels with the instance so pipeline failures can name the
/// responsible agent.
pub struct AgentHandle {
    name: String,
    transformer: Box<dyn ClassTransformer>,
}

impl AgentHandle {
    /// The fully qualified name this agent was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The agent instance.
    #[must_use]
    pub fn transformer(&self) -> &dyn ClassTransformer {
        self.transformer.as_ref()
    }
}

/// Registration table resolving fully qualified agent names to instances.
///
/// The table replaces runtime type lookup by name: agents are registered explicitly
/// (or through a dynamic-loading layer that feeds the same table) and constructed
/// through zero-argument factories.
#[derive(Default)]
pub struct AgentRegistry {
    factories: HashMap<String, ComponentFactory>,
}

impl AgentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> AgentRegistry {
        AgentRegistry::default()
    }

    /// Register a transformer type constructible via [`Default`].
    ///
    /// # Arguments
    /// * `name` - The fully qualified name configurations refer to this agent by
    pub fn register<T>(&mut self, name: &str)
    where
        T: ClassTransformer + Default + 'static,
    {
        self.register_constructor(name, || Ok(T::default()));
    }

    /// Register a transformer with a fallible constructor.
    ///
    /// # Arguments
    /// * `name` - The fully qualified name configurations refer to this agent by
    /// * `constructor` - Zero-argument constructor; an `Err` surfaces as
    ///   [`crate::Error::AgentInstantiation`]
    pub fn register_constructor<T, F>(&mut self, name: &str, constructor: F)
    where
        T: ClassTransformer + 'static,
        F: Fn() -> std::result::Result<T, AgentError> + Send + Sync + 'static,
    {
        self.register_component(
            name,
            Box::new(move || {
                let transformer: Box<dyn ClassTransformer> = Box::new(constructor()?);
                Ok(Box::new(transformer))
            }),
        );
    }

    /// Register a raw component factory.
    ///
    /// This is the escape hatch for dynamically discovered components of any kind; only
    /// components that turn out to be boxed [`crate::agent::ClassTransformer`]s pass
    /// instantiation, everything else is a contract violation.
    pub fn register_component(&mut self, name: &str, factory: ComponentFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Construct the agent registered under `name`.
    ///
    /// # Errors
    /// - [`crate::Error::AgentNotFound`] if the name is not registered
    /// - [`crate::Error::AgentInstantiation`] if the factory raises
    /// - [`crate::Error::AgentContract`] if the component is not a transformer
    pub fn instantiate(&self, name: &str) -> Result<AgentHandle> {
        let Some(factory) = self.factories.get(name) else {
            return Err(Error::AgentNotFound(name.to_string()));
        };

        let component = factory().map_err(|source| Error::AgentInstantiation {
            agent: name.to_string(),
            source,
        })?;

        let Ok(transformer) = component.downcast::<Box<dyn ClassTransformer>>() else {
            return Err(Error::AgentContract(name.to_string()));
        };

        Ok(AgentHandle {
            name: name.to_string(),
            transformer: *transformer,
        })
    }

    /// Construct every named agent, in configuration order.
    ///
    /// All agents are instantiated before any class is processed, so a configuration
    /// error is reported before any file is modified.
    ///
    /// # Errors
    /// Propagates the first instantiation failure.
    pub fn instantiate_all(&self, names: &[String]) -> Result<Vec<AgentHandle>> {
        let mut agents = Vec::with_capacity(names.len());
        for name in names {
            agents.push(self.instantiate(name)?);
        }

        Ok(agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NopAgent;

    impl ClassTransformer for NopAgent {
        fn transform(
            &self,
            _loader: &ScopedLoader,
            _class_name: &str,
            _class_being_redefined: &LoadedClass,
            _protection: &ProtectionContext,
            _class_bytes: &[u8],
        ) -> TransformOutcome {
            Ok(None)
        }
    }

    #[test]
    fn instantiate_registered_agent() {
        let mut registry = AgentRegistry::new();
        registry.register::<NopAgent>("com.example.Nop");

        let handle = registry.instantiate("com.example.Nop").unwrap();
        assert_eq!(handle.name(), "com.example.Nop");
    }

    #[test]
    fn unknown_name_is_not_found() {
        let registry = AgentRegistry::new();
        assert!(matches!(
            registry.instantiate("com.example.Missing"),
            Err(Error::AgentNotFound(name)) if name == "com.example.Missing"
        ));
    }

    #[test]
    fn failing_constructor_is_instantiation_error() {
        let mut registry = AgentRegistry::new();
        registry.register_constructor("com.example.Broken", || {
            Err::<NopAgent, AgentError>("missing runtime configuration".into())
        });

        assert!(matches!(
            registry.instantiate("com.example.Broken"),
            Err(Error::AgentInstantiation { agent, .. }) if agent == "com.example.Broken"
        ));
    }

    #[test]
    fn non_transformer_component_violates_contract() {
        let mut registry = AgentRegistry::new();
        registry.register_component(
            "com.example.NotAnAgent",
            Box::new(|| Ok(Box::new(42_u32) as Box<dyn Any>)),
        );

        assert!(matches!(
            registry.instantiate("com.example.NotAnAgent"),
            Err(Error::AgentContract(name)) if name == "com.example.NotAnAgent"
        ));
    }

    #[test]
    fn instantiate_all_preserves_order_and_fails_fast() {
        let mut registry = AgentRegistry::new();
        registry.register::<NopAgent>("a.First");
        registry.register::<NopAgent>("b.Second");

        let agents = registry
            .instantiate_all(&["b.Second".to_string(), "a.First".to_string()])
            .unwrap();
        assert_eq!(agents[0].name(), "b.Second");
        assert_eq!(agents[1].name(), "a.First");

        assert!(registry
            .instantiate_all(&["a.First".to_string(), "c.Missing".to_string()])
            .is_err());
    }
}
