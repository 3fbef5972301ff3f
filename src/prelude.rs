//! Convenient re-exports of the most commonly used types and traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use classweave::prelude::*;
//! use std::path::PathBuf;
//!
//! let config = InstrumentationConfig {
//!     output_directory: PathBuf::from("target/classes"),
//!     classpath_elements: Vec::new(),
//!     agents: Vec::new(),
//! };
//! InstrumentationRunner::new(config, AgentRegistry::new()).execute()?;
//! # Ok::<(), classweave::Error>(())
//! ```

pub use crate::{
    agent::{AgentHandle, AgentRegistry, ClassTransformer, TransformOutcome},
    classfile::{ClassAccessFlags, ClassModel, ConstantPool, ConstantPoolEntry},
    file::{parser::Parser, File},
    loader::{
        ClassLoaderResolver, ClasspathLoader, LoadedClass, ProtectionContext, ResourceLoader,
        ScopedLoader,
    },
    locator::ClassFileLocator,
    pipeline::TransformationPipeline,
    runner::{InstrumentationConfig, InstrumentationRunner},
    unit::ClassUnit,
    Error, Result,
};
