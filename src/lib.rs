// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # classweave
//!
//! A build-time instrumentation framework for JVM class files. `classweave` walks a
//! compiled output directory, loads each class file into a structural model, hands it to
//! an ordered chain of transformation agents through the standard class-transform
//! contract, and writes accepted replacements back in place.
//!
//! ## Features
//!
//! - **Structural class file model** - Parse and re-serialize the full class file format
//!   with a byte-exact round-trip guarantee
//! - **Scoped class loaders** - Every agent invocation gets a fresh two-level resolution
//!   scope: the class's own package root first, the shared dependency classpath second
//! - **Write-through chaining** - Replacements land on disk before the next agent runs,
//!   so composed agents observe each other's output
//! - **Pre-flight agent instantiation** - Configuration errors surface before any file
//!   is modified
//! - **All-or-nothing runs** - The first failure aborts the run with the class and agent
//!   identity attached; there is no partial-success mode
//!
//! ## Quick Start
//!
//! Add `classweave` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! classweave = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust,no_run
//! use classweave::prelude::*;
//! use std::path::PathBuf;
//!
//! let registry = AgentRegistry::new();
//! // ... register agents ...
//!
//! let config = InstrumentationConfig {
//!     output_directory: PathBuf::from("target/classes"),
//!     classpath_elements: vec![PathBuf::from("deps/classes")],
//!     agents: vec!["com.example.TimerAgent".to_string()],
//! };
//! InstrumentationRunner::new(config, registry).execute()?;
//! # Ok::<(), classweave::Error>(())
//! ```
//!
//! ### Inspecting a Class File
//!
//! ```rust,no_run
//! use classweave::classfile::ClassModel;
//!
//! let data = std::fs::read("target/classes/com/example/Foo.class")?;
//! let model = ClassModel::parse(&data)?;
//!
//! println!("class {}", model.qualified_name());
//! println!("  {} field(s), {} method(s)", model.fields().len(), model.methods().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! `classweave` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`file`] - Byte-level access: memory-mapped files and the bounds-checked [`Parser`]
//! - [`classfile`] - The structural class file model and constant pool
//! - [`loader`] - Layered resolution scopes and the loadable class object
//! - [`unit`] - The per-class transformation unit
//! - [`agent`] - The transform contract and the agent registry
//! - [`pipeline`] - The sequential transformation pipeline
//! - [`locator`] / [`runner`] - Discovery and the build-step driver
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with comprehensive error
//! information:
//!
//! ```rust,no_run
//! use classweave::{classfile::ClassModel, Error};
//!
//! # let data: Vec<u8> = Vec::new();
//! match ClassModel::parse(&data) {
//!     Ok(model) => println!("parsed {}", model.class_name()),
//!     Err(Error::NotSupported) => println!("class file version not supported"),
//!     Err(Error::Malformed { message, .. }) => println!("malformed class file: {}", message),
//!     Err(e) => println!("other error: {}", e),
//! }
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the classweave library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust,no_run
/// use classweave::prelude::*;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let deps = Arc::new(ClasspathLoader::new(Vec::new()));
/// let unit = ClassUnit::from_path(Path::new("Foo.class"), deps)?;
/// println!("{}", unit.qualified_name());
/// # Ok::<(), classweave::Error>(())
/// ```
pub mod prelude;

/// Transformation agents: the transform contract and the agent registry.
///
/// This module defines the fixed five-argument contract agents satisfy
/// ([`agent::ClassTransformer`]) and the reflection-free construction side
/// ([`agent::AgentRegistry`]), which maps fully qualified agent names to zero-argument
/// factories and is consulted eagerly before any class file is touched.
pub mod agent;

/// Structural model of compiled class files.
///
/// Parsing and serialization of the class file format: header, constant pool, access
/// flags, members and attributes, with a byte-exact round-trip guarantee.
///
/// # Key Types
///
/// - [`classfile::ClassModel`] - The parsed model of one class file
/// - [`classfile::ConstantPool`] - Typed access to the constant pool
/// - [`classfile::ClassAccessFlags`] - Class-level access flags
pub mod classfile;

/// File loading and byte-level access.
///
/// Memory-mapped and in-memory buffers behind the [`file::File`] type, the
/// [`file::Backend`] storage trait, and the bounds-checked big-endian
/// [`file::parser::Parser`].
pub mod file;

/// Layered class resolution scopes.
///
/// The dependency classpath capability ([`loader::ResourceLoader`]), the provided
/// directory implementation ([`loader::ClasspathLoader`]), the transient per-invocation
/// scope ([`loader::ScopedLoader`]), and the loadable class object
/// ([`loader::LoadedClass`]).
pub mod loader;

/// Discovery of compiled class files under an output directory.
pub mod locator;

/// The sequential transformation pipeline.
///
/// Applies every agent to every unit in deterministic order with per-agent
/// write-through and abort-on-first-failure semantics.
pub mod pipeline;

/// The build-step driver.
///
/// Guard clauses, classpath assembly, pre-flight agent instantiation, discovery and
/// pipeline execution - the thin layer a build integration calls once per module.
pub mod runner;

/// The per-class transformation unit.
///
/// One [`unit::ClassUnit`] per discovered class file: source path, parse-once structural
/// model, evolving byte image, and the atomic write-back.
pub mod unit;

/// `classweave` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `classweave` Error type
///
/// The main error type for all operations in this crate. Provides detailed error
/// information for class file parsing, loader construction, agent configuration and
/// pipeline execution.
pub use error::Error;

/// The per-class transformation unit.
///
/// See [`unit::ClassUnit`] for construction and the transformation surface.
pub use unit::ClassUnit;

/// The sequential transformation pipeline.
///
/// See [`pipeline::TransformationPipeline`] for the run semantics.
pub use pipeline::TransformationPipeline;

/// The agent registry and the transform contract.
pub use agent::{AgentRegistry, ClassTransformer};

/// The structural class file model.
pub use classfile::ClassModel;

/// The build-step driver and its configuration.
pub use runner::{InstrumentationConfig, InstrumentationRunner};

/// Provides access to low-level file and memory parsing utilities.
///
/// The [`Parser`] type is used for decoding class file structures.
pub use file::{parser::Parser, File};
