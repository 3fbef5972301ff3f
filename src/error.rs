use std::path::PathBuf;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur while parsing compiled class
/// files, constructing class loaders, instantiating transformation agents and running the
/// transformation pipeline. Each variant provides specific context about the failure mode so
/// a build failure can be diagnosed without re-running with extra logging.
///
/// # Error Categories
///
/// ## Class File Parsing Errors
/// - [`Error::Malformed`] - Corrupted or invalid class file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the file
/// - [`Error::NotSupported`] - Unsupported class file version
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O Errors
/// - [`Error::Io`] - Filesystem I/O failures, always carrying the affected path
///
/// ## Loader Errors
/// - [`Error::LoaderConstruction`] - A scoped class loader could not be built
///
/// ## Agent Configuration Errors
/// - [`Error::AgentNotFound`] - Agent name not present in the registry
/// - [`Error::AgentContract`] - Registered component does not satisfy the transform contract
/// - [`Error::AgentInstantiation`] - Agent construction itself failed
///
/// ## Pipeline Errors
/// - [`Error::Transformation`] - An agent raised while transforming a class
///
/// # Examples
///
/// ```rust,no_run
/// use classweave::{ClassUnit, Error};
/// use classweave::loader::ClasspathLoader;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let deps = Arc::new(ClasspathLoader::new(Vec::new()));
/// match ClassUnit::from_path(Path::new("target/classes/com/example/Foo.class"), deps) {
///     Ok(unit) => println!("Loaded {}", unit.qualified_name()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed class file: {} ({}:{})", message, file, line);
///     }
///     Err(Error::Io { path, source }) => {
///         eprintln!("I/O error on {}: {}", path.display(), source);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Class file parsing errors
    /// The class file is damaged and could not be parsed.
    ///
    /// This error indicates that the byte stream does not conform to the class
    /// file format. The error includes the source location where the
    /// malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    ///
    /// This error occurs when trying to read data beyond the end of the byte
    /// stream. It's a safety check to prevent buffer overruns when parsing
    /// truncated class files.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This class file version is not supported.
    ///
    /// Indicates that the input carries a valid magic number but declares a
    /// major version outside the range this library understands.
    #[error("This class file version is not supported")]
    NotSupported,

    /// Provided input was empty.
    ///
    /// This error occurs when an empty file or buffer is provided where
    /// actual class file data was expected.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error on a specific path.
    ///
    /// Wraps standard I/O errors that can occur while reading or overwriting
    /// class files. The affected path is always carried so the failing file
    /// can be identified from the error alone.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file the failed operation was directed at
        path: PathBuf,
        /// The underlying I/O failure
        source: std::io::Error,
    },

    /// A scoped class loader could not be constructed.
    ///
    /// This should not occur for well-formed filesystem paths and is treated
    /// as an internal invariant violation rather than a recoverable
    /// condition.
    #[error("Failed to construct class loader for {}", path.display())]
    LoaderConstruction {
        /// The class file the loader was to be constructed for
        path: PathBuf,
    },

    /// The named transformation agent is not present in the registry.
    ///
    /// Raised during pre-flight instantiation, before any class file has
    /// been touched. The name is carried verbatim so a configuration typo
    /// is visible in the error message.
    #[error("Could not find agent: {0}. Is it registered with the agent registry?")]
    AgentNotFound(String),

    /// The registered component does not satisfy the transform contract.
    ///
    /// The registry resolved the name, but the component it produced is not
    /// a [`crate::agent::ClassTransformer`].
    #[error("{0} is not a class transformation agent")]
    AgentContract(String),

    /// Constructing the transformation agent failed.
    ///
    /// The registry resolved the name to a factory, but the factory itself
    /// raised while producing the agent instance.
    #[error("Failed to instantiate agent: {agent}: {source}")]
    AgentInstantiation {
        /// The configured name of the agent
        agent: String,
        /// The error raised by the agent's factory
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A transformation agent raised while processing a class.
    ///
    /// Wraps the underlying cause together with the identity of the class
    /// and the agent, so a failing transform can be attributed without
    /// re-running the build. Any error of this kind aborts the whole run.
    #[error("Failed to transform class: {class}, using agent: {agent}: {source}")]
    Transformation {
        /// Fully qualified name of the class being transformed
        class: String,
        /// The configured name of the agent that raised
        agent: String,
        /// The underlying cause
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping external library errors with additional context.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Wrap an I/O error together with the path it occurred on.
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Error {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
