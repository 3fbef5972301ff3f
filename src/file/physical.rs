//! Physical file backend for memory-mapped I/O.
//!
//! This module provides the [`crate::file::physical::Physical`] backend that implements the
//! [`crate::file::Backend`] trait for accessing class files from disk using memory-mapped
//! I/O. Compiled output directories can hold thousands of class files; mapping them avoids
//! copying each file into an intermediate buffer before parsing.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use classweave::file::{physical::Physical, Backend};
//! use std::path::Path;
//!
//! let physical = Physical::new(Path::new("target/classes/com/example/Foo.class"))?;
//! assert_eq!(physical.data_slice(0, 4)?, &[0xCA, 0xFE, 0xBA, 0xBE]);
//! # Ok::<(), classweave::Error>(())
//! ```

use super::Backend;
use crate::{Error, Error::OutOfBounds, Result};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A file backend that uses memory-mapped I/O for access to class files on disk.
///
/// [`crate::file::physical::Physical`] maps the file directly into the process's virtual
/// address space; the operating system pages data in on demand. All access operations
/// include bounds checking to ensure memory safety against truncated files.
#[derive(Debug)]
pub struct Physical {
    mmap: Mmap,
}

impl Physical {
    /// Create a new physical backend by mapping the file at `path`.
    ///
    /// # Arguments
    /// * `path` - The file to map
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] carrying `path` if the file cannot be opened or mapped.
    pub fn new(path: &Path) -> Result<Physical> {
        let file = fs::File::open(path).map_err(|error| Error::io(path, error))?;

        let mmap = unsafe { Mmap::map(&file) }.map_err(|error| Error::io(path, error))?;

        Ok(Physical { mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(OutOfBounds);
        };

        if offset_end > self.mmap.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.mmap[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        &self.mmap
    }

    fn len(&self) -> usize {
        self.mmap.len()
    }
}
