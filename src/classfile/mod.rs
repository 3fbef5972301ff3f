//! Structural model of compiled class files.
//!
//! This module implements parsing and serialization of the class file format: the magic
//! and version header, the constant pool, access flags, the class/superclass/interface
//! references, and the field, method and attribute tables. The model is deliberately
//! shallow below the member level - method bodies and debug tables travel as raw
//! attribute payloads, because the transformation pipeline's job is to hand a faithful
//! byte image to external agents, not to interpret bytecode itself.
//!
//! # Key Components
//!
//! - [`crate::classfile::ClassModel`] - The parsed model of one class file
//! - [`crate::classfile::ConstantPool`] / [`crate::classfile::ConstantPoolEntry`] - Pool access
//! - [`crate::classfile::MemberInfo`] / [`crate::classfile::AttributeInfo`] - Members
//! - [`crate::classfile::ClassAccessFlags`] - Class-level access flags
//!
//! # Round-Trip Guarantee
//!
//! For any byte sequence the parser accepts, [`crate::classfile::ClassModel::to_bytes`]
//! reproduces the input byte-for-byte. Raw bit patterns for float literals, raw modified
//! UTF-8 payloads and unassigned flag bits are all preserved to keep that guarantee.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use classweave::classfile::ClassModel;
//!
//! let data = std::fs::read("target/classes/com/example/Foo.class")?;
//! let model = ClassModel::parse(&data)?;
//!
//! assert_eq!(model.class_name(), "com/example/Foo");
//! assert_eq!(model.to_bytes(), data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Reference
//! - [JVMS §4](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html)

pub(crate) mod constantpool;
pub(crate) mod flags;
pub(crate) mod member;

pub use constantpool::{ConstantPool, ConstantPoolEntry, ConstantTag};
pub use flags::ClassAccessFlags;
pub use member::{AttributeInfo, MemberInfo};

use crate::{file::parser::Parser, Result};

/// The magic number every class file starts with.
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// Lowest supported major version (JDK 1.1).
const MAJOR_VERSION_MIN: u16 = 45;
/// Highest supported major version (Java 25).
const MAJOR_VERSION_MAX: u16 = 69;

/// The parsed structural model of one compiled class file.
///
/// `ClassModel` is built exactly once from a byte image and answers the two questions the
/// transformation pipeline has: what is this class called, and what are its canonical
/// bytes. The class name is resolved through the constant pool at parse time, so a model
/// that constructs successfully always has a valid identity.
///
/// # Examples
///
/// ```rust,no_run
/// use classweave::classfile::{ClassAccessFlags, ClassModel};
///
/// let data = std::fs::read("target/classes/com/example/Foo.class")?;
/// let model = ClassModel::parse(&data)?;
/// if model.access_flags().contains(ClassAccessFlags::INTERFACE) {
///     println!("{} is an interface", model.class_name());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClassModel {
    minor_version: u16,
    major_version: u16,
    constant_pool: ConstantPool,
    access_flags: ClassAccessFlags,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberInfo>,
    methods: Vec<MemberInfo>,
    attributes: Vec<AttributeInfo>,
    /// Internal name of `this_class`, resolved once at parse time
    class_name: String,
}

impl ClassModel {
    /// Parse a complete class file from a byte image.
    ///
    /// # Arguments
    /// * `data` - The full contents of one class file
    ///
    /// # Errors
    /// - [`crate::Error::Empty`] if `data` is empty
    /// - [`crate::Error::Malformed`] for a wrong magic number, invalid constant pool
    ///   structure, unresolvable name references, or trailing bytes after the class
    /// - [`crate::Error::NotSupported`] for major versions outside 45..=69
    /// - [`crate::Error::OutOfBounds`] for truncated input
    pub fn parse(data: &[u8]) -> Result<ClassModel> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        let mut parser = Parser::new(data);

        let magic = parser.read_be::<u32>()?;
        if magic != CLASS_MAGIC {
            return Err(malformed_error!(
                "Invalid class file magic: 0x{:08X}",
                magic
            ));
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        if !(MAJOR_VERSION_MIN..=MAJOR_VERSION_MAX).contains(&major_version) {
            return Err(crate::Error::NotSupported);
        }

        let constant_pool = ConstantPool::parse(&mut parser)?;

        let access_flags = ClassAccessFlags::from_bits_retain(parser.read_be::<u16>()?);
        let this_class = parser.read_be::<u16>()?;
        let super_class = parser.read_be::<u16>()?;

        // Resolving the name here validates this_class and gives the model an
        // infallible identity for the rest of its life.
        let class_name = constant_pool.class_name_at(this_class)?.to_string();
        if super_class != 0 {
            constant_pool.class_name_at(super_class)?;
        }

        let interface_count = parser.read_be::<u16>()? as usize;
        let mut interfaces = Vec::with_capacity(interface_count);
        for _ in 0..interface_count {
            let interface = parser.read_be::<u16>()?;
            constant_pool.class_name_at(interface)?;
            interfaces.push(interface);
        }

        let fields = MemberInfo::parse_table(&mut parser)?;
        let methods = MemberInfo::parse_table(&mut parser)?;
        let attributes = AttributeInfo::parse_table(&mut parser)?;

        for member in fields.iter().chain(&methods) {
            constant_pool.utf8_at(member.name_index)?;
            constant_pool.utf8_at(member.descriptor_index)?;
            for attribute in &member.attributes {
                constant_pool.utf8_at(attribute.name_index)?;
            }
        }
        for attribute in &attributes {
            constant_pool.utf8_at(attribute.name_index)?;
        }

        if parser.has_more_data() {
            return Err(malformed_error!(
                "Trailing bytes after class file end at offset {}",
                parser.pos()
            ));
        }

        Ok(ClassModel {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
            class_name,
        })
    }

    /// The internal (slash-separated) name of this class, e.g. `com/example/Foo`.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The dot-separated binary name of this class, e.g. `com.example.Foo`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.class_name.replace('/', ".")
    }

    /// The minor class file version.
    #[must_use]
    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    /// The major class file version.
    #[must_use]
    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    /// The class's constant pool.
    #[must_use]
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    /// Class-level access flags.
    #[must_use]
    pub fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    /// Pool index of the superclass `Class` entry; zero only for `java/lang/Object`
    /// and module-info.
    #[must_use]
    pub fn super_class(&self) -> u16 {
        self.super_class
    }

    /// The internal name of the superclass, if any.
    #[must_use]
    pub fn super_class_name(&self) -> Option<&str> {
        if self.super_class == 0 {
            return None;
        }

        // Validated at parse time
        self.constant_pool.class_name_at(self.super_class).ok()
    }

    /// The class's declared fields.
    #[must_use]
    pub fn fields(&self) -> &[MemberInfo] {
        &self.fields
    }

    /// The class's declared methods.
    #[must_use]
    pub fn methods(&self) -> &[MemberInfo] {
        &self.methods
    }

    /// The class-level attributes.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    /// Serialize the model back to its canonical byte form.
    ///
    /// For a freshly parsed model this reproduces the parser's input byte-for-byte.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(1024);

        buffer.extend_from_slice(&CLASS_MAGIC.to_be_bytes());
        buffer.extend_from_slice(&self.minor_version.to_be_bytes());
        buffer.extend_from_slice(&self.major_version.to_be_bytes());

        self.constant_pool.serialize(&mut buffer);

        buffer.extend_from_slice(&self.access_flags.bits().to_be_bytes());
        buffer.extend_from_slice(&self.this_class.to_be_bytes());
        buffer.extend_from_slice(&self.super_class.to_be_bytes());

        buffer.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            buffer.extend_from_slice(&interface.to_be_bytes());
        }

        MemberInfo::serialize_table(&self.fields, &mut buffer);
        MemberInfo::serialize_table(&self.methods, &mut buffer);
        AttributeInfo::serialize_table(&self.attributes, &mut buffer);

        buffer
    }
}
