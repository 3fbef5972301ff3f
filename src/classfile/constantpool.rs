//! Constant pool parsing for compiled class files.
//!
//! The constant pool is the heart of the class file format: every name, type descriptor,
//! literal and symbolic reference in the class is stored here and addressed by a 1-based
//! index from the surrounding structures. This module exposes the
//! [`crate::classfile::constantpool::ConstantPool`] for safe access, together with the
//! [`crate::classfile::constantpool::ConstantPoolEntry`] variants covering every constant
//! tag defined by the specification.
//!
//! # Reference
//! - [JVMS §4.4](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4)

use strum::FromRepr;

use crate::{file::parser::Parser, Result};

/// The tag byte that introduces each constant pool entry.
///
/// Values are taken verbatim from JVMS Table 4.4-A. Tag 2 and tags 13/14 are unassigned
/// by the specification and are rejected as malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ConstantTag {
    /// `CONSTANT_Utf8` - raw modified UTF-8 string data
    Utf8 = 1,
    /// `CONSTANT_Integer` - 32-bit integer literal
    Integer = 3,
    /// `CONSTANT_Float` - 32-bit IEEE-754 literal
    Float = 4,
    /// `CONSTANT_Long` - 64-bit integer literal, occupies two pool slots
    Long = 5,
    /// `CONSTANT_Double` - 64-bit IEEE-754 literal, occupies two pool slots
    Double = 6,
    /// `CONSTANT_Class` - symbolic class or interface reference
    Class = 7,
    /// `CONSTANT_String` - string literal reference
    String = 8,
    /// `CONSTANT_Fieldref` - symbolic field reference
    FieldRef = 9,
    /// `CONSTANT_Methodref` - symbolic method reference
    MethodRef = 10,
    /// `CONSTANT_InterfaceMethodref` - symbolic interface method reference
    InterfaceMethodRef = 11,
    /// `CONSTANT_NameAndType` - name and descriptor pair
    NameAndType = 12,
    /// `CONSTANT_MethodHandle` - method handle for invokedynamic support
    MethodHandle = 15,
    /// `CONSTANT_MethodType` - method descriptor reference
    MethodType = 16,
    /// `CONSTANT_Dynamic` - dynamically computed constant
    Dynamic = 17,
    /// `CONSTANT_InvokeDynamic` - dynamically computed call site
    InvokeDynamic = 18,
    /// `CONSTANT_Module` - module reference
    Module = 19,
    /// `CONSTANT_Package` - package reference
    Package = 20,
}

/// One parsed constant pool entry.
///
/// Numeric literals keep their raw bit patterns (`Float`/`Double` as `u32`/`u64`) and
/// `Utf8` keeps its raw modified UTF-8 payload, so serialization reproduces the original
/// bytes exactly even for NaN payloads or string data outside the UTF-8 subset this
/// library decodes.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolEntry {
    /// Raw modified UTF-8 payload of a `CONSTANT_Utf8` entry
    Utf8(Vec<u8>),
    /// 32-bit integer literal
    Integer(i32),
    /// Bit pattern of a 32-bit float literal
    Float(u32),
    /// 64-bit integer literal
    Long(i64),
    /// Bit pattern of a 64-bit double literal
    Double(u64),
    /// Symbolic class reference; `name_index` addresses a `Utf8` entry
    Class {
        /// Pool index of the internal (slash-separated) class name
        name_index: u16,
    },
    /// String literal; `string_index` addresses a `Utf8` entry
    String {
        /// Pool index of the literal's character data
        string_index: u16,
    },
    /// Symbolic field reference
    FieldRef {
        /// Pool index of the declaring `Class` entry
        class_index: u16,
        /// Pool index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Symbolic method reference
    MethodRef {
        /// Pool index of the declaring `Class` entry
        class_index: u16,
        /// Pool index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Symbolic interface method reference
    InterfaceMethodRef {
        /// Pool index of the declaring `Class` entry
        class_index: u16,
        /// Pool index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Name and descriptor pair
    NameAndType {
        /// Pool index of the member name
        name_index: u16,
        /// Pool index of the member descriptor
        descriptor_index: u16,
    },
    /// Method handle
    MethodHandle {
        /// The kind of this handle (1-9, JVMS §4.4.8)
        reference_kind: u8,
        /// Pool index of the referenced member
        reference_index: u16,
    },
    /// Method type
    MethodType {
        /// Pool index of the method descriptor
        descriptor_index: u16,
    },
    /// Dynamically computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Pool index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Dynamically computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Pool index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Module reference
    Module {
        /// Pool index of the module name
        name_index: u16,
    },
    /// Package reference
    Package {
        /// Pool index of the package name
        name_index: u16,
    },
}

impl ConstantPoolEntry {
    /// Returns `true` for entries that occupy two pool slots (`Long` and `Double`).
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(
            self,
            ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_)
        )
    }

    fn parse(parser: &mut Parser) -> Result<ConstantPoolEntry> {
        let tag_byte = parser.read_be::<u8>()?;
        let Some(tag) = ConstantTag::from_repr(tag_byte) else {
            return Err(malformed_error!(
                "Invalid constant pool tag: {}",
                tag_byte
            ));
        };

        let entry = match tag {
            ConstantTag::Utf8 => {
                let length = parser.read_be::<u16>()? as usize;
                ConstantPoolEntry::Utf8(parser.read_bytes(length)?.to_vec())
            }
            ConstantTag::Integer => ConstantPoolEntry::Integer(parser.read_be::<i32>()?),
            ConstantTag::Float => ConstantPoolEntry::Float(parser.read_be::<u32>()?),
            ConstantTag::Long => ConstantPoolEntry::Long(parser.read_be::<i64>()?),
            ConstantTag::Double => ConstantPoolEntry::Double(parser.read_be::<u64>()?),
            ConstantTag::Class => ConstantPoolEntry::Class {
                name_index: parser.read_be::<u16>()?,
            },
            ConstantTag::String => ConstantPoolEntry::String {
                string_index: parser.read_be::<u16>()?,
            },
            ConstantTag::FieldRef => ConstantPoolEntry::FieldRef {
                class_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::MethodRef => ConstantPoolEntry::MethodRef {
                class_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::InterfaceMethodRef => ConstantPoolEntry::InterfaceMethodRef {
                class_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::NameAndType => ConstantPoolEntry::NameAndType {
                name_index: parser.read_be::<u16>()?,
                descriptor_index: parser.read_be::<u16>()?,
            },
            ConstantTag::MethodHandle => {
                let reference_kind = parser.read_be::<u8>()?;
                if !(1..=9).contains(&reference_kind) {
                    return Err(malformed_error!(
                        "Invalid method handle kind: {}",
                        reference_kind
                    ));
                }
                ConstantPoolEntry::MethodHandle {
                    reference_kind,
                    reference_index: parser.read_be::<u16>()?,
                }
            }
            ConstantTag::MethodType => ConstantPoolEntry::MethodType {
                descriptor_index: parser.read_be::<u16>()?,
            },
            ConstantTag::Dynamic => ConstantPoolEntry::Dynamic {
                bootstrap_method_attr_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::InvokeDynamic => ConstantPoolEntry::InvokeDynamic {
                bootstrap_method_attr_index: parser.read_be::<u16>()?,
                name_and_type_index: parser.read_be::<u16>()?,
            },
            ConstantTag::Module => ConstantPoolEntry::Module {
                name_index: parser.read_be::<u16>()?,
            },
            ConstantTag::Package => ConstantPoolEntry::Package {
                name_index: parser.read_be::<u16>()?,
            },
        };

        Ok(entry)
    }

    fn serialize(&self, buffer: &mut Vec<u8>) {
        match self {
            ConstantPoolEntry::Utf8(data) => {
                buffer.push(ConstantTag::Utf8 as u8);
                buffer.extend_from_slice(&(data.len() as u16).to_be_bytes());
                buffer.extend_from_slice(data);
            }
            ConstantPoolEntry::Integer(value) => {
                buffer.push(ConstantTag::Integer as u8);
                buffer.extend_from_slice(&value.to_be_bytes());
            }
            ConstantPoolEntry::Float(bits) => {
                buffer.push(ConstantTag::Float as u8);
                buffer.extend_from_slice(&bits.to_be_bytes());
            }
            ConstantPoolEntry::Long(value) => {
                buffer.push(ConstantTag::Long as u8);
                buffer.extend_from_slice(&value.to_be_bytes());
            }
            ConstantPoolEntry::Double(bits) => {
                buffer.push(ConstantTag::Double as u8);
                buffer.extend_from_slice(&bits.to_be_bytes());
            }
            ConstantPoolEntry::Class { name_index } => {
                buffer.push(ConstantTag::Class as u8);
                buffer.extend_from_slice(&name_index.to_be_bytes());
            }
            ConstantPoolEntry::String { string_index } => {
                buffer.push(ConstantTag::String as u8);
                buffer.extend_from_slice(&string_index.to_be_bytes());
            }
            ConstantPoolEntry::FieldRef {
                class_index,
                name_and_type_index,
            } => {
                buffer.push(ConstantTag::FieldRef as u8);
                buffer.extend_from_slice(&class_index.to_be_bytes());
                buffer.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            ConstantPoolEntry::MethodRef {
                class_index,
                name_and_type_index,
            } => {
                buffer.push(ConstantTag::MethodRef as u8);
                buffer.extend_from_slice(&class_index.to_be_bytes());
                buffer.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            ConstantPoolEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => {
                buffer.push(ConstantTag::InterfaceMethodRef as u8);
                buffer.extend_from_slice(&class_index.to_be_bytes());
                buffer.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            ConstantPoolEntry::NameAndType {
                name_index,
                descriptor_index,
            } => {
                buffer.push(ConstantTag::NameAndType as u8);
                buffer.extend_from_slice(&name_index.to_be_bytes());
                buffer.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            ConstantPoolEntry::MethodHandle {
                reference_kind,
                reference_index,
            } => {
                buffer.push(ConstantTag::MethodHandle as u8);
                buffer.push(*reference_kind);
                buffer.extend_from_slice(&reference_index.to_be_bytes());
            }
            ConstantPoolEntry::MethodType { descriptor_index } => {
                buffer.push(ConstantTag::MethodType as u8);
                buffer.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            ConstantPoolEntry::Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => {
                buffer.push(ConstantTag::Dynamic as u8);
                buffer.extend_from_slice(&bootstrap_method_attr_index.to_be_bytes());
                buffer.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            ConstantPoolEntry::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => {
                buffer.push(ConstantTag::InvokeDynamic as u8);
                buffer.extend_from_slice(&bootstrap_method_attr_index.to_be_bytes());
                buffer.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            ConstantPoolEntry::Module { name_index } => {
                buffer.push(ConstantTag::Module as u8);
                buffer.extend_from_slice(&name_index.to_be_bytes());
            }
            ConstantPoolEntry::Package { name_index } => {
                buffer.push(ConstantTag::Package as u8);
                buffer.extend_from_slice(&name_index.to_be_bytes());
            }
        }
    }
}

/// The parsed constant pool of one class file.
///
/// Entries are addressed with the format's 1-based indices; index 0 is never valid, and
/// the slot following a `Long` or `Double` entry is a phantom slot that cannot be
/// addressed either. Both resolve to an error rather than a panic.
///
/// # Examples
///
/// ```rust
/// use classweave::classfile::ConstantPool;
/// use classweave::Parser;
///
/// // count = 3: one Utf8 "Foo" and one Class pointing at it
/// let data = [0x00, 0x03, 0x01, 0x00, 0x03, b'F', b'o', b'o', 0x07, 0x00, 0x01];
/// let pool = ConstantPool::parse(&mut Parser::new(&data))?;
///
/// assert_eq!(pool.utf8_at(1)?, "Foo");
/// assert_eq!(pool.class_name_at(2)?, "Foo");
/// # Ok::<(), classweave::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    /// Slot 0 and the slot after each wide entry hold `None`
    entries: Vec<Option<ConstantPoolEntry>>,
}

impl ConstantPool {
    /// Parse the constant pool from the current parser position.
    ///
    /// Reads the `constant_pool_count` and the `count - 1` slots that follow, honoring
    /// the double-slot rule for `Long` and `Double` entries.
    ///
    /// # Arguments
    /// * `parser` - Positioned at `constant_pool_count`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for unknown tags or a zero count, and
    /// [`crate::Error::OutOfBounds`] for truncated entries.
    pub fn parse(parser: &mut Parser) -> Result<ConstantPool> {
        let count = parser.read_be::<u16>()? as usize;
        if count == 0 {
            return Err(malformed_error!("Constant pool count cannot be zero"));
        }

        let mut entries: Vec<Option<ConstantPoolEntry>> = Vec::with_capacity(count);
        entries.push(None);

        while entries.len() < count {
            let entry = ConstantPoolEntry::parse(parser)?;
            let is_wide = entry.is_wide();

            entries.push(Some(entry));
            if is_wide {
                if entries.len() >= count {
                    return Err(malformed_error!(
                        "Wide constant at index {} overruns the pool",
                        entries.len() - 1
                    ));
                }
                entries.push(None);
            }
        }

        Ok(ConstantPool { entries })
    }

    /// The `constant_pool_count` value this pool serializes with.
    ///
    /// One greater than the number of addressable slots, per the format.
    #[must_use]
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    /// Get the entry at a 1-based pool index.
    ///
    /// ## Arguments
    /// * `index` - The 1-based pool index (comes from the surrounding class structures)
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is zero, out of range, or
    /// addresses the phantom slot of a wide entry.
    pub fn get(&self, index: u16) -> Result<&ConstantPoolEntry> {
        match self.entries.get(index as usize) {
            Some(Some(entry)) => Ok(entry),
            _ => Err(malformed_error!(
                "Invalid constant pool index - {}",
                index
            )),
        }
    }

    /// Get the string content of the `Utf8` entry at `index`.
    ///
    /// The payload is stored raw; decoding happens per lookup. Payloads using the
    /// modified UTF-8 escapes outside the UTF-8 subset (embedded NUL, surrogate pairs)
    /// are reported as malformed rather than decoded lossily.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the entry is not `Utf8` or does not decode.
    pub fn utf8_at(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            ConstantPoolEntry::Utf8(data) => std::str::from_utf8(data)
                .map_err(|_| malformed_error!("Invalid UTF-8 data at index - {}", index)),
            _ => Err(malformed_error!(
                "Constant pool index {} is not a Utf8 entry",
                index
            )),
        }
    }

    /// Get the internal (slash-separated) name of the `Class` entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the entry is not `Class` or its name does
    /// not resolve to a valid `Utf8` entry.
    pub fn class_name_at(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            ConstantPoolEntry::Class { name_index } => self.utf8_at(*name_index),
            _ => Err(malformed_error!(
                "Constant pool index {} is not a Class entry",
                index
            )),
        }
    }

    /// Serialize the pool back to its canonical byte form.
    pub fn serialize(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.count().to_be_bytes());
        for entry in self.entries.iter().flatten() {
            entry.serialize(buffer);
        }
    }
}
