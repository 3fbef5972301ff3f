//! Field, method and attribute structures of the class file format.
//!
//! Fields and methods share one on-disk layout (`field_info` / `method_info`), represented
//! here by [`crate::classfile::member::MemberInfo`]. Attribute payloads are carried as raw
//! bytes behind their declared length: the transformation pipeline never interprets
//! bytecode or debug tables, it only needs them to survive a parse/serialize round-trip
//! byte-for-byte.
//!
//! # Reference
//! - [JVMS §4.5 - §4.7](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.5)

use crate::{file::parser::Parser, Result};

/// One attribute with its payload kept as raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    /// Pool index of the attribute's name (`Utf8` entry)
    pub name_index: u16,
    /// The attribute payload, uninterpreted
    pub info: Vec<u8>,
}

impl AttributeInfo {
    /// Parse one attribute from the current parser position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the declared length exceeds the remaining
    /// data, which also catches lengths crafted to overflow.
    pub fn parse(parser: &mut Parser) -> Result<AttributeInfo> {
        let name_index = parser.read_be::<u16>()?;
        let length = parser.read_be::<u32>()? as usize;
        let info = parser.read_bytes(length)?.to_vec();

        Ok(AttributeInfo { name_index, info })
    }

    /// Parse a counted attribute table (`u2` count followed by the attributes).
    ///
    /// # Errors
    /// Propagates the first attribute-level parse failure.
    pub fn parse_table(parser: &mut Parser) -> Result<Vec<AttributeInfo>> {
        let count = parser.read_be::<u16>()? as usize;
        let mut attributes = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            attributes.push(AttributeInfo::parse(parser)?);
        }

        Ok(attributes)
    }

    /// Serialize this attribute back to its canonical byte form.
    pub fn serialize(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.name_index.to_be_bytes());
        buffer.extend_from_slice(&(self.info.len() as u32).to_be_bytes());
        buffer.extend_from_slice(&self.info);
    }

    /// Serialize a counted attribute table.
    pub fn serialize_table(attributes: &[AttributeInfo], buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for attribute in attributes {
            attribute.serialize(buffer);
        }
    }
}

/// One field or method of a class.
///
/// The two member kinds share this layout; which table a member was read from decides
/// which it is.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    /// Raw access flags; field and method flag spaces differ, so the bits stay untyped here
    pub access_flags: u16,
    /// Pool index of the member name (`Utf8` entry)
    pub name_index: u16,
    /// Pool index of the member descriptor (`Utf8` entry)
    pub descriptor_index: u16,
    /// The member's attributes (Code, ConstantValue, Signature, ...)
    pub attributes: Vec<AttributeInfo>,
}

impl MemberInfo {
    /// Parse one member from the current parser position.
    ///
    /// # Errors
    /// Propagates truncation and attribute parse failures.
    pub fn parse(parser: &mut Parser) -> Result<MemberInfo> {
        let access_flags = parser.read_be::<u16>()?;
        let name_index = parser.read_be::<u16>()?;
        let descriptor_index = parser.read_be::<u16>()?;
        let attributes = AttributeInfo::parse_table(parser)?;

        Ok(MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    /// Parse a counted member table (`u2` count followed by the members).
    ///
    /// # Errors
    /// Propagates the first member-level parse failure.
    pub fn parse_table(parser: &mut Parser) -> Result<Vec<MemberInfo>> {
        let count = parser.read_be::<u16>()? as usize;
        let mut members = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            members.push(MemberInfo::parse(parser)?);
        }

        Ok(members)
    }

    /// Serialize this member back to its canonical byte form.
    pub fn serialize(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.access_flags.to_be_bytes());
        buffer.extend_from_slice(&self.name_index.to_be_bytes());
        buffer.extend_from_slice(&self.descriptor_index.to_be_bytes());
        AttributeInfo::serialize_table(&self.attributes, buffer);
    }

    /// Serialize a counted member table.
    pub fn serialize_table(members: &[MemberInfo], buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&(members.len() as u16).to_be_bytes());
        for member in members {
            member.serialize(buffer);
        }
    }
}
