//! Helpers for crafting class files and output directories in integration tests.

use std::path::{Path, PathBuf};

/// Emit a minimal valid class file for `internal_name`, extending `java/lang/Object`,
/// with the given attribute-less public fields.
pub fn class_file(internal_name: &str, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut pool: Vec<Vec<u8>> = Vec::new();

    let utf8 = |pool: &mut Vec<Vec<u8>>, text: &str| -> u16 {
        let mut entry = vec![0x01];
        entry.extend_from_slice(&(text.len() as u16).to_be_bytes());
        entry.extend_from_slice(text.as_bytes());
        pool.push(entry);
        pool.len() as u16
    };
    let class = |pool: &mut Vec<Vec<u8>>, name_index: u16| -> u16 {
        let mut entry = vec![0x07];
        entry.extend_from_slice(&name_index.to_be_bytes());
        pool.push(entry);
        pool.len() as u16
    };

    let this_name = utf8(&mut pool, internal_name);
    let this_class = class(&mut pool, this_name);
    let super_name = utf8(&mut pool, "java/lang/Object");
    let super_class = class(&mut pool, super_name);

    let field_indices: Vec<(u16, u16)> = fields
        .iter()
        .map(|(name, descriptor)| (utf8(&mut pool, name), utf8(&mut pool, descriptor)))
        .collect();

    let mut data = Vec::new();
    data.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
    data.extend_from_slice(&0_u16.to_be_bytes()); // minor_version
    data.extend_from_slice(&52_u16.to_be_bytes()); // major_version, Java 8

    data.extend_from_slice(&((pool.len() + 1) as u16).to_be_bytes());
    for entry in &pool {
        data.extend_from_slice(entry);
    }

    data.extend_from_slice(&0x0021_u16.to_be_bytes()); // ACC_PUBLIC | ACC_SUPER
    data.extend_from_slice(&this_class.to_be_bytes());
    data.extend_from_slice(&super_class.to_be_bytes());
    data.extend_from_slice(&0_u16.to_be_bytes()); // interfaces_count

    data.extend_from_slice(&(field_indices.len() as u16).to_be_bytes());
    for (name_index, descriptor_index) in &field_indices {
        data.extend_from_slice(&0x0001_u16.to_be_bytes()); // ACC_PUBLIC
        data.extend_from_slice(&name_index.to_be_bytes());
        data.extend_from_slice(&descriptor_index.to_be_bytes());
        data.extend_from_slice(&0_u16.to_be_bytes()); // attributes_count
    }

    data.extend_from_slice(&0_u16.to_be_bytes()); // methods_count
    data.extend_from_slice(&0_u16.to_be_bytes()); // class attributes_count

    data
}

/// Write `internal_name` as a class file under `root`, creating the package directories.
pub fn write_class(root: &Path, internal_name: &str, fields: &[(&str, &str)]) -> PathBuf {
    let mut path = root.to_path_buf();
    let mut segments = internal_name.split('/').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            path.push(segment);
        } else {
            path.push(format!("{segment}.class"));
        }
    }

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, class_file(internal_name, fields)).unwrap();
    path
}
