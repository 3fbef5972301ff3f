//! Integration tests for the parse/serialize round-trip and the write-back laws.

mod common;

use std::sync::Arc;

use classweave::{classfile::ClassModel, loader::ClasspathLoader, ClassUnit};

use common::{class_file, write_class};

fn dependency_loader() -> Arc<ClasspathLoader> {
    Arc::new(ClasspathLoader::new(Vec::new()))
}

#[test]
fn parse_serialize_is_byte_exact() {
    for (name, fields) in [
        ("com/example/Plain", vec![]),
        ("com/example/WithFields", vec![("count", "I"), ("label", "Ljava/lang/String;")]),
        ("DefaultPackage", vec![("flag", "Z")]),
    ] {
        let data = class_file(name, &fields);
        let model = ClassModel::parse(&data).unwrap();
        assert_eq!(model.to_bytes(), data, "round-trip failed for {name}");
    }
}

#[test]
fn overwrite_with_current_bytes_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_class(dir.path(), "com/example/Foo", &[("value", "D")]);
    let original = std::fs::read(&path).unwrap();

    let mut unit = ClassUnit::from_path(&path, dependency_loader()).unwrap();
    let current = unit.current_bytes().to_vec();
    unit.overwrite(&current).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), original);
}

#[test]
fn package_root_resolution() {
    let dir = tempfile::tempdir().unwrap();

    let nested = write_class(dir.path(), "com/example/Foo", &[]);
    let unit = ClassUnit::from_path(&nested, dependency_loader()).unwrap();
    assert_eq!(unit.package_root_dir().unwrap(), dir.path());

    let top = write_class(dir.path(), "Foo", &[]);
    let unit = ClassUnit::from_path(&top, dependency_loader()).unwrap();
    assert_eq!(unit.package_root_dir().unwrap(), dir.path());
}

#[test]
fn model_is_parsed_once_from_construction_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_class(dir.path(), "com/example/Foo", &[]);

    let unit = ClassUnit::from_path(&path, dependency_loader()).unwrap();

    // Clobbering the file after construction must not affect the unit's model or image
    std::fs::write(&path, b"garbage").unwrap();
    assert_eq!(unit.qualified_name(), "com.example.Foo");
    assert_eq!(unit.current_bytes(), class_file("com/example/Foo", &[]).as_slice());
}
