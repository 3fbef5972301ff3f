//! Integration tests for pipeline ordering, write-through chaining and run semantics.

mod common;

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use classweave::{
    agent::{AgentRegistry, ClassTransformer, TransformOutcome},
    classfile::ClassModel,
    loader::{ClasspathLoader, LoadedClass, ProtectionContext, ResourceLoader, ScopedLoader},
    ClassUnit, Error, TransformationPipeline,
};

use common::{class_file, write_class};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn build_units(paths: &[PathBuf]) -> (Arc<dyn ResourceLoader>, Vec<ClassUnit>) {
    let deps: Arc<dyn ResourceLoader> = Arc::new(ClasspathLoader::new(Vec::new()));
    let units = paths
        .iter()
        .map(|path| ClassUnit::from_path(path, Arc::clone(&deps)).unwrap())
        .collect();
    (deps, units)
}

/// Replaces every class with a copy carrying an extra marker field.
struct AddMarkerField;

impl ClassTransformer for AddMarkerField {
    fn transform(
        &self,
        _loader: &ScopedLoader,
        class_name: &str,
        _class_being_redefined: &LoadedClass,
        _protection: &ProtectionContext,
        class_bytes: &[u8],
    ) -> TransformOutcome {
        let model = ClassModel::parse(class_bytes)?;
        let mut fields: Vec<(String, String)> = Vec::new();
        for field in model.fields() {
            fields.push((
                model.constant_pool().utf8_at(field.name_index)?.to_string(),
                model
                    .constant_pool()
                    .utf8_at(field.descriptor_index)?
                    .to_string(),
            ));
        }
        fields.push(("$marker".to_string(), "I".to_string()));

        let fields: Vec<(&str, &str)> = fields
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor.as_str()))
            .collect();
        Ok(Some(class_file(class_name, &fields)))
    }
}

/// Asserts that the bytes it observes already carry the marker field; counts sightings.
struct ExpectMarkerField {
    sightings: Arc<AtomicUsize>,
}

impl ClassTransformer for ExpectMarkerField {
    fn transform(
        &self,
        _loader: &ScopedLoader,
        _class_name: &str,
        _class_being_redefined: &LoadedClass,
        _protection: &ProtectionContext,
        class_bytes: &[u8],
    ) -> TransformOutcome {
        let model = ClassModel::parse(class_bytes)?;
        let has_marker = model.fields().iter().any(|field| {
            model
                .constant_pool()
                .utf8_at(field.name_index)
                .map(|name| name == "$marker")
                .unwrap_or(false)
        });

        if !has_marker {
            return Err("expected the marker field added by the preceding agent".into());
        }

        self.sightings.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

#[test]
fn chained_agents_observe_prior_output() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let a = write_class(dir.path(), "com/example/A", &[("existing", "J")]);
    let b = write_class(dir.path(), "com/example/B", &[]);

    let sightings = Arc::new(AtomicUsize::new(0));

    let mut registry = AgentRegistry::new();
    registry.register_constructor("com.example.AddMarker", || Ok(AddMarkerField));
    registry.register_constructor("com.example.ExpectMarker", {
        let sightings = Arc::clone(&sightings);
        move || {
            Ok(ExpectMarkerField {
                sightings: Arc::clone(&sightings),
            })
        }
    });
    let agents = registry
        .instantiate_all(&[
            "com.example.AddMarker".to_string(),
            "com.example.ExpectMarker".to_string(),
        ])
        .unwrap();

    let (deps, mut units) = build_units(&[a.clone(), b.clone()]);
    TransformationPipeline::new(deps)
        .run(&mut units, &agents)
        .unwrap();

    // The second agent saw the first agent's output for both classes
    assert_eq!(sightings.load(Ordering::SeqCst), 2);

    // And the write-through is what remains on disk
    for (path, name) in [(&a, "com/example/A"), (&b, "com/example/B")] {
        let on_disk = ClassModel::parse(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(on_disk.class_name(), name);
        assert!(on_disk.fields().iter().any(|field| {
            on_disk
                .constant_pool()
                .utf8_at(field.name_index)
                .map(|field_name| field_name == "$marker")
                .unwrap_or(false)
        }));
    }
}

#[test]
fn identity_run_is_idempotent_across_a_tree() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let paths = [
        write_class(dir.path(), "com/example/deep/pkg/One", &[]),
        write_class(dir.path(), "com/example/Two", &[("x", "I")]),
        write_class(dir.path(), "Three", &[]),
    ];
    let before: Vec<Vec<u8>> = paths.iter().map(|p| std::fs::read(p).unwrap()).collect();

    struct Identity;
    impl ClassTransformer for Identity {
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

    let mut registry = AgentRegistry::new();
    registry.register_constructor("Identity", || Ok(Identity));
    let agents = registry.instantiate_all(&["Identity".to_string()]).unwrap();

    let (deps, mut units) = build_units(&paths);
    TransformationPipeline::new(deps)
        .run(&mut units, &agents)
        .unwrap();

    for (path, original) in paths.iter().zip(&before) {
        assert_eq!(&std::fs::read(path).unwrap(), original);
    }
}

#[test]
fn agents_resolve_neighbours_through_the_scoped_loader() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let foo = write_class(dir.path(), "com/example/Foo", &[]);
    write_class(dir.path(), "com/example/Helper", &[]);

    struct ResolveHelper;
    impl ClassTransformer for ResolveHelper {
        fn transform(
            &self,
            loader: &ScopedLoader,
            _class_name: &str,
            class_being_redefined: &LoadedClass,
            protection: &ProtectionContext,
            _class_bytes: &[u8],
        ) -> TransformOutcome {
            // The scope is rooted at the package root, so siblings resolve locally
            if loader.load_class("com/example/Helper")?.is_none() {
                return Err("helper class not visible through the scoped loader".into());
            }
            if class_being_redefined.name() != "com.example.Foo" {
                return Err("unexpected class identity".into());
            }
            if protection.code_source() != loader.root() {
                return Err("protection context does not match the defining scope".into());
            }
            Ok(None)
        }
    }

    let mut registry = AgentRegistry::new();
    registry.register_constructor("ResolveHelper", || Ok(ResolveHelper));
    let agents = registry
        .instantiate_all(&["ResolveHelper".to_string()])
        .unwrap();

    let (deps, mut units) = build_units(std::slice::from_ref(&foo));
    TransformationPipeline::new(deps)
        .run(&mut units, &agents)
        .unwrap();
}

#[test]
fn failing_agent_identifies_class_and_agent() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let paths = [write_class(dir.path(), "com/example/Doomed", &[])];

    struct AlwaysFails;
    impl ClassTransformer for AlwaysFails {
        fn transform(
            &self,
            _loader: &ScopedLoader,
            _class_name: &str,
            _class_being_redefined: &LoadedClass,
            _protection: &ProtectionContext,
            _class_bytes: &[u8],
        ) -> TransformOutcome {
            Err("synthetic failure".into())
        }
    }

    let mut registry = AgentRegistry::new();
    registry.register_constructor("com.example.Failing", || Ok(AlwaysFails));
    let agents = registry
        .instantiate_all(&["com.example.Failing".to_string()])
        .unwrap();

    let (deps, mut units) = build_units(&paths);
    let error = TransformationPipeline::new(deps)
        .run(&mut units, &agents)
        .unwrap_err();

    match error {
        Error::Transformation { class, agent, .. } => {
            assert_eq!(class, "com.example.Doomed");
            assert_eq!(agent, "com.example.Failing");
        }
        other => panic!("expected Transformation, got {other}"),
    }
}
