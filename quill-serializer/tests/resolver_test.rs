use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use anyhow::Result;
use quill_common::logging::{Component, Logger};
use quill_serializer::{
    Capabilities, CompositeRequest, CompositeSerializer, CompositeSerializerFactory,
    ConversionOptions, FieldId, MappingConfig, NumericKind, ScalarValue, SerializerHandle,
    SerializerResolver, ShapeCategory, TypeDescriptor,
};

fn test_logger() -> Arc<Logger> {
    let _ = env_logger::builder().is_test(true).try_init();
    Arc::new(Logger::new_root(Component::Custom("Test"), "resolver-test"))
}

/// Object composite that resolves its members while being built.
#[derive(Debug)]
struct RecordComposite {
    target: TypeDescriptor,
    members: Vec<(String, SerializerHandle)>,
}

impl CompositeSerializer for RecordComposite {
    fn category(&self) -> ShapeCategory {
        ShapeCategory::CustomObject
    }

    fn target(&self) -> &TypeDescriptor {
        &self.target
    }
}

#[derive(Default)]
struct RecordFactory {
    schemas: HashMap<String, Vec<(String, TypeDescriptor)>>,
    built: AtomicUsize,
    seen: Mutex<Vec<ShapeCategory>>,
}

impl RecordFactory {
    fn with_schema(mut self, owner: &str, fields: Vec<(&str, TypeDescriptor)>) -> Self {
        self.schemas.insert(
            owner.to_string(),
            fields
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        );
        self
    }

    fn unbound(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer> {
        self.seen.lock().unwrap().push(request.category);
        self.built.fetch_add(1, Ordering::SeqCst);
        quill_serializer::DeferredCompositeFactory.dictionary(request)
    }
}

impl CompositeSerializerFactory for RecordFactory {
    fn dictionary(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer> {
        self.unbound(request)
    }

    fn sequence(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer> {
        self.unbound(request)
    }

    fn custom_object(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer> {
        self.seen.lock().unwrap().push(request.category);
        self.built.fetch_add(1, Ordering::SeqCst);
        let owner = request.key.ty.name().to_string();
        let members = self
            .schemas
            .get(&owner)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(name, declared)| {
                        let field = FieldId::new(owner.clone(), name.clone());
                        (name.clone(), request.resolve_member(&field, declared))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Arc::new(RecordComposite {
            target: request.key.ty.clone(),
            members,
        })
    }
}

#[test]
fn test_concurrent_resolve_returns_one_handle() -> Result<()> {
    let resolver = Arc::new(SerializerResolver::with_defaults(test_logger()));
    let barrier = Arc::new(Barrier::new(50));

    let workers: Vec<_> = (0..50)
        .map(|_| {
            let resolver = resolver.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                resolver.resolve(&TypeDescriptor::of::<i32>(), false, &MappingConfig::new())
            })
        })
        .collect();

    let handles: Vec<SerializerHandle> = workers
        .into_iter()
        .map(|w| w.join().expect("worker panicked"))
        .collect();

    let first = &handles[0];
    assert!(handles.iter().all(|h| Arc::ptr_eq(h, first)));
    assert_eq!(resolver.len(), 1);
    assert_eq!(first.category(), ShapeCategory::Numeric);
    Ok(())
}

#[test]
fn test_structural_keys_share_handles() -> Result<()> {
    let resolver = SerializerResolver::with_defaults(test_logger());
    let mapping = || {
        MappingConfig::new()
            .with_type_mapping(TypeDescriptor::object("IShape"), TypeDescriptor::object("Circle"))
    };
    let shape = TypeDescriptor::object("Drawing");

    let a = resolver.resolve(&shape, true, &mapping());
    let b = resolver.resolve(&TypeDescriptor::object("Drawing"), true, &mapping());
    assert!(Arc::ptr_eq(&a, &b));

    let other_flag = resolver.resolve(&shape, false, &mapping());
    let other_mapping = resolver.resolve(&shape, true, &MappingConfig::new());
    let other_type = resolver.resolve(&TypeDescriptor::object("Canvas"), true, &mapping());
    assert!(!Arc::ptr_eq(&a, &other_flag));
    assert!(!Arc::ptr_eq(&a, &other_mapping));
    assert!(!Arc::ptr_eq(&a, &other_type));
    assert_eq!(resolver.len(), 4);
    assert!(a.encrypt());
    assert!(!other_flag.encrypt());
    Ok(())
}

#[test]
fn test_scalar_categories_use_converters() -> Result<()> {
    let resolver = SerializerResolver::with_defaults(test_logger());
    let empty = MappingConfig::new();
    let opts = ConversionOptions::default();

    let boolean = resolver.resolve(&TypeDescriptor::of::<Option<bool>>(), false, &empty);
    assert_eq!(boolean.category(), ShapeCategory::Boolean);
    assert_eq!(boolean.parse_scalar("1", &opts).transpose()?, Some(ScalarValue::Bool(true)));
    assert_eq!(boolean.parse_scalar("", &opts).transpose()?, Some(ScalarValue::Null));

    let text = resolver.resolve(&TypeDescriptor::of::<String>(), false, &empty);
    assert_eq!(text.category(), ShapeCategory::String);
    assert!(text.as_scalar().is_some());

    let dynamic = resolver.resolve(&TypeDescriptor::of::<serde_json::Value>(), false, &empty);
    assert_eq!(dynamic.category(), ShapeCategory::Dynamic);
    assert_eq!(
        dynamic.format_scalar(&ScalarValue::Float(1.5), &opts).transpose()?,
        Some(Some("1.5".to_string()))
    );

    let guid = resolver.resolve(&TypeDescriptor::guid(), false, &empty);
    assert_eq!(guid.category(), ShapeCategory::String);
    Ok(())
}

#[test]
fn test_composites_go_to_factory() -> Result<()> {
    let factory = Arc::new(RecordFactory::default());
    let resolver = SerializerResolver::new(test_logger(), factory.clone());
    let empty = MappingConfig::new();

    let lookup = TypeDescriptor::with_capabilities(
        "Lookup",
        Capabilities {
            keyed_mapping: true,
            iterable: true,
        },
    );
    let dict = resolver.resolve(&lookup, false, &empty);
    let list = resolver.resolve(&TypeDescriptor::of::<Vec<i64>>(), false, &empty);
    let object = resolver.resolve(&TypeDescriptor::object("Customer"), false, &empty);

    assert_eq!(dict.category(), ShapeCategory::Dictionary);
    assert_eq!(list.category(), ShapeCategory::Sequence);
    assert_eq!(object.category(), ShapeCategory::CustomObject);
    assert!(dict.as_scalar().is_none());
    assert!(dict
        .format_scalar(&ScalarValue::Null, &ConversionOptions::default())
        .is_none());
    assert_eq!(
        *factory.seen.lock().unwrap(),
        vec![
            ShapeCategory::Dictionary,
            ShapeCategory::Sequence,
            ShapeCategory::CustomObject
        ]
    );

    // Cached: the factory is not asked again.
    resolver.resolve(&lookup, false, &empty);
    assert_eq!(factory.built.load(Ordering::SeqCst), 3);
    Ok(())
}

#[test]
fn test_nested_members_resolve_through_mappings() -> Result<()> {
    let shape = TypeDescriptor::object("IShape");
    let factory = Arc::new(
        RecordFactory::default()
            .with_schema(
                "Drawing",
                vec![
                    ("title", TypeDescriptor::string()),
                    ("frame", shape.clone()),
                    ("logo", shape.clone()),
                    ("scale", TypeDescriptor::numeric(NumericKind::F32).nullable()),
                ],
            )
            .with_schema("Circle", vec![("radius", TypeDescriptor::of::<f64>())]),
    );
    let resolver = SerializerResolver::new(test_logger(), factory);
    let mappings = MappingConfig::new()
        .with_type_mapping(shape.clone(), TypeDescriptor::object("Circle"))
        .with_field_mapping(FieldId::new("Drawing", "logo"), TypeDescriptor::object("Square"));

    let drawing = resolver.resolve(&TypeDescriptor::object("Drawing"), true, &mappings);
    let composite = drawing
        .as_composite()
        .expect("custom object resolves to a composite");
    assert_eq!(composite.target().name(), "Drawing");
    assert!(format!("{composite:?}").contains("\"logo\""));

    let circle = resolver.resolve(&TypeDescriptor::object("Circle"), true, &mappings);
    let square = resolver.resolve(&TypeDescriptor::object("Square"), true, &mappings);
    let radius = resolver.resolve(&TypeDescriptor::of::<f64>(), true, &mappings);

    // Members were resolved with the parent's flag and mappings, so the
    // same handles come back from the cache.
    assert_eq!(resolver.len(), 6);
    assert!(circle.encrypt());
    assert_eq!(circle.category(), ShapeCategory::CustomObject);
    assert_eq!(square.category(), ShapeCategory::CustomObject);
    assert_eq!(radius.category(), ShapeCategory::Numeric);
    Ok(())
}

#[test]
fn test_default_factory_records_request() -> Result<()> {
    let resolver = SerializerResolver::with_defaults(test_logger());
    let mappings = MappingConfig::new()
        .with_field_mapping(FieldId::new("Order", "lines"), TypeDescriptor::sequence("Vec<Line>"));
    let handle = resolver.resolve(&TypeDescriptor::object("Order"), true, &mappings);

    let composite = handle.as_composite().expect("composite");
    assert_eq!(composite.category(), ShapeCategory::CustomObject);
    assert_eq!(composite.target().name(), "Order");
    assert_eq!(handle.key().mappings, mappings);
    Ok(())
}
