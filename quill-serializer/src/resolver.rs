//! Serializer resolution cache.
//!
//! [`SerializerResolver::resolve`] answers "which serializer handles this type
//! under this configuration" and memoizes the answer per [`ResolutionKey`].
//! Scalar categories are served from the converter registry; dictionaries,
//! sequences and custom objects are delegated to a
//! [`CompositeSerializerFactory`] supplied by the outer serializer.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use quill_common::logging::{Component, Logger};

use crate::classify::{classify, ShapeCategory};
use crate::error::Result;
use crate::mapping::{FieldId, MappingConfig};
use crate::options::ConversionOptions;
use crate::registry::{get_converter, ScalarConverter};
use crate::types::TypeDescriptor;
use crate::value::ScalarValue;

/// Structural cache key: type, encrypt flag and mapping contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub ty: TypeDescriptor,
    pub encrypt: bool,
    pub mappings: MappingConfig,
}

impl ResolutionKey {
    pub fn new(ty: TypeDescriptor, encrypt: bool, mappings: MappingConfig) -> Self {
        Self {
            ty,
            encrypt,
            mappings,
        }
    }
}

/// Serializer for a dictionary, sequence or custom object, owned by the
/// outer serialization layer.
pub trait CompositeSerializer: Send + Sync + fmt::Debug {
    fn category(&self) -> ShapeCategory;

    fn target(&self) -> &TypeDescriptor;
}

/// What a composite factory is asked to build. The resolver is handed along
/// so member types can be resolved with the same encrypt flag and mappings.
pub struct CompositeRequest<'a> {
    pub category: ShapeCategory,
    pub key: &'a ResolutionKey,
    pub resolver: &'a SerializerResolver,
}

impl CompositeRequest<'_> {
    /// Resolve a member of the composite being built.
    ///
    /// The composite is not published until the factory returns, so calling
    /// this for a member whose type leads back to the composite's own type
    /// (`Node { next: Node }`) recurses without end. Factories must resolve
    /// such members lazily, on first use, instead of while building.
    pub fn resolve_member(&self, field: &FieldId, declared: &TypeDescriptor) -> SerializerHandle {
        self.resolver
            .resolve_member(field, declared, self.key.encrypt, &self.key.mappings)
    }
}

pub trait CompositeSerializerFactory: Send + Sync {
    fn dictionary(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer>;

    fn sequence(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer>;

    fn custom_object(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer>;
}

/// Placeholder composite recording what was requested, for callers that bind
/// their composite serializers after resolution.
#[derive(Debug, Clone)]
pub struct UnboundComposite {
    category: ShapeCategory,
    key: ResolutionKey,
}

impl UnboundComposite {
    pub fn key(&self) -> &ResolutionKey {
        &self.key
    }
}

impl CompositeSerializer for UnboundComposite {
    fn category(&self) -> ShapeCategory {
        self.category
    }

    fn target(&self) -> &TypeDescriptor {
        &self.key.ty
    }
}

/// Factory producing [`UnboundComposite`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeferredCompositeFactory;

impl DeferredCompositeFactory {
    fn unbound(request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer> {
        Arc::new(UnboundComposite {
            category: request.category,
            key: request.key.clone(),
        })
    }
}

impl CompositeSerializerFactory for DeferredCompositeFactory {
    fn dictionary(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer> {
        Self::unbound(request)
    }

    fn sequence(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer> {
        Self::unbound(request)
    }

    fn custom_object(&self, request: &CompositeRequest<'_>) -> Arc<dyn CompositeSerializer> {
        Self::unbound(request)
    }
}

#[derive(Debug, Clone)]
pub enum Strategy {
    Scalar(Arc<ScalarConverter>),
    Composite(Arc<dyn CompositeSerializer>),
}

/// A resolved serializer. Immutable once published.
#[derive(Debug)]
pub struct Serializer {
    key: ResolutionKey,
    category: ShapeCategory,
    strategy: Strategy,
}

pub type SerializerHandle = Arc<Serializer>;

impl Serializer {
    pub fn key(&self) -> &ResolutionKey {
        &self.key
    }

    pub fn category(&self) -> ShapeCategory {
        self.category
    }

    pub fn encrypt(&self) -> bool {
        self.key.encrypt
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn as_scalar(&self) -> Option<&Arc<ScalarConverter>> {
        match &self.strategy {
            Strategy::Scalar(converter) => Some(converter),
            Strategy::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&Arc<dyn CompositeSerializer>> {
        match &self.strategy {
            Strategy::Composite(composite) => Some(composite),
            Strategy::Scalar(_) => None,
        }
    }

    /// Format a leaf through the scalar strategy; `None` for composites.
    pub fn format_scalar(
        &self,
        value: &ScalarValue,
        options: &ConversionOptions,
    ) -> Option<Result<Option<String>>> {
        self.as_scalar()
            .map(|converter| converter.format(value, options))
    }

    /// Parse a leaf through the scalar strategy; `None` for composites.
    pub fn parse_scalar(
        &self,
        text: &str,
        options: &ConversionOptions,
    ) -> Option<Result<ScalarValue>> {
        self.as_scalar().map(|converter| converter.parse(text, options))
    }
}

/// Memoizing dispatcher from [`ResolutionKey`] to [`SerializerHandle`].
///
/// Create one per process and share it; entries are never evicted.
pub struct SerializerResolver {
    logger: Arc<Logger>,
    composites: Arc<dyn CompositeSerializerFactory>,
    cache: DashMap<ResolutionKey, SerializerHandle>,
}

impl SerializerResolver {
    pub fn new(logger: Arc<Logger>, composites: Arc<dyn CompositeSerializerFactory>) -> Self {
        Self {
            logger: Arc::new(logger.with_component(Component::Resolver)),
            composites,
            cache: DashMap::new(),
        }
    }

    /// Resolver whose composites are [`UnboundComposite`] placeholders.
    pub fn with_defaults(logger: Arc<Logger>) -> Self {
        Self::new(logger, Arc::new(DeferredCompositeFactory))
    }

    /// Get the serializer for `ty` under the given encrypt flag and mappings.
    ///
    /// Never fails: a type matching no other category is a custom object.
    /// Construction runs without holding a map lock so composite factories
    /// may resolve member types recursively; when two callers race on one
    /// key, the first handle published is the one every caller receives.
    pub fn resolve(
        &self,
        ty: &TypeDescriptor,
        encrypt: bool,
        mappings: &MappingConfig,
    ) -> SerializerHandle {
        let key = ResolutionKey::new(ty.clone(), encrypt, mappings.clone());
        if let Some(existing) = self.cache.get(&key) {
            return existing.value().clone();
        }

        let built = Arc::new(self.build(&key));
        self.cache
            .entry(key)
            .or_insert(built)
            .value()
            .clone()
    }

    /// Resolve a member after applying field and type substitutions.
    pub fn resolve_member(
        &self,
        field: &FieldId,
        declared: &TypeDescriptor,
        encrypt: bool,
        mappings: &MappingConfig,
    ) -> SerializerHandle {
        let target = mappings.substitute(Some(field), declared);
        if target != declared {
            self.logger.trace_args(format_args!(
                "{}.{} mapped from {} to {}",
                field.owner, field.name, declared, target
            ));
        }
        self.resolve(target, encrypt, mappings)
    }

    fn build(&self, key: &ResolutionKey) -> Serializer {
        let category = classify(&key.ty);
        self.logger.debug_args(format_args!(
            "Resolving {} as {:?} (encrypt: {})",
            key.ty, category, key.encrypt
        ));

        let request = CompositeRequest {
            category,
            key,
            resolver: self,
        };
        let strategy = match category {
            ShapeCategory::Dynamic
            | ShapeCategory::String
            | ShapeCategory::Numeric
            | ShapeCategory::Boolean => Strategy::Scalar(get_converter(&key.ty, None)),
            ShapeCategory::Dictionary => Strategy::Composite(self.composites.dictionary(&request)),
            ShapeCategory::Sequence => Strategy::Composite(self.composites.sequence(&request)),
            ShapeCategory::CustomObject => {
                Strategy::Composite(self.composites.custom_object(&request))
            }
        };

        Serializer {
            key: key.clone(),
            category,
            strategy,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl fmt::Debug for SerializerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerResolver")
            .field("entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}
