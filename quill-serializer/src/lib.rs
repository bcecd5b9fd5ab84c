//! Serializer resolution and scalar value conversion for Quill
//!
//! This crate provides:
//! - A type classifier mapping runtime type descriptors to shape categories
//! - A global registry of culture-invariant scalar converters
//! - A redaction overlay that masks sensitive values and reads masks back
//! - A memoizing resolver choosing the serializer for a (type, encrypt, mappings) key

pub mod classify;
pub mod error;
mod formats;
pub mod mapping;
pub mod options;
pub mod redaction;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod value;

pub use classify::{classify, ShapeCategory};
pub use error::{Result, SerializerError};
pub use mapping::{FieldId, MappingConfig};
pub use options::ConversionOptions;
pub use redaction::{wrap, RedactCondition, RedactionRule, DEFAULT_MASK};
pub use registry::{
    converter_count, get_converter, ConversionRule, ScalarConverter, ScalarConverterKey,
    ScalarFamily,
};
pub use resolver::{
    CompositeRequest, CompositeSerializer, CompositeSerializerFactory, DeferredCompositeFactory,
    ResolutionKey, Serializer, SerializerHandle, SerializerResolver, Strategy, UnboundComposite,
};
pub use types::{
    Capabilities, DescribeType, EnumDescriptor, EnumMember, NumericKind, TypeDescriptor, TypeKind,
};
pub use value::{DateTimeValue, EnumValue, ScalarValue};
