use crate::types::{TypeDescriptor, TypeKind};

/// Strategy family a type serializes with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeCategory {
    Dynamic,
    String,
    Numeric,
    Boolean,
    Dictionary,
    Sequence,
    CustomObject,
}

impl ShapeCategory {
    /// Categories served directly by a scalar converter.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            ShapeCategory::Dynamic
                | ShapeCategory::String
                | ShapeCategory::Numeric
                | ShapeCategory::Boolean
        )
    }
}

/// Categorize a type. Arms are checked in order and the first match wins:
/// strings are iterable and dictionaries are iterable too, so the order is
/// what keeps them out of `Sequence`.
pub fn classify(ty: &TypeDescriptor) -> ShapeCategory {
    let caps = ty.capabilities();
    match ty.kind() {
        TypeKind::Dynamic => ShapeCategory::Dynamic,
        // Written as quoted text on the wire.
        TypeKind::String
        | TypeKind::Char
        | TypeKind::DateTime
        | TypeKind::DateTimeOffset
        | TypeKind::Duration
        | TypeKind::Guid
        | TypeKind::Enum(_) => ShapeCategory::String,
        TypeKind::Numeric(_) => ShapeCategory::Numeric,
        TypeKind::Bool => ShapeCategory::Boolean,
        TypeKind::Object if caps.keyed_mapping => ShapeCategory::Dictionary,
        TypeKind::Object if caps.iterable => ShapeCategory::Sequence,
        TypeKind::Object => ShapeCategory::CustomObject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Capabilities, EnumDescriptor, NumericKind};
    use std::sync::Arc;

    #[test]
    fn dictionary_wins_over_sequence() {
        let both = TypeDescriptor::with_capabilities(
            "Lookup",
            Capabilities {
                keyed_mapping: true,
                iterable: true,
            },
        );
        assert_eq!(classify(&both), ShapeCategory::Dictionary);
        assert_eq!(
            classify(&TypeDescriptor::sequence("Vec<i32>")),
            ShapeCategory::Sequence
        );
    }

    #[test]
    fn string_is_not_a_sequence() {
        assert!(TypeDescriptor::string().capabilities().iterable);
        assert_eq!(classify(&TypeDescriptor::string()), ShapeCategory::String);
    }

    #[test]
    fn scalars_and_fallback() {
        assert_eq!(classify(&TypeDescriptor::dynamic()), ShapeCategory::Dynamic);
        assert_eq!(
            classify(&TypeDescriptor::numeric(NumericKind::F64).nullable()),
            ShapeCategory::Numeric
        );
        assert_eq!(
            classify(&TypeDescriptor::bool().nullable()),
            ShapeCategory::Boolean
        );
        let color = Arc::new(EnumDescriptor::new("Color").member("Red", 0));
        assert_eq!(
            classify(&TypeDescriptor::enumeration(color)),
            ShapeCategory::String
        );
        assert_eq!(
            classify(&TypeDescriptor::object("Customer")),
            ShapeCategory::CustomObject
        );
        assert!(ShapeCategory::Boolean.is_scalar());
        assert!(!ShapeCategory::Dictionary.is_scalar());
    }
}
