use std::collections::BTreeMap;

use crate::types::TypeDescriptor;

/// Identity of a field: the owning type's name and the field's name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId {
    pub owner: String,
    pub name: String,
}

impl FieldId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// Type substitutions used when an interface or abstract member must be
/// written as a concrete type.
///
/// Equality and hashing are by content: two configs built separately with the
/// same entries are the same cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MappingConfig {
    by_type: BTreeMap<TypeDescriptor, TypeDescriptor>,
    by_field: BTreeMap<FieldId, TypeDescriptor>,
}

impl MappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_mapping(mut self, from: TypeDescriptor, to: TypeDescriptor) -> Self {
        self.by_type.insert(from, to);
        self
    }

    pub fn with_field_mapping(mut self, field: FieldId, to: TypeDescriptor) -> Self {
        self.by_field.insert(field, to);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty() && self.by_field.is_empty()
    }

    pub fn type_mapping(&self, ty: &TypeDescriptor) -> Option<&TypeDescriptor> {
        self.by_type.get(ty)
    }

    pub fn field_mapping(&self, field: &FieldId) -> Option<&TypeDescriptor> {
        self.by_field.get(field)
    }

    /// The type to serialize a member as: a field mapping wins over a type
    /// mapping, and an unmapped member keeps its declared type.
    pub fn substitute<'a>(
        &'a self,
        field: Option<&FieldId>,
        declared: &'a TypeDescriptor,
    ) -> &'a TypeDescriptor {
        field
            .and_then(|f| self.by_field.get(f))
            .or_else(|| self.by_type.get(declared))
            .unwrap_or(declared)
    }
}
