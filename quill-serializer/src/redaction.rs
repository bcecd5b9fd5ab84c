//! Redaction overlay for scalar converters.
//!
//! A [`RedactionRule`] replaces the formatted output of a sensitive value
//! with a fixed mask and makes the parser recognize that mask, so previously
//! redacted documents read back as zero/absent values instead of failing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::options::ConversionOptions;
use crate::registry::ScalarConverter;
use crate::value::ScalarValue;

/// Sentinel written in place of a redacted value.
pub const DEFAULT_MASK: &str = "XXXXXX";

/// When a rule masks output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedactCondition {
    /// Mask only when `ConversionOptions::should_redact` is set.
    #[default]
    WhenEnabled,
    /// Mask on every call.
    Always,
}

impl RedactCondition {
    pub fn holds(self, options: &ConversionOptions) -> bool {
        match self {
            RedactCondition::WhenEnabled => options.should_redact,
            RedactCondition::Always => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RedactionRule {
    mask: Arc<str>,
    condition: RedactCondition,
}

impl Default for RedactionRule {
    fn default() -> Self {
        Self::new(DEFAULT_MASK)
    }
}

impl RedactionRule {
    pub fn new(mask: &str) -> Self {
        Self {
            mask: Arc::from(mask),
            condition: RedactCondition::WhenEnabled,
        }
    }

    pub fn with_condition(mut self, condition: RedactCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn mask(&self) -> &str {
        &self.mask
    }

    pub fn condition(&self) -> RedactCondition {
        self.condition
    }

    pub fn applies(&self, options: &ConversionOptions) -> bool {
        self.condition.holds(options)
    }

    pub fn is_mask(&self, text: &str) -> bool {
        text == &*self.mask
    }

    /// Mask a typed value. Absence is preserved so readers can still tell a
    /// missing value from a hidden one.
    pub fn redact(&self, value: &ScalarValue) -> Option<String> {
        match value {
            ScalarValue::Null => None,
            _ => Some(self.mask.to_string()),
        }
    }
}

/// Layer `rule` over `base`. The same composition applies to every family.
pub fn wrap(base: Arc<ScalarConverter>, rule: RedactionRule) -> ScalarConverter {
    let target = base.target().clone();
    let zero = ScalarValue::zero_for(&target);

    let parse_base = base.clone();
    let parse_rule = rule.clone();
    let format_base = base;
    let format_rule = rule;

    ScalarConverter::new(
        target,
        Box::new(move |text: &str, options: &ConversionOptions| {
            if parse_rule.is_mask(text) {
                return Ok(zero.clone());
            }
            parse_base.parse(text, options)
        }),
        Box::new(move |value: &ScalarValue, options: &ConversionOptions| {
            if format_rule.applies(options) {
                return Ok(format_rule.redact(value));
            }
            format_base.format(value, options)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::get_converter;
    use crate::types::TypeDescriptor;

    #[test]
    fn redacted_null_stays_absent() {
        let rule = RedactionRule::default();
        assert_eq!(rule.redact(&ScalarValue::Null), None);
        assert_eq!(rule.redact(&ScalarValue::Bool(false)).as_deref(), Some("XXXXXX"));
    }

    #[test]
    fn always_condition_ignores_options() {
        let rule = RedactionRule::new("***").with_condition(RedactCondition::Always);
        let converter = get_converter(&TypeDescriptor::bool(), Some(&rule));
        let off = ConversionOptions::default();
        assert_eq!(
            converter.format(&ScalarValue::Bool(true), &off).unwrap().as_deref(),
            Some("***")
        );
        assert_eq!(converter.parse("***", &off).unwrap(), ScalarValue::Bool(false));
    }

    #[test]
    fn custom_mask_is_its_own_cache_entry() {
        let ty = TypeDescriptor::string();
        let stars = get_converter(&ty, Some(&RedactionRule::new("****")));
        let xs = get_converter(&ty, Some(&RedactionRule::default()));
        let on = ConversionOptions::default().with_redaction(true);
        let value = ScalarValue::from("secret");
        assert_eq!(stars.format(&value, &on).unwrap().as_deref(), Some("****"));
        assert_eq!(xs.format(&value, &on).unwrap().as_deref(), Some("XXXXXX"));
    }
}
