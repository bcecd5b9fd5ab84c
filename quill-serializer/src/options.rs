use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Per-call conversion settings supplied by the serialization session.
///
/// Field names accept both the snake_case form and the PascalCase names used
/// by the external option surface (`ShouldIgnoreCaseForEnum`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Match enum member names case-insensitively on parse.
    #[serde(alias = "ShouldIgnoreCaseForEnum")]
    pub ignore_case_for_enum: bool,
    /// Write characters as their UTF-16 code unit instead of the character.
    #[serde(alias = "ShouldSerializeCharAsInt")]
    pub serialize_char_as_int: bool,
    /// Apply redaction rules on output.
    #[serde(alias = "ShouldRedact")]
    pub should_redact: bool,
}

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode options from a JSON document; missing fields default to `false`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_ignore_case_for_enum(mut self, value: bool) -> Self {
        self.ignore_case_for_enum = value;
        self
    }

    pub fn with_char_as_int(mut self, value: bool) -> Self {
        self.serialize_char_as_int = value;
        self
    }

    pub fn with_redaction(mut self, value: bool) -> Self {
        self.should_redact = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_external_option_names() {
        let opts = ConversionOptions::from_json(
            r#"{"ShouldIgnoreCaseForEnum": true, "ShouldRedact": true}"#,
        )
        .unwrap();
        assert!(opts.ignore_case_for_enum);
        assert!(opts.should_redact);
        assert!(!opts.serialize_char_as_int);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(ConversionOptions::from_json("{\"should_redact\": 1}").is_err());
        assert_eq!(
            ConversionOptions::from_json("{}").unwrap(),
            ConversionOptions::default()
        );
    }
}
