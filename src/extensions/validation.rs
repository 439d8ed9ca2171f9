//! Checking an extension record's `info` against its own `schema`.
//!
//! Records can originate from the other side of the wire, so `schema` is as
//! untrusted as `info`. Validation therefore never propagates a failure as
//! an error value or a panic: a schema that does not even compile is
//! reported the same way as a non-conformant `info`, through a
//! [`ValidationResult`].

use serde::{Deserialize, Serialize};

use super::record::ExtensionRecord;

/// Outcome of validating an extension record.
///
/// `errors` is non-empty exactly when `valid` is false; the constructors
/// keep the two fields in agreement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Whether `info` conforms to `schema`.
    pub valid: bool,

    /// One entry per violation, `<instance-path-or-"(root)">: <message>`,
    /// in the order the validator reported them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// A passing result.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A failing result with at least one error.
    pub fn failure(errors: Vec<String>) -> Self {
        debug_assert!(!errors.is_empty(), "a failure must carry errors");
        Self {
            valid: false,
            errors,
        }
    }
}

/// Validates a record's `info` against its own `schema`.
///
/// The schema is compiled with [`jsonschema`], which resolves the declared
/// dialect from `$schema` (2020-12 for records declared by this crate) and
/// ignores keywords it does not recognize, so a schema written against a
/// newer dialect degrades to partial checking instead of a hard failure.
///
/// A schema document that fails to compile at all yields a single-error
/// failing result; this function always returns a value.
pub fn validate_extension(record: &ExtensionRecord) -> ValidationResult {
    let validator = match jsonschema::validator_for(&record.schema) {
        Ok(validator) => validator,
        Err(error) => {
            return ValidationResult::failure(vec![format!("schema compilation failed: {error}")]);
        }
    };

    let errors: Vec<String> = validator
        .iter_errors(&record.info)
        .map(|error| {
            let path = error.instance_path.to_string();
            if path.is_empty() {
                format!("(root): {error}")
            } else {
                format!("{path}: {error}")
            }
        })
        .collect();

    if errors.is_empty() {
        ValidationResult::ok()
    } else {
        ValidationResult::failure(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature_schema() -> serde_json::Value {
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": { "feature": { "type": "string" } },
            "required": ["feature"]
        })
    }

    #[test]
    fn test_conformant_info_passes() {
        let record = ExtensionRecord::new(json!({ "feature": "discovery" }), feature_schema());
        let result = validate_extension(&record);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_missing_required_field_reported_at_root() {
        let record = ExtensionRecord::new(json!({}), feature_schema());
        let result = validate_extension(&record);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("feature"));
        assert!(result.errors[0].starts_with("(root):"));
    }

    #[test]
    fn test_wrong_type_reported_at_field_path() {
        let record = ExtensionRecord::new(json!({ "feature": 42 }), feature_schema());
        let result = validate_extension(&record);
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("/feature:"));
    }

    #[test]
    fn test_malformed_schema_is_caught() {
        // "type" must be a string or array of strings
        let record = ExtensionRecord::new(json!({}), json!({ "type": 42 }));
        let result = validate_extension(&record);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("schema compilation failed"));
    }

    #[test]
    fn test_unknown_keywords_tolerated() {
        let record = ExtensionRecord::new(
            json!({ "feature": "x" }),
            json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "type": "object",
                "x-future-keyword": { "anything": true }
            }),
        );
        assert!(validate_extension(&record).valid);
    }

    #[test]
    fn test_validation_deterministic() {
        let record = ExtensionRecord::new(json!({ "feature": 42 }), feature_schema());
        assert_eq!(validate_extension(&record), validate_extension(&record));
    }

    #[test]
    fn test_result_serde_omits_empty_errors() {
        let wire = serde_json::to_value(ValidationResult::ok()).unwrap();
        assert_eq!(wire, json!({ "valid": true }));

        let wire = serde_json::to_value(ValidationResult::failure(vec!["(root): boom".into()]))
            .unwrap();
        assert_eq!(wire, json!({ "valid": false, "errors": ["(root): boom"] }));
    }
}
