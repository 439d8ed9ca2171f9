//! Recovering typed extension values from client-submitted payloads.
//!
//! Extensions are optional, best-effort metadata: a facilitator must keep
//! processing a payment whether or not an extension is present and
//! well-formed. Extraction therefore collapses every failure mode
//! (unsupported protocol version, no extension map, unknown key, failed
//! validation, shape mismatch) into a single "absent" outcome and never
//! panics or returns an error.
//!
//! Degradations are still observable: each one is pushed onto the
//! [`Extracted::diagnostics`] of the result and mirrored to `tracing`, so
//! tests can assert on them without installing a subscriber.

use serde::de::DeserializeOwned;

use super::record::X402Extension;
use super::validation::validate_extension;
use crate::proto::PaymentPayload;

/// Options for [`extract_extension`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Validate the record's `info` against its embedded `schema` before
    /// trusting it. Defaults to true; payload-side extensions are untrusted
    /// input regardless of what the requirements side declared.
    pub validate: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

impl ExtractOptions {
    /// Options that skip schema validation.
    pub fn unvalidated() -> Self {
        Self { validate: false }
    }
}

/// Result of an extraction attempt: the value if one was recovered, plus
/// any diagnostics explaining a degradation to absence.
///
/// The routine absence cases (wrong version, no extensions, unknown key)
/// produce no diagnostics; only inputs that were present but unusable do.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    /// The recovered extension value, if any.
    pub value: Option<T>,

    /// Why a present extension was not usable, empty otherwise.
    pub diagnostics: Vec<String>,
}

impl<T> Extracted<T> {
    fn present(value: T) -> Self {
        Self {
            value: Some(value),
            diagnostics: Vec::new(),
        }
    }

    fn absent() -> Self {
        Self {
            value: None,
            diagnostics: Vec::new(),
        }
    }

    fn absent_with(diagnostics: Vec<String>) -> Self {
        Self {
            value: None,
            diagnostics,
        }
    }

    /// Returns true if no value was recovered.
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    /// Consumes the result, discarding diagnostics.
    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

/// Locates the extension declared under `key` in a payload and narrows its
/// `info` into `T`.
///
/// Preconditions are checked in order, short-circuiting to absent:
/// the payload's `x402Version` must be the supported version, the payload
/// must carry an extension map, and the key must be present in it. When
/// `options.validate` is set, the record is then checked against its own
/// schema; a failing record degrades to absence with the validation errors
/// as diagnostics. Finally `info` is deserialized into `T`; a shape
/// mismatch likewise degrades to absence.
///
/// This function never panics for any structurally-shaped input.
pub fn extract_extension<T: DeserializeOwned>(
    payload: &PaymentPayload,
    key: &str,
    options: ExtractOptions,
) -> Extracted<T> {
    if !payload.is_supported_version() {
        tracing::debug!(
            version = payload.x402_version,
            key,
            "skipping extension: unsupported x402 version"
        );
        return Extracted::absent();
    }

    let Some(extensions) = payload.extensions.as_ref() else {
        tracing::debug!(key, "payload carries no extensions");
        return Extracted::absent();
    };

    let Some(record) = extensions.get(key) else {
        tracing::debug!(key, "extension not present in payload");
        return Extracted::absent();
    };

    if options.validate {
        let result = validate_extension(record);
        if !result.valid {
            for error in &result.errors {
                tracing::warn!(key, %error, "extension failed validation");
            }
            return Extracted::absent_with(result.errors);
        }
    }

    match serde_json::from_value::<T>(record.info.clone()) {
        Ok(value) => Extracted::present(value),
        Err(error) => {
            tracing::warn!(key, %error, "extension info does not match expected shape");
            Extracted::absent_with(vec![format!(
                "extension '{key}' info does not match expected shape: {error}"
            )])
        }
    }
}

/// [`extract_extension`] narrowed to an extension kind's declared key and
/// `Info` type.
pub fn extract_extension_for<E: X402Extension>(
    payload: &PaymentPayload,
    options: ExtractOptions,
) -> Extracted<E::Info> {
    extract_extension::<E::Info>(payload, E::KEY, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{ExtensionMap, ExtensionRecord};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct FeatureInfo {
        feature: String,
    }

    fn feature_record(info: serde_json::Value) -> ExtensionRecord {
        ExtensionRecord::new(
            info,
            json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "type": "object",
                "properties": { "feature": { "type": "string" } },
                "required": ["feature"]
            }),
        )
    }

    fn payload_with(record: ExtensionRecord) -> PaymentPayload {
        PaymentPayload::new(Some(ExtensionMap::single("test", record)))
    }

    #[test]
    fn test_extracts_conformant_extension() {
        let payload = payload_with(feature_record(json!({ "feature": "demo" })));
        let extracted =
            extract_extension::<FeatureInfo>(&payload, "test", ExtractOptions::default());
        assert_eq!(
            extracted.value,
            Some(FeatureInfo {
                feature: "demo".into()
            })
        );
        assert!(extracted.diagnostics.is_empty());
    }

    #[test]
    fn test_absent_on_unsupported_version() {
        let mut payload = payload_with(feature_record(json!({ "feature": "demo" })));
        payload.x402_version = 1;
        let extracted =
            extract_extension::<FeatureInfo>(&payload, "test", ExtractOptions::default());
        assert!(extracted.is_absent());
        assert!(extracted.diagnostics.is_empty());
    }

    #[test]
    fn test_absent_on_missing_extension_map() {
        let payload = PaymentPayload::new(None);
        let extracted =
            extract_extension::<FeatureInfo>(&payload, "test", ExtractOptions::default());
        assert!(extracted.is_absent());
    }

    #[test]
    fn test_absent_on_unknown_key() {
        let payload = payload_with(feature_record(json!({ "feature": "demo" })));
        let extracted =
            extract_extension::<FeatureInfo>(&payload, "other", ExtractOptions::default());
        assert!(extracted.is_absent());
    }

    #[test]
    fn test_absent_with_diagnostics_on_failed_validation() {
        let payload = payload_with(feature_record(json!({ "feature": 42 })));
        let extracted =
            extract_extension::<FeatureInfo>(&payload, "test", ExtractOptions::default());
        assert!(extracted.is_absent());
        assert!(extracted.diagnostics[0].contains("/feature"));
    }

    #[test]
    fn test_unvalidated_bypasses_schema_checks() {
        // Info violates its own schema but still matches the target shape.
        let payload = PaymentPayload::new(Some(ExtensionMap::single(
            "test",
            ExtensionRecord::new(
                json!({ "feature": "demo" }),
                json!({ "type": "object", "required": ["missing"] }),
            ),
        )));

        assert!(
            extract_extension::<FeatureInfo>(&payload, "test", ExtractOptions::default())
                .is_absent()
        );

        let extracted =
            extract_extension::<FeatureInfo>(&payload, "test", ExtractOptions::unvalidated());
        assert_eq!(
            extracted.value,
            Some(FeatureInfo {
                feature: "demo".into()
            })
        );
    }

    #[test]
    fn test_shape_mismatch_degrades_to_absence() {
        // Schema accepts any object, but the target type does not.
        let payload = PaymentPayload::new(Some(ExtensionMap::single(
            "test",
            ExtensionRecord::new(json!({ "unexpected": true }), json!({ "type": "object" })),
        )));
        let extracted =
            extract_extension::<FeatureInfo>(&payload, "test", ExtractOptions::default());
        assert!(extracted.is_absent());
        assert!(extracted.diagnostics[0].contains("expected shape"));
    }
}
