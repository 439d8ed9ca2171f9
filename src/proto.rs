//! x402 Protocol Version 2 message views.
//!
//! This crate only owns two fields of the protocol messages: `x402Version`
//! and `extensions`. Everything else (accepts array, scheme payloads, chain
//! identifiers) belongs to the core payment flow and is carried through
//! untouched as opaque JSON, so a message can be round-tripped by an
//! extensions-aware intermediary without losing fields it does not know.
//!
//! # Version handling
//!
//! - [`PaymentRequired`] is produced by resource servers under our control,
//!   so its version field is the strict [`X402Version2`] marker: it always
//!   serializes as the number `2` and refuses to deserialize anything else.
//! - [`PaymentPayload`] arrives from the network. Its version field is a
//!   plain integer so that a payload from a newer or older peer still
//!   parses; the extraction pipeline gates on [`SUPPORTED_X402_VERSION`]
//!   instead of failing the parse.

use serde::{Deserialize, Serialize};

use crate::extensions::ExtensionMap;

/// The x402 protocol version this crate understands.
pub const SUPPORTED_X402_VERSION: u64 = 2;

/// x402 Protocol Version 2 marker.
///
/// Serializes as the literal number `2`; deserialization of any other
/// value is an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct X402Version2;

impl Serialize for X402Version2 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(SUPPORTED_X402_VERSION)
    }
}

impl<'de> Deserialize<'de> for X402Version2 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = u64::deserialize(deserializer)?;
        X402Version2::try_from(v).map_err(serde::de::Error::custom)
    }
}

/// Error returned when an unsupported protocol version is encountered.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported x402 protocol version: {0} (supported: {SUPPORTED_X402_VERSION})")]
pub struct UnsupportedVersionError(pub u64);

impl TryFrom<u64> for X402Version2 {
    type Error = UnsupportedVersionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == SUPPORTED_X402_VERSION {
            Ok(X402Version2)
        } else {
            Err(UnsupportedVersionError(value))
        }
    }
}

/// The `402 Payment Required` response body, as seen by a resource server
/// attaching extensions.
///
/// `accepts` entries are scheme-specific payment requirements; this crate
/// treats them as opaque JSON. Unknown top-level fields (`error`, future
/// additions) survive a round trip through [`serde_json`] via the flattened
/// remainder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Protocol version (always 2).
    pub x402_version: X402Version2,

    /// Payment requirements the client may satisfy, opaque to this crate.
    #[serde(default)]
    pub accepts: Vec<serde_json::Value>,

    /// Self-describing extension records, keyed by extension key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ExtensionMap>,

    /// Remaining fields of the response, carried through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PaymentRequired {
    /// Creates a response with the given accepts array and no extensions.
    pub fn new(accepts: Vec<serde_json::Value>) -> Self {
        Self {
            x402_version: X402Version2,
            accepts,
            extensions: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Merges declared extensions into this response.
    ///
    /// Later declarations win on key collision, matching
    /// [`ExtensionMap::merge`].
    pub fn with_extensions(mut self, declared: ExtensionMap) -> Self {
        match self.extensions.as_mut() {
            Some(existing) => existing.merge(declared),
            None => self.extensions = Some(declared),
        }
        self
    }
}

/// A client-submitted payment payload, as seen by a facilitator or client
/// recovering extensions from it.
///
/// The version field is deliberately lenient: payloads from peers speaking
/// other protocol versions still deserialize, and extension extraction
/// degrades to absence instead of a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// Protocol version as sent by the peer.
    pub x402_version: u64,

    /// Extension records echoed or produced upstream, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ExtensionMap>,

    /// Remaining fields (scheme, chain id, signed payload), carried through
    /// unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PaymentPayload {
    /// Creates a version-2 payload with the given extensions.
    pub fn new(extensions: Option<ExtensionMap>) -> Self {
        Self {
            x402_version: SUPPORTED_X402_VERSION,
            extensions,
            extra: serde_json::Map::new(),
        }
    }

    /// Whether this payload speaks the protocol version this crate supports.
    pub fn is_supported_version(&self) -> bool {
        self.x402_version == SUPPORTED_X402_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_x402_version2_serde() {
        let v = X402Version2;
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "2");

        let parsed: X402Version2 = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, X402Version2);

        // Other versions must be rejected by the strict marker
        assert!(serde_json::from_str::<X402Version2>("1").is_err());
        assert!(serde_json::from_str::<X402Version2>("3").is_err());
    }

    #[test]
    fn test_version_try_from() {
        assert!(X402Version2::try_from(2).is_ok());
        let err = X402Version2::try_from(1).unwrap_err();
        assert_eq!(err.0, 1);
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_payment_payload_lenient_version() {
        // A future version parses; only the gate knows it is unsupported.
        let payload: PaymentPayload = serde_json::from_value(json!({
            "x402Version": 3,
            "scheme": "exact"
        }))
        .unwrap();
        assert_eq!(payload.x402_version, 3);
        assert!(!payload.is_supported_version());
        assert!(payload.extensions.is_none());
    }

    #[test]
    fn test_payment_payload_preserves_unknown_fields() {
        let wire = json!({
            "x402Version": 2,
            "scheme": "exact",
            "chainId": "eip155:8453",
            "payload": { "signature": "0xabc" }
        });
        let payload: PaymentPayload = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(payload.extra.get("scheme"), Some(&json!("exact")));

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back, wire);
    }

    #[test]
    fn test_payment_required_round_trip() {
        let wire = json!({
            "x402Version": 2,
            "accepts": [{ "scheme": "exact", "maxAmountRequired": "1000" }],
            "error": "X-PAYMENT header is required"
        });
        let required: PaymentRequired = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(required.accepts.len(), 1);
        assert_eq!(
            required.extra.get("error"),
            Some(&json!("X-PAYMENT header is required"))
        );

        let back = serde_json::to_value(&required).unwrap();
        assert_eq!(back, wire);
    }
}
