//! Self-describing extensions for x402 v2 protocol messages.
//!
//! An x402 resource server can attach machine-validatable metadata, an
//! *extension*, to its `402 Payment Required` response, and a facilitator
//! or client can later recover that metadata from the client's payment
//! payload without trusting the producer: every extension carries the
//! JSON-Schema 2020-12 document its payload must satisfy.
//!
//! This crate provides:
//! - the extension data model ([`ExtensionRecord`], [`ExtensionMap`]) and
//!   the [`X402Extension`] contract every extension kind satisfies
//! - [`validate_extension`]: checking a record's `info` against its own
//!   `schema`, always returning a [`ValidationResult`] and never failing
//! - [`extract_extension`]: version-gated, optionally-validated recovery of
//!   a typed extension value from a [`PaymentPayload`], degrading to
//!   absence (never panicking) on anything unusable
//! - the built-in discovery extension ([`extensions::discovery`], key
//!   `"bazaar"`) describing how a payment-gated endpoint is called
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use x402_extensions::extensions::discovery::{
//!     declare_discovery_extension, extract_discovery_info, EndpointDescription,
//! };
//! use x402_extensions::PaymentPayload;
//!
//! // Resource server side: declare the extension.
//! let declared = declare_discovery_extension(
//!     &EndpointDescription::new()
//!         .with_method("POST")
//!         .with_input(
//!             json!({ "query": "x" }),
//!             Some(json!({
//!                 "properties": { "query": { "type": "string" } },
//!                 "required": ["query"]
//!             })),
//!         ),
//! );
//!
//! // Facilitator side: recover it from the payment payload.
//! let payload = PaymentPayload::new(Some(declared));
//! let discovery = extract_discovery_info(&payload);
//! assert_eq!(discovery.value.unwrap().method.as_deref(), Some("POST"));
//! ```

pub mod extensions;
pub mod proto;

pub use extensions::{
    extract_extension, extract_extension_for, validate_extension, ExtensionMap, ExtensionRecord,
    ExtractOptions, Extracted, ValidationResult, X402Extension,
};
pub use proto::{
    PaymentPayload, PaymentRequired, UnsupportedVersionError, X402Version2,
    SUPPORTED_X402_VERSION,
};
