//! Extension system for x402 v2 protocol messages.
//!
//! An extension is a named `{info, schema}` pair attached to a protocol
//! message: `info` is the extension's payload and `schema` is a JSON-Schema
//! 2020-12 document describing exactly the shape `info` must have. Because
//! every record carries its own schema, a consumer can check an extension it
//! has never seen before without trusting the producer.
//!
//! # Architecture
//!
//! - `record`: [`ExtensionRecord`], [`ExtensionMap`] and the [`X402Extension`]
//!   declaration contract
//! - `validation`: checking a record's `info` against its own `schema`
//! - `extract`: recovering a typed extension value from a [`PaymentPayload`]
//! - `discovery`: the built-in "bazaar" discovery extension
//!
//! # Extending with Custom Extensions
//!
//! To add a new extension kind:
//! 1. Pick a unique key and an `info` shape
//! 2. Implement [`X402Extension`] with a schema generator derived from the
//!    same declaration parameters as the `info` builder
//! 3. Add a consistency test asserting `validate_extension` accepts every
//!    record your `declare` produces
//!
//! [`PaymentPayload`]: crate::proto::PaymentPayload

pub mod discovery;

mod extract;
mod record;
mod validation;

pub use extract::{extract_extension, extract_extension_for, ExtractOptions, Extracted};
pub use record::{ExtensionMap, ExtensionRecord, X402Extension, JSON_SCHEMA_DIALECT};
pub use validation::{validate_extension, ValidationResult};
