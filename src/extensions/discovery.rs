//! The "bazaar" discovery extension.
//!
//! Lets a resource server describe how its payment-gated endpoint is called
//! (HTTP method, resource URL, an example input, a schema fragment for the
//! input object, an example output) so that crawlers and marketplaces can
//! index x402 endpoints without out-of-band documentation.
//!
//! This is the reference instantiation of the extension pattern: a fixed
//! key, one `info` shape, a schema generator derived from the same
//! declaration parameters, and declare/extract entry points that are thin
//! wrappers over the generic engine.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use url::Url;

use super::extract::{extract_extension_for, ExtractOptions, Extracted};
use super::record::{ExtensionMap, X402Extension, JSON_SCHEMA_DIALECT};
use crate::proto::PaymentPayload;

/// Extension key for discovery metadata.
pub const DISCOVERY_EXTENSION_KEY: &str = "bazaar";

/// Human-friendly declaration parameters: how the endpoint behind a
/// `PaymentRequired` response is called.
///
/// Every field is optional; fields left as `None` are omitted from both the
/// declared `info` and its generated schema. An `input_schema` fragment is
/// only meaningful for an object-shaped `input`; supplied alongside a
/// non-object input (or as a non-object itself) it is likewise dropped from
/// both sides, keeping the record consistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointDescription {
    /// HTTP method used to call the endpoint.
    pub method: Option<String>,

    /// URL of the endpoint.
    pub resource: Option<Url>,

    /// Example input value the endpoint accepts.
    pub input: Option<Value>,

    /// JSON-Schema fragment (`properties`, `required`, ...) constraining
    /// the input object.
    pub input_schema: Option<Value>,

    /// Example output value the endpoint returns.
    pub output: Option<Value>,
}

impl EndpointDescription {
    /// Creates an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the endpoint URL.
    pub fn with_resource(mut self, resource: Url) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Sets the example input and an optional schema fragment for it.
    pub fn with_input(mut self, input: Value, input_schema: Option<Value>) -> Self {
        self.input = Some(input);
        self.input_schema = input_schema;
        self
    }

    /// Sets the example output.
    pub fn with_output_example(mut self, example: Value) -> Self {
        self.output = Some(example);
        self
    }
}

/// Discovery metadata recovered from a payment payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryInfo {
    /// HTTP method used to call the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// URL of the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Url>,

    /// Example input value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,

    /// Schema fragment constraining the input object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,

    /// Example output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<DiscoveryOutput>,
}

/// Output description inside [`DiscoveryInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOutput {
    /// Example output value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Marker type for the discovery extension kind.
pub struct DiscoveryExtension;

/// One declared field of the discovery `info`: key, info value, and the
/// schema describing that value. Both sides of the record are assembled
/// from this single walk, so a field is either present in both or in
/// neither.
fn declared_fields(desc: &EndpointDescription) -> Vec<(&'static str, Value, Value)> {
    let mut fields = Vec::new();

    if let Some(method) = &desc.method {
        fields.push(("method", json!(method), json!({ "type": "string" })));
    }

    if let Some(resource) = &desc.resource {
        fields.push((
            "resource",
            json!(resource),
            json!({ "type": "string", "format": "uri" }),
        ));
    }

    if let Some(input) = &desc.input {
        let fragment = desc
            .input_schema
            .as_ref()
            .and_then(Value::as_object)
            .filter(|_| input.is_object());

        let input_property = match fragment {
            Some(fragment) => {
                let mut property = Map::new();
                property.insert("type".to_string(), json!("object"));
                for (keyword, value) in fragment {
                    property.insert(keyword.clone(), value.clone());
                }
                Value::Object(property)
            }
            None => json!({}),
        };
        fields.push(("input", input.clone(), input_property));

        if let Some(fragment) = fragment {
            fields.push((
                "inputSchema",
                Value::Object(fragment.clone()),
                json!({ "type": "object" }),
            ));
        }
    }

    if let Some(example) = &desc.output {
        fields.push((
            "output",
            json!({ "example": example }),
            json!({
                "type": "object",
                "properties": { "example": {} },
                "required": ["example"]
            }),
        ));
    }

    fields
}

impl X402Extension for DiscoveryExtension {
    const KEY: &'static str = DISCOVERY_EXTENSION_KEY;
    type Params = EndpointDescription;
    type Info = DiscoveryInfo;

    fn info(desc: &EndpointDescription) -> Value {
        let mut info = Map::new();
        for (key, value, _) in declared_fields(desc) {
            info.insert(key.to_string(), value);
        }
        Value::Object(info)
    }

    fn schema(desc: &EndpointDescription) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (key, _, property) in declared_fields(desc) {
            properties.insert(key.to_string(), property);
            required.push(Value::String(key.to_string()));
        }
        json!({
            "$schema": JSON_SCHEMA_DIALECT,
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }
}

/// Declares the discovery extension for an endpoint, ready to merge into a
/// `PaymentRequired` response.
pub fn declare_discovery_extension(description: &EndpointDescription) -> ExtensionMap {
    DiscoveryExtension::declare(description)
}

/// Recovers discovery metadata from a payment payload, validating the
/// record against its embedded schema. Absent when the payload is not
/// version 2, carries no discovery extension, or carries one that fails
/// validation.
pub fn extract_discovery_info(payload: &PaymentPayload) -> Extracted<DiscoveryInfo> {
    extract_extension_for::<DiscoveryExtension>(payload, ExtractOptions::default())
}
