//! Extension records, the extension map, and the declaration contract.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The JSON-Schema dialect every schema declared by this crate is written
/// against.
pub const JSON_SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// A self-describing extension: a payload plus the JSON-Schema document
/// that describes it.
///
/// Records are created once by declaration and never mutated; they have no
/// identity beyond structural equality of their fields.
///
/// # Invariant
///
/// `schema` must validate `info` at the moment of declaration. A record that
/// violates this was produced by a buggy declaration, which is an
/// authoring-time defect caught by each extension's consistency test, not a
/// condition handled at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    /// The extension payload. Shape is specific to the extension kind.
    pub info: serde_json::Value,

    /// JSON-Schema 2020-12 document describing the shape of `info`.
    pub schema: serde_json::Value,
}

impl ExtensionRecord {
    /// Creates a record from an already-built info/schema pair.
    pub fn new(info: serde_json::Value, schema: serde_json::Value) -> Self {
        Self { info, schema }
    }
}

/// Extension records keyed by extension key.
///
/// This is the value of the `extensions` field on both `PaymentRequired`
/// and `PaymentPayload`. Keys are unique and wire order is irrelevant; the
/// backing `BTreeMap` makes serialization deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionMap(BTreeMap<String, ExtensionRecord>);

impl ExtensionMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates a map holding a single record, the shape every declaration
    /// produces.
    pub fn single(key: impl Into<String>, record: ExtensionRecord) -> Self {
        let mut map = Self::new();
        map.insert(key, record);
        map
    }

    /// Returns the number of records in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map holds no records.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the record declared under the given key.
    pub fn get(&self, key: &str) -> Option<&ExtensionRecord> {
        self.0.get(key)
    }

    /// Returns true if a record is declared under the given key.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts a record, returning the previous record for the key if any.
    pub fn insert(&mut self, key: impl Into<String>, record: ExtensionRecord) -> Option<ExtensionRecord> {
        self.0.insert(key.into(), record)
    }

    /// Absorbs another map into this one. On key collision the incoming
    /// record wins.
    pub fn merge(&mut self, other: ExtensionMap) {
        self.0.extend(other.0);
    }

    /// Returns an iterator over declared extension keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns an iterator over key/record pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtensionRecord)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, ExtensionRecord)> for ExtensionMap {
    fn from_iter<I: IntoIterator<Item = (String, ExtensionRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Declaration contract every extension kind must satisfy.
///
/// An extension kind is a unique key, an `info` shape, and a schema
/// generator paired 1:1 with that shape. Both `info` and `schema` are built
/// from the same declaration parameters, so the schema is derived rather
/// than independently authored and the two cannot drift apart. Declaration
/// is pure: structurally equal parameters yield structurally equal records.
pub trait X402Extension {
    /// Unique key identifying this extension kind inside an [`ExtensionMap`].
    const KEY: &'static str;

    /// Human-friendly parameters a declaration is built from.
    type Params;

    /// The typed domain shape extraction narrows `info` into.
    type Info: Serialize + DeserializeOwned;

    /// Builds the `info` payload from declaration parameters.
    fn info(params: &Self::Params) -> serde_json::Value;

    /// Builds the JSON-Schema document describing exactly the `info` that
    /// [`X402Extension::info`] produces for the same parameters.
    fn schema(params: &Self::Params) -> serde_json::Value;

    /// Builds the record for a declaration.
    fn record(params: &Self::Params) -> ExtensionRecord {
        ExtensionRecord::new(Self::info(params), Self::schema(params))
    }

    /// Declares this extension: a single-entry map under [`X402Extension::KEY`],
    /// ready to merge into a `PaymentRequired` response.
    fn declare(params: &Self::Params) -> ExtensionMap {
        ExtensionMap::single(Self::KEY, Self::record(params))
    }
}
