//! Encoding metadata values into self-describing JSON.
//!
//! Every value wraps as a single-entry tagged object `{ "<tag>": <payload> }`.
//! Collections and maps carry richer envelopes that declare their element
//! types once, discovered from the first non-null element; all elements are
//! then rendered against the declared type, so a heterogeneous collection is
//! an encode-time error rather than silent corruption.
//!
//! Object keys are emitted in sorted order (serde_json's default map), which
//! makes repeated encodings of equal documents byte-identical.

use serde_json::{json, Map as JsonMap, Number, Value as Json};

use crate::core::{Key, MetadataView, Value};
use crate::util::{Error, Result};
use crate::wire::tags::*;

/// Encode a value as its tagged wrapper `{ "<tag>": <payload> }`.
pub fn tagged(value: &Value) -> Result<Json> {
    let tag = TypeTag::of_value(value);
    Ok(json!({ tag.name(): payload(value)? }))
}

/// Encode one (key, value) element of a document.
pub fn element(key: &Key, value: &Value) -> Result<Json> {
    Ok(json!({ FIELD_KEY: key.id(), FIELD_VALUE: tagged(value)? }))
}

/// Encode a metadata document body: `[ <version>, [ <element>... ] ]`.
pub fn metadata_payload(view: MetadataView<'_>) -> Result<Json> {
    let version = json!({ TypeTag::Version.name(): view.version().to_string() });
    let mut elements = Vec::with_capacity(view.len());
    for (key, value) in view.entries() {
        elements.push(element(key, value)?);
    }
    Ok(Json::Array(vec![version, Json::Array(elements)]))
}

/// Encode a metadata document with its tag: `{ "Metadata": <body> }`.
pub fn metadata_tagged(view: MetadataView<'_>) -> Result<Json> {
    Ok(json!({ TypeTag::Metadata.name(): metadata_payload(view)? }))
}

/// Untagged payload of a value; the caller supplies the tag context.
pub fn payload(value: &Value) -> Result<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(v) => Json::Bool(*v),
        Value::Char(v) => Json::String(v.to_string()),
        Value::String(v) => Json::String(v.clone()),
        Value::I8(v) => json!(v),
        Value::I16(v) => json!(v),
        Value::I32(v) => json!(v),
        Value::I64(v) => json!(v),
        Value::F32(v) => float_number(*v as f64)?,
        Value::F64(v) => float_number(*v)?,
        Value::Metadata(md) => metadata_payload(md.view())?,
        Value::Key(k) => Json::String(k.id().to_string()),
        Value::Version(v) => Json::String(v.to_string()),
        Value::List(items) | Value::Set(items) | Value::SortedSet(items) => {
            collection_envelope(items)?
        }
        Value::Map(pairs) => map_envelope(TypeTag::Map, pairs)?,
        Value::SortedMap(pairs) => map_envelope(TypeTag::SortedMap, pairs)?,
        Value::Proxy(proxy) => json!({
            FIELD_PROXIED_TYPE: proxy.type_key.id(),
            FIELD_PROXY_METADATA: metadata_payload(proxy.metadata.view())?,
        }),
    })
}

fn float_number(v: f64) -> Result<Json> {
    Number::from_f64(v)
        .map(Json::Number)
        .ok_or_else(|| Error::UnsupportedType(format!("non-finite float {v}")))
}

/// Element type of a collection: the tag of the first non-null element, or
/// `Null` for empty/all-null collections.
fn discover<'a>(values: impl IntoIterator<Item = &'a Value>) -> TypeTag {
    values
        .into_iter()
        .map(TypeTag::of_value)
        .find(|tag| *tag != TypeTag::Null)
        .unwrap_or(TypeTag::Null)
}

fn typed_payload(value: &Value, declared: TypeTag) -> Result<Json> {
    if value.is_null() {
        return Ok(Json::Null);
    }
    let actual = TypeTag::of_value(value);
    if actual != declared {
        return Err(Error::mismatch(declared.name(), actual.name()));
    }
    payload(value)
}

/// `{ "valueType": <tag>, "value": [ <payload>... ] }`
fn collection_envelope(items: &[Value]) -> Result<Json> {
    let value_type = discover(items);
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(typed_payload(item, value_type)?);
    }
    Ok(json!({ FIELD_VALUE_TYPE: value_type.name(), FIELD_VALUE: out }))
}

/// `{ "mapType": <tag>, "keyType": <tag>, "valueType": <tag>, "value": {...} }`
fn map_envelope(map_type: TypeTag, pairs: &[(Value, Value)]) -> Result<Json> {
    let key_type = discover(pairs.iter().map(|(k, _)| k));
    let value_type = discover(pairs.iter().map(|(_, v)| v));

    let mut out = JsonMap::new();
    for (key, value) in pairs {
        let key_string = if key.is_null() {
            NULL_MAP_KEY.to_string()
        } else {
            let actual = TypeTag::of_value(key);
            if actual != key_type {
                return Err(Error::mismatch(key_type.name(), actual.name()));
            }
            wire_key_string(key)?
        };
        out.insert(key_string, typed_payload(value, value_type)?);
    }
    Ok(json!({
        FIELD_MAP_TYPE: map_type.name(),
        FIELD_KEY_TYPE: key_type.name(),
        FIELD_VALUE_TYPE: value_type.name(),
        FIELD_VALUE: out,
    }))
}

/// Canonical string form of a map key.
///
/// Only scalar, key and version shapes can stand as map keys; anything else
/// has no unambiguous string form and is rejected.
pub(crate) fn wire_key_string(key: &Value) -> Result<String> {
    let s = match key {
        Value::Bool(v) => v.to_string(),
        Value::Char(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::Key(k) => k.id().to_string(),
        Value::Version(v) => v.to_string(),
        other => {
            return Err(Error::UnsupportedType(format!(
                "{} cannot be a map key",
                other.kind_name()
            )))
        }
    };
    // Checked on the canonical form, not just the String arm: a NUL char key
    // or a key id starting with NUL would also render as the sentinel and
    // decode back as a null key.
    if s.starts_with('\u{0}') {
        return Err(Error::UnsupportedType(
            "map key encoding starting with NUL collides with the null-key sentinel".to_string(),
        ));
    }
    Ok(s)
}
