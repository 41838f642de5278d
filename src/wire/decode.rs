//! Decoding self-describing JSON back into metadata values.
//!
//! Structural failures - a missing required field, a payload of the wrong
//! JSON shape, an unknown type tag - are fatal to the element being decoded
//! and surface as errors; nothing is silently skipped or defaulted. Numbers
//! pass through the precision guard on their way into the declared slot.

use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::core::{Key, Metadata, ProxyValue, Value, Version};
use crate::util::{numeric, Error, Result};
use crate::wire::tags::*;

/// Decode a tagged wrapper `{ "<tag>": <payload> }` into a value.
pub fn value_from_tagged(json: &Json) -> Result<Value> {
    let map = object(json, "tagged value")?;
    if map.len() != 1 {
        return Err(Error::invalid(format!(
            "tagged value must have exactly one entry, got {}",
            map.len()
        )));
    }
    let (name, payload) = map.iter().next().expect("len checked");
    let tag = TypeTag::from_name(name)
        .ok_or_else(|| Error::UnsupportedType(format!("unknown type tag '{name}'")))?;
    payload_to_value(tag, payload)
}

/// Decode one (key, value) element of a document.
pub fn element_from_json(json: &Json) -> Result<(Key, Value)> {
    let map = object(json, "element")?;
    let id = string_field(map, FIELD_KEY)?;
    let value = value_from_tagged(field(map, FIELD_VALUE)?)?;
    Ok((Key::of(id), value))
}

/// Decode a metadata document body `[ <version>, [ <element>... ] ]`.
pub fn metadata_from_payload(json: &Json) -> Result<Metadata> {
    let parts = match json.as_array() {
        Some(parts) if parts.len() == 2 => parts,
        _ => {
            return Err(Error::invalid(
                "metadata body must be a two-element array [version, elements]",
            ))
        }
    };
    let version = version_from_tagged(&parts[0])?;
    let elements = parts[1]
        .as_array()
        .ok_or_else(|| Error::invalid("metadata elements must be an array"))?;

    let mut builder = Metadata::builder(version);
    for element in elements {
        let (key, value) = element_from_json(element)?;
        builder.put_value(key, value);
    }
    Ok(builder.build())
}

/// Decode a tagged metadata document `{ "Metadata": <body> }`.
pub fn metadata_from_tagged(json: &Json) -> Result<Metadata> {
    match value_from_tagged(json)? {
        Value::Metadata(md) => Ok(md),
        other => Err(Error::mismatch("metadata", other.kind_name())),
    }
}

fn version_from_tagged(json: &Json) -> Result<Version> {
    let map = object(json, "version")?;
    let text = map
        .get(TypeTag::Version.name())
        .and_then(Json::as_str)
        .ok_or_else(|| Error::invalid("expected { \"Version\": \"<major>.<minor>\" }"))?;
    text.parse()
}

/// Decode a payload against its declared tag.
pub fn payload_to_value(tag: TypeTag, payload: &Json) -> Result<Value> {
    match tag {
        TypeTag::Null => match payload {
            Json::Null => Ok(Value::Null),
            other => Err(shape_error("null", other)),
        },
        TypeTag::Boolean => payload
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| shape_error("boolean", payload)),
        TypeTag::Character => {
            let s = payload
                .as_str()
                .ok_or_else(|| shape_error("single-character string", payload))?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(Error::invalid(format!(
                    "character payload must hold exactly one char, got {s:?}"
                ))),
            }
        }
        TypeTag::String => payload
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| shape_error("string", payload)),
        TypeTag::Byte
        | TypeTag::Short
        | TypeTag::Integer
        | TypeTag::Long
        | TypeTag::Float
        | TypeTag::Double => {
            let number = match payload {
                Json::Number(n) => n,
                other => return Err(shape_error("number", other)),
            };
            let slot = tag.numeric().expect("numeric tag");
            numeric::coerce(&widest(number, slot)?, slot)
        }
        TypeTag::Metadata => Ok(Value::Metadata(metadata_from_payload(payload)?)),
        TypeTag::Key => payload
            .as_str()
            .map(|s| Value::Key(Key::of(s)))
            .ok_or_else(|| shape_error("key id string", payload)),
        TypeTag::Version => payload
            .as_str()
            .ok_or_else(|| shape_error("version string", payload))?
            .parse()
            .map(Value::Version),
        TypeTag::List => Ok(Value::List(collection_items(payload)?)),
        TypeTag::Set => Ok(Value::set(collection_items(payload)?)),
        TypeTag::SortedSet => Ok(Value::sorted_set(collection_items(payload)?)),
        TypeTag::Map => Ok(Value::map(map_pairs(TypeTag::Map, payload)?)),
        TypeTag::SortedMap => Ok(Value::sorted_map(map_pairs(TypeTag::SortedMap, payload)?)),
        TypeTag::ProxiedObject => {
            let map = object(payload, "proxied object")?;
            let type_key = Key::of(string_field(map, FIELD_PROXIED_TYPE)?);
            let metadata = metadata_from_payload(field(map, FIELD_PROXY_METADATA)?)?;
            Ok(Value::Proxy(ProxyValue { type_key, metadata }))
        }
    }
}

/// Lift a JSON number into its widest dynamic representation.
fn widest(number: &Number, slot: numeric::NumericTag) -> Result<Value> {
    if let Some(v) = number.as_i64() {
        Ok(Value::I64(v))
    } else if let Some(v) = number.as_f64() {
        Ok(Value::F64(v))
    } else {
        // u64 beyond i64::MAX; no signed slot can hold it.
        Err(Error::InaccurateConversion {
            value: number.to_string(),
            target: slot.name().to_string(),
        })
    }
}

fn collection_items(payload: &Json) -> Result<Vec<Value>> {
    let map = object(payload, "collection envelope")?;
    let value_type = tag_field(map, FIELD_VALUE_TYPE)?;
    let items = field(map, FIELD_VALUE)?
        .as_array()
        .ok_or_else(|| Error::invalid("collection 'value' must be an array"))?;

    items
        .iter()
        .map(|item| match item {
            Json::Null => Ok(Value::Null),
            other => payload_to_value(value_type, other),
        })
        .collect()
}

fn map_pairs(expected_flavor: TypeTag, payload: &Json) -> Result<Vec<(Value, Value)>> {
    let map = object(payload, "map envelope")?;
    let flavor = tag_field(map, FIELD_MAP_TYPE)?;
    if flavor != expected_flavor {
        return Err(Error::mismatch(expected_flavor.name(), flavor.name()));
    }
    let key_type = tag_field(map, FIELD_KEY_TYPE)?;
    let value_type = tag_field(map, FIELD_VALUE_TYPE)?;
    let entries = object(field(map, FIELD_VALUE)?, "map 'value'")?;

    let mut out = Vec::with_capacity(entries.len());
    for (key_string, value_json) in entries {
        let key = if key_string == NULL_MAP_KEY {
            Value::Null
        } else {
            key_from_string(key_type, key_string)?
        };
        let value = match value_json {
            Json::Null => Value::Null,
            other => payload_to_value(value_type, other)?,
        };
        out.push((key, value));
    }
    Ok(out)
}

/// Parse a map key back from its canonical string form.
pub(crate) fn key_from_string(tag: TypeTag, s: &str) -> Result<Value> {
    let bad = || Error::invalid(format!("map key {s:?} is not a valid {}", tag.name()));
    Ok(match tag {
        TypeTag::Boolean => match s {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(bad()),
        },
        TypeTag::Character => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return Err(bad()),
            }
        }
        TypeTag::String => Value::String(s.to_string()),
        TypeTag::Byte | TypeTag::Short | TypeTag::Integer | TypeTag::Long => {
            let wide = s.parse::<i64>().map_err(|_| bad())?;
            numeric::coerce(&Value::I64(wide), tag.numeric().expect("numeric tag"))?
        }
        TypeTag::Float | TypeTag::Double => {
            let wide = s.parse::<f64>().map_err(|_| bad())?;
            numeric::coerce(&Value::F64(wide), tag.numeric().expect("numeric tag"))?
        }
        TypeTag::Key => Value::Key(Key::of(s)),
        TypeTag::Version => Value::Version(s.parse()?),
        other => {
            return Err(Error::UnsupportedType(format!(
                "{} cannot be a map key",
                other.name()
            )))
        }
    })
}

fn object<'a>(json: &'a Json, what: &str) -> Result<&'a JsonMap<String, Json>> {
    json.as_object()
        .ok_or_else(|| Error::invalid(format!("{what} must be a JSON object")))
}

fn field<'a>(map: &'a JsonMap<String, Json>, name: &str) -> Result<&'a Json> {
    map.get(name)
        .ok_or_else(|| Error::invalid(format!("missing field '{name}'")))
}

fn string_field<'a>(map: &'a JsonMap<String, Json>, name: &str) -> Result<&'a str> {
    field(map, name)?
        .as_str()
        .ok_or_else(|| Error::invalid(format!("field '{name}' must be a string")))
}

fn tag_field(map: &JsonMap<String, Json>, name: &str) -> Result<TypeTag> {
    let text = string_field(map, name)?;
    TypeTag::from_name(text)
        .ok_or_else(|| Error::UnsupportedType(format!("unknown type tag '{text}'")))
}

fn shape_error(expected: &str, got: &Json) -> Error {
    Error::invalid(format!("expected {expected} payload, got {got}"))
}
