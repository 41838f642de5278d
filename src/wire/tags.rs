//! Type-tag table - the wire format's single extension point.
//!
//! Every serialized value is identified by a short stable tag. The tag names
//! are part of the file format and must never change once released.

use std::fmt;

use crate::core::Value;
use crate::util::NumericTag;

/// Wire identifier for a value shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Boolean,
    Character,
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Metadata,
    Key,
    Version,
    List,
    Set,
    SortedSet,
    Map,
    SortedMap,
    ProxiedObject,
}

/// Field name pairing an element with its originating key.
pub const FIELD_KEY: &str = "key";
/// Field name holding an element's tagged value.
pub const FIELD_VALUE: &str = "value";
/// Collection envelope: element tag.
pub const FIELD_VALUE_TYPE: &str = "valueType";
/// Map envelope: map flavor tag.
pub const FIELD_MAP_TYPE: &str = "mapType";
/// Map envelope: key tag.
pub const FIELD_KEY_TYPE: &str = "keyType";
/// Proxy envelope: discriminator naming the concrete type.
pub const FIELD_PROXIED_TYPE: &str = "proxiedType";
/// Proxy envelope: the object's own metadata.
pub const FIELD_PROXY_METADATA: &str = "proxyMetadata";

/// Reserved map-key string standing for a null key.
///
/// A NUL byte cannot appear in any canonically encoded real key, so the
/// sentinel is unambiguous; real string keys starting with NUL are rejected
/// at encode time.
pub const NULL_MAP_KEY: &str = "\u{0}";

impl TypeTag {
    /// Stable wire name of this tag.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean => "Boolean",
            Self::Character => "Character",
            Self::String => "String",
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Metadata => "Metadata",
            Self::Key => "Key",
            Self::Version => "Version",
            Self::List => "List",
            Self::Set => "Set",
            Self::SortedSet => "SortedSet",
            Self::Map => "Map",
            Self::SortedMap => "SortedMap",
            Self::ProxiedObject => "ProxiedObject",
        }
    }

    /// Parse a tag from its wire name. Unknown names yield `None`; the caller
    /// turns that into an unsupported-type error.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Null" => Self::Null,
            "Boolean" => Self::Boolean,
            "Character" => Self::Character,
            "String" => Self::String,
            "Byte" => Self::Byte,
            "Short" => Self::Short,
            "Integer" => Self::Integer,
            "Long" => Self::Long,
            "Float" => Self::Float,
            "Double" => Self::Double,
            "Metadata" => Self::Metadata,
            "Key" => Self::Key,
            "Version" => Self::Version,
            "List" => Self::List,
            "Set" => Self::Set,
            "SortedSet" => Self::SortedSet,
            "Map" => Self::Map,
            "SortedMap" => Self::SortedMap,
            "ProxiedObject" => Self::ProxiedObject,
            _ => return None,
        })
    }

    /// The tag describing a runtime value's shape.
    ///
    /// Total by construction: the value space is a closed enum, so every
    /// shape has an entry. Unsupported-type errors can therefore only arise
    /// while decoding foreign data.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Char(_) => Self::Character,
            Value::String(_) => Self::String,
            Value::I8(_) => Self::Byte,
            Value::I16(_) => Self::Short,
            Value::I32(_) => Self::Integer,
            Value::I64(_) => Self::Long,
            Value::F32(_) => Self::Float,
            Value::F64(_) => Self::Double,
            Value::Metadata(_) => Self::Metadata,
            Value::Key(_) => Self::Key,
            Value::Version(_) => Self::Version,
            Value::List(_) => Self::List,
            Value::Set(_) => Self::Set,
            Value::SortedSet(_) => Self::SortedSet,
            Value::Map(_) => Self::Map,
            Value::SortedMap(_) => Self::SortedMap,
            Value::Proxy(_) => Self::ProxiedObject,
        }
    }

    /// The numeric slot behind this tag, if it is numeric.
    pub fn numeric(self) -> Option<NumericTag> {
        match self {
            Self::Byte => Some(NumericTag::I8),
            Self::Short => Some(NumericTag::I16),
            Self::Integer => Some(NumericTag::I32),
            Self::Long => Some(NumericTag::I64),
            Self::Float => Some(NumericTag::F32),
            Self::Double => Some(NumericTag::F64),
            _ => None,
        }
    }

    /// True for the map flavors.
    pub fn is_map(self) -> bool {
        matches!(self, Self::Map | Self::SortedMap)
    }

    /// True for the non-map collection flavors.
    pub fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::Set | Self::SortedSet)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
