//! Self-describing JSON wire codec.
//!
//! ## Format
//!
//! ```text
//! value     := { "<tag>": <payload> }
//! element   := { "key": "<id>", "value": <value> }
//! metadata  := [ { "Version": "<major>.<minor>" }, [ <element>... ] ]
//! list/set  := { "valueType": "<tag>", "value": [ <payload>... ] }
//! map       := { "mapType": "<tag>", "keyType": "<tag>",
//!                "valueType": "<tag>", "value": { "<key>": <payload>... } }
//! proxy     := { "proxiedType": "<id>", "proxyMetadata": <metadata> }
//! ```
//!
//! Collection element types are discovered from the first non-null element
//! and declared once; a null map key is written as the reserved NUL-string
//! sentinel, never as the literal text "null".

pub mod decode;
pub mod encode;
mod tags;

pub use tags::{TypeTag, NULL_MAP_KEY};
