//! Core layer - identifiers, values and metadata documents.
//!
//! This module provides:
//! - [`Key`] - string-identified, phantom-typed handle
//! - [`Version`] - (major, minor) document format tag
//! - [`Value`] / [`FromValue`] - the dynamic value space and typed extraction
//! - [`Metadata`] / [`MetadataBuilder`] / [`MetadataView`] - the container family

mod key;
mod metadata;
mod value;
mod version;

pub use key::Key;
pub use metadata::{Metadata, MetadataBuilder, MetadataView};
pub use value::{FromValue, ProxyValue, Value};
pub use version::Version;
