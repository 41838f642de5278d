//! # shapestate
//!
//! Typed metadata persistence framework for 3D shape-model viewers.
//!
//! Application state - camera poses, color bars, loaded structures, panel
//! layouts - is captured as self-describing metadata documents and written to
//! a versioned JSON state file. Every value carries a type tag on the wire,
//! so a file can be read back without any out-of-band schema, and numeric
//! slots are repopulated through a precision guard that refuses lossy
//! narrowing instead of silently corrupting data.
//!
//! ## Modules
//!
//! - [`util`] - Errors and the numeric precision guard
//! - [`core`] - Keys, versions, values and the metadata container family
//! - [`registry`] - Manager contracts and polymorphic reconstruction
//! - [`wire`] - The self-describing JSON codec
//! - [`state`] - The serializer, load dispatch and file helpers
//!
//! ## Example
//!
//! ```ignore
//! use shapestate::prelude::*;
//!
//! let mut serializer = Serializer::new();
//! serializer.register(Key::of("view.camera"), shared(camera))?;
//! serializer.save("session.json")?;
//! // ... later, a fresh process:
//! let outcome = serializer.load("session.json")?;
//! assert!(outcome.is_clean());
//! ```

pub mod core;
pub mod registry;
pub mod state;
pub mod util;
pub mod wire;

// Re-export commonly used types
pub use crate::core::{Key, Metadata, MetadataBuilder, MetadataView, Value, Version};
pub use crate::util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        FromValue, Key, Metadata, MetadataBuilder, MetadataView, ProxyValue, Value, Version,
    };
    pub use crate::registry::{
        shared, InstanceGetter, ManagerCollection, MetadataManager, SharedManager,
        StorableAsMetadata,
    };
    pub use crate::state::{
        load_metadata, save_metadata, DispatchWorker, LoadOutcome, Serializer,
    };
    pub use crate::util::{Error, NumericTag, Result};
    pub use crate::wire::TypeTag;
}
