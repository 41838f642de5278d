//! State persistence - serializer, load dispatch and file helpers.
//!
//! This module provides:
//! - [`Serializer`] - ordered manager registry with whole-file save/load
//! - [`LoadOutcome`] / [`LoadFailure`] - per-manager load reporting
//! - [`DispatchWorker`] - optional single-threaded deferred dispatch
//! - [`save_metadata`] / [`load_metadata`] - single-document convenience

mod serializer;
mod worker;

pub use serializer::{
    load_metadata, read_state_file, save_metadata, LoadFailure, LoadOutcome, Serializer,
};
pub use worker::DispatchWorker;
