//! Utility types and functions for shapestate.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`NumericTag`] and the numeric precision guard in [`numeric`]

mod error;
pub mod numeric;

pub use error::*;
pub use numeric::NumericTag;
