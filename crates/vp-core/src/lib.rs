//! vp-core: shared types, IDs, errors, and configuration.
//!
//! This crate is the foundational dependency for the other vp-* crates,
//! providing the request identifier, a unified error type, the encode
//! profile enums, and application configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use media::*;
