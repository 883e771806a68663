//! # mdx
//!
//! Rust decoder for the Warcraft III MDX binary model format.
//!
//! MDX is a chunked little-endian format: a `MDLX` magic header followed
//! by tagged, length-framed chunks for model metadata, animation
//! sequences, materials, textures, texture animations and geometry.
//! This crate decodes such files into a plain in-memory [`model::Model`]
//! for tools that inspect or convert models. It is decode-only; there is
//! no writer.
//!
//! ## Modules
//!
//! - [`util`] - Error and result types
//! - [`decode`] - Chunk framing, byte sources, record decoders
//! - [`model`] - The decoded object graph
//!
//! ## Example
//!
//! ```ignore
//! let model = mdx::load("footman.mdx")?;
//! println!("{} geosets", model.geosets.len());
//! ```

pub mod decode;
pub mod model;
pub mod util;

// Re-export commonly used types
pub use decode::{load, load_from, Loader};
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::decode::{load, load_from, Loader};
    pub use crate::model::*;
    pub use crate::util::{Error, Result};
}
