//! Low-level MDX binary format decoding.
//!
//! The format is a sequence of tagged, length-framed chunks in a fixed
//! order. [`load`] and [`load_from`] are the entry points; [`Loader`]
//! drives the chunk walk and the nested record decoding.

pub mod format;

mod faces;
mod loader;
mod source;
mod track;

pub use loader::Loader;
pub use source::{ByteSource, SliceCursor, StreamCursor};

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::model::Model;
use crate::util::{Error, Result};

/// Open and decode an MDX file.
pub fn load(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;
    load_from(BufReader::new(file))
}

/// Decode an MDX model from an open, seekable byte source.
pub fn load_from<R: Read + Seek>(source: R) -> Result<Model> {
    Loader::new(source).load()
}
