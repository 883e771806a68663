//! Wire-level constants of the MDX format.
//!
//! Tags, record widths and flag bit positions reproduce the published
//! format tables. All multi-byte integers in the file are little-endian.

use std::fmt;

/// A 4-byte chunk or track tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(pub [u8; 4]);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

/// File magic bytes.
pub const MAGIC: [u8; 4] = *b"MDLX";

// Top-level chunks, in their required file order.
pub const VERS: Tag = Tag(*b"VERS");
pub const MODL: Tag = Tag(*b"MODL");
pub const SEQS: Tag = Tag(*b"SEQS");
pub const GLBS: Tag = Tag(*b"GLBS");
pub const MTLS: Tag = Tag(*b"MTLS");
pub const TEXS: Tag = Tag(*b"TEXS");
pub const TXAN: Tag = Tag(*b"TXAN");
pub const GEOS: Tag = Tag(*b"GEOS");

// Nested blocks.
pub const LAYS: Tag = Tag(*b"LAYS");
pub const VRTX: Tag = Tag(*b"VRTX");
pub const NRMS: Tag = Tag(*b"NRMS");
pub const PTYP: Tag = Tag(*b"PTYP");
pub const PCNT: Tag = Tag(*b"PCNT");
pub const PVTX: Tag = Tag(*b"PVTX");
pub const GNDX: Tag = Tag(*b"GNDX");

// Keyframe track sub-tags.
pub const KMTA: Tag = Tag(*b"KMTA");
pub const KMTF: Tag = Tag(*b"KMTF");
pub const KTAT: Tag = Tag(*b"KTAT");
pub const KTAR: Tag = Tag(*b"KTAR");
pub const KTAS: Tag = Tag(*b"KTAS");

/// Width of fixed-length name fields.
pub const NAME_LEN: usize = 80;
/// Width of fixed-length texture path fields.
pub const PATH_LEN: usize = 256;

/// Byte width of one tiled `SEQS` record.
pub const SEQS_RECORD: usize = 132;
/// Byte width of one tiled `TEXS` record.
pub const TEXS_RECORD: usize = 268;
/// Fixed header of a material record: own length, priority plane, flags.
pub const MTLS_HEADER: usize = 12;

// Material render flags.
pub const MAT_CONSTANT_COLOR: u32 = 0x01;
pub const MAT_SORT_PRIMS_FAR_Z: u32 = 0x10;
pub const MAT_FULL_RESOLUTION: u32 = 0x20;

// Layer shading flags.
pub const LAYER_UNSHADED: u32 = 0x01;
pub const LAYER_SPHERE_ENV_MAP: u32 = 0x02;
pub const LAYER_TWO_SIDED: u32 = 0x10;
pub const LAYER_UNFOGGED: u32 = 0x20;
pub const LAYER_NO_DEPTH_TEST: u32 = 0x40;
pub const LAYER_NO_DEPTH_SET: u32 = 0x80;

// Texture wrap flags.
pub const TEX_WRAP_WIDTH: u32 = 0x01;
pub const TEX_WRAP_HEIGHT: u32 = 0x02;
