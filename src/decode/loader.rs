//! MDX chunk decoding.
//!
//! The loader walks the fixed top-level chunk order and decodes each
//! length-framed block. Blocks holding nested variable-length records
//! (materials, texture animations, geosets) are buffered whole, then
//! parsed by pushing a bounded [`SliceCursor`] over the buffered bytes,
//! so the shared decoding paths run unchanged against sub-block data.
//! Self-length-prefixed records are walked by their declared byte length
//! with the declared length as consumption budget.

use std::io::{Read, Seek};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::decode::faces;
use crate::decode::format::{self, Tag};
use crate::decode::source::{ByteSource, SliceCursor, StreamCursor};
use crate::decode::track::{self, TrackClass};
use crate::model::{
    Animation, Geoset, Layer, Material, Model, ModelInfo, PrimitiveKind, Primitives, Texture,
    TextureAnim,
};
use crate::util::{Error, Result};

/// Decoder for one MDX source.
///
/// A loader owns its source exclusively for the duration of the decode.
/// [`load`](Self::load) reads the whole model from the source's current
/// position; on failure no partial model is observable.
pub struct Loader<R> {
    stream: StreamCursor<R>,
    /// Nested slice scopes; the innermost one is the active source.
    slices: Vec<SliceCursor>,
}

impl<R: Read + Seek> Loader<R> {
    /// Create a loader over an open, seekable byte source.
    pub fn new(source: R) -> Self {
        Self {
            stream: StreamCursor::new(source),
            slices: Vec::new(),
        }
    }

    /// Decode the whole model.
    pub fn load(&mut self) -> Result<Model> {
        self.check_magic()?;
        let version = self.load_version()?;
        let info = self.load_model_info()?;
        let sequences = self.load_sequences()?;
        let global_sequences = self.load_global_sequences()?;
        let materials = self.load_materials()?;
        let textures = self.load_textures()?;
        let texture_anims = self.load_texture_anims()?;
        let geosets = self.load_geosets()?;

        debug_assert!(self.slices.is_empty());
        Ok(Model {
            version,
            info,
            sequences,
            global_sequences,
            materials,
            textures,
            texture_anims,
            geosets,
        })
    }

    /// The active source: the innermost slice scope, or the stream.
    fn src(&mut self) -> &mut dyn ByteSource {
        match self.slices.last_mut() {
            Some(slice) => slice,
            None => &mut self.stream,
        }
    }

    /// Run `f` with `cursor` installed as the active source. The previous
    /// source is restored on every exit path, including errors.
    fn with_slice<T>(
        &mut self,
        cursor: SliceCursor,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.slices.push(cursor);
        let out = f(self);
        self.slices.pop();
        out
    }

    /// Offset of the innermost slice scope into its block.
    fn slice_pos(&self) -> usize {
        self.slices.last().map_or(0, SliceCursor::pos)
    }

    fn check_magic(&mut self) -> Result<()> {
        let tag = self.src().read_tag()?;
        if tag.0 != format::MAGIC {
            return Err(Error::BadFileMagic);
        }
        Ok(())
    }

    fn expect_tag(&mut self, expected: Tag) -> Result<()> {
        let actual = self.src().read_tag()?;
        if actual != expected {
            return Err(Error::UnexpectedTag { expected, actual });
        }
        Ok(())
    }

    /// Probe for an optional chunk tag. On a match the tag is consumed;
    /// otherwise the source is rewound the exact 4 bytes read.
    fn probe_tag(&mut self, tag: Tag) -> Result<bool> {
        let actual = self.src().read_tag()?;
        if actual == tag {
            Ok(true)
        } else {
            self.src().rewind(4)?;
            Ok(false)
        }
    }

    /// Read one length-framed block into memory.
    fn read_framed_block(&mut self) -> Result<Arc<[u8]>> {
        let len = self.src().read_i32()?;
        if len < 0 {
            return Err(Error::NegativeLength(len));
        }
        Ok(self.src().read_strict(len as usize)?.into())
    }

    /// Read a non-negative entry count of a counted sub-block.
    fn read_count(&mut self, tag: Tag) -> Result<usize> {
        let count = self.src().read_i32()?;
        usize::try_from(count).map_err(|_| {
            Error::structural(format!("negative entry count {count} in {tag} sub-block"))
        })
    }

    fn load_version(&mut self) -> Result<i32> {
        self.expect_tag(format::VERS)?;
        let block = self.read_framed_block()?;
        let version = SliceCursor::new(block, 0).read_i32()?;
        debug!(version, "decoded VERS");
        Ok(version)
    }

    fn load_model_info(&mut self) -> Result<ModelInfo> {
        self.expect_tag(format::MODL)?;
        let block = self.read_framed_block()?;
        let mut cur = SliceCursor::new(block, 0);

        let name = decode_name(&cur.read_strict(format::NAME_LEN)?, "model name")?;
        let bounds_radius = cur.read_f32()?;
        let min_extent = cur.read_vec3()?;
        let max_extent = cur.read_vec3()?;
        let blend_time = cur.read_i32()?;
        debug!(%name, "decoded MODL");

        Ok(ModelInfo {
            name,
            bounds_radius,
            min_extent,
            max_extent,
            blend_time,
        })
    }

    fn load_sequences(&mut self) -> Result<Vec<Animation>> {
        self.expect_tag(format::SEQS)?;
        let block = self.read_framed_block()?;
        let count = tiled_count(&block, format::SEQS_RECORD, format::SEQS)?;

        let mut cur = SliceCursor::new(block, 0);
        let mut sequences = Vec::with_capacity(count);
        for _ in 0..count {
            let name = decode_name(&cur.read_strict(format::NAME_LEN)?, "sequence name")?;
            let interval = (cur.read_i32()?, cur.read_i32()?);
            let move_speed = cur.read_f32()?;
            let non_looping = cur.read_i32()? != 0;
            let rarity = cur.read_f32()?;
            cur.read_strict(4)?; // reserved
            let bounds_radius = cur.read_f32()?;
            let min_extent = cur.read_vec3()?;
            let max_extent = cur.read_vec3()?;

            sequences.push(Animation {
                name,
                interval,
                move_speed,
                non_looping,
                rarity,
                bounds_radius,
                min_extent,
                max_extent,
            });
        }
        debug!(count, "decoded SEQS");
        Ok(sequences)
    }

    fn load_global_sequences(&mut self) -> Result<Vec<u32>> {
        self.expect_tag(format::GLBS)?;
        let block = self.read_framed_block()?;
        let count = tiled_count(&block, 4, format::GLBS)?;

        let mut cur = SliceCursor::new(block, 0);
        let mut durations = Vec::with_capacity(count);
        for _ in 0..count {
            durations.push(cur.read_u32()?);
        }
        debug!(count, "decoded GLBS");
        Ok(durations)
    }

    fn load_materials(&mut self) -> Result<Vec<Material>> {
        self.expect_tag(format::MTLS)?;
        let block = self.read_framed_block()?;
        let mut materials = Vec::new();

        let mut offset = 0;
        while offset < block.len() {
            let (declared, material) =
                self.with_slice(SliceCursor::new(block.clone(), offset), |ld| {
                    let declared = ld.read_record_span(offset, block.len(), format::MTLS_HEADER)?;
                    let priority_plane = ld.src().read_i32()?;
                    let flags = ld.src().read_u32()?;
                    let layers = ld.load_layers()?;

                    let consumed = ld.slice_pos() - offset;
                    if consumed > declared {
                        return Err(Error::structural(format!(
                            "material consumed {consumed} bytes of a declared {declared}"
                        )));
                    }

                    Ok((
                        declared,
                        Material {
                            priority_plane,
                            constant_color: flags & format::MAT_CONSTANT_COLOR != 0,
                            sort_prims_far_z: flags & format::MAT_SORT_PRIMS_FAR_Z != 0,
                            full_resolution: flags & format::MAT_FULL_RESOLUTION != 0,
                            layers,
                        },
                    ))
                })?;

            materials.push(material);
            offset += declared;
        }
        debug!(count = materials.len(), "decoded MTLS");
        Ok(materials)
    }

    fn load_layers(&mut self) -> Result<Vec<Layer>> {
        self.expect_tag(format::LAYS)?;
        let count = self.read_count(format::LAYS)?;

        let mut layers = Vec::with_capacity(count);
        for _ in 0..count {
            let declared = self.src().read_i32()?;
            if declared < 4 {
                return Err(Error::structural(format!(
                    "layer record of {declared} bytes cannot hold its own length field"
                )));
            }
            // Tolerant on a slice source: a short body surfaces later as
            // TruncatedInput from the field reads.
            let body: Arc<[u8]> = self.src().read_bytes(declared as usize - 4)?.into();

            let layer = self.with_slice(SliceCursor::new(body.clone(), 0), |ld| {
                let filter_mode = ld.src().read_i32()?;
                let flags = ld.src().read_u32()?;
                let texture_id = ld.src().read_i32()?;
                let texture_anim_id = ld.src().read_i32()?;
                let coord_id = ld.src().read_i32()?;
                let alpha = ld.src().read_f32()?;

                let mut tracks = Vec::new();
                while ld.slice_pos() < body.len() {
                    let tag = ld.src().read_tag()?;
                    tracks.push(track::read_track(ld.src(), tag, TrackClass::MaterialLayer)?);
                }

                Ok(Layer {
                    filter_mode,
                    unshaded: flags & format::LAYER_UNSHADED != 0,
                    sphere_env_map: flags & format::LAYER_SPHERE_ENV_MAP != 0,
                    two_sided: flags & format::LAYER_TWO_SIDED != 0,
                    unfogged: flags & format::LAYER_UNFOGGED != 0,
                    no_depth_test: flags & format::LAYER_NO_DEPTH_TEST != 0,
                    no_depth_set: flags & format::LAYER_NO_DEPTH_SET != 0,
                    texture_id,
                    texture_anim_id,
                    coord_id,
                    alpha,
                    tracks,
                })
            })?;
            layers.push(layer);
        }
        Ok(layers)
    }

    fn load_textures(&mut self) -> Result<Vec<Texture>> {
        self.expect_tag(format::TEXS)?;
        let block = self.read_framed_block()?;
        let count = tiled_count(&block, format::TEXS_RECORD, format::TEXS)?;

        let mut cur = SliceCursor::new(block, 0);
        let mut textures = Vec::with_capacity(count);
        for _ in 0..count {
            let replaceable_id = cur.read_i32()?;
            let path = decode_name(&cur.read_strict(format::PATH_LEN)?, "texture path")?;
            cur.read_strict(4)?; // reserved
            let flags = cur.read_u32()?;

            textures.push(Texture {
                replaceable_id,
                path,
                wrap_width: flags & format::TEX_WRAP_WIDTH != 0,
                wrap_height: flags & format::TEX_WRAP_HEIGHT != 0,
            });
        }
        debug!(count, "decoded TEXS");
        Ok(textures)
    }

    fn load_texture_anims(&mut self) -> Result<Vec<TextureAnim>> {
        if !self.probe_tag(format::TXAN)? {
            debug!("no TXAN chunk");
            return Ok(Vec::new());
        }
        let block = self.read_framed_block()?;
        let mut groups = Vec::new();

        let mut offset = 0;
        while offset < block.len() {
            let (declared, group) =
                self.with_slice(SliceCursor::new(block.clone(), offset), |ld| {
                    let declared = ld.read_record_span(offset, block.len(), 4)?;
                    let end = offset + declared;

                    let mut tracks = Vec::new();
                    while ld.slice_pos() < end {
                        let tag = ld.src().read_tag()?;
                        tracks.push(track::read_track(ld.src(), tag, TrackClass::TextureAnim)?);
                    }

                    let consumed = ld.slice_pos() - offset;
                    if consumed > declared {
                        return Err(Error::structural(format!(
                            "texture animation consumed {consumed} bytes of a declared {declared}"
                        )));
                    }

                    Ok((declared, TextureAnim { tracks }))
                })?;

            groups.push(group);
            offset += declared;
        }
        debug!(count = groups.len(), "decoded TXAN");
        Ok(groups)
    }

    fn load_geosets(&mut self) -> Result<Vec<Geoset>> {
        self.expect_tag(format::GEOS)?;
        let block = self.read_framed_block()?;
        let mut geosets = Vec::new();

        let mut offset = 0;
        while offset < block.len() {
            let (declared, geoset) =
                self.with_slice(SliceCursor::new(block.clone(), offset), |ld| {
                    let declared = ld.read_record_span(offset, block.len(), 4)?;

                    let vertices = ld.load_vectors(format::VRTX)?;
                    let normals = ld.load_vectors(format::NRMS)?;
                    let faces = ld.load_faces()?;
                    let vertex_groups = ld.load_vertex_groups()?;

                    let consumed = ld.slice_pos() - offset;
                    if consumed > declared {
                        return Err(Error::structural(format!(
                            "geoset consumed {consumed} bytes of a declared {declared}"
                        )));
                    }

                    Ok((
                        declared,
                        Geoset {
                            vertices,
                            normals,
                            faces,
                            vertex_groups,
                        },
                    ))
                })?;

            geosets.push(geoset);
            offset += declared;
        }
        debug!(count = geosets.len(), "decoded GEOS");
        Ok(geosets)
    }

    /// Read the self-declared byte length of a variable record starting at
    /// `offset` inside a block of `block_len` bytes and validate it as a
    /// skip distance.
    fn read_record_span(
        &mut self,
        offset: usize,
        block_len: usize,
        min: usize,
    ) -> Result<usize> {
        let size = self.src().read_i32()?;
        let declared = usize::try_from(size).unwrap_or(0);
        if declared < min {
            return Err(Error::structural(format!(
                "record of {size} bytes is smaller than its {min}-byte fixed header"
            )));
        }
        if offset + declared > block_len {
            return Err(Error::structural(format!(
                "record of {declared} bytes at offset {offset} overruns its {block_len}-byte block"
            )));
        }
        Ok(declared)
    }

    /// Decode a `tag + count + count x 3-float` sub-block.
    fn load_vectors(&mut self, tag: Tag) -> Result<Vec<glam::Vec3>> {
        self.expect_tag(tag)?;
        let count = self.read_count(tag)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.src().read_vec3()?);
        }
        trace!(%tag, count, "decoded vector sub-block");
        Ok(out)
    }

    fn load_vertex_groups(&mut self) -> Result<Vec<u8>> {
        self.expect_tag(format::GNDX)?;
        let count = self.read_count(format::GNDX)?;
        self.src().read_strict(count)
    }

    fn load_faces(&mut self) -> Result<Vec<Primitives>> {
        self.expect_tag(format::PTYP)?;
        let count = self.read_count(format::PTYP)?;
        let mut kinds = Vec::with_capacity(count);
        for _ in 0..count {
            let code = self.src().read_i32()?;
            kinds.push(PrimitiveKind::from_code(code).ok_or_else(|| {
                Error::structural(format!("unknown primitive kind {code}"))
            })?);
        }

        self.expect_tag(format::PCNT)?;
        let count = self.read_count(format::PCNT)?;
        let mut counts = Vec::with_capacity(count);
        for _ in 0..count {
            let size = self.src().read_i32()?;
            counts.push(u32::try_from(size).map_err(|_| {
                Error::structural(format!("negative face-group size {size}"))
            })?);
        }

        self.expect_tag(format::PVTX)?;
        let count = self.read_count(format::PVTX)?;
        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            indices.push(self.src().read_u16()?);
        }

        faces::build_primitives(kinds, counts, indices)
    }
}

/// Validate that a tiled block is an exact multiple of its record width
/// and return the record count.
fn tiled_count(block: &[u8], record: usize, tag: Tag) -> Result<usize> {
    if block.len() % record != 0 {
        return Err(Error::structural(format!(
            "{tag} block of {} bytes is not a multiple of the {record}-byte record",
            block.len()
        )));
    }
    Ok(block.len() / record)
}

/// Trim a fixed-width name field at its first NUL and decode as ASCII.
fn decode_name(buf: &[u8], field: &'static str) -> Result<String> {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let head = &buf[..end];
    if !head.is_ascii() {
        return Err(Error::InvalidText(field));
    }
    // ASCII was just checked, so this conversion is lossless
    Ok(String::from_utf8_lossy(head).into_owned())
}
