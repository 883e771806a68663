//! Destination data model for decoded MDX files.
//!
//! Plain records with public named fields. The loader builds a [`Model`]
//! in one pass and hands it over complete; nothing here mutates after
//! that. Sequence order everywhere follows file order, since consumers
//! reference materials, textures and sequences by position.

use glam::{Quat, Vec3};

/// A fully decoded MDX model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Format version from the `VERS` chunk.
    pub version: i32,
    /// Header record from the `MODL` chunk.
    pub info: ModelInfo,
    /// Animation sequences (`SEQS`).
    pub sequences: Vec<Animation>,
    /// Global sequence durations in milliseconds (`GLBS`).
    pub global_sequences: Vec<u32>,
    /// Materials (`MTLS`).
    pub materials: Vec<Material>,
    /// Textures (`TEXS`).
    pub textures: Vec<Texture>,
    /// Texture animations (`TXAN`); empty when the chunk is absent.
    pub texture_anims: Vec<TextureAnim>,
    /// Renderable geometry (`GEOS`).
    pub geosets: Vec<Geoset>,
}

/// Model header: name, bounds and blend time.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub bounds_radius: f32,
    pub min_extent: Vec3,
    pub max_extent: Vec3,
    pub blend_time: i32,
}

/// One animation sequence record.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    /// Start and end frame of the sequence.
    pub interval: (i32, i32),
    pub move_speed: f32,
    pub non_looping: bool,
    pub rarity: f32,
    pub bounds_radius: f32,
    pub min_extent: Vec3,
    pub max_extent: Vec3,
}

/// A material: render-state flags plus an ordered stack of layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub priority_plane: i32,
    pub constant_color: bool,
    pub sort_prims_far_z: bool,
    pub full_resolution: bool,
    pub layers: Vec<Layer>,
}

/// One material layer with its animated parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Blend mode code, kept as stored.
    pub filter_mode: i32,
    pub unshaded: bool,
    pub sphere_env_map: bool,
    pub two_sided: bool,
    pub unfogged: bool,
    pub no_depth_test: bool,
    pub no_depth_set: bool,
    /// Index into [`Model::textures`].
    pub texture_id: i32,
    /// Index into [`Model::texture_anims`], or `-1`.
    pub texture_anim_id: i32,
    pub coord_id: i32,
    pub alpha: f32,
    /// Keyframe tracks animating this layer (`KMTA` / `KMTF`).
    pub tracks: Vec<KeyframeAnimation>,
}

/// One texture reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub replaceable_id: i32,
    pub path: String,
    pub wrap_width: bool,
    pub wrap_height: bool,
}

/// One texture-animation group: the keyframe tracks of one animated
/// texture transform (`KTAT` / `KTAR` / `KTAS`).
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAnim {
    pub tracks: Vec<KeyframeAnimation>,
}

/// What a keyframe track animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTarget {
    MaterialAlpha,
    MaterialTexture,
    TextureTranslation,
    TextureRotation,
    TextureScaling,
}

/// Keyframe interpolation kind.
///
/// Wire codes follow the published format: 0 step, 1 linear, 2 hermite,
/// 3 bezier. Hermite and bezier keyframes carry tangent pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    Step,
    Linear,
    Hermite,
    Bezier,
}

impl Interpolation {
    /// Map a wire code to an interpolation kind.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Step),
            1 => Some(Self::Linear),
            2 => Some(Self::Hermite),
            3 => Some(Self::Bezier),
            _ => None,
        }
    }

    /// Whether keyframes of this kind carry tangent-in/tangent-out pairs.
    #[inline]
    pub fn has_tangents(self) -> bool {
        matches!(self, Self::Hermite | Self::Bezier)
    }
}

/// A keyframe payload; the shape is fixed per [`KeyTarget`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Scalar(f32),
    Index(i32),
    Vector(Vec3),
    Quaternion(Quat),
}

/// One keyframe of an animation track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: i32,
    pub value: TrackValue,
    /// Present iff the track interpolation is hermite or bezier.
    pub tan_in: Option<TrackValue>,
    pub tan_out: Option<TrackValue>,
}

/// One decoded keyframe animation track.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeAnimation {
    pub target: KeyTarget,
    pub interpolation: Interpolation,
    /// Global sequence driving this track, if any (wire `-1` = none).
    pub global_seq_id: Option<u32>,
    pub keyframes: Vec<Keyframe>,
}

/// Primitive topology of one face group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveKind {
    /// Map a `PTYP` wire code to a primitive kind.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::LineLoop),
            3 => Some(Self::LineStrip),
            4 => Some(Self::Triangles),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            _ => None,
        }
    }
}

/// One face group: a primitive kind and its vertex indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitives {
    pub kind: PrimitiveKind,
    pub indices: Vec<u16>,
}

/// One geoset: vertex data plus reconstructed face groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Geoset {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Primitives>,
    /// Per-vertex matrix-group index (`GNDX`).
    pub vertex_groups: Vec<u8>,
}
