//! Generic keyframe-track decoding.
//!
//! Every animated target shares one wire protocol: a 4-byte sub-tag, a
//! keyframe count, an interpolation code, a global-sequence id, then the
//! keyframes themselves. Only the value payload differs per target, so
//! the per-target shapes live in one dispatch table and the
//! tangent-presence rule (hermite/bezier only) stays in a single place.

use crate::decode::format::{self, Tag};
use crate::decode::source::ByteSource;
use crate::model::{Interpolation, KeyTarget, Keyframe, KeyframeAnimation, TrackValue};
use crate::util::{Error, Result};

/// The record class a track was found in. Each sub-tag is only legal
/// inside its own class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrackClass {
    /// Tracks inside a material layer (`KMTA`, `KMTF`).
    MaterialLayer,
    /// Tracks inside a `TXAN` group (`KTAT`, `KTAR`, `KTAS`).
    TextureAnim,
}

type ValueReader = fn(&mut dyn ByteSource) -> Result<TrackValue>;
type TangentReader = fn(&mut dyn ByteSource) -> Result<(TrackValue, TrackValue)>;

struct TrackShape {
    tag: Tag,
    class: TrackClass,
    target: KeyTarget,
    read_value: ValueReader,
    read_tangents: TangentReader,
}

/// One row per animatable target. The rotation row is the only place that
/// knows rotation keys are quaternion-shaped.
const TRACKS: &[TrackShape] = &[
    TrackShape {
        tag: format::KMTA,
        class: TrackClass::MaterialLayer,
        target: KeyTarget::MaterialAlpha,
        read_value: scalar_value,
        read_tangents: scalar_tangents,
    },
    TrackShape {
        tag: format::KMTF,
        class: TrackClass::MaterialLayer,
        target: KeyTarget::MaterialTexture,
        read_value: index_value,
        read_tangents: index_tangents,
    },
    TrackShape {
        tag: format::KTAT,
        class: TrackClass::TextureAnim,
        target: KeyTarget::TextureTranslation,
        read_value: vector_value,
        read_tangents: vector_tangents,
    },
    TrackShape {
        tag: format::KTAR,
        class: TrackClass::TextureAnim,
        target: KeyTarget::TextureRotation,
        read_value: quat_value,
        read_tangents: quat_tangents,
    },
    TrackShape {
        tag: format::KTAS,
        class: TrackClass::TextureAnim,
        target: KeyTarget::TextureScaling,
        read_value: vector_value,
        read_tangents: vector_tangents,
    },
];

fn scalar_value(src: &mut dyn ByteSource) -> Result<TrackValue> {
    Ok(TrackValue::Scalar(src.read_f32()?))
}

fn scalar_tangents(src: &mut dyn ByteSource) -> Result<(TrackValue, TrackValue)> {
    Ok((scalar_value(src)?, scalar_value(src)?))
}

fn index_value(src: &mut dyn ByteSource) -> Result<TrackValue> {
    Ok(TrackValue::Index(src.read_i32()?))
}

fn index_tangents(src: &mut dyn ByteSource) -> Result<(TrackValue, TrackValue)> {
    Ok((index_value(src)?, index_value(src)?))
}

fn vector_value(src: &mut dyn ByteSource) -> Result<TrackValue> {
    Ok(TrackValue::Vector(src.read_vec3()?))
}

fn vector_tangents(src: &mut dyn ByteSource) -> Result<(TrackValue, TrackValue)> {
    Ok((vector_value(src)?, vector_value(src)?))
}

fn quat_value(src: &mut dyn ByteSource) -> Result<TrackValue> {
    Ok(TrackValue::Quaternion(src.read_quat()?))
}

fn quat_tangents(src: &mut dyn ByteSource) -> Result<(TrackValue, TrackValue)> {
    Ok((quat_value(src)?, quat_value(src)?))
}

/// Decode one keyframe track. The sub-tag has already been consumed by
/// the caller and is passed in for dispatch.
pub(crate) fn read_track(
    src: &mut dyn ByteSource,
    tag: Tag,
    class: TrackClass,
) -> Result<KeyframeAnimation> {
    let shape = TRACKS
        .iter()
        .find(|s| s.tag == tag && s.class == class)
        .ok_or(Error::UnknownKeyframeTarget { tag })?;

    let count = src.read_i32()?;
    let count = usize::try_from(count).map_err(|_| {
        Error::structural(format!("negative keyframe count {count} in {tag} track"))
    })?;
    let code = src.read_i32()?;
    let interpolation = Interpolation::from_code(code).ok_or_else(|| {
        Error::structural(format!("unknown interpolation code {code} in {tag} track"))
    })?;
    let gsid = src.read_i32()?;
    let global_seq_id = u32::try_from(gsid).ok();

    let mut keyframes = Vec::with_capacity(count);
    for _ in 0..count {
        let frame = src.read_i32()?;
        let value = (shape.read_value)(src)?;
        let (tan_in, tan_out) = if interpolation.has_tangents() {
            let (tin, tout) = (shape.read_tangents)(src)?;
            (Some(tin), Some(tout))
        } else {
            (None, None)
        };
        keyframes.push(Keyframe {
            frame,
            value,
            tan_in,
            tan_out,
        });
    }

    Ok(KeyframeAnimation {
        target: shape.target,
        interpolation,
        global_seq_id,
        keyframes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::source::SliceCursor;

    fn i32le(out: &mut Vec<u8>, v: i32) {
        out.extend_from_slice(&v.to_le_bytes());
    }

    fn f32le(out: &mut Vec<u8>, v: f32) {
        out.extend_from_slice(&v.to_le_bytes());
    }

    /// Track body after the tag: count, interpolation, global-seq id.
    fn header(count: i32, interpolation: i32, gsid: i32) -> Vec<u8> {
        let mut out = Vec::new();
        i32le(&mut out, count);
        i32le(&mut out, interpolation);
        i32le(&mut out, gsid);
        out
    }

    #[test]
    fn test_linear_track_has_no_tangents() {
        let mut bytes = header(2, 1, -1);
        i32le(&mut bytes, 0);
        f32le(&mut bytes, 1.0);
        i32le(&mut bytes, 100);
        f32le(&mut bytes, 0.5);

        let total = bytes.len();
        let mut cur = SliceCursor::new(bytes.into(), 0);
        let track = read_track(&mut cur, format::KMTA, TrackClass::MaterialLayer).unwrap();

        // 12-byte header plus count * (frame + value), nothing more
        assert_eq!(cur.pos(), total);
        assert_eq!(total, 12 + 2 * (4 + 4));
        assert_eq!(track.target, KeyTarget::MaterialAlpha);
        assert_eq!(track.interpolation, Interpolation::Linear);
        assert_eq!(track.global_seq_id, None);
        assert_eq!(track.keyframes.len(), 2);
        assert_eq!(track.keyframes[0].value, TrackValue::Scalar(1.0));
        assert_eq!(track.keyframes[0].tan_in, None);
        assert_eq!(track.keyframes[1].frame, 100);
    }

    #[test]
    fn test_hermite_track_reads_tangent_pairs() {
        let mut bytes = header(2, 2, 3);
        for frame in [0, 50] {
            i32le(&mut bytes, frame);
            f32le(&mut bytes, 1.0); // value
            f32le(&mut bytes, 0.1); // tangent in
            f32le(&mut bytes, 0.2); // tangent out
        }

        let total = bytes.len();
        let mut cur = SliceCursor::new(bytes.into(), 0);
        let track = read_track(&mut cur, format::KMTA, TrackClass::MaterialLayer).unwrap();

        assert_eq!(cur.pos(), total);
        assert_eq!(total, 12 + 2 * (4 + 3 * 4));
        assert_eq!(track.global_seq_id, Some(3));
        assert_eq!(track.keyframes[0].tan_in, Some(TrackValue::Scalar(0.1)));
        assert_eq!(track.keyframes[0].tan_out, Some(TrackValue::Scalar(0.2)));
    }

    #[test]
    fn test_rotation_track_is_quaternion_shaped() {
        let mut bytes = header(1, 1, -1);
        i32le(&mut bytes, 0);
        for v in [0.0f32, 0.0, 0.0, 1.0] {
            f32le(&mut bytes, v);
        }

        let mut cur = SliceCursor::new(bytes.into(), 0);
        let track = read_track(&mut cur, format::KTAR, TrackClass::TextureAnim).unwrap();

        assert_eq!(track.target, KeyTarget::TextureRotation);
        match track.keyframes[0].value {
            TrackValue::Quaternion(q) => assert_eq!(q.w, 1.0),
            ref v => panic!("expected quaternion value, got {v:?}"),
        }
    }

    #[test]
    fn test_unknown_tag() {
        let bytes = header(0, 1, -1);
        let mut cur = SliceCursor::new(bytes.into(), 0);
        let err = read_track(&mut cur, Tag(*b"KXYZ"), TrackClass::MaterialLayer).unwrap_err();
        assert!(matches!(err, Error::UnknownKeyframeTarget { .. }));
    }

    #[test]
    fn test_texture_tag_rejected_in_layer() {
        let bytes = header(0, 1, -1);
        let mut cur = SliceCursor::new(bytes.into(), 0);
        let err = read_track(&mut cur, format::KTAT, TrackClass::MaterialLayer).unwrap_err();
        assert!(matches!(err, Error::UnknownKeyframeTarget { .. }));
    }

    #[test]
    fn test_negative_count() {
        let bytes = header(-1, 1, -1);
        let mut cur = SliceCursor::new(bytes.into(), 0);
        let err = read_track(&mut cur, format::KMTF, TrackClass::MaterialLayer).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch(_)));
    }

    #[test]
    fn test_unknown_interpolation_code() {
        let bytes = header(0, 9, -1);
        let mut cur = SliceCursor::new(bytes.into(), 0);
        let err = read_track(&mut cur, format::KMTA, TrackClass::MaterialLayer).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch(_)));
    }
}
