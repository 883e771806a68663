//! Face-group reconstruction.
//!
//! Faces arrive as three parallel lists: a primitive kind per group
//! (`PTYP`), a group size per group (`PCNT`) and one flat vertex-index
//! list (`PVTX`). Reconstruction partitions the flat list by the sizes
//! and zips each run with its kind, preserving group order.

use crate::model::{PrimitiveKind, Primitives};
use crate::util::{Error, Result};

/// Partition a flat vertex-index list into per-group primitive runs.
pub(crate) fn build_primitives(
    kinds: Vec<PrimitiveKind>,
    counts: Vec<u32>,
    indices: Vec<u16>,
) -> Result<Vec<Primitives>> {
    if kinds.len() != counts.len() {
        return Err(Error::structural(format!(
            "{} primitive kinds for {} face-group sizes",
            kinds.len(),
            counts.len()
        )));
    }

    let total: usize = counts.iter().map(|&c| c as usize).sum();
    if total != indices.len() {
        return Err(Error::structural(format!(
            "face groups claim {total} vertex indices, {} present",
            indices.len()
        )));
    }

    let mut groups = Vec::with_capacity(kinds.len());
    let mut offset = 0;
    for (kind, count) in kinds.into_iter().zip(counts) {
        let next = offset + count as usize;
        groups.push(Primitives {
            kind,
            indices: indices[offset..next].to_vec(),
        });
        offset = next;
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group() {
        let groups = build_primitives(
            vec![PrimitiveKind::Triangles],
            vec![6],
            vec![0, 1, 2, 1, 2, 3],
        )
        .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, PrimitiveKind::Triangles);
        assert_eq!(groups[0].indices, vec![0, 1, 2, 1, 2, 3]);
    }

    #[test]
    fn test_partition_preserves_order() {
        let groups = build_primitives(
            vec![PrimitiveKind::Triangles, PrimitiveKind::TriangleStrip],
            vec![3, 4],
            vec![0, 1, 2, 2, 1, 3, 4],
        )
        .unwrap();

        assert_eq!(groups[0].indices, vec![0, 1, 2]);
        assert_eq!(groups[1].kind, PrimitiveKind::TriangleStrip);
        assert_eq!(groups[1].indices, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_index_count_mismatch() {
        let err = build_primitives(
            vec![PrimitiveKind::Triangles],
            vec![6],
            vec![0, 1, 2],
        )
        .unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch(_)));
    }

    #[test]
    fn test_kind_count_mismatch() {
        let err = build_primitives(
            vec![PrimitiveKind::Triangles, PrimitiveKind::Lines],
            vec![3],
            vec![0, 1, 2],
        )
        .unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch(_)));
    }

    #[test]
    fn test_empty_faces() {
        let groups = build_primitives(Vec::new(), Vec::new(), Vec::new()).unwrap();
        assert!(groups.is_empty());
    }
}
