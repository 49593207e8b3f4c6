use {
    crate::{
        error::Error,
        mesh::{DataType, Mesh},
    },
    log::{debug, warn},
    std::collections::HashSet,
};

/// Bone batch tables read from a mesh block.
///
/// Skinned meshes may be split into batches which each reference a limited palette of bones;
/// the faces of batch `i` begin at triangle `offsets[i]`.
#[derive(Debug, Default)]
pub(super) struct BoneBatches {
    /// Node indices of every bone, batch after batch.
    pub bones: Vec<u32>,

    /// Number of bones used by each batch.
    pub num_bones: Vec<u32>,

    /// First triangle of each batch.
    pub offsets: Vec<u32>,

    /// Maximum number of bones in any one batch.
    pub stride: u32,
}

impl BoneBatches {
    /// First index (not triangle) of the given batch.
    fn first_index(&self, batch: usize) -> usize {
        if batch < self.num_bones.len() {
            self.offsets.get(batch).copied().unwrap_or_default() as usize * 3
        } else {
            0
        }
    }
}

/// Rewrites per-vertex bone indices so that every batch addresses one shared bone palette, then
/// collapses the batch tables into a single batch.
///
/// The values of vertices referenced by batch `i` are increased by `i * stride`. A vertex which
/// is shared between batches is only adjusted by the first batch which references it.
pub(super) fn merge_bone_batches(
    mesh: &mut Mesh,
    bone_index_attribute: usize,
    batches: &mut BoneBatches,
) -> Result<(), Error> {
    let num_batches = batches.num_bones.len();
    if num_batches < 2 {
        return Ok(());
    }

    let Some(attribute) = mesh.attributes.get(bone_index_attribute).cloned() else {
        return Ok(());
    };

    let total = batches
        .num_bones
        .iter()
        .try_fold(0u32, |total, &num_bones| total.checked_add(num_bones))
        .ok_or_else(|| {
            warn!("Bone batch sizes {:?} overflow", batches.num_bones);

            Error::Overflow {
                context: "bone count",
            }
        })?;
    let offset = |batch: usize| {
        u32::try_from(batch)
            .ok()
            .and_then(|batch| batch.checked_mul(batches.stride))
            .ok_or(Error::Overflow {
                context: "bone index offset",
            })
    };

    // Fail before touching any vertex
    offset(num_batches - 1)?;

    let out_of_bounds = || Error::AttributeOutOfBounds {
        semantic: attribute.semantic.clone(),
    };
    let element_size = attribute
        .data_type
        .size()
        .ok_or(Error::UnsupportedDataType {
            context: "bone index",
            value: attribute.data_type as _,
        })?;
    let indices = mesh.faces.indices();
    let block = mesh
        .data_blocks
        .get_mut(attribute.data_index)
        .ok_or_else(out_of_bounds)?;
    let stride = match block.stride as usize {
        0 => element_size * attribute.width as usize,
        stride => stride,
    };

    let mut seen = HashSet::new();

    for batch in 0..num_batches {
        let start = batches.first_index(batch).min(indices.len());
        let end = if batch + 1 < num_batches {
            batches.first_index(batch + 1).min(indices.len())
        } else {
            indices.len()
        };
        let value = offset(batch)?;

        for &index in &indices[start..end.max(start)] {
            if !seen.insert(index) {
                continue;
            }

            let vertex = stride * index as usize + attribute.offset as usize;

            for component in 0..attribute.width as usize {
                let offset = vertex + component * element_size;
                let element = block
                    .data
                    .get_mut(offset..offset + element_size)
                    .ok_or_else(out_of_bounds)?;

                add_to_element(element, attribute.data_type, value)?;
            }
        }
    }

    debug!(
        "Merged {num_batches} bone batches into one of {total} bone{}",
        if total == 1 { "" } else { "s" }
    );

    batches.stride = total;
    batches.num_bones = vec![total];
    batches.offsets = vec![0];

    Ok(())
}

/// Adds `value` to one host-order element of the given type.
fn add_to_element(element: &mut [u8], data_type: DataType, value: u32) -> Result<(), Error> {
    macro_rules! add {
        ($ty:ty) => {{
            let mut bytes = [0u8; size_of::<$ty>()];
            bytes.copy_from_slice(element);

            let val = <$ty>::from_ne_bytes(bytes).wrapping_add(value as $ty);
            element.copy_from_slice(&val.to_ne_bytes());
        }};
    }

    match data_type {
        DataType::Int8 => add!(i8),
        DataType::UInt8 => add!(u8),
        DataType::Int16 => add!(i16),
        DataType::UInt16 => add!(u16),
        DataType::Int32 => add!(i32),
        DataType::UInt32 => add!(u32),
        DataType::Float32 => {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(element);

            let val = f32::from_ne_bytes(bytes) + value as f32;
            element.copy_from_slice(&val.to_ne_bytes());
        }
        _ => {
            warn!("Unable to merge bone indices of type {data_type:?}");

            return Err(Error::UnsupportedDataType {
                context: "bone index",
                value: data_type as _,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        super::{BoneBatches, merge_bone_batches},
        crate::{
            Error,
            index::FaceData,
            mesh::{DataType, Mesh, VertexAttribute},
        },
    };

    /// Four vertices with four `u8` bone indices each.
    fn skinned_mesh(bone_indices: &[[u8; 4]], faces: &[u32]) -> Mesh {
        let mut mesh = Mesh {
            faces: FaceData::from_indices(faces),
            num_vertices: bone_indices.len() as _,
            ..Default::default()
        };
        let data_index = mesh.add_data(bone_indices.concat(), 4);
        mesh.add_vertex_attribute(VertexAttribute::new(
            "BONEINDEX",
            DataType::UInt8,
            4,
            0,
            data_index,
        ))
        .unwrap();

        mesh
    }

    fn bone_indices(mesh: &Mesh, vertex: usize) -> Vec<u8> {
        let attribute = mesh.vertex_attribute("BONEINDEX").unwrap();

        mesh.vertex_bytes(attribute, vertex).unwrap().to_vec()
    }

    #[test]
    fn single_batch_is_unchanged() {
        let mut mesh = skinned_mesh(&[[0, 1, 2, 3], [1, 1, 1, 1], [2, 2, 2, 2]], &[0, 1, 2]);
        let before = mesh.clone();
        let mut batches = BoneBatches {
            bones: vec![10, 11, 12, 13],
            num_bones: vec![4],
            offsets: vec![0],
            stride: 4,
        };

        merge_bone_batches(&mut mesh, 0, &mut batches).unwrap();

        assert_eq!(mesh, before);
        assert_eq!(batches.num_bones, vec![4]);
        assert_eq!(batches.stride, 4);
    }

    #[test]
    fn second_batch_is_offset() {
        // Triangle 0 is batch 0, triangle 1 is batch 1; vertex 2 is shared
        let mut mesh = skinned_mesh(
            &[[0, 1, 0, 0], [1, 0, 0, 0], [3, 3, 3, 3], [2, 0, 1, 0]],
            &[0, 1, 2, 2, 3, 3],
        );
        let mut batches = BoneBatches {
            bones: (0..8).collect(),
            num_bones: vec![4, 4],
            offsets: vec![0, 1],
            stride: 4,
        };

        merge_bone_batches(&mut mesh, 0, &mut batches).unwrap();

        assert_eq!(bone_indices(&mesh, 0), vec![0, 1, 0, 0]);
        assert_eq!(bone_indices(&mesh, 1), vec![1, 0, 0, 0]);

        // Local bone 2 in batch 1 becomes 2 + 1 * 4
        assert_eq!(bone_indices(&mesh, 3), vec![6, 4, 5, 4]);

        // Shared with batch 0, so it is only adjusted once (by batch 0, which adds nothing)
        assert_eq!(bone_indices(&mesh, 2), vec![3, 3, 3, 3]);

        assert_eq!(batches.num_bones, vec![8]);
        assert_eq!(batches.offsets, vec![0]);
        assert_eq!(batches.stride, 8);
    }

    #[test]
    fn float_bone_indices() {
        let mut data = vec![];
        for val in [0.0f32, 2.0, 1.0, 3.0] {
            data.extend_from_slice(&val.to_ne_bytes());
        }

        let mut mesh = Mesh {
            faces: FaceData::from_indices(&[0, 0, 0, 1, 1, 1]),
            num_vertices: 2,
            ..Default::default()
        };
        let data_index = mesh.add_data(data, 8);
        mesh.add_vertex_attribute(VertexAttribute::new(
            "BONEINDEX",
            DataType::Float32,
            2,
            0,
            data_index,
        ))
        .unwrap();

        let mut batches = BoneBatches {
            bones: (0..6).collect(),
            num_bones: vec![3, 3],
            offsets: vec![0, 1],
            stride: 3,
        };

        merge_bone_batches(&mut mesh, 0, &mut batches).unwrap();

        assert_eq!(mesh.vertex_f32s("BONEINDEX", 0), Some(vec![0.0, 2.0]));
        assert_eq!(mesh.vertex_f32s("BONEINDEX", 1), Some(vec![4.0, 6.0]));
    }

    #[test]
    fn unsupported_bone_index_type() {
        let mut mesh = Mesh {
            faces: FaceData::from_indices(&[0, 0, 0, 0, 0, 0]),
            num_vertices: 1,
            ..Default::default()
        };
        let data_index = mesh.add_data(vec![0; 4], 4);
        mesh.add_vertex_attribute(VertexAttribute::new(
            "BONEINDEX",
            DataType::UByte4,
            1,
            0,
            data_index,
        ))
        .unwrap();

        let mut batches = BoneBatches {
            num_bones: vec![1, 1],
            offsets: vec![0, 1],
            stride: 1,
            ..Default::default()
        };

        assert!(matches!(
            merge_bone_batches(&mut mesh, 0, &mut batches),
            Err(Error::UnsupportedDataType {
                context: "bone index",
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_vertex() {
        let mut mesh = skinned_mesh(&[[0, 0, 0, 0]], &[0, 0, 0, 5, 5, 5]);
        let mut batches = BoneBatches {
            num_bones: vec![1, 1],
            offsets: vec![0, 1],
            stride: 1,
            ..Default::default()
        };

        assert!(matches!(
            merge_bone_batches(&mut mesh, 0, &mut batches),
            Err(Error::AttributeOutOfBounds { .. })
        ));
    }

    #[test]
    fn bone_count_overflow() {
        let mut mesh = skinned_mesh(&[[0, 0, 0, 0], [1, 1, 1, 1]], &[0, 0, 0, 1, 1, 1]);
        let before = mesh.clone();
        let mut batches = BoneBatches {
            num_bones: vec![u32::MAX, 1],
            offsets: vec![0, 1],
            stride: 4,
            ..Default::default()
        };

        assert!(matches!(
            merge_bone_batches(&mut mesh, 0, &mut batches),
            Err(Error::Overflow {
                context: "bone count"
            })
        ));
        assert_eq!(mesh, before);
    }

    #[test]
    fn bone_index_offset_overflow() {
        let mut mesh = skinned_mesh(
            &[[0, 0, 0, 0], [1, 1, 1, 1], [2, 2, 2, 2]],
            &[0, 0, 0, 1, 1, 1, 2, 2, 2],
        );
        let before = mesh.clone();
        let mut batches = BoneBatches {
            num_bones: vec![1, 1, 1],
            offsets: vec![0, 1, 2],
            stride: u32::MAX,
            ..Default::default()
        };

        assert!(matches!(
            merge_bone_batches(&mut mesh, 0, &mut batches),
            Err(Error::Overflow {
                context: "bone index offset"
            })
        ));
        assert_eq!(mesh, before);
    }
}
