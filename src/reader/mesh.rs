use {
    super::{
        bone_batch::{BoneBatches, merge_bone_batches},
        primitive::to_byte_order,
        tag::{Tag, block, mesh, scene},
    },
    crate::{
        NodeId, SkeletonId,
        error::Error,
        index::{FaceData, IndexType},
        mesh::{DataType, Mesh, PrimitiveTopology, VertexAttribute},
        model::Skeleton,
    },
    byteorder::{ByteOrder, LittleEndian, NativeEndian},
    glam::Mat4,
    log::{debug, trace, warn},
    std::io::{Read, Seek},
};

/// A vertex attribute block as read from the file.
///
/// Whether `data` holds the attribute's own values or an offset into the interleaved block is
/// only known once the whole mesh has been read.
#[derive(Debug)]
struct AttributeBlock {
    data: Option<Vec<u8>>,
    data_type: DataType,
    identifier: u32,
    num_components: u32,
    semantic: String,
    stride: u32,
}

/// Reads a mesh block, registering a skeleton when the mesh carries bone batches.
///
/// The result does not depend on the order of the tags inside the block.
pub(super) fn read_mesh<R>(
    reader: &mut R,
    mesh: &mut Mesh,
    skeletons: &mut Vec<Skeleton>,
) -> Result<(), Error>
where
    R: Read + Seek,
{
    let mut attributes = vec![];
    let mut bone_batches = BoneBatches::default();
    let mut declared_bone_batches = None;
    let mut declared_strips = None;
    let mut interleaved = None;
    let mut num_uvws = 0;

    while let Some(tag) = Tag::read(reader)? {
        if tag.is_end_of(scene::MESH) {
            if let Some(declared) = declared_strips {
                if declared != mesh.strip_lengths.len() {
                    warn!(
                        "Mesh declared {declared} strips but has {} strip lengths",
                        mesh.strip_lengths.len()
                    );

                    return Err(Error::StripCountMismatch {
                        declared,
                        actual: mesh.strip_lengths.len(),
                    });
                }
            }

            let num_bone_batches = bone_batches.num_bones.len();

            finish_mesh::<NativeEndian>(mesh, interleaved, attributes, bone_batches, skeletons)?;

            if let Some(declared) = declared_bone_batches {
                if declared != num_bone_batches {
                    warn!("Mesh declared {declared} bone batches but has {num_bone_batches}");

                    return Err(Error::BoneBatchMismatch {
                        declared,
                        actual: num_bone_batches,
                    });
                }
            }

            return Ok(());
        }

        let semantic = match tag.identifier {
            mesh::NUM_VERTICES => {
                mesh.num_vertices = tag.read_u32(reader)?;
                continue;
            }
            mesh::NUM_FACES => {
                mesh.num_faces = tag.read_u32(reader)?;
                continue;
            }
            mesh::NUM_UVW_CHANNELS => {
                mesh.num_uvw_channels = tag.read_u32(reader)?;
                continue;
            }
            mesh::STRIP_LENGTH => {
                mesh.strip_lengths = tag.read_u32s(reader)?;
                continue;
            }
            mesh::NUM_STRIPS => {
                declared_strips = Some(tag.read_u32(reader)? as usize);
                continue;
            }
            mesh::INTERLEAVED_DATA_LIST => {
                // Byte order is fixed once every attribute is known
                let data = tag.payload(reader)?;
                interleaved = Some(mesh.add_data(data, 0));
                continue;
            }
            mesh::BONE_BATCH_INDEX_LIST => {
                bone_batches.bones = tag.read_u32s(reader)?;
                continue;
            }
            mesh::NUM_BONE_INDICES_PER_BATCH => {
                bone_batches.num_bones = tag.read_u32s(reader)?;
                continue;
            }
            mesh::BONE_OFFSET_PER_BATCH => {
                bone_batches.offsets = tag.read_u32s(reader)?;
                continue;
            }
            mesh::MAX_NUM_BONES_PER_BATCH => {
                bone_batches.stride = tag.read_u32(reader)?;
                continue;
            }
            mesh::NUM_BONE_BATCHES => {
                declared_bone_batches = Some(tag.read_u32(reader)? as usize);
                continue;
            }
            mesh::UNPACK_MATRIX => {
                mesh.unpack_matrix = Some(Mat4::from_cols_array(&tag.read_f32_array(reader)?));
                continue;
            }
            mesh::VERTEX_INDEX_LIST => {
                read_index_list(reader, mesh)?;
                continue;
            }
            mesh::VERTEX_LIST => "POSITION".to_owned(),
            mesh::NORMAL_LIST => "NORMAL".to_owned(),
            mesh::TANGENT_LIST => "TANGENT".to_owned(),
            mesh::BINORMAL_LIST => "BINORMAL".to_owned(),
            mesh::UVW_LIST => {
                num_uvws += 1;
                format!("UV{}", num_uvws - 1)
            }
            mesh::VERTEX_COLOR_LIST => "VERTEXCOLOR".to_owned(),
            mesh::BONE_INDEX_LIST => "BONEINDEX".to_owned(),
            mesh::BONE_WEIGHT_LIST => "BONEWEIGHT".to_owned(),
            _ => {
                tag.skip(reader)?;
                continue;
            }
        };

        if let Some(attribute) = read_attribute_block(reader, semantic, tag.identifier)? {
            attributes.push(attribute);
        }
    }

    Err(Error::Truncated { context: "mesh" })
}

/// Resolves everything which depends on the complete set of mesh tags.
fn finish_mesh<B: ByteOrder>(
    mesh: &mut Mesh,
    interleaved: Option<usize>,
    mut attributes: Vec<AttributeBlock>,
    mut bone_batches: BoneBatches,
    skeletons: &mut Vec<Skeleton>,
) -> Result<(), Error> {
    // Stable, so repeated UVW blocks keep their relative order
    attributes.sort_by_key(|attribute| attribute.identifier);

    for attribute in attributes {
        add_vertex_attribute(mesh, interleaved, attribute)?;
    }

    mesh.is_indexed = !mesh.faces.is_empty();
    mesh.topology = if mesh.strip_lengths.is_empty() {
        PrimitiveTopology::TriangleList
    } else {
        PrimitiveTopology::TriangleStrip
    };

    if cfg!(target_endian = "big") {
        if let Some(interleaved) = interleaved {
            fix_interleaved_endianness::<B>(mesh, interleaved)?;
        }
    }

    if let Some(bone_index) = mesh.vertex_attribute_index("BONEINDEX") {
        merge_bone_batches(mesh, bone_index, &mut bone_batches)?;
    }

    if !bone_batches.bones.is_empty() {
        skeletons.push(Skeleton {
            bones: bone_batches
                .bones
                .iter()
                .map(|&bone| NodeId(bone as _))
                .collect(),
            inverse_bind_matrices: vec![],
            name: format!("Skeleton {}", skeletons.len()),
        });
        mesh.skeleton = Some(SkeletonId(skeletons.len() - 1));
    }

    mesh.validate()?;

    debug!(
        "Read mesh ({} vertices, {} faces, {} attribute{}, {:?})",
        mesh.num_vertices,
        mesh.num_faces,
        mesh.attributes.len(),
        if mesh.attributes.len() == 1 { "" } else { "s" },
        mesh.topology
    );

    Ok(())
}

/// Registers one attribute block on the mesh.
///
/// With an interleaved block the data tag holds the byte offset of the attribute inside that
/// block; otherwise it holds the attribute's own data, which becomes a new block.
fn add_vertex_attribute(
    mesh: &mut Mesh,
    interleaved: Option<usize>,
    attribute: AttributeBlock,
) -> Result<(), Error> {
    let AttributeBlock {
        data,
        data_type,
        num_components,
        semantic,
        stride,
        ..
    } = attribute;

    let (data_index, offset) = match (interleaved, data) {
        (Some(interleaved), Some(data)) => {
            let Some(offset) = data.get(0..4) else {
                warn!("Vertex attribute {semantic} has a short interleaved offset");

                return Err(Error::Truncated {
                    context: "vertex attribute",
                });
            };

            (interleaved, LittleEndian::read_u32(offset))
        }
        (Some(interleaved), None) => (interleaved, 0),
        (None, Some(mut data)) => {
            if !data.is_empty() {
                to_byte_order::<NativeEndian>(
                    &mut data,
                    data_type.size().unwrap_or_default(),
                    "vertex data",
                    data_type as _,
                )?;
            }

            (mesh.add_data(data, stride), 0)
        }
        (None, None) => {
            warn!("Vertex attribute {semantic} has no data");

            return Err(Error::AttributeOutOfBounds { semantic });
        }
    };

    mesh.set_stride(data_index, stride);
    mesh.add_vertex_attribute(VertexAttribute::new(
        &semantic,
        data_type,
        num_components,
        offset,
        data_index,
    ))?;

    match semantic.as_str() {
        "BONEINDEX" => mesh.is_skinned = true,
        "BONEWEIGHT" => {
            mesh.is_skinned = true;
            mesh.num_bones = num_components;
        }
        _ => (),
    }

    trace!("Read vertex attribute {semantic} ({data_type:?} x {num_components})");

    Ok(())
}

/// Rewrites the little-endian elements of each attribute stored in the interleaved block into
/// the byte order `B`.
///
/// Attributes are converted one at a time because each may use a different element width.
pub(super) fn fix_interleaved_endianness<B: ByteOrder>(
    mesh: &mut Mesh,
    interleaved: usize,
) -> Result<(), Error> {
    let Mesh {
        attributes,
        data_blocks,
        num_vertices,
        ..
    } = mesh;
    let Some(block) = data_blocks.get_mut(interleaved) else {
        return Ok(());
    };

    for attribute in attributes.iter().filter(|attribute| attribute.data_index == interleaved) {
        if attribute.width == 0 {
            continue;
        }

        let out_of_bounds = || Error::AttributeOutOfBounds {
            semantic: attribute.semantic.clone(),
        };
        let Some(size) = attribute.byte_size() else {
            return Err(Error::UnsupportedDataType {
                context: "interleaved vertex data",
                value: attribute.data_type as _,
            });
        };
        let element_size = size / attribute.width as usize;
        let stride = match block.stride as usize {
            0 => size,
            stride => stride,
        };

        for vertex in 0..*num_vertices as usize {
            let start = vertex * stride + attribute.offset as usize;
            let data = block
                .data
                .get_mut(start..start + size)
                .ok_or_else(out_of_bounds)?;

            to_byte_order::<B>(
                data,
                element_size,
                "interleaved vertex data",
                attribute.data_type as _,
            )?;
        }
    }

    Ok(())
}

fn read_index_list<R>(reader: &mut R, mesh: &mut Mesh) -> Result<(), Error>
where
    R: Read + Seek,
{
    let mut data = vec![];
    let mut ty = IndexType::U16;

    while let Some(tag) = Tag::read(reader)? {
        if tag.is_end_of(mesh::VERTEX_INDEX_LIST) {
            data.truncate(data.len() / ty.size() * ty.size());
            to_byte_order::<NativeEndian>(&mut data, ty.size(), "index list", ty.size() as _)?;

            trace!("Read {} {:?} indices", data.len() / ty.size(), ty);

            mesh.faces = FaceData::new(data, ty);

            return Ok(());
        }

        match tag.identifier {
            block::DATA_TYPE => {
                let value = tag.read_u32(reader)?;

                ty = match DataType::from_raw(value) {
                    Some(DataType::UInt16) => IndexType::U16,
                    Some(DataType::UInt32) => IndexType::U32,
                    _ => {
                        warn!("Unsupported index data type {value}");

                        return Err(Error::UnsupportedDataType {
                            context: "index list",
                            value,
                        });
                    }
                };
            }
            block::DATA => data = tag.payload(reader)?,
            _ => tag.skip(reader)?,
        }
    }

    Err(Error::Truncated {
        context: "index list",
    })
}

/// Reads one vertex attribute block. Returns `None` when the block declares no components, which
/// marks an empty channel.
fn read_attribute_block<R>(
    reader: &mut R,
    semantic: String,
    block_identifier: u32,
) -> Result<Option<AttributeBlock>, Error>
where
    R: Read + Seek,
{
    let mut attribute = AttributeBlock {
        data: None,
        data_type: DataType::None,
        identifier: block_identifier,
        num_components: 0,
        semantic,
        stride: 0,
    };

    while let Some(tag) = Tag::read(reader)? {
        if tag.is_end_of(block_identifier) {
            if attribute.num_components == 0 {
                return Ok(None);
            }

            return Ok(Some(attribute));
        }

        match tag.identifier {
            block::DATA_TYPE => {
                let value = tag.read_u32(reader)?;

                attribute.data_type =
                    DataType::from_raw(value).ok_or(Error::UnsupportedDataType {
                        context: "vertex attribute",
                        value,
                    })?;
            }
            block::NUM_COMPONENTS => attribute.num_components = tag.read_u32(reader)?,
            block::STRIDE => attribute.stride = tag.read_u32(reader)?,
            block::DATA => attribute.data = Some(tag.payload(reader)?),
            _ => tag.skip(reader)?,
        }
    }

    Err(Error::Truncated {
        context: "vertex attribute",
    })
}

#[cfg(test)]
mod tests {
    use {
        super::{fix_interleaved_endianness, read_mesh},
        crate::{
            Error, SkeletonId,
            index::IndexType,
            mesh::{DataType, Mesh, PrimitiveTopology},
            model::Skeleton,
            reader::tag::{block, mesh, scene},
            writer::TagWriter,
        },
        byteorder::{BigEndian, ByteOrder},
        std::io::Cursor,
    };

    fn read(writer: TagWriter) -> Result<(Mesh, Vec<Skeleton>), Error> {
        let mut mesh = Mesh::default();
        let mut skeletons = vec![];
        read_mesh(
            &mut Cursor::new(writer.into_inner()),
            &mut mesh,
            &mut skeletons,
        )?;

        Ok((mesh, skeletons))
    }

    fn write_indices(writer: &mut TagWriter, data_type: DataType, indices: &[u32]) {
        writer.begin(mesh::VERTEX_INDEX_LIST);
        writer.write_u32(block::DATA_TYPE, data_type as _);

        let mut data = vec![];
        for &idx in indices {
            match data_type {
                DataType::UInt16 => data.extend_from_slice(&(idx as u16).to_le_bytes()),
                _ => data.extend_from_slice(&idx.to_le_bytes()),
            }
        }

        writer.write_bytes(block::DATA, &data);
        writer.end(mesh::VERTEX_INDEX_LIST);
    }

    fn write_attribute(
        writer: &mut TagWriter,
        identifier: u32,
        data_type: DataType,
        num_components: u32,
        stride: u32,
        data: &[u8],
    ) {
        writer.begin(identifier);
        writer.write_u32(block::DATA_TYPE, data_type as _);
        writer.write_u32(block::NUM_COMPONENTS, num_components);
        writer.write_u32(block::STRIDE, stride);
        writer.write_bytes(block::DATA, data);
        writer.end(identifier);
    }

    fn floats(vals: &[f32]) -> Vec<u8> {
        vals.iter().flat_map(|val| val.to_le_bytes()).collect()
    }

    #[test]
    fn separate_attributes() {
        let mut writer = TagWriter::default();
        writer.write_u32(mesh::NUM_VERTICES, 2);
        writer.write_u32(mesh::NUM_FACES, 1);
        write_indices(&mut writer, DataType::UInt16, &[0, 1, 1]);
        write_attribute(
            &mut writer,
            mesh::VERTEX_LIST,
            DataType::Float32,
            3,
            12,
            &floats(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
        );
        write_attribute(
            &mut writer,
            mesh::UVW_LIST,
            DataType::Float32,
            2,
            8,
            &floats(&[0.0, 0.0, 1.0, 1.0]),
        );
        write_attribute(
            &mut writer,
            mesh::UVW_LIST,
            DataType::UInt16,
            2,
            4,
            &[1, 0, 2, 0, 3, 0, 4, 0],
        );
        writer.end(scene::MESH);

        let (mesh, skeletons) = read(writer).unwrap();

        assert!(skeletons.is_empty());
        assert!(mesh.is_indexed());
        assert!(!mesh.is_skinned());
        assert_eq!(mesh.topology(), PrimitiveTopology::TriangleList);
        assert_eq!(mesh.faces().index_type(), IndexType::U16);
        assert_eq!(mesh.faces().indices(), vec![0, 1, 1]);
        assert_eq!(mesh.data_blocks().len(), 3);
        assert_eq!(mesh.vertex_attribute("POSITION").unwrap().width(), 3);
        assert_eq!(mesh.vertex_f32s("POSITION", 1), Some(vec![3.0, 4.0, 5.0]));
        assert_eq!(mesh.vertex_f32s("UV0", 1), Some(vec![1.0, 1.0]));

        let uv1 = mesh.vertex_attribute("UV1").unwrap();
        assert_eq!(uv1.data_type(), DataType::UInt16);
        assert_eq!(uv1.data_index(), 2);
        assert_eq!(
            mesh.vertex_bytes(uv1, 1).unwrap(),
            &[3u16.to_ne_bytes(), 4u16.to_ne_bytes()].concat()[..]
        );
    }

    #[test]
    fn interleaved_attributes() {
        let data = floats(&[1.0, 2.0, 3.0, 0.5, 0.25, 4.0, 5.0, 6.0, 0.75, 1.0]);

        let mut writer = TagWriter::default();
        writer.write_u32(mesh::NUM_VERTICES, 2);
        writer.write_bytes(mesh::INTERLEAVED_DATA_LIST, &data);
        write_attribute(
            &mut writer,
            mesh::VERTEX_LIST,
            DataType::Float32,
            3,
            20,
            &0u32.to_le_bytes(),
        );
        write_attribute(
            &mut writer,
            mesh::UVW_LIST,
            DataType::Float32,
            2,
            20,
            &12u32.to_le_bytes(),
        );
        writer.end(scene::MESH);

        let (mesh, _) = read(writer).unwrap();

        assert!(!mesh.is_indexed());
        assert_eq!(mesh.data_blocks().len(), 1);
        assert_eq!(mesh.data_block(0).unwrap().stride(), 20);
        assert_eq!(mesh.vertex_attribute("UV0").unwrap().offset(), 12);
        assert_eq!(mesh.vertex_f32s("POSITION", 1), Some(vec![4.0, 5.0, 6.0]));
        assert_eq!(mesh.vertex_f32s("UV0", 0), Some(vec![0.5, 0.25]));
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn interleaved_big_endian_host() {
        // position: 2 floats, color: 2 x u16, index: 2 x u8
        let mut vertex = floats(&[1.5, -2.0]);
        vertex.extend_from_slice(&0x1234u16.to_le_bytes());
        vertex.extend_from_slice(&0xabcdu16.to_le_bytes());
        vertex.extend_from_slice(&[7, 9]);
        let data = [vertex.clone(), vertex].concat();

        let mut writer = TagWriter::default();
        writer.write_u32(mesh::NUM_VERTICES, 2);
        writer.write_bytes(mesh::INTERLEAVED_DATA_LIST, &data);

        for (identifier, data_type, offset) in [
            (mesh::VERTEX_LIST, DataType::Float32, 0u32),
            (mesh::VERTEX_COLOR_LIST, DataType::UInt16, 8),
            (mesh::BONE_INDEX_LIST, DataType::UInt8, 12),
        ] {
            write_attribute(&mut writer, identifier, data_type, 2, 14, &offset.to_le_bytes());
        }

        writer.end(scene::MESH);

        let (mut mesh, _) = read(writer).unwrap();
        fix_interleaved_endianness::<BigEndian>(&mut mesh, 0).unwrap();

        let block = mesh.data_block(0).unwrap().data();
        for vertex in block.chunks_exact(14) {
            assert_eq!(BigEndian::read_f32(&vertex[0..4]), 1.5);
            assert_eq!(BigEndian::read_f32(&vertex[4..8]), -2.0);
            assert_eq!(BigEndian::read_u16(&vertex[8..10]), 0x1234);
            assert_eq!(BigEndian::read_u16(&vertex[10..12]), 0xabcd);
            assert_eq!(&vertex[12..14], &[7, 9]);
        }
    }

    #[test]
    fn triangle_strips() {
        let mut writer = TagWriter::default();
        writer.write_u32(mesh::NUM_FACES, 3);
        writer.write_u32s(mesh::STRIP_LENGTH, &[3]);
        writer.write_u32(mesh::NUM_STRIPS, 1);
        write_indices(&mut writer, DataType::UInt32, &[0, 1, 2, 3, 4]);
        writer.end(scene::MESH);

        let (mesh, _) = read(writer).unwrap();

        assert_eq!(mesh.topology(), PrimitiveTopology::TriangleStrip);
        assert_eq!(mesh.faces().index_type(), IndexType::U32);
        assert_eq!(mesh.num_indices(), 5);
    }

    #[test]
    fn strip_count_mismatch() {
        let mut writer = TagWriter::default();
        writer.write_u32s(mesh::STRIP_LENGTH, &[3, 4]);
        writer.write_u32(mesh::NUM_STRIPS, 3);
        writer.end(scene::MESH);

        assert!(matches!(
            read(writer),
            Err(Error::StripCountMismatch {
                declared: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn unsupported_index_type() {
        let mut writer = TagWriter::default();
        write_indices(&mut writer, DataType::UInt8, &[0, 1, 2]);
        writer.end(scene::MESH);

        assert!(matches!(
            read(writer),
            Err(Error::UnsupportedDataType {
                context: "index list",
                value: 10
            })
        ));
    }

    #[test]
    fn duplicate_attribute() {
        let mut writer = TagWriter::default();
        writer.write_u32(mesh::NUM_VERTICES, 1);

        for _ in 0..2 {
            write_attribute(
                &mut writer,
                mesh::NORMAL_LIST,
                DataType::Float32,
                3,
                12,
                &floats(&[0.0; 3]),
            );
        }

        writer.end(scene::MESH);

        assert!(matches!(
            read(writer),
            Err(Error::DuplicateAttribute { semantic }) if semantic == "NORMAL"
        ));
    }

    #[test]
    fn empty_attribute_is_ignored() {
        let mut writer = TagWriter::default();
        writer.begin(mesh::TANGENT_LIST);
        writer.end(mesh::TANGENT_LIST);
        writer.end(scene::MESH);

        let (mesh, _) = read(writer).unwrap();

        assert!(mesh.vertex_attributes().is_empty());
    }

    #[test]
    fn attribute_larger_than_data() {
        let mut writer = TagWriter::default();
        writer.write_u32(mesh::NUM_VERTICES, 4);
        write_attribute(
            &mut writer,
            mesh::VERTEX_LIST,
            DataType::Float32,
            3,
            12,
            &floats(&[0.0; 6]),
        );
        writer.end(scene::MESH);

        assert!(matches!(
            read(writer),
            Err(Error::AttributeOutOfBounds { .. })
        ));
    }

    #[test]
    fn skinned_mesh_registers_skeleton() {
        let mut writer = TagWriter::default();
        writer.write_u32(mesh::NUM_VERTICES, 2);
        writer.write_u32(mesh::NUM_FACES, 2);
        write_indices(&mut writer, DataType::UInt16, &[0, 0, 0, 1, 1, 1]);
        write_attribute(
            &mut writer,
            mesh::BONE_INDEX_LIST,
            DataType::UInt8,
            2,
            2,
            &[0, 1, 1, 0],
        );
        write_attribute(
            &mut writer,
            mesh::BONE_WEIGHT_LIST,
            DataType::Float32,
            2,
            8,
            &floats(&[0.5, 0.5, 1.0, 0.0]),
        );
        writer.write_u32s(mesh::BONE_BATCH_INDEX_LIST, &[3, 4, 5, 6]);
        writer.write_u32s(mesh::NUM_BONE_INDICES_PER_BATCH, &[2, 2]);
        writer.write_u32s(mesh::BONE_OFFSET_PER_BATCH, &[0, 1]);
        writer.write_u32(mesh::MAX_NUM_BONES_PER_BATCH, 2);
        writer.write_u32(mesh::NUM_BONE_BATCHES, 2);
        writer.end(scene::MESH);

        let (mesh, skeletons) = read(writer).unwrap();

        assert!(mesh.is_skinned());
        assert_eq!(mesh.num_bones(), 2);
        assert_eq!(mesh.num_bone_batches(), 1);
        assert_eq!(mesh.skeleton(), Some(SkeletonId(0)));
        assert_eq!(skeletons.len(), 1);
        assert_eq!(skeletons[0].bones().len(), 4);

        let bone_index = mesh.vertex_attribute("BONEINDEX").unwrap();
        assert_eq!(mesh.vertex_bytes(bone_index, 0).unwrap(), &[0, 1]);
        assert_eq!(mesh.vertex_bytes(bone_index, 1).unwrap(), &[3, 2]);
    }

    #[test]
    fn bone_batch_count_mismatch() {
        let mut writer = TagWriter::default();
        writer.write_u32s(mesh::NUM_BONE_INDICES_PER_BATCH, &[2]);
        writer.write_u32(mesh::NUM_BONE_BATCHES, 2);
        writer.end(scene::MESH);

        assert!(matches!(
            read(writer),
            Err(Error::BoneBatchMismatch {
                declared: 2,
                actual: 1
            })
        ));
    }
}
