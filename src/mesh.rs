use {
    super::{SkeletonId, error::Error, index::FaceData},
    glam::Mat4,
    log::warn,
    serde::{Deserialize, Serialize},
};

/// Element types used by vertex attributes and index lists. The discriminants are the values
/// stored in the file.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[repr(u32)]
pub enum DataType {
    #[default]
    None = 0,
    Float32,
    Int32,
    UInt16,
    Rgba,
    Argb,
    D3dColor,
    UByte4,
    Dec3N,
    Fixed16_16,
    UInt8,
    Int16,
    Int16Norm,
    Int8,
    Int8Norm,
    UInt8Norm,
    UInt16Norm,
    UInt32,
    Abgr,
    Float16,
}

impl DataType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::None,
            1 => Self::Float32,
            2 => Self::Int32,
            3 => Self::UInt16,
            4 => Self::Rgba,
            5 => Self::Argb,
            6 => Self::D3dColor,
            7 => Self::UByte4,
            8 => Self::Dec3N,
            9 => Self::Fixed16_16,
            10 => Self::UInt8,
            11 => Self::Int16,
            12 => Self::Int16Norm,
            13 => Self::Int8,
            14 => Self::Int8Norm,
            15 => Self::UInt8Norm,
            16 => Self::UInt16Norm,
            17 => Self::UInt32,
            18 => Self::Abgr,
            19 => Self::Float16,
            _ => return None,
        })
    }

    /// Size of a single element, in bytes, or `None` for [`DataType::None`].
    pub fn size(self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::Float32
            | Self::Int32
            | Self::UInt32
            | Self::Rgba
            | Self::Abgr
            | Self::Argb
            | Self::D3dColor
            | Self::UByte4
            | Self::Dec3N
            | Self::Fixed16_16 => Some(4),
            Self::Int16 | Self::Int16Norm | Self::UInt16 | Self::UInt16Norm | Self::Float16 => {
                Some(2)
            }
            Self::UInt8 | Self::UInt8Norm | Self::Int8 | Self::Int8Norm => Some(1),
        }
    }

    pub fn is_normalized(self) -> bool {
        matches!(
            self,
            Self::Int8Norm | Self::UInt8Norm | Self::Int16Norm | Self::UInt16Norm
        )
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
}

/// A block of raw vertex bytes, in host byte order, with the distance between vertices.
///
/// A stride of zero means the block is tightly packed.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct StridedBuffer {
    #[serde(with = "serde_bytes")]
    pub(crate) data: Vec<u8>,

    pub(crate) stride: u32,
}

impl StridedBuffer {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }
}

/// Describes where one named vertex channel lives inside a mesh data block.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VertexAttribute {
    pub(crate) data_index: usize,
    pub(crate) data_type: DataType,
    pub(crate) offset: u32,
    pub(crate) semantic: String,
    pub(crate) width: u32,
}

impl VertexAttribute {
    pub fn new(
        semantic: impl Into<String>,
        data_type: DataType,
        width: u32,
        offset: u32,
        data_index: usize,
    ) -> Self {
        Self {
            data_index,
            data_type,
            offset,
            semantic: semantic.into(),
            width,
        }
    }

    /// Index into [`Mesh::data_blocks`].
    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Byte offset of the first element within each vertex.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Semantic name, such as `POSITION`, `NORMAL` or `UV0`.
    pub fn semantic(&self) -> &str {
        &self.semantic
    }

    /// Number of components per vertex.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Size in bytes of this attribute within one vertex.
    pub fn byte_size(&self) -> Option<usize> {
        self.data_type.size().map(|size| size * self.width as usize)
    }
}

/// One drawable mesh.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Mesh {
    pub(crate) attributes: Vec<VertexAttribute>,
    pub(crate) data_blocks: Vec<StridedBuffer>,
    pub(crate) faces: FaceData,
    pub(crate) is_indexed: bool,
    pub(crate) is_skinned: bool,
    pub(crate) num_bones: u32,
    pub(crate) num_faces: u32,
    pub(crate) num_uvw_channels: u32,
    pub(crate) num_vertices: u32,
    pub(crate) skeleton: Option<SkeletonId>,
    pub(crate) strip_lengths: Vec<u32>,
    pub(crate) topology: PrimitiveTopology,
    pub(crate) unpack_matrix: Option<Mat4>,
}

impl Mesh {
    /// Registers a new raw data block and returns its index.
    pub fn add_data(&mut self, data: Vec<u8>, stride: u32) -> usize {
        self.data_blocks.push(StridedBuffer { data, stride });
        self.data_blocks.len() - 1
    }

    /// Registers a vertex attribute, failing if one with the same semantic already exists.
    pub fn add_vertex_attribute(&mut self, attribute: VertexAttribute) -> Result<usize, Error> {
        if self.vertex_attribute(&attribute.semantic).is_some() {
            warn!("Duplicate vertex attribute {}", attribute.semantic);

            return Err(Error::DuplicateAttribute {
                semantic: attribute.semantic,
            });
        }

        self.attributes.push(attribute);

        Ok(self.attributes.len() - 1)
    }

    pub fn data_block(&self, idx: usize) -> Option<&StridedBuffer> {
        self.data_blocks.get(idx)
    }

    pub fn data_blocks(&self) -> &[StridedBuffer] {
        &self.data_blocks
    }

    pub fn faces(&self) -> &FaceData {
        &self.faces
    }

    pub fn is_indexed(&self) -> bool {
        self.is_indexed
    }

    /// `true` when the mesh carries bone indices or bone weights.
    pub fn is_skinned(&self) -> bool {
        self.is_skinned
    }

    /// Number of bone influences per vertex, taken from the width of `BONEWEIGHT`.
    pub fn num_bones(&self) -> u32 {
        self.num_bones
    }

    /// Bone batches are always merged while reading, so skinned meshes report one batch.
    pub fn num_bone_batches(&self) -> u32 {
        self.is_skinned as _
    }

    pub fn num_faces(&self) -> u32 {
        self.num_faces
    }

    pub fn num_indices(&self) -> u32 {
        if self.strip_lengths.is_empty() {
            self.num_faces.saturating_mul(3)
        } else {
            let num_strips = u32::try_from(self.strip_lengths.len()).unwrap_or(u32::MAX);

            self.num_faces.saturating_add(num_strips.saturating_mul(2))
        }
    }

    pub fn num_uvw_channels(&self) -> u32 {
        self.num_uvw_channels
    }

    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    pub(crate) fn set_stride(&mut self, idx: usize, stride: u32) {
        if let Some(block) = self.data_blocks.get_mut(idx) {
            block.stride = stride;
        }
    }

    pub fn skeleton(&self) -> Option<SkeletonId> {
        self.skeleton
    }

    pub fn strip_lengths(&self) -> &[u32] {
        &self.strip_lengths
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// A dequantization transform for meshes with packed positions.
    pub fn unpack_matrix(&self) -> Option<Mat4> {
        self.unpack_matrix
    }

    /// Checks that every attribute lies within the data block it references.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        for attribute in &self.attributes {
            let Some(block) = self.data_blocks.get(attribute.data_index) else {
                warn!("Attribute {} has no data block", attribute.semantic);

                return Err(Error::AttributeOutOfBounds {
                    semantic: attribute.semantic.clone(),
                });
            };

            let Some(size) = attribute.byte_size() else {
                return Err(Error::UnsupportedDataType {
                    context: "vertex attribute",
                    value: attribute.data_type as _,
                });
            };

            if self.num_vertices == 0 {
                continue;
            }

            let stride = match block.stride as usize {
                0 => size,
                stride => stride,
            };
            let end = stride
                .saturating_mul(self.num_vertices as usize - 1)
                .saturating_add(attribute.offset as usize + size);

            if end > block.len() {
                warn!(
                    "Attribute {} needs {end} bytes but its block holds {}",
                    attribute.semantic,
                    block.len()
                );

                return Err(Error::AttributeOutOfBounds {
                    semantic: attribute.semantic.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn vertex_attribute(&self, semantic: &str) -> Option<&VertexAttribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.semantic == semantic)
    }

    pub fn vertex_attribute_index(&self, semantic: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|attribute| attribute.semantic == semantic)
    }

    pub fn vertex_attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Returns the bytes of one attribute for one vertex.
    pub fn vertex_bytes(&self, attribute: &VertexAttribute, vertex: usize) -> Option<&[u8]> {
        let block = self.data_blocks.get(attribute.data_index)?;
        let size = attribute.byte_size()?;
        let stride = match block.stride as usize {
            0 => size,
            stride => stride,
        };
        let start = vertex * stride + attribute.offset as usize;

        block.data.get(start..start + size)
    }

    /// Decodes the `Float32` components of an attribute for one vertex.
    pub fn vertex_f32s(&self, semantic: &str, vertex: usize) -> Option<Vec<f32>> {
        let attribute = self.vertex_attribute(semantic)?;
        if attribute.data_type != DataType::Float32 {
            return None;
        }

        let bytes = self.vertex_bytes(attribute, vertex)?;

        Some(
            bytes
                .chunks_exact(4)
                .map(|data| f32::from_ne_bytes([data[0], data[1], data[2], data[3]]))
                .collect(),
        )
    }
}
