//! The tag envelope which wraps every record in a POD file: `identifier: u32`,
//! `data_length: u32`, then `data_length` bytes of payload.
//!
//! Start tags have the high bit clear; the tag which closes a block repeats the identifier of
//! the block with [`END_TAG_MASK`] set.

use {
    super::primitive::{decode_f32s, decode_string, decode_u32s, read_bytes, read_u32},
    crate::error::Error,
    byteorder::{ByteOrder, LittleEndian},
    log::trace,
    std::io::{ErrorKind, Read, Seek, SeekFrom},
};

pub const END_TAG_MASK: u32 = 0x8000_0000;

pub const FORMAT_VERSION: u32 = 1000;
pub const SCENE: u32 = 1001;
pub const EXPORT_OPTIONS: u32 = 1002;
pub const FILE_HISTORY: u32 = 1003;

pub mod scene {
    pub const CLEAR_COLOR: u32 = 2000;
    pub const AMBIENT_COLOR: u32 = 2001;
    pub const NUM_CAMERAS: u32 = 2002;
    pub const NUM_LIGHTS: u32 = 2003;
    pub const NUM_MESHES: u32 = 2004;
    pub const NUM_NODES: u32 = 2005;
    pub const NUM_MESH_NODES: u32 = 2006;
    pub const NUM_TEXTURES: u32 = 2007;
    pub const NUM_MATERIALS: u32 = 2008;
    pub const NUM_FRAMES: u32 = 2009;
    pub const CAMERA: u32 = 2010;
    pub const LIGHT: u32 = 2011;
    pub const MESH: u32 = 2012;
    pub const NODE: u32 = 2013;
    pub const TEXTURE: u32 = 2014;
    pub const MATERIAL: u32 = 2015;
    pub const FLAGS: u32 = 2016;
    pub const FPS: u32 = 2017;
    pub const USER_DATA: u32 = 2018;
    pub const UNITS: u32 = 2019;
}

pub mod material {
    pub const NAME: u32 = 3000;
    pub const DIFFUSE_TEXTURE_INDEX: u32 = 3001;
    pub const OPACITY: u32 = 3002;
    pub const AMBIENT_COLOR: u32 = 3003;
    pub const DIFFUSE_COLOR: u32 = 3004;
    pub const SPECULAR_COLOR: u32 = 3005;
    pub const SHININESS: u32 = 3006;
    pub const EFFECT_FILE: u32 = 3007;
    pub const EFFECT_NAME: u32 = 3008;
    pub const AMBIENT_TEXTURE_INDEX: u32 = 3009;
    pub const SPECULAR_COLOR_TEXTURE_INDEX: u32 = 3010;
    pub const SPECULAR_LEVEL_TEXTURE_INDEX: u32 = 3011;
    pub const BUMP_MAP_TEXTURE_INDEX: u32 = 3012;
    pub const EMISSIVE_TEXTURE_INDEX: u32 = 3013;
    pub const GLOSSINESS_TEXTURE_INDEX: u32 = 3014;
    pub const OPACITY_TEXTURE_INDEX: u32 = 3015;
    pub const REFLECTION_TEXTURE_INDEX: u32 = 3016;
    pub const REFRACTION_TEXTURE_INDEX: u32 = 3017;
    pub const BLENDING_RGB_SRC: u32 = 3018;
    pub const BLENDING_ALPHA_SRC: u32 = 3019;
    pub const BLENDING_RGB_DST: u32 = 3020;
    pub const BLENDING_ALPHA_DST: u32 = 3021;
    pub const BLENDING_RGB_OPERATION: u32 = 3022;
    pub const BLENDING_ALPHA_OPERATION: u32 = 3023;
    pub const BLENDING_RGBA_COLOR: u32 = 3024;
    pub const BLENDING_FACTOR_ARRAY: u32 = 3025;
    pub const FLAGS: u32 = 3026;
    pub const USER_DATA: u32 = 3027;
    pub const METALLICITY: u32 = 3028;
    pub const ROUGHNESS: u32 = 3029;
    pub const IOR: u32 = 3030;
    pub const FRESNEL: u32 = 3031;
    pub const REFLECTIVITY: u32 = 3032;
    pub const SS_SCATTERING: u32 = 3033;
    pub const SS_SCATTERING_DEPTH: u32 = 3034;
    pub const SS_SCATTERING_COLOR: u32 = 3035;
    pub const EMISSION: u32 = 3036;
    pub const EMISSION_LUMINANCE: u32 = 3037;
    pub const EMISSION_KELVIN: u32 = 3038;
    pub const ANISOTROPY: u32 = 3039;
    pub const METALLICITY_TEXTURE_INDEX: u32 = 3040;
    pub const ROUGHNESS_TEXTURE_INDEX: u32 = 3041;
}

pub mod texture {
    pub const FILENAME: u32 = 4000;
}

pub mod node {
    pub const INDEX: u32 = 5000;
    pub const NAME: u32 = 5001;
    pub const MATERIAL_INDEX: u32 = 5002;
    pub const PARENT_INDEX: u32 = 5003;
    pub const POSITION: u32 = 5004;
    pub const ROTATION: u32 = 5005;
    pub const SCALE: u32 = 5006;
    pub const ANIMATION_POSITION: u32 = 5007;
    pub const ANIMATION_ROTATION: u32 = 5008;
    pub const ANIMATION_SCALE: u32 = 5009;
    pub const MATRIX: u32 = 5010;
    pub const ANIMATION_MATRIX: u32 = 5011;
    pub const ANIMATION_FLAGS: u32 = 5012;
    pub const ANIMATION_POSITION_INDEX: u32 = 5013;
    pub const ANIMATION_ROTATION_INDEX: u32 = 5014;
    pub const ANIMATION_SCALE_INDEX: u32 = 5015;
    pub const ANIMATION_MATRIX_INDEX: u32 = 5016;
    pub const USER_DATA: u32 = 5017;
}

pub mod mesh {
    pub const NUM_VERTICES: u32 = 6000;
    pub const NUM_FACES: u32 = 6001;
    pub const NUM_UVW_CHANNELS: u32 = 6002;
    pub const VERTEX_INDEX_LIST: u32 = 6003;
    pub const STRIP_LENGTH: u32 = 6004;
    pub const NUM_STRIPS: u32 = 6005;
    pub const VERTEX_LIST: u32 = 6006;
    pub const NORMAL_LIST: u32 = 6007;
    pub const TANGENT_LIST: u32 = 6008;
    pub const BINORMAL_LIST: u32 = 6009;
    pub const UVW_LIST: u32 = 6010;
    pub const VERTEX_COLOR_LIST: u32 = 6011;
    pub const BONE_INDEX_LIST: u32 = 6012;
    pub const BONE_WEIGHT_LIST: u32 = 6013;
    pub const INTERLEAVED_DATA_LIST: u32 = 6014;
    pub const BONE_BATCH_INDEX_LIST: u32 = 6015;
    pub const NUM_BONE_INDICES_PER_BATCH: u32 = 6016;
    pub const BONE_OFFSET_PER_BATCH: u32 = 6017;
    pub const MAX_NUM_BONES_PER_BATCH: u32 = 6018;
    pub const NUM_BONE_BATCHES: u32 = 6019;
    pub const UNPACK_MATRIX: u32 = 6020;
}

pub mod light {
    pub const TARGET_OBJECT_INDEX: u32 = 7000;
    pub const COLOR: u32 = 7001;
    pub const TYPE: u32 = 7002;
    pub const CONSTANT_ATTENUATION: u32 = 7003;
    pub const LINEAR_ATTENUATION: u32 = 7004;
    pub const QUADRATIC_ATTENUATION: u32 = 7005;
    pub const FALLOFF_ANGLE: u32 = 7006;
    pub const FALLOFF_EXPONENT: u32 = 7007;
}

pub mod camera {
    pub const TARGET_OBJECT_INDEX: u32 = 8000;
    pub const FOV: u32 = 8001;
    pub const FAR_PLANE: u32 = 8002;
    pub const NEAR_PLANE: u32 = 8003;
    pub const FOV_ANIMATION: u32 = 8004;
}

/// Tags found inside vertex attribute and index list blocks.
pub mod block {
    pub const DATA_TYPE: u32 = 9000;
    pub const NUM_COMPONENTS: u32 = 9001;
    pub const STRIDE: u32 = 9002;
    pub const DATA: u32 = 9003;
}

/// A human readable name for a tag identifier, used in errors and log output.
pub(crate) fn name(identifier: u32) -> &'static str {
    match identifier & !END_TAG_MASK {
        FORMAT_VERSION => "format version",
        SCENE => "scene",
        EXPORT_OPTIONS => "export options",
        FILE_HISTORY => "file history",
        1..=1999 => "file",
        scene::CLEAR_COLOR => "scene clear color",
        scene::AMBIENT_COLOR => "scene ambient color",
        scene::NUM_CAMERAS => "scene camera count",
        scene::NUM_LIGHTS => "scene light count",
        scene::NUM_MESHES => "scene mesh count",
        scene::NUM_NODES => "scene node count",
        scene::NUM_MESH_NODES => "scene mesh node count",
        scene::NUM_TEXTURES => "scene texture count",
        scene::NUM_MATERIALS => "scene material count",
        scene::NUM_FRAMES => "scene frame count",
        scene::CAMERA => "camera",
        scene::LIGHT => "light",
        scene::MESH => "mesh",
        scene::NODE => "node",
        scene::TEXTURE => "texture",
        scene::MATERIAL => "material",
        scene::FPS => "scene fps",
        scene::UNITS => "scene units",
        2000..=2999 => "scene",
        material::NAME => "material name",
        material::EFFECT_FILE | material::EFFECT_NAME => "material effect",
        3000..=3999 => "material",
        4000..=4999 => "texture",
        node::NAME => "node name",
        node::PARENT_INDEX => "node parent",
        node::POSITION..=node::SCALE | node::MATRIX => "node transform",
        node::ANIMATION_POSITION..=node::ANIMATION_SCALE | node::ANIMATION_MATRIX => {
            "node animation"
        }
        5000..=5999 => "node",
        mesh::VERTEX_INDEX_LIST => "mesh index list",
        mesh::VERTEX_LIST..=mesh::BONE_WEIGHT_LIST => "mesh vertex attribute",
        mesh::INTERLEAVED_DATA_LIST => "mesh interleaved data",
        mesh::BONE_BATCH_INDEX_LIST..=mesh::NUM_BONE_BATCHES => "mesh bone batches",
        6000..=6999 => "mesh",
        7000..=7999 => "light",
        8000..=8999 => "camera",
        block::DATA_TYPE => "data type",
        block::DATA => "data block",
        9000..=9999 => "data block",
        _ => "unknown",
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Tag {
    pub data_length: u32,
    pub identifier: u32,
}

impl Tag {
    /// Reads the next tag header.
    ///
    /// Returns `None` when the stream ends cleanly before the identifier; a header cut short
    /// anywhere else is [`Error::Truncated`].
    pub(crate) fn read(reader: &mut impl Read) -> Result<Option<Self>, Error> {
        let mut identifier = [0u8; 4];
        let mut filled = 0;

        while filled < identifier.len() {
            match reader.read(&mut identifier[filled..]) {
                Ok(0) => break,
                Ok(len) => filled += len,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }

        match filled {
            0 => return Ok(None),
            4 => (),
            _ => return Err(Error::Truncated { context: "tag header" }),
        }

        let identifier = LittleEndian::read_u32(&identifier);
        let data_length = read_u32(reader, "tag header")?;

        Ok(Some(Self {
            data_length,
            identifier,
        }))
    }

    pub(crate) fn is_end_of(self, block: u32) -> bool {
        self.identifier == block | END_TAG_MASK
    }

    pub(crate) fn name(self) -> &'static str {
        name(self.identifier)
    }

    /// Reads the entire payload.
    pub(crate) fn payload(self, reader: &mut impl Read) -> Result<Vec<u8>, Error> {
        read_bytes(reader, self.data_length as _, self.name())
    }

    /// Reads the payload as `N` floats, failing if it holds fewer.
    pub(crate) fn read_f32_array<const N: usize>(
        self,
        reader: &mut impl Read,
    ) -> Result<[f32; N], Error> {
        let vals = self.read_f32s(reader)?;

        vals.get(..N)
            .and_then(|vals| vals.try_into().ok())
            .ok_or(Error::Truncated {
                context: self.name(),
            })
    }

    pub(crate) fn read_f32(self, reader: &mut impl Read) -> Result<f32, Error> {
        self.read_f32_array::<1>(reader).map(|[val]| val)
    }

    pub(crate) fn read_f32s(self, reader: &mut impl Read) -> Result<Vec<f32>, Error> {
        self.payload(reader).map(|data| decode_f32s(&data))
    }

    pub(crate) fn read_i32(self, reader: &mut impl Read) -> Result<i32, Error> {
        self.read_u32(reader).map(|val| val as _)
    }

    pub(crate) fn read_string(self, reader: &mut impl Read) -> Result<String, Error> {
        self.payload(reader).map(|data| decode_string(&data))
    }

    pub(crate) fn read_u32(self, reader: &mut impl Read) -> Result<u32, Error> {
        self.read_u32s(reader)?
            .first()
            .copied()
            .ok_or(Error::Truncated {
                context: self.name(),
            })
    }

    pub(crate) fn read_u32s(self, reader: &mut impl Read) -> Result<Vec<u32>, Error> {
        self.payload(reader).map(|data| decode_u32s(&data))
    }

    /// Moves past the payload without reading it.
    pub(crate) fn skip(self, reader: &mut impl Seek) -> Result<(), Error> {
        trace!(
            "Skipping tag {} ({}, {} byte{})",
            self.identifier,
            self.name(),
            self.data_length,
            if self.data_length == 1 { "" } else { "s" }
        );

        reader.seek(SeekFrom::Current(self.data_length as _))?;

        Ok(())
    }
}
