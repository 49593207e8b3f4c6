use {
    super::TextureId,
    glam::{Vec3, Vec4},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// A single material property.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum MaterialValue {
    Float(f32),
    Int(i32),
    UInt(u32),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl MaterialValue {
    pub fn as_f32(self) -> Option<f32> {
        match self {
            Self::Float(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_i32(self) -> Option<i32> {
        match self {
            Self::Int(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_u32(self) -> Option<u32> {
        match self {
            Self::UInt(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_vec3(self) -> Option<Vec3> {
        match self {
            Self::Vec3(val) => Some(val),
            _ => None,
        }
    }

    pub fn as_vec4(self) -> Option<Vec4> {
        match self {
            Self::Vec4(val) => Some(val),
            _ => None,
        }
    }
}

const SEMANTIC_ALIASES: [(&str, &str); 5] = [
    ("ANISTROPHY", "ANISOTROPY"),
    ("FRESENEL", "FRESNEL"),
    ("SSCATERINGCOLOR", "SSSCATTERINGCOLOR"),
    ("SSCATERINGDEPTH", "SSSCATTERINGDEPTH"),
    ("SSSCATERING", "SSSCATTERING"),
];

/// A named shading description.
///
/// Properties and texture slots are sparse: a key which was not present in the file is absent
/// from the map.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Material {
    pub(crate) effect_file: String,
    pub(crate) effect_name: String,
    pub(crate) name: String,
    pub(crate) semantics: BTreeMap<String, MaterialValue>,
    pub(crate) texture_indices: BTreeMap<String, TextureId>,
    pub(crate) user_data: Vec<u8>,
}

impl Material {
    pub fn effect_file(&self) -> &str {
        &self.effect_file
    }

    pub fn effect_name(&self) -> &str {
        &self.effect_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a property such as `DIFFUSE` or `SHININESS`.
    ///
    /// The misspelled names `FRESENEL`, `SSSCATERING`, `SSCATERINGDEPTH`, `SSCATERINGCOLOR` and
    /// `ANISTROPHY` are accepted as aliases of the properties they were meant to name.
    pub fn semantic(&self, semantic: &str) -> Option<MaterialValue> {
        let semantic = SEMANTIC_ALIASES
            .iter()
            .find(|&&(alias, _)| alias == semantic)
            .map_or(semantic, |&(_, name)| name);

        self.semantics.get(semantic).copied()
    }

    pub fn semantics(&self) -> &BTreeMap<String, MaterialValue> {
        &self.semantics
    }

    pub(crate) fn set_semantic(&mut self, semantic: &str, value: MaterialValue) {
        self.semantics.insert(semantic.to_owned(), value);
    }

    /// Looks up a texture slot such as `DIFFUSETEXTURE` or `NORMALTEXTURE`.
    pub fn texture_index(&self, semantic: &str) -> Option<TextureId> {
        self.texture_indices.get(semantic).copied()
    }

    pub fn texture_indices(&self) -> &BTreeMap<String, TextureId> {
        &self.texture_indices
    }

    pub fn user_data(&self) -> &[u8] {
        &self.user_data
    }
}
