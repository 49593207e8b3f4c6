use {
    super::tag::{Tag, material, scene},
    crate::{
        TextureId,
        error::Error,
        material::{Material, MaterialValue},
    },
    glam::{Vec3, Vec4},
    log::trace,
    std::io::{Read, Seek},
};

/// Maps texture slot tags to the semantic they are stored under.
fn texture_semantic(identifier: u32) -> Option<&'static str> {
    Some(match identifier {
        material::DIFFUSE_TEXTURE_INDEX => "DIFFUSETEXTURE",
        material::AMBIENT_TEXTURE_INDEX => "AMBIENTTEXTURE",
        material::SPECULAR_COLOR_TEXTURE_INDEX => "SPECULARCOLORTEXTURE",
        material::SPECULAR_LEVEL_TEXTURE_INDEX => "SPECULARLEVELTEXTURE",
        material::BUMP_MAP_TEXTURE_INDEX => "NORMALTEXTURE",
        material::EMISSIVE_TEXTURE_INDEX => "EMISSIVETEXTURE",
        material::GLOSSINESS_TEXTURE_INDEX => "GLOSSINESSTEXTURE",
        material::OPACITY_TEXTURE_INDEX => "OPACITYTEXTURE",
        material::REFLECTION_TEXTURE_INDEX => "REFLECTIONTEXTURE",
        material::REFRACTION_TEXTURE_INDEX => "REFRACTIONTEXTURE",
        material::METALLICITY_TEXTURE_INDEX => "METALLICITYTEXTURE",
        material::ROUGHNESS_TEXTURE_INDEX => "ROUGHNESSTEXTURE",
        _ => return None,
    })
}

/// Maps scalar float property tags to their semantic.
fn float_semantic(identifier: u32) -> Option<&'static str> {
    Some(match identifier {
        material::SHININESS => "SHININESS",
        material::METALLICITY => "METALLICITY",
        material::ROUGHNESS => "ROUGHNESS",
        material::IOR => "IOR",
        material::FRESNEL => "FRESNEL",
        material::REFLECTIVITY => "REFLECTIVITY",
        material::SS_SCATTERING => "SSSCATTERING",
        material::SS_SCATTERING_DEPTH => "SSSCATTERINGDEPTH",
        material::EMISSION => "EMISSION",
        material::EMISSION_LUMINANCE => "EMISSIONLUMINANCE",
        material::EMISSION_KELVIN => "EMISSIONKELVIN",
        material::ANISOTROPY => "ANISOTROPY",
        _ => return None,
    })
}

/// Maps blend state tags to their semantic.
fn blend_semantic(identifier: u32) -> Option<&'static str> {
    Some(match identifier {
        material::BLENDING_RGB_SRC => "BLENDFUNCSRCCOLOR",
        material::BLENDING_ALPHA_SRC => "BLENDFUNCSRCALPHA",
        material::BLENDING_RGB_DST => "BLENDFUNCDSTCOLOR",
        material::BLENDING_ALPHA_DST => "BLENDFUNCDSTALPHA",
        material::BLENDING_RGB_OPERATION => "BLENDOPCOLOR",
        material::BLENDING_ALPHA_OPERATION => "BLENDOPALPHA",
        _ => return None,
    })
}

pub(super) fn read_material<R>(reader: &mut R, material: &mut Material) -> Result<(), Error>
where
    R: Read + Seek,
{
    while let Some(tag) = Tag::read(reader)? {
        if tag.is_end_of(scene::MATERIAL) {
            trace!(
                "Read material {} ({} semantic(s), {} texture(s))",
                material.name,
                material.semantics.len(),
                material.texture_indices.len()
            );

            return Ok(());
        }

        let identifier = tag.identifier;

        if let Some(semantic) = texture_semantic(identifier) {
            // Negative indices mean the slot is empty
            if let Some(texture) = TextureId::from_raw(tag.read_i32(reader)?) {
                material.texture_indices.insert(semantic.to_owned(), texture);
            }
        } else if let Some(semantic) = float_semantic(identifier) {
            material.set_semantic(semantic, MaterialValue::Float(tag.read_f32(reader)?));
        } else if let Some(semantic) = blend_semantic(identifier) {
            material.set_semantic(semantic, MaterialValue::UInt(tag.read_u32(reader)?));
        } else {
            match identifier {
                material::NAME => material.name = tag.read_string(reader)?,
                material::EFFECT_FILE => material.effect_file = tag.read_string(reader)?,
                material::EFFECT_NAME => material.effect_name = tag.read_string(reader)?,
                material::OPACITY => {
                    material.set_semantic("OPACITY", MaterialValue::Int(tag.read_i32(reader)?))
                }
                material::FLAGS => {
                    material.set_semantic("FLAGS", MaterialValue::Int(tag.read_i32(reader)?))
                }
                material::AMBIENT_COLOR => material.set_semantic(
                    "AMBIENT",
                    MaterialValue::Vec3(Vec3::from_array(tag.read_f32_array(reader)?)),
                ),
                material::DIFFUSE_COLOR => material.set_semantic(
                    "DIFFUSE",
                    MaterialValue::Vec3(Vec3::from_array(tag.read_f32_array(reader)?)),
                ),
                material::SPECULAR_COLOR => material.set_semantic(
                    "SPECULAR",
                    MaterialValue::Vec3(Vec3::from_array(tag.read_f32_array(reader)?)),
                ),
                material::SS_SCATTERING_COLOR => material.set_semantic(
                    "SSSCATTERINGCOLOR",
                    MaterialValue::Vec3(Vec3::from_array(tag.read_f32_array(reader)?)),
                ),
                material::BLENDING_RGBA_COLOR => material.set_semantic(
                    "BLENDCOLOR",
                    MaterialValue::Vec4(Vec4::from_array(tag.read_f32_array(reader)?)),
                ),
                material::BLENDING_FACTOR_ARRAY => material.set_semantic(
                    "BLENDFACTOR",
                    MaterialValue::Vec4(Vec4::from_array(tag.read_f32_array(reader)?)),
                ),
                material::USER_DATA => material.user_data = tag.payload(reader)?,
                _ => tag.skip(reader)?,
            }
        }
    }

    Err(Error::Truncated {
        context: "material",
    })
}
