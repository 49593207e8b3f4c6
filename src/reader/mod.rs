//! Reads POD streams into a [`Model`].
//!
//! The stream is a flat sequence of tags. The top level holds a format version tag and a single
//! scene block; every entity of the scene is itself a block nested inside it.

mod bone_batch;
mod camera;
mod light;
mod material;
mod mesh;
mod node;
mod primitive;

pub mod tag;

use {
    self::{
        camera::read_camera, light::read_light, material::read_material, mesh::read_mesh,
        node::read_node, tag::Tag,
    },
    crate::{
        NodeId, Texture,
        anim::{AnimationData, AnimationInstance},
        error::Error,
        model::Model,
    },
    glam::{Mat4, Vec3},
    log::{debug, trace, warn},
    std::io::{Read, Seek},
};

/// The exact payload of the format version tag, including its NUL terminator.
pub const FORMAT_VERSION: &[u8; 11] = b"AB.POD.2.0\0";

/// Reads a complete model from the given stream.
pub fn read_pod(mut reader: impl Read + Seek) -> Result<Model, Error> {
    let mut model = Model::default();
    read_pod_into(&mut reader, &mut model)?;

    Ok(model)
}

/// Reads a complete model from the given stream into `model`, replacing its previous contents.
///
/// Tags which precede the scene block are skipped, except for the format version tag which must
/// match [`FORMAT_VERSION`] exactly. Reading stops at the end of the first scene block.
pub fn read_pod_into<R>(reader: &mut R, model: &mut Model) -> Result<(), Error>
where
    R: Read + Seek,
{
    *model = Model::default();

    while let Some(tag) = Tag::read(reader)? {
        match tag.identifier {
            tag::FORMAT_VERSION => {
                if !read_version(reader, tag)? {
                    warn!("Unsupported format version");

                    return Err(Error::VersionMismatch);
                }
            }
            tag::SCENE => return read_scene(reader, model),
            _ => tag.skip(reader)?,
        }
    }

    warn!("Stream contains no scene");

    Err(Error::MissingScene)
}

/// Returns `true` if the stream holds a format version tag which matches [`FORMAT_VERSION`].
pub(crate) fn probe<R>(reader: &mut R) -> bool
where
    R: Read + Seek,
{
    loop {
        match Tag::read(reader) {
            Ok(Some(tag)) if tag.identifier == tag::FORMAT_VERSION => {
                return read_version(reader, tag).unwrap_or_default();
            }
            Ok(Some(tag)) => {
                if tag.skip(reader).is_err() {
                    return false;
                }
            }
            Ok(None) => return false,
            Err(err) => {
                trace!("Probe failed: {err}");

                return false;
            }
        }
    }
}

/// Reads the version payload, returning whether both its length and content match.
fn read_version<R>(reader: &mut R, tag: Tag) -> Result<bool, Error>
where
    R: Read + Seek,
{
    if tag.data_length as usize != FORMAT_VERSION.len() {
        trace!("Version tag has {} bytes", tag.data_length);

        tag.skip(reader)?;

        return Ok(false);
    }

    Ok(tag.payload(reader)? == FORMAT_VERSION)
}

/// Entity counts declared by the scene header.
#[derive(Default)]
struct DeclaredCounts {
    cameras: usize,
    lights: usize,
    materials: usize,
    meshes: usize,
    nodes: usize,
    textures: usize,
}

/// Appends a default entity and returns it, failing if the array already holds the declared
/// number of entities.
fn next_slot<'a, T: Default>(
    items: &'a mut Vec<T>,
    declared: usize,
    entity: &'static str,
) -> Result<&'a mut T, Error> {
    let idx = items.len();
    if idx >= declared {
        warn!("Found more {entity} than the {declared} declared");

        return Err(Error::TooManyEntities { entity, declared });
    }

    items.push(T::default());

    Ok(&mut items[idx])
}

fn read_scene<R>(reader: &mut R, model: &mut Model) -> Result<(), Error>
where
    R: Read + Seek,
{
    let mut declared = DeclaredCounts::default();

    model.animations = vec![AnimationData::new("Default Animation")];
    model.animation_instances = vec![AnimationInstance::default()];

    while let Some(tag) = Tag::read(reader)? {
        if tag.is_end_of(tag::SCENE) {
            check_counts(model, &declared)?;
            compute_inverse_bind_matrices(model);

            debug!(
                "Read scene ({} nodes, {} meshes, {} materials, {} textures, {} lights, {} \
                cameras)",
                model.nodes.len(),
                model.meshes.len(),
                model.materials.len(),
                model.textures.len(),
                model.lights.len(),
                model.cameras.len()
            );

            return Ok(());
        }

        match tag.identifier {
            tag::scene::CLEAR_COLOR => {
                model.clear_color = Vec3::from_array(tag.read_f32_array(reader)?)
            }
            tag::scene::AMBIENT_COLOR => {
                model.ambient_color = Vec3::from_array(tag.read_f32_array(reader)?)
            }
            tag::scene::NUM_CAMERAS => declared.cameras = tag.read_u32(reader)? as usize,
            tag::scene::NUM_LIGHTS => declared.lights = tag.read_u32(reader)? as usize,
            tag::scene::NUM_MESHES => declared.meshes = tag.read_u32(reader)? as usize,
            tag::scene::NUM_NODES => declared.nodes = tag.read_u32(reader)? as usize,
            tag::scene::NUM_TEXTURES => declared.textures = tag.read_u32(reader)? as usize,
            tag::scene::NUM_MATERIALS => declared.materials = tag.read_u32(reader)? as usize,
            tag::scene::NUM_MESH_NODES => model.num_mesh_nodes = tag.read_u32(reader)?,
            tag::scene::NUM_FRAMES => model.num_frames = tag.read_u32(reader)?,
            tag::scene::FLAGS => model.flags = tag.read_u32(reader)?,
            tag::scene::FPS => match tag.read_u32(reader)? {
                0 => warn!("Ignoring a frame rate of zero, keeping {} fps", model.fps),
                fps => model.fps = fps as f32,
            },
            tag::scene::UNITS => model.units = tag.read_f32(reader)?,
            tag::scene::USER_DATA => model.user_data = tag.payload(reader)?,
            tag::scene::CAMERA => {
                let camera = next_slot(&mut model.cameras, declared.cameras, "cameras")?;
                read_camera(reader, camera, model.fps)?;
            }
            tag::scene::LIGHT => {
                let light = next_slot(&mut model.lights, declared.lights, "lights")?;
                read_light(reader, light)?;
            }
            tag::scene::MATERIAL => {
                let material = next_slot(&mut model.materials, declared.materials, "materials")?;
                read_material(reader, material)?;
            }
            tag::scene::MESH => {
                let mesh = next_slot(&mut model.meshes, declared.meshes, "meshes")?;
                read_mesh(reader, mesh, &mut model.skeletons)?;
            }
            tag::scene::NODE => {
                let node_id = NodeId(model.nodes.len());
                let node = next_slot(&mut model.nodes, declared.nodes, "nodes")?;
                read_node(
                    reader,
                    node,
                    node_id,
                    model.fps,
                    &mut model.animations[0],
                    &mut model.animation_instances[0],
                )?;
            }
            tag::scene::TEXTURE => {
                let texture = next_slot(&mut model.textures, declared.textures, "textures")?;
                read_texture(reader, texture)?;
            }
            _ => tag.skip(reader)?,
        }
    }

    Err(Error::Truncated { context: "scene" })
}

fn read_texture<R>(reader: &mut R, texture: &mut Texture) -> Result<(), Error>
where
    R: Read + Seek,
{
    while let Some(tag) = Tag::read(reader)? {
        if tag.is_end_of(tag::scene::TEXTURE) {
            trace!("Read texture {}", texture.name());

            return Ok(());
        }

        match tag.identifier {
            tag::texture::FILENAME => texture.set_name(tag.read_string(reader)?),
            _ => tag.skip(reader)?,
        }
    }

    Err(Error::Truncated { context: "texture" })
}

fn check_counts(model: &Model, declared: &DeclaredCounts) -> Result<(), Error> {
    for (entity, declared, actual) in [
        ("cameras", declared.cameras, model.cameras.len()),
        ("lights", declared.lights, model.lights.len()),
        ("materials", declared.materials, model.materials.len()),
        ("meshes", declared.meshes, model.meshes.len()),
        ("textures", declared.textures, model.textures.len()),
        ("nodes", declared.nodes, model.nodes.len()),
    ] {
        if declared != actual {
            warn!("Scene declared {declared} {entity} but contains {actual}");

            return Err(Error::CountMismatch {
                entity,
                declared,
                actual,
            });
        }
    }

    Ok(())
}

/// Inverts the bind pose world matrix of every bone.
fn compute_inverse_bind_matrices(model: &mut Model) {
    let inverse_bind_matrices = model
        .skeletons
        .iter()
        .map(|skeleton| {
            skeleton
                .bones
                .iter()
                .map(|&bone| model.world_matrix(bone).inverse())
                .collect::<Vec<Mat4>>()
        })
        .collect::<Vec<_>>();

    for (skeleton, matrices) in model.skeletons.iter_mut().zip(inverse_bind_matrices) {
        skeleton.inverse_bind_matrices = matrices;
    }
}
