use {
    super::{
        CameraId, LightId, MaterialId, MeshId, NodeId, SkeletonId, Texture, TextureId,
        anim::{AnimationData, AnimationInstance},
        camera::Camera,
        light::Light,
        material::Material,
        mesh::Mesh,
        node::{Node, TransformFlags},
    },
    glam::{Mat4, Vec3},
    log::warn,
    serde::{Deserialize, Serialize},
};

/// A set of bones which deform a skinned mesh.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Skeleton {
    pub(crate) bones: Vec<NodeId>,
    pub(crate) inverse_bind_matrices: Vec<Mat4>,
    pub(crate) name: String,
}

impl Skeleton {
    pub fn bones(&self) -> &[NodeId] {
        &self.bones
    }

    /// One matrix per bone which transforms from model space into the space of that bone at the
    /// bind pose.
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind_matrices
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The root of a scene read from a POD file.
///
/// Nodes are stored in a flat array: mesh nodes first, then light nodes, then camera nodes.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Model {
    pub(crate) ambient_color: Vec3,
    pub(crate) animation_instances: Vec<AnimationInstance>,
    pub(crate) animations: Vec<AnimationData>,
    pub(crate) cameras: Vec<Camera>,
    pub(crate) clear_color: Vec3,
    pub(crate) flags: u32,
    pub(crate) fps: f32,
    pub(crate) lights: Vec<Light>,
    pub(crate) materials: Vec<Material>,
    pub(crate) meshes: Vec<Mesh>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) num_frames: u32,
    pub(crate) num_mesh_nodes: u32,
    pub(crate) skeletons: Vec<Skeleton>,
    pub(crate) textures: Vec<Texture>,
    pub(crate) units: f32,
    pub(crate) user_data: Vec<u8>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ZERO,
            animation_instances: vec![],
            animations: vec![],
            cameras: vec![],
            clear_color: Vec3::ZERO,
            flags: 0,
            fps: 30.0,
            lights: vec![],
            materials: vec![],
            meshes: vec![],
            nodes: vec![],
            num_frames: 0,
            num_mesh_nodes: 0,
            skeletons: vec![],
            textures: vec![],
            units: 1.0,
            user_data: vec![],
        }
    }
}

impl Model {
    pub fn ambient_color(&self) -> Vec3 {
        self.ambient_color
    }

    pub fn animation_instances(&self) -> &[AnimationInstance] {
        &self.animation_instances
    }

    pub fn animations(&self) -> &[AnimationData] {
        &self.animations
    }

    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.get(id.0)
    }

    /// Returns the node which instances the given camera.
    pub fn camera_node(&self, id: CameraId) -> Option<&Node> {
        self.nodes
            .get(self.num_mesh_nodes as usize + self.lights.len() + id.0)
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn clear_color(&self) -> Vec3 {
        self.clear_color
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Frames per second of the animation data.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0)
    }

    /// Returns the node which instances the given light.
    pub fn light_node(&self, id: LightId) -> Option<&Node> {
        self.nodes.get(self.num_mesh_nodes as usize + id.0)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// The local transform of a node at the given time, in seconds.
    ///
    /// Keyframed channels bound to the node are sampled; anything not keyframed falls back to
    /// the static transform read from the file.
    pub fn local_transform(&self, node: NodeId, time: f32) -> Mat4 {
        let Some(data) = self.nodes.get(node.0) else {
            return Mat4::IDENTITY;
        };

        let mut matrix = None;
        let mut rotation = data.rotation;
        let mut scale = data.scale;
        let mut translation = data.translation;

        for instance in &self.animation_instances {
            let Some(animation) = self.animations.get(instance.animation) else {
                continue;
            };

            for channel in instance.channels_for(node) {
                let Some(key_frame) = animation.key_frame(channel.key_frame) else {
                    continue;
                };

                if let Some(value) = key_frame.sample_matrix(time) {
                    matrix = Some(value);
                }

                if let Some(value) = key_frame.sample_rotation(time) {
                    rotation = value;
                }

                if let Some(value) = key_frame.sample_scale(time) {
                    scale = value;
                }

                if let Some(value) = key_frame.sample_translation(time) {
                    translation = value;
                }
            }
        }

        if let Some(matrix) = matrix {
            matrix
        } else if data.transform_flags.contains(TransformFlags::MATRIX) {
            data.matrix
        } else {
            Mat4::from_scale_rotation_translation(scale, rotation, translation)
        }
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// The leading nodes which instance meshes.
    pub fn mesh_nodes(&self) -> &[Node] {
        let len = (self.num_mesh_nodes as usize).min(self.nodes.len());

        &self.nodes[..len]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_frames(&self) -> u32 {
        self.num_frames
    }

    pub fn num_mesh_nodes(&self) -> u32 {
        self.num_mesh_nodes
    }

    pub fn skeleton(&self, id: SkeletonId) -> Option<&Skeleton> {
        self.skeletons.get(id.0)
    }

    pub fn skeletons(&self) -> &[Skeleton] {
        &self.skeletons
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn units(&self) -> f32 {
        self.units
    }

    pub fn user_data(&self) -> &[u8] {
        &self.user_data
    }

    /// The world transform of a node using the static transform of it and each ancestor.
    pub fn world_matrix(&self, node: NodeId) -> Mat4 {
        self.accumulate(node, |id| {
            self.nodes
                .get(id.0)
                .map(Node::static_transform)
                .unwrap_or(Mat4::IDENTITY)
        })
    }

    /// The world transform of a node at the given time, in seconds.
    pub fn world_matrix_at(&self, node: NodeId, time: f32) -> Mat4 {
        self.accumulate(node, |id| self.local_transform(id, time))
    }

    /// Walks parent links from `node` to the root, composing `parent × child` at each step.
    fn accumulate(&self, node: NodeId, local: impl Fn(NodeId) -> Mat4) -> Mat4 {
        let mut res = Mat4::IDENTITY;
        let mut next = Some(node);
        let mut depth = 0;

        while let Some(id) = next {
            let Some(data) = self.nodes.get(id.0) else {
                break;
            };

            res = local(id) * res;
            next = data.parent;
            depth += 1;

            if depth > self.nodes.len() {
                warn!("Node {} has a cyclic parent chain", node.0);

                break;
            }
        }

        res
    }
}
