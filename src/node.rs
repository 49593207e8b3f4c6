use {
    super::{MaterialId, NodeId},
    bitflags::bitflags,
    glam::{Mat4, Quat, Vec3},
    serde::{Deserialize, Serialize},
};

bitflags! {
    /// Records which parts of a node's static transform were present in the file.
    #[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
    pub struct TransformFlags: u32 {
        const SCALE = 0x01;
        const ROTATE = 0x02;
        const TRANSLATE = 0x04;
        const MATRIX = 0x40;
    }
}

/// Legacy per-frame lookup tables which some exporters write alongside node animation.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AnimationIndices {
    pub matrix: Vec<u32>,
    pub position: Vec<u32>,
    pub rotation: Vec<u32>,
    pub scale: Vec<u32>,
}

impl AnimationIndices {
    /// The longest of the four tables.
    pub fn num_frames(&self) -> usize {
        self.matrix
            .len()
            .max(self.position.len())
            .max(self.rotation.len())
            .max(self.scale.len())
    }
}

/// One entry of the scene graph: an instance of a mesh, light or camera.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Node {
    pub(crate) animation_flags: u32,
    pub(crate) animation_indices: AnimationIndices,
    pub(crate) has_animation: bool,
    pub(crate) material: Option<MaterialId>,
    pub(crate) matrix: Mat4,
    pub(crate) name: String,
    pub(crate) object_index: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) rotation: Quat,
    pub(crate) scale: Vec3,
    pub(crate) transform_flags: TransformFlags,
    pub(crate) translation: Vec3,
    pub(crate) user_data: Vec<u8>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            animation_flags: 0,
            animation_indices: Default::default(),
            has_animation: false,
            material: None,
            matrix: Mat4::IDENTITY,
            name: String::new(),
            object_index: 0,
            parent: None,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            transform_flags: TransformFlags::empty(),
            translation: Vec3::ZERO,
            user_data: vec![],
        }
    }
}

impl Node {
    pub fn animation_flags(&self) -> u32 {
        self.animation_flags
    }

    pub fn animation_indices(&self) -> &AnimationIndices {
        &self.animation_indices
    }

    /// `true` when at least one transform channel has more than one keyframe.
    pub fn has_animation(&self) -> bool {
        self.has_animation
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    /// The static matrix; only meaningful when [`TransformFlags::MATRIX`] is set.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index into the model's meshes, lights or cameras, depending on where this node sits in
    /// the node array.
    pub fn object_index(&self) -> u32 {
        self.object_index
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// The local transform built from the static fields, ignoring any keyframes.
    pub fn static_transform(&self) -> Mat4 {
        if self.transform_flags.contains(TransformFlags::MATRIX) {
            self.matrix
        } else {
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
        }
    }

    pub fn transform_flags(&self) -> TransformFlags {
        self.transform_flags
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn user_data(&self) -> &[u8] {
        &self.user_data
    }
}
