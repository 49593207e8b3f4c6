use {
    super::tag::{Tag, node, scene},
    crate::{
        MaterialId, NodeId,
        anim::{AnimationData, AnimationInstance, Interpolation, KeyFrameData, KeyframeChannel},
        error::Error,
        node::{Node, TransformFlags},
    },
    glam::{Mat4, Quat, Vec3},
    log::trace,
    std::io::{Read, Seek},
};

/// Values read from the deprecated single-frame transform tags.
#[derive(Default)]
struct LegacyTransform {
    matrix: Option<Mat4>,
    rotation: Option<Quat>,
    scale: Option<Vec3>,
    translation: Option<Vec3>,
}

/// Keyframed channels with more than one frame, bound once the whole node is read.
#[derive(Default)]
struct KeyFrames {
    matrix: Option<KeyFrameData>,
    rotation: Option<KeyFrameData>,
    scale: Option<KeyFrameData>,
    translation: Option<KeyFrameData>,
}

impl KeyFrames {
    /// Scale and matrix keyframes share a channel; matrix keyframes win.
    fn into_channels(self) -> impl Iterator<Item = KeyFrameData> {
        [self.matrix.or(self.scale), self.rotation, self.translation]
            .into_iter()
            .flatten()
    }

    fn is_empty(&self) -> bool {
        self.matrix.is_none()
            && self.rotation.is_none()
            && self.scale.is_none()
            && self.translation.is_none()
    }
}

/// Reads a node block.
///
/// Keyframed channels with more than one frame are appended to `animation` and bound to
/// `node_id` through `instance`, in the order scale or matrix, rotation, translation. The first
/// frame of every keyframed channel also becomes the static transform of the node. The result
/// does not depend on the order of the tags inside the block.
pub(super) fn read_node<R>(
    reader: &mut R,
    node: &mut Node,
    node_id: NodeId,
    fps: f32,
    animation: &mut AnimationData,
    instance: &mut AnimationInstance,
) -> Result<(), Error>
where
    R: Read + Seek,
{
    let mut key_frames = KeyFrames::default();
    let mut legacy = LegacyTransform::default();
    let mut matrix_animation = false;

    let keyed = |values: usize| {
        (values > 1).then(|| KeyFrameData {
            interpolation: Interpolation::Linear,
            times: KeyFrameData::frame_times(values, fps),
            ..Default::default()
        })
    };

    while let Some(tag) = Tag::read(reader)? {
        if tag.is_end_of(scene::NODE) {
            apply_legacy_transform(node, legacy, &key_frames);

            if matrix_animation {
                node.transform_flags = TransformFlags::MATRIX;
            }

            node.has_animation = !key_frames.is_empty();

            let num_channels = instance.channels.len();
            instance
                .channels
                .extend(key_frames.into_channels().map(|key_frame| KeyframeChannel {
                    key_frame: animation.push_key_frame(key_frame),
                    nodes: vec![node_id],
                }));

            trace!(
                "Read node {} ({} keyframe channel(s))",
                node.name,
                instance.channels.len() - num_channels
            );

            return Ok(());
        }

        match tag.identifier {
            node::INDEX => node.object_index = tag.read_u32(reader)?,
            node::NAME => node.name = tag.read_string(reader)?,
            node::MATERIAL_INDEX => node.material = MaterialId::from_raw(tag.read_i32(reader)?),
            node::PARENT_INDEX => node.parent = NodeId::from_raw(tag.read_i32(reader)?),
            node::POSITION => {
                legacy.translation = Some(Vec3::from_array(tag.read_f32_array(reader)?));
                node.transform_flags |= TransformFlags::TRANSLATE;
            }
            node::ROTATION => {
                legacy.rotation = Some(Quat::from_array(tag.read_f32_array(reader)?));
                node.transform_flags |= TransformFlags::ROTATE;
            }
            node::SCALE => {
                legacy.scale = Some(Vec3::from_array(tag.read_f32_array(reader)?));
                node.transform_flags |= TransformFlags::SCALE;
            }
            node::MATRIX => {
                legacy.matrix = Some(Mat4::from_cols_array(&tag.read_f32_array(reader)?));
                node.transform_flags |= TransformFlags::MATRIX;
            }
            node::ANIMATION_POSITION => {
                let translation = tag
                    .read_f32s(reader)?
                    .chunks_exact(3)
                    .map(Vec3::from_slice)
                    .collect::<Vec<_>>();

                if let Some(&first) = translation.first() {
                    node.translation = first;
                }

                key_frames.translation = keyed(translation.len()).map(|key_frame| KeyFrameData {
                    translation,
                    ..key_frame
                });
                node.transform_flags |= TransformFlags::TRANSLATE;
            }
            node::ANIMATION_ROTATION => {
                // Stored on disk with the opposite handedness
                let rotation = tag
                    .read_f32s(reader)?
                    .chunks_exact(4)
                    .map(|val| Quat::from_xyzw(val[0], val[1], val[2], -val[3]))
                    .collect::<Vec<_>>();

                if let Some(&first) = rotation.first() {
                    node.rotation = first;
                }

                key_frames.rotation = keyed(rotation.len()).map(|key_frame| KeyFrameData {
                    rotation,
                    ..key_frame
                });
                node.transform_flags |= TransformFlags::ROTATE;
            }
            node::ANIMATION_SCALE => {
                // Each frame holds seven floats; only the first three are a scale
                let scale = tag
                    .read_f32s(reader)?
                    .chunks_exact(7)
                    .map(|val| Vec3::from_slice(&val[..3]))
                    .collect::<Vec<_>>();

                if let Some(&first) = scale.first() {
                    node.scale = first;
                }

                key_frames.scale = keyed(scale.len()).map(|key_frame| KeyFrameData {
                    scale,
                    ..key_frame
                });
                node.transform_flags |= TransformFlags::SCALE;
            }
            node::ANIMATION_MATRIX => {
                let matrix = tag
                    .read_f32s(reader)?
                    .chunks_exact(16)
                    .map(Mat4::from_cols_slice)
                    .collect::<Vec<_>>();

                if let Some(&first) = matrix.first() {
                    node.matrix = first;
                }

                key_frames.matrix = keyed(matrix.len()).map(|key_frame| KeyFrameData {
                    matrix,
                    ..key_frame
                });
                matrix_animation = true;
            }
            node::ANIMATION_FLAGS => node.animation_flags = tag.read_u32(reader)?,
            node::ANIMATION_POSITION_INDEX => {
                node.animation_indices.position = tag.read_u32s(reader)?;
                extend_num_frames(animation, node.animation_indices.position.len());
            }
            node::ANIMATION_ROTATION_INDEX => {
                node.animation_indices.rotation = tag.read_u32s(reader)?;
                extend_num_frames(animation, node.animation_indices.rotation.len());
            }
            node::ANIMATION_SCALE_INDEX => {
                node.animation_indices.scale = tag.read_u32s(reader)?;
                extend_num_frames(animation, node.animation_indices.scale.len());
            }
            node::ANIMATION_MATRIX_INDEX => {
                node.animation_indices.matrix = tag.read_u32s(reader)?;
                extend_num_frames(animation, node.animation_indices.matrix.len());
            }
            node::USER_DATA => node.user_data = tag.payload(reader)?,
            _ => tag.skip(reader)?,
        }
    }

    Err(Error::Truncated { context: "node" })
}

/// Copies single-frame values into the node for each channel which was not keyframed.
fn apply_legacy_transform(node: &mut Node, legacy: LegacyTransform, key_frames: &KeyFrames) {
    let LegacyTransform {
        matrix,
        rotation,
        scale,
        translation,
    } = legacy;

    if let (None, Some(translation)) = (&key_frames.translation, translation) {
        node.translation = translation;
    }

    if let (None, Some(rotation)) = (&key_frames.rotation, rotation) {
        node.rotation = rotation;
    }

    if key_frames.scale.is_none() && key_frames.matrix.is_none() {
        if let Some(scale) = scale {
            node.scale = scale;
        }

        if let Some(matrix) = matrix {
            node.matrix = matrix;
        }
    }
}

fn extend_num_frames(animation: &mut AnimationData, num_frames: usize) {
    animation.num_frames = animation.num_frames.max(num_frames as _);
}

#[cfg(test)]
mod tests {
    use {
        super::read_node,
        crate::{
            Error, KeyFrameId, MaterialId, NodeId,
            anim::{AnimationData, AnimationInstance},
            node::{Node, TransformFlags},
            reader::tag::{node, scene},
            writer::TagWriter,
        },
        glam::{Mat4, Quat, Vec3},
        std::io::Cursor,
    };

    fn read(
        writer: TagWriter,
        fps: f32,
    ) -> Result<(Node, AnimationData, AnimationInstance), Error> {
        let mut node = Node::default();
        let mut animation = AnimationData::new("Default Animation");
        let mut instance = AnimationInstance::default();

        read_node(
            &mut Cursor::new(writer.into_inner()),
            &mut node,
            NodeId(3),
            fps,
            &mut animation,
            &mut instance,
        )?;

        Ok((node, animation, instance))
    }

    #[test]
    fn scalars() {
        let mut writer = TagWriter::default();
        writer.write_u32(node::INDEX, 2);
        writer.write_str(node::NAME, "Hip");
        writer.write_i32(node::MATERIAL_INDEX, -1);
        writer.write_i32(node::PARENT_INDEX, 1);
        writer.write_bytes(node::USER_DATA, &[1, 2]);
        writer.end(scene::NODE);

        let (node, animation, instance) = read(writer, 30.0).unwrap();

        assert_eq!(node.object_index(), 2);
        assert_eq!(node.name(), "Hip");
        assert_eq!(node.material(), None);
        assert_eq!(node.parent(), Some(NodeId(1)));
        assert_eq!(node.user_data(), &[1, 2]);
        assert!(!node.has_animation());
        assert!(animation.key_frames().is_empty());
        assert!(instance.channels().is_empty());
    }

    #[test]
    fn legacy_transform() {
        let mut writer = TagWriter::default();
        writer.write_i32(node::MATERIAL_INDEX, 0);
        writer.write_f32s(node::POSITION, &[1.0, 2.0, 3.0]);
        writer.write_f32s(node::ROTATION, &[0.0, 0.0, 0.0, 1.0]);
        writer.end(scene::NODE);

        let (node, ..) = read(writer, 30.0).unwrap();

        assert_eq!(node.material(), Some(MaterialId(0)));
        assert_eq!(node.translation(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.rotation(), Quat::IDENTITY);
        assert_eq!(node.scale(), Vec3::ONE);
        assert_eq!(
            node.transform_flags(),
            TransformFlags::TRANSLATE | TransformFlags::ROTATE
        );
        assert_eq!(
            node.static_transform(),
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn single_frame_is_static() {
        let mut writer = TagWriter::default();
        writer.write_f32s(node::ANIMATION_POSITION, &[4.0, 5.0, 6.0]);
        writer.write_f32s(node::ANIMATION_ROTATION, &[0.0, 0.0, 0.0, -1.0]);
        writer.write_f32s(node::ANIMATION_SCALE, &[2.0, 2.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
        writer.end(scene::NODE);

        let (node, animation, instance) = read(writer, 30.0).unwrap();

        assert!(!node.has_animation());
        assert_eq!(node.translation(), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(node.rotation(), Quat::IDENTITY);
        assert_eq!(node.scale(), Vec3::splat(2.0));
        assert_eq!(node.transform_flags(), TransformFlags::all() - TransformFlags::MATRIX);
        assert!(animation.key_frames().is_empty());
        assert!(instance.channels().is_empty());
    }

    #[test]
    fn keyframed_channels() {
        let mut writer = TagWriter::default();
        writer.write_f32s(node::ANIMATION_POSITION, &[0.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        writer.write_f32s(
            node::ANIMATION_ROTATION,
            &[0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0],
        );
        writer.end(scene::NODE);

        let (node, animation, instance) = read(writer, 2.0).unwrap();

        assert!(node.has_animation());
        assert_eq!(animation.key_frames().len(), 2);
        assert_eq!(animation.num_frames(), 3);

        // Two frames at 2 fps last one second, three frames last one and a half
        assert_eq!(animation.duration(), 1.5);

        // Rotation is pooled and bound before translation
        let rotation = animation.key_frame(KeyFrameId(0)).unwrap();
        assert_eq!(rotation.rotation(), &[Quat::IDENTITY; 3]);

        let translation = animation.key_frame(KeyFrameId(1)).unwrap();
        assert_eq!(translation.times(), &[0.0, 0.5]);
        assert_eq!(translation.translation()[1], Vec3::new(2.0, 0.0, 0.0));

        assert_eq!(instance.channels().len(), 2);
        assert_eq!(instance.channels()[0].key_frame(), KeyFrameId(0));
        assert_eq!(instance.channels()[1].key_frame(), KeyFrameId(1));
        assert_eq!(instance.channels_for(NodeId(3)).count(), 2);
        assert_eq!(instance.channels_for(NodeId(0)).count(), 0);
    }

    #[test]
    fn keyframes_override_legacy_values() {
        let mut writer = TagWriter::default();
        writer.write_f32s(node::POSITION, &[9.0, 9.0, 9.0]);
        writer.write_f32s(node::ANIMATION_POSITION, &[1.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        writer.write_f32s(node::SCALE, &[3.0, 3.0, 3.0]);
        writer.end(scene::NODE);

        let (node, ..) = read(writer, 30.0).unwrap();

        assert_eq!(node.translation(), Vec3::X);
        assert_eq!(node.scale(), Vec3::splat(3.0));
    }

    #[test]
    fn matrix_animation_replaces_flags() {
        let mut matrices = Mat4::IDENTITY.to_cols_array().to_vec();
        matrices.extend_from_slice(&Mat4::from_translation(Vec3::Y).to_cols_array());

        let mut writer = TagWriter::default();
        writer.write_f32s(node::ANIMATION_POSITION, &[1.0, 2.0, 3.0]);
        writer.write_f32s(node::ANIMATION_MATRIX, &matrices);
        writer.end(scene::NODE);

        let (node, animation, instance) = read(writer, 30.0).unwrap();

        assert_eq!(node.transform_flags(), TransformFlags::MATRIX);
        assert_eq!(node.matrix(), Mat4::IDENTITY);
        assert!(node.has_animation());
        assert_eq!(animation.key_frames()[0].matrix().len(), 2);
        assert_eq!(instance.channels().len(), 1);
    }

    #[test]
    fn animation_indices() {
        let mut writer = TagWriter::default();
        writer.write_u32(node::ANIMATION_FLAGS, 0x05);
        writer.write_u32s(node::ANIMATION_POSITION_INDEX, &[0, 3, 6, 9]);
        writer.write_u32s(node::ANIMATION_ROTATION_INDEX, &[0, 4]);
        writer.end(scene::NODE);

        let (node, animation, _) = read(writer, 30.0).unwrap();

        assert_eq!(node.animation_flags(), 0x05);
        assert_eq!(node.animation_indices().position, vec![0, 3, 6, 9]);
        assert_eq!(node.animation_indices().num_frames(), 4);
        assert_eq!(animation.num_frames(), 4);
    }

    #[test]
    fn missing_end_tag() {
        let mut writer = TagWriter::default();
        writer.write_str(node::NAME, "Hip");

        assert!(matches!(
            read(writer, 30.0),
            Err(Error::Truncated { context: "node" })
        ));
    }
}
