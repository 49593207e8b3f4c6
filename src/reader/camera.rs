use {
    super::tag::{Tag, camera, scene},
    crate::{NodeId, camera::{Camera, CameraFov}, error::Error},
    log::trace,
    std::io::{Read, Seek},
};

pub(super) fn read_camera<R>(reader: &mut R, camera: &mut Camera, fps: f32) -> Result<(), Error>
where
    R: Read + Seek,
{
    while let Some(tag) = Tag::read(reader)? {
        if tag.is_end_of(scene::CAMERA) {
            trace!("Read camera ({} fov key(s))", camera.fovs.len());

            return Ok(());
        }

        match tag.identifier {
            camera::TARGET_OBJECT_INDEX => camera.target = NodeId::from_raw(tag.read_i32(reader)?),
            camera::FOV => {
                // Animated values take precedence over the static one
                if camera.fovs.is_empty() {
                    let fov = tag.read_f32(reader)?;
                    camera.fovs.push(CameraFov { time: 0.0, fov });
                } else {
                    tag.skip(reader)?;
                }
            }
            camera::FAR_PLANE => camera.far = tag.read_f32(reader)?,
            camera::NEAR_PLANE => camera.near = tag.read_f32(reader)?,
            camera::FOV_ANIMATION => {
                let frame_duration = 1.0 / fps;

                camera.fovs = tag
                    .read_f32s(reader)?
                    .into_iter()
                    .enumerate()
                    .map(|(frame, fov)| CameraFov {
                        time: frame as f32 * frame_duration,
                        fov,
                    })
                    .collect();
            }
            _ => tag.skip(reader)?,
        }
    }

    Err(Error::Truncated { context: "camera" })
}
