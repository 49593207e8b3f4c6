use {
    super::NodeId,
    serde::{Deserialize, Serialize},
};

/// A field-of-view keyframe.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CameraFov {
    /// Seconds from the start of the animation.
    pub time: f32,

    /// Vertical field of view, in radians.
    pub fov: f32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Camera {
    pub(crate) far: f32,
    pub(crate) fovs: Vec<CameraFov>,
    pub(crate) near: f32,
    pub(crate) target: Option<NodeId>,
}

impl Camera {
    pub fn far(&self) -> f32 {
        self.far
    }

    /// The field of view at the given time, holding the nearest earlier keyframe.
    pub fn fov(&self, time: f32) -> Option<f32> {
        self.fovs
            .iter()
            .take_while(|fov| fov.time <= time)
            .last()
            .or_else(|| self.fovs.first())
            .map(|fov| fov.fov)
    }

    pub fn fovs(&self) -> &[CameraFov] {
        &self.fovs
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    /// The node this camera looks at.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, CameraFov};

    #[test]
    fn fov_holds_previous_frame() {
        let camera = Camera {
            fovs: vec![
                CameraFov { time: 0.0, fov: 0.5 },
                CameraFov { time: 1.0, fov: 0.75 },
            ],
            ..Default::default()
        };

        assert_eq!(camera.fov(-1.0), Some(0.5));
        assert_eq!(camera.fov(0.5), Some(0.5));
        assert_eq!(camera.fov(2.0), Some(0.75));
        assert_eq!(Camera::default().fov(0.0), None);
    }
}
