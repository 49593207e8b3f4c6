use {
    super::NodeId,
    glam::Vec3,
    serde::{Deserialize, Serialize},
};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum LightType {
    #[default]
    Point,
    Directional,
    Spot,
}

impl LightType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Point,
            1 => Self::Directional,
            2 => Self::Spot,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Light {
    pub(crate) color: Vec3,
    pub(crate) constant_attenuation: f32,
    pub(crate) falloff_angle: f32,
    pub(crate) falloff_exponent: f32,
    pub(crate) kind: LightType,
    pub(crate) linear_attenuation: f32,
    pub(crate) quadratic_attenuation: f32,
    pub(crate) spot_target: Option<NodeId>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            constant_attenuation: 1.0,
            falloff_angle: std::f32::consts::PI,
            falloff_exponent: 0.0,
            kind: LightType::Point,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            spot_target: None,
        }
    }
}

impl Light {
    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn constant_attenuation(&self) -> f32 {
        self.constant_attenuation
    }

    pub fn falloff_angle(&self) -> f32 {
        self.falloff_angle
    }

    pub fn falloff_exponent(&self) -> f32 {
        self.falloff_exponent
    }

    pub fn kind(&self) -> LightType {
        self.kind
    }

    pub fn linear_attenuation(&self) -> f32 {
        self.linear_attenuation
    }

    pub fn quadratic_attenuation(&self) -> f32 {
        self.quadratic_attenuation
    }

    /// The node a spot or directional light points at.
    pub fn spot_target(&self) -> Option<NodeId> {
        self.spot_target
    }
}
