//! Light rig description shared by the scene and the renderer

use nalgebra::Vector3;

use crate::Rgb;

/// Uniform light reaching every surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

/// Light arriving from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Vector3<f32>,
    pub casts_shadow: bool,
    /// Shadow map edge length in texels; ignored unless `casts_shadow`
    pub shadow_map_size: u32,
}

impl DirectionalLight {
    pub fn new(color: Rgb, intensity: f32, position: Vector3<f32>) -> Self {
        Self {
            color,
            intensity,
            position,
            casts_shadow: false,
            shadow_map_size: 0,
        }
    }

    pub fn with_shadow(mut self, map_size: u32) -> Self {
        self.casts_shadow = true;
        self.shadow_map_size = map_size;
        self
    }

    /// Unit vector pointing from the surface towards the light
    pub fn direction(&self) -> Vector3<f32> {
        self.position.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y)
    }
}

/// Ambient term plus three directional lights (key, fill, rim)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
    pub rim: DirectionalLight,
}

impl LightRig {
    pub fn directional(&self) -> [&DirectionalLight; 3] {
        [&self.key, &self.fill, &self.rim]
    }

    /// The first light that casts shadows, if any
    pub fn shadow_caster(&self) -> Option<&DirectionalLight> {
        self.directional().into_iter().find(|l| l.casts_shadow)
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Rgb::WHITE,
                intensity: 0.6,
            },
            key: DirectionalLight::new(Rgb::WHITE, 0.8, Vector3::new(5.0, 10.0, 7.0)).with_shadow(2048),
            fill: DirectionalLight::new(Rgb::WHITE, 0.4, Vector3::new(-5.0, 5.0, -5.0)),
            rim: DirectionalLight::new(Rgb::WHITE, 0.3, Vector3::new(0.0, 3.0, -10.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rig_has_one_shadow_caster() {
        let rig = LightRig::default();
        let casters = rig.directional().iter().filter(|l| l.casts_shadow).count();
        assert_eq!(casters, 1);
        assert_eq!(rig.shadow_caster().unwrap().shadow_map_size, 2048);
        assert_eq!(rig.ambient.intensity, 0.6);
    }

    #[test]
    fn test_direction_is_normalized() {
        let d = LightRig::default().rim.direction();
        assert!((d.norm() - 1.0).abs() < 1e-6);
    }
}
