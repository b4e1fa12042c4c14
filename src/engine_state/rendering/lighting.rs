//! Lighting rig and quality presets for the 3D scene.
//!
//! The rig is one ambient light plus one directional (shadow-casting)
//! light. Quality presets map deterministically to intensity/shadow tuples
//! through a fixed lookup table — nothing here is computed.

use cgmath::{InnerSpace, Vector3};
use serde::{Deserialize, Serialize};

/// The lighting quality presets selectable from the graphics settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingQuality {
    /// Flat lighting, shadows off.
    Low,
    /// Balanced lighting, 1024px shadow map.
    Medium,
    /// Default lighting, 2048px shadow map.
    High,
    /// Maximum lighting, 4096px shadow map.
    Ultra,
}

/// The tuple a quality preset resolves to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightingPreset {
    /// Ambient light intensity.
    pub ambient_intensity: f32,
    /// Directional light intensity.
    pub directional_intensity: f32,
    /// Shadow map resolution in pixels per side.
    pub shadow_map_size: u32,
    /// Whether the shadow pass runs at all.
    pub shadows_enabled: bool,
}

impl LightingQuality {
    /// Resolves the preset tuple for this quality level.
    pub fn preset(&self) -> LightingPreset {
        match self {
            LightingQuality::Low => LightingPreset {
                ambient_intensity: 0.6,
                directional_intensity: 0.4,
                shadow_map_size: 512,
                shadows_enabled: false,
            },
            LightingQuality::Medium => LightingPreset {
                ambient_intensity: 0.4,
                directional_intensity: 0.6,
                shadow_map_size: 1024,
                shadows_enabled: true,
            },
            LightingQuality::High => LightingPreset {
                ambient_intensity: 0.4,
                directional_intensity: 0.8,
                shadow_map_size: 2048,
                shadows_enabled: true,
            },
            LightingQuality::Ultra => LightingPreset {
                ambient_intensity: 0.3,
                directional_intensity: 1.0,
                shadow_map_size: 4096,
                shadows_enabled: true,
            },
        }
    }
}

/// The scene's light rig: one ambient term and one directional light.
#[derive(Clone, Debug)]
pub struct LightingRig {
    /// The active quality preset.
    pub quality: LightingQuality,
    /// World-space position of the directional light.
    pub directional_position: Vector3<f32>,
}

impl LightingRig {
    /// Creates the rig with the default quality and the light parked at its
    /// fixed position above the scene.
    pub fn new(quality: LightingQuality) -> Self {
        Self {
            quality,
            directional_position: Vector3::new(10.0, 10.0, 5.0),
        }
    }

    /// Switches the active quality preset.
    pub fn set_quality(&mut self, quality: LightingQuality) {
        self.quality = quality;
    }

    /// The resolved preset tuple for the current quality.
    pub fn preset(&self) -> LightingPreset {
        self.quality.preset()
    }

    /// The normalized direction the light shines in (toward the origin).
    pub fn direction(&self) -> Vector3<f32> {
        (-self.directional_position).normalize()
    }
}

/// GPU-friendly representation of the light rig for shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Light direction (xyz) and ambient intensity (w).
    direction_ambient: [f32; 4],
    /// Directional intensity (x), shadows enabled flag (y), padding.
    params: [f32; 4],
    /// Light-space view-projection matrix for shadow lookups.
    light_view_proj: [[f32; 4]; 4],
}

impl LightUniform {
    /// Packs the rig state and light-space matrix into the uniform layout.
    pub fn from_rig(rig: &LightingRig, light_view_proj: [[f32; 4]; 4]) -> Self {
        let preset = rig.preset();
        let direction = rig.direction();
        Self {
            direction_ambient: [
                direction.x,
                direction.y,
                direction.z,
                preset.ambient_intensity,
            ],
            params: [
                preset.directional_intensity,
                if preset.shadows_enabled { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
            light_view_proj,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(LightingQuality::Low, 0.6, 0.4, 512, false)]
    #[test_case(LightingQuality::Medium, 0.4, 0.6, 1024, true)]
    #[test_case(LightingQuality::High, 0.4, 0.8, 2048, true)]
    #[test_case(LightingQuality::Ultra, 0.3, 1.0, 4096, true)]
    fn presets_resolve_to_fixed_tuples(
        quality: LightingQuality,
        ambient: f32,
        directional: f32,
        shadow_map: u32,
        shadows: bool,
    ) {
        let preset = quality.preset();
        assert_eq!(preset.ambient_intensity, ambient);
        assert_eq!(preset.directional_intensity, directional);
        assert_eq!(preset.shadow_map_size, shadow_map);
        assert_eq!(preset.shadows_enabled, shadows);
    }
}
