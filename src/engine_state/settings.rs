//! # Graphics Settings
//!
//! The flat key-value configuration blob persisted outside the core. The
//! engine only consumes the resolved enum values; everything here is a thin
//! collaborator interface around a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use super::rendering::lighting::LightingQuality;

/// Anti-aliasing options.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntiAliasing {
    /// No anti-aliasing.
    None,
    /// Fast approximate anti-aliasing.
    Fxaa,
    /// Multisample anti-aliasing.
    Msaa,
}

/// Which renderer presents the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// The 2D isometric presenter.
    #[serde(rename = "2d")]
    TwoD,
    /// The 3D scene renderer.
    #[serde(rename = "3d")]
    ThreeD,
}

/// Maps settings tag strings to lighting qualities, for tolerant parsing of
/// hand-edited blobs.
pub static LIGHTING_QUALITY_TAGS: phf::Map<&'static str, LightingQuality> = phf::phf_map! {
    "low" => LightingQuality::Low,
    "medium" => LightingQuality::Medium,
    "high" => LightingQuality::High,
    "ultra" => LightingQuality::Ultra,
};

/// The recognized graphics options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphicsSettings {
    /// Output resolution as `"WxH"`.
    pub resolution: String,
    /// Lighting quality preset.
    pub lighting_quality: LightingQuality,
    /// Anti-aliasing mode.
    pub anti_aliasing: AntiAliasing,
    /// Texture quality tag.
    pub texture_quality: String,
    /// Particle effects tag.
    pub particle_effects: String,
    /// View distance in blocks.
    pub view_distance: u32,
    /// Whether shadows render.
    pub shadows: bool,
    /// Whether reflections render.
    pub reflections: bool,
    /// Whether motion blur applies.
    pub motion_blur: bool,
    /// Whether presentation waits for vertical sync.
    pub v_sync: bool,
    /// Which renderer presents the world.
    pub render_mode: RenderMode,
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            resolution: "1920x1080".to_string(),
            lighting_quality: LightingQuality::High,
            anti_aliasing: AntiAliasing::Fxaa,
            texture_quality: "high".to_string(),
            particle_effects: "medium".to_string(),
            view_distance: 8,
            shadows: true,
            reflections: false,
            motion_blur: false,
            v_sync: true,
            render_mode: RenderMode::TwoD,
        }
    }
}

impl GraphicsSettings {
    /// Parses the `"WxH"` resolution string.
    ///
    /// # Returns
    /// The (width, height) pair, or `None` if the string is malformed.
    pub fn parse_resolution(&self) -> Option<(u32, u32)> {
        let (width, height) = self.resolution.split_once('x')?;
        Some((width.parse().ok()?, height.parse().ok()?))
    }
}

/// File-backed store for the settings blob.
///
/// Load failures fall back to defaults with a warning; the session never
/// refuses to start over a bad settings file.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store reading and writing the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads the settings blob, or defaults when missing or malformed.
    pub fn load(&self) -> GraphicsSettings {
        match fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!("ignoring malformed settings file: {}", err);
                    GraphicsSettings::default()
                }
            },
            Err(_) => GraphicsSettings::default(),
        }
    }

    /// Persists the settings blob.
    pub fn save(&self, settings: &GraphicsSettings) -> std::io::Result<()> {
        let contents = serde_json::to_string_pretty(settings)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        fs::write(&self.path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_parses_and_rejects() {
        let mut settings = GraphicsSettings::default();
        assert_eq!(settings.parse_resolution(), Some((1920, 1080)));
        settings.resolution = "potato".to_string();
        assert_eq!(settings.parse_resolution(), None);
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = GraphicsSettings {
            render_mode: RenderMode::ThreeD,
            lighting_quality: LightingQuality::Ultra,
            ..GraphicsSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"renderMode\":\"3d\""));
        let back: GraphicsSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn quality_tags_resolve() {
        assert_eq!(
            LIGHTING_QUALITY_TAGS.get("ultra").copied(),
            Some(LightingQuality::Ultra)
        );
        assert!(LIGHTING_QUALITY_TAGS.get("extreme").is_none());
    }
}
