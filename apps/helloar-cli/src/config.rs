use crate::camera::OrbitCamera;
use anyhow::Context;
use helloar_assets::ShaderNames;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trace settings, read from YAML. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub shaders: ShaderNames,
    /// Load shaders from this directory instead of the builtin sources.
    pub shader_dir: Option<PathBuf>,
    pub frames: u32,
    /// Uniform model scale passed with each pose update.
    pub scale: f32,
    pub camera: OrbitCamera,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            shaders: ShaderNames::default(),
            shader_dir: None,
            frames: 3,
            scale: 1.0,
            camera: OrbitCamera::default(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
