//! Shader asset loading for the triangle renderer.
//!
//! Shader sources are addressed by asset name (for example
//! `triangle_vertex.glsl`). The renderer never reads files itself; it consumes
//! a [`ShaderSources`] pair produced here.
//!
//! # Layout
//! Builtin sources are embedded from `shaders/`. A [`DirShaderAssets`] resolves
//! names relative to a root directory so hosts can ship their own variants.

use helloar_common::ShaderStage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Asset name of the builtin vertex stage.
pub const TRIANGLE_VERTEX: &str = "triangle_vertex.glsl";
/// Asset name of the builtin fragment stage.
pub const TRIANGLE_FRAGMENT: &str = "triangle_fragment.glsl";

const TRIANGLE_VERTEX_SRC: &str = include_str!("../shaders/triangle_vertex.glsl");
const TRIANGLE_FRAGMENT_SRC: &str = include_str!("../shaders/triangle_fragment.glsl");

/// Errors from shader asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader asset not found: {0}")]
    NotFound(String),
    #[error("shader asset is empty: {0}")]
    Empty(String),
}

/// Source of named shader assets.
pub trait ShaderAssets {
    /// Load the GLSL source text of the named asset.
    fn load_shader(&self, name: &str) -> Result<String, AssetError>;
}

/// The shader sources compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinShaders;

impl ShaderAssets for BuiltinShaders {
    fn load_shader(&self, name: &str) -> Result<String, AssetError> {
        match name {
            TRIANGLE_VERTEX => Ok(TRIANGLE_VERTEX_SRC.to_owned()),
            TRIANGLE_FRAGMENT => Ok(TRIANGLE_FRAGMENT_SRC.to_owned()),
            other => Err(AssetError::NotFound(other.to_owned())),
        }
    }
}

/// Shader assets stored as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirShaderAssets {
    root: PathBuf,
}

impl DirShaderAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ShaderAssets for DirShaderAssets {
    fn load_shader(&self, name: &str) -> Result<String, AssetError> {
        let path = self.root.join(name);
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                tracing::debug!(path = %path.display(), bytes = source.len(), "loaded shader asset");
                Ok(source)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(name.to_owned()))
            }
            Err(source) => Err(AssetError::Io { path, source }),
        }
    }
}

/// Asset names of the two stages of a shader program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderNames {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderNames {
    fn default() -> Self {
        Self {
            vertex: TRIANGLE_VERTEX.into(),
            fragment: TRIANGLE_FRAGMENT.into(),
        }
    }
}

impl ShaderNames {
    pub fn name(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

/// GLSL source text for both stages of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// The embedded triangle shaders.
    pub fn builtin() -> Self {
        Self::new(TRIANGLE_VERTEX_SRC, TRIANGLE_FRAGMENT_SRC)
    }

    /// Load both stages from `assets`. Blank sources are rejected.
    pub fn load(assets: &dyn ShaderAssets, names: &ShaderNames) -> Result<Self, AssetError> {
        let load = |stage: ShaderStage| -> Result<String, AssetError> {
            let name = names.name(stage);
            let source = assets.load_shader(name)?;
            if source.trim().is_empty() {
                return Err(AssetError::Empty(name.to_owned()));
            }
            Ok(source)
        };
        Ok(Self {
            vertex: load(ShaderStage::Vertex)?,
            fragment: load(ShaderStage::Fragment)?,
        })
    }

    pub fn source(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

pub fn crate_info() -> &'static str {
    "helloar-assets v0.1.0"
}
