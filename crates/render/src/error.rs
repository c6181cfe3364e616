use helloar_common::ShaderStage;
use std::fmt;

/// Errors that prevent a shader program from being installed.
///
/// Every variant is fatal to renderer initialization. Whatever GPU objects
/// were created before the failure are released before it is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to link shader program: {log}")]
    Link { log: String },
    #[error("failed to create {object}: {reason}")]
    Allocation {
        object: &'static str,
        reason: String,
    },
}

/// A graphics API error code reported by the context's error queue.
///
/// These are diagnostic only: they are logged where they are observed and
/// never interrupt rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct GlError(pub u32);

impl GlError {
    pub const INVALID_ENUM: GlError = GlError(0x0500);
    pub const INVALID_VALUE: GlError = GlError(0x0501);
    pub const INVALID_OPERATION: GlError = GlError(0x0502);
    pub const OUT_OF_MEMORY: GlError = GlError(0x0505);
    pub const INVALID_FRAMEBUFFER_OPERATION: GlError = GlError(0x0506);
    pub const CONTEXT_LOST: GlError = GlError(0x0507);

    /// Symbolic GL name of the code, if it is a known one.
    pub fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0x0500 => "GL_INVALID_ENUM",
            0x0501 => "GL_INVALID_VALUE",
            0x0502 => "GL_INVALID_OPERATION",
            0x0503 => "GL_STACK_OVERFLOW",
            0x0504 => "GL_STACK_UNDERFLOW",
            0x0505 => "GL_OUT_OF_MEMORY",
            0x0506 => "GL_INVALID_FRAMEBUFFER_OPERATION",
            0x0507 => "GL_CONTEXT_LOST",
            _ => return None,
        })
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} (0x{:04X})", self.0),
            None => write!(f, "unknown GL error 0x{:04X}", self.0),
        }
    }
}

impl std::error::Error for GlError {}
