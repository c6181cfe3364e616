//! Single-triangle renderer for the AR sample.
//!
//! # Invariants
//! - The renderer never owns or drives the graphics context; every call
//!   borrows it from the host render loop.
//! - Camera view and projection come from the AR framework each frame. Only
//!   the model matrix persists between frames.
//! - Graphics API errors are logged, never raised. Shader failures are the
//!   only fatal errors and only during initialization.
//!
//! # Backends
//! [`GraphicsContext`] is the seam to the host. [`RecordingContext`] records
//! calls in memory for tests and traces; the `helloar-render-glow` crate
//! drives a live GLES context.

mod context;
mod error;
mod recording;
mod renderer;
mod shader;

pub use context::{GraphicsContext, MAX_ERROR_POLLS, VertexLayout, check_gl_error};
pub use error::{GlError, ShaderError};
pub use recording::{GlCommand, RecordingContext};
pub use renderer::{
    Bindings, COLOR_UNIFORM, COORDS_PER_VERTEX, MVP_UNIFORM, POSITION_ATTRIBUTE, TRIANGLE_COLOR,
    TRIANGLE_COORDS, TransformState, TriangleRenderer, VERTEX_COUNT,
};
pub use shader::create_program;

pub fn crate_info() -> &'static str {
    "helloar-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
