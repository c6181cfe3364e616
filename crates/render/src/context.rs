use crate::error::{GlError, ShaderError};
use helloar_common::ShaderStage;
use serde::Serialize;
use std::fmt;

/// Upper bound on error polls per check. A lost context can keep reporting
/// errors, so draining stops here.
pub const MAX_ERROR_POLLS: usize = 16;

/// How a vertex attribute reads from a bound buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VertexLayout {
    /// Float components per vertex.
    pub components: i32,
    /// Byte distance between consecutive vertices.
    pub stride: i32,
    /// Byte offset of the first vertex.
    pub offset: i32,
    pub normalized: bool,
}

impl VertexLayout {
    /// Tightly packed `f32` components starting at the beginning of the buffer.
    pub const fn packed_f32(components: i32) -> Self {
        Self {
            components,
            stride: components * std::mem::size_of::<f32>() as i32,
            offset: 0,
            normalized: false,
        }
    }
}

/// The graphics primitives the renderer needs from the host context.
///
/// Implementations wrap a context that is current on the calling thread.
/// Handles are only meaningful to the context that produced them.
pub trait GraphicsContext {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + fmt::Debug;
    type Buffer: Copy + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    /// Compile one stage. On failure the shader object is already released
    /// and the error carries the compiler's info log.
    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, ShaderError>;

    fn delete_shader(&mut self, shader: Self::Shader);

    /// Attach both stages to a new program and link it. On failure the
    /// program object is already released.
    fn link_program(
        &mut self,
        vertex: Self::Shader,
        fragment: Self::Shader,
    ) -> Result<Self::Program, ShaderError>;

    fn delete_program(&mut self, program: Self::Program);

    fn attrib_location(&mut self, program: Self::Program, name: &str) -> Option<u32>;

    fn uniform_location(
        &mut self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    /// Upload static vertex data. Bytes are in native order.
    fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<Self::Buffer, String>;

    fn use_program(&mut self, program: Self::Program);

    fn enable_vertex_attrib_array(&mut self, index: u32);

    fn disable_vertex_attrib_array(&mut self, index: u32);

    fn vertex_attrib_pointer(&mut self, buffer: Self::Buffer, index: u32, layout: VertexLayout);

    /// Upload a column-major 4x4 matrix, not transposed.
    fn uniform_matrix4(&mut self, location: &Self::UniformLocation, columns: &[f32; 16]);

    fn uniform_vec4(&mut self, location: &Self::UniformLocation, value: &[f32; 4]);

    fn draw_triangles(&mut self, first: u32, count: u32);

    /// Pop the next pending error, `None` once the queue is clear.
    fn poll_error(&mut self) -> Option<GlError>;
}

/// Drain and log pending graphics errors, labelled with what was being done.
///
/// Errors are reported, never raised: callers carry on regardless.
pub fn check_gl_error<C: GraphicsContext + ?Sized>(ctx: &mut C, label: &str) -> Vec<GlError> {
    let mut errors = Vec::new();
    while errors.len() < MAX_ERROR_POLLS {
        let Some(error) = ctx.poll_error() else {
            break;
        };
        tracing::error!(label, %error, "graphics API error");
        errors.push(error);
    }
    errors
}
