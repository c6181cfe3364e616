use glow::HasContext;
use helloar_common::ShaderStage;
use helloar_render::{GlError, GraphicsContext, ShaderError, VertexLayout};
use std::marker::PhantomData;
use std::sync::Arc;

type Gl = glow::Context;

/// A live GLES context driven through glow.
pub struct GlowContext {
    gl: Arc<Gl>,
    _thread_bound: PhantomData<*const ()>,
}

impl GlowContext {
    /// Wrap a glow context.
    ///
    /// # Safety
    /// `gl` must be current on the calling thread for the whole lifetime of
    /// the returned value, and every method must be called on that thread.
    pub unsafe fn new(gl: Arc<Gl>) -> Self {
        Self {
            gl,
            _thread_bound: PhantomData,
        }
    }

    pub fn gl(&self) -> &Gl {
        &self.gl
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn error_from_code(code: u32) -> Option<GlError> {
    (code != glow::NO_ERROR).then_some(GlError(code))
}

// SAFETY (all blocks below): `GlowContext::new` requires the context to be
// current on this thread, and handles passed in were produced by this context.
impl GraphicsContext for GlowContext {
    type Shader = <Gl as HasContext>::Shader;
    type Program = <Gl as HasContext>::Program;
    type Buffer = <Gl as HasContext>::Buffer;
    type UniformLocation = <Gl as HasContext>::UniformLocation;

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, ShaderError> {
        let gl = &*self.gl;
        unsafe {
            let shader = gl
                .create_shader(stage_enum(stage))
                .map_err(|reason| ShaderError::Allocation {
                    object: "shader",
                    reason,
                })?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if gl.get_shader_compile_status(shader) {
                Ok(shader)
            } else {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                Err(ShaderError::Compile { stage, log })
            }
        }
    }

    fn delete_shader(&mut self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn link_program(
        &mut self,
        vertex: Self::Shader,
        fragment: Self::Shader,
    ) -> Result<Self::Program, ShaderError> {
        let gl = &*self.gl;
        unsafe {
            let program = gl
                .create_program()
                .map_err(|reason| ShaderError::Allocation {
                    object: "program",
                    reason,
                })?;
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);

            if gl.get_program_link_status(program) {
                // Detached stages are freed as soon as the caller deletes them.
                gl.detach_shader(program, vertex);
                gl.detach_shader(program, fragment);
                Ok(program)
            } else {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                Err(ShaderError::Link { log })
            }
        }
    }

    fn delete_program(&mut self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn attrib_location(&mut self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(
        &mut self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<Self::Buffer, String> {
        let gl = &*self.gl;
        unsafe {
            let buffer = gl.create_buffer()?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            tracing::debug!(?buffer, bytes = data.len(), "uploaded vertex buffer");
            Ok(buffer)
        }
    }

    fn use_program(&mut self, program: Self::Program) {
        unsafe { self.gl.use_program(Some(program)) }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer(&mut self, buffer: Self::Buffer, index: u32, layout: VertexLayout) {
        let gl = &*self.gl;
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.vertex_attrib_pointer_f32(
                index,
                layout.components,
                glow::FLOAT,
                layout.normalized,
                layout.stride,
                layout.offset,
            );
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn uniform_matrix4(&mut self, location: &Self::UniformLocation, columns: &[f32; 16]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), false, columns)
        }
    }

    fn uniform_vec4(&mut self, location: &Self::UniformLocation, value: &[f32; 4]) {
        unsafe { self.gl.uniform_4_f32_slice(Some(location), value) }
    }

    fn draw_triangles(&mut self, first: u32, count: u32) {
        unsafe {
            self.gl
                .draw_arrays(glow::TRIANGLES, first as i32, count as i32)
        }
    }

    fn poll_error(&mut self) -> Option<GlError> {
        error_from_code(unsafe { self.gl.get_error() })
    }
}
