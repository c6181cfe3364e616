use crate::context::{GraphicsContext, VertexLayout, check_gl_error};
use crate::error::ShaderError;
use crate::shader;
use glam::{Mat4, Vec3};
use helloar_assets::ShaderSources;
use std::fmt;

/// Float components per vertex position.
pub const COORDS_PER_VERTEX: usize = 3;

/// Triangle vertices in counter-clockwise order: top, bottom left, bottom right.
#[rustfmt::skip]
pub const TRIANGLE_COORDS: [f32; 9] = [
     0.0,  0.622008459, 0.0,
    -0.5, -0.311004243, 0.0,
     0.5, -0.311004243, 0.0,
];

pub const VERTEX_COUNT: u32 = (TRIANGLE_COORDS.len() / COORDS_PER_VERTEX) as u32;

/// RGBA color applied uniformly across the mesh.
pub const TRIANGLE_COLOR: [f32; 4] = [0.63671875, 0.76953125, 0.22265625, 1.0];

pub const POSITION_ATTRIBUTE: &str = "vPosition";
pub const COLOR_UNIFORM: &str = "vColor";
pub const MVP_UNIFORM: &str = "uMVPMatrix";

/// Model, model-view and model-view-projection matrices.
///
/// `model` persists until replaced; the other two are recomputed by every
/// draw from the camera matrices of that frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub model: Mat4,
    pub model_view: Mat4,
    pub model_view_projection: Mat4,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
            model_view_projection: Mat4::IDENTITY,
        }
    }
}

/// Shader input locations resolved once after linking.
///
/// A location is `None` when the linked program has no active input of that
/// name; drivers drop unused inputs, so this is not an error. Calls that
/// would target a missing input are skipped.
#[derive(Debug, Clone)]
pub struct Bindings<U> {
    pub position: Option<u32>,
    pub color: Option<U>,
    pub mvp: Option<U>,
}

/// Renders one flat-colored triangle with a caller-driven transform.
///
/// Only obtainable from [`TriangleRenderer::create_on_gl_thread`], so a
/// renderer always holds a linked program and an uploaded vertex buffer.
/// All methods must run on the thread that owns the graphics context.
pub struct TriangleRenderer<C: GraphicsContext> {
    program: C::Program,
    bindings: Bindings<C::UniformLocation>,
    vertex_buffer: C::Buffer,
    transforms: TransformState,
}

impl<C: GraphicsContext> fmt::Debug for TriangleRenderer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriangleRenderer")
            .field("program", &self.program)
            .field("bindings", &self.bindings)
            .field("vertex_buffer", &self.vertex_buffer)
            .field("transforms", &self.transforms)
            .finish()
    }
}

impl<C: GraphicsContext> TriangleRenderer<C> {
    /// Compile and link the program, resolve its bindings and upload the mesh.
    ///
    /// The model matrix starts as identity. On error every object created
    /// along the way has been released.
    pub fn create_on_gl_thread(ctx: &mut C, sources: &ShaderSources) -> Result<Self, ShaderError> {
        let _span = tracing::info_span!("triangle_renderer_init").entered();

        let program = shader::create_program(ctx, sources)?;
        check_gl_error(ctx, "Program creation");

        let bindings = resolve_bindings(ctx, program);
        check_gl_error(ctx, "Program parameters");

        let vertex_buffer = match ctx.create_vertex_buffer(bytemuck::cast_slice(&TRIANGLE_COORDS[..]))
        {
            Ok(buffer) => buffer,
            Err(reason) => {
                tracing::error!(%reason, "vertex buffer allocation failed");
                ctx.delete_program(program);
                return Err(ShaderError::Allocation {
                    object: "vertex buffer",
                    reason,
                });
            }
        };

        tracing::debug!(?program, ?vertex_buffer, "triangle renderer ready");
        Ok(Self {
            program,
            bindings,
            vertex_buffer,
            transforms: TransformState::default(),
        })
    }

    /// Replace the model matrix with `model_matrix × diag(s, s, s, 1)`.
    ///
    /// `scale_factor` is not validated; zero collapses the mesh and negative
    /// values mirror it.
    pub fn update_model_matrix(&mut self, model_matrix: &Mat4, scale_factor: f32) {
        let scale = Mat4::from_scale(Vec3::splat(scale_factor));
        self.transforms.model = *model_matrix * scale;
    }

    /// Draw the triangle for one frame.
    ///
    /// Pending graphics errors are logged before and after the draw and do
    /// not interrupt it.
    pub fn draw(&mut self, ctx: &mut C, camera_view: &Mat4, projection: &Mat4) {
        check_gl_error(ctx, "Before draw");

        let position = self.bindings.position;
        ctx.use_program(self.program);
        if let Some(index) = position {
            ctx.enable_vertex_attrib_array(index);
        }

        let transforms = &mut self.transforms;
        transforms.model_view = *camera_view * transforms.model;
        transforms.model_view_projection = *projection * transforms.model_view;
        if let Some(mvp) = &self.bindings.mvp {
            ctx.uniform_matrix4(mvp, &transforms.model_view_projection.to_cols_array());
        }

        if let Some(index) = position {
            ctx.vertex_attrib_pointer(
                self.vertex_buffer,
                index,
                VertexLayout::packed_f32(COORDS_PER_VERTEX as i32),
            );
        }
        if let Some(color) = &self.bindings.color {
            ctx.uniform_vec4(color, &TRIANGLE_COLOR);
        }

        ctx.draw_triangles(0, VERTEX_COUNT);
        if let Some(index) = position {
            ctx.disable_vertex_attrib_array(index);
        }

        check_gl_error(ctx, "Draw");
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.transforms.model
    }

    /// Transforms as of the most recent draw.
    pub fn transforms(&self) -> &TransformState {
        &self.transforms
    }

    pub fn bindings(&self) -> &Bindings<C::UniformLocation> {
        &self.bindings
    }

    pub fn program(&self) -> C::Program {
        self.program
    }

    pub fn vertex_buffer(&self) -> C::Buffer {
        self.vertex_buffer
    }

    pub fn vertex_data(&self) -> &'static [f32; 9] {
        &TRIANGLE_COORDS
    }

    pub fn color(&self) -> [f32; 4] {
        TRIANGLE_COLOR
    }
}

fn resolve_bindings<C: GraphicsContext>(
    ctx: &mut C,
    program: C::Program,
) -> Bindings<C::UniformLocation> {
    let position = ctx.attrib_location(program, POSITION_ATTRIBUTE);
    if position.is_none() {
        tracing::warn!(name = POSITION_ATTRIBUTE, "no active attribute in linked program");
    }
    let mut uniform = |name: &'static str| {
        let location = ctx.uniform_location(program, name);
        if location.is_none() {
            tracing::warn!(name, "no active uniform in linked program");
        }
        location
    };
    let color = uniform(COLOR_UNIFORM);
    let mvp = uniform(MVP_UNIFORM);
    Bindings {
        position,
        color,
        mvp,
    }
}
