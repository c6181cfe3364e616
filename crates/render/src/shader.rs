use crate::context::GraphicsContext;
use crate::error::ShaderError;
use helloar_assets::ShaderSources;
use helloar_common::ShaderStage;

/// Compile both stages and link them into a program.
///
/// Stage objects are released once linking has been attempted; on any
/// failure nothing created here outlives the call.
pub fn create_program<C: GraphicsContext + ?Sized>(
    ctx: &mut C,
    sources: &ShaderSources,
) -> Result<C::Program, ShaderError> {
    let vertex = compile_stage(ctx, ShaderStage::Vertex, &sources.vertex)?;
    let fragment = match compile_stage(ctx, ShaderStage::Fragment, &sources.fragment) {
        Ok(shader) => shader,
        Err(e) => {
            ctx.delete_shader(vertex);
            return Err(e);
        }
    };

    let linked = ctx.link_program(vertex, fragment);
    ctx.delete_shader(vertex);
    ctx.delete_shader(fragment);

    match linked {
        Ok(program) => {
            tracing::debug!(?program, "linked shader program");
            Ok(program)
        }
        Err(e) => {
            tracing::error!(error = %e, "could not create shader program");
            Err(e)
        }
    }
}

fn compile_stage<C: GraphicsContext + ?Sized>(
    ctx: &mut C,
    stage: ShaderStage,
    source: &str,
) -> Result<C::Shader, ShaderError> {
    match ctx.compile_shader(stage, source) {
        Ok(shader) => {
            tracing::debug!(%stage, ?shader, "compiled shader");
            Ok(shader)
        }
        Err(e) => {
            tracing::error!(%stage, error = %e, "error compiling shader");
            Err(e)
        }
    }
}
