//! In-memory graphics context that records every call.
//!
//! Stands in for a live GLES context in tests and in the CLI trace. It keeps
//! enough state to answer the queries the renderer makes (compile status,
//! binding locations, buffer contents) and can be told to fail.

use crate::context::{GraphicsContext, VertexLayout};
use crate::error::{GlError, ShaderError};
use helloar_common::ShaderStage;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// One recorded graphics call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GlCommand {
    CompileShader {
        shader: u32,
        stage: ShaderStage,
    },
    DeleteShader {
        shader: u32,
    },
    LinkProgram {
        program: u32,
        vertex: u32,
        fragment: u32,
    },
    DeleteProgram {
        program: u32,
    },
    GetAttribLocation {
        program: u32,
        name: String,
        location: Option<u32>,
    },
    GetUniformLocation {
        program: u32,
        name: String,
        location: Option<i32>,
    },
    BufferData {
        buffer: u32,
        bytes: usize,
    },
    UseProgram {
        program: u32,
    },
    EnableVertexAttribArray {
        index: u32,
    },
    DisableVertexAttribArray {
        index: u32,
    },
    VertexAttribPointer {
        buffer: u32,
        index: u32,
        layout: VertexLayout,
    },
    UniformMatrix4 {
        location: i32,
        columns: [f32; 16],
    },
    UniformVec4 {
        location: i32,
        value: [f32; 4],
    },
    DrawTriangles {
        first: u32,
        count: u32,
    },
}

#[derive(Debug, Clone)]
struct CompiledShader {
    stage: ShaderStage,
    source: String,
}

#[derive(Debug, Clone, Default)]
struct LinkedProgram {
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

/// A [`GraphicsContext`] that records calls instead of issuing them.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<GlCommand>,
    last_name: u32,
    shaders: BTreeMap<u32, CompiledShader>,
    programs: BTreeMap<u32, LinkedProgram>,
    buffers: BTreeMap<u32, Vec<u8>>,
    pending_errors: VecDeque<GlError>,
    failing_stages: Vec<ShaderStage>,
    link_failure: Option<String>,
    program_failure: Option<String>,
    buffer_failure: Option<String>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later compile of `stage` fail.
    pub fn fail_compile(&mut self, stage: ShaderStage) {
        self.failing_stages.push(stage);
    }

    /// Make every later link fail with the given info log.
    pub fn fail_link(&mut self, log: impl Into<String>) {
        self.link_failure = Some(log.into());
    }

    /// Make every later program object allocation fail with `reason`.
    pub fn fail_program(&mut self, reason: impl Into<String>) {
        self.program_failure = Some(reason.into());
    }

    /// Make every later vertex buffer allocation fail with `reason`.
    pub fn fail_buffer(&mut self, reason: impl Into<String>) {
        self.buffer_failure = Some(reason.into());
    }

    /// Queue an error for [`GraphicsContext::poll_error`] to report.
    pub fn push_error(&mut self, error: GlError) {
        self.pending_errors.push_back(error);
    }

    pub fn commands(&self) -> &[GlCommand] {
        &self.commands
    }

    /// Return the recorded calls and start a fresh log.
    pub fn take_commands(&mut self) -> Vec<GlCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn buffer_data(&self, buffer: u32) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    pub fn live_shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    fn gen_name(&mut self) -> u32 {
        // GL object names start at 1; 0 is reserved.
        self.last_name += 1;
        self.last_name
    }

    fn record(&mut self, command: GlCommand) {
        tracing::trace!(?command, "gl");
        self.commands.push(command);
    }
}

/// `source` with `//` and `/* */` comments replaced by whitespace.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find('/') {
        let (before, tail) = rest.split_at(start);
        out.push_str(before);
        if let Some(line) = tail.strip_prefix("//") {
            rest = line.find('\n').map_or("", |end| &line[end..]);
        } else if let Some(block) = tail.strip_prefix("/*") {
            match block.find("*/") {
                Some(end) => {
                    out.push(' ');
                    rest = &block[end + 2..];
                }
                None => rest = "",
            }
        } else {
            out.push('/');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Names declared with `qualifier` in a GLSL source, in declaration order.
fn declared_names(source: &str, qualifiers: &[&str]) -> Vec<String> {
    strip_comments(source)
        .split(';')
        .filter_map(|statement| {
            let mut tokens = statement.split_whitespace();
            let qualifier = tokens.next()?;
            if !qualifiers.contains(&qualifier) {
                return None;
            }
            let name = tokens.last()?;
            Some(name.split('[').next().unwrap_or(name).to_owned())
        })
        .collect()
}

impl GraphicsContext for RecordingContext {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = i32;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<u32, ShaderError> {
        let shader = self.gen_name();
        self.record(GlCommand::CompileShader { shader, stage });

        let log = if self.failing_stages.contains(&stage) {
            Some(format!("ERROR: {stage} stage rejected"))
        } else if !source.contains("void main") {
            Some("ERROR: 0:1: no `void main()` entry point".to_owned())
        } else {
            None
        };

        if let Some(log) = log {
            self.record(GlCommand::DeleteShader { shader });
            return Err(ShaderError::Compile { stage, log });
        }

        self.shaders.insert(
            shader,
            CompiledShader {
                stage,
                source: source.to_owned(),
            },
        );
        Ok(shader)
    }

    fn delete_shader(&mut self, shader: u32) {
        self.record(GlCommand::DeleteShader { shader });
        self.shaders.remove(&shader);
    }

    fn link_program(&mut self, vertex: u32, fragment: u32) -> Result<u32, ShaderError> {
        if let Some(reason) = &self.program_failure {
            return Err(ShaderError::Allocation {
                object: "program",
                reason: reason.clone(),
            });
        }
        let program = self.gen_name();
        self.record(GlCommand::LinkProgram {
            program,
            vertex,
            fragment,
        });

        let stages = (self.shaders.get(&vertex), self.shaders.get(&fragment));
        let log = match stages {
            _ if self.link_failure.is_some() => self.link_failure.clone(),
            (Some(v), Some(f))
                if v.stage == ShaderStage::Vertex && f.stage == ShaderStage::Fragment =>
            {
                None
            }
            _ => Some("ERROR: program needs one vertex and one fragment shader".to_owned()),
        };
        if let Some(log) = log {
            self.record(GlCommand::DeleteProgram { program });
            return Err(ShaderError::Link { log });
        }

        let mut linked = LinkedProgram::default();
        for shader in [vertex, fragment] {
            let source = &self.shaders[&shader].source;
            linked.attributes.extend(declared_names(source, &["attribute"]));
            for name in declared_names(source, &["uniform"]) {
                if !linked.uniforms.contains(&name) {
                    linked.uniforms.push(name);
                }
            }
        }
        self.programs.insert(program, linked);
        Ok(program)
    }

    fn delete_program(&mut self, program: u32) {
        self.record(GlCommand::DeleteProgram { program });
        self.programs.remove(&program);
    }

    fn attrib_location(&mut self, program: u32, name: &str) -> Option<u32> {
        let location = self
            .programs
            .get(&program)
            .and_then(|p| p.attributes.iter().position(|a| a == name))
            .map(|i| i as u32);
        self.record(GlCommand::GetAttribLocation {
            program,
            name: name.to_owned(),
            location,
        });
        location
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
        let location = self
            .programs
            .get(&program)
            .and_then(|p| p.uniforms.iter().position(|u| u == name))
            .map(|i| i as i32);
        self.record(GlCommand::GetUniformLocation {
            program,
            name: name.to_owned(),
            location,
        });
        location
    }

    fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<u32, String> {
        if let Some(reason) = &self.buffer_failure {
            return Err(reason.clone());
        }
        let buffer = self.gen_name();
        self.buffers.insert(buffer, data.to_vec());
        self.record(GlCommand::BufferData {
            buffer,
            bytes: data.len(),
        });
        Ok(buffer)
    }

    fn use_program(&mut self, program: u32) {
        self.record(GlCommand::UseProgram { program });
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.record(GlCommand::EnableVertexAttribArray { index });
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.record(GlCommand::DisableVertexAttribArray { index });
    }

    fn vertex_attrib_pointer(&mut self, buffer: u32, index: u32, layout: VertexLayout) {
        self.record(GlCommand::VertexAttribPointer {
            buffer,
            index,
            layout,
        });
    }

    fn uniform_matrix4(&mut self, location: &i32, columns: &[f32; 16]) {
        self.record(GlCommand::UniformMatrix4 {
            location: *location,
            columns: *columns,
        });
    }

    fn uniform_vec4(&mut self, location: &i32, value: &[f32; 4]) {
        self.record(GlCommand::UniformVec4 {
            location: *location,
            value: *value,
        });
    }

    fn draw_triangles(&mut self, first: u32, count: u32) {
        self.record(GlCommand::DrawTriangles { first, count });
    }

    fn poll_error(&mut self) -> Option<GlError> {
        self.pending_errors.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = "uniform mat4 uMVP;\nattribute vec4 aPos;\nattribute vec2 aUv;\nvoid main() {}";
    const FRAG: &str = "precision mediump float;\nuniform vec4 uTint;\nuniform mat4 uMVP;\nvoid main() {}";

    fn linked(ctx: &mut RecordingContext) -> u32 {
        let v = ctx.compile_shader(ShaderStage::Vertex, VERT).unwrap();
        let f = ctx.compile_shader(ShaderStage::Fragment, FRAG).unwrap();
        ctx.link_program(v, f).unwrap()
    }

    #[test]
    fn comments_do_not_hide_declarations() {
        let source = "// model-view-projection\nuniform mat4 uMVPMatrix;\n// position\n\
                      attribute vec4 vPosition; /* per vertex */\n\
                      /* uniform vec4 unused; */\nvoid main() {}";
        assert_eq!(declared_names(source, &["attribute"]), vec!["vPosition"]);
        assert_eq!(declared_names(source, &["uniform"]), vec!["uMVPMatrix"]);
    }

    #[test]
    fn commented_shader_links_with_locations() {
        let mut ctx = RecordingContext::new();
        let vert = "// model-view-projection\nuniform mat4 uMVPMatrix;\n// position\n\
                    attribute vec4 vPosition;\nvoid main() { gl_Position = uMVPMatrix * vPosition; }";
        let v = ctx.compile_shader(ShaderStage::Vertex, vert).unwrap();
        let f = ctx.compile_shader(ShaderStage::Fragment, FRAG).unwrap();
        let program = ctx.link_program(v, f).unwrap();

        assert_eq!(ctx.attrib_location(program, "vPosition"), Some(0));
        assert_eq!(ctx.uniform_location(program, "uMVPMatrix"), Some(0));
    }

    #[test]
    fn strip_comments_keeps_division() {
        assert_eq!(strip_comments("a = b / c; // tail"), "a = b / c; ");
        assert_eq!(strip_comments("x/*y*/z"), "x z");
        assert_eq!(strip_comments("open /* never closed"), "open ");
    }

    #[test]
    fn injected_buffer_failure() {
        let mut ctx = RecordingContext::new();
        ctx.fail_buffer("out of memory");
        assert_eq!(ctx.create_vertex_buffer(&[0; 4]), Err("out of memory".to_owned()));
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn declared_names_by_qualifier() {
        assert_eq!(declared_names(VERT, &["attribute"]), vec!["aPos", "aUv"]);
        assert_eq!(declared_names(VERT, &["uniform"]), vec!["uMVP"]);
        assert_eq!(
            declared_names("uniform vec4 lights[4];", &["uniform"]),
            vec!["lights"]
        );
    }

    #[test]
    fn locations_follow_declaration_order() {
        let mut ctx = RecordingContext::new();
        let program = linked(&mut ctx);

        assert_eq!(ctx.attrib_location(program, "aPos"), Some(0));
        assert_eq!(ctx.attrib_location(program, "aUv"), Some(1));
        assert_eq!(ctx.uniform_location(program, "uMVP"), Some(0));
        assert_eq!(ctx.uniform_location(program, "uTint"), Some(1));
        assert_eq!(ctx.uniform_location(program, "missing"), None);
    }

    #[test]
    fn compile_rejects_source_without_entry_point() {
        let mut ctx = RecordingContext::new();
        let err = ctx
            .compile_shader(ShaderStage::Vertex, "attribute vec4 aPos;")
            .unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Vertex, .. }));
        assert_eq!(ctx.live_shader_count(), 0);
    }

    #[test]
    fn injected_compile_failure() {
        let mut ctx = RecordingContext::new();
        ctx.fail_compile(ShaderStage::Fragment);
        assert!(ctx.compile_shader(ShaderStage::Vertex, VERT).is_ok());
        assert!(ctx.compile_shader(ShaderStage::Fragment, FRAG).is_err());
    }

    #[test]
    fn link_rejects_swapped_stages() {
        let mut ctx = RecordingContext::new();
        let v = ctx.compile_shader(ShaderStage::Vertex, VERT).unwrap();
        let f = ctx.compile_shader(ShaderStage::Fragment, FRAG).unwrap();
        assert!(matches!(ctx.link_program(f, v), Err(ShaderError::Link { .. })));
        assert_eq!(ctx.live_program_count(), 0);
    }

    #[test]
    fn buffers_keep_uploaded_bytes() {
        let mut ctx = RecordingContext::new();
        let buffer = ctx.create_vertex_buffer(&[1, 2, 3, 4]).unwrap();
        assert_eq!(ctx.buffer_data(buffer), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(ctx.buffer_data(buffer + 1), None);
    }

    #[test]
    fn take_commands_resets_log() {
        let mut ctx = RecordingContext::new();
        ctx.draw_triangles(0, 3);
        assert_eq!(
            ctx.take_commands(),
            vec![GlCommand::DrawTriangles { first: 0, count: 3 }]
        );
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn commands_serialize_tagged() {
        let json = serde_json::to_string(&GlCommand::DrawTriangles { first: 0, count: 3 }).unwrap();
        assert_eq!(json, r#"{"op":"draw_triangles","first":0,"count":3}"#);
    }
}
