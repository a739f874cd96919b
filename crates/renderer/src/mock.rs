//! Recording stand-in for a GLES2 device used by the unit tests.
//!
//! "Compilation" accepts any source that declares `main` and has balanced
//! braces; linking collects `attribute`/`uniform` declarations so location
//! queries answer by name the way a real driver would.

use std::collections::HashMap;

use crate::driver::{DriverError, Gles2, ShaderKind};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateShader(ShaderKind, u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    UploadVertices { buffer: u32, len: usize },
    VertexAttribPointer { index: u32, buffer: u32, components: i32 },
    EnableAttrib(u32),
    DisableAttrib(u32),
    DeleteBuffer(u32),
    UniformMatrix { location: u32, matrix: [f32; 16] },
    Clear([f32; 4]),
    Draw { first: i32, count: i32 },
    Flush,
    Finish,
    Swap,
}

#[derive(Debug)]
struct MockShader {
    kind: ShaderKind,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    shaders: Vec<u32>,
    linked: bool,
    log: String,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingDriver {
    next_id: u32,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    pub calls: Vec<Call>,
    /// Makes every link fail with this log, regardless of the shaders attached.
    pub link_failure: Option<String>,
    /// Makes the swap with this zero-based index fail.
    pub fail_swap_at: Option<usize>,
    swaps: usize,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn draw_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Draw { .. }))
            .count()
    }

    pub fn swap_calls(&self) -> usize {
        self.calls.iter().filter(|call| **call == Call::Swap).count()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::UseProgram(program) => Some(*program),
            _ => None,
        })?
    }
}

fn check_source(source: &str) -> Result<(), String> {
    if !source.contains("void main") {
        return Err("ERROR: 0:1: 'main' : function not defined".to_string());
    }
    let opened = source.matches('{').count();
    let closed = source.matches('}').count();
    if opened != closed {
        return Err("ERROR: 0:1: '' : syntax error: unexpected end of file".to_string());
    }
    Ok(())
}

fn declared(source: &str, qualifier: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| line.trim().strip_prefix(qualifier))
        .filter_map(|rest| rest.split_whitespace().last())
        .map(|name| name.trim_end_matches(';').to_string())
        .collect()
}

impl Gles2 for RecordingDriver {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = u32;

    fn create_shader(&mut self, kind: ShaderKind) -> Result<u32, DriverError> {
        let id = self.allocate();
        self.shaders.insert(
            id,
            MockShader {
                kind,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        self.calls.push(Call::CreateShader(kind, id));
        Ok(id)
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        if let Some(entry) = self.shaders.get_mut(&shader) {
            entry.source = source.to_string();
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        if let Some(entry) = self.shaders.get_mut(&shader) {
            match check_source(&entry.source) {
                Ok(()) => entry.compiled = true,
                Err(log) => {
                    entry.compiled = false;
                    entry.log = log;
                }
            }
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shaders.get(&shader).is_some_and(|entry| entry.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.shaders
            .get(&shader)
            .map(|entry| entry.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: u32) {
        self.shaders.remove(&shader);
        self.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Result<u32, DriverError> {
        let id = self.allocate();
        self.programs.insert(id, MockProgram::default());
        self.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        if let Some(entry) = self.programs.get_mut(&program) {
            entry.shaders.push(shader);
        }
        self.calls.push(Call::AttachShader { program, shader });
    }

    fn link_program(&mut self, program: u32) {
        self.calls.push(Call::LinkProgram(program));
        let Some(entry) = self.programs.get(&program) else {
            return;
        };

        let mut attributes = Vec::new();
        let mut uniforms = Vec::new();
        let mut stages = Vec::new();
        let mut failure = self.link_failure.clone();
        for id in &entry.shaders {
            match self.shaders.get(id) {
                Some(shader) if shader.compiled => {
                    stages.push(shader.kind);
                    if shader.kind == ShaderKind::Vertex {
                        attributes.extend(declared(&shader.source, "attribute "));
                    }
                    for name in declared(&shader.source, "uniform ") {
                        if !uniforms.contains(&name) {
                            uniforms.push(name);
                        }
                    }
                }
                _ => failure = Some("ERROR: attached shader is not compiled".to_string()),
            }
        }
        if !stages.contains(&ShaderKind::Vertex) || !stages.contains(&ShaderKind::Fragment) {
            failure.get_or_insert_with(|| "ERROR: missing shader stage".to_string());
        }

        if let Some(entry) = self.programs.get_mut(&program) {
            match failure {
                Some(log) => {
                    entry.linked = false;
                    entry.log = log;
                }
                None => {
                    entry.linked = true;
                    entry.attributes = attributes;
                    entry.uniforms = uniforms;
                }
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.programs.get(&program).is_some_and(|entry| entry.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.programs
            .get(&program)
            .map(|entry| entry.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: Option<u32>) {
        self.calls.push(Call::UseProgram(program));
    }

    fn delete_program(&mut self, program: u32) {
        self.programs.remove(&program);
        self.calls.push(Call::DeleteProgram(program));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let entry = self.programs.get(&program).filter(|entry| entry.linked)?;
        entry
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| index as u32)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let entry = self.programs.get(&program).filter(|entry| entry.linked)?;
        entry
            .uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map(|index| index as u32)
    }

    fn create_buffer(&mut self) -> Result<u32, DriverError> {
        Ok(self.allocate())
    }

    fn upload_vertices(&mut self, buffer: u32, data: &[f32]) {
        self.calls.push(Call::UploadVertices {
            buffer,
            len: data.len(),
        });
    }

    fn vertex_attrib_pointer(&mut self, index: u32, buffer: u32, components: i32) {
        self.calls.push(Call::VertexAttribPointer {
            index,
            buffer,
            components,
        });
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(Call::EnableAttrib(index));
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(Call::DisableAttrib(index));
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn uniform_matrix4(&mut self, location: &u32, matrix: &[f32; 16]) {
        self.calls.push(Call::UniformMatrix {
            location: *location,
            matrix: *matrix,
        });
    }

    fn clear(&mut self, rgba: [f32; 4]) {
        self.calls.push(Call::Clear(rgba));
    }

    fn draw_triangles(&mut self, first: i32, count: i32) {
        self.calls.push(Call::Draw { first, count });
    }

    fn flush(&mut self) {
        self.calls.push(Call::Flush);
    }

    fn finish(&mut self) {
        self.calls.push(Call::Finish);
    }

    fn swap_buffers(&mut self) -> Result<(), DriverError> {
        let index = self.swaps;
        self.swaps += 1;
        if self.fail_swap_at == Some(index) {
            return Err(DriverError::Swap("surface lost".to_string()));
        }
        self.calls.push(Call::Swap);
        Ok(())
    }
}

/// Vertex/fragment sources matching the bundled `shaders/` pair.
pub(crate) const VERTEX_SOURCE: &str = "\
uniform mat4 my_TransformMatrix;
attribute vec4 my_Vertex;
attribute vec4 my_Color;
varying vec4 color;
void main()
{
    gl_Position = my_TransformMatrix * my_Vertex;
    color = my_Color;
}
";

pub(crate) const FRAGMENT_SOURCE: &str = "\
precision mediump float;
varying vec4 color;
void main()
{
    gl_FragColor = color;
}
";
