use std::fmt;

/// Pipeline stage a shader object is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderKind::Vertex => f.write_str("vertex"),
            ShaderKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Failures reported by the GLES/EGL layer itself rather than by shader code.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to create {object}: {message}")]
    Create {
        object: &'static str,
        message: String,
    },
    #[error("failed to swap buffers: {0}")]
    Swap(String),
}

/// The slice of OpenGL ES 2.0 (plus the EGL buffer swap) that the triangle
/// renderer relies on.
///
/// Everything above this trait (shader compilation, program linking, render
/// state, the frame loop) is written against it, so the same code drives the
/// real `glow` device and the recording fake used in tests. Object handles are
/// associated types; an object that failed to be created never exists, which
/// replaces the `0` handle convention of the C API.
pub trait Gles2 {
    type Shader: Copy + fmt::Debug + PartialEq;
    type Program: Copy + fmt::Debug + PartialEq;
    type Buffer: Copy + fmt::Debug + PartialEq;
    type UniformLocation: Clone + fmt::Debug;

    fn create_shader(&mut self, kind: ShaderKind) -> Result<Self::Shader, DriverError>;
    fn shader_source(&mut self, shader: Self::Shader, source: &str);
    fn compile_shader(&mut self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&mut self, shader: Self::Shader);

    fn create_program(&mut self) -> Result<Self::Program, DriverError>;
    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader);
    fn link_program(&mut self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&mut self, program: Option<Self::Program>);
    fn delete_program(&mut self, program: Self::Program);

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    fn create_buffer(&mut self) -> Result<Self::Buffer, DriverError>;
    /// Fills `buffer` with static vertex data.
    fn upload_vertices(&mut self, buffer: Self::Buffer, data: &[f32]);
    /// Sources attribute `index` from `buffer`, `components` floats per vertex, tightly packed.
    fn vertex_attrib_pointer(&mut self, index: u32, buffer: Self::Buffer, components: i32);
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn disable_vertex_attrib_array(&mut self, index: u32);
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    /// Uploads a row-major matrix without transposition.
    fn uniform_matrix4(&mut self, location: &Self::UniformLocation, matrix: &[f32; 16]);
    fn clear(&mut self, rgba: [f32; 4]);
    fn draw_triangles(&mut self, first: i32, count: i32);
    fn flush(&mut self);
    fn finish(&mut self);
    fn swap_buffers(&mut self) -> Result<(), DriverError>;
}
