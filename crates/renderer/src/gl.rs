use glow::HasContext;
use glutin::context::PossiblyCurrentContext;
use glutin::surface::{GlSurface, Surface, WindowSurface};

use crate::driver::{DriverError, Gles2, ShaderKind};

/// A current GLES 2.0 context, its window surface, and the `glow` function table.
///
/// The surface and context are only dropped together with the device; the
/// owning [`Platform`](crate::window::Platform) keeps the window alive
/// longer than both.
pub struct GlesDevice {
    gl: glow::Context,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl GlesDevice {
    pub(crate) fn new(
        gl: glow::Context,
        surface: Surface<WindowSurface>,
        context: PossiblyCurrentContext,
    ) -> Self {
        Self {
            gl,
            surface,
            context,
        }
    }
}

impl std::fmt::Debug for GlesDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlesDevice").finish_non_exhaustive()
    }
}

// Every call below requires the context to be current on this thread, which
// `GlesDevice::new` guarantees and nothing afterwards changes.
impl Gles2 for GlesDevice {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Buffer = glow::NativeBuffer;
    type UniformLocation = glow::NativeUniformLocation;

    fn create_shader(&mut self, kind: ShaderKind) -> Result<Self::Shader, DriverError> {
        let stage = match kind {
            ShaderKind::Vertex => glow::VERTEX_SHADER,
            ShaderKind::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { self.gl.create_shader(stage) }.map_err(|message| DriverError::Create {
            object: "shader",
            message,
        })
    }

    fn shader_source(&mut self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&mut self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&mut self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&mut self) -> Result<Self::Program, DriverError> {
        unsafe { self.gl.create_program() }.map_err(|message| DriverError::Create {
            object: "program",
            message,
        })
    }

    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn link_program(&mut self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn use_program(&mut self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn delete_program(&mut self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn create_buffer(&mut self) -> Result<Self::Buffer, DriverError> {
        unsafe { self.gl.create_buffer() }.map_err(|message| DriverError::Create {
            object: "vertex buffer",
            message,
        })
    }

    fn upload_vertices(&mut self, buffer: Self::Buffer, data: &[f32]) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STATIC_DRAW,
            );
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn vertex_attrib_pointer(&mut self, index: u32, buffer: Self::Buffer, components: i32) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl
                .vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, 0, 0);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) }
    }

    fn delete_buffer(&mut self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn uniform_matrix4(&mut self, location: &Self::UniformLocation, matrix: &[f32; 16]) {
        // GLES 2.0 rejects transpose = true.
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), false, matrix.as_slice())
        }
    }

    fn clear(&mut self, rgba: [f32; 4]) {
        let [r, g, b, a] = rgba;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn draw_triangles(&mut self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, first, count) }
    }

    fn flush(&mut self) {
        unsafe { self.gl.flush() }
    }

    fn finish(&mut self) {
        unsafe { self.gl.finish() }
    }

    fn swap_buffers(&mut self) -> Result<(), DriverError> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|err| DriverError::Swap(err.to_string()))
    }
}
