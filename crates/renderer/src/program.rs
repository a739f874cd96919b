use std::path::Path;

use crate::compile::{compile, ShaderError, ShaderUnit};
use crate::driver::{Gles2, ShaderKind};

/// A linked, active program and the two shader units it was built from.
#[derive(Debug)]
pub struct GraphicsProgram<D: Gles2> {
    vertex: ShaderUnit<D>,
    fragment: ShaderUnit<D>,
    handle: D::Program,
}

impl<D: Gles2> GraphicsProgram<D> {
    pub fn handle(&self) -> D::Program {
        self.handle
    }

    pub fn vertex(&self) -> &ShaderUnit<D> {
        &self.vertex
    }

    pub fn fragment(&self) -> &ShaderUnit<D> {
        &self.fragment
    }

    /// Tears the program down: shaders first, then the program, then unbinds it.
    pub fn release(self, driver: &mut D) {
        self.vertex.release(driver);
        self.fragment.release(driver);
        driver.delete_program(self.handle);
        driver.use_program(None);
    }
}

/// Links `vertex` and `fragment` into a fresh program object and makes it current.
///
/// Each call creates a new program object. On failure the program is not
/// activated and every object involved, shaders included, is deleted.
pub fn link<D: Gles2>(
    driver: &mut D,
    vertex: ShaderUnit<D>,
    fragment: ShaderUnit<D>,
) -> Result<GraphicsProgram<D>, ShaderError> {
    let handle = match driver.create_program() {
        Ok(handle) => handle,
        Err(err) => {
            vertex.release(driver);
            fragment.release(driver);
            return Err(err.into());
        }
    };

    driver.attach_shader(handle, vertex.handle());
    driver.attach_shader(handle, fragment.handle());
    driver.link_program(handle);

    if !driver.program_link_status(handle) {
        let log = driver.program_info_log(handle);
        vertex.release(driver);
        fragment.release(driver);
        driver.delete_program(handle);
        return Err(ShaderError::Link {
            log: log.trim_end().to_string(),
        });
    }

    driver.use_program(Some(handle));
    tracing::debug!(
        vertex = %vertex.path().display(),
        fragment = %fragment.path().display(),
        "linked shader program"
    );
    Ok(GraphicsProgram {
        vertex,
        fragment,
        handle,
    })
}

/// Compiles the vertex and fragment shader files and links them.
pub fn load_program<D: Gles2>(
    driver: &mut D,
    vertex_path: &Path,
    fragment_path: &Path,
) -> Result<GraphicsProgram<D>, ShaderError> {
    let vertex = compile(driver, vertex_path, ShaderKind::Vertex)?;
    let fragment = match compile(driver, fragment_path, ShaderKind::Fragment) {
        Ok(fragment) => fragment,
        Err(err) => {
            vertex.release(driver);
            return Err(err);
        }
    };
    link(driver, vertex, fragment)
}
