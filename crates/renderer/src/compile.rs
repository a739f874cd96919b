use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::driver::{DriverError, Gles2, ShaderKind};

/// Everything that can go wrong between a shader file on disk and a program
/// ready to draw with.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("cannot open file '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("shader file '{}' is not valid UTF-8: {}", .path.display(), .source)]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("shader file '{}' is empty", .path.display())]
    Empty { path: PathBuf },
    #[error("error compiling shader '{}': {}", .path.display(), .log)]
    Compile { path: PathBuf, log: String },
    #[error("error linking program: {log}")]
    Link { log: String },
    #[error("linked program has no active `{name}`")]
    MissingLocation { name: &'static str },
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// A compiled shader object together with the file it came from.
///
/// Only successful compilations produce a `ShaderUnit`; the driver object is
/// owned until [`ShaderUnit::release`] or until a [`GraphicsProgram`] takes it.
///
/// [`GraphicsProgram`]: crate::program::GraphicsProgram
#[derive(Debug)]
pub struct ShaderUnit<D: Gles2> {
    path: PathBuf,
    kind: ShaderKind,
    handle: D::Shader,
}

impl<D: Gles2> ShaderUnit<D> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn handle(&self) -> D::Shader {
        self.handle
    }

    /// Deletes the driver-side shader object.
    pub fn release(self, driver: &mut D) {
        driver.delete_shader(self.handle);
    }
}

/// Reads `path` in full and compiles it as a `kind` shader.
pub fn compile<D: Gles2>(
    driver: &mut D,
    path: &Path,
    kind: ShaderKind,
) -> Result<ShaderUnit<D>, ShaderError> {
    let bytes = fs::read(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let source = String::from_utf8(bytes).map_err(|source| ShaderError::Encoding {
        path: path.to_path_buf(),
        source,
    })?;
    if source.trim().is_empty() {
        return Err(ShaderError::Empty {
            path: path.to_path_buf(),
        });
    }

    compile_source(driver, path, kind, &source)
}

/// Compiles already-loaded `source`; `path` is only used for reporting.
pub fn compile_source<D: Gles2>(
    driver: &mut D,
    path: &Path,
    kind: ShaderKind,
    source: &str,
) -> Result<ShaderUnit<D>, ShaderError> {
    let handle = driver.create_shader(kind)?;
    driver.shader_source(handle, source);
    driver.compile_shader(handle);

    if !driver.shader_compile_status(handle) {
        let log = driver.shader_info_log(handle);
        driver.delete_shader(handle);
        return Err(ShaderError::Compile {
            path: path.to_path_buf(),
            log: log.trim_end().to_string(),
        });
    }

    tracing::debug!(path = %path.display(), %kind, "compiled shader");
    Ok(ShaderUnit {
        path: path.to_path_buf(),
        kind,
        handle,
    })
}
