use crate::compile::ShaderError;
use crate::driver::{DriverError, Gles2};
use crate::program::GraphicsProgram;

/// Vertex attribute carrying the triangle positions.
pub const POSITION_ATTRIBUTE: &str = "my_Vertex";
/// Vertex attribute carrying the per-vertex colours.
pub const COLOR_ATTRIBUTE: &str = "my_Color";
/// Uniform receiving the [`TransformMatrix`].
pub const TRANSFORM_UNIFORM: &str = "my_TransformMatrix";

/// Radians added to the rotation angle per rendered frame.
pub const ANGLE_STEP: f32 = 0.1;
/// The angle wraps back into `[0, ANGLE_WRAP)` once it reaches this value,
/// keeping the inputs to `sin`/`cos` small.
pub const ANGLE_WRAP: f32 = 6.3;
/// `ANGLE_WRAP / ANGLE_STEP`. The angle is kept as a step count so the wrap
/// lands on exactly this frame instead of drifting with f32 accumulation.
const STEPS_PER_WRAP: u32 = 63;

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[rustfmt::skip]
pub const TRIANGLE_POSITIONS: [f32; 6] = [
    -0.5, -0.5,
     0.0,  0.5,
     0.5, -0.5,
];

#[rustfmt::skip]
pub const TRIANGLE_COLORS: [f32; 9] = [
    1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 0.0, 1.0,
];

/// 4x4 row-major transform; only the Y-rotation sub-block ever changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix([f32; 16]);

impl TransformMatrix {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Rewrites the rotation sub-block for a rotation of `angle` radians around Y.
    pub fn set_rotation_y(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        self.0[0] = cos;
        self.0[10] = cos;
        self.0[2] = sin;
        self.0[8] = -sin;
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.0
    }
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What to do when the linked program lacks one of the expected names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationPolicy {
    /// Fail initialisation with [`ShaderError::MissingLocation`].
    #[default]
    Require,
    /// Warn, leave the location unset, and skip the calls that would use it.
    Tolerate,
}

/// Attribute and uniform locations resolved from the active program.
#[derive(Debug, Clone)]
pub struct Bindings<L> {
    pub position: Option<u32>,
    pub color: Option<u32>,
    pub transform: Option<L>,
}

/// Per-frame state of the spinning triangle.
#[derive(Debug)]
pub struct RenderState<D: Gles2> {
    bindings: Bindings<D::UniformLocation>,
    position_buffer: D::Buffer,
    color_buffer: D::Buffer,
    transform: TransformMatrix,
    step: u32,
}

impl<D: Gles2> RenderState<D> {
    /// Resolves the triangle's inputs on `program`, uploads the vertex data,
    /// and sends the identity transform.
    pub fn initialize(
        driver: &mut D,
        program: &GraphicsProgram<D>,
        policy: LocationPolicy,
    ) -> Result<Self, ShaderError> {
        let handle = program.handle();
        let bindings = Bindings {
            position: resolve(policy, POSITION_ATTRIBUTE, || {
                driver.attrib_location(handle, POSITION_ATTRIBUTE)
            })?,
            color: resolve(policy, COLOR_ATTRIBUTE, || {
                driver.attrib_location(handle, COLOR_ATTRIBUTE)
            })?,
            transform: resolve(policy, TRANSFORM_UNIFORM, || {
                driver.uniform_location(handle, TRANSFORM_UNIFORM)
            })?,
        };

        let position_buffer = driver.create_buffer()?;
        let color_buffer = match driver.create_buffer() {
            Ok(buffer) => buffer,
            Err(err) => {
                driver.delete_buffer(position_buffer);
                return Err(err.into());
            }
        };
        driver.upload_vertices(position_buffer, &TRIANGLE_POSITIONS);
        driver.upload_vertices(color_buffer, &TRIANGLE_COLORS);

        if let Some(index) = bindings.position {
            driver.enable_vertex_attrib_array(index);
            driver.vertex_attrib_pointer(index, position_buffer, 2);
        }
        if let Some(index) = bindings.color {
            driver.enable_vertex_attrib_array(index);
            driver.vertex_attrib_pointer(index, color_buffer, 3);
        }

        let transform = TransformMatrix::IDENTITY;
        if let Some(location) = &bindings.transform {
            driver.uniform_matrix4(location, transform.as_array());
        }

        tracing::debug!(
            position = ?bindings.position,
            color = ?bindings.color,
            transform = bindings.transform.is_some(),
            "render state initialised"
        );
        Ok(Self {
            bindings,
            position_buffer,
            color_buffer,
            transform,
            step: 0,
        })
    }

    /// Renders one frame at the current angle, then advances the angle and
    /// presents.
    pub fn advance_frame(&mut self, driver: &mut D) -> Result<(), DriverError> {
        driver.clear(CLEAR_COLOR);

        self.transform.set_rotation_y(self.angle());
        self.step += 1;
        if self.step >= STEPS_PER_WRAP {
            self.step %= STEPS_PER_WRAP;
            tracing::trace!("rotation angle wrapped");
        }

        if let Some(location) = &self.bindings.transform {
            driver.uniform_matrix4(location, self.transform.as_array());
        }
        driver.draw_triangles(0, 3);
        driver.flush();
        driver.swap_buffers()
    }

    /// Angle, in radians, the next frame will be drawn at.
    pub fn angle(&self) -> f32 {
        self.step as f32 * ANGLE_STEP
    }

    pub fn transform(&self) -> &TransformMatrix {
        &self.transform
    }

    pub fn bindings(&self) -> &Bindings<D::UniformLocation> {
        &self.bindings
    }

    /// Disables the attribute arrays and deletes the vertex buffers.
    pub fn release(self, driver: &mut D) {
        if let Some(index) = self.bindings.position {
            driver.disable_vertex_attrib_array(index);
        }
        if let Some(index) = self.bindings.color {
            driver.disable_vertex_attrib_array(index);
        }
        driver.delete_buffer(self.position_buffer);
        driver.delete_buffer(self.color_buffer);
    }
}

fn resolve<T>(
    policy: LocationPolicy,
    name: &'static str,
    lookup: impl FnOnce() -> Option<T>,
) -> Result<Option<T>, ShaderError> {
    match (lookup(), policy) {
        (Some(location), _) => Ok(Some(location)),
        (None, LocationPolicy::Require) => Err(ShaderError::MissingLocation { name }),
        (None, LocationPolicy::Tolerate) => {
            tracing::warn!(name, "shader input not found; it will be left unbound");
            Ok(None)
        }
    }
}
