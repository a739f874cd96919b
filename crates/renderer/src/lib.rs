//! Renderer crate for trispin, a spinning-triangle OpenGL ES 2.0 demo.
//!
//! The crate loads a vertex/fragment shader pair, builds the triangle render
//! state, and drives the frame loop. The overall flow is:
//!
//! ```text
//!   trispin CLI
//!        │ RunConfig + Variant
//!        ▼
//!   open_window ──▶ Platform { GlesDevice, WindowEvents }
//!        │
//!        ├─▶ load_program ──▶ GraphicsProgram
//!        ├─▶ RenderState::initialize
//!        └─▶ FrameLoop::run ──▶ advance_frame() ──▶ swap_buffers
//! ```
//!
//! Everything above the window layer talks to the GPU through the [`Gles2`]
//! trait, so shader handling, render state and the loop can be exercised
//! without a display.

mod compile;
mod driver;
mod gl;
mod program;
mod runtime;
mod state;
mod types;
mod window;

#[cfg(test)]
mod mock;

pub use compile::{compile, compile_source, ShaderError, ShaderUnit};
pub use driver::{DriverError, Gles2, ShaderKind};
pub use gl::GlesDevice;
pub use program::{link, load_program, GraphicsProgram};
pub use runtime::{
    EventSource, FrameLoop, FrameReport, InputEvent, Key, LoopState, SystemTicks, TickSource,
};
pub use state::{
    Bindings, LocationPolicy, RenderState, TransformMatrix, ANGLE_STEP, ANGLE_WRAP,
    COLOR_ATTRIBUTE, POSITION_ATTRIBUTE, TRANSFORM_UNIFORM,
};
pub use types::{RunConfig, SurfaceSpec, Variant, DEFAULT_TITLE};
pub use window::{open_window, Platform, WindowError, WindowEvents};
