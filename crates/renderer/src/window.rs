use std::collections::VecDeque;
use std::time::Duration;

use glow::HasContext;
use glutin::config::{Api, Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{ContextApi, ContextAttributesBuilder, NotCurrentGlContext, Version};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasRawWindowHandle;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopBuilder};
use winit::keyboard::{Key as LogicalKey, NamedKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::gl::GlesDevice;
use crate::runtime::{EventSource, InputEvent, Key};
use crate::types::SurfaceSpec;

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("failed to create event loop: {0}")]
    EventLoop(String),
    #[error("failed to create window or choose an EGL config: {0}")]
    Display(String),
    #[error("failed to create GLES 2.0 context: {0}")]
    Context(String),
    #[error("failed to create window surface: {0}")]
    Surface(String),
}

/// The opened window, split into the drawing device and the event side.
///
/// Field order is drop order: the context and surface go before the window
/// and event loop they were created from.
pub struct Platform {
    pub device: GlesDevice,
    pub events: WindowEvents,
}

/// Non-blocking event side of the window, fed by `pump_events`.
pub struct WindowEvents {
    pending: VecDeque<InputEvent>,
    window: Window,
    event_loop: EventLoop<()>,
}

impl WindowEvents {
    pub fn window(&self) -> &Window {
        &self.window
    }

    fn pump(&mut self) {
        let window_id = self.window.id();
        let pending = &mut self.pending;
        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _| {
                if let Event::WindowEvent { window_id: id, event } = event {
                    if id == window_id {
                        if let Some(input) = translate(&event) {
                            pending.push_back(input);
                        }
                    }
                }
            });

        if let PumpStatus::Exit(code) = status {
            tracing::debug!(code, "event loop exited");
            self.pending.push_back(InputEvent::CloseRequested);
        }
    }
}

impl EventSource for WindowEvents {
    fn poll_event(&mut self) -> Option<InputEvent> {
        if self.pending.is_empty() {
            self.pump();
        }
        self.pending.pop_front()
    }
}

/// Opens the window described by `spec` with a current GLES 2.0 context on it.
pub fn open_window(spec: &SurfaceSpec) -> Result<Platform, WindowError> {
    let event_loop = EventLoopBuilder::new()
        .build()
        .map_err(|err| WindowError::EventLoop(err.to_string()))?;

    let monitor = event_loop
        .primary_monitor()
        .map(|monitor| (monitor.position(), monitor.size()));
    let mut builder = WindowBuilder::new()
        .with_title(spec.title.as_str())
        .with_resizable(false);
    builder = match spec.size {
        Some((width, height)) => builder.with_inner_size(PhysicalSize::new(width, height)),
        None => builder.with_fullscreen(Some(Fullscreen::Borderless(None))),
    };
    if let Some(position) = placement(spec, monitor) {
        builder = builder.with_position(position);
    }

    let mut template = ConfigTemplateBuilder::new()
        .with_api(Api::GLES2)
        .with_depth_size(spec.depth_bits);
    if spec.samples > 0 {
        template = template.with_multisampling(spec.samples);
    }
    let wanted_samples = spec.samples;
    let (window, gl_config) = DisplayBuilder::new()
        .with_window_builder(Some(builder))
        .build(&event_loop, template, |configs| {
            pick_config(configs, wanted_samples)
        })
        .map_err(|err| WindowError::Display(err.to_string()))?;
    let window =
        window.ok_or_else(|| WindowError::Display("display did not create a window".into()))?;
    tracing::info!(
        samples = gl_config.num_samples(),
        depth = gl_config.depth_size(),
        hardware = gl_config.hardware_accelerated(),
        "selected EGL config"
    );

    let gl_display = gl_config.display();
    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(Some(Version::new(2, 0))))
        .build(Some(window.raw_window_handle()));
    let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
        .map_err(|err| WindowError::Context(err.to_string()))?;

    let surface_attributes =
        window.build_surface_attributes(SurfaceAttributesBuilder::<WindowSurface>::default());
    let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
        .map_err(|err| WindowError::Surface(err.to_string()))?;
    let context = not_current
        .make_current(&surface)
        .map_err(|err| WindowError::Context(err.to_string()))?;

    let gl = unsafe {
        glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
    };
    let renderer = unsafe { gl.get_parameter_string(glow::RENDERER) };
    tracing::info!(%renderer, title = %spec.title, "GLES 2.0 context ready");

    Ok(Platform {
        device: GlesDevice::new(gl, surface, context),
        events: WindowEvents {
            pending: VecDeque::new(),
            window,
            event_loop,
        },
    })
}

/// Prefers a config with exactly the requested sample count, else the first offered.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>, samples: u8) -> Config {
    configs
        .reduce(|best, candidate| {
            if best.num_samples() != samples && candidate.num_samples() == samples {
                candidate
            } else {
                best
            }
        })
        .expect("glutin only calls the picker with at least one config")
}

/// Window origin for a windowed surface; axes left unset are centred on the
/// primary monitor when one is known.
fn placement(
    spec: &SurfaceSpec,
    monitor: Option<(PhysicalPosition<i32>, PhysicalSize<u32>)>,
) -> Option<PhysicalPosition<i32>> {
    let (width, height) = spec.size?;
    let x = spec.x.or_else(|| {
        monitor.map(|(origin, size)| centred(origin.x, size.width, width))
    });
    let y = spec.y.or_else(|| {
        monitor.map(|(origin, size)| centred(origin.y, size.height, height))
    });

    match (x, y) {
        (None, None) => None,
        (x, y) => Some(PhysicalPosition::new(x.unwrap_or(0), y.unwrap_or(0))),
    }
}

fn centred(origin: i32, span: u32, extent: u32) -> i32 {
    let slack = span.saturating_sub(extent) / 2;
    origin.saturating_add(i32::try_from(slack).unwrap_or(i32::MAX))
}

fn translate(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(InputEvent::CloseRequested),
        WindowEvent::KeyboardInput { event, .. } if !event.repeat => Some(InputEvent::Keyboard {
            key: map_key(&event.logical_key),
            pressed: event.state == ElementState::Pressed,
        }),
        _ => None,
    }
}

fn map_key(key: &LogicalKey) -> Key {
    match key {
        LogicalKey::Named(NamedKey::Space) => Key::Space,
        LogicalKey::Character(value) if value.as_str() == " " => Key::Space,
        LogicalKey::Named(NamedKey::Escape) => Key::Escape,
        _ => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RunConfig, Variant};

    fn spec(x: i32, y: i32, width: i32, height: i32) -> SurfaceSpec {
        let config = RunConfig {
            x,
            y,
            width,
            height,
            samples: 0,
            frame_limit: 0,
        };
        SurfaceSpec::new(&config, Variant::Tutorial, "test")
    }

    fn monitor() -> Option<(PhysicalPosition<i32>, PhysicalSize<u32>)> {
        Some((PhysicalPosition::new(0, 0), PhysicalSize::new(1920, 1080)))
    }

    #[test]
    fn explicit_position_is_kept() {
        let position = placement(&spec(10, 20, 640, 480), monitor());
        assert_eq!(position, Some(PhysicalPosition::new(10, 20)));
    }

    #[test]
    fn unset_axes_are_centred() {
        let position = placement(&spec(-1, -1, 640, 480), monitor());
        assert_eq!(position, Some(PhysicalPosition::new(640, 300)));

        let position = placement(&spec(5, -1, 640, 480), monitor());
        assert_eq!(position, Some(PhysicalPosition::new(5, 300)));
    }

    #[test]
    fn fullscreen_and_unknown_monitor_leave_placement_to_the_system() {
        assert_eq!(placement(&spec(10, 20, 0, 0), monitor()), None);
        assert_eq!(placement(&spec(-1, -1, 640, 480), None), None);
    }

    #[test]
    fn oversized_window_is_pinned_to_monitor_origin() {
        assert_eq!(centred(100, 800, 1024), 100);
    }

    #[test]
    fn maps_space_and_escape() {
        assert_eq!(map_key(&LogicalKey::Named(NamedKey::Space)), Key::Space);
        assert_eq!(map_key(&LogicalKey::Character(" ".into())), Key::Space);
        assert_eq!(map_key(&LogicalKey::Named(NamedKey::Escape)), Key::Escape);
        assert_eq!(map_key(&LogicalKey::Character("q".into())), Key::Other);
        assert_eq!(map_key(&LogicalKey::Named(NamedKey::Enter)), Key::Other);
    }

    #[test]
    fn close_request_is_translated() {
        assert_eq!(
            translate(&WindowEvent::CloseRequested),
            Some(InputEvent::CloseRequested)
        );
        assert_eq!(translate(&WindowEvent::Focused(true)), None);
    }
}
