use std::fmt;
use std::time::{Duration, Instant};

use crate::driver::{DriverError, Gles2};
use crate::state::RenderState;

/// Keys the frame loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Escape,
    Other,
}

/// Input or window-system event, already translated from the platform's types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Keyboard { key: Key, pressed: bool },
    CloseRequested,
}

/// Non-blocking source of [`InputEvent`]s; `None` means nothing is pending.
pub trait EventSource {
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Abstraction over where elapsed time is read from.
pub trait TickSource {
    /// Time elapsed since an arbitrary but fixed origin.
    fn now(&mut self) -> Duration;
}

/// Tick source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTicks {
    origin: Instant,
}

impl SystemTicks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTicks {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TickSource for SystemTicks {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Throughput measured over one run of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frames: u64,
    pub elapsed: Duration,
}

impl FrameReport {
    /// Elapsed time in milliseconds.
    pub fn ticks(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Frames per second over whole elapsed ticks, so it agrees with the
    /// printed tick count; zero when no tick has passed.
    pub fn fps(&self) -> f64 {
        match self.ticks() {
            0 => 0.0,
            ticks => self.frames as f64 / (ticks as f64 / 1000.0),
        }
    }
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames in {} ticks -> {:.3} fps",
            self.frames,
            self.ticks(),
            self.fps()
        )
    }
}

/// Poll-or-render state machine driving the triangle.
///
/// Every iteration consumes at most one event. Only when nothing is pending
/// (and the loop is not paused) is a frame rendered, so input is always
/// handled ahead of drawing.
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    paused: bool,
    frames: u64,
    remaining: Option<u32>,
}

impl FrameLoop {
    /// `frame_limit` of zero renders until the user quits.
    pub fn new(frame_limit: u32) -> Self {
        Self {
            state: LoopState::Running,
            paused: false,
            frames: 0,
            remaining: (frame_limit > 0).then_some(frame_limit),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one iteration for the outcome of a single poll.
    ///
    /// `render` is invoked only when `event` is `None` and the loop is
    /// running unpaused.
    pub fn step<F>(
        &mut self,
        event: Option<InputEvent>,
        render: F,
    ) -> Result<LoopState, DriverError>
    where
        F: FnOnce() -> Result<(), DriverError>,
    {
        if self.state == LoopState::Stopped {
            return Ok(self.state);
        }

        match event {
            Some(InputEvent::Keyboard { key, pressed: true }) => match key {
                Key::Space => {
                    self.paused = !self.paused;
                    tracing::debug!(paused = self.paused, "pause toggled");
                }
                Key::Escape => {
                    tracing::debug!("escape pressed; stopping");
                    self.state = LoopState::Stopped;
                }
                Key::Other => {}
            },
            Some(InputEvent::Keyboard { pressed: false, .. }) => {}
            Some(InputEvent::CloseRequested) => {
                tracing::debug!("window close requested; stopping");
                self.state = LoopState::Stopped;
            }
            None if self.paused => {}
            None => {
                render()?;
                self.frames += 1;
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                    if *remaining == 0 {
                        tracing::debug!(frames = self.frames, "frame limit reached");
                        self.state = LoopState::Stopped;
                    }
                }
            }
        }

        Ok(self.state)
    }

    /// Polls `events` and renders `scene` until the loop stops, then waits for
    /// the driver to finish and reports throughput.
    pub fn run<D, E, T>(
        mut self,
        driver: &mut D,
        scene: &mut RenderState<D>,
        events: &mut E,
        ticks: &mut T,
    ) -> Result<FrameReport, DriverError>
    where
        D: Gles2,
        E: EventSource,
        T: TickSource,
    {
        let start = ticks.now();
        tracing::info!(limit = ?self.remaining, "entering frame loop");

        while self.state == LoopState::Running {
            let event = events.poll_event();
            self.step(event, || scene.advance_frame(driver))?;
        }

        driver.finish();
        let elapsed = ticks.now().saturating_sub(start);
        Ok(FrameReport {
            frames: self.frames,
            elapsed,
        })
    }
}
