use std::fmt;
use std::str::FromStr;

/// Window title used when nothing else is configured.
pub const DEFAULT_TITLE: &str = "OpenGL ES 2.0 Tutorial 1";

/// Window geometry and run length requested on the command line.
///
/// Built once at start-up and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Window x position; negative centres the window horizontally.
    pub x: i32,
    /// Window y position; negative centres the window vertically.
    pub y: i32,
    /// Width in pixels; zero (or a zero height) requests fullscreen.
    pub width: i32,
    /// Height in pixels; zero (or a zero width) requests fullscreen.
    pub height: i32,
    /// MSAA sample count (0, 2, or 4).
    pub samples: i32,
    /// Frames to render before exiting; zero runs until the user quits.
    pub frame_limit: u32,
}

/// The two historical flavours of the sample.
///
/// `Sample` parses its arguments strictly and opens fullscreen without a
/// depth buffer. `Tutorial` parses leniently and opens a 640x480 window with a
/// 16-bit depth buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Sample,
    Tutorial,
}

impl Variant {
    /// Whether malformed command lines are rejected with usage text.
    pub fn strict_parse(self) -> bool {
        matches!(self, Variant::Sample)
    }

    pub fn depth_bits(self) -> u8 {
        match self {
            Variant::Sample => 0,
            Variant::Tutorial => 16,
        }
    }

    /// Configuration used for any flag the command line leaves out.
    pub fn default_config(self) -> RunConfig {
        let (width, height) = match self {
            Variant::Sample => (0, 0),
            Variant::Tutorial => (640, 480),
        };
        RunConfig {
            x: -1,
            y: -1,
            width,
            height,
            samples: 0,
            frame_limit: 0,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Sample => f.write_str("sample"),
            Variant::Tutorial => f.write_str("tutorial"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sample" | "strict" => Ok(Variant::Sample),
            "tutorial" | "lenient" => Ok(Variant::Tutorial),
            other => Err(format!(
                "unknown variant '{other}'; expected sample or tutorial"
            )),
        }
    }
}

/// Everything the window/context layer needs to open the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub title: String,
    /// Requested position per axis; `None` centres on that axis.
    pub x: Option<i32>,
    pub y: Option<i32>,
    /// Inner size in physical pixels; `None` requests borderless fullscreen.
    pub size: Option<(u32, u32)>,
    /// MSAA samples; zero disables multisampling.
    pub samples: u8,
    pub depth_bits: u8,
}

impl SurfaceSpec {
    pub fn new(config: &RunConfig, variant: Variant, title: impl Into<String>) -> Self {
        let size = match (u32::try_from(config.width), u32::try_from(config.height)) {
            (Ok(width), Ok(height)) if width > 0 && height > 0 => Some((width, height)),
            _ => None,
        };

        let samples = match u8::try_from(config.samples) {
            Ok(samples) if samples == 0 || (samples > 1 && samples.is_power_of_two()) => samples,
            _ => {
                tracing::warn!(
                    samples = config.samples,
                    "unsupported MSAA sample count; multisampling disabled"
                );
                0
            }
        };

        Self {
            title: title.into(),
            x: (config.x >= 0).then_some(config.x),
            y: (config.y >= 0).then_some(config.y),
            size,
            samples,
            depth_bits: variant.depth_bits(),
        }
    }
}
