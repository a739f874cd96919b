use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use renderer::{RunConfig, Variant};

#[derive(Parser, Debug)]
#[command(
    name = "trispin",
    version,
    about = "Spinning-triangle OpenGL ES 2.0 sample",
    disable_help_flag = true,
    allow_negative_numbers = true,
    after_help = "Exit: [ESC] or the frame count reached."
)]
pub struct Cli {
    /// Window x position; -1 centres the window.
    #[arg(short = 'x', value_name = "X")]
    pub x: Option<i32>,

    /// Window y position; -1 centres the window.
    #[arg(short = 'y', value_name = "Y")]
    pub y: Option<i32>,

    /// Window width; 0 together with a 0 height opens fullscreen.
    #[arg(short = 'w', value_name = "WIDTH")]
    pub width: Option<i32>,

    /// Window height.
    #[arg(short = 'h', value_name = "HEIGHT")]
    pub height: Option<i32>,

    /// MSAA samples: 0, 2 or 4.
    #[arg(short = 's', value_name = "SAMPLES", value_parser = parse_samples)]
    pub samples: Option<i32>,

    /// Frames to render before exiting; 0 or less runs until [ESC].
    #[arg(short = 'f', value_name = "COUNT")]
    pub frames: Option<i32>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    fn apply(&self, mut config: RunConfig) -> RunConfig {
        if let Some(x) = self.x {
            config.x = x;
        }
        if let Some(y) = self.y {
            config.y = y;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(samples) = self.samples {
            config.samples = samples;
        }
        if let Some(frames) = self.frames {
            config.frame_limit = frame_limit(frames);
        }
        config
    }
}

/// What the binary should do after looking at its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Run(RunConfig),
    /// Print usage and exit successfully; `error` explains a rejected command line.
    Usage { error: Option<String> },
    Version,
}

/// Parses `args` (without the program name) the way `variant` expects.
pub fn parse_args(args: &[String], variant: Variant) -> ParseOutcome {
    let defaults = variant.default_config();
    if !variant.strict_parse() {
        return ParseOutcome::Run(parse_lenient(args, defaults));
    }

    let argv = std::iter::once("trispin").chain(args.iter().map(String::as_str));
    match Cli::try_parse_from(argv) {
        Ok(cli) => ParseOutcome::Run(cli.apply(defaults)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp => ParseOutcome::Usage { error: None },
            ErrorKind::DisplayVersion => ParseOutcome::Version,
            _ => ParseOutcome::Usage {
                error: Some(first_line(&err.to_string())),
            },
        },
    }
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

pub fn version() -> String {
    Cli::command().render_version()
}

pub fn parse_samples(value: &str) -> Result<i32, String> {
    let samples: i32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid sample count '{value}'"))?;
    if matches!(samples, 0 | 2 | 4) {
        Ok(samples)
    } else {
        Err(format!(
            "unsupported sample count {samples}; supported values are 0, 2, or 4"
        ))
    }
}

/// Tolerant flag reading: only the character after `-` is looked at, values
/// are read like C `atoi`, a trailing flag without a value is dropped, and
/// anything unrecognised is skipped.
fn parse_lenient(args: &[String], mut config: RunConfig) -> RunConfig {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let Some(flag) = arg.strip_prefix('-').and_then(|rest| rest.chars().next()) else {
            continue;
        };
        if !matches!(flag, 'x' | 'y' | 'w' | 'h' | 's' | 'f') {
            continue;
        }
        let Some(value) = iter.next().map(|value| atoi(value)) else {
            break;
        };
        match flag {
            'x' => config.x = value,
            'y' => config.y = value,
            'w' => config.width = value,
            'h' => config.height = value,
            's' => config.samples = value,
            _ => config.frame_limit = frame_limit(value),
        }
    }
    config
}

/// Negative counts mean unbounded, like zero.
fn frame_limit(frames: i32) -> u32 {
    u32::try_from(frames).unwrap_or(0)
}

/// Leading-integer prefix of `value`, 0 when there is none.
fn atoi(value: &str) -> i32 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            (acc * 10 + i64::from(digit - b'0')).min(i64::from(i32::MAX) + 1)
        });
    let signed = if negative { -magnitude } else { magnitude };
    i32::try_from(signed).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}

fn first_line(message: &str) -> String {
    let line = message.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}
