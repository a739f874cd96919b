use anyhow::{anyhow, Context, Result};
use renderer::{
    load_program, open_window, FrameLoop, RenderState, SurfaceSpec, SystemTicks, Variant,
};
use tracing_subscriber::EnvFilter;

use crate::cli::{self, ParseOutcome};
use crate::settings::{self, Settings};

/// Environment variable selecting the parsing/defaults variant.
pub const VARIANT_ENV: &str = "TRISPIN_VARIANT";

pub fn run(args: &[String]) -> Result<()> {
    initialise_tracing();

    let settings = settings::discover()?;
    let variant = resolve_variant(std::env::var(VARIANT_ENV).ok().as_deref(), &settings)?;
    let config = match cli::parse_args(args, variant) {
        ParseOutcome::Run(config) => config,
        ParseOutcome::Usage { error } => {
            if let Some(error) = error {
                tracing::warn!("{error}");
            }
            print!("{}", cli::usage());
            return Ok(());
        }
        ParseOutcome::Version => {
            print!("{}", cli::version());
            return Ok(());
        }
    };
    tracing::info!(%variant, ?config, "starting trispin");

    let spec = SurfaceSpec::new(&config, variant, settings.title.as_str());
    let mut platform = open_window(&spec).context("failed to open GLES 2.0 window")?;
    let device = &mut platform.device;

    let program = match load_program(device, &settings.vertex_shader, &settings.fragment_shader) {
        Ok(program) => program,
        Err(err) => {
            tracing::error!("{err}");
            return Ok(());
        }
    };
    let mut scene = match RenderState::initialize(device, &program, settings.location_policy()) {
        Ok(scene) => scene,
        Err(err) => {
            tracing::error!("{err}");
            program.release(device);
            return Ok(());
        }
    };

    let outcome = FrameLoop::new(config.frame_limit).run(
        device,
        &mut scene,
        &mut platform.events,
        &mut SystemTicks::new(),
    );
    scene.release(device);
    program.release(device);

    let report = outcome.context("frame loop aborted")?;
    println!("{report}");
    Ok(())
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Environment beats the settings file; `sample` when neither says.
fn resolve_variant(env: Option<&str>, settings: &Settings) -> Result<Variant> {
    match env {
        Some(value) => value
            .parse()
            .map_err(|err: String| anyhow!(err))
            .with_context(|| format!("invalid {VARIANT_ENV}")),
        None => Ok(settings.variant.map(Variant::from).unwrap_or_default()),
    }
}
