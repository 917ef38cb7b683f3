//! Render a scene with motion blur and depth of field
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::{Parser, ValueEnum};
use log::{error, LevelFilter};
use motion_blur_tracer::{
    error::Result,
    output,
    render::{RenderSettings, Renderer},
    scene::Scene,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML scene file, the random sphere field is rendered when absent
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Output image, `.ppm` is written as text, other extensions by format
    #[arg(short, long, default_value = "image.ppm")]
    output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Samples per pixel
    #[arg(short, long)]
    samples: Option<u32>,

    /// Maximum number of bounces per path
    #[arg(long)]
    max_depth: Option<u32>,

    /// Seed for a reproducible render
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn load_scene(args: &Args) -> Result<Scene> {
    let mut scene = match &args.scene {
        Some(path) => Scene::from_file(path)?,
        None => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            Scene::random(RenderSettings::default(), &mut rng)?
        }
    };

    let settings = &mut scene.settings;
    settings.width = args.width.unwrap_or(settings.width);
    settings.samples_per_pixel = args.samples.unwrap_or(settings.samples_per_pixel);
    settings.max_depth = args.max_depth.unwrap_or(settings.max_depth);
    settings.validate()?;
    Ok(scene)
}

fn run(args: Args) -> Result<()> {
    let scene = load_scene(&args)?;

    let mut renderer = Renderer::new(scene.settings).with_progress(!args.no_progress);
    if let Some(seed) = args.seed {
        renderer = renderer.with_seed(seed);
    }

    let cancel = renderer.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed)) {
        log::warn!("Could not install Ctrl-C handler: {e}");
    }

    let image = renderer.render(&scene.world, &scene.camera)?;
    output::save(&image, &args.output)
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .parse_default_env()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
