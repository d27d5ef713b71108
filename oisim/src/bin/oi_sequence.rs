//! Compose an optical image sequence and report per-frame photometry

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use oisim::{SequenceConfig, WaveSamples};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compose an optical image sequence and report per-frame illuminance")]
struct Args {
    /// JSON sequence description; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Composition mode (add, blend, xor), overriding the config
    #[arg(long)]
    composition: Option<String>,

    /// Modulation region radius in microns, overriding the config
    #[arg(long)]
    radius_um: Option<f64>,

    /// Resample every frame onto start:end:step nm before reporting
    #[arg(long, num_args = 3, value_names = ["START", "END", "STEP"])]
    resample: Option<Vec<f64>>,

    /// Per-position integration time in seconds for the eye movement count
    #[arg(long, default_value_t = 0.005)]
    integration_time: f64,

    /// Compose frames in parallel
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Write the effective config to this path
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SequenceConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SequenceConfig::default(),
    };
    if let Some(composition) = &args.composition {
        config.composition = composition.clone();
    }
    if let Some(radius_um) = args.radius_um {
        config.region_radius_um = Some(radius_um);
    }
    if let Some(path) = &args.save_config {
        config
            .save_to_file(path)
            .with_context(|| format!("saving {}", path.display()))?;
    }

    let sequence = config.build().context("building sequence")?;
    info!(
        "Sequence: {} frames, {} composition, {:?}",
        sequence.len(),
        sequence.composition(),
        sequence.region()
    );

    let frames = if args.parallel {
        sequence.frames_par()?
    } else {
        sequence.frames().collect::<Result<Vec<_>, _>>()?
    };

    let resample = match args.resample.as_deref() {
        Some([start, end, step]) => Some(WaveSamples::uniform(*start, *end, *step)?),
        _ => None,
    };

    println!("{:>6} {:>10} {:>8} {:>14}", "frame", "time (s)", "weight", "mean lux");
    for (i, frame) in frames.iter().enumerate() {
        let lux = match &resample {
            Some(wave) => frame.resampled_to(wave.clone())?.mean_illuminance()?,
            None => frame.mean_illuminance()?,
        };
        println!(
            "{:>6} {:>10.4} {:>8.3} {:>14.6}",
            i,
            sequence.time_axis()[i],
            sequence.modulation()[i],
            lux
        );
    }

    match sequence.max_eye_movements_given_integration_time(args.integration_time) {
        Ok(count) => println!(
            "Eye positions at {}s integration: {}",
            args.integration_time, count
        ),
        Err(e) => println!("Eye positions unavailable: {e}"),
    }

    Ok(())
}
