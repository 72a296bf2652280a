//! retime - command-line media speed-change transcoder.

mod backend;

use clap::Parser;
use console::style;
use retime_pipeline::{Pipeline, PipelineConfig, PipelineReport};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Command-line arguments.
///
/// Only the input and output paths are required; every transformation
/// parameter defaults to "off".
#[derive(Parser, Debug)]
#[command(name = "retime")]
#[command(version)]
#[command(allow_negative_numbers = true)]
#[command(about = "Speed-change media transcoder with pitch-preserving audio")]
#[command(long_about = "Transcodes a media file while changing playback speed.\n\n\
    Video speed is changed by dropping or duplicating frames; audio is\n\
    time-stretched without altering pitch. Optional visual filters and\n\
    rotation are applied on the way through.\n\n\
    EXAMPLES:\n    \
    retime input.mp4 output.avi 1.5\n    \
    retime input.mp4 output.avi 2.0 90\n    \
    retime input.mp4 output.avi 0.5 0 1 0 1 1.2 1.3")]
struct Args {
    /// Input media file
    input: PathBuf,

    /// Output media file
    output: PathBuf,

    /// Speed factor (0.1 to 5.0)
    #[arg(default_value_t = 1.0)]
    speed: f64,

    /// Rotation in degrees (0 disables)
    #[arg(default_value_t = 0.0)]
    rotation: f32,

    /// Box blur (0 or 1)
    #[arg(default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    blur: u8,

    /// Sharpen (0 or 1)
    #[arg(default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    sharpen: u8,

    /// Grayscale (0 or 1)
    #[arg(default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    grayscale: u8,

    /// Brightness (0.0 to 2.0, 1.0 is neutral)
    #[arg(default_value_t = 1.0)]
    brightness: f32,

    /// Contrast (0.0 to 2.0, 1.0 is neutral)
    #[arg(default_value_t = 1.0)]
    contrast: f32,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            speed_factor: self.speed,
            rotation_deg: self.rotation,
            enable_blur: self.blur != 0,
            enable_sharpen: self.sharpen != 0,
            enable_grayscale: self.grayscale != 0,
            brightness: self.brightness,
            contrast: self.contrast,
            ..Default::default()
        }
    }
}

fn print_report(report: &PipelineReport) {
    println!(
        "{} {} video frames, {} audio frames, {} packets written",
        style("done:").green().bold(),
        report.video_frames_emitted,
        report.audio_frames_emitted,
        report.packets_written,
    );
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = args.to_config();
    if let Err(e) = config.validate() {
        eprintln!("{} {e}", style("error:").red().bold());
        return ExitCode::FAILURE;
    }

    info!(
        "transcoding {} -> {} at {}x",
        args.input.display(),
        args.output.display(),
        config.speed_factor
    );

    let provider = match backend::provider() {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            return ExitCode::FAILURE;
        }
    };

    match Pipeline::new(config).run(provider.as_ref(), &args.input, &args.output) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
