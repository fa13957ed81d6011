use clap::{Parser, Subcommand, ValueEnum};
use keyboard_ar::frame::{render_from_config, RenderError};
use keyboard_ar::overlay::{
    HomographyMethod, KeyboardSize, NoteNaming, OverlayIoError, OverlayParams,
    OverlayRenderConfig, OverlayRenderReport,
};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Io(#[from] OverlayIoError),
    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
}

#[derive(Parser, Debug)]
#[command(
    name = "keyboard-ar",
    version,
    about = "Piano keyboard overlay for marker-tagged keyboard strips"
)]
struct Cli {
    /// Log level for stderr output.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
    /// Emit JSON log lines through `tracing` instead of the plain logger.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a frame described by a JSON config.
    Render {
        #[arg(long)]
        config: PathBuf,
    },
    /// Render a frame from an image and a detections file.
    Overlay(OverlayArgs),
    /// Write a config with default parameters.
    InitConfig {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = "frame.png")]
        image: String,
        #[arg(long, default_value = "markers.json")]
        detections: String,
    },
}

#[derive(clap::Args, Debug)]
struct OverlayArgs {
    #[arg(long)]
    image: String,
    /// JSON file with `markers` (and optionally `rejected`).
    #[arg(long)]
    detections: String,
    #[arg(long)]
    output: Option<String>,
    #[arg(long)]
    report: Option<String>,
    /// Number of keys on the keyboard (49, 61, 76, 88).
    #[arg(long, default_value_t = 49)]
    keys: u32,
    #[arg(long, value_enum, default_value_t = Naming::German)]
    naming: Naming,
    /// Solve homographies directly instead of through RANSAC.
    #[arg(long)]
    direct: bool,
    #[arg(long)]
    no_legend: bool,
    /// Side-by-side output for Cardboard viewers.
    #[arg(long)]
    stereo: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Naming {
    German,
    English,
}

impl From<Naming> for NoteNaming {
    fn from(n: Naming) -> Self {
        match n {
            Naming::German => NoteNaming::German,
            Naming::English => NoteNaming::English,
        }
    }
}

impl OverlayArgs {
    fn into_config(self) -> OverlayRenderConfig {
        let mut params = OverlayParams::for_keyboard(KeyboardSize::from(self.keys));
        params.style.naming = self.naming.into();
        params.chord_legend = !self.no_legend;
        params.stereo = self.stereo;
        if self.direct {
            params.homography = HomographyMethod::Direct;
        }
        OverlayRenderConfig {
            image_path: self.image,
            detections_path: self.detections,
            output_path: self.output,
            report_path: self.report,
            params,
        }
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) -> Result<(), CliError> {
    if cli.json_logs {
        keyboard_ar::core::init_tracing(true);
    } else {
        keyboard_ar::core::init_with_level(cli.log_level.into())?;
    }
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) -> Result<(), CliError> {
    keyboard_ar::core::init_with_level(cli.log_level.into())?;
    Ok(())
}

fn print_summary(report: &OverlayRenderReport) {
    let frame = &report.frame;
    let octaves: Vec<String> = frame.segments.iter().map(|s| s.octave.to_string()).collect();
    println!(
        "{}: {} markers, {} segments (octaves [{}]), status {:?}",
        report.output_path,
        frame.markers_detected,
        frame.segments.len(),
        octaves.join(", "),
        frame.status
    );
}

fn run(cli: Cli) -> Result<(), CliError> {
    init_logging(&cli)?;
    match cli.command {
        Command::Render { config } => {
            let cfg = OverlayRenderConfig::load_json(&config)?;
            let report = render_from_config(&cfg)?;
            print_summary(&report);
        }
        Command::Overlay(args) => {
            let report = render_from_config(&args.into_config())?;
            print_summary(&report);
        }
        Command::InitConfig {
            out,
            image,
            detections,
        } => {
            let cfg = OverlayRenderConfig {
                image_path: image,
                detections_path: detections,
                output_path: None,
                report_path: None,
                params: OverlayParams::default(),
            };
            cfg.write_json(&out)?;
            println!("wrote {}", out.display());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
