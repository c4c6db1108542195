use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Args, CommandFactory, Parser, ValueEnum};
use log::info;

use crate::render::{Color, DisplayMode, Palette, RenderConfig};
use crate::source::{CsvFile, HackRfSweep, RtlPower, SweepSource};
use crate::wallpaper::{Backend, WallpaperSetter};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Params {
    #[command(flatten)]
    pub sweep: SweepParams,

    #[command(flatten)]
    pub render: RenderParams,

    #[command(flatten)]
    pub wallpaper: WallpaperParams,
}

impl Params {
    /// Parses the command line, exiting with a usage error on bad input.
    pub fn parse_checked() -> Self {
        let params = Self::parse();
        if let Err(e) = params.check() {
            e.exit();
        }
        params
    }

    /// Rejects combinations clap cannot express on its own.
    pub fn check(&self) -> Result<(), clap::Error> {
        if let Some((min, max)) = self.render.min_db.zip(self.render.max_db) {
            if min >= max {
                return Err(Self::command().error(
                    ErrorKind::ValueValidation,
                    format!("--min-db ({}) must be below --max-db ({})", min, max),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tool {
    RtlPower,
    HackrfSweep,
}

#[derive(Args, Debug, Clone)]
pub struct SweepParams {
    /// External sweep tool
    #[arg(long, value_enum, default_value_t = Tool::RtlPower)]
    pub tool: Tool,

    /// Read sweeps from a CSV written by a running tool instead
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Minimum frequency in MHz
    #[arg(long, default_value_t = 88)]
    pub freq_min: u32,

    /// Maximum frequency in MHz
    #[arg(long, default_value_t = 108)]
    pub freq_max: u32,

    /// FFT bin width (frequency resolution) in Hz
    #[arg(short = 'w', long, default_value_t = 10000)]
    pub bin_width: u32,

    /// Tuner gain in dB (rtl_power: 0-50, automatic if unset; hackrf_sweep: VGA 0-62, default 14)
    #[arg(short = 'g', long)]
    pub gain: Option<u8>,

    /// RX LNA (IF) gain, 0-40dB, 8dB steps (hackrf_sweep)
    #[arg(short = 'l', long, default_value_t = 32)]
    pub lna_gain: u8,

    /// RX RF amplifier 1=Enable, 0=Disable (hackrf_sweep)
    #[arg(short = 'a', long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub amp_enable: u8,

    /// Antenna port power, 1=Enable, 0=Disable (hackrf_sweep)
    #[arg(short = 'p', long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub antenna_enable: u8,

    /// Integration time per sweep in seconds (rtl_power)
    #[arg(short = 'i', long, default_value_t = 2)]
    pub integration: u32,
}

impl SweepParams {
    pub fn source(&self) -> Box<dyn SweepSource> {
        if let Some(path) = &self.input_file {
            return Box::new(CsvFile { path: path.clone() });
        }
        match self.tool {
            Tool::RtlPower => Box::new(RtlPower {
                freq_min_hz: self.freq_min as u64 * 1_000_000,
                freq_max_hz: self.freq_max as u64 * 1_000_000,
                bin_width: self.bin_width,
                gain: self.gain,
                integration_secs: self.integration,
            }),
            Tool::HackrfSweep => Box::new(HackRfSweep {
                freq_min: self.freq_min,
                freq_max: self.freq_max,
                bin_width: self.bin_width,
                gain: self.gain.unwrap_or(14),
                lna_gain: self.lna_gain,
                amp_enable: self.amp_enable == 1,
                antenna_enable: self.antenna_enable == 1,
            }),
        }
    }

    pub fn pretty_print(&self) {
        info!("Sweep Parameters:");
        match &self.input_file {
            Some(path) => info!("Source: {}", path.display()),
            None => info!("Source: {:?}", self.tool),
        }
        info!(
            "RX gain: {}, IF {} dB, RF AMP {}",
            self.gain
                .map_or("auto".to_string(), |g| format!("{} dB", g)),
            self.lna_gain,
            if self.amp_enable == 1 {
                "ON (14dB)"
            } else {
                "OFF"
            }
        );
        info!("FFT bin width: {}", self.bin_width);
        info!("Frequency range: {} - {} MHz", self.freq_min, self.freq_max);
        info!(
            "Expected samples per sweep: ~{}",
            (self.freq_max.saturating_sub(self.freq_min) as f32 * 1_000_000.0)
                / (self.bin_width as f32)
        );
        info!("Antenna port power: {}", self.antenna_enable);
    }
}

#[derive(Args, Debug, Clone)]
pub struct RenderParams {
    /// Image width in pixels
    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 1080)]
    pub height: u32,

    #[arg(long, value_enum, default_value_t = DisplayMode::Bars)]
    pub mode: DisplayMode,

    /// Colour bars with a gradient instead of --trace-color
    #[arg(long, value_enum)]
    pub palette: Option<Palette>,

    #[arg(long, default_value_t = Color::rgb(10, 10, 20))]
    pub background_color: Color,

    #[arg(long, default_value_t = Color::rgb(0, 255, 100))]
    pub trace_color: Color,

    #[arg(long, default_value_t = Color::rgb(255, 50, 50))]
    pub peak_color: Color,

    #[arg(long, default_value_t = Color::rgb(100, 255, 200))]
    pub label_color: Color,

    #[arg(long, default_value_t = Color::rgb(30, 30, 50))]
    pub grid_color: Color,

    /// Minimum dB value for visualization, automatic if unset
    #[arg(long, requires = "max_db", allow_negative_numbers = true)]
    pub min_db: Option<f32>,

    /// Maximum dB value for visualization, automatic if unset
    #[arg(long, requires = "min_db", allow_negative_numbers = true)]
    pub max_db: Option<f32>,

    /// Border around the plot for labels, in pixels
    #[arg(long, default_value_t = 100)]
    pub margin: u32,

    /// Peak search radius in pixel columns
    #[arg(long, default_value_t = 16)]
    pub peak_window: usize,

    /// Minimum normalized height (0-1) for a peak marker
    #[arg(long, default_value_t = 0.6)]
    pub peak_threshold: f32,

    /// Leave out the title line
    #[arg(long)]
    pub no_title: bool,
}

impl RenderParams {
    pub fn config(&self) -> RenderConfig {
        RenderConfig {
            width: self.width,
            height: self.height,
            background: self.background_color,
            trace: self.trace_color,
            peak: self.peak_color,
            label: self.label_color,
            grid: self.grid_color,
            mode: self.mode,
            palette: self.palette,
            db_range: self.min_db.zip(self.max_db),
            margin: self.margin,
            peak_window: self.peak_window,
            peak_threshold: self.peak_threshold,
            title: !self.no_title,
            ..RenderConfig::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct WallpaperParams {
    /// Image path, the extension picks the format [default: ~/.rf_spectrum_wallpaper.png]
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// How to set the desktop background
    #[arg(long, value_enum, default_value_t = Backend::Gnome)]
    pub backend: Backend,

    /// Command for --backend command, `{path}` is replaced by the image path
    #[arg(long, required_if_eq("backend", "command"))]
    pub wallpaper_command: Option<String>,

    /// Seconds between wallpaper updates
    #[arg(long, default_value_t = 5)]
    pub interval: u64,

    /// Run a single sweep and exit
    #[arg(long)]
    pub once: bool,

    /// Also print the spectrum as text on stdout
    #[arg(long)]
    pub ascii: bool,
}

impl WallpaperParams {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir)
                .join(".rf_spectrum_wallpaper.png")
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn setter(&self) -> WallpaperSetter {
        WallpaperSetter {
            backend: self.backend,
            command: self.wallpaper_command.clone(),
        }
    }

    pub fn pretty_print(&self) {
        info!("Wallpaper path: {}", self.output_path().display());
        info!("Backend: {:?}", self.backend);
        info!("Update interval: {}s", self.interval);
    }
}
