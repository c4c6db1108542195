use clap::ValueEnum;

use super::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayMode {
    /// Vertical bars from the baseline up to the trace
    Bars,
    /// One intensity glyph per cell at the trace height
    Glyphs,
}

/// colorous gradients usable as bar fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Palette {
    Turbo,
    Inferno,
    Viridis,
}

impl Palette {
    pub fn gradient(self) -> colorous::Gradient {
        match self {
            Palette::Turbo => colorous::TURBO,
            Palette::Inferno => colorous::INFERNO,
            Palette::Viridis => colorous::VIRIDIS,
        }
    }

    pub fn eval(self, level: f32) -> Color {
        self.gradient()
            .eval_continuous(level.clamp(0.0, 1.0) as f64)
            .into()
    }
}

/// Everything the renderer needs, passed at call time.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub trace: Color,
    pub peak: Color,
    pub label: Color,
    pub grid: Color,
    pub mode: DisplayMode,
    /// Colour bars by level instead of the flat trace color.
    pub palette: Option<Palette>,
    /// Fixed (min, max) dB scale; None scales to each sweep.
    pub db_range: Option<(f32, f32)>,
    /// Plot inset used for labels, dropped when the frame is too small.
    pub margin: u32,
    pub grid_divisions: u32,
    pub freq_ticks: u32,
    /// Peak search radius in columns.
    pub peak_window: usize,
    /// Minimum normalized level for a peak marker.
    pub peak_threshold: f32,
    pub title: bool,
    /// Drawn top-right in the label colour, e.g. the sweep time.
    pub caption: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            background: Color::rgb(10, 10, 20),
            trace: Color::rgb(0, 255, 100),
            peak: Color::rgb(255, 50, 50),
            label: Color::rgb(100, 255, 200),
            grid: Color::rgb(30, 30, 50),
            mode: DisplayMode::Bars,
            palette: None,
            db_range: None,
            margin: 100,
            grid_divisions: 5,
            freq_ticks: 6,
            peak_window: 16,
            peak_threshold: 0.6,
            title: true,
            caption: None,
        }
    }
}

impl RenderConfig {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}
