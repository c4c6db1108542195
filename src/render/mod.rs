//! Sweep-to-image rendering.
//!
//! [`render`] is a pure function of the samples and a [`RenderConfig`]:
//! background, grid, trace (bars or glyphs), peak markers, then labels.
//! Higher power is drawn higher, row 0 being the strongest column.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use thiserror::Error;

use crate::sweep::Sample;

mod color;
mod config;
mod frame;
mod text;
mod trace;

pub use color::{Color, ParseColorError};
pub use config::{DisplayMode, Palette, RenderConfig};
pub use frame::Frame;
pub use text::render_text;
pub use trace::{level_to_row, PowerRange, Trace, DB_EPSILON};

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Intensity ramp for glyph mode, weakest first.
pub const GLYPH_RAMP: &[u8] = b".:-=+*#%@";

// smallest plot that is worth giving up the margins for
const MIN_PLOT: u32 = 32;

/// Plot rectangle inside the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    labelled: bool,
}

impl Layout {
    fn of(config: &RenderConfig) -> Self {
        let needed = config.margin.saturating_mul(2).saturating_add(MIN_PLOT);
        if config.margin > 0 && config.width > needed && config.height > needed {
            Self {
                left: config.margin,
                top: config.margin,
                width: config.width - 2 * config.margin,
                height: config.height - 2 * config.margin,
                labelled: true,
            }
        } else {
            Self {
                left: 0,
                top: 0,
                width: config.width,
                height: config.height,
                labelled: false,
            }
        }
    }

    fn bottom(&self) -> u32 {
        self.top + self.height
    }
}

fn font_for(config: &RenderConfig) -> &'static MonoFont<'static> {
    if config.height >= 600 {
        &FONT_10X20
    } else {
        &FONT_6X10
    }
}

fn check_size(config: &RenderConfig) -> Result<(), RenderError> {
    if config.width == 0 || config.height == 0 {
        return Err(RenderError::InvalidInput(format!(
            "frame size must be positive, got {}x{}",
            config.width, config.height
        )));
    }
    Ok(())
}

fn paint<T>(frame: &mut Frame, item: &T)
where
    T: Drawable<Color = Rgb888>,
{
    match item.draw(frame) {
        Ok(_) => {}
        Err(never) => match never {},
    }
}

fn point(x: u32, y: u32) -> Point {
    Point::new(x as i32, y as i32)
}

/// Renders one sweep into a new frame of exactly `config.width` x
/// `config.height` pixels.
pub fn render(samples: &[Sample], config: &RenderConfig) -> Result<Frame, RenderError> {
    check_size(config)?;
    let layout = Layout::of(config);
    let trace = Trace::compute(samples, layout.width, config)?;

    let mut frame = Frame::new(config.width, config.height, config.background);
    draw_grid(&mut frame, &layout, config);
    match config.mode {
        DisplayMode::Bars => draw_bars(&mut frame, &layout, &trace, config),
        DisplayMode::Glyphs => draw_glyphs(&mut frame, &layout, &trace, config),
    }
    draw_peaks(&mut frame, &layout, &trace, config);
    if layout.labelled {
        draw_labels(&mut frame, &layout, &trace, config);
    }
    Ok(frame)
}

/// Background with a centred message, shown before the first sweep arrives.
pub fn render_placeholder(config: &RenderConfig, message: &str) -> Result<Frame, RenderError> {
    check_size(config)?;
    let mut frame = Frame::new(config.width, config.height, config.background);
    let font = font_for(config);
    let text_width = message.len() as u32 * font.character_size.width;
    let x = (config.width / 2).saturating_sub(text_width / 2);
    let style = MonoTextStyle::new(font, config.label.into());
    paint(
        &mut frame,
        &Text::with_baseline(message, point(x, config.height / 2), style, Baseline::Middle),
    );
    Ok(frame)
}

// pixel offset of division i out of n across a span of len pixels
fn division(len: u32, i: u32, n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    ((len.saturating_sub(1) as f64) * i as f64 / n as f64).round() as u32
}

fn draw_grid(frame: &mut Frame, layout: &Layout, config: &RenderConfig) {
    let style = PrimitiveStyle::with_stroke(config.grid.into(), 1);
    let right = layout.left + layout.width - 1;
    let bottom = layout.bottom() - 1;

    for i in 0..=config.grid_divisions {
        let x = layout.left + division(layout.width, i, config.grid_divisions);
        paint(
            frame,
            &Line::new(point(x, layout.top), point(x, bottom)).into_styled(style),
        );

        let y = layout.top + division(layout.height, i, config.grid_divisions);
        paint(
            frame,
            &Line::new(point(layout.left, y), point(right, y)).into_styled(style),
        );
    }
}

fn fill_color(level: f32, config: &RenderConfig) -> Color {
    match config.palette {
        Some(palette) => palette.eval(level),
        None => config.trace,
    }
}

fn draw_bars(frame: &mut Frame, layout: &Layout, trace: &Trace, config: &RenderConfig) {
    for x in 0..trace.columns() {
        let row = trace.row(x, layout.height);
        let color = fill_color(trace.level[x], config);
        let bar = Rectangle::new(
            point(layout.left + x as u32, layout.top + row),
            Size::new(1, layout.height - row),
        );
        paint(frame, &bar.into_styled(PrimitiveStyle::with_fill(color.into())));
    }
}

fn glyph_for(level: f32) -> char {
    let last = (GLYPH_RAMP.len() - 1) as f32;
    GLYPH_RAMP[(level.clamp(0.0, 1.0) * last).round() as usize] as char
}

// glyph cell holding column x: (first column, level, row)
fn glyph_cell(trace: &Trace, x: usize, layout: &Layout, font: &MonoFont) -> (usize, f32, u32) {
    let cell = font.character_size.width as usize;
    let start = x - x % cell;
    let end = (start + cell).min(trace.columns());
    let level = trace.level[start..end]
        .iter()
        .copied()
        .fold(0.0, f32::max);
    // keep the glyph inside the plot
    let row = level_to_row(level, layout.height)
        .min(layout.height.saturating_sub(font.character_size.height));
    (start, level, row)
}

fn draw_glyphs(frame: &mut Frame, layout: &Layout, trace: &Trace, config: &RenderConfig) {
    let font = font_for(config);
    let cell = font.character_size.width as usize;

    for x in (0..trace.columns()).step_by(cell) {
        let (start, level, row) = glyph_cell(trace, x, layout, font);
        let mut buf = [0u8; 4];
        let glyph = glyph_for(level).encode_utf8(&mut buf);
        let style = MonoTextStyle::new(font, fill_color(level, config).into());
        paint(
            frame,
            &Text::with_baseline(
                glyph,
                point(layout.left + start as u32, layout.top + row),
                style,
                Baseline::Top,
            ),
        );
    }
}

fn draw_peaks(frame: &mut Frame, layout: &Layout, trace: &Trace, config: &RenderConfig) {
    let length = (layout.height / 40).max(1);
    for &x in &trace.peaks {
        // in glyph mode the marker sits on the glyph of its cell
        let row = match config.mode {
            DisplayMode::Bars => trace.row(x, layout.height),
            DisplayMode::Glyphs => glyph_cell(trace, x, layout, font_for(config)).2,
        };
        let length = length.min(layout.height - row);
        let marker = Rectangle::new(
            point(layout.left + x as u32, layout.top + row),
            Size::new(1, length),
        );
        paint(frame, &marker.into_styled(PrimitiveStyle::with_fill(config.peak.into())));
    }
}

fn draw_labels(frame: &mut Frame, layout: &Layout, trace: &Trace, config: &RenderConfig) {
    let font = font_for(config);
    let style = MonoTextStyle::new(font, config.label.into());
    let char_width = font.character_size.width;
    let pad = font.character_size.height / 2;

    // frequency axis
    let ticks = config.freq_ticks;
    for i in 0..ticks {
        let (offset, freq) = if ticks > 1 {
            let t = i as f64 / (ticks - 1) as f64;
            (
                division(layout.width, i, ticks - 1),
                trace.freq_low + (trace.freq_high - trace.freq_low) * t,
            )
        } else {
            (layout.width / 2, (trace.freq_low + trace.freq_high) / 2.0)
        };
        let label = format!("{:.1}", freq / 1e6);
        let x = (layout.left + offset).saturating_sub(label.len() as u32 * char_width / 2);
        paint(
            frame,
            &Text::with_baseline(&label, point(x, layout.bottom() + pad), style, Baseline::Top),
        );
    }

    // power axis
    let range = trace.range;
    for (db, y) in [
        (range.max, layout.top),
        ((range.min + range.max) / 2.0, layout.top + layout.height / 2),
        (range.min, layout.bottom() - 1),
    ] {
        let label = format!("{:.1}", db);
        let x = layout
            .left
            .saturating_sub(pad + label.len() as u32 * char_width);
        paint(
            frame,
            &Text::with_baseline(&label, point(x, y), style, Baseline::Middle),
        );
    }

    if config.title {
        let title = format!(
            "SPECTRUM: {:.1} - {:.1} MHz",
            trace.freq_low / 1e6,
            trace.freq_high / 1e6
        );
        paint(
            frame,
            &Text::with_baseline(&title, point(layout.left, layout.top / 2), style, Baseline::Middle),
        );
    }

    if let Some(caption) = &config.caption {
        let x = (layout.left + layout.width).saturating_sub(caption.len() as u32 * char_width);
        paint(
            frame,
            &Text::with_baseline(caption, point(x, layout.top / 2), style, Baseline::Middle),
        );
    }
}
