use crate::sweep::Sample;

use super::{DisplayMode, RenderConfig, RenderError, Trace};

// weakest to strongest
const SHADES: [char; 4] = ['░', '▒', '▓', '█'];
const PEAK: char = '^';

fn shade(level: f32) -> char {
    let last = (SHADES.len() - 1) as f32;
    SHADES[(level.clamp(0.0, 1.0) * last).round() as usize]
}

/// Plain-character rendering of one sweep, `rows` lines of `columns`
/// characters. Uses the mode, dB range and peak settings of `config`;
/// its pixel size is ignored.
pub fn render_text(
    samples: &[Sample],
    columns: u32,
    rows: u32,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    if rows == 0 {
        return Err(RenderError::InvalidInput("text plot has no rows".into()));
    }
    let trace = Trace::compute(samples, columns, config)?;
    let tops: Vec<u32> = (0..trace.columns()).map(|x| trace.row(x, rows)).collect();

    let mut out = String::with_capacity((columns as usize * 3 + 1) * rows as usize);
    for y in 0..rows {
        for (x, top) in tops.iter().enumerate() {
            let c = if y == *top && trace.is_peak(x) {
                PEAK
            } else {
                match config.mode {
                    DisplayMode::Bars if y >= *top => shade(trace.level[x]),
                    DisplayMode::Glyphs if y == *top => shade(trace.level[x]),
                    _ => ' ',
                }
            };
            out.push(c);
        }
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> Vec<Sample> {
        vec![
            Sample::new(100.0, -80.0),
            Sample::new(150.0, -40.0),
            Sample::new(200.0, -90.0),
        ]
    }

    #[test]
    fn bars_stack_from_the_bottom() {
        let text = render_text(&sweep(), 3, 5, &RenderConfig::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], " ^ ");
        // -80 dB is 0.2 of the range, one row above the floor
        assert_eq!(lines[3], "▒█ ");
        assert_eq!(lines[4], "▒█░");
    }

    #[test]
    fn glyphs_mark_only_the_top() {
        let config = RenderConfig {
            mode: DisplayMode::Glyphs,
            ..RenderConfig::default()
        };
        let text = render_text(&sweep(), 3, 5, &config).unwrap();
        let marks = text.chars().filter(|c| !c.is_whitespace()).count();
        assert_eq!(marks, 3);
    }

    #[test]
    fn rejects_empty_input() {
        let config = RenderConfig::default();
        assert!(render_text(&[], 3, 5, &config).is_err());
        assert!(render_text(&sweep(), 3, 0, &config).is_err());
    }
}
