//! Column-wise reduction of a sweep: samples to per-column power, level and
//! peaks. Shared by the image and the plain-character renderers.

use crate::sweep::Sample;

use super::{RenderConfig, RenderError};

/// Width added to a degenerate power range, split evenly around it.
pub const DB_EPSILON: f32 = 1.0;

/// The dB interval mapped onto [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerRange {
    pub min: f32,
    pub max: f32,
}

impl PowerRange {
    pub fn of(samples: &[Sample]) -> Self {
        let (min, max) = samples.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY),
            |(lo, hi), s| (lo.min(s.power_db), hi.max(s.power_db)),
        );
        Self::widened(min, max)
    }

    fn widened(min: f32, max: f32) -> Self {
        if max - min < f32::EPSILON {
            let mid = (min + max) / 2.0;
            Self {
                min: mid - DB_EPSILON / 2.0,
                max: mid + DB_EPSILON / 2.0,
            }
        } else {
            Self { min, max }
        }
    }

    pub fn normalize(&self, db: f32) -> f32 {
        ((db - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// One sweep reduced to `columns` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub freq_low: f64,
    pub freq_high: f64,
    pub range: PowerRange,
    /// dB per column.
    pub power: Vec<f32>,
    /// Normalized power per column, 1.0 = top of the plot.
    pub level: Vec<f32>,
    /// Columns holding a local maximum, ascending.
    pub peaks: Vec<usize>,
}

impl Trace {
    /// `samples` must be in ascending frequency order, as [`Sweep`] keeps
    /// them.
    ///
    /// [`Sweep`]: crate::sweep::Sweep
    pub fn compute(
        samples: &[Sample],
        columns: u32,
        config: &RenderConfig,
    ) -> Result<Self, RenderError> {
        if samples.is_empty() {
            return Err(RenderError::InvalidInput("no samples in sweep".into()));
        }
        if columns == 0 {
            return Err(RenderError::InvalidInput("plot has no columns".into()));
        }

        let freq_low = samples[0].freq_hz;
        let freq_high = samples[samples.len() - 1].freq_hz;
        let range = match config.db_range {
            Some((min, max)) if min < max => PowerRange { min, max },
            _ => PowerRange::of(samples),
        };

        let columns = columns as usize;
        let step = if columns > 1 {
            (freq_high - freq_low) / (columns - 1) as f64
        } else {
            0.0
        };

        let power: Vec<f32> = (0..columns)
            .map(|x| {
                let center = if columns > 1 {
                    freq_low + step * x as f64
                } else {
                    (freq_low + freq_high) / 2.0
                };
                column_power(samples, center, step / 2.0)
            })
            .collect();

        let level: Vec<f32> = power.iter().map(|db| range.normalize(*db)).collect();
        let peaks = find_peaks(&power, &level, config.peak_window, config.peak_threshold);

        Ok(Self {
            freq_low,
            freq_high,
            range,
            power,
            level,
            peaks,
        })
    }

    pub fn columns(&self) -> usize {
        self.power.len()
    }

    /// Row of column `x` in a plot `rows` high; row 0 is the top.
    pub fn row(&self, x: usize, rows: u32) -> u32 {
        level_to_row(self.level[x], rows)
    }

    pub fn is_peak(&self, x: usize) -> bool {
        self.peaks.binary_search(&x).is_ok()
    }
}

pub fn level_to_row(level: f32, rows: u32) -> u32 {
    let span = rows.saturating_sub(1) as f32;
    ((1.0 - level.clamp(0.0, 1.0)) * span).round() as u32
}

// max of the samples inside [center - half, center + half], otherwise
// interpolate between the two samples around center
fn column_power(samples: &[Sample], center: f64, half: f64) -> f32 {
    let lo = samples.partition_point(|s| s.freq_hz < center - half);
    let hi = samples.partition_point(|s| s.freq_hz <= center + half);
    if lo < hi {
        return samples[lo..hi]
            .iter()
            .map(|s| s.power_db)
            .fold(f32::NEG_INFINITY, f32::max);
    }

    // lo == hi: first sample past the bin
    if lo == 0 {
        return samples[0].power_db;
    }
    if lo == samples.len() {
        return samples[lo - 1].power_db;
    }
    let (a, b) = (samples[lo - 1], samples[lo]);
    let t = ((center - a.freq_hz) / (b.freq_hz - a.freq_hz)) as f32;
    a.power_db + (b.power_db - a.power_db) * t.clamp(0.0, 1.0)
}

fn find_peaks(power: &[f32], level: &[f32], window: usize, threshold: f32) -> Vec<usize> {
    (0..power.len())
        .filter(|&x| {
            if level[x] < threshold {
                return false;
            }
            let start = x.saturating_sub(window);
            let end = x.saturating_add(window).saturating_add(1).min(power.len());
            let neighbourhood = &power[start..end];
            let lowest = neighbourhood.iter().copied().fold(f32::INFINITY, f32::min);
            // leftmost maximum wins ties, flat stretches have no peak
            power[x] > lowest
                && neighbourhood[..x - start].iter().all(|p| *p < power[x])
                && neighbourhood[x - start + 1..].iter().all(|p| *p <= power[x])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(points: &[(f64, f32)]) -> Vec<Sample> {
        points.iter().map(|(f, p)| Sample::new(*f, *p)).collect()
    }

    #[test]
    fn empty_sweep_is_invalid() {
        let config = RenderConfig::default();
        assert!(matches!(
            Trace::compute(&[], 10, &config),
            Err(RenderError::InvalidInput(_))
        ));
        let one = samples(&[(1.0, -1.0)]);
        assert!(matches!(
            Trace::compute(&one, 0, &config),
            Err(RenderError::InvalidInput(_))
        ));
    }

    #[test]
    fn interpolates_between_sparse_samples() {
        let sweep = samples(&[(0.0, -100.0), (100.0, 0.0)]);
        let trace = Trace::compute(&sweep, 5, &RenderConfig::default()).unwrap();
        assert_eq!(trace.power, vec![-100.0, -75.0, -50.0, -25.0, 0.0]);
        assert_eq!(trace.level, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn dense_columns_hold_the_maximum() {
        // 9 samples squeezed into 3 columns, the lone spike must survive
        let sweep: Vec<Sample> = (0..9)
            .map(|i| Sample::new(i as f64, if i == 3 { -10.0 } else { -80.0 }))
            .collect();
        let trace = Trace::compute(&sweep, 3, &RenderConfig::default()).unwrap();
        assert_eq!(trace.power, vec![-80.0, -10.0, -80.0]);
        assert_eq!(trace.peaks, vec![1]);
    }

    #[test]
    fn flat_sweep_sits_mid_height() {
        let sweep = samples(&[(1.0, -42.0), (2.0, -42.0), (3.0, -42.0)]);
        let trace = Trace::compute(&sweep, 7, &RenderConfig::default()).unwrap();
        assert_eq!(trace.range.max - trace.range.min, DB_EPSILON);
        assert!(trace.level.iter().all(|l| *l == 0.5));
        assert!(trace.peaks.is_empty());
        let rows: Vec<u32> = (0..7).map(|x| trace.row(x, 101)).collect();
        assert!(rows.iter().all(|r| *r == 50));
    }

    #[test]
    fn fixed_range_clamps_levels() {
        let config = RenderConfig {
            db_range: Some((-60.0, -20.0)),
            ..RenderConfig::default()
        };
        let sweep = samples(&[(0.0, -90.0), (1.0, -40.0), (2.0, 0.0)]);
        let trace = Trace::compute(&sweep, 3, &config).unwrap();
        assert_eq!(trace.level, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn peaks_respect_window_and_threshold() {
        let power = [-50.0, -10.0, -50.0, -50.0, -20.0, -50.0, -50.0, -50.0];
        let range = PowerRange { min: -50.0, max: -10.0 };
        let level: Vec<f32> = power.iter().map(|p| range.normalize(*p)).collect();

        assert_eq!(find_peaks(&power, &level, 1, 0.0), vec![1, 4]);
        // -20 dB lies inside the window of the -10 dB carrier
        assert_eq!(find_peaks(&power, &level, 3, 0.0), vec![1]);
        // -20 dB normalizes to 0.75
        assert_eq!(find_peaks(&power, &level, 1, 0.8), vec![1]);
    }

    #[test]
    fn oversized_window_covers_the_whole_sweep() {
        let sweep = samples(&[(0.0, -70.0), (1.0, -30.0), (2.0, -50.0), (3.0, -20.0)]);
        let config = RenderConfig {
            peak_window: usize::MAX,
            peak_threshold: 0.0,
            ..RenderConfig::default()
        };
        let trace = Trace::compute(&sweep, 4, &config).unwrap();
        assert_eq!(trace.peaks, vec![3]);
    }

    #[test]
    fn ties_mark_the_leftmost_column() {
        let power = [-30.0, -5.0, -5.0, -30.0];
        let level = [0.0, 1.0, 1.0, 0.0];
        assert_eq!(find_peaks(&power, &level, 2, 0.0), vec![1]);
    }

    #[test]
    fn rows_invert_levels() {
        assert_eq!(level_to_row(1.0, 100), 0);
        assert_eq!(level_to_row(0.0, 100), 99);
        assert_eq!(level_to_row(0.5, 101), 50);
        assert_eq!(level_to_row(0.3, 1), 0);
    }
}
