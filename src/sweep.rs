/*
2024-05-31, 16:05:22.927896, 0, 5000000, 1000000.00, 20, -14.27, -26.26, -44.80, -53.68, -67.87
2024-05-31, 16:05:22.927896, 10000000, 15000000, 1000000.00, 20, -60.02, -62.46, -67.40, -58.20, -52.93
2024-05-31, 16:05:22.927896, 5000000, 10000000, 1000000.00, 20, -76.03, -66.01, -63.60, -57.54, -63.42
2024-05-31, 16:05:22.927896, 15000000, 20000000, 1000000.00, 20, -61.49, -109.87, -66.22, -43.76, -32.66
 */

// Date, Time, Hz Low, Hz High, Hz bin width, Num Samples, dB, dB, dB, dB, dB, [...], dB
// rtl_power and hackrf_sweep share this layout.

use std::collections::HashSet;

use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Status {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("malformed sweep line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("sweep output contained no samples")]
    Empty,
    #[error("failed to read sweep file: {0}")]
    Io(#[from] std::io::Error),
}

/// One (frequency, power) measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub freq_hz: f64,
    pub power_db: f32,
}

impl Sample {
    pub fn new(freq_hz: f64, power_db: f32) -> Self {
        Self { freq_hz, power_db }
    }
}

#[derive(Debug)]
struct SweepLine {
    hz_low: u64,
    hz_high: u64,
    hz_bin_width: f64,
    db: Vec<f32>,
}

// single line of the tool output
// this is not the complete spectrum, only one hop of it
impl SweepLine {
    fn from_line(index: usize, line: &str) -> Result<Self, SweepError> {
        let parse_err = |reason: String| SweepError::Parse {
            line: index + 1,
            reason,
        };

        let parts: Vec<&str> = line.split(',').map(|x| x.trim()).collect();
        if parts.len() < 7 {
            return Err(parse_err(format!("expected at least 7 fields, got {}", parts.len())));
        }

        let hz_low = parts[2]
            .parse::<u64>()
            .map_err(|e| parse_err(format!("hz_low {:?}: {}", parts[2], e)))?;
        let hz_high = parts[3]
            .parse::<u64>()
            .map_err(|e| parse_err(format!("hz_high {:?}: {}", parts[3], e)))?;
        let hz_bin_width = parts[4]
            .parse::<f64>()
            .map_err(|e| parse_err(format!("bin width {:?}: {}", parts[4], e)))?;
        if !(hz_bin_width > 0.0) {
            return Err(parse_err(format!("bin width must be positive, got {}", hz_bin_width)));
        }
        let db = parts[6..]
            .iter()
            .map(|x| {
                x.parse::<f32>()
                    .map_err(|e| parse_err(format!("dB value {:?}: {}", x, e)))
            })
            .collect::<Result<Vec<f32>, SweepError>>()?;

        Ok(Self {
            hz_low,
            hz_high,
            hz_bin_width,
            db,
        })
    }

    fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.db.iter().enumerate().map(move |(i, db)| {
            Sample::new(self.hz_low as f64 + i as f64 * self.hz_bin_width, *db)
        })
    }
}

// the complete spectrum
#[derive(Debug, Clone)]
pub struct Sweep {
    pub hz_low: u64,
    pub hz_high: u64,
    pub hz_bin_width: f64,
    pub samples: Vec<Sample>,
}

impl Sweep {
    fn from_lines(mut lines: Vec<SweepLine>) -> Result<Self, SweepError> {
        // hops do not arrive in frequency order
        lines.sort_by_key(|line| line.hz_low);

        let mut samples: Vec<Sample> = Vec::new();
        for sample in lines.iter().flat_map(|line| line.samples()) {
            if !sample.power_db.is_finite() {
                continue;
            }
            // overlapping hops repeat frequencies, keep the first
            if samples
                .last()
                .is_some_and(|last| sample.freq_hz <= last.freq_hz)
            {
                continue;
            }
            samples.push(sample);
        }

        if samples.is_empty() {
            return Err(SweepError::Empty);
        }

        Ok(Self {
            hz_low: lines.iter().map(|l| l.hz_low).min().unwrap_or(0),
            hz_high: lines.iter().map(|l| l.hz_high).max().unwrap_or(0),
            hz_bin_width: lines[0].hz_bin_width,
            samples,
        })
    }

    fn parse_lines(output: &str) -> Result<Vec<SweepLine>, SweepError> {
        output
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| SweepLine::from_line(i, line))
            .collect()
    }

    /// Merges every line of one `-1` run into a single sweep.
    pub fn from_tool_output(output: &str) -> Result<Self, SweepError> {
        Self::from_lines(Self::parse_lines(output)?)
    }

    /// Keeps only the most recent sweep of a continuously appended CSV.
    ///
    /// Lines are read from the end until a hop repeats, since every hop
    /// occurs once per sweep whatever order the tool writes them in. A last
    /// line without its newline is still being written and is skipped, as
    /// are damaged lines before the first usable one.
    pub fn from_latest_lines(output: &str) -> Result<Self, SweepError> {
        let complete = output.rfind('\n').map_or("", |end| &output[..end]);

        let mut hops = HashSet::new();
        let mut latest = Vec::new();
        for (i, line) in complete.lines().collect::<Vec<_>>().into_iter().enumerate().rev() {
            if line.trim().is_empty() {
                continue;
            }
            match SweepLine::from_line(i, line) {
                Ok(parsed) => {
                    if !hops.insert(parsed.hz_low) {
                        break;
                    }
                    latest.push(parsed);
                }
                Err(e) if latest.is_empty() => debug!("skipping {}", e),
                Err(_) => break,
            }
        }

        Self::from_lines(latest)
    }

    pub fn min_db(&self) -> f32 {
        self.samples
            .iter()
            .map(|s| s.power_db)
            .fold(f32::INFINITY, f32::min)
    }

    pub fn max_db(&self) -> f32 {
        self.samples
            .iter()
            .map(|s| s.power_db)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn pretty_print(&self) -> String {
        format!(
            "Sweep: {} Hz - {} Hz, {} Hz bin width, {} samples, max {} dB, min {} dB",
            self.hz_low,
            self.hz_high,
            self.hz_bin_width,
            self.samples.len(),
            self.max_db(),
            self.min_db()
        )
    }
}
