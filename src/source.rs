//! Where sweeps come from. The loop only sees [`SweepSource`]; the external
//! tools are invoked once per sweep in single-shot mode.

use std::path::PathBuf;
use std::process::Command;

use log::debug;

use crate::sweep::{Sweep, SweepError};

pub trait SweepSource: Send {
    fn name(&self) -> &str;
    fn sweep(&mut self) -> Result<Sweep, SweepError>;
}

fn run(program: &str, args: &[String]) -> Result<String, SweepError> {
    let command = format!("{} {}", program, args.join(" "));
    debug!("running {}", command);

    let out = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| SweepError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !out.status.success() {
        return Err(SweepError::Status {
            command,
            status: out.status,
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/*
> rtl_power
    -f lower:upper:bin_size [Hz]
    -i integration_interval (default: 10 seconds)
    -g tuner_gain (default: automatic)
    -1 enables single-shot mode (default: off)
    filename (a '-' dumps samples to stdout)
 */
#[derive(Debug, Clone, PartialEq)]
pub struct RtlPower {
    pub freq_min_hz: u64,
    pub freq_max_hz: u64,
    pub bin_width: u32,
    /// None lets the tuner pick.
    pub gain: Option<u8>,
    pub integration_secs: u32,
}

impl RtlPower {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            format!("{}:{}:{}", self.freq_min_hz, self.freq_max_hz, self.bin_width),
            "-i".to_string(),
            self.integration_secs.to_string(),
        ];
        if let Some(gain) = self.gain {
            args.push("-g".to_string());
            args.push(gain.to_string());
        }
        args.push("-1".to_string());
        args.push("-".to_string());
        args
    }
}

impl SweepSource for RtlPower {
    fn name(&self) -> &str {
        "rtl_power"
    }

    fn sweep(&mut self) -> Result<Sweep, SweepError> {
        let output = run("rtl_power", &self.args())?;
        Sweep::from_tool_output(&output)
    }
}

/*
> hackrf_sweep
        [-a amp_enable] # RX RF amplifier 1=Enable, 0=Disable
        [-f freq_min:freq_max] # minimum and maximum frequencies in MHz
        [-p antenna_enable] # Antenna port power, 1=Enable, 0=Disable
        [-l gain_db] # RX LNA (IF) gain, 0-40dB, 8dB steps
        [-g gain_db] # RX VGA (baseband) gain, 0-62dB, 2dB steps
        [-w bin_width] # FFT bin width (frequency resolution) in Hz, 2445-5000000
        [-1] # one shot mode
 */
#[derive(Debug, Clone, PartialEq)]
pub struct HackRfSweep {
    /// MHz, the tool only takes whole megahertz.
    pub freq_min: u32,
    pub freq_max: u32,
    pub bin_width: u32,
    pub gain: u8,
    pub lna_gain: u8,
    pub amp_enable: bool,
    pub antenna_enable: bool,
}

impl HackRfSweep {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-1".to_string(),
            format!("-g{}", self.gain),
            format!("-l{}", self.lna_gain),
            "-w".to_string(),
            self.bin_width.to_string(),
            "-f".to_string(),
            format!("{}:{}", self.freq_min, self.freq_max),
        ];
        if self.amp_enable {
            args.push("-a1".to_string());
        }
        if self.antenna_enable {
            args.push("-p1".to_string());
        }
        args
    }
}

impl SweepSource for HackRfSweep {
    fn name(&self) -> &str {
        "hackrf_sweep"
    }

    fn sweep(&mut self) -> Result<Sweep, SweepError> {
        // the complete spectrum is the merge of all the lines
        let output = run("hackrf_sweep", &self.args())?;
        Sweep::from_tool_output(&output)
    }
}

/// CSV appended to by a long-running sweep tool; each read takes the most
/// recent sweep in it.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFile {
    pub path: PathBuf,
}

impl SweepSource for CsvFile {
    fn name(&self) -> &str {
        "csv file"
    }

    fn sweep(&mut self) -> Result<Sweep, SweepError> {
        let contents = std::fs::read_to_string(&self.path)?;
        Sweep::from_latest_lines(&contents)
    }
}
