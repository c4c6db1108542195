use log::{debug, info};

mod cli;
pub mod render;
pub mod source;
pub mod sweep;
pub mod wallpaper;

pub use cli::{Params, RenderParams, SweepParams, Tool, WallpaperParams};

use crate::source::SweepSource;
use crate::sweep::{Sweep, SweepError};

/// Runs one sweep on `source`.
pub fn run_sweep(source: &mut dyn SweepSource) -> Result<Sweep, SweepError> {
    debug!("starting sweep on {}", source.name());
    let sweep = source.sweep()?;
    info!("{}", sweep.pretty_print());
    Ok(sweep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::Sample;

    struct Fixed(Vec<Sample>);

    impl SweepSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn sweep(&mut self) -> Result<Sweep, SweepError> {
            if self.0.is_empty() {
                return Err(SweepError::Empty);
            }
            Ok(Sweep {
                hz_low: 0,
                hz_high: 2,
                hz_bin_width: 1.0,
                samples: self.0.clone(),
            })
        }
    }

    #[test]
    fn run_sweep_passes_through_source() {
        let mut source = Fixed(vec![Sample::new(0.0, -3.0), Sample::new(1.0, -1.0)]);
        let sweep = run_sweep(&mut source).unwrap();
        assert_eq!(sweep.max_db(), -1.0);

        let mut empty = Fixed(Vec::new());
        assert!(matches!(run_sweep(&mut empty), Err(SweepError::Empty)));
    }
}
