use std::path::Path;
use std::{sync::mpsc::channel, thread};

use chrono::Local;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};

use rf_spectrum_wallpaper::{
    render::{render, render_placeholder, render_text, RenderConfig},
    run_sweep,
    sweep::Sweep,
    wallpaper::{save_frame, WallpaperSetter},
    Params,
};

const ASCII_COLUMNS: u32 = 80;
const ASCII_ROWS: u32 = 20;

struct Output<'a> {
    config: &'a RenderConfig,
    path: &'a Path,
    setter: &'a WallpaperSetter,
    ascii: bool,
}

impl Output<'_> {
    // render, persist, refresh
    fn update(&self, sweep: &Sweep) -> Result<()> {
        let config = RenderConfig {
            caption: Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            ..self.config.clone()
        };
        let frame = render(&sweep.samples, &config).wrap_err("skipping this sweep")?;
        if self.ascii {
            let text = render_text(&sweep.samples, ASCII_COLUMNS, ASCII_ROWS, self.config)?;
            println!("{}", text);
        }
        save_frame(&frame, self.path)?;
        self.setter.apply(self.path)?;
        Ok(())
    }

    fn waiting(&self) -> Result<()> {
        let frame = render_placeholder(self.config, "Waiting for sweep data...")?;
        save_frame(&frame, self.path)?;
        self.setter.apply(self.path)?;
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let params = Params::parse_checked();
    params.sweep.pretty_print();
    params.wallpaper.pretty_print();

    let config = params.render.config();
    let path = params.wallpaper.output_path();
    let setter = params.wallpaper.setter();
    let output = Output {
        config: &config,
        path: &path,
        setter: &setter,
        ascii: params.wallpaper.ascii,
    };

    let mut source = params.sweep.source();

    if params.wallpaper.once {
        let sweep = run_sweep(source.as_mut())?;
        return output.update(&sweep);
    }

    if let Err(e) = output.waiting() {
        warn!("could not show placeholder: {:?}", e);
    }

    let (tx, rx) = channel();

    // the next sweep runs while the previous frame is written
    let interval = params.wallpaper.interval();
    let sender = thread::spawn(move || loop {
        let sw = run_sweep(source.as_mut());
        if tx.send(sw).is_err() {
            break;
        }
        thread::sleep(interval);
    });

    for result in rx {
        let updated = result
            .wrap_err("sweep failed")
            .and_then(|sweep| output.update(&sweep));
        if let Err(e) = updated {
            warn!("{:?}", e);
        }
    }

    info!("sweep thread stopped");
    sender
        .join()
        .map_err(|_| color_eyre::eyre::eyre!("the sweep thread has panicked"))?;
    Ok(())
}
