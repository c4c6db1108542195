//! Persisting frames and handing them to the desktop.

use std::path::{Path, PathBuf};
use std::process::Command;

use clap::ValueEnum;
use image::ImageFormat;
use log::{debug, info};
use thiserror::Error;

use crate::render::Frame;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot pick an image format for {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to move {path} into place: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum WallpaperError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Status {
        command: String,
        status: std::process::ExitStatus,
    },
    #[error("custom wallpaper command is empty")]
    EmptyCommand,
}

/// Writes `frame` to `path`, format chosen by the extension. The image is
/// encoded next to the target and renamed over it, so readers never see a
/// half-written file.
pub fn save_frame(frame: &Frame, path: &Path) -> Result<(), PersistError> {
    let format = ImageFormat::from_path(path).map_err(|source| PersistError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    frame
        .image()
        .save_with_format(&tmp, format)
        .map_err(|source| PersistError::Encode {
            path: tmp.clone(),
            source,
        })?;
    std::fs::rename(&tmp, path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("wrote {}", path.display());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// gsettings picture-uri and picture-uri-dark
    Gnome,
    /// feh --bg-fill
    Feh,
    /// --wallpaper-command with {path} replaced
    Command,
    /// Only write the image
    FileOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallpaperSetter {
    pub backend: Backend,
    /// Used by [`Backend::Command`], split on whitespace.
    pub command: Option<String>,
}

impl WallpaperSetter {
    /// The commands that set `path` as the background, in order.
    pub fn commands(&self, path: &Path) -> Result<Vec<Vec<String>>, WallpaperError> {
        let path = path.display().to_string();
        Ok(match self.backend {
            Backend::Gnome => {
                let uri = format!("file://{}", path);
                ["picture-uri", "picture-uri-dark"]
                    .iter()
                    .map(|key| {
                        vec![
                            "gsettings".to_string(),
                            "set".to_string(),
                            "org.gnome.desktop.background".to_string(),
                            key.to_string(),
                            uri.clone(),
                        ]
                    })
                    .collect()
            }
            Backend::Feh => vec![vec!["feh".to_string(), "--bg-fill".to_string(), path]],
            Backend::Command => {
                let template = self.command.as_deref().unwrap_or("");
                let argv: Vec<String> = template
                    .split_whitespace()
                    .map(|arg| arg.replace("{path}", &path))
                    .collect();
                if argv.is_empty() {
                    return Err(WallpaperError::EmptyCommand);
                }
                vec![argv]
            }
            Backend::FileOnly => Vec::new(),
        })
    }

    pub fn apply(&self, path: &Path) -> Result<(), WallpaperError> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        for argv in self.commands(&path)? {
            let command = argv.join(" ");
            debug!("running {}", command);
            let status = Command::new(&argv[0])
                .args(&argv[1..])
                .status()
                .map_err(|source| WallpaperError::Spawn {
                    command: command.clone(),
                    source,
                })?;
            if !status.success() {
                return Err(WallpaperError::Status { command, status });
            }
        }
        if self.backend != Backend::FileOnly {
            info!("Wallpaper updated: {}", path.display());
        }
        Ok(())
    }
}
