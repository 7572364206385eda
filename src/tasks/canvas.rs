use anyhow::Result;
use clap::ValueEnum;
use log::{error, info};
use plotters::{coord::Shift, prelude::*};
use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Svg => write!(f, "svg"),
        }
    }
}

/// Something that knows how to draw itself on any plotters backend.
pub trait Figure {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static;
}

/// `<plots_root>/<stem>.<format>`
pub fn plot_path(plots_root: &Path, stem: &str, format: ImageFormat) -> PathBuf {
    plots_root.join(format!("{stem}.{format}"))
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        let reason = format!("error creating directory (path={}, error={e:?})", dir.display());
        error!("{reason}");
        anyhow::anyhow!(reason)
    })
}

fn draw_and_present<DB, F>(figure: &F, root: DrawingArea<DB, Shift>, path: &Path) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    F: Figure,
{
    figure.draw(&root)?;
    root.present().map_err(|e| {
        let reason = format!("error writing plot (path={}, error={e:?})", path.display());
        error!("{reason}");
        anyhow::anyhow!(reason)
    })
}

pub fn render<F: Figure>(figure: &F, path: &Path, format: ImageFormat, size: (u32, u32)) -> Result<()> {
    match format {
        ImageFormat::Png => {
            draw_and_present(figure, BitMapBackend::new(path, size).into_drawing_area(), path)?
        }
        ImageFormat::Svg => {
            draw_and_present(figure, SVGBackend::new(path, size).into_drawing_area(), path)?
        }
    }

    info!("generated plot at: {}", path.display());
    Ok(())
}
