// List the different tasks here
pub mod bars;
pub mod beta;
pub mod canvas;
pub mod color;
pub mod loader;
pub mod shading;
pub mod stats;
pub mod style;
pub mod summary;

use crate::tasks::canvas::ImageFormat;
use clap::Args;
use std::path::PathBuf;

/// Where to read the measurement CSV files from.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Root directory of the `<trace>/<trace>_<batch>[_error].csv` files
    /// (defaults to ./outfiles)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Where, and in which format, to write the generated images.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Directory to write images to (defaults to ./plots)
    #[arg(long)]
    pub plots_dir: Option<PathBuf>,
    /// Image format of the generated plots
    #[arg(long, value_enum, default_value_t = ImageFormat::Png)]
    pub format: ImageFormat,
}
