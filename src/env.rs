use anyhow::Result;
use log::error;
use std::{
    env,
    path::{Path, PathBuf},
};

/// Traces and batch sizes the measurement pipeline produced error files for.
pub const ERROR_TRACES: [&str; 3] = ["Chicago1610Mil", "ny19A", "SJ14.small"];
pub const ERROR_BATCHES: [u32; 4] = [100, 500, 2000, 4000];

/// Traces and batch sizes the measurement pipeline produced beta files for.
pub const BETA_TRACES: [&str; 5] = [
    "Chicago16Small",
    "Chicago1610Mil",
    "ny19A",
    "ny19B",
    "SJ14.small",
];
pub const BETA_BATCHES: [u32; 7] = [50, 100, 250, 500, 1000, 2000, 4000];

pub struct Env {}

impl Env {
    pub const DATA_DIR: &'static str = "outfiles";
    pub const PLOTS_DIR: &'static str = "plots";

    pub fn proj_root() -> Result<PathBuf> {
        env::current_dir().map_err(|e| {
            let reason = format!("failed to get current directory (error={e:?})");
            error!("{reason}");
            anyhow::anyhow!(reason)
        })
    }

    pub fn data_root(overwrite: Option<&Path>) -> Result<PathBuf> {
        match overwrite {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(Self::proj_root()?.join(Self::DATA_DIR)),
        }
    }

    pub fn plots_root(overwrite: Option<&Path>) -> Result<PathBuf> {
        match overwrite {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(Self::proj_root()?.join(Self::PLOTS_DIR)),
        }
    }

    /// Per-crash-position error summary: `<data>/<trace>/<trace>_<batch>_error.csv`
    pub fn error_csv_path(data_root: &Path, trace: &str, batch: u32) -> PathBuf {
        let mut path = data_root.to_path_buf();
        path.push(trace);
        path.push(format!("{trace}_{batch}_error.csv"));
        path
    }

    /// Per-batch beta samples: `<data>/<trace>/<trace>_<batch>.csv`
    pub fn batch_csv_path(data_root: &Path, trace: &str, batch: u32) -> PathBuf {
        let mut path = data_root.to_path_buf();
        path.push(trace);
        path.push(format!("{trace}_{batch}.csv"));
        path
    }
}
