use crate::{
    env::Env,
    tasks::{
        loader::{self, BatchRecord},
        stats::{self, PERCENTILES},
        InputArgs,
    },
};
use anyhow::Result;
use clap::Args;
use log::{debug, error};
use std::{fmt, path::Path};

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Load-factor threshold of the data structure, used to derive the space
    /// baseline (theta / alpha)
    #[arg(value_parser = parse_alpha)]
    pub alpha: f64,
    /// Traces to summarise
    #[arg(long, value_delimiter = ',', default_values = crate::env::BETA_TRACES)]
    pub traces: Vec<String>,
    /// Batch sizes to summarise, in x-axis order
    #[arg(long, value_delimiter = ',', default_values_t = crate::env::BETA_BATCHES)]
    pub batches: Vec<u32>,
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn parse_alpha(arg: &str) -> Result<f64, String> {
    let alpha: f64 = arg
        .parse()
        .map_err(|e| format!("invalid alpha '{arg}': {e}"))?;
    if !alpha.is_finite() || alpha <= 0.0 {
        return Err(format!("alpha must be a positive number (got {arg})"));
    }

    Ok(alpha)
}

/// Rows of the per-trace summary table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Statistic {
    Traffic,
    Space,
    Avg,
    P5,
    P25,
    P50,
    P75,
    P95,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Traffic => write!(f, "traffic"),
            Statistic::Space => write!(f, "space"),
            Statistic::Avg => write!(f, "avg"),
            Statistic::P5 => write!(f, "5%"),
            Statistic::P25 => write!(f, "25%"),
            Statistic::P50 => write!(f, "50%"),
            Statistic::P75 => write!(f, "75%"),
            Statistic::P95 => write!(f, "95%"),
        }
    }
}

impl Statistic {
    pub fn iter_variants() -> std::slice::Iter<'static, Statistic> {
        static VARIANTS: [Statistic; 8] = [
            Statistic::Traffic,
            Statistic::Space,
            Statistic::Avg,
            Statistic::P5,
            Statistic::P25,
            Statistic::P50,
            Statistic::P75,
            Statistic::P95,
        ];
        VARIANTS.iter()
    }

    /// Percentile bands, top-down, in the order they are drawn.
    pub fn iter_bands() -> std::slice::Iter<'static, Statistic> {
        static BANDS: [Statistic; 5] = [
            Statistic::P95,
            Statistic::P75,
            Statistic::P50,
            Statistic::P25,
            Statistic::P5,
        ];
        BANDS.iter()
    }
}

/// Summary of the beta samples of a single (trace, batch) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchSummary {
    pub batch: u32,
    /// Traffic baseline: theta of the batch
    pub traffic: f64,
    /// Space baseline: theta / alpha
    pub space: f64,
    pub avg: f64,
    pub percentiles: [f64; PERCENTILES.len()],
}

impl BatchSummary {
    pub fn from_records(batch: u32, records: &[BatchRecord], alpha: f64) -> Result<Self> {
        let Some(first) = records.first() else {
            let reason = format!("no samples to summarise (batch={batch})");
            error!("{reason}");
            anyhow::bail!(reason);
        };

        let betas: Vec<f64> = records.iter().map(|r| r.beta).collect();
        let theta = first.theta;

        Ok(Self {
            batch,
            traffic: theta,
            space: stats::round4(stats::space_baseline(theta, alpha)),
            avg: stats::round4(stats::mean(&betas)?),
            percentiles: stats::percentiles(&betas)?,
        })
    }

    pub fn get(&self, stat: Statistic) -> f64 {
        match stat {
            Statistic::Traffic => self.traffic,
            Statistic::Space => self.space,
            Statistic::Avg => self.avg,
            Statistic::P5 => self.percentiles[0],
            Statistic::P25 => self.percentiles[1],
            Statistic::P50 => self.percentiles[2],
            Statistic::P75 => self.percentiles[3],
            Statistic::P95 => self.percentiles[4],
        }
    }
}

/// Pivot table of one trace: a column per batch size, a row per statistic.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryTable {
    pub trace: String,
    pub columns: Vec<BatchSummary>,
}

impl SummaryTable {
    pub fn load(data_root: &Path, trace: &str, batches: &[u32], alpha: f64) -> Result<Self> {
        let mut columns = Vec::with_capacity(batches.len());
        for &batch in batches {
            let csv_path = Env::batch_csv_path(data_root, trace, batch);
            let records = loader::load_batch_records(&csv_path)?;
            columns.push(BatchSummary::from_records(batch, &records, alpha)?);
        }

        let table = Self {
            trace: trace.to_string(),
            columns,
        };
        debug!("summary for {trace} (alpha={alpha}):\n{table}");

        Ok(table)
    }

    pub fn batch_sizes(&self) -> Vec<u32> {
        self.columns.iter().map(|c| c.batch).collect()
    }

    pub fn row(&self, stat: Statistic) -> Vec<f64> {
        self.columns.iter().map(|c| c.get(stat)).collect()
    }

    /// Smallest and largest value across all statistic rows.
    pub fn value_range(&self) -> (f64, f64) {
        Statistic::iter_variants()
            .flat_map(|stat| self.row(*stat))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = 10;

        write!(f, "{:<width$}", "batch-size")?;
        for column in &self.columns {
            write!(f, "{:>width$}", column.batch)?;
        }
        writeln!(f)?;

        for stat in Statistic::iter_variants() {
            write!(f, "{:<width$}", stat.to_string())?;
            for column in &self.columns {
                write!(f, "{:>width$.4}", column.get(*stat))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

pub fn print_summary(args: &SummaryArgs) -> Result<()> {
    let data_root = Env::data_root(args.input.data_dir.as_deref())?;

    for trace in &args.traces {
        let table = SummaryTable::load(&data_root, trace, &args.batches, args.alpha)?;
        println!("trace: {trace} (alpha={:?})", args.alpha);
        println!("{table}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(theta: f64, betas: &[f64]) -> Vec<BatchRecord> {
        betas
            .iter()
            .map(|&beta| BatchRecord { theta, beta })
            .collect()
    }

    #[test]
    fn test_batch_summary() {
        let summary =
            BatchSummary::from_records(100, &records(10.0, &[1.0, 2.0, 3.0, 4.0, 100.0]), 2.0)
                .unwrap();

        assert_eq!(summary.traffic, 10.0);
        assert_eq!(summary.space, 5.0);
        assert_eq!(summary.avg, 22.0);
        assert_eq!(summary.get(Statistic::P50), 3.0);
        assert!((summary.get(Statistic::P5) - 1.2).abs() < 1e-9);
        assert!((summary.get(Statistic::P95) - 80.8).abs() < 1e-9);
    }

    #[test]
    fn test_bands_read_their_percentile() {
        let summary =
            BatchSummary::from_records(100, &records(1.0, &[0.0, 100.0]), 1.0).unwrap();

        for (stat, p) in Statistic::iter_bands().zip([95.0, 75.0, 50.0, 25.0, 5.0]) {
            assert!((summary.get(*stat) - p).abs() < 1e-9, "{stat}");
        }
    }

    #[test]
    fn test_batch_summary_rounds_baselines() {
        let summary =
            BatchSummary::from_records(50, &records(1.1875, &[1.0, 1.0, 2.0]), 0.3).unwrap();

        assert_eq!(summary.space, 3.9583);
        assert_eq!(summary.avg, 1.3333);
        assert_eq!(summary.traffic, 1.1875);
    }

    #[test]
    fn test_theta_taken_from_first_row() {
        let mut rows = records(2.0, &[1.0]);
        rows.push(BatchRecord {
            theta: 4.0,
            beta: 1.0,
        });

        let summary = BatchSummary::from_records(10, &rows, 1.0).unwrap();
        assert_eq!(summary.traffic, 2.0);
    }

    #[test]
    fn test_empty_batch_fails() {
        assert!(BatchSummary::from_records(10, &[], 1.0).is_err());
    }

    #[test]
    fn test_rows_follow_batch_order() {
        let table = SummaryTable {
            trace: "t".to_string(),
            columns: vec![
                BatchSummary::from_records(50, &records(1.0, &[3.0]), 1.0).unwrap(),
                BatchSummary::from_records(100, &records(2.0, &[1.0]), 1.0).unwrap(),
            ],
        };

        assert_eq!(table.batch_sizes(), vec![50, 100]);
        assert_eq!(table.row(Statistic::Traffic), vec![1.0, 2.0]);
        assert_eq!(table.row(Statistic::Avg), vec![3.0, 1.0]);
        assert_eq!(table.value_range(), (1.0, 3.0));

        let text = table.to_string();
        assert!(text.starts_with("batch-size"));
        assert_eq!(text.lines().count(), 1 + Statistic::iter_variants().len());
    }

    #[test]
    fn test_parse_alpha() {
        assert_eq!(parse_alpha("0.75"), Ok(0.75));
        assert!(parse_alpha("0").is_err());
        assert!(parse_alpha("-1").is_err());
        assert!(parse_alpha("inf").is_err());
        assert!(parse_alpha("abc").is_err());
    }
}
