use crate::{
    env::{Env, ERROR_BATCHES, ERROR_TRACES},
    tasks::{
        canvas::{self, ensure_dir, plot_path, Figure},
        color::{get_color_from_label, FONT_SIZE, LABEL_FONT_SIZE, PLOT_SIZE, TITLE_FONT_SIZE},
        loader::{self, ErrorRecord},
        InputArgs, OutputArgs,
    },
};
use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error};
use plotters::{coord::Shift, prelude::*};
use std::{fmt, path::PathBuf};

/// Width of a single bar, in category units.
const BAR_WIDTH: f64 = 0.4;

#[derive(Debug, Args)]
pub struct BarsArgs {
    /// Traces to plot
    #[arg(long, value_delimiter = ',', default_values = ERROR_TRACES)]
    pub traces: Vec<String>,
    /// Batch sizes to plot
    #[arg(long, value_delimiter = ',', default_values_t = ERROR_BATCHES)]
    pub batches: Vec<u32>,
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// The two comparisons drawn for every (trace, batch) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarView {
    /// Sketch and backup estimates against the true count
    Backup,
    /// Recovered estimate (backup + B) against the sketch and the true count
    Recovery,
}

impl fmt::Display for BarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarView::Backup => write!(f, "backup"),
            BarView::Recovery => write!(f, "recovery"),
        }
    }
}

impl BarView {
    pub fn iter_variants() -> std::slice::Iter<'static, BarView> {
        static VARIANTS: [BarView; 2] = [BarView::Backup, BarView::Recovery];
        VARIANTS.iter()
    }

    pub fn file_stem(&self, trace: &str, batch: u32) -> String {
        format!("MRE_{self}_{trace}_{batch}")
    }

    fn series(&self) -> [(&'static str, fn(&ErrorRecord) -> f64); 2] {
        match self {
            BarView::Backup => [
                ("CMS vs true", |r: &ErrorRecord| r.cms_true),
                ("Backup vs true", |r: &ErrorRecord| r.hist_true),
            ],
            BarView::Recovery => [
                ("Recovery vs CMS", |r: &ErrorRecord| r.rec_cms),
                ("Recovery vs true", |r: &ErrorRecord| r.rec_true),
            ],
        }
    }

    fn legend_position(&self) -> SeriesLabelPosition {
        match self {
            BarView::Backup => SeriesLabelPosition::UpperLeft,
            BarView::Recovery => SeriesLabelPosition::LowerRight,
        }
    }
}

pub struct BarSeries {
    pub label: &'static str,
    pub values: Vec<f64>,
    pub color: RGBColor,
}

/// Grouped bar chart: two bars per crash position.
pub struct BarFigure {
    pub view: BarView,
    pub title: String,
    pub categories: Vec<u64>,
    pub series: [BarSeries; 2],
}

impl BarFigure {
    pub fn new(view: BarView, trace: &str, batch: u32, records: &[ErrorRecord]) -> Result<Self> {
        if records.is_empty() {
            let reason = format!("no crash positions to plot (trace={trace}, batch={batch})");
            error!("{reason}");
            anyhow::bail!(reason);
        }

        let [(first_label, first), (second_label, second)] = view.series();
        Ok(Self {
            view,
            title: format!("{trace}, B={batch}"),
            categories: records.iter().map(|r| r.crash_item).collect(),
            series: [
                BarSeries {
                    label: first_label,
                    values: records.iter().map(first).collect(),
                    color: get_color_from_label("blue")?,
                },
                BarSeries {
                    label: second_label,
                    values: records.iter().map(second).collect(),
                    color: get_color_from_label("orange")?,
                },
            ],
        })
    }

    fn y_max(&self) -> f64 {
        let max = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max);
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }
}

impl Figure for BarFigure {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let num_categories = self.categories.len() as f64;
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", TITLE_FONT_SIZE).into_font())
            .margin(20)
            .x_label_area_size(220)
            .y_label_area_size(120)
            .build_cartesian_2d(-0.2..num_categories, 0f64..self.y_max())?;

        chart
            .configure_mesh()
            .light_line_style(WHITE)
            .disable_x_mesh()
            .x_labels(0)
            .y_labels(10)
            .y_label_style(("sans-serif", FONT_SIZE).into_font())
            .y_label_formatter(&|y| format!("{:.2}", y))
            .axis_desc_style(("sans-serif", LABEL_FONT_SIZE).into_font())
            .x_desc("Crash after Item#")
            .y_desc("Mean Relative Error")
            .draw()?;

        for (idx, series) in self.series.iter().enumerate() {
            let color = series.color;
            let x_offset = idx as f64 * BAR_WIDTH;

            chart
                .draw_series(series.values.iter().enumerate().map(move |(x, y)| {
                    let x_orig = x as f64 + x_offset;
                    Rectangle::new([(x_orig, 0.0), (x_orig + BAR_WIDTH, *y)], color.filled())
                }))?
                .label(series.label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 8), (x + 16, y + 8)], color.filled()));
        }

        // Crash positions under each pair of bars, rotated so that long
        // item counts do not overlap
        for (x, category) in self.categories.iter().enumerate() {
            let (x_px, y_px) = chart
                .plotting_area()
                .map_coordinate(&(x as f64 + BAR_WIDTH, 0.0));
            root.draw(&Text::new(
                thousands(*category),
                (x_px + FONT_SIZE / 2, y_px + 10),
                ("sans-serif", FONT_SIZE)
                    .into_font()
                    .transform(FontTransform::Rotate90)
                    .color(&BLACK),
            ))?;
        }

        chart
            .configure_series_labels()
            .position(self.view.legend_position())
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", FONT_SIZE).into_font())
            .draw()?;

        Ok(())
    }
}

/// Format an item count with thousands separators, e.g. `1,000,000`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(ch);
    }

    formatted
}

/// Render the backup and recovery bar charts of every (trace, batch) pair.
/// Returns the paths of the generated images.
pub fn plot_bars(args: &BarsArgs) -> Result<Vec<PathBuf>> {
    let data_root = Env::data_root(args.input.data_dir.as_deref())?;
    let plots_root = Env::plots_root(args.output.plots_dir.as_deref())?;
    ensure_dir(&plots_root)?;

    let pb = ProgressBar::new((args.traces.len() * args.batches.len()) as u64);
    pb.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("=>-"),
    );

    let mut generated = Vec::new();
    for trace in &args.traces {
        for &batch in &args.batches {
            pb.set_message(format!("{trace} (B={batch})"));

            let csv_path = Env::error_csv_path(&data_root, trace, batch);
            debug!("plotting bars from: {}", csv_path.display());
            let records = loader::load_error_records(&csv_path)?;

            for view in BarView::iter_variants() {
                let figure = BarFigure::new(*view, trace, batch, &records)?;
                let path = plot_path(
                    &plots_root,
                    &view.file_stem(trace, batch),
                    args.output.format,
                );
                canvas::render(&figure, &path, args.output.format, PLOT_SIZE)?;
                generated.push(path);
            }

            pb.inc(1);
        }
    }
    pb.finish_and_clear();

    Ok(generated)
}
