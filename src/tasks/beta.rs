use crate::{
    env::Env,
    tasks::{
        canvas::{self, ensure_dir, plot_path, Figure},
        color::{
            get_color_from_label, BASELINE_STROKE_WIDTH, FONT_SIZE, LABEL_FONT_SIZE, LEGEND_SIZE,
            MARKER_SIZE, PLOT_SIZE, SHADE_OPACITY, STROKE_WIDTH, TITLE_FONT_SIZE,
        },
        shading,
        style::{self, LineStyle},
        summary::{Statistic, SummaryArgs, SummaryTable},
        OutputArgs,
    },
};
use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use std::path::PathBuf;

/// Horizontal padding around the first and last batch size, in category units.
const X_PAD: f64 = 0.3;

#[derive(Debug, Args)]
pub struct BetaArgs {
    #[command(flatten)]
    pub summary: SummaryArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

/// How a summary row is drawn, both on the chart and in the legend.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesStyle {
    pub stat: Statistic,
    pub color: RGBColor,
    pub line: LineStyle,
    pub width: u32,
    pub marker: bool,
}

/// Baselines first, then the percentile bands top-down.
pub fn series_styles() -> Result<Vec<SeriesStyle>> {
    let black = get_color_from_label("black")?;
    let mut styles = vec![
        SeriesStyle {
            stat: Statistic::Traffic,
            color: black,
            line: LineStyle::Dotted,
            width: BASELINE_STROKE_WIDTH,
            marker: false,
        },
        SeriesStyle {
            stat: Statistic::Space,
            color: black,
            line: LineStyle::DashDot,
            width: BASELINE_STROKE_WIDTH,
            marker: false,
        },
        SeriesStyle {
            stat: Statistic::Avg,
            color: black,
            line: LineStyle::Dashed,
            width: BASELINE_STROKE_WIDTH,
            marker: false,
        },
    ];

    for (stat, color) in Statistic::iter_bands().zip(["blue", "orange", "green", "red", "purple"]) {
        styles.push(SeriesStyle {
            stat: *stat,
            color: get_color_from_label(color)?,
            line: LineStyle::Solid,
            width: STROKE_WIDTH,
            marker: true,
        });
    }

    Ok(styles)
}

/// Area between two rows, shaded where `upper >= lower`.
pub struct Highlight {
    pub lower: Statistic,
    pub upper: Statistic,
    pub color: &'static str,
}

pub static HIGHLIGHTS: [Highlight; 2] = [
    // Efficient traffic: the average beta beats the theta overhead
    Highlight {
        lower: Statistic::Traffic,
        upper: Statistic::Avg,
        color: "yellow",
    },
    // Efficient space: even the 5th percentile beats theta / alpha
    Highlight {
        lower: Statistic::Space,
        upper: Statistic::P5,
        color: "magenta",
    },
];

fn draw_styled<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    line: &[(i32, i32)],
    markers: &[(i32, i32)],
    style: &SeriesStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let stroke = style.color.stroke_width(style.width);
    for dash in style::dash_segments(line, style.line.pattern()) {
        root.draw(&PathElement::new(dash, stroke))?;
    }

    if style.marker {
        for point in markers {
            root.draw(&Circle::new(*point, MARKER_SIZE, style.color.filled()))?;
        }
    }

    Ok(())
}

/// Beta summary of one trace across batch sizes.
pub struct BetaFigure<'a> {
    pub table: &'a SummaryTable,
    pub styles: &'a [SeriesStyle],
}

impl Figure for BetaFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let batches = self.table.batch_sizes();
        let xs: Vec<f64> = (0..batches.len()).map(|x| x as f64).collect();
        let x_max = batches.len().saturating_sub(1) as f64;
        let (y_min, y_max) = self.table.value_range();
        let y_pad = ((y_max - y_min) * 0.05).max(0.05);

        let mut chart = ChartBuilder::on(root)
            .caption(&self.table.trace, ("sans-serif", TITLE_FONT_SIZE).into_font())
            .margin(20)
            .margin_right(40)
            .x_label_area_size(100)
            .y_label_area_size(120)
            .build_cartesian_2d(-X_PAD..x_max + X_PAD, (y_min - y_pad)..(y_max + y_pad))?;

        chart
            .configure_mesh()
            .light_line_style(WHITE)
            .disable_x_mesh()
            .x_labels(0)
            .y_labels(8)
            .y_label_style(("sans-serif", FONT_SIZE).into_font())
            .y_label_formatter(&|y| format!("{:.2}", y))
            .axis_desc_style(("sans-serif", LABEL_FONT_SIZE).into_font())
            .x_desc("batch size")
            .y_desc("β = B/b")
            .draw()?;

        // Batch sizes are categories: label each one below its position
        let label_style = TextStyle::from(("sans-serif", FONT_SIZE).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        for (x, batch) in xs.iter().zip(&batches) {
            let (x_px, y_px) = chart.plotting_area().map_coordinate(&(*x, y_min - y_pad));
            root.draw(&Text::new(
                batch.to_string(),
                (x_px, y_px + 8),
                label_style.clone(),
            ))?;
        }

        // Shade first so that the lines stay on top
        for highlight in &HIGHLIGHTS {
            let lower = self.table.row(highlight.lower);
            let upper = self.table.row(highlight.upper);
            let mask = shading::desirable_mask(&upper, &lower);
            let fill = get_color_from_label(highlight.color)?
                .mix(SHADE_OPACITY)
                .filled();

            let regions = shading::shaded_regions(&xs, &lower, &upper, &mask)?;
            chart.draw_series(
                regions
                    .into_iter()
                    .map(move |points| Polygon::new(points, fill)),
            )?;
        }

        for style in self.styles {
            let pixels: Vec<(i32, i32)> = xs
                .iter()
                .zip(self.table.row(style.stat))
                .map(|(x, y)| chart.plotting_area().map_coordinate(&(*x, y)))
                .collect();
            draw_styled(root, &pixels, &pixels, style)?;
        }

        Ok(())
    }
}

/// Stand-alone legend for the beta charts.
pub struct LegendFigure<'a> {
    pub styles: &'a [SeriesStyle],
}

impl Figure for LegendFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        const PAD: i32 = 20;
        const ROW_HEIGHT: i32 = 45;
        const SAMPLE_LEN: i32 = 80;

        root.fill(&WHITE)?;

        let (width, height) = root.dim_in_pixel();
        root.draw(&Rectangle::new(
            [(1, 1), (width as i32 - 2, height as i32 - 2)],
            BLACK.stroke_width(2),
        ))?;

        let title_style = TextStyle::from(("sans-serif", LABEL_FONT_SIZE).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new("Legend", (width as i32 / 2, PAD), title_style))?;

        let label_style = TextStyle::from(("sans-serif", FONT_SIZE).into_font())
            .pos(Pos::new(HPos::Left, VPos::Center));
        let y_orig = PAD + LABEL_FONT_SIZE + PAD;
        for (idx, style) in self.styles.iter().enumerate() {
            let y = y_orig + idx as i32 * ROW_HEIGHT + ROW_HEIGHT / 2;
            let line = [(2 * PAD, y), (2 * PAD + SAMPLE_LEN, y)];
            let marker = [(2 * PAD + SAMPLE_LEN / 2, y)];

            draw_styled(root, &line, &marker, style)?;
            root.draw(&Text::new(
                style.stat.to_string(),
                (3 * PAD + SAMPLE_LEN, y),
                label_style.clone(),
            ))?;
        }

        Ok(())
    }
}

/// File stem of the per-trace chart, e.g. `beta_ny19A_2.0`.
pub fn file_stem(trace: &str, alpha: f64) -> String {
    format!("beta_{trace}_{}", float_name(alpha))
}

/// Shortest round-tripping float text, with the exponent written as a signed
/// two-digit number (`1e-05`, `1.5e+16`) so that names stay the same as the
/// ones already produced for these experiments.
fn float_name(value: f64) -> String {
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

pub const LEGEND_FILE_STEM: &str = "beta_legend";

/// Render one beta chart per trace plus the shared legend. Returns the paths
/// of the generated images, legend last.
pub fn plot_beta(args: &BetaArgs) -> Result<Vec<PathBuf>> {
    let data_root = Env::data_root(args.summary.input.data_dir.as_deref())?;
    let plots_root = Env::plots_root(args.output.plots_dir.as_deref())?;
    ensure_dir(&plots_root)?;

    let alpha = args.summary.alpha;
    let format = args.output.format;
    let styles = series_styles()?;

    let pb = ProgressBar::new(args.summary.traces.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("=>-"),
    );

    let mut generated = Vec::new();
    for trace in &args.summary.traces {
        pb.set_message(trace.clone());

        let table = SummaryTable::load(&data_root, trace, &args.summary.batches, alpha)?;
        let path = plot_path(&plots_root, &file_stem(trace, alpha), format);
        canvas::render(
            &BetaFigure {
                table: &table,
                styles: &styles,
            },
            &path,
            format,
            PLOT_SIZE,
        )?;
        generated.push(path);

        pb.inc(1);
    }
    pb.finish_and_clear();

    let legend_path = plot_path(&plots_root, LEGEND_FILE_STEM, format);
    canvas::render(
        &LegendFigure { styles: &styles },
        &legend_path,
        format,
        LEGEND_SIZE,
    )?;
    generated.push(legend_path);

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_styles_cover_every_statistic_once() {
        let styles = series_styles().unwrap();
        assert_eq!(styles.len(), Statistic::iter_variants().len());
        for stat in Statistic::iter_variants() {
            assert_eq!(styles.iter().filter(|s| s.stat == *stat).count(), 1);
        }
    }

    #[test]
    fn test_baselines_are_distinct_black_lines() {
        let styles = series_styles().unwrap();
        let black = get_color_from_label("black").unwrap();

        let baselines: Vec<&SeriesStyle> = styles.iter().take(3).collect();
        assert_eq!(
            baselines.iter().map(|s| s.stat).collect::<Vec<_>>(),
            vec![Statistic::Traffic, Statistic::Space, Statistic::Avg]
        );
        assert!(baselines.iter().all(|s| s.color == black && !s.marker));
        assert_eq!(baselines[0].line, LineStyle::Dotted);
        assert_eq!(baselines[1].line, LineStyle::DashDot);
        assert_eq!(baselines[2].line, LineStyle::Dashed);
        assert!(styles.iter().skip(3).all(|s| s.marker && s.line == LineStyle::Solid));
    }

    #[test]
    fn test_file_stem_keeps_float_alpha() {
        assert_eq!(file_stem("ny19A", 2.0), "beta_ny19A_2.0");
        assert_eq!(file_stem("SJ14.small", 0.75), "beta_SJ14.small_0.75");
    }

    #[test]
    fn test_file_stem_pads_exponents() {
        assert_eq!(file_stem("ny19A", 1e-5), "beta_ny19A_1e-05");
        assert_eq!(file_stem("ny19A", 1.5e16), "beta_ny19A_1.5e+16");
        assert_eq!(file_stem("ny19A", 2.5e-123), "beta_ny19A_2.5e-123");
        assert_eq!(file_stem("ny19A", 0.0001), "beta_ny19A_0.0001");
    }

    #[test]
    fn test_highlights() {
        assert_eq!(HIGHLIGHTS[0].lower, Statistic::Traffic);
        assert_eq!(HIGHLIGHTS[0].upper, Statistic::Avg);
        assert_eq!(HIGHLIGHTS[1].lower, Statistic::Space);
        assert_eq!(HIGHLIGHTS[1].upper, Statistic::P5);
        for highlight in &HIGHLIGHTS {
            assert!(get_color_from_label(highlight.color).is_ok());
        }
    }
}
