use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::lmul::Lmul;
use crate::report::{summary_table_rows, TABLE_HEADER};
use crate::summary::{Row, Summary};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::{debug, info};

const TITLE_FONT_SIZE: u32 = 40;
const CAPTION_FONT_SIZE: u32 = 24;
const LABEL_FONT_SIZE: u32 = 15;
const DATA_LABEL_FONT_SIZE: u32 = 12;
const FOOTER_HEIGHT: u32 = 36;

/// Fraction of a category slot taken up by its group of bars.
const GROUP_WIDTH: f64 = 0.8;

const OPERATION_COLORS: [RGBColor; 5] = [
    RGBColor(255, 107, 107),
    RGBColor(78, 205, 196),
    RGBColor(69, 183, 209),
    RGBColor(150, 206, 180),
    RGBColor(230, 190, 80),
];

const LMUL_COLORS: [RGBColor; 4] = [
    RGBColor(46, 134, 171),
    RGBColor(162, 59, 114),
    RGBColor(241, 143, 1),
    RGBColor(199, 62, 29),
];

// red / yellow / green, as in the usual diverging heatmap palette
const HEAT_LOW: (f64, f64, f64) = (215f64, 48f64, 39f64);
const HEAT_MID: (f64, f64, f64) = (255f64, 255f64, 191f64);
const HEAT_HIGH: (f64, f64, f64) = (26f64, 152f64, 80f64);
const HEAT_MAX_EFFICIENCY: f64 = 200f64;

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

pub fn operation_color(i: usize) -> RGBColor {
    OPERATION_COLORS[i % OPERATION_COLORS.len()]
}

pub fn lmul_color(lmul: Lmul) -> RGBColor {
    LMUL_COLORS[lmul.index()]
}

fn heat_color(t: f64) -> RGBColor {
    let t = t.max(0f64).min(1f64);
    let (from, to, s) = if t < 0.5 {
        (HEAT_LOW, HEAT_MID, t * 2f64)
    } else {
        (HEAT_MID, HEAT_HIGH, (t - 0.5) * 2f64)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * s).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// Heatmap cell color. 100% sits on yellow, 0% on red, 200% and above on green.
pub fn efficiency_color(efficiency: f64) -> RGBColor {
    heat_color(efficiency / HEAT_MAX_EFFICIENCY)
}

/// Same palette stretched over `low..=high`; a degenerate range is all yellow.
pub fn range_color(value: f64, low: f64, high: f64) -> RGBColor {
    if high > low {
        heat_color((value - low) / (high - low))
    } else {
        heat_color(0.5)
    }
}

/// Left and right edge of bar `member` of `members` in the category centered on `category`.
pub fn bar_span(category: usize, member: usize, members: usize) -> (f64, f64) {
    let bar_width = GROUP_WIDTH / members as f64;
    let offset = (member as f64 - (members as f64 - 1f64) / 2f64) * bar_width;
    let center = category as f64 + offset;
    (center - bar_width / 2f64 + 0.01, center + bar_width / 2f64 - 0.01)
}

/// Label for a categorical axis tick; ticks that fall between categories stay blank.
pub fn category_label<S: AsRef<str>>(names: &[S], x: f64) -> String {
    let idx = x.round();
    if idx < 0f64 || (x - idx).abs() > 0.3 {
        return String::new();
    }
    names
        .get(idx as usize)
        .map(|s| s.as_ref().to_string())
        .unwrap_or_default()
}

/// Top of a value axis, leaving headroom for the data labels.
pub fn axis_max<I: Iterator<Item = f64>>(values: I) -> f64 {
    let max = values.fold(0f64, f64::max);
    if max > 0f64 {
        max * 1.15
    } else {
        1f64
    }
}

fn lmul_names() -> Vec<&'static str> {
    Lmul::ALL.iter().map(|l| l.label()).collect()
}

fn draw_time_bars<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, summary: &Summary) -> Result<()> {
    let names: Vec<&str> = summary.operations().collect();
    let y_max = axis_max(
        summary
            .series
            .iter()
            .flat_map(|s| s.rows.iter().map(|r| r.time_ms)),
    );
    let mut chart = ChartBuilder::on(area)
        .caption("Execution Time by LMUL", ("sans-serif", CAPTION_FONT_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(names.len() as f64 - 0.5), 0f64..y_max)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len().max(1))
        .x_label_formatter(&|x| category_label(&names, *x))
        .y_desc("Time (ms)")
        .label_style(("sans-serif", LABEL_FONT_SIZE))
        .draw()
        .map_err(render_err)?;

    for &lmul in Lmul::ALL.iter() {
        let color = lmul_color(lmul);
        let bars = summary.series.iter().enumerate().map(|(i, s)| {
            let (left, right) = bar_span(i, lmul.index(), Lmul::ALL.len());
            Rectangle::new([(left, 0f64), (right, s.row(lmul).time_ms)], color.filled())
        });
        chart
            .draw_series(bars)
            .map_err(render_err)?
            .label(lmul.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
        let labels = summary.series.iter().enumerate().map(|(i, s)| {
            let (left, right) = bar_span(i, lmul.index(), Lmul::ALL.len());
            let time = s.row(lmul).time_ms;
            Text::new(
                format!("{:.2}", time),
                ((left + right) / 2f64, time),
                ("sans-serif", DATA_LABEL_FONT_SIZE)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Bottom)),
            )
        });
        chart.draw_series(labels).map_err(render_err)?;
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    Ok(())
}

/// One line per operation across the LMUL axis. `y_max` fixes the top of the axis,
/// otherwise it follows the data.
fn draw_metric_lines<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    summary: &Summary,
    caption: &str,
    y_desc: &str,
    value: fn(&Row) -> f64,
    y_max: Option<f64>,
) -> Result<()> {
    let names = lmul_names();
    let y_max = y_max.unwrap_or_else(|| {
        axis_max(summary.series.iter().flat_map(|s| s.rows.iter().map(value)))
    });
    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", CAPTION_FONT_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(names.len() as f64 - 0.5), 0f64..y_max)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_labels(names.len())
        .x_label_formatter(&|x| category_label(&names, *x))
        .x_desc("LMUL Configuration")
        .y_desc(y_desc)
        .label_style(("sans-serif", LABEL_FONT_SIZE))
        .draw()
        .map_err(render_err)?;

    for (i, series) in summary.series.iter().enumerate() {
        let color = operation_color(i);
        let points: Vec<(f64, f64)> = series
            .rows
            .iter()
            .map(|r| (r.lmul.index() as f64, value(r)))
            .collect();
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))
            .map_err(render_err)?
            .label(series.operation.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
        chart
            .draw_series(points.into_iter().map(|p| TriangleMarker::new(p, 6, color.filled())))
            .map_err(render_err)?;
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    Ok(())
}

fn draw_speedup_lines<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, summary: &Summary) -> Result<()> {
    let x_max = Lmul::LARGEST.theoretical_scaling() + 0.5;
    let y_max = axis_max(
        summary
            .series
            .iter()
            .flat_map(|s| s.rows.iter().map(|r| r.speedup))
            .chain(std::iter::once(Lmul::LARGEST.theoretical_scaling())),
    );
    let mut chart = ChartBuilder::on(area)
        .caption("Speedup vs LMUL=m1", ("sans-serif", CAPTION_FONT_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5..x_max, 0f64..y_max)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_labels(Lmul::LARGEST.multiplier() as usize + 1)
        .x_label_formatter(&|x| {
            Lmul::ALL
                .iter()
                .find(|l| (l.theoretical_scaling() - *x).abs() < 0.3)
                .map(|l| l.label().to_string())
                .unwrap_or_default()
        })
        .x_desc("LMUL Value")
        .y_desc("Speedup Factor")
        .label_style(("sans-serif", LABEL_FONT_SIZE))
        .draw()
        .map_err(render_err)?;

    for (i, series) in summary.series.iter().enumerate() {
        let color = operation_color(i);
        let points: Vec<(f64, f64)> = series
            .rows
            .iter()
            .map(|r| (r.lmul.theoretical_scaling(), r.speedup))
            .collect();
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))
            .map_err(render_err)?
            .label(series.operation.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, 5, color.filled())))
            .map_err(render_err)?;
    }
    chart
        .draw_series(LineSeries::new(
            Lmul::ALL
                .iter()
                .map(|l| (l.theoretical_scaling(), l.theoretical_scaling())),
            BLACK.stroke_width(2),
        ))
        .map_err(render_err)?
        .label("Theoretical (Linear)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    Ok(())
}

/// Speedup per LMUL on a base-2 log axis, evenly spaced configurations, theoretical line dashed.
fn draw_speedup_progression<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    summary: &Summary,
) -> Result<()> {
    let names = lmul_names();
    let speedups = || summary.series.iter().flat_map(|s| s.rows.iter().map(|r| r.speedup));
    let y_min = speedups().fold(1f64, f64::min) * 0.8;
    let y_max = speedups()
        .fold(Lmul::LARGEST.theoretical_scaling(), f64::max)
        * 1.3;
    let mut chart = ChartBuilder::on(area)
        .caption("LMUL Speedup Progression", ("sans-serif", CAPTION_FONT_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            -0.5..(names.len() as f64 - 0.5),
            (y_min..y_max).log_scale().base(2f64),
        )
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_labels(names.len())
        .x_label_formatter(&|x| category_label(&names, *x))
        .y_label_formatter(&|y| format!("{:.1}", y))
        .x_desc("LMUL Configuration")
        .y_desc("Speedup vs LMUL=m1")
        .label_style(("sans-serif", LABEL_FONT_SIZE))
        .draw()
        .map_err(render_err)?;

    for (i, series) in summary.series.iter().enumerate() {
        let color = operation_color(i);
        let points: Vec<(f64, f64)> = series
            .rows
            .iter()
            .map(|r| (r.lmul.index() as f64, r.speedup))
            .collect();
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))
            .map_err(render_err)?
            .label(series.operation.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, 5, color.filled())))
            .map_err(render_err)?;
    }
    let theoretical: Vec<(f64, f64)> = Lmul::ALL
        .iter()
        .map(|l| (l.index() as f64, l.theoretical_scaling()))
        .collect();
    chart
        .draw_series(DashedLineSeries::new(
            theoretical,
            8,
            6,
            BLACK.mix(0.7).stroke_width(2),
        ))
        .map_err(render_err)?
        .label("Theoretical (Linear)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    Ok(())
}

/// Operations down, LMULs across, one annotated cell per row of the summary.
fn draw_heatmap<DB: DrawingBackend, C: Fn(f64) -> RGBColor>(
    area: &DrawingArea<DB, Shift>,
    summary: &Summary,
    caption: &str,
    value: fn(&Row) -> f64,
    color: C,
    precision: usize,
) -> Result<()> {
    let lmuls = lmul_names();
    let names: Vec<&str> = summary.operations().collect();
    let n_ops = names.len();
    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", CAPTION_FONT_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(-0.5..(lmuls.len() as f64 - 0.5), -0.5..(n_ops as f64 - 0.5))
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(lmuls.len())
        .y_labels(n_ops.max(1))
        .x_label_formatter(&|x| category_label(&lmuls, *x))
        // first operation on top
        .y_label_formatter(&|y| category_label(&names, n_ops as f64 - 1f64 - *y))
        .x_desc("LMUL Configuration")
        .label_style(("sans-serif", LABEL_FONT_SIZE))
        .draw()
        .map_err(render_err)?;

    let cells = summary.series.iter().enumerate().flat_map(|(i, s)| {
        let y = (n_ops - 1 - i) as f64;
        s.rows.iter().map(move |r| (r.lmul.index() as f64, y, value(r)))
    });
    chart
        .draw_series(cells.clone().map(|(x, y, v)| {
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color(v).filled())
        }))
        .map_err(render_err)?;
    chart
        .draw_series(cells.map(|(x, y, v)| {
            Text::new(
                format!("{:.*}", precision, v),
                (x, y),
                ("sans-serif", LABEL_FONT_SIZE)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            )
        }))
        .map_err(render_err)?;
    Ok(())
}

/// Groups of bars per LMUL, one bar per operation, each labeled with `label(value)`.
fn draw_bars_by_lmul<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    summary: &Summary,
    caption: &str,
    y_desc: &str,
    value: fn(&Row) -> f64,
    label: fn(f64) -> String,
) -> Result<()> {
    let names = lmul_names();
    let n_ops = summary.series.len();
    let y_max = axis_max(summary.series.iter().flat_map(|s| s.rows.iter().map(value)));
    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", CAPTION_FONT_SIZE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(names.len() as f64 - 0.5), 0f64..y_max)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len())
        .x_label_formatter(&|x| category_label(&names, *x))
        .x_desc("LMUL Configuration")
        .y_desc(y_desc)
        .label_style(("sans-serif", LABEL_FONT_SIZE))
        .draw()
        .map_err(render_err)?;

    for (i, series) in summary.series.iter().enumerate() {
        let color = operation_color(i);
        chart
            .draw_series(series.rows.iter().map(|r| {
                let (left, right) = bar_span(r.lmul.index(), i, n_ops);
                Rectangle::new([(left, 0f64), (right, value(r))], color.filled())
            }))
            .map_err(render_err)?
            .label(series.operation.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
        chart
            .draw_series(series.rows.iter().map(|r| {
                let (left, right) = bar_span(r.lmul.index(), i, n_ops);
                Text::new(
                    label(value(r)),
                    ((left + right) / 2f64, value(r)),
                    ("sans-serif", DATA_LABEL_FONT_SIZE)
                        .into_font()
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Center, VPos::Bottom)),
                )
            }))
            .map_err(render_err)?;
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    Ok(())
}

/// Best speedup of each operation, labeled with the efficiency it runs at there.
fn draw_best_lmul_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    summary: &Summary,
) -> Result<()> {
    let names: Vec<&str> = summary.operations().collect();
    let y_max = axis_max(summary.records.iter().map(|r| r.best_speedup));
    let mut chart = ChartBuilder::on(area)
        .caption(
            "Best LMUL Performance (with efficiency %)",
            ("sans-serif", CAPTION_FONT_SIZE),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(names.len() as f64 - 0.5), 0f64..y_max)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len().max(1))
        .x_label_formatter(&|x| category_label(&names, *x))
        .x_desc("Operations")
        .y_desc("Best Speedup vs m1")
        .label_style(("sans-serif", LABEL_FONT_SIZE))
        .draw()
        .map_err(render_err)?;

    let bests = summary
        .series
        .iter()
        .zip(summary.records.iter())
        .enumerate()
        .map(|(i, (series, record))| {
            let efficiency = series.row(record.best_lmul).efficiency;
            (i, record.best_speedup, efficiency)
        });
    chart
        .draw_series(bests.clone().map(|(i, speedup, _)| {
            let (left, right) = bar_span(i, 0, 1);
            Rectangle::new([(left, 0f64), (right, speedup)], operation_color(i).filled())
        }))
        .map_err(render_err)?;
    chart
        .draw_series(bests.map(|(i, speedup, efficiency)| {
            Text::new(
                format!("{:.1}%", efficiency),
                (i as f64, speedup),
                ("sans-serif", LABEL_FONT_SIZE)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Bottom)),
            )
        }))
        .map_err(render_err)?;
    Ok(())
}

fn draw_summary_table<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, summary: &Summary) -> Result<()> {
    let area = area
        .titled("Performance Summary", ("sans-serif", CAPTION_FONT_SIZE))
        .map_err(render_err)?;
    let (width, height) = area.dim_in_pixel();
    let rows = summary_table_rows(summary);
    let margin = 20i32;
    let col_width = (width as i32 - 2 * margin) / TABLE_HEADER.len() as i32;
    let row_height = ((height as i32 - 2 * margin) / (rows.len() as i32 + 1)).min(48);
    let header_color = RGBColor(76, 175, 80);

    let cell = |text: &str, col: usize, row: usize, bold: bool| {
        let x0 = margin + col as i32 * col_width;
        let y0 = margin + row as i32 * row_height;
        let fill = if bold { header_color.filled() } else { WHITE.filled() };
        let text_color = if bold { WHITE } else { BLACK };
        let corners = [(x0, y0), (x0 + col_width, y0 + row_height)];
        area.draw(&Rectangle::new(corners, fill))
            .and_then(|_| area.draw(&Rectangle::new(corners, BLACK.stroke_width(1))))
            .and_then(|_| {
                area.draw(&Text::new(
                    text.to_string(),
                    (x0 + col_width / 2, y0 + row_height / 2),
                    ("sans-serif", LABEL_FONT_SIZE)
                        .into_font()
                        .color(&text_color)
                        .pos(Pos::new(HPos::Center, VPos::Center)),
                ))
            })
    };

    for (col, name) in TABLE_HEADER.iter().enumerate() {
        cell(*name, col, 0, true).map_err(render_err)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, text) in row.iter().enumerate() {
            cell(text.as_str(), col, r + 1, false).map_err(render_err)?;
        }
    }
    Ok(())
}

fn draw_footer<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> Result<()> {
    let generated = time::OffsetDateTime::now_utc().format("%Y-%m-%d %H:%M:%S UTC");
    area.draw(&Text::new(
        format!(
            "Efficiency below 100% indicates memory bandwidth or register pressure limits. Generated {}",
            generated
        ),
        (20, 8),
        ("sans-serif", LABEL_FONT_SIZE).into_font().color(&BLACK.mix(0.7)),
    ))
    .map_err(render_err)
}

/// Clears and titles `root`, reserves the footer strip and splits the rest into `grid`
/// (rows, columns) panels.
fn layout<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    summary: &Summary,
    config: &ReportConfig,
    grid: (usize, usize),
) -> Result<(Vec<DrawingArea<DB, Shift>>, DrawingArea<DB, Shift>)> {
    if summary.series.is_empty() {
        return Err(Error::Render("no benchmark results to plot".to_string()));
    }
    root.fill(&WHITE).map_err(render_err)?;
    let root = root
        .titled(&config.title, ("sans-serif", TITLE_FONT_SIZE))
        .map_err(render_err)?;
    let (_, height) = root.dim_in_pixel();
    let (body, footer) = root.split_vertically(height.saturating_sub(FOOTER_HEIGHT));
    Ok((body.split_evenly(grid), footer))
}

/// Draws all six panels and the footer onto `root`.
pub fn draw_dashboard<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    summary: &Summary,
    config: &ReportConfig,
) -> Result<()> {
    let (panels, footer) = layout(root, summary, config, (3, 2))?;
    draw_time_bars(&panels[0], summary)?;
    draw_metric_lines(
        &panels[1],
        summary,
        "Processing Throughput",
        "Throughput (MPix/sec)",
        |r| r.throughput,
        None,
    )?;
    draw_speedup_lines(&panels[2], summary)?;
    draw_heatmap(
        &panels[3],
        summary,
        "LMUL Efficiency Heatmap (%)",
        |r| r.efficiency,
        efficiency_color,
        1,
    )?;
    draw_bars_by_lmul(
        &panels[4],
        summary,
        "Speedup Comparison by LMUL",
        "Speedup vs m1",
        |r| r.speedup,
        |v| format!("{:.1}x", v),
    )?;
    draw_summary_table(&panels[5], summary)?;
    draw_footer(&footer)?;
    debug!(panels = panels.len(), "drew dashboard");
    Ok(())
}

/// The complete analysis figure: two rows of three panels covering time, speedup
/// progression, efficiency, throughput, a speedup heatmap and the best LMUL per operation.
pub fn draw_complete_analysis<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    summary: &Summary,
    config: &ReportConfig,
) -> Result<()> {
    let (panels, footer) = layout(root, summary, config, (2, 3))?;
    draw_bars_by_lmul(
        &panels[0],
        summary,
        "Execution Time by LMUL",
        "Execution Time (ms)",
        |r| r.time_ms,
        |v| format!("{:.2}", v),
    )?;
    draw_speedup_progression(&panels[1], summary)?;
    draw_metric_lines(
        &panels[2],
        summary,
        "LMUL Efficiency Trends",
        "Efficiency (%)",
        |r| r.efficiency,
        Some(105f64),
    )?;
    draw_metric_lines(
        &panels[3],
        summary,
        "Processing Throughput",
        "Throughput (MPix/sec)",
        |r| r.throughput,
        None,
    )?;
    let speedups = || summary.series.iter().flat_map(|s| s.rows.iter().map(|r| r.speedup));
    let low = speedups().fold(f64::INFINITY, f64::min);
    let high = speedups().fold(f64::NEG_INFINITY, f64::max);
    draw_heatmap(
        &panels[4],
        summary,
        "LMUL Speedup Heatmap",
        |r| r.speedup,
        |v| range_color(v, low, high),
        2,
    )?;
    draw_best_lmul_bars(&panels[5], summary)?;
    draw_footer(&footer)?;
    debug!(panels = panels.len(), "drew complete analysis");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    Dashboard,
    CompleteAnalysis,
}

impl Figure {
    pub fn draw<DB: DrawingBackend>(
        self,
        root: &DrawingArea<DB, Shift>,
        summary: &Summary,
        config: &ReportConfig,
    ) -> Result<()> {
        match self {
            Figure::Dashboard => draw_dashboard(root, summary, config),
            Figure::CompleteAnalysis => draw_complete_analysis(root, summary, config),
        }
    }
}

/// Renders the dashboard to `path`.
pub fn render(summary: &Summary, config: &ReportConfig, path: &Path) -> Result<()> {
    render_figure(Figure::Dashboard, summary, config, path)
}

/// Renders `figure` to `path`. `.svg` paths are written as SVG, everything else is
/// rasterized and encoded by the image crate according to the extension.
pub fn render_figure(
    figure: Figure,
    summary: &Summary,
    config: &ReportConfig,
    path: &Path,
) -> Result<()> {
    config.validate()?;
    let (width, height) = (config.width, config.height);
    let is_svg = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg {
        let root = SVGBackend::new(path, (width, height)).into_drawing_area();
        figure.draw(&root, summary, config)?;
        root.present().map_err(render_err)?;
    } else {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            figure.draw(&root, summary, config)?;
            root.present().map_err(render_err)?;
        }
        image::save_buffer(path, &buffer, width, height, image::ColorType::Rgb8).map_err(render_err)?;
    }
    info!(path = %path.display(), ?figure, width, height, "figure saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        axis_max, bar_span, category_label, efficiency_color, lmul_color, operation_color,
        range_color, render, render_figure, Figure,
    };
    use crate::config::{ReportConfig, MIN_HEIGHT, MIN_WIDTH};
    use crate::datasets;
    use crate::error::Error;
    use crate::lmul::Lmul;
    use crate::summary::summarize;
    use plotters::style::RGBColor;
    use std::path::Path;

    fn small_config() -> ReportConfig {
        ReportConfig {
            width: MIN_WIDTH,
            height: MIN_HEIGHT,
            ..ReportConfig::default()
        }
    }

    fn assert_written(path: &Path) {
        let meta = std::fs::metadata(path).unwrap();
        assert!(meta.len() > 0, "{} is empty", path.display());
    }

    #[test]
    fn heat_scale() {
        assert_eq!(efficiency_color(0.0), RGBColor(215, 48, 39));
        assert_eq!(efficiency_color(-10.0), RGBColor(215, 48, 39));
        assert_eq!(efficiency_color(100.0), RGBColor(255, 255, 191));
        assert_eq!(efficiency_color(200.0), RGBColor(26, 152, 80));
        assert_eq!(efficiency_color(450.0), RGBColor(26, 152, 80));
        let RGBColor(r, g, _) = efficiency_color(50.0);
        assert!(r > 215 && r < 255);
        assert!(g > 48 && g < 255);
    }
    #[test]
    fn speedup_scale() {
        assert_eq!(range_color(1.0, 1.0, 2.52), RGBColor(215, 48, 39));
        assert_eq!(range_color(2.52, 1.0, 2.52), RGBColor(26, 152, 80));
        assert_eq!(range_color(1.76, 1.0, 2.52), RGBColor(255, 255, 191));
        assert_eq!(range_color(3.0, 2.0, 2.0), RGBColor(255, 255, 191));
    }
    #[test]
    fn bars_stay_in_slot() {
        for members in 1..8 {
            let mut prev_right = f64::NEG_INFINITY;
            for member in 0..members {
                let (left, right) = bar_span(3, member, members);
                assert!(left < right);
                assert!(left >= prev_right);
                assert!(left >= 3.0 - 0.5 && right <= 3.0 + 0.5);
                prev_right = right;
            }
        }
        let (left, right) = bar_span(0, 0, 1);
        assert!((left + right).abs() < 1e-12);
    }
    #[test]
    fn category_ticks() {
        let names = ["m1", "m2", "m4", "m8"];
        assert_eq!(category_label(&names, 0.0), "m1");
        assert_eq!(category_label(&names, 2.9), "m8");
        assert_eq!(category_label(&names, 1.5), "");
        assert_eq!(category_label(&names, -0.2), "m1");
        assert_eq!(category_label(&names, -1.0), "");
        assert_eq!(category_label(&names, 4.0), "");
    }
    #[test]
    fn headroom() {
        assert_eq!(axis_max(vec![1.0, 2.0].into_iter()), 2.0 * 1.15);
        assert_eq!(axis_max(std::iter::empty()), 1.0);
    }
    #[test]
    fn palettes() {
        assert_eq!(operation_color(0), operation_color(5));
        assert_ne!(lmul_color(Lmul::M1), lmul_color(Lmul::M8));
    }
    #[test]
    fn dashboard_files() {
        let summary = summarize(&datasets::sample()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        for name in ["dashboard.png", "dashboard.svg"].iter() {
            let path = dir.path().join(name);
            render(&summary, &small_config(), &path).unwrap();
            assert_written(&path);
        }
    }
    #[test]
    fn complete_analysis_files() {
        let summary = summarize(&datasets::sample()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        for name in ["complete.png", "complete.svg"].iter() {
            let path = dir.path().join(name);
            render_figure(Figure::CompleteAnalysis, &summary, &small_config(), &path).unwrap();
            assert_written(&path);
        }
    }
    #[test]
    fn nothing_to_plot() {
        let summary = summarize(&[]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        for &figure in [Figure::Dashboard, Figure::CompleteAnalysis].iter() {
            let path = dir.path().join("empty.svg");
            match render_figure(figure, &summary, &small_config(), &path) {
                Err(Error::Render(_)) => {}
                other => panic!("{:?}", other),
            }
        }
        assert!(matches!(
            render(&summary, &small_config(), &dir.path().join("empty.png")),
            Err(Error::Render(_))
        ));
    }
    #[test]
    fn undersized_figure() {
        let summary = summarize(&datasets::sample()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        let config = ReportConfig {
            width: 0,
            height: 0,
            ..ReportConfig::default()
        };
        assert!(matches!(
            render(&summary, &config, &path),
            Err(Error::Config(_))
        ));
        assert!(!path.exists());
    }
}
