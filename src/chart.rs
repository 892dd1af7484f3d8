use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::{config::Config, stats::Report};

const SIZE: (u32, u32) = (1024, 768);

/// Speedup points of each data size, in the order data sizes first appear.
fn series(report: &Report) -> Vec<(&str, Vec<(f64, f64)>)> {
  let mut series: Vec<(&str, Vec<(f64, f64)>)> = Vec::new();

  for row in &report.rows {
    let point = (row.threads as f64, row.speedup);

    match series.iter_mut().find(|(size, _)| *size == row.data_size) {
      Some((_, points)) => points.push(point),
      None => series.push((&row.data_size, vec![point])),
    }
  }

  series
}

/// Axis ranges covering the whole thread sweep and every speedup, with a
/// little headroom.
fn ranges(config: &Config, report: &Report) -> ((f64, f64), (f64, f64)) {
  let min_threads = config.threads.iter().copied().min().unwrap_or(1) as f64;
  let max_threads = config.threads.iter().copied().max().unwrap_or(1) as f64;
  let max_speedup = report.rows.iter().map(|row| row.speedup).fold(1.0, f64::max);

  ((min_threads - 0.5, max_threads + 0.5), (0.0, max_speedup * 1.1))
}

/// Draws one line per data size (x = threads, y = speedup) into an SVG at
/// `path`.
pub fn render<P: AsRef<Path>>(config: &Config, report: &Report, path: P) -> Result<()> {
  let path = path.as_ref();
  let ((x_min, x_max), (y_min, y_max)) = ranges(config, report);

  let root = SVGBackend::new(path, SIZE).into_drawing_area();
  root.fill(&WHITE).context("fill")?;

  let mut chart = ChartBuilder::on(&root)
    .caption(&config.title, ("sans-serif", 28))
    .margin(20)
    .x_label_area_size(50)
    .y_label_area_size(60)
    .build_cartesian_2d(x_min..x_max, y_min..y_max)
    .context("build chart")?;

  chart
    .configure_mesh()
    .x_desc(config.x_label.as_str())
    .y_desc(config.y_label.as_str())
    .draw()
    .context("draw mesh")?;

  for (i, (data_size, points)) in series(report).into_iter().enumerate() {
    let color = Palette99::pick(i).to_rgba();

    chart
      .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
      .with_context(|| format!("draw {data_size}"))?
      .label(data_size)
      .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

    chart
      .draw_series(points.iter().map(|&point| Circle::new(point, 4, color.filled())))
      .with_context(|| format!("draw {data_size} points"))?;
  }

  chart
    .configure_series_labels()
    .background_style(WHITE.mix(0.8))
    .border_style(BLACK)
    .position(SeriesLabelPosition::UpperLeft)
    .draw()
    .context("draw legend")?;

  root.present().with_context(|| format!("write {path:?}"))?;

  Ok(())
}
