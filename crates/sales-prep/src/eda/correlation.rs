//! Pairwise Pearson correlation and its heatmap.

use crate::error::{Result, ResultExt};
use crate::render::{
    Figure, Margins, PlotArea, ScaleBand, ScaleLinear, TextAnchor, coolwarm, format_tick,
    luminance, palette, z,
};
use crate::utils::{numeric_cells, numeric_columns, require_column};
use kurbo::{Point, Rect};
use polars::prelude::*;
use serde::Serialize;
use std::path::Path;
use tracing::info;

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 800.0;
const COLORBAR_STEPS: usize = 64;

/// Square correlation matrix over the numeric columns of a frame.
///
/// `values[i][j]` is `None` when fewer than two rows have both columns
/// observed or when either column is constant over those rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient between two columns by name.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn range(&self) -> (f64, f64) {
        let defined = self.values.iter().flatten().flatten().copied();
        let (lo, hi) = defined.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if lo.is_finite() && hi.is_finite() && lo < hi {
            (lo, hi)
        } else {
            (-1.0, 1.0)
        }
    }
}

/// Pearson correlation over pairwise-complete observations.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Correlation matrix of every numeric column.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let columns = numeric_columns(df);
    let cells = columns
        .iter()
        .map(|name| Ok(numeric_cells(require_column(df, name)?)?))
        .collect::<Result<Vec<_>>>()?;

    let values = cells
        .iter()
        .map(|a| cells.iter().map(|b| pearson(a, b)).collect())
        .collect();

    Ok(CorrelationMatrix { columns, values })
}

/// Annotated coolwarm heatmap of [`correlation_matrix`].
pub fn correlation_heatmap(df: &DataFrame, save_path: Option<&Path>) -> Result<Figure> {
    let matrix = correlation_matrix(df)?;
    let figure = render_heatmap(&matrix);

    if let Some(path) = save_path {
        figure
            .save(path)
            .context(format!("Saving correlation heatmap to {}", path.display()))?;
        info!("Correlation heatmap saved to {}", path.display());
    }
    Ok(figure)
}

fn render_heatmap(matrix: &CorrelationMatrix) -> Figure {
    let mut area = PlotArea::new(
        WIDTH,
        HEIGHT,
        Margins {
            top: 60.0,
            right: 140.0,
            bottom: 110.0,
            left: 140.0,
        },
    );
    area.title("Correlation Heatmap");

    let n = matrix.len();
    if n == 0 {
        return area.finish();
    }

    // Square cells, anchored top-left in the frame
    let side = (area.frame.width().min(area.frame.height()) / n as f64).floor();
    let x0 = area.frame.x0;
    let y0 = area.frame.y0;
    let cols = ScaleBand::new((x0, x0 + side * n as f64), n, 0.0);
    let rows = ScaleBand::new((y0, y0 + side * n as f64), n, 0.0);

    let (vmin, vmax) = matrix.range();
    let to_unit = ScaleLinear::new((vmin, vmax), (0.0, 1.0));
    let font_size = (side / 5.0).clamp(8.0, 14.0);

    for (i, row) in matrix.values.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let cell = Rect::new(
                cols.start(j),
                rows.start(i),
                cols.start(j) + cols.bandwidth(),
                rows.start(i) + rows.bandwidth(),
            );
            let fill = match value {
                Some(v) => coolwarm(to_unit.map(*v)),
                None => palette::MISSING,
            };
            area.figure.rect(z::DATA, cell, fill, Some(palette::WHITE));

            if let Some(v) = value {
                let ink = if luminance(fill) > 0.408 {
                    palette::BLACK
                } else {
                    palette::WHITE
                };
                area.figure.text_styled(
                    z::OVERLAY,
                    cell.center(),
                    format!("{v:.2}"),
                    font_size,
                    TextAnchor::Middle,
                    ink,
                    0.0,
                );
            }
        }
    }

    let grid_bottom = rows.start(n - 1) + rows.bandwidth();
    for (i, name) in matrix.columns.iter().enumerate() {
        area.figure.text_styled(
            z::LABEL,
            Point::new(cols.center(i), grid_bottom + 12.0),
            name.as_str(),
            12.0,
            TextAnchor::End,
            palette::BLACK,
            -45.0,
        );
        area.figure.text(
            z::LABEL,
            Point::new(x0 - 8.0, rows.center(i)),
            name.as_str(),
            12.0,
            TextAnchor::End,
        );
    }

    let bar_x = cols.start(n - 1) + cols.bandwidth() + 30.0;
    draw_colorbar(&mut area, bar_x, y0, grid_bottom, (vmin, vmax));

    area.finish()
}

fn draw_colorbar(area: &mut PlotArea, x: f64, top: f64, bottom: f64, domain: (f64, f64)) {
    let width = 20.0;
    let step = (bottom - top) / COLORBAR_STEPS as f64;
    for k in 0..COLORBAR_STEPS {
        let t = (k as f64 + 0.5) / COLORBAR_STEPS as f64;
        let y1 = bottom - step * k as f64;
        let band = Rect::new(x, y1 - step, x + width, y1);
        area.figure.rect(z::DATA, band, coolwarm(t), None);
    }

    let scale = ScaleLinear::new(domain, (bottom, top));
    for tick in scale.ticks(5) {
        let y = scale.map(tick);
        area.figure.line(
            z::AXIS,
            Point::new(x + width, y),
            Point::new(x + width + 4.0, y),
            palette::AXIS,
            1.0,
        );
        area.figure.text(
            z::LABEL,
            Point::new(x + width + 7.0, y),
            format_tick(tick),
            11.0,
            TextAnchor::Start,
        );
    }
}
