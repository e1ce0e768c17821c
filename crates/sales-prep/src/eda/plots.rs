//! Sales distribution and promo comparison charts.

use crate::error::{Result, ResultExt};
use crate::render::{Figure, Margins, PlotArea, ScaleBand, format_tick, palette, z};
use crate::utils::{
    is_numeric_dtype, numeric_cells, numeric_values, quartiles, require_column, require_numeric,
};
use kurbo::{BezPath, Point, Rect};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::Path;
use tracing::{debug, info};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;

/// Number of histogram bins for the sales distribution.
pub const SALES_BINS: usize = 30;

const KDE_POINTS: usize = 200;
const WHISKER_IQR: f64 = 1.5;

/// Equal-width bin counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges.
    pub edges: Vec<f64>,
    /// Values per bin; the last bin includes its right edge.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning their range.
    ///
    /// A single distinct value is centred in a unit-wide range. Non-finite
    /// values are ignored.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

        let (mut lo, mut hi) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        if finite.is_empty() {
            (lo, hi) = (0.0, 1.0);
        } else if lo == hi {
            (lo, hi) = (lo - 0.5, hi + 0.5);
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self { edges, counts }
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => (hi - lo) / self.counts.len() as f64,
            _ => 0.0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Gaussian kernel density estimate evaluated at each point of `grid`.
///
/// The bandwidth follows Scott's rule, `std * n^(-1/5)`. Returns `None` with
/// fewer than two values or zero spread.
pub fn gaussian_kde(values: &[f64], grid: &[f64]) -> Option<Vec<f64>> {
    if values.len() < 2 {
        return None;
    }
    let std = Float64Chunked::from_slice(PlSmallStr::EMPTY, values).std(1)?;
    if !std.is_finite() || std == 0.0 {
        return None;
    }
    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());

    Some(
        grid.iter()
            .map(|x| {
                let sum: f64 = values
                    .iter()
                    .map(|v| {
                        let u = (x - v) / bandwidth;
                        (-0.5 * u * u).exp()
                    })
                    .sum();
                sum * norm
            })
            .collect(),
    )
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub whisker_low: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub whisker_high: f64,
    /// Values beyond the whiskers.
    pub fliers: Vec<f64>,
}

impl BoxStats {
    /// `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> PolarsResult<Option<Self>> {
        let ordered = Float64Chunked::from_slice(PlSmallStr::EMPTY, values).sort(false);
        let Some((q1, median, q3)) = quartiles(&ordered)? else {
            return Ok(None);
        };

        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let (inside, fliers): (Vec<f64>, Vec<f64>) = ordered
            .into_no_null_iter()
            .partition(|v| *v >= low_fence && *v <= high_fence);
        let whisker_low = inside.first().copied().unwrap_or(q1);
        let whisker_high = inside.last().copied().unwrap_or(q3);

        Ok(Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            fliers,
        }))
    }

    fn extent(&self) -> (f64, f64) {
        let lo = self.fliers.iter().copied().fold(self.whisker_low, f64::min);
        let hi = self.fliers.iter().copied().fold(self.whisker_high, f64::max);
        (lo, hi)
    }
}

/// `Sales` values for one `Promo` level.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesGroup {
    pub label: String,
    pub values: Vec<f64>,
}

/// Group `Sales` by `Promo`, in ascending `Promo` order.
///
/// Rows where either value is null are left out. Numeric `Promo` levels sort
/// numerically, anything else sorts as text.
pub fn sales_by_promo(df: &DataFrame) -> Result<Vec<SalesGroup>> {
    let sales = numeric_cells(require_numeric(df, "Sales")?)?;
    let promo = require_column(df, "Promo")?;

    if is_numeric_dtype(promo.dtype()) {
        let mut levels: Vec<(f64, Vec<f64>)> = Vec::new();
        for (level, value) in numeric_cells(promo)?.into_iter().zip(&sales) {
            let (Some(level), Some(value)) = (level, value) else {
                continue;
            };
            match levels.iter_mut().find(|entry| entry.0 == level) {
                Some((_, group)) => group.push(*value),
                None => levels.push((level, vec![*value])),
            }
        }
        levels.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(levels
            .into_iter()
            .map(|(level, values)| SalesGroup {
                label: format_tick(level),
                values,
            })
            .collect())
    } else {
        let text = promo.cast(&DataType::String)?;
        let mut levels: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (level, value) in text.str()?.into_iter().zip(&sales) {
            if let (Some(level), Some(value)) = (level, value) {
                levels.entry(level.to_string()).or_default().push(*value);
            }
        }
        Ok(levels
            .into_iter()
            .map(|(label, values)| SalesGroup { label, values })
            .collect())
    }
}

/// Histogram of `Sales` with a density curve scaled to counts.
pub fn plot_sales_distribution(df: &DataFrame, save_path: Option<&Path>) -> Result<Figure> {
    let values = numeric_values(require_numeric(df, "Sales")?)?;
    let hist = Histogram::new(&values, SALES_BINS);
    debug!("Binned {} sales values into {} bins", hist.total(), SALES_BINS);

    let mut area = PlotArea::new(WIDTH, HEIGHT, Margins::default());
    let x_domain = (hist.edges[0], hist.edges[SALES_BINS]);

    let grid: Vec<f64> = (0..KDE_POINTS)
        .map(|i| x_domain.0 + (x_domain.1 - x_domain.0) * i as f64 / (KDE_POINTS - 1) as f64)
        .collect();
    let scale_to_counts = values.len() as f64 * hist.bin_width();
    let curve: Option<Vec<f64>> = gaussian_kde(&values, &grid)
        .map(|density| density.into_iter().map(|d| d * scale_to_counts).collect());

    let peak = hist
        .counts
        .iter()
        .map(|c| *c as f64)
        .chain(curve.iter().flatten().copied())
        .fold(0.0, f64::max)
        .max(1.0);

    let x = area.x_linear(x_domain);
    let y = area.y_linear((0.0, peak));

    for (i, count) in hist.counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let bar = Rect::new(
            x.map(hist.edges[i]),
            y.map(*count as f64),
            x.map(hist.edges[i + 1]),
            y.map(0.0),
        );
        area.figure
            .rect(z::DATA, bar, palette::STEEL_BLUE, Some(palette::WHITE));
    }

    if let Some(curve) = curve {
        let mut path = BezPath::new();
        for (i, (gx, gy)) in grid.iter().zip(&curve).enumerate() {
            let p = Point::new(x.map(*gx), y.map(*gy));
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        area.figure.polyline(z::OVERLAY, path, palette::DARK_BLUE, 2.0);
    }

    area.x_axis(&x);
    area.y_axis(&y);
    area.title("Distribution of Sales");
    area.axis_labels("Sales", "Frequency");
    let figure = area.finish();

    if let Some(path) = save_path {
        figure
            .save(path)
            .context(format!("Saving sales distribution plot to {}", path.display()))?;
        info!("Sales distribution plot saved to {}", path.display());
    }
    Ok(figure)
}

/// Boxplot of `Sales` per `Promo` level.
pub fn plot_promo_sales_comparison(df: &DataFrame, save_path: Option<&Path>) -> Result<Figure> {
    let mut boxes: Vec<(String, BoxStats)> = Vec::new();
    for group in sales_by_promo(df)? {
        if let Some(stats) = BoxStats::from_values(&group.values)? {
            boxes.push((group.label, stats));
        }
    }

    let mut area = PlotArea::new(WIDTH, HEIGHT, Margins::default());

    let (lo, hi) = boxes
        .iter()
        .map(|(_, b)| b.extent())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (l, h)| {
            (lo.min(l), hi.max(h))
        });
    let y_domain = if lo.is_finite() && hi.is_finite() && lo < hi {
        (lo, hi)
    } else if lo.is_finite() {
        (lo - 1.0, lo + 1.0)
    } else {
        (0.0, 1.0)
    };
    let y = area.y_linear(y_domain);
    let bands = ScaleBand::new((area.frame.x0, area.frame.x1), boxes.len(), 0.4);

    for (i, (_, stats)) in boxes.iter().enumerate() {
        draw_box(&mut area.figure, &bands, i, stats, |v| y.map(v));
    }

    let labels: Vec<String> = boxes.iter().map(|(label, _)| label.clone()).collect();
    area.x_band_axis(&bands, &labels);
    area.y_axis(&y);
    area.title("Sales on Promo vs Non-Promo Days");
    area.axis_labels("Promo Day (1 = Yes, 0 = No)", "Sales");
    let figure = area.finish();

    if let Some(path) = save_path {
        figure
            .save(path)
            .context(format!("Saving promo sales comparison plot to {}", path.display()))?;
        info!("Promo sales comparison plot saved to {}", path.display());
    }
    Ok(figure)
}

fn draw_box(
    figure: &mut Figure,
    bands: &ScaleBand,
    i: usize,
    stats: &BoxStats,
    to_y: impl Fn(f64) -> f64,
) {
    let left = bands.start(i);
    let right = left + bands.bandwidth();
    let center = bands.center(i);
    let cap = bands.bandwidth() / 4.0;

    figure.rect(
        z::DATA,
        Rect::new(left, to_y(stats.q3), right, to_y(stats.q1)),
        palette::STEEL_BLUE,
        Some(palette::AXIS),
    );
    figure.line(
        z::OVERLAY,
        Point::new(left, to_y(stats.median)),
        Point::new(right, to_y(stats.median)),
        palette::AXIS,
        2.0,
    );

    for (from, to) in [
        (stats.q3, stats.whisker_high),
        (stats.q1, stats.whisker_low),
    ] {
        figure.line(
            z::DATA,
            Point::new(center, to_y(from)),
            Point::new(center, to_y(to)),
            palette::AXIS,
            1.0,
        );
        figure.line(
            z::DATA,
            Point::new(center - cap, to_y(to)),
            Point::new(center + cap, to_y(to)),
            palette::AXIS,
            1.0,
        );
    }

    for flier in &stats.fliers {
        let mut marker = BezPath::new();
        let p = Point::new(center, to_y(*flier));
        marker.move_to((p.x - 3.0, p.y));
        marker.line_to((p.x, p.y - 3.0));
        marker.line_to((p.x + 3.0, p.y));
        marker.line_to((p.x, p.y + 3.0));
        marker.close_path();
        figure.polyline(z::OVERLAY, marker, palette::AXIS, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ==================== Histogram tests ====================

    #[test]
    fn test_histogram_counts_include_right_edge() {
        let hist = Histogram::new(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(hist.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(hist.counts, vec![1, 1, 1, 2]);
        assert_eq!(hist.total(), 5);
        assert_eq!(hist.bin_width(), 1.0);
    }

    #[test]
    fn test_histogram_single_value() {
        let hist = Histogram::new(&[7.0, 7.0], 2);
        assert_eq!(hist.edges, vec![6.5, 7.0, 7.5]);
        assert_eq!(hist.counts, vec![0, 2]);
    }

    #[test]
    fn test_histogram_empty() {
        let hist = Histogram::new(&[], 3);
        assert_eq!(hist.counts, vec![0, 0, 0]);
        assert_eq!(hist.edges.first(), Some(&0.0));
        assert_eq!(hist.edges.last(), Some(&1.0));
    }

    // ==================== KDE tests ====================

    #[test]
    fn test_kde_integrates_to_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 7.0];
        let grid: Vec<f64> = (0..2001).map(|i| -20.0 + i as f64 * 0.02).collect();
        let density = gaussian_kde(&values, &grid).unwrap();
        let area: f64 = density.iter().sum::<f64>() * 0.02;
        assert!((area - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_kde_undefined_for_constant_sample() {
        assert_eq!(gaussian_kde(&[3.0, 3.0, 3.0], &[3.0]), None);
        assert_eq!(gaussian_kde(&[3.0], &[3.0]), None);
    }

    // ==================== BoxStats tests ====================

    #[test]
    fn test_box_stats_with_flier() {
        let stats = BoxStats::from_values(&[100.0, 1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .unwrap();
        assert_eq!(stats.q1, 2.25);
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.q3, 4.75);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.whisker_high, 5.0);
        assert_eq!(stats.fliers, vec![100.0]);
    }

    #[test]
    fn test_box_stats_empty() {
        assert_eq!(BoxStats::from_values(&[]).unwrap(), None);
    }

    // ==================== Grouping tests ====================

    #[test]
    fn test_sales_by_promo_sorted_numeric_levels() {
        let df = df![
            "Sales" => [Some(10.0), Some(20.0), Some(30.0), None, Some(50.0)],
            "Promo" => [Some(1i64), Some(0), Some(1), Some(0), None],
        ]
        .unwrap();

        let groups = sales_by_promo(&df).unwrap();
        assert_eq!(
            groups,
            vec![
                SalesGroup {
                    label: "0".to_string(),
                    values: vec![20.0],
                },
                SalesGroup {
                    label: "1".to_string(),
                    values: vec![10.0, 30.0],
                },
            ]
        );
    }

    #[test]
    fn test_sales_by_promo_skips_nan_levels() {
        let df = df![
            "Sales" => [10.0, 20.0, 30.0, 40.0],
            "Promo" => [f64::NAN, 1.0, f64::NAN, 1.0],
        ]
        .unwrap();

        let groups = sales_by_promo(&df).unwrap();
        assert_eq!(
            groups,
            vec![SalesGroup {
                label: "1".to_string(),
                values: vec![20.0, 40.0],
            }]
        );
    }

    #[test]
    fn test_sales_by_promo_text_levels() {
        let df = df![
            "Sales" => [1.0, 2.0, 3.0],
            "Promo" => ["yes", "no", "yes"],
        ]
        .unwrap();

        let labels: Vec<String> = sales_by_promo(&df)
            .unwrap()
            .into_iter()
            .map(|g| g.label)
            .collect();
        assert_eq!(labels, vec!["no".to_string(), "yes".to_string()]);
    }

    // ==================== Plot tests ====================

    #[test]
    fn test_plot_sales_distribution_labels() {
        let df = df!["Sales" => [100.0, 120.0, 90.0, 130.0, 95.0]].unwrap();
        let fig = plot_sales_distribution(&df, None).unwrap();

        let texts = fig.texts();
        assert!(texts.contains(&"Distribution of Sales"));
        assert!(texts.contains(&"Sales"));
        assert!(texts.contains(&"Frequency"));
        assert_eq!(fig.width(), 1000.0);
        assert_eq!(fig.height(), 600.0);
    }

    #[test]
    fn test_plot_sales_distribution_missing_column() {
        let df = df!["Revenue" => [1.0]].unwrap();
        let err = plot_sales_distribution(&df, None).unwrap_err();
        assert!(err.is_missing_column());
    }

    #[test]
    fn test_plot_sales_distribution_non_numeric() {
        let df = df!["Sales" => ["a", "b"]].unwrap();
        let err = plot_sales_distribution(&df, None).unwrap_err();
        assert_eq!(err.error_code(), "NON_NUMERIC_COLUMN");
    }

    #[test]
    fn test_plot_promo_sales_comparison_labels() {
        let df = df![
            "Sales" => [100.0, 120.0, 90.0, 130.0],
            "Promo" => [0i64, 1, 0, 1],
        ]
        .unwrap();
        let fig = plot_promo_sales_comparison(&df, None).unwrap();

        let texts = fig.texts();
        assert!(texts.contains(&"Sales on Promo vs Non-Promo Days"));
        assert!(texts.contains(&"Promo Day (1 = Yes, 0 = No)"));
        assert!(texts.contains(&"0"));
        assert!(texts.contains(&"1"));
    }

    #[test]
    fn test_plot_promo_sales_comparison_missing_promo() {
        let df = df!["Sales" => [1.0, 2.0]].unwrap();
        let err = plot_promo_sales_comparison(&df, None).unwrap_err();
        assert!(err.is_missing_column());
    }

    #[test]
    fn test_plot_saves_svg() {
        let df = df!["Sales" => [1.0, 2.0, 3.0, 4.0]].unwrap();
        let path = std::env::temp_dir().join(format!(
            "sales_prep_plot_{}.svg",
            std::process::id()
        ));

        plot_sales_distribution(&df, Some(path.as_path())).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Distribution of Sales"));
        std::fs::remove_file(&path).ok();
    }
}
