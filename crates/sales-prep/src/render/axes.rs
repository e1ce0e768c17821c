//! Plot-area layout: margins, axes, ticks, titles.

use super::color::palette;
use super::figure::{Figure, TextAnchor};
use super::scale::{ScaleBand, ScaleLinear, format_tick};
use kurbo::{Point, Rect};

const TITLE_SIZE: f64 = 16.0;
const LABEL_SIZE: f64 = 13.0;
const TICK_SIZE: f64 = 11.0;
const TICK_LEN: f64 = 5.0;

/// Z-levels shared by every chart.
pub(crate) mod z {
    pub const GRID: i32 = 0;
    pub const DATA: i32 = 10;
    pub const OVERLAY: i32 = 20;
    pub const AXIS: i32 = 30;
    pub const LABEL: i32 = 40;
}

/// Outer spacing around the plot area, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 30.0,
            bottom: 60.0,
            left: 75.0,
        }
    }
}

/// The rectangle data is drawn into, plus the figure that owns it.
#[derive(Debug)]
pub struct PlotArea {
    pub figure: Figure,
    pub frame: Rect,
}

impl PlotArea {
    /// Lay out a `width` × `height` figure with the given margins.
    pub fn new(width: f64, height: f64, margins: Margins) -> Self {
        let frame = Rect::new(
            margins.left,
            margins.top,
            (width - margins.right).max(margins.left + 1.0),
            (height - margins.bottom).max(margins.top + 1.0),
        );
        Self {
            figure: Figure::new(width, height),
            frame,
        }
    }

    /// Horizontal data scale filling the frame.
    pub fn x_linear(&self, domain: (f64, f64)) -> ScaleLinear {
        ScaleLinear::nice(domain, (self.frame.x0, self.frame.x1), 6)
    }

    /// Vertical data scale filling the frame; larger values sit higher.
    pub fn y_linear(&self, domain: (f64, f64)) -> ScaleLinear {
        ScaleLinear::nice(domain, (self.frame.y1, self.frame.y0), 6)
    }

    /// Chart title centred above the frame.
    pub fn title(&mut self, text: &str) {
        let pos = Point::new(self.frame.center().x, self.frame.y0 / 2.0);
        self.figure
            .text(z::LABEL, pos, text, TITLE_SIZE, TextAnchor::Middle);
    }

    /// Axis titles below and left of the frame.
    pub fn axis_labels(&mut self, x_label: &str, y_label: &str) {
        let x_pos = Point::new(self.frame.center().x, self.frame.y1 + 42.0);
        self.figure
            .text(z::LABEL, x_pos, x_label, LABEL_SIZE, TextAnchor::Middle);

        let y_pos = Point::new(self.frame.x0 - 55.0, self.frame.center().y);
        self.figure.text_styled(
            z::LABEL,
            y_pos,
            y_label,
            LABEL_SIZE,
            TextAnchor::Middle,
            palette::BLACK,
            -90.0,
        );
    }

    /// Bottom axis with ticks from a linear scale.
    pub fn x_axis(&mut self, scale: &ScaleLinear) {
        let y = self.frame.y1;
        self.figure.line(
            z::AXIS,
            Point::new(self.frame.x0, y),
            Point::new(self.frame.x1, y),
            palette::AXIS,
            1.0,
        );
        for tick in scale.ticks(6) {
            let x = scale.map(tick);
            self.tick_x(x, &format_tick(tick));
        }
    }

    /// Bottom axis with one labelled tick per band.
    pub fn x_band_axis(&mut self, scale: &ScaleBand, labels: &[String]) {
        let y = self.frame.y1;
        self.figure.line(
            z::AXIS,
            Point::new(self.frame.x0, y),
            Point::new(self.frame.x1, y),
            palette::AXIS,
            1.0,
        );
        for (i, label) in labels.iter().enumerate() {
            self.tick_x(scale.center(i), label);
        }
    }

    /// Left axis with ticks and light horizontal grid lines.
    pub fn y_axis(&mut self, scale: &ScaleLinear) {
        let x = self.frame.x0;
        self.figure.line(
            z::AXIS,
            Point::new(x, self.frame.y0),
            Point::new(x, self.frame.y1),
            palette::AXIS,
            1.0,
        );
        for tick in scale.ticks(6) {
            let y = scale.map(tick);
            self.figure.line(
                z::GRID,
                Point::new(self.frame.x0, y),
                Point::new(self.frame.x1, y),
                palette::GRID,
                0.5,
            );
            self.figure.line(
                z::AXIS,
                Point::new(x - TICK_LEN, y),
                Point::new(x, y),
                palette::AXIS,
                1.0,
            );
            self.figure.text(
                z::LABEL,
                Point::new(x - TICK_LEN - 3.0, y),
                format_tick(tick),
                TICK_SIZE,
                TextAnchor::End,
            );
        }
    }

    fn tick_x(&mut self, x: f64, label: &str) {
        let y = self.frame.y1;
        self.figure.line(
            z::AXIS,
            Point::new(x, y),
            Point::new(x, y + TICK_LEN),
            palette::AXIS,
            1.0,
        );
        self.figure.text(
            z::LABEL,
            Point::new(x, y + TICK_LEN + 10.0),
            label,
            TICK_SIZE,
            TextAnchor::Middle,
        );
    }

    /// Hand back the finished figure.
    pub fn finish(self) -> Figure {
        self.figure
    }
}
