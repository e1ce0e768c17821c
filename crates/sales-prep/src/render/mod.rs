//! SVG chart rendering.
//!
//! A [`Figure`] is a list of primitive marks (rectangles, `kurbo` paths and
//! text) on a fixed-size canvas. The EDA plots build one through
//! [`PlotArea`], which handles margins, axes and titles.

mod axes;
mod color;
mod figure;
mod scale;

pub(crate) use axes::z;
pub use axes::{Margins, PlotArea};
pub use color::{Color, coolwarm, hex, luminance, opacity, palette};
pub use figure::{Figure, Mark, TextAnchor};
pub use scale::{ScaleBand, ScaleLinear};
pub(crate) use scale::format_tick;
