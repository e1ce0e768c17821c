//! Figure scene and SVG serialization.

use super::color::{Color, hex, opacity, palette};
use crate::error::{Result, ResultExt};
use kurbo::{BezPath, Point, Rect};
use std::fs;
use std::path::Path;

/// Horizontal text alignment relative to the anchor point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// A drawable primitive.
#[derive(Clone, Debug)]
pub enum Mark {
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
    Path {
        path: BezPath,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
    Text {
        pos: Point,
        text: String,
        font_size: f64,
        anchor: TextAnchor,
        fill: Color,
        angle: f64,
    },
}

/// A fixed-size canvas holding marks in z-order.
#[derive(Clone, Debug)]
pub struct Figure {
    width: f64,
    height: f64,
    marks: Vec<(i32, Mark)>,
}

impl Figure {
    /// Create an empty figure of `width` × `height` pixels.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            marks: Vec::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// All marks, in insertion order.
    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter().map(|(_, mark)| mark)
    }

    /// Text of every label on the figure.
    pub fn texts(&self) -> Vec<&str> {
        self.marks()
            .filter_map(|mark| match mark {
                Mark::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Add a mark at z-index `z`; higher values draw on top.
    pub fn push(&mut self, z: i32, mark: Mark) {
        self.marks.push((z, mark));
    }

    /// Filled rectangle with an optional outline.
    pub fn rect(&mut self, z: i32, rect: Rect, fill: Color, stroke: Option<Color>) {
        self.push(
            z,
            Mark::Rect {
                rect,
                fill: Some(fill),
                stroke,
                stroke_width: if stroke.is_some() { 1.0 } else { 0.0 },
            },
        );
    }

    /// Straight line segment.
    pub fn line(&mut self, z: i32, from: Point, to: Point, stroke: Color, width: f64) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        self.polyline(z, path, stroke, width);
    }

    /// Open stroked path.
    pub fn polyline(&mut self, z: i32, path: BezPath, stroke: Color, width: f64) {
        self.push(
            z,
            Mark::Path {
                path,
                fill: None,
                stroke: Some(stroke),
                stroke_width: width,
            },
        );
    }

    /// Text label.
    pub fn text(
        &mut self,
        z: i32,
        pos: Point,
        text: impl Into<String>,
        font_size: f64,
        anchor: TextAnchor,
    ) {
        self.text_styled(z, pos, text, font_size, anchor, palette::BLACK, 0.0);
    }

    /// Text label with color and rotation (degrees).
    #[allow(clippy::too_many_arguments)]
    pub fn text_styled(
        &mut self,
        z: i32,
        pos: Point,
        text: impl Into<String>,
        font_size: f64,
        anchor: TextAnchor,
        fill: Color,
        angle: f64,
    ) {
        self.push(
            z,
            Mark::Text {
                pos,
                text: text.into(),
                font_size,
                anchor,
                fill,
                angle,
            },
        );
    }

    /// Serialize the figure as a standalone SVG document.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();

        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
        out.push_str(&format!(
            r#"viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height
        ));
        out.push('\n');
        out.push_str(&format!(
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.width,
            self.height,
            hex(palette::WHITE)
        ));
        out.push('\n');

        // Stable sort keeps insertion order within a z level
        let mut ordered: Vec<&(i32, Mark)> = self.marks.iter().collect();
        ordered.sort_by_key(|(z, _)| *z);

        for (_z, mark) in ordered {
            match mark {
                Mark::Rect {
                    rect,
                    fill,
                    stroke,
                    stroke_width,
                } => {
                    out.push_str(&format!(
                        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}""#,
                        rect.x0,
                        rect.y0,
                        rect.width(),
                        rect.height(),
                    ));
                    write_paint_attrs(&mut out, *fill, *stroke, *stroke_width);
                    out.push_str("/>\n");
                }
                Mark::Path {
                    path,
                    fill,
                    stroke,
                    stroke_width,
                } => {
                    out.push_str(&format!(r#"<path d="{}""#, path.to_svg()));
                    write_paint_attrs(&mut out, *fill, *stroke, *stroke_width);
                    out.push_str("/>\n");
                }
                Mark::Text {
                    pos,
                    text,
                    font_size,
                    anchor,
                    fill,
                    angle,
                } => {
                    out.push_str(&format!(
                        r#"<text x="{:.2}" y="{:.2}" font-size="{}" dominant-baseline="middle""#,
                        pos.x, pos.y, font_size
                    ));
                    if *angle != 0.0 {
                        out.push_str(&format!(
                            r#" transform="rotate({} {:.2} {:.2})""#,
                            angle, pos.x, pos.y
                        ));
                    }
                    out.push_str(match anchor {
                        TextAnchor::Start => r#" text-anchor="start""#,
                        TextAnchor::Middle => r#" text-anchor="middle""#,
                        TextAnchor::End => r#" text-anchor="end""#,
                    });
                    write_paint_attr(&mut out, "fill", *fill);
                    out.push('>');
                    out.push_str(&escape_xml(text));
                    out.push_str("</text>\n");
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }

    /// Write the SVG document to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_svg_string()).context(format!("Writing SVG to {}", path.display()))
    }
}

fn write_paint_attr(out: &mut String, name: &str, color: Color) {
    out.push_str(&format!(r#" {name}="{}""#, hex(color)));
    if let Some(o) = opacity(color) {
        out.push_str(&format!(r#" {name}-opacity="{o}""#));
    }
}

fn write_paint_attrs(out: &mut String, fill: Option<Color>, stroke: Option<Color>, width: f64) {
    match fill {
        Some(color) => write_paint_attr(out, "fill", color),
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(color) = stroke
        && width > 0.0
    {
        write_paint_attr(out, "stroke", color);
        out.push_str(&format!(r#" stroke-width="{width}""#));
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_document_shape() {
        let mut fig = Figure::new(200.0, 100.0);
        fig.rect(0, Rect::new(10.0, 10.0, 50.0, 40.0), palette::STEEL_BLUE, None);
        fig.text(1, Point::new(100.0, 20.0), "Sales & Promo", 12.0, TextAnchor::Middle);

        let svg = fig.to_svg_string();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"width="40.00" height="30.00""#));
        assert!(svg.contains("#1f77b4"));
        assert!(svg.contains("Sales &amp; Promo"));
    }

    #[test]
    fn test_svg_respects_z_order() {
        let mut fig = Figure::new(10.0, 10.0);
        fig.text(5, Point::new(1.0, 1.0), "top", 10.0, TextAnchor::Start);
        fig.text(0, Point::new(1.0, 1.0), "bottom", 10.0, TextAnchor::Start);

        let svg = fig.to_svg_string();
        assert!(svg.find("bottom").unwrap() < svg.find("top").unwrap());
    }

    #[test]
    fn test_line_is_stroked_path() {
        let mut fig = Figure::new(10.0, 10.0);
        fig.line(0, Point::new(0.0, 0.0), Point::new(5.0, 5.0), palette::AXIS, 1.5);

        let svg = fig.to_svg_string();
        assert!(svg.contains("<path d=\"M0 0L5 5\""));
        assert!(svg.contains(r#"fill="none""#));
        assert!(svg.contains(r#"stroke-width="1.5""#));
    }

    #[test]
    fn test_translucent_paint_writes_opacity() {
        let mut fig = Figure::new(10.0, 10.0);
        fig.rect(0, Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_rgba8(0, 0, 0, 51), None);

        let svg = fig.to_svg_string();
        assert!(svg.contains(r##"fill="#000000" fill-opacity="0.2""##));
    }

    #[test]
    fn test_save_reports_unwritable_path() {
        let fig = Figure::new(10.0, 10.0);
        let err = fig.save("/definitely/not/here/figure.svg").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("Writing SVG to"));
    }

    #[test]
    fn test_texts_lists_labels() {
        let mut fig = Figure::new(10.0, 10.0);
        fig.text(0, Point::new(0.0, 0.0), "a", 10.0, TextAnchor::Start);
        fig.rect(0, Rect::new(0.0, 0.0, 1.0, 1.0), palette::BLACK, None);
        fig.text(0, Point::new(0.0, 0.0), "b", 10.0, TextAnchor::End);
        assert_eq!(fig.texts(), vec!["a", "b"]);
    }
}
