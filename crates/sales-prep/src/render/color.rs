//! Chart palette and colormaps.

pub use peniko::Color;
use peniko::color::palette::css;

/// Named colors used by the charts.
pub mod palette {
    use super::{Color, css};

    pub const BLACK: Color = css::BLACK;
    pub const WHITE: Color = css::WHITE;
    pub const GRID: Color = Color::from_rgb8(0xdd, 0xdd, 0xdd);
    pub const AXIS: Color = Color::from_rgb8(0x33, 0x33, 0x33);
    pub const MISSING: Color = Color::from_rgb8(0xbb, 0xbb, 0xbb);
    pub const STEEL_BLUE: Color = Color::from_rgb8(0x1f, 0x77, 0xb4);
    pub const DARK_BLUE: Color = Color::from_rgb8(0x0b, 0x3c, 0x5d);
}

/// `#rrggbb` form of a color; alpha is written separately.
pub fn hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}

/// Alpha in `[0, 1]`, `None` when fully opaque.
pub fn opacity(color: Color) -> Option<f64> {
    let rgba = color.to_rgba8();
    (rgba.a != 255).then(|| f64::from(rgba.a) / 255.0)
}

/// Relative luminance in `[0, 1]`, used to pick a readable label color.
pub fn luminance(color: Color) -> f64 {
    let rgba = color.to_rgba8();
    (0.2126 * f64::from(rgba.r) + 0.7152 * f64::from(rgba.g) + 0.0722 * f64::from(rgba.b)) / 255.0
}

const COOLWARM: [(f32, Color); 5] = [
    (0.0, Color::from_rgb8(59, 76, 192)),
    (0.25, Color::from_rgb8(141, 176, 254)),
    (0.5, Color::from_rgb8(221, 221, 221)),
    (0.75, Color::from_rgb8(244, 154, 123)),
    (1.0, Color::from_rgb8(180, 4, 38)),
];

/// Diverging blue-white-red colormap, `t` in `[0, 1]`.
pub fn coolwarm(t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 0.5 };
    for pair in COOLWARM.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            return c0.lerp_rect(c1, (t - t0) / (t1 - t0));
        }
    }
    COOLWARM[COOLWARM.len() - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(Color::from_rgb8(255, 0, 16)), "#ff0010");
        assert_eq!(hex(palette::STEEL_BLUE), "#1f77b4");
    }

    #[test]
    fn test_opacity() {
        assert_eq!(opacity(palette::BLACK), None);
        assert_eq!(opacity(Color::from_rgba8(0, 0, 0, 0)), Some(0.0));
    }

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(hex(coolwarm(0.0)), "#3b4cc0");
        assert_eq!(hex(coolwarm(0.5)), "#dddddd");
        assert_eq!(hex(coolwarm(1.0)), "#b40426");
        assert_eq!(hex(coolwarm(f64::NAN)), hex(coolwarm(0.5)));
        assert_eq!(hex(coolwarm(-3.0)), hex(coolwarm(0.0)));
    }

    #[test]
    fn test_luminance_orders_black_and_white() {
        assert_eq!(luminance(palette::BLACK), 0.0);
        assert!((luminance(palette::WHITE) - 1.0).abs() < 1e-9);
        assert!(luminance(coolwarm(0.0)) < luminance(coolwarm(0.5)));
    }
}
