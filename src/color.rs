use std::collections::{BTreeMap, BTreeSet};

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::data::model::Value;

/// 8-bit sRGB colour as handed to the presentation layer.
pub type Rgb = Srgb<u8>;

/// Colour used when no meaningful encoding exists (degenerate range,
/// non-numeric value, unknown category).
pub const NEUTRAL_COLOR: Rgb = Srgb::new(160, 160, 160);

/// CSS `rgb(r,g,b)` notation, no spaces.
pub fn to_css(color: Rgb) -> String {
    format!("rgb({},{},{})", color.red, color.green, color.blue)
}

// ---------------------------------------------------------------------------
// Gradient scale: numeric value → blue..red
// ---------------------------------------------------------------------------

/// Linear colour scale over `[min, max]`: `min` is pure blue, `max` pure red.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    /// Equilibrium temperature band of the dashboard's temperature colouring (K).
    pub const TEMPERATURE: ColorScale = ColorScale {
        min: 500.0,
        max: 1000.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Observed bounds over the finite numeric values; `None` if there are none.
    pub fn from_values<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        values
            .into_iter()
            .filter_map(Value::as_f64)
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .map(|(min, max)| Self::new(min, max))
    }

    /// A scale that cannot place values: equal or non-finite bounds.
    pub fn is_degenerate(&self) -> bool {
        !self.min.is_finite() || !self.max.is_finite() || self.min == self.max
    }

    /// Position of `value` on the scale, clamped to `[0, 1]`.
    pub fn ratio(&self, value: f64) -> Option<f64> {
        if self.is_degenerate() || value.is_nan() {
            return None;
        }
        let ratio = (value - self.min) / (self.max - self.min);
        Some(ratio.clamp(0.0, 1.0))
    }

    pub fn encode(&self, value: f64) -> Rgb {
        match self.ratio(value) {
            Some(ratio) => {
                let red = (ratio * 255.0).round() as u8;
                let blue = ((1.0 - ratio) * 255.0).round() as u8;
                Srgb::new(red, 0, blue)
            }
            None => NEUTRAL_COLOR,
        }
    }
}

/// Encode `value` on the `[min, max]` gradient.
pub fn encode(value: f64, min: f64, max: f64) -> Rgb {
    ColorScale::new(min, max).encode(value)
}

// ---------------------------------------------------------------------------
// Categorical palette for non-numeric columns
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format()
        })
        .collect()
}

/// Maps the unique values of a chosen column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Value, Rgb>,
}

impl ColorMap {
    pub fn new(unique_values: &BTreeSet<Value>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping = unique_values.iter().cloned().zip(palette).collect();
        ColorMap { mapping }
    }

    pub fn from_column(values: &[Value]) -> Self {
        let unique: BTreeSet<Value> = values.iter().cloned().collect();
        Self::new(&unique)
    }

    pub fn color_for(&self, value: &Value) -> Rgb {
        self.mapping.get(value).copied().unwrap_or(NEUTRAL_COLOR)
    }
}

// ---------------------------------------------------------------------------
// Column encoding
// ---------------------------------------------------------------------------

/// How the values of the colour column become colours.
#[derive(Debug, Clone)]
pub enum ColorEncoding {
    Gradient(ColorScale),
    Categorical(ColorMap),
}

impl ColorEncoding {
    /// Pick an encoding for a column: a gradient when it holds numbers (over
    /// `fixed` when given, observed bounds otherwise), a palette when it doesn't.
    pub fn for_column(values: &[Value], fixed: Option<ColorScale>) -> Self {
        match (fixed, ColorScale::from_values(values)) {
            (Some(scale), Some(_)) => ColorEncoding::Gradient(scale),
            (None, Some(observed)) => ColorEncoding::Gradient(observed),
            (_, None) => ColorEncoding::Categorical(ColorMap::from_column(values)),
        }
    }

    pub fn color_for(&self, value: &Value) -> Rgb {
        match self {
            ColorEncoding::Gradient(scale) => value
                .as_f64()
                .map(|v| scale.encode(v))
                .unwrap_or(NEUTRAL_COLOR),
            ColorEncoding::Categorical(map) => map.color_for(value),
        }
    }

    pub fn scale(&self) -> Option<ColorScale> {
        match self {
            ColorEncoding::Gradient(scale) => Some(*scale),
            ColorEncoding::Categorical(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_rounds_both_channels_up() {
        let color = encode(750.0, 500.0, 1000.0);
        assert_eq!(to_css(color), "rgb(128,0,128)");
    }

    #[test]
    fn endpoints_are_pure_blue_and_red() {
        assert_eq!(encode(500.0, 500.0, 1000.0), Srgb::new(0, 0, 255));
        assert_eq!(encode(1000.0, 500.0, 1000.0), Srgb::new(255, 0, 0));
        assert_eq!(to_css(encode(600.0, 500.0, 1000.0)), "rgb(51,0,204)");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(encode(-1e9, 500.0, 1000.0), Srgb::new(0, 0, 255));
        assert_eq!(encode(1e9, 500.0, 1000.0), Srgb::new(255, 0, 0));
        assert_eq!(encode(f64::INFINITY, 500.0, 1000.0), Srgb::new(255, 0, 0));
    }

    #[test]
    fn degenerate_scale_falls_back_to_neutral() {
        assert_eq!(encode(600.0, 600.0, 600.0), NEUTRAL_COLOR);
        assert_eq!(encode(42.0, 600.0, 600.0), NEUTRAL_COLOR);
        assert_eq!(encode(f64::NAN, 0.0, 1.0), NEUTRAL_COLOR);
        assert!(ColorScale::new(1.0, f64::INFINITY).is_degenerate());
        assert_eq!(ColorScale::new(600.0, 600.0).ratio(600.0), None);
    }

    #[test]
    fn channels_stay_in_bounds_over_a_sweep() {
        let scale = ColorScale::new(-3.0, 7.5);
        for step in -200..=200 {
            let value = step as f64 * 0.1;
            let color = scale.encode(value);
            assert_eq!(color.green, 0);
            // the two channels split the full intensity
            let total = color.red as u16 + color.blue as u16;
            assert!((254..=256).contains(&total), "{value}: {total}");
        }
    }

    #[test]
    fn observed_scale_ignores_non_numeric() {
        let values = [Value::from(900.0), Value::from("n/a"), Value::Integer(550)];
        assert_eq!(ColorScale::from_values(&values), Some(ColorScale::new(550.0, 900.0)));
        assert_eq!(ColorScale::from_values(&[Value::from("x")]), None);
    }

    #[test]
    fn categorical_columns_get_distinct_colours() {
        let values = [Value::from("PC"), Value::from("KP"), Value::from("PC"), Value::from("FP")];
        let encoding = ColorEncoding::for_column(&values, None);
        assert!(encoding.scale().is_none());

        let pc = encoding.color_for(&Value::from("PC"));
        let kp = encoding.color_for(&Value::from("KP"));
        assert_ne!(pc, kp);
        assert_eq!(encoding.color_for(&Value::from("APC")), NEUTRAL_COLOR);

        // sorted unique values take evenly spaced hues: FP, KP, PC
        let palette = generate_palette(3);
        assert_eq!(encoding.color_for(&Value::from("FP")), palette[0]);
        assert_eq!(pc, palette[2]);
    }

    #[test]
    fn fixed_range_overrides_observed_bounds() {
        let values = [Value::from(700.0), Value::from(800.0)];
        let encoding = ColorEncoding::for_column(&values, Some(ColorScale::TEMPERATURE));
        assert_eq!(encoding.scale(), Some(ColorScale::TEMPERATURE));
        assert_eq!(to_css(encoding.color_for(&Value::from(750.0))), "rgb(128,0,128)");
    }

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }
}
