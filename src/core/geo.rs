use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point in the map's native SVG units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Builds a point from loosely typed input.
    ///
    /// Accepts `[x, y]` or `{"x": .., "y": ..}` where each component is a
    /// number or a numeric string. Anything else is logged and becomes `(0, 0)`.
    pub fn from_value(value: &Value) -> Self {
        match pair_from_value(value, "x", "y") {
            Some((x, y)) => Self::new(x, y),
            None => {
                log::warn!("invalid point input {}, defaulting to (0, 0)", value);
                Self::default()
            }
        }
    }

    /// Parses a point from two string components, defaulting invalid input to `(0, 0)`.
    pub fn parse(x: &str, y: &str) -> Self {
        match (parse_number(x), parse_number(y)) {
            (Some(x), Some(y)) => Self::new(x, y),
            _ => {
                log::warn!("invalid point components ({:?}, {:?}), defaulting to (0, 0)", x, y);
                Self::default()
            }
        }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Same coercion rules as [`Point::from_value`], with `lat`/`lng` keys.
    /// Arrays are read as `[lat, lng]`.
    pub fn from_value(value: &Value) -> Self {
        match pair_from_value(value, "lat", "lng") {
            Some((lat, lng)) => Self::new(lat, lng),
            None => {
                log::warn!("invalid geo point input {}, defaulting to (0, 0)", value);
                Self::default()
            }
        }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Rounds both components to `decimals` digits.
    pub fn rounded(&self, decimals: i32) -> Self {
        Self::new(round_to(self.lat, decimals), round_to(self.lng, decimals))
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A position in on-screen pixels, post-scale and post-pan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for ScreenPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Numeric coercion for a single JSON value: numbers pass through, strings are parsed.
pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Parses the leading numeric part of a string, so `"12.5px"` reads as `12.5`.
pub(crate) fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return Some(value).filter(|v| v.is_finite());
    }

    let end = trimmed
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0) || c == 'e' || c == 'E')
        })
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    trimmed[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn pair_from_value(value: &Value, first: &str, second: &str) -> Option<(f64, f64)> {
    match value {
        Value::Array(items) if items.len() == 2 => {
            Some((number_from_value(&items[0])?, number_from_value(&items[1])?))
        }
        Value::Object(map) => Some((
            number_from_value(map.get(first)?)?,
            number_from_value(map.get(second)?)?,
        )),
        _ => None,
    }
}
