use crate::core::geo::{number_from_value, parse_number, GeoPoint, Point};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Axis-aligned rectangle in native units, stored as min/max corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Degenerate bounds around a single point
    pub fn from_point(point: Point) -> Self {
        Self::new(point, point)
    }

    /// Smallest bounds containing every point, `None` for an empty iterator
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self::from_point(first);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }
}

impl From<ViewBox> for Bounds {
    fn from(view_box: ViewBox) -> Self {
        Bounds::from_coords(
            view_box.x,
            view_box.y,
            view_box.x + view_box.width,
            view_box.y + view_box.height,
        )
    }
}

/// The logical window, in native units, mapped onto the map container.
///
/// Serialises as the SVG `viewBox` ordering `[min-x, min-y, width, height]`
/// and deserialises from that array, an `{x, y, width, height}` object, or a
/// `viewBox` attribute string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ViewBoxRepr", into = "[f64; 4]")]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ViewBoxRepr {
    Seq([f64; 4]),
    Object {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Text(String),
}

impl TryFrom<ViewBoxRepr> for ViewBox {
    type Error = MapError;

    fn try_from(repr: ViewBoxRepr) -> Result<Self> {
        match repr {
            ViewBoxRepr::Seq(values) => Ok(ViewBox::from(values)),
            ViewBoxRepr::Object {
                x,
                y,
                width,
                height,
            } => Ok(ViewBox::new(x, y, width, height)),
            ViewBoxRepr::Text(text) => ViewBox::parse(&text),
        }
    }
}

impl From<[f64; 4]> for ViewBox {
    fn from(values: [f64; 4]) -> Self {
        ViewBox::new(values[0], values[1], values[2], values[3])
    }
}

impl From<ViewBox> for [f64; 4] {
    fn from(view_box: ViewBox) -> Self {
        view_box.to_array()
    }
}

impl From<Bounds> for ViewBox {
    fn from(bounds: Bounds) -> Self {
        ViewBox::new(bounds.min.x, bounds.min.y, bounds.width(), bounds.height())
    }
}

impl ViewBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A box of the given size centred on `center`
    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// An all-zero box, the transient "not yet initialised" state
    pub fn empty() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Parses an SVG `viewBox` attribute: four numbers separated by whitespace and/or commas.
    pub fn parse(input: &str) -> Result<Self> {
        let values: Vec<f64> = input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| {
                parse_number(part)
                    .ok_or_else(|| MapError::InvalidViewBox(format!("non-numeric component {:?}", part)))
            })
            .collect::<Result<_>>()?;

        match values.as_slice() {
            [x, y, width, height] => Ok(Self::new(*x, *y, *width, *height)),
            _ => Err(MapError::InvalidViewBox(format!(
                "expected 4 numbers, got {} in {:?}",
                values.len(),
                input
            ))),
        }
    }

    /// Lenient form of [`ViewBox::parse`]: malformed input is logged and becomes [`ViewBox::empty`].
    pub fn parse_or_empty(input: &str) -> Self {
        Self::parse(input).unwrap_or_else(|err| {
            log::warn!("{}; using an empty view box", err);
            Self::empty()
        })
    }

    /// Reads loosely typed input: an attribute string, a 4-element array or an
    /// `{x, y, width, height}` object, with numeric strings accepted as components.
    /// Anything else is logged and becomes [`ViewBox::empty`].
    pub fn from_value(value: &Value) -> Self {
        view_box_from_value(value).unwrap_or_else(|| {
            log::warn!("invalid view box input {}, using an empty view box", value);
            Self::empty()
        })
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Renders the box in SVG attribute form
    pub fn to_attribute(&self) -> String {
        format!("{} {} {} {}", self.x, self.y, self.width, self.height)
    }

    /// Width and height are both strictly positive and finite
    pub fn is_valid(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
            && self.x.is_finite()
            && self.y.is_finite()
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Same size, re-centred on `center`
    pub fn centered_on(&self, center: Point) -> Self {
        Self::from_center(center, self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// True when both dimensions are large enough to hold `bounds`
    pub fn can_contain(&self, bounds: &Bounds) -> bool {
        self.width >= bounds.width() && self.height >= bounds.height()
    }

    /// Same-size comparison, used to tell a zoom from a pan
    pub fn same_size(&self, other: &ViewBox) -> bool {
        const TOLERANCE: f64 = 1e-9;
        (self.width - other.width).abs() <= TOLERANCE * self.width.abs().max(1.0)
            && (self.height - other.height).abs() <= TOLERANCE * self.height.abs().max(1.0)
    }
}

fn view_box_from_value(value: &Value) -> Option<ViewBox> {
    match value {
        Value::String(text) => ViewBox::parse(text).ok(),
        Value::Array(items) => {
            let values: Vec<f64> = items.iter().map(number_from_value).collect::<Option<_>>()?;
            <[f64; 4]>::try_from(values).ok().map(ViewBox::from)
        }
        Value::Object(map) => {
            let field = |name: &str| map.get(name).and_then(number_from_value);
            Some(ViewBox::new(
                field("x")?,
                field("y")?,
                field("width")?,
                field("height")?,
            ))
        }
        _ => None,
    }
}

/// The geographic frame of the native default view box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoViewBox {
    pub sw: GeoPoint,
    pub ne: GeoPoint,
}

impl GeoViewBox {
    pub fn new(sw: GeoPoint, ne: GeoPoint) -> Self {
        Self { sw, ne }
    }

    /// Builds the frame from the `[west, north, east, south]` attribute ordering.
    pub fn from_wnes(values: [f64; 4]) -> Self {
        let [west, north, east, south] = values;
        Self::new(GeoPoint::new(south, west), GeoPoint::new(north, east))
    }

    /// Parses a `geoViewBox="W N E S"` attribute value.
    pub fn parse(input: &str) -> Result<Self> {
        let parsed = ViewBox::parse(input).map_err(|_| {
            MapError::InvalidSource(format!("malformed geoViewBox {:?}", input))
        })?;
        Self::from_wnes(parsed.to_array()).validated()
    }

    /// Rejects frames a projection cannot be built on: a zero or non-finite span.
    pub fn validated(self) -> Result<Self> {
        let (lng_span, lat_span) = (self.lng_span(), self.lat_span());
        if !(lng_span.is_finite() && lat_span.is_finite()) || lng_span == 0.0 || lat_span == 0.0 {
            return Err(MapError::InvalidSource(format!(
                "degenerate geoViewBox from ({}, {}) to ({}, {})",
                self.sw.lat, self.sw.lng, self.ne.lat, self.ne.lng
            )));
        }
        Ok(self)
    }

    pub fn west(&self) -> f64 {
        self.sw.lng
    }

    pub fn east(&self) -> f64 {
        self.ne.lng
    }

    pub fn north(&self) -> f64 {
        self.ne.lat
    }

    pub fn south(&self) -> f64 {
        self.sw.lat
    }

    pub fn lng_span(&self) -> f64 {
        self.east() - self.west()
    }

    pub fn lat_span(&self) -> f64 {
        self.north() - self.south()
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south()
            && point.lat <= self.north()
            && point.lng >= self.west()
            && point.lng <= self.east()
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south() + self.north()) / 2.0,
            (self.west() + self.east()) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bounds_creation() {
        let bounds = Bounds::from_coords(10.0, 20.0, 30.0, 40.0);
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 20.0);
        assert_eq!(bounds.center(), Point::new(20.0, 30.0));
        assert!(bounds.contains(&Point::new(15.0, 25.0)));
        assert!(!bounds.contains(&Point::new(5.0, 25.0)));
    }

    #[test]
    fn test_bounds_from_points() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let bounds = Bounds::from_points(points.iter()).unwrap();
        assert_eq!(bounds, Bounds::from_coords(0.0, 0.0, 10.0, 10.0));
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_view_box_parse() {
        assert_eq!(ViewBox::parse("0 0 2000 1000").unwrap(), ViewBox::new(0.0, 0.0, 2000.0, 1000.0));
        assert_eq!(ViewBox::parse(" -5,10, 20 ,30 ").unwrap(), ViewBox::new(-5.0, 10.0, 20.0, 30.0));
        assert!(ViewBox::parse("0 0 10").is_err());
        assert!(ViewBox::parse("0 0 ten 10").is_err());
        assert_eq!(ViewBox::parse_or_empty("garbage"), ViewBox::empty());
    }

    #[test]
    fn test_view_box_serde_forms() {
        let from_seq: ViewBox = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
        let from_obj: ViewBox =
            serde_json::from_value(json!({"x": 1, "y": 2, "width": 3, "height": 4})).unwrap();
        let from_str: ViewBox = serde_json::from_value(json!("1 2 3 4")).unwrap();

        assert_eq!(from_seq, from_obj);
        assert_eq!(from_obj, from_str);
        assert_eq!(serde_json::to_value(from_seq).unwrap(), json!([1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_view_box_validity() {
        assert!(ViewBox::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!ViewBox::empty().is_valid());
        assert!(!ViewBox::new(0.0, 0.0, -1.0, 1.0).is_valid());
    }

    #[test]
    fn test_geo_view_box_parse() {
        let frame = GeoViewBox::parse("-10 50 10 30").unwrap();
        assert_eq!(frame.west(), -10.0);
        assert_eq!(frame.north(), 50.0);
        assert_eq!(frame.east(), 10.0);
        assert_eq!(frame.south(), 30.0);
        assert_eq!(frame.lng_span(), 20.0);
        assert!(frame.contains(&GeoPoint::new(40.0, 0.0)));
        assert!(GeoViewBox::parse("1 1 1 1").is_err());
        let flat = GeoViewBox::new(GeoPoint::new(0.0, 5.0), GeoPoint::new(10.0, 5.0));
        assert!(matches!(flat.validated(), Err(MapError::InvalidSource(_))));
    }
}
