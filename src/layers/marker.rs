use crate::{
    core::{
        bounds::Bounds,
        geo::{GeoPoint, Point},
        projection::Projection,
    },
    traits::MapObjectOps,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point of interest, placed either in native units or geographically.
///
/// Whichever side is missing is filled in by [`Marker::resolve`] once the
/// map's projection is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    native: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geo: Option<GeoPoint>,
    /// Caller payload carried along untouched
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Marker {
    pub fn new(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            native: Some(position),
            geo: None,
            data: Value::Null,
        }
    }

    pub fn from_geo(id: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            id: id.into(),
            native: None,
            geo: Some(position),
            data: Value::Null,
        }
    }

    /// Reads a marker from a loose JSON object.
    ///
    /// `{"x": .., "y": ..}` places it natively, `{"lat": .., "lng": ..}`
    /// geographically. Anything else yields a marker without a position.
    pub fn from_value(id: impl Into<String>, value: &Value) -> Self {
        let id = id.into();
        let object = value.as_object();
        let has = |key: &str| object.map_or(false, |o| o.contains_key(key));

        let mut marker = if has("lat") && has("lng") {
            Self::from_geo(id, GeoPoint::from_value(value))
        } else if has("x") && has("y") {
            Self::new(id, Point::from_value(value))
        } else {
            log::warn!("marker {} has no recognisable position", id);
            Self {
                id,
                native: None,
                geo: None,
                data: Value::Null,
            }
        };
        marker.data = object
            .and_then(|o| o.get("data"))
            .cloned()
            .unwrap_or(Value::Null);
        marker
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn position(&self) -> Option<Point> {
        self.native.filter(Point::is_finite)
    }

    pub fn geo_position(&self) -> Option<GeoPoint> {
        self.geo
    }

    pub fn set_position(&mut self, position: Point) {
        self.native = Some(position);
        self.geo = None;
    }

    pub fn set_geo_position(&mut self, position: GeoPoint) {
        self.geo = Some(position);
        self.native = None;
    }

    /// Fills in the missing coordinate side from the projection.
    pub fn resolve(&mut self, projection: Option<&Projection>) {
        let Some(projection) = projection else {
            if self.native.is_none() && self.geo.is_some() {
                log::warn!("marker {} is geographic but the map has no projection", self.id);
            }
            return;
        };

        match (self.native, self.geo) {
            (None, Some(geo)) if geo.is_valid() => self.native = Some(projection.forward(&geo)),
            (Some(native), None) if native.is_finite() => {
                self.geo = Some(projection.inverse(&native))
            }
            _ => {}
        }
    }
}

impl MapObjectOps for Marker {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounding_box(&self) -> Option<Bounds> {
        self.position().map(Bounds::from_point)
    }

    fn anchor(&self) -> Option<Point> {
        self.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounds::{GeoViewBox, ViewBox};
    use serde_json::json;

    fn projection() -> Projection {
        Projection::new(
            GeoViewBox::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0, 10.0)),
            ViewBox::new(0.0, 0.0, 1000.0, 1000.0),
        )
    }

    #[test]
    fn test_from_value() {
        let native = Marker::from_value("a", &json!({"x": "5", "y": 7, "data": {"name": "A"}}));
        assert_eq!(native.position(), Some(Point::new(5.0, 7.0)));
        assert_eq!(native.data["name"], "A");

        let geo = Marker::from_value("b", &json!({"lat": 5, "lng": 5}));
        assert!(geo.position().is_none());
        assert_eq!(geo.geo_position(), Some(GeoPoint::new(5.0, 5.0)));

        let empty = Marker::from_value("c", &json!("nowhere"));
        assert!(empty.position().is_none());
        assert!(empty.geo_position().is_none());
    }

    #[test]
    fn test_resolve_fills_both_sides() {
        let projection = projection();

        let mut geo = Marker::from_geo("g", GeoPoint::new(5.0, 5.0));
        geo.resolve(Some(&projection));
        let native = geo.position().unwrap();
        assert!((native.x - 500.0).abs() < 1e-6);

        let mut flat = Marker::new("n", Point::new(500.0, 500.0));
        flat.resolve(Some(&projection));
        assert!((flat.geo_position().unwrap().lng - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_unresolved_geo_marker_has_no_anchor() {
        let mut marker = Marker::from_geo("g", GeoPoint::new(5.0, 5.0));
        marker.resolve(None);
        assert!(marker.anchor().is_none());
        assert!(marker.bounding_box().is_none());
    }
}
