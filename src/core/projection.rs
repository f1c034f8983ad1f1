//! Mercator-style mapping between native map units and geography.
//!
//! The native default view box is treated as a window onto a Mercator world
//! whose horizontal resolution is fixed by the longitude span of the
//! [`GeoViewBox`]. The south edge of the frame sits on the bottom of the view
//! box and native y grows downwards.

use crate::core::{
    bounds::{Bounds, GeoViewBox, ViewBox},
    constants::GEO_DECIMALS,
    geo::{GeoPoint, Point},
};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    frame: GeoViewBox,
    native: ViewBox,
    /// Native units per radian of longitude
    radius: f64,
    /// Mercator y of the frame's southern latitude, in native units
    offset_y: f64,
}

impl Projection {
    /// Builds the projection for a map whose default view box covers `frame`.
    pub fn new(frame: GeoViewBox, native: ViewBox) -> Self {
        let units_per_degree = native.width / frame.lng_span();
        let radius = units_per_degree * 360.0 / (2.0 * PI);
        let offset_y = mercator_y(radius, frame.south());

        Self {
            frame,
            native,
            radius,
            offset_y,
        }
    }

    pub fn frame(&self) -> &GeoViewBox {
        &self.frame
    }

    pub fn native_view_box(&self) -> &ViewBox {
        &self.native
    }

    /// Geographic point to native units
    pub fn forward(&self, geo: &GeoPoint) -> Point {
        let x = (geo.lng - self.frame.west()) * (self.native.width / self.frame.lng_span());
        let y = self.native.height - (mercator_y(self.radius, geo.lat) - self.offset_y);

        Point::new(x + self.native.x, y + self.native.y)
    }

    /// Native units to a geographic point rounded to six decimals
    pub fn inverse(&self, point: &Point) -> GeoPoint {
        let x = point.x - self.native.x;
        let y = point.y - self.native.y;

        let equator_y = self.native.height + self.offset_y;
        let a = (equator_y - y) / self.radius;
        let lat = (2.0 * a.exp().atan() - PI / 2.0).to_degrees();
        let lng = self.frame.west() + x / self.native.width * self.frame.lng_span();

        GeoPoint::new(lat, lng).rounded(GEO_DECIMALS)
    }

    /// Projects geographic bounds into a native bounding box.
    pub fn forward_bounds(&self, geo: &GeoViewBox) -> Bounds {
        let north_west = self.forward(&GeoPoint::new(geo.north(), geo.west()));
        let south_east = self.forward(&GeoPoint::new(geo.south(), geo.east()));
        let mut bounds = Bounds::from_point(north_west);
        bounds.extend(&south_east);
        bounds
    }
}

fn mercator_y(radius: f64, lat_deg: f64) -> f64 {
    let sin = lat_deg.to_radians().sin();
    radius / 2.0 * ((1.0 + sin) / (1.0 - sin)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_projection() -> Projection {
        Projection::new(
            GeoViewBox::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0, 10.0)),
            ViewBox::new(0.0, 0.0, 1000.0, 1000.0),
        )
    }

    #[test]
    fn test_round_trip_center() {
        let projection = square_projection();
        let native = projection.forward(&GeoPoint::new(5.0, 5.0));
        let back = projection.inverse(&native);

        assert!((back.lat - 5.0).abs() < 1e-4);
        assert!((back.lng - 5.0).abs() < 1e-4);
        assert!((native.x - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_grid() {
        let projection = Projection::new(
            GeoViewBox::from_wnes([-10.0, 50.0, 10.0, 30.0]),
            ViewBox::new(100.0, -50.0, 2000.0, 1000.0),
        );

        for lat_step in 0..=10 {
            for lng_step in 0..=10 {
                let geo = GeoPoint::new(30.0 + lat_step as f64 * 2.0, -10.0 + lng_step as f64 * 2.0);
                let back = projection.inverse(&projection.forward(&geo));
                assert!((back.lat - geo.lat).abs() < 1e-4, "lat {} -> {}", geo.lat, back.lat);
                assert!((back.lng - geo.lng).abs() < 1e-4, "lng {} -> {}", geo.lng, back.lng);
            }
        }
    }

    #[test]
    fn test_south_west_corner_maps_to_bottom_left() {
        let projection = square_projection();
        let corner = projection.forward(&GeoPoint::new(0.0, 0.0));
        assert!((corner.x - 0.0).abs() < 1e-9);
        assert!((corner.y - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_y_increases_southwards() {
        let projection = square_projection();
        let north = projection.forward(&GeoPoint::new(8.0, 5.0));
        let south = projection.forward(&GeoPoint::new(2.0, 5.0));
        assert!(north.y < south.y);
    }

    #[test]
    fn test_forward_bounds() {
        let projection = square_projection();
        let bounds = projection.forward_bounds(&GeoViewBox::new(
            GeoPoint::new(2.0, 2.0),
            GeoPoint::new(4.0, 4.0),
        ));
        assert!(bounds.is_valid());
        assert!((bounds.min.x - 200.0).abs() < 1e-9);
        assert!((bounds.max.x - 400.0).abs() < 1e-9);
        assert!(bounds.min.y < bounds.max.y);
    }
}
