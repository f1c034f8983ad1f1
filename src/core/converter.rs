use crate::core::{
    geo::{GeoPoint, Point, ScreenPoint},
    projection::Projection,
    viewport::ViewportController,
};

/// Converts between native units, screen pixels and geography.
///
/// Holds no state of its own: every answer is derived from the borrowed
/// viewport's scale and offsets and the projection's fixed frame.
///
/// "Screen" positions are measured from the native default origin at the
/// current scale, so they stay put while the viewport pans. "Container"
/// positions are measured from the container's top-left corner.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateConverter<'a> {
    viewport: &'a ViewportController,
    projection: Option<&'a Projection>,
    world_wrap: bool,
}

impl<'a> CoordinateConverter<'a> {
    pub fn new(
        viewport: &'a ViewportController,
        projection: Option<&'a Projection>,
        world_wrap: bool,
    ) -> Self {
        Self {
            viewport,
            projection,
            world_wrap,
        }
    }

    pub fn is_geographic(&self) -> bool {
        self.projection.is_some()
    }

    /// `(native - default origin) * scale`, shifted by whole worlds when wrapping
    pub fn native_to_screen(&self, point: &Point) -> ScreenPoint {
        let native = self.viewport.native_view_box();
        let scale = self.viewport.scale();

        let scaled = point.subtract(&native.origin()).multiply(scale);
        let wrap = if self.world_wrap { self.wrap_offset() } else { 0.0 };

        ScreenPoint::new(scaled.x + wrap, scaled.y)
    }

    /// Inverse of [`native_to_screen`](Self::native_to_screen) without the wrap correction.
    pub fn screen_to_native(&self, screen: &ScreenPoint) -> Point {
        let native = self.viewport.native_view_box();
        let scale = self.viewport.scale();
        Point::new(screen.x / scale + native.x, screen.y / scale + native.y)
    }

    pub fn native_to_container(&self, point: &Point) -> ScreenPoint {
        let screen = self.native_to_screen(point);
        let offset = self.viewport_offset();
        ScreenPoint::new(screen.x - offset.x, screen.y - offset.y)
    }

    pub fn container_to_native(&self, position: &ScreenPoint) -> Point {
        let view_box = self.viewport.view_box();
        let scale = self.viewport.scale();
        Point::new(position.x / scale + view_box.x, position.y / scale + view_box.y)
    }

    /// `None` on a non-geographic map
    pub fn geo_to_native(&self, geo: &GeoPoint) -> Option<Point> {
        self.projection.map(|projection| projection.forward(geo))
    }

    /// `None` on a non-geographic map
    pub fn native_to_geo(&self, point: &Point) -> Option<GeoPoint> {
        self.projection.map(|projection| projection.inverse(point))
    }

    pub fn geo_to_screen(&self, geo: &GeoPoint) -> Option<ScreenPoint> {
        self.geo_to_native(geo).map(|point| self.native_to_screen(&point))
    }

    pub fn screen_to_geo(&self, screen: &ScreenPoint) -> Option<GeoPoint> {
        self.native_to_geo(&self.screen_to_native(screen))
    }

    pub fn container_to_geo(&self, position: &ScreenPoint) -> Option<GeoPoint> {
        self.native_to_geo(&self.container_to_native(position))
    }

    /// Pixel offset of the current view box from the native origin
    fn viewport_offset(&self) -> ScreenPoint {
        let native = self.viewport.native_view_box();
        let view_box = self.viewport.view_box();
        let scale = self.viewport.scale();
        ScreenPoint::new((view_box.x - native.x) * scale, (view_box.y - native.y) * scale)
    }

    /// Whole-world shift keeping entities visible after panning past a world width
    fn wrap_offset(&self) -> f64 {
        let native = self.viewport.native_view_box();
        let delta = self.viewport.view_box().x - native.x;
        if delta.abs() <= native.width {
            return 0.0;
        }
        let world_pixel_width = native.width * self.viewport.scale();
        (delta / native.width).floor() * world_pixel_width
    }
}
