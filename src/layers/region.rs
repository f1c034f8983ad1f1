use crate::{
    core::{bounds::Bounds, geo::Point},
    traits::MapObjectOps,
};
use geo::{BoundingRect, Centroid, Contains};
use geo_types::{Coord, LineString, Polygon};

/// A named area of the map, outlined in native units
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    pub title: Option<String>,
    shape: Polygon<f64>,
}

impl Region {
    pub fn new(id: impl Into<String>, shape: Polygon<f64>) -> Self {
        Self {
            id: id.into(),
            title: None,
            shape,
        }
    }

    /// Closed outline through `points`; the ring is closed automatically.
    pub fn from_points(id: impl Into<String>, points: &[Point]) -> Self {
        let ring: Vec<Coord<f64>> = points
            .iter()
            .map(|point| Coord {
                x: point.x,
                y: point.y,
            })
            .collect();
        Self::new(id, Polygon::new(LineString::new(ring), Vec::new()))
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn shape(&self) -> &Polygon<f64> {
        &self.shape
    }

    /// Point-in-polygon test in native units
    pub fn contains(&self, point: &Point) -> bool {
        self.shape.contains(&geo_types::Point::new(point.x, point.y))
    }
}

impl MapObjectOps for Region {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounding_box(&self) -> Option<Bounds> {
        self.shape
            .bounding_rect()
            .map(|rect| Bounds::from_coords(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    fn anchor(&self) -> Option<Point> {
        self.shape
            .centroid()
            .map(|centroid| Point::new(centroid.x(), centroid.y()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Region {
        Region::from_points(
            "square",
            &[
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
        )
        .with_title("Square")
    }

    #[test]
    fn test_bounding_box_and_anchor() {
        let region = square();
        assert_eq!(
            region.bounding_box(),
            Some(Bounds::from_coords(0.0, 0.0, 100.0, 100.0))
        );
        assert_eq!(region.anchor(), Some(Point::new(50.0, 50.0)));
        assert_eq!(region.title.as_deref(), Some("Square"));
    }

    #[test]
    fn test_contains() {
        let region = square();
        assert!(region.contains(&Point::new(20.0, 80.0)));
        assert!(!region.contains(&Point::new(120.0, 80.0)));
    }

    #[test]
    fn test_empty_outline() {
        let region = Region::from_points("empty", &[]);
        assert!(region.bounding_box().is_none());
        assert!(region.anchor().is_none());
        assert!(!region.contains(&Point::new(0.0, 0.0)));
    }
}
