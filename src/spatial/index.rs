use crate::core::{bounds::Bounds, geo::Point};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A marker position that can be indexed via an R-tree
#[derive(Debug, Clone)]
pub struct IndexedMarker {
    pub id: String,
    pub point: Point,
}

impl IndexedMarker {
    pub fn new(id: impl Into<String>, point: Point) -> Self {
        Self {
            id: id.into(),
            point,
        }
    }
}

impl PartialEq for IndexedMarker {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for IndexedMarker {}

// --- rstar integration -------------------------------------------------------------------------

impl RTreeObject for IndexedMarker {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x, self.point.y])
    }
}

impl PointDistance for IndexedMarker {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point.x - point[0];
        let dy = self.point.y - point[1];
        dx * dx + dy * dy
    }
}

fn envelope_of(bounds: &Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners([bounds.min.x, bounds.min.y], [bounds.max.x, bounds.max.y])
}

/// R-tree over marker positions in native units
#[derive(Debug, Default)]
pub struct MarkerIndex {
    rtree: RTree<IndexedMarker>,
    bounds: Option<Bounds>,
}

impl MarkerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the tree in one pass; non-finite positions are left out.
    pub fn bulk_load(items: Vec<IndexedMarker>) -> Self {
        let items: Vec<IndexedMarker> = items
            .into_iter()
            .filter(|item| item.point.is_finite())
            .collect();
        let bounds = Bounds::from_points(items.iter().map(|item| &item.point));

        Self {
            rtree: RTree::bulk_load(items),
            bounds,
        }
    }

    pub fn insert(&mut self, item: IndexedMarker) {
        if !item.point.is_finite() {
            log::warn!("not indexing marker {} with position {:?}", item.id, item.point);
            return;
        }

        match self.bounds {
            Some(ref mut bounds) => bounds.extend(&item.point),
            None => self.bounds = Some(Bounds::from_point(item.point)),
        }
        self.rtree.insert(item);
    }

    pub fn query(&self, bounds: &Bounds) -> Vec<&IndexedMarker> {
        self.rtree
            .locate_in_envelope_intersecting(&envelope_of(bounds))
            .collect()
    }

    /// Closest marker no further than `radius` from `center`
    pub fn nearest_within(&self, center: &Point, radius: f64) -> Option<&IndexedMarker> {
        self.rtree
            .nearest_neighbor(&[center.x, center.y])
            .filter(|item| item.point.distance_to(center) <= radius)
    }

    pub fn query_radius(&self, center: &Point, radius: f64) -> Vec<&IndexedMarker> {
        self.rtree
            .locate_within_distance([center.x, center.y], radius * radius)
            .collect()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn clear(&mut self) {
        self.rtree = RTree::new();
        self.bounds = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> MarkerIndex {
        MarkerIndex::bulk_load(vec![
            IndexedMarker::new("a", Point::new(10.0, 10.0)),
            IndexedMarker::new("b", Point::new(50.0, 50.0)),
            IndexedMarker::new("c", Point::new(90.0, 20.0)),
            IndexedMarker::new("bad", Point::new(f64::NAN, 0.0)),
        ])
    }

    #[test]
    fn test_bulk_load_skips_invalid() {
        let index = index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.bounds(), Some(Bounds::from_coords(10.0, 10.0, 90.0, 50.0)));
    }

    #[test]
    fn test_query_bounds() {
        let index = index();
        let mut ids: Vec<_> = index
            .query(&Bounds::from_coords(0.0, 0.0, 60.0, 60.0))
            .into_iter()
            .map(|item| item.id.as_str())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_nearest_within() {
        let index = index();
        assert_eq!(
            index.nearest_within(&Point::new(52.0, 49.0), 5.0).map(|i| i.id.as_str()),
            Some("b")
        );
        assert!(index.nearest_within(&Point::new(70.0, 70.0), 5.0).is_none());
        assert_eq!(index.query_radius(&Point::new(10.0, 12.0), 3.0).len(), 1);
    }

    #[test]
    fn test_insert_and_clear() {
        let mut index = MarkerIndex::new();
        assert!(index.is_empty());
        index.insert(IndexedMarker::new("x", Point::new(1.0, 2.0)));
        index.insert(IndexedMarker::new("y", Point::new(-1.0, 4.0)));
        assert_eq!(index.bounds(), Some(Bounds::from_coords(-1.0, 2.0, 1.0, 4.0)));
        index.clear();
        assert!(index.is_empty());
        assert!(index.bounds().is_none());
    }
}
