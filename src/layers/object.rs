use crate::{
    core::{bounds::Bounds, geo::Point, geo::ScreenPoint},
    layers::{marker::Marker, region::Region},
    spatial::clustering::Cluster,
    traits::MapObjectOps,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Region,
    Marker,
    Cluster,
}

/// Anything drawn on the map surface
#[derive(Debug, Clone, PartialEq)]
pub enum MapObject {
    Region(Region),
    Marker(Marker),
    Cluster(Cluster),
}

impl MapObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            MapObject::Region(_) => ObjectKind::Region,
            MapObject::Marker(_) => ObjectKind::Marker,
            MapObject::Cluster(_) => ObjectKind::Cluster,
        }
    }
}

impl MapObjectOps for Cluster {
    fn id(&self) -> &str {
        &self.id
    }

    fn bounding_box(&self) -> Option<Bounds> {
        Some(self.bounds)
    }

    fn anchor(&self) -> Option<Point> {
        Some(self.center)
    }
}

impl MapObjectOps for MapObject {
    fn id(&self) -> &str {
        match self {
            MapObject::Region(region) => region.id(),
            MapObject::Marker(marker) => marker.id(),
            MapObject::Cluster(cluster) => cluster.id(),
        }
    }

    fn bounding_box(&self) -> Option<Bounds> {
        match self {
            MapObject::Region(region) => region.bounding_box(),
            MapObject::Marker(marker) => marker.bounding_box(),
            MapObject::Cluster(cluster) => cluster.bounding_box(),
        }
    }

    fn anchor(&self) -> Option<Point> {
        match self {
            MapObject::Region(region) => region.anchor(),
            MapObject::Marker(marker) => marker.anchor(),
            MapObject::Cluster(cluster) => cluster.anchor(),
        }
    }
}

impl From<Region> for MapObject {
    fn from(region: Region) -> Self {
        MapObject::Region(region)
    }
}

impl From<Marker> for MapObject {
    fn from(marker: Marker) -> Self {
        MapObject::Marker(marker)
    }
}

impl From<Cluster> for MapObject {
    fn from(cluster: Cluster) -> Self {
        MapObject::Cluster(cluster)
    }
}

/// One thing to draw, positioned relative to the container
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub id: String,
    pub kind: ObjectKind,
    pub position: ScreenPoint,
    /// Markers represented; 1 for regions and plain markers
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegation() {
        let marker: MapObject = Marker::new("m", Point::new(3.0, 4.0)).into();
        assert_eq!(marker.kind(), ObjectKind::Marker);
        assert_eq!(marker.id(), "m");
        assert_eq!(marker.anchor(), Some(Point::new(3.0, 4.0)));

        let cluster: MapObject = Cluster {
            id: "cluster_1_1".to_string(),
            center: Point::new(5.0, 5.0),
            bounds: Bounds::from_coords(0.0, 0.0, 10.0, 10.0),
            cell_x: 1,
            cell_y: 1,
            members: vec!["a".to_string(), "b".to_string()],
            zoom_level: 0,
        }
        .into();
        assert_eq!(cluster.kind(), ObjectKind::Cluster);
        assert_eq!(cluster.bounding_box().map(|b| b.width()), Some(10.0));
    }
}
