//! Grid clustering of point markers, one grid per discrete zoom level.
//!
//! A marker lands in cell `(ceil(sx / cell), ceil(sy / cell))` where `(sx, sy)`
//! is its would-be screen position at that level. Markers sharing a cell form
//! one cluster whose centre is the midpoint of the members' bounding box,
//! updated incrementally as members are added.

use crate::core::{bounds::Bounds, geo::Point};
use crate::prelude::HashMap;
use serde::{Deserialize, Serialize};

/// A marker position fed to the bucketing pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterObject {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl ClusterObject {
    pub fn new(id: impl Into<String>, point: Point) -> Self {
        Self {
            id: id.into(),
            x: point.x,
            y: point.y,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub id: String,
}

/// Members of one grid cell at one zoom level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCell {
    /// Native-unit centre of the members' bounding box
    pub x: f64,
    pub y: f64,
    pub cell_x: i64,
    pub cell_y: i64,
    pub markers: Vec<ClusterMember>,
    #[serde(skip)]
    min: Point,
    #[serde(skip)]
    max: Point,
}

impl ClusterCell {
    fn new(cell_x: i64, cell_y: i64, first: &ClusterObject) -> Self {
        Self {
            x: first.x,
            y: first.y,
            cell_x,
            cell_y,
            markers: vec![ClusterMember {
                id: first.id.clone(),
            }],
            min: first.point(),
            max: first.point(),
        }
    }

    /// Adds a member, updating each axis of the running bounding box independently.
    fn add(&mut self, object: &ClusterObject) {
        self.min.x = self.min.x.min(object.x);
        self.max.x = self.max.x.max(object.x);
        self.min.y = self.min.y.min(object.y);
        self.max.y = self.max.y.max(object.y);

        self.x = (self.min.x + self.max.x) / 2.0;
        self.y = (self.min.y + self.max.y) / 2.0;
        self.markers.push(ClusterMember {
            id: object.id.clone(),
        });
    }

    pub fn key(&self) -> String {
        cell_key(self.cell_x, self.cell_y)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// Equality covers the wire fields only; the running extremes are not transmitted.
impl PartialEq for ClusterCell {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.cell_x == other.cell_x
            && self.cell_y == other.cell_y
            && self.markers == other.markers
    }
}

pub fn cell_key(cell_x: i64, cell_y: i64) -> String {
    format!("{}_{}", cell_x, cell_y)
}

/// How native points map to screen pixels at one zoom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelGrid {
    /// Native point that lands on screen pixel `(0, 0)`
    pub origin: Point,
    /// Screen pixels per native unit at this level
    pub scale: f64,
    /// Cell side in screen pixels
    pub cell_size: f64,
}

impl LevelGrid {
    pub fn new(origin: Point, scale: f64, cell_size: f64) -> Self {
        Self {
            origin,
            scale,
            cell_size,
        }
    }

    pub fn cell_of(&self, point: &Point) -> (i64, i64) {
        let screen_x = (point.x - self.origin.x) * self.scale;
        let screen_y = (point.y - self.origin.y) * self.scale;
        (
            (screen_x / self.cell_size).ceil() as i64,
            (screen_y / self.cell_size).ceil() as i64,
        )
    }

    fn is_usable(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0 && self.cell_size.is_finite() && self.cell_size > 0.0
    }
}

/// Buckets objects into cells for one level.
///
/// Cells come back in the order their first member was seen, so the output is
/// a pure function of the input order. Objects with non-finite coordinates
/// are skipped.
pub fn bucket_level(objects: &[ClusterObject], grid: &LevelGrid) -> Vec<ClusterCell> {
    if !grid.is_usable() {
        log::warn!("unusable clustering grid {:?}", grid);
        return Vec::new();
    }

    let mut slots: HashMap<(i64, i64), usize> = HashMap::default();
    let mut cells: Vec<ClusterCell> = Vec::new();

    for object in objects {
        let point = object.point();
        if !point.is_finite() {
            continue;
        }

        let (cell_x, cell_y) = grid.cell_of(&point);
        match slots.get(&(cell_x, cell_y)) {
            Some(&slot) => cells[slot].add(object),
            None => {
                slots.insert((cell_x, cell_y), cells.len());
                cells.push(ClusterCell::new(cell_x, cell_y, object));
            }
        }
    }

    cells
}

/// A renderable group of markers at one zoom level
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    /// Bounding-box centre of the members, native units
    pub center: Point,
    /// Bounding box of the members, native units
    pub bounds: Bounds,
    pub cell_x: i64,
    pub cell_y: i64,
    pub members: Vec<String>,
    pub zoom_level: i32,
}

impl Cluster {
    pub fn from_cell(cell: &ClusterCell, bounds: Bounds, zoom_level: i32) -> Self {
        Self {
            id: format!("cluster_{}_{}", cell.cell_x, cell.cell_y),
            center: cell.center(),
            bounds,
            cell_x: cell.cell_x,
            cell_y: cell.cell_y,
            members: cell.markers.iter().map(|m| m.id.clone()).collect(),
            zoom_level,
        }
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Single-member clusters are drawn as plain markers
    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }
}

/// Per-level cluster cache for one marker data set.
///
/// The cache is owned exclusively here and is thrown away whole whenever the
/// data set changes; each change bumps the generation so late results for an
/// older data set can be recognised and dropped.
#[derive(Debug, Default)]
pub struct Clustering {
    cell_size: f64,
    generation: u64,
    objects: Vec<ClusterObject>,
    cache: HashMap<i32, Vec<Cluster>>,
    pending: Option<u64>,
}

impl Clustering {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            ..Default::default()
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Changing the cell size invalidates every level.
    pub fn set_cell_size(&mut self, cell_size: f64) {
        self.cell_size = cell_size;
        self.invalidate();
    }

    /// Replaces the data set, discarding all cached levels.
    pub fn set_objects(&mut self, objects: Vec<ClusterObject>) {
        self.objects = objects
            .into_iter()
            .filter(|object| object.point().is_finite())
            .collect();
        self.invalidate();
    }

    /// Drops cached levels and any in-flight request
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.cache.clear();
        self.pending = None;
        log::debug!(
            "cluster cache reset, generation {} with {} objects",
            self.generation,
            self.objects.len()
        );
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.invalidate();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn objects(&self) -> &[ClusterObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clusters(&self, zoom_level: i32) -> Option<&[Cluster]> {
        self.cache.get(&zoom_level).map(Vec::as_slice)
    }

    pub fn has_level(&self, zoom_level: i32) -> bool {
        self.cache.contains_key(&zoom_level)
    }

    pub fn cached_levels(&self) -> usize {
        self.cache.len()
    }

    pub fn mark_pending(&mut self) {
        self.pending = Some(self.generation);
    }

    /// A request for the live data set is in flight
    pub fn is_pending(&self) -> bool {
        self.pending == Some(self.generation)
    }

    /// Stores clusters for a level, unless they belong to an older data set.
    pub fn store(&mut self, generation: u64, zoom_level: i32, clusters: Vec<Cluster>) -> bool {
        if generation != self.generation {
            log::debug!(
                "dropping clusters for level {} from stale generation {} (live {})",
                zoom_level,
                generation,
                self.generation
            );
            return false;
        }
        self.cache.insert(zoom_level, clusters);
        true
    }

    pub fn finish_pending(&mut self, generation: u64) {
        if self.pending == Some(generation) {
            self.pending = None;
        }
    }
}
