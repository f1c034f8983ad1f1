//! Background clustering tasks
//!
//! The request/response pair exchanged with the worker thread, plus the
//! task that runs grid bucketing for every requested zoom level off the
//! main thread. Both types serialize to the camelCase JSON message format,
//! so they can also cross a process or web-worker boundary unchanged.

use crate::background::tasks::{BackgroundTask, TaskPriority};
use crate::core::{bounds::ViewBox, viewport::ZoomLevel};
use crate::spatial::clustering::{bucket_level, ClusterCell, ClusterObject, LevelGrid};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;

/// Everything the worker needs to cluster one data set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRequest {
    pub objects: Vec<ClusterObject>,
    /// Cell side in screen pixels
    pub cell_size: f64,
    /// Container width in pixels
    pub map_width: f64,
    /// Levels to compute, keyed by level number
    pub zoom_levels: BTreeMap<i32, ZoomLevel>,
    /// Level the viewport is currently at; computed first
    pub zoom_level: i32,
    pub zoom_delta: f64,
    /// Native default view box; screen pixel `(0, 0)` is its origin
    pub svg_view_box: ViewBox,
    /// Data set the objects belong to
    #[serde(default)]
    pub generation: u64,
}

impl ClusterRequest {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Levels in processing order: the current one, then the rest ascending
    pub fn level_order(&self) -> Vec<i32> {
        let mut order = Vec::with_capacity(self.zoom_levels.len());
        if self.zoom_levels.contains_key(&self.zoom_level) {
            order.push(self.zoom_level);
        }
        order.extend(
            self.zoom_levels
                .keys()
                .copied()
                .filter(|&level| level != self.zoom_level),
        );
        order
    }

    pub fn grid_for(&self, level: &ZoomLevel) -> LevelGrid {
        LevelGrid::new(
            self.svg_view_box.origin(),
            self.map_width / level.view_box.width,
            self.cell_size,
        )
    }
}

/// Clusters of one zoom level, keyed `"cellX_cellY"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResponse {
    pub zoom_level: i32,
    pub clusters: BTreeMap<String, ClusterCell>,
    #[serde(default)]
    pub generation: u64,
}

impl ClusterResponse {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a worker message; malformed input is an error, never a panic.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Cells in key order
    pub fn cells(&self) -> Vec<&ClusterCell> {
        self.clusters.values().collect()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }
}

/// Runs bucketing for every level of the request, current level first.
pub fn compute_clusters(request: &ClusterRequest) -> Vec<ClusterResponse> {
    request
        .level_order()
        .into_iter()
        .filter_map(|level| {
            let zoom_level = request.zoom_levels.get(&level)?;
            let grid = request.grid_for(zoom_level);
            let clusters = bucket_level(&request.objects, &grid)
                .into_iter()
                .map(|cell| (cell.key(), cell))
                .collect();

            Some(ClusterResponse {
                zoom_level: level,
                clusters,
                generation: request.generation,
            })
        })
        .collect()
}

/// Task for performing marker clustering in the background
pub struct ClusterTask {
    task_id: String,
    request: ClusterRequest,
    priority: TaskPriority,
}

impl ClusterTask {
    pub fn new(request: ClusterRequest) -> Self {
        Self {
            task_id: format!("cluster-{}-{}", request.generation, request.zoom_level),
            request,
            priority: TaskPriority::High,
        }
    }

    pub fn request(&self) -> &ClusterRequest {
        &self.request
    }

    /// Dataset generation encoded in a `cluster-{generation}-{level}` task id
    pub fn generation_of(task_id: &str) -> Option<u64> {
        task_id
            .strip_prefix("cluster-")?
            .split('-')
            .next()?
            .parse()
            .ok()
    }
}

impl BackgroundTask for ClusterTask {
    fn execute(&self) -> Result<Box<dyn Any + Send>> {
        if !(self.request.map_width.is_finite() && self.request.map_width > 0.0) {
            return Err(MapError::Worker(format!(
                "cannot cluster for map width {}",
                self.request.map_width
            )));
        }
        let responses = compute_clusters(&self.request);
        log::debug!(
            "clustered {} objects into {} levels",
            self.request.objects.len(),
            responses.len()
        );
        Ok(Box::new(responses))
    }

    fn task_id(&self) -> &str {
        &self.task_id
    }

    fn priority(&self) -> TaskPriority {
        self.priority
    }
}

/// Pulls the responses back out of a finished task's payload
pub fn take_responses(payload: Box<dyn Any + Send>) -> Result<Vec<ClusterResponse>> {
    payload
        .downcast::<Vec<ClusterResponse>>()
        .map(|responses| *responses)
        .map_err(|_| MapError::Worker("unexpected payload from clustering task".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{geo::Point, viewport::ZoomTable};

    fn request(objects: Vec<ClusterObject>) -> ClusterRequest {
        let native = ViewBox::new(0.0, 0.0, 1000.0, 1000.0);
        let table = ZoomTable::new(native, 2.0);
        ClusterRequest {
            objects,
            cell_size: 50.0,
            map_width: 1000.0,
            zoom_levels: (0..=3)
                .filter_map(|level| table.get(level).map(|z| (level, *z)))
                .collect(),
            zoom_level: 2,
            zoom_delta: 2.0,
            svg_view_box: native,
            generation: 4,
        }
    }

    fn objects() -> Vec<ClusterObject> {
        vec![
            ClusterObject::new("a", Point::new(10.0, 10.0)),
            ClusterObject::new("b", Point::new(30.0, 30.0)),
            ClusterObject::new("c", Point::new(900.0, 900.0)),
        ]
    }

    #[test]
    fn test_current_level_first() {
        let responses = compute_clusters(&request(objects()));
        let levels: Vec<i32> = responses.iter().map(|r| r.zoom_level).collect();
        assert_eq!(levels, vec![2, 0, 1, 3]);
        assert!(responses.iter().all(|r| r.generation == 4));
    }

    #[test]
    fn test_cells_split_as_zoom_grows() {
        let responses = compute_clusters(&request(objects()));
        let count = |level: i32| {
            responses
                .iter()
                .find(|r| r.zoom_level == level)
                .map(ClusterResponse::cluster_count)
                .unwrap()
        };
        // level 0: a and b are 20px apart inside one 50px cell
        assert_eq!(count(0), 2);
        // level 2: scale 4, a and b are 80px apart
        assert_eq!(count(2), 3);
        assert!(count(3) >= count(0));
    }

    #[test]
    fn test_cell_keys() {
        let responses = compute_clusters(&request(objects()));
        let level0 = responses.iter().find(|r| r.zoom_level == 0).unwrap();
        let cell = level0.clusters.get("1_1").unwrap();
        assert_eq!(cell.len(), 2);
        assert_eq!(cell.center(), Point::new(20.0, 20.0));
        assert!(level0.clusters.contains_key("18_18"));
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = request(objects()).to_json().unwrap();
        assert!(json.contains("\"cellSize\":50"));
        assert!(json.contains("\"mapWidth\""));
        assert!(json.contains("\"zoomLevels\""));
        assert!(json.contains("\"svgViewBox\":[0.0,0.0,1000.0,1000.0]"));

        let parsed = ClusterRequest::from_json(&json).unwrap();
        assert_eq!(parsed.zoom_levels.len(), 4);

        let response = &compute_clusters(&parsed)[0];
        let json = response.to_json().unwrap();
        assert!(json.contains("\"zoomLevel\":2"));
        assert!(json.contains("\"cellX\""));
        assert_eq!(ClusterResponse::from_json(&json).unwrap().cluster_count(), 3);
    }

    #[test]
    fn test_malformed_response_is_an_error() {
        assert!(ClusterResponse::from_json("{\"zoomLevel\": \"two\"}").is_err());
        assert!(ClusterResponse::from_json("not json").is_err());
    }

    #[test]
    fn test_task_payload() {
        let task = ClusterTask::new(request(objects()));
        assert_eq!(task.task_id(), "cluster-4-2");
        assert_eq!(ClusterTask::generation_of(task.task_id()), Some(4));
        assert_eq!(ClusterTask::generation_of("cluster-7--3"), Some(7));
        assert_eq!(ClusterTask::generation_of("tile-4-2"), None);
        let responses = take_responses(task.execute().unwrap()).unwrap();
        assert_eq!(responses.len(), 4);

        let wrong: Box<dyn Any + Send> = Box::new(5u8);
        assert!(take_responses(wrong).is_err());
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let mut bad = request(objects());
        bad.map_width = 0.0;
        assert!(ClusterTask::new(bad).execute().is_err());
    }
}
