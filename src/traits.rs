//! Shared trait abstractions
//!
//! The seams between the map and the things it manages: work handed to the
//! background worker, and objects drawn on the map surface.

use crate::{
    background::tasks::TaskPriority,
    core::{bounds::Bounds, converter::CoordinateConverter, geo::Point, geo::ScreenPoint},
    Result,
};
use std::any::Any;

/// Work that can run on the background worker thread
pub trait BackgroundTask: Send + Sync {
    /// Execute the task and return the result
    fn execute(&self) -> Result<Box<dyn Any + Send>>;

    /// Get the task ID
    fn task_id(&self) -> &str;

    /// Get the task priority
    fn priority(&self) -> TaskPriority {
        TaskPriority::Normal
    }
}

/// Common behaviour of everything placed on the map surface
pub trait MapObjectOps {
    fn id(&self) -> &str;

    /// Extent in native units, if the object has a resolved position
    fn bounding_box(&self) -> Option<Bounds>;

    /// Point the object is drawn at, in native units
    fn anchor(&self) -> Option<Point>;

    /// Anchor position relative to the container's top-left corner
    fn screen_position(&self, converter: &CoordinateConverter<'_>) -> Option<ScreenPoint> {
        self.anchor()
            .map(|anchor| converter.native_to_container(&anchor))
    }
}
