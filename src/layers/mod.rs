//! Objects placed on the map surface

pub mod marker;
pub mod object;
pub mod region;

pub use marker::Marker;
pub use object::{MapObject, ObjectKind, RenderItem};
pub use region::Region;
