pub mod clustering;
pub mod index;

pub use clustering::{Cluster, ClusterCell, ClusterObject, Clustering, LevelGrid};
pub use index::{IndexedMarker, MarkerIndex};
