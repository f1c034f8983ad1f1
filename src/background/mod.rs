pub mod clustering;
pub mod tasks;

pub use clustering::{compute_clusters, ClusterRequest, ClusterResponse, ClusterTask};
pub use tasks::{BackgroundTask, BackgroundTaskManager, TaskManagerConfig, TaskPriority, TaskResult};
