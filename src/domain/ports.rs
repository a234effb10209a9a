use crate::domain::model::{MetricsFile, ProjectId};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read-only view over the metrics data directory.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Every project directory under the data root, sorted by name.
    async fn list_projects(&self) -> Result<Vec<ProjectId>>;

    /// Turns an untrusted name into a `ProjectId` that names an existing
    /// directory inside the data root.
    async fn validate_project(&self, candidate: &str) -> Result<ProjectId>;

    /// Iteration counts with a metrics file in the project, ascending.
    async fn list_iterations(&self, project: &ProjectId) -> Result<Vec<u64>>;

    async fn fetch_metrics(&self, project: &ProjectId, iteration: u64) -> Result<MetricsFile>;
}
