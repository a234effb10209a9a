pub mod catalog;

pub use crate::domain::model::{MetricsFile, ProjectId};
pub use crate::domain::ports::MetricsStore;
pub use crate::utils::error::Result;
