use crate::core::catalog::{self, metrics_file_name};
use crate::core::{MetricsFile, MetricsStore, ProjectId, Result};
use crate::utils::error::MetricsError;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Metrics store backed by a directory on the local filesystem.
///
/// The directory is owned by whatever produces the metrics; this store never
/// writes to it.
#[derive(Debug, Clone)]
pub struct LocalMetricsStore {
    root: PathBuf,
}

impl LocalMetricsStore {
    /// Opens the data root. Fails when it is missing, not a directory or not
    /// readable; callers treat that as fatal.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let path = data_dir.as_ref();
        let unavailable = |source: io::Error| MetricsError::DataRootUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let root = fs::canonicalize(path).await.map_err(unavailable)?;
        let metadata = fs::metadata(&root).await.map_err(unavailable)?;
        if !metadata.is_dir() {
            return Err(unavailable(io::Error::other("not a directory")));
        }
        // 確認目錄可讀
        fs::read_dir(&root).await.map_err(unavailable)?;

        tracing::debug!("Data root resolved to {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical directory for `name` when it exists and stays inside the
    /// root (a symlink pointing elsewhere does not count).
    async fn resolve_project_dir(&self, name: &str) -> Option<PathBuf> {
        let canonical = fs::canonicalize(self.root.join(name)).await.ok()?;
        if canonical == self.root || !canonical.starts_with(&self.root) {
            return None;
        }
        let metadata = fs::metadata(&canonical).await.ok()?;
        metadata.is_dir().then_some(canonical)
    }

    async fn is_regular_file(path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}

#[async_trait]
impl MetricsStore for LocalMetricsStore {
    async fn list_projects(&self) -> Result<Vec<ProjectId>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut projects = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!("Skipping non UTF-8 entry {:?}", entry.file_name());
                continue;
            };
            let Ok(project) = ProjectId::parse(&name) else {
                continue;
            };
            if self.resolve_project_dir(&name).await.is_some() {
                projects.push(project);
            }
        }

        projects.sort();
        Ok(projects)
    }

    async fn validate_project(&self, candidate: &str) -> Result<ProjectId> {
        let project = ProjectId::parse(candidate)?;
        match self.resolve_project_dir(candidate).await {
            Some(_) => Ok(project),
            None => Err(MetricsError::ProjectNotFound {
                name: candidate.to_string(),
            }),
        }
    }

    async fn list_iterations(&self, project: &ProjectId) -> Result<Vec<u64>> {
        let dir = self.root.join(project.as_str());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MetricsError::ProjectNotFound {
                    name: project.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut file_names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if catalog::parse_iteration(&name).is_none() {
                continue;
            }
            if Self::is_regular_file(&entry.path()).await {
                file_names.push(name);
            }
        }

        let iterations = catalog::collect_iterations(&file_names);
        tracing::debug!(
            "Project {} has {} iteration(s)",
            project,
            iterations.len()
        );
        Ok(iterations)
    }

    async fn fetch_metrics(&self, project: &ProjectId, iteration: u64) -> Result<MetricsFile> {
        let file_name = metrics_file_name(iteration);
        let path = self.root.join(project.as_str()).join(&file_name);
        let not_found = || MetricsError::MetricsNotFound {
            project: project.to_string(),
            iteration,
        };

        // 列出與讀取之間檔案可能被移除，視為找不到
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        Ok(MetricsFile {
            file_name,
            len: metadata.len(),
            file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        std::fs::create_dir(root.join("alpha")).unwrap();
        std::fs::create_dir(root.join("beta")).unwrap();
        std::fs::write(root.join("README.md"), "not a project").unwrap();

        std::fs::write(root.join("alpha/metrics_data_5.csv"), "a,b\n1,2\n").unwrap();
        std::fs::write(root.join("alpha/metrics_data_100.csv"), "a,b\n3,4\n").unwrap();
        std::fs::write(root.join("alpha/metrics_data_20.csv"), "a,b\n5,6\n").unwrap();
        std::fs::write(root.join("alpha/notes.txt"), "ignore me").unwrap();
        std::fs::create_dir(root.join("alpha/metrics_data_7.csv")).unwrap();

        temp_dir
    }

    #[tokio::test]
    async fn test_open_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let err = LocalMetricsStore::open(&missing).await.unwrap_err();
        assert!(matches!(err, MetricsError::DataRootUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_open_rejects_file_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("data.csv");
        std::fs::write(&file, "x").unwrap();

        let err = LocalMetricsStore::open(&file).await.unwrap_err();
        assert!(matches!(err, MetricsError::DataRootUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_list_projects_only_directories() {
        let temp_dir = fixture();
        let store = LocalMetricsStore::open(temp_dir.path()).await.unwrap();

        let projects = store.list_projects().await.unwrap();
        let names: Vec<&str> = projects.iter().map(ProjectId::as_str).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_validate_project() {
        let temp_dir = fixture();
        let store = LocalMetricsStore::open(temp_dir.path()).await.unwrap();

        assert_eq!(store.validate_project("alpha").await.unwrap().as_str(), "alpha");
        assert!(matches!(
            store.validate_project("gamma").await,
            Err(MetricsError::ProjectNotFound { .. })
        ));
        assert!(matches!(
            store.validate_project("README.md").await,
            Err(MetricsError::ProjectNotFound { .. })
        ));
        assert!(matches!(
            store.validate_project("..").await,
            Err(MetricsError::InvalidProject { .. })
        ));
        assert!(matches!(
            store.validate_project("alpha/../beta").await,
            Err(MetricsError::InvalidProject { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_outside_root_is_not_a_project() {
        let outside = TempDir::new().unwrap();
        let temp_dir = fixture();
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("escape")).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("beta"), temp_dir.path().join("beta-link"))
            .unwrap();

        let store = LocalMetricsStore::open(temp_dir.path()).await.unwrap();

        assert!(store.validate_project("escape").await.is_err());
        assert!(store.validate_project("beta-link").await.is_ok());

        let projects = store.list_projects().await.unwrap();
        let names: Vec<&str> = projects.iter().map(ProjectId::as_str).collect();
        assert_eq!(names, vec!["alpha", "beta", "beta-link"]);
    }

    #[tokio::test]
    async fn test_list_iterations_sorted_and_filtered() {
        let temp_dir = fixture();
        let store = LocalMetricsStore::open(temp_dir.path()).await.unwrap();
        let alpha = store.validate_project("alpha").await.unwrap();
        let beta = store.validate_project("beta").await.unwrap();

        assert_eq!(store.list_iterations(&alpha).await.unwrap(), vec![5, 20, 100]);
        assert!(store.list_iterations(&beta).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_metrics_returns_exact_bytes() {
        let temp_dir = fixture();
        let store = LocalMetricsStore::open(temp_dir.path()).await.unwrap();
        let alpha = store.validate_project("alpha").await.unwrap();

        let mut file = store.fetch_metrics(&alpha, 5).await.unwrap();
        assert_eq!(file.file_name, "metrics_data_5.csv");
        assert_eq!(file.len, 8);

        let mut content = Vec::new();
        file.file.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_fetch_metrics_directory_is_not_found() {
        let temp_dir = fixture();
        std::fs::create_dir_all(temp_dir.path().join("alpha/metrics_data_7.csv")).unwrap();
        let store = LocalMetricsStore::open(temp_dir.path()).await.unwrap();
        let alpha = store.validate_project("alpha").await.unwrap();

        assert!(matches!(
            store.fetch_metrics(&alpha, 7).await,
            Err(MetricsError::MetricsNotFound { iteration: 7, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_metrics_missing_file() {
        let temp_dir = fixture();
        let store = LocalMetricsStore::open(temp_dir.path()).await.unwrap();
        let alpha = store.validate_project("alpha").await.unwrap();

        assert!(matches!(
            store.fetch_metrics(&alpha, 999).await,
            Err(MetricsError::MetricsNotFound { iteration: 999, .. })
        ));
        // 同名的目錄不是檔案
        assert!(matches!(
            store.fetch_metrics(&alpha, 7).await,
            Err(MetricsError::MetricsNotFound { iteration: 7, .. })
        ));
    }

    #[tokio::test]
    async fn test_every_listed_iteration_can_be_fetched() {
        let temp_dir = fixture();
        let store = LocalMetricsStore::open(temp_dir.path()).await.unwrap();

        for project in store.list_projects().await.unwrap() {
            for iteration in store.list_iterations(&project).await.unwrap() {
                assert!(store.fetch_metrics(&project, iteration).await.is_ok());
            }
        }
    }

    #[tokio::test]
    async fn test_removed_project_after_validation() {
        let temp_dir = fixture();
        let store = LocalMetricsStore::open(temp_dir.path()).await.unwrap();
        let beta = store.validate_project("beta").await.unwrap();

        std::fs::remove_dir(temp_dir.path().join("beta")).unwrap();

        assert!(matches!(
            store.list_iterations(&beta).await,
            Err(MetricsError::ProjectNotFound { .. })
        ));
    }
}
