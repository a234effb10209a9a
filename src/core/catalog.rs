//! Naming rules shared by the project and iteration catalogs.

use crate::utils::error::{MetricsError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub const METRICS_FILE_PREFIX: &str = "metrics_data_";
pub const METRICS_FILE_EXTENSION: &str = "csv";

/// Iteration served when the request does not name one.
pub const DEFAULT_ITERATIONS: u64 = 10_000;

static METRICS_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // `\d` 會匹配 Unicode 數字，這裡只接受 ASCII
    Regex::new(r"^metrics_data_([0-9]+)\.csv$").unwrap()
});

pub fn metrics_file_name(iteration: u64) -> String {
    format!(
        "{}{}.{}",
        METRICS_FILE_PREFIX, iteration, METRICS_FILE_EXTENSION
    )
}

/// `metrics_data_<N>.csv` -> `N`. Anything else, including digit runs that
/// overflow `u64`, yields `None`.
pub fn parse_iteration(file_name: &str) -> Option<u64> {
    let caps = METRICS_FILE_RE.captures(file_name)?;
    caps.get(1)?.as_str().parse::<u64>().ok()
}

/// Ascending, de-duplicated iterations from a set of file names.
pub fn collect_iterations<I, S>(file_names: I) -> Vec<u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    file_names
        .into_iter()
        .filter_map(|name| parse_iteration(name.as_ref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Shape check for a project name. A valid name is exactly one normal path
/// component, so joining it onto the data root cannot leave the root.
pub fn check_project_name(candidate: &str) -> Result<()> {
    let reason = if candidate.is_empty() {
        Some("name is empty")
    } else if candidate == "." || candidate == ".." {
        Some("relative path segments are not allowed")
    } else if candidate.contains('/') || candidate.contains('\\') {
        Some("path separators are not allowed")
    } else if candidate.contains('\0') {
        Some("name contains null bytes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(MetricsError::InvalidProject {
            name: candidate.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
