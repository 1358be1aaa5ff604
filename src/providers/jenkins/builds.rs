use log::{debug, info, warn};
use serde_json::Value;

use super::types::{millis_to_duration, Build, RawBuild, RawJob, RawJobTree, TimeInQueueMetrics};
use crate::error::{JenkinsLensError, Result};

/// `_class` of the action contributed by the Jenkins metrics plugin.
pub const METRICS_ACTION_CLASS: &str = "jenkins.metrics.impl.TimeInQueueAction";

/// Folder, job, branch and sub-branch.
pub const MAX_JOB_DEPTH: usize = 4;

const BUILD_FIELDS: &str = "id,result,actions[_class,buildableTimeMillis,waitingTimeMillis,\
blockedTimeMillis,executingTimeMillis,buildingDurationMillis]";

/// `tree` selector for a single build (`<build>/api/json`).
pub fn build_tree_query() -> String {
    BUILD_FIELDS.to_string()
}

/// `tree` selector for the root `api/json`, nesting `jobs[...]` once per level.
///
/// For two levels this gives `jobs[name,builds[...],jobs[name,builds[...]]]`.
pub fn job_tree_query(depth: usize) -> String {
    (0..depth).fold(String::new(), |inner, _| {
        let children = if inner.is_empty() {
            String::new()
        } else {
            format!(",{inner}")
        };
        format!("jobs[name,builds[{BUILD_FIELDS}]{children}]")
    })
}

/// Position of a job in the folder/job/branch/sub-branch hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPath {
    pub folder: String,
    pub job: String,
    pub branch: String,
    pub sub_branch: String,
}

impl JobPath {
    pub fn new(folder: &str, job: &str, branch: &str, sub_branch: &str) -> Self {
        Self {
            folder: folder.to_owned(),
            job: job.to_owned(),
            branch: branch.to_owned(),
            sub_branch: sub_branch.to_owned(),
        }
    }

    /// Names from the root down; missing levels stay empty.
    fn from_segments(segments: &[&str]) -> Self {
        let level = |i: usize| segments.get(i).copied().unwrap_or_default();
        Self::new(level(0), level(1), level(2), level(3))
    }
}

/// Turns one raw build into a [`Build`] tagged with `path`.
///
/// Only the first action whose `_class` is [`METRICS_ACTION_CLASS`] is
/// decoded; every other action is ignored.
///
/// # Errors
///
/// - `InvalidBuildId` if the id is not a non-negative integer
/// - `MetricsNotFound` if no metrics action is attached
/// - `InvalidMetrics` if the metrics action is malformed
pub(crate) fn extract_build(path: &JobPath, raw: &RawBuild) -> Result<Build> {
    let id: u64 = raw
        .id
        .parse()
        .map_err(|_| JenkinsLensError::InvalidBuildId(raw.id.clone()))?;

    let action = raw
        .actions
        .iter()
        .flatten()
        .find(|action| action.class == METRICS_ACTION_CLASS)
        .ok_or(JenkinsLensError::MetricsNotFound)?;

    let metrics: TimeInQueueMetrics =
        serde_json::from_value(Value::Object(action.payload.clone()))
            .map_err(JenkinsLensError::InvalidMetrics)?;

    Ok(Build {
        folder_name: path.folder.clone(),
        job_name: path.job.clone(),
        branch_name: path.branch.clone(),
        sub_branch_name: path.sub_branch.clone(),
        id,
        buildable_time: millis_to_duration(metrics.buildable_time_millis),
        waiting_time: millis_to_duration(metrics.waiting_time_millis),
        blocked_time: millis_to_duration(metrics.blocked_time_millis),
        executing_time: millis_to_duration(metrics.executing_time_millis),
        building_duration: millis_to_duration(metrics.building_duration_millis),
        result: raw.result.clone(),
    })
}

struct Flattener {
    remove_in_progress: bool,
    builds: Vec<Build>,
    skipped: usize,
}

impl Flattener {
    fn visit<'a>(&mut self, job: &'a RawJob, segments: &mut Vec<&'a str>) {
        segments.push(&job.name);
        let path = JobPath::from_segments(segments);

        for raw in &job.builds {
            if self.remove_in_progress && raw.is_in_progress() {
                continue;
            }

            match extract_build(&path, raw) {
                Ok(build) => self.builds.push(build),
                Err(e) => {
                    warn!("skipping build {}/{}: {e}", segments.join("/"), raw.id);
                    self.skipped += 1;
                }
            }
        }

        if segments.len() < MAX_JOB_DEPTH {
            for child in &job.jobs {
                self.visit(child, segments);
            }
        } else if !job.jobs.is_empty() {
            debug!(
                "not descending into {} jobs below {} (max depth {MAX_JOB_DEPTH})",
                job.jobs.len(),
                segments.join("/")
            );
        }

        segments.pop();
    }
}

/// Flattens the job tree into builds, depth first.
///
/// A job's own builds come before those of its children, and each child
/// subtree is exhausted before the next sibling. Builds that fail
/// [`extract_build`] are logged and skipped. With `remove_in_progress`,
/// builds without a result are dropped before extraction.
pub(crate) fn flatten_builds(tree: &RawJobTree, remove_in_progress: bool) -> Vec<Build> {
    let mut flattener = Flattener {
        remove_in_progress,
        builds: Vec::new(),
        skipped: 0,
    };

    let mut segments = Vec::with_capacity(MAX_JOB_DEPTH);
    for job in &tree.jobs {
        flattener.visit(job, &mut segments);
    }

    info!(
        "Extracted {} builds ({} skipped)",
        flattener.builds.len(),
        flattener.skipped
    );

    flattener.builds
}
