use chrono::TimeDelta;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A Jenkins build flattened out of the job tree.
///
/// The four path fields address the job the build belongs to; levels that
/// were not reached while walking the tree are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Build {
    pub folder_name: String,
    pub job_name: String,
    pub branch_name: String,
    pub sub_branch_name: String,
    pub id: u64,
    /// Time spent buildable in the queue
    #[serde(rename = "buildable_time_ms", serialize_with = "as_millis")]
    pub buildable_time: TimeDelta,
    /// Total time spent in the queue
    #[serde(rename = "waiting_time_ms", serialize_with = "as_millis")]
    pub waiting_time: TimeDelta,
    /// Time spent blocked in the queue
    #[serde(rename = "blocked_time_ms", serialize_with = "as_millis")]
    pub blocked_time: TimeDelta,
    /// Time spent on executors
    #[serde(rename = "executing_time_ms", serialize_with = "as_millis")]
    pub executing_time: TimeDelta,
    /// Wall-clock duration of the build
    #[serde(rename = "building_duration_ms", serialize_with = "as_millis")]
    pub building_duration: TimeDelta,
    /// Final result (e.g. "SUCCESS", "FAILURE"); empty while the build runs
    pub result: String,
}

impl Build {
    pub fn is_in_progress(&self) -> bool {
        self.result.is_empty()
    }

    /// Slash-joined path of the non-empty levels, e.g. `infra/api/main`.
    pub fn path(&self) -> String {
        [
            self.folder_name.as_str(),
            self.job_name.as_str(),
            self.branch_name.as_str(),
            self.sub_branch_name.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
    }
}

/// One stage of a pipeline run, as reported by the `wfapi` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub name: String,
    pub status: String,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: TimeDelta,
}

fn as_millis<S: Serializer>(duration: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_milliseconds())
}

/// Signed millisecond count as reported by Jenkins. Negative values are kept;
/// only `i64::MIN`, one below the range of [`TimeDelta`], saturates.
pub(crate) fn millis_to_duration(millis: i64) -> TimeDelta {
    TimeDelta::try_milliseconds(millis).unwrap_or(TimeDelta::MIN)
}

/// Jenkins emits `null` for unset lists and results; treat it like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response of `api/json?tree=jobs[...]`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawJobTree {
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<RawJob>,
}

/// A job node: a folder, a multibranch project, a branch or a plain job.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawJob {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub builds: Vec<RawBuild>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<RawJob>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawBuild {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<Option<RawAction>>,
}

impl RawBuild {
    pub fn is_in_progress(&self) -> bool {
        self.result.is_empty()
    }
}

/// An entry of a build's `actions` list. Only `_class` is read up front; the
/// rest stays opaque until the class is known.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAction {
    #[serde(rename = "_class", default, deserialize_with = "null_as_default")]
    pub class: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Payload of `jenkins.metrics.impl.TimeInQueueAction` (metrics plugin).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimeInQueueMetrics {
    #[serde(default)]
    pub buildable_time_millis: i64,
    #[serde(default)]
    pub waiting_time_millis: i64,
    #[serde(default)]
    pub blocked_time_millis: i64,
    #[serde(default)]
    pub executing_time_millis: i64,
    #[serde(default)]
    pub building_duration_millis: i64,
}

/// Response of `<build>/wfapi`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawStageList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub stages: Vec<RawStage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawStage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub duration_millis: i64,
}
