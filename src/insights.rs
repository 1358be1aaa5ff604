use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::providers::{Build, Stage};

/// Every build with metrics found in the job tree.
#[derive(Debug, Serialize)]
pub struct BuildsReport {
    pub server: String,
    pub collected_at: DateTime<Utc>,
    pub include_in_progress: bool,
    pub total_builds: usize,
    pub builds: Vec<Build>,
}

/// Stages of one pipeline build.
#[derive(Debug, Serialize)]
pub struct StagesReport {
    pub server: String,
    pub collected_at: DateTime<Utc>,
    pub folder_name: String,
    pub job_name: String,
    pub branch_name: String,
    pub build_id: u64,
    pub stages: Vec<Stage>,
}

/// Metrics of one build looked up directly.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub server: String,
    pub collected_at: DateTime<Utc>,
    pub build: Build,
}
