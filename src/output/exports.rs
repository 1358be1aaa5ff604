use anyhow::Result;
use chrono::TimeDelta;
use serde::Serialize;
use std::io::Write;

use crate::providers::{Build, Stage};

/// Writes any report as a single JSON document.
pub fn export_json<T: Serialize>(report: &T, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

/// One row per build; durations in milliseconds.
pub fn export_builds_csv(builds: &[Build], output: &mut dyn Write) -> Result<()> {
    writeln!(output, "Folder,Job,Branch,Sub-Branch,Build ID,Result,Buildable Time (ms),Waiting Time (ms),Blocked Time (ms),Executing Time (ms),Building Duration (ms)")?;

    for build in builds {
        writeln!(
            output,
            "{},{},{},{},{},{},{},{},{},{},{}",
            csv_field(&build.folder_name),
            csv_field(&build.job_name),
            csv_field(&build.branch_name),
            csv_field(&build.sub_branch_name),
            build.id,
            csv_field(&build.result),
            millis(build.buildable_time),
            millis(build.waiting_time),
            millis(build.blocked_time),
            millis(build.executing_time),
            millis(build.building_duration),
        )?;
    }

    Ok(())
}

/// One row per stage, in pipeline order.
pub fn export_stages_csv(stages: &[Stage], output: &mut dyn Write) -> Result<()> {
    writeln!(output, "Stage,Status,Duration (ms)")?;

    for stage in stages {
        writeln!(
            output,
            "{},{},{}",
            csv_field(&stage.name),
            csv_field(&stage.status),
            millis(stage.duration)
        )?;
    }

    Ok(())
}

fn millis(duration: TimeDelta) -> i64 {
    duration.num_milliseconds()
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
