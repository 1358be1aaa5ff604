use std::fmt::Write;

use chrono::TimeDelta;
use comfy_table::Cell;

use crate::insights::{BuildReport, BuildsReport, StagesReport};
use crate::providers::Build;

use super::styling::{bright, bright_yellow, cyan, dim};
use super::tables::{color_coded_result_cell, create_table, cyan_header, format_duration};

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn add_field(output: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(output, "  {} {}", dim(label), value);
}

fn path_or_root(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}

fn duration_cells(build: &Build) -> Vec<Cell> {
    [
        build.waiting_time,
        build.buildable_time,
        build.blocked_time,
        build.executing_time,
        build.building_duration,
    ]
    .into_iter()
    .map(|d| Cell::new(format_duration(d)))
    .collect()
}

const BUILD_COLUMNS: [&str; 8] = [
    "Job",
    "Build",
    "Result",
    "Waiting",
    "Buildable",
    "Blocked",
    "Executing",
    "Duration",
];

/// Overview plus one table row per build.
pub fn render_builds(report: &BuildsReport) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");
    add_field(&mut output, "Server:", cyan(&report.server));
    add_field(&mut output, "Builds:", bright_yellow(report.total_builds));
    if report.include_in_progress {
        let running = report.builds.iter().filter(|b| b.is_in_progress()).count();
        add_field(&mut output, "In progress:", bright_yellow(running));
    } else {
        add_field(&mut output, "In progress:", dim("excluded"));
    }
    add_field(
        &mut output,
        "Collected:",
        dim(report.collected_at.format("%Y-%m-%d %H:%M UTC")),
    );
    output.push('\n');

    if report.builds.is_empty() {
        let _ = writeln!(output, "{}", bright_yellow("No builds with metrics found."));
        return output;
    }

    add_section_header(&mut output, "🏗️", "Builds");

    let mut table = create_table();
    table.set_header(cyan_header(&BUILD_COLUMNS));

    for build in &report.builds {
        let path = build.path();
        let mut row = vec![
            Cell::new(path_or_root(&path)),
            Cell::new(build.id),
            color_coded_result_cell(&build.result),
        ];
        row.extend(duration_cells(build));
        table.add_row(row);
    }

    let _ = writeln!(output, "{table}");
    output
}

/// Overview plus the stages in pipeline order.
pub fn render_stages(report: &StagesReport) -> String {
    let mut output = String::new();

    let path = [
        report.folder_name.as_str(),
        report.job_name.as_str(),
        report.branch_name.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("/");

    add_section_header(&mut output, "📊", "Overview");
    add_field(&mut output, "Server:", cyan(&report.server));
    add_field(&mut output, "Job:", cyan(path_or_root(&path)));
    add_field(&mut output, "Build:", bright_yellow(report.build_id));
    let total: TimeDelta = report.stages.iter().map(|s| s.duration).sum();
    add_field(&mut output, "Total stage time:", bright_yellow(format_duration(total)));
    output.push('\n');

    if report.stages.is_empty() {
        let _ = writeln!(output, "{}", bright_yellow("No stages reported."));
        return output;
    }

    add_section_header(&mut output, "🧱", "Stages");

    let mut table = create_table();
    table.set_header(cyan_header(&["#", "Stage", "Status", "Duration"]));

    for (idx, stage) in report.stages.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&stage.name),
            color_coded_result_cell(&stage.status),
            Cell::new(format_duration(stage.duration)),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

pub fn render_build(report: &BuildReport) -> String {
    let mut output = String::new();
    let build = &report.build;

    add_section_header(&mut output, "📊", "Build");
    add_field(&mut output, "Server:", cyan(&report.server));
    add_field(&mut output, "Job:", cyan(path_or_root(&build.path())));
    add_field(&mut output, "Build:", bright_yellow(build.id));
    output.push('\n');

    let mut table = create_table();
    table.set_header(cyan_header(&BUILD_COLUMNS[2..]));
    let mut row = vec![color_coded_result_cell(&build.result)];
    row.extend(duration_cells(build));
    table.add_row(row);

    let _ = writeln!(output, "{table}");
    output
}
