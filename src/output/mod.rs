mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::{export_builds_csv, export_json, export_stages_csv};
pub use progress::FetchProgress;
pub use styling::{dim, magenta_bold};
pub use summary::{render_build, render_builds, render_stages};

/// Prints the jenkins-lens banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🔍 jenkins-lens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Jenkins build & stage metrics")
    );
}
