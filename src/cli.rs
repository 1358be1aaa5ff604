use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{Credentials, Token};
use crate::config::{Config, OutputFormat};
use crate::insights::{BuildReport, BuildsReport, StagesReport};
use crate::output::{self, FetchProgress};
use crate::providers::JenkinsProvider;

#[derive(Parser)]
#[command(name = "jenkins-lens")]
#[command(author, version, about = "Jenkins build & stage metrics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./jenkins-lens.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Jenkins server URL
    #[arg(short, long, global = true, env = "JENKINS_URL")]
    url: Option<String>,

    /// Jenkins user owning the API token
    #[arg(long, global = true, env = "JENKINS_USER")]
    user: Option<String>,

    /// Jenkins API token
    #[arg(long, global = true, env = "JENKINS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every build with queue/execution metrics across the job tree
    Builds {
        /// Keep builds that have not finished yet
        #[arg(long, default_value_t = false)]
        include_in_progress: bool,
    },
    /// Show the pipeline stages of one build
    Stages(BuildTarget),
    /// Show the queue/execution metrics of one build
    Build(BuildTarget),
}

#[derive(Args)]
struct BuildTarget {
    #[arg(long)]
    folder: String,

    #[arg(long, default_value = "")]
    job: String,

    #[arg(long, default_value = "")]
    branch: String,

    #[arg(long)]
    build_id: u64,
}

/// Names the absent half when only one of user and token is configured.
fn missing_credential(user: Option<&str>, token: Option<&Token>) -> Option<&'static str> {
    match (user, token) {
        (Some(_), None) => Some("token"),
        (None, Some(_)) => Some("user"),
        _ => None,
    }
}

/// Connection and output settings after merging flags over the config file.
struct Settings {
    url: String,
    credentials: Option<Credentials>,
    timeout: Duration,
    include_in_progress: bool,
    format: OutputFormat,
    pretty: bool,
}

impl Cli {
    fn settings(&self, config: Config) -> Settings {
        let token = self
            .token
            .clone()
            .or(config.jenkins.token)
            .map(Token::from);
        let user = self.user.clone().or(config.jenkins.user);
        if let Some(missing) = missing_credential(user.as_deref(), token.as_ref()) {
            warn!("Jenkins {missing} is not set; sending requests without authentication");
        }

        Settings {
            url: self.url.clone().unwrap_or(config.jenkins.url),
            credentials: Credentials::from_parts(user, token),
            timeout: Duration::from_secs(config.jenkins.request_timeout_secs),
            include_in_progress: config.jenkins.include_in_progress,
            format: self.format.unwrap_or(config.output.format),
            pretty: self.pretty || config.output.pretty,
        }
    }

    fn write_output(&self, content: &[u8]) -> Result<()> {
        if let Some(output_path) = &self.output {
            std::fs::write(output_path, content)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            info!("Output written to: {}", output_path.display());
        } else {
            std::io::stdout().lock().write_all(content)?;
        }
        Ok(())
    }

    async fn execute_builds(
        &self,
        provider: &JenkinsProvider,
        settings: &Settings,
        include_in_progress: bool,
    ) -> Result<()> {
        let progress = FetchProgress::start("Fetching job tree");
        let builds = match provider.builds(include_in_progress).await {
            Ok(builds) => builds,
            Err(e) => {
                progress.abandon();
                return Err(e).context("Failed to fetch builds");
            }
        };
        progress.finish(&format!("Fetched {} builds", builds.len()));

        let report = BuildsReport {
            server: settings.url.clone(),
            collected_at: Utc::now(),
            include_in_progress,
            total_builds: builds.len(),
            builds,
        };

        let mut buf: Vec<u8> = Vec::new();
        match settings.format {
            OutputFormat::Summary => buf.extend(output::render_builds(&report).into_bytes()),
            OutputFormat::Json => output::export_json(&report, settings.pretty, &mut buf)?,
            OutputFormat::Csv => output::export_builds_csv(&report.builds, &mut buf)?,
        }
        self.write_output(&buf)
    }

    async fn execute_stages(
        &self,
        provider: &JenkinsProvider,
        settings: &Settings,
        target: &BuildTarget,
    ) -> Result<()> {
        let progress = FetchProgress::start("Fetching stages");
        let stages = match provider
            .stages(&target.folder, &target.job, &target.branch, target.build_id)
            .await
        {
            Ok(stages) => stages,
            Err(e) => {
                progress.abandon();
                return Err(e).with_context(|| {
                    format!("Failed to fetch stages of build {}", target.build_id)
                });
            }
        };
        progress.finish(&format!("Fetched {} stages", stages.len()));

        let report = StagesReport {
            server: settings.url.clone(),
            collected_at: Utc::now(),
            folder_name: target.folder.clone(),
            job_name: target.job.clone(),
            branch_name: target.branch.clone(),
            build_id: target.build_id,
            stages,
        };

        let mut buf: Vec<u8> = Vec::new();
        match settings.format {
            OutputFormat::Summary => buf.extend(output::render_stages(&report).into_bytes()),
            OutputFormat::Json => output::export_json(&report, settings.pretty, &mut buf)?,
            OutputFormat::Csv => output::export_stages_csv(&report.stages, &mut buf)?,
        }
        self.write_output(&buf)
    }

    async fn execute_build(
        &self,
        provider: &JenkinsProvider,
        settings: &Settings,
        target: &BuildTarget,
    ) -> Result<()> {
        let progress = FetchProgress::start("Fetching build");
        let build = match provider
            .build(&target.folder, &target.job, &target.branch, target.build_id)
            .await
        {
            Ok(build) => build,
            Err(e) => {
                progress.abandon();
                return Err(e).with_context(|| format!("Failed to fetch build {}", target.build_id));
            }
        };
        progress.finish(&format!("Fetched build {}", build.id));

        let report = BuildReport {
            server: settings.url.clone(),
            collected_at: Utc::now(),
            build,
        };

        let mut buf: Vec<u8> = Vec::new();
        match settings.format {
            OutputFormat::Summary => buf.extend(output::render_build(&report).into_bytes()),
            OutputFormat::Json => output::export_json(&report, settings.pretty, &mut buf)?,
            OutputFormat::Csv => {
                output::export_builds_csv(std::slice::from_ref(&report.build), &mut buf)?;
            }
        }
        self.write_output(&buf)
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let settings = self.settings(config);

        info!("Using Jenkins server: {}", settings.url);
        let provider = JenkinsProvider::new(
            &settings.url,
            settings.credentials.clone(),
            settings.timeout,
        )?;

        match &self.command {
            Commands::Builds {
                include_in_progress,
            } => {
                let include = *include_in_progress || settings.include_in_progress;
                self.execute_builds(&provider, &settings, include).await
            }
            Commands::Stages(target) => self.execute_stages(&provider, &settings, target).await,
            Commands::Build(target) => self.execute_build(&provider, &settings, target).await,
        }
    }
}
