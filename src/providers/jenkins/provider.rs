use std::time::Duration;

use log::{info, warn};

use crate::auth::Credentials;
use crate::error::Result;

use super::builds::{self, JobPath, MAX_JOB_DEPTH};
use super::client::JenkinsClient;
use super::links;
use super::stages;
use super::types::{Build, RawBuild, RawJobTree, RawStageList, Stage};

/// Jenkins build and stage metrics provider.
///
/// Every operation issues exactly one request and transforms the buffered
/// response in memory.
pub struct JenkinsProvider {
    pub client: JenkinsClient,
}

impl JenkinsProvider {
    /// Creates a provider for the Jenkins instance at `server_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(
        server_url: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = JenkinsClient::new(server_url, credentials, timeout)?;
        Ok(Self { client })
    }

    /// Fetches the job tree and flattens it into builds.
    ///
    /// Builds without a metrics action or with an unparsable id are logged
    /// and left out; they never fail the call. With `include_in_progress`
    /// unset, builds that have no result yet are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request or the response decoding fails.
    pub async fn builds(&self, include_in_progress: bool) -> Result<Vec<Build>> {
        // The tree selector cannot filter actions by _class, so every action
        // comes back and the metrics one is picked client-side.
        let url = links::root_api_url(
            self.client.server_url(),
            &builds::job_tree_query(MAX_JOB_DEPTH),
        )?;

        info!("Fetching job tree from {}", self.client.server_url());
        let tree: RawJobTree = self.client.get_json(url).await?;

        let builds = builds::flatten_builds(&tree, !include_in_progress);
        if builds.is_empty() {
            warn!("No builds with metrics found on {}", self.client.server_url());
        }

        Ok(builds)
    }

    /// Fetches the stages of one pipeline build.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be built, the request fails or
    /// the response cannot be decoded.
    pub async fn stages(
        &self,
        folder_name: &str,
        job_name: &str,
        branch_name: &str,
        build_id: u64,
    ) -> Result<Vec<Stage>> {
        let url = links::wfapi_url(
            self.client.server_url(),
            folder_name,
            job_name,
            branch_name,
            build_id,
        )?;

        info!("Fetching stages for build {build_id}");
        let raw: RawStageList = self.client.get_json(url).await?;

        Ok(stages::stages_from_raw(raw))
    }

    /// Fetches one build's metrics. Unlike [`Self::builds`], a missing metrics
    /// action or a bad id is returned as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the build cannot be extracted.
    pub async fn build(
        &self,
        folder_name: &str,
        job_name: &str,
        branch_name: &str,
        build_id: u64,
    ) -> Result<Build> {
        let url = links::build_api_url(
            self.client.server_url(),
            folder_name,
            job_name,
            branch_name,
            build_id,
            &builds::build_tree_query(),
        )?;

        info!("Fetching build {build_id}");
        let raw: RawBuild = self.client.get_json(url).await?;

        // Same level rules as the URL: a branch without a job is not addressed.
        let branch = if job_name.is_empty() { "" } else { branch_name };
        builds::extract_build(&JobPath::new(folder_name, job_name, branch, ""), &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JenkinsLensError;
    use chrono::TimeDelta;
    use crate::providers::jenkins::builds::METRICS_ACTION_CLASS;
    use mockito::Matcher;
    use serde_json::{json, Value};

    fn provider(server: &mockito::Server) -> JenkinsProvider {
        JenkinsProvider::new(&server.url(), None, Duration::from_secs(5)).unwrap()
    }

    fn infra_tree(result: Value) -> Value {
        json!({
            "_class": "hudson.model.Hudson",
            "jobs": [{
                "_class": "com.cloudbees.hudson.plugins.folder.Folder",
                "name": "infra",
                "builds": [{
                    "_class": "org.jenkinsci.plugins.workflow.job.WorkflowRun",
                    "id": "42",
                    "result": result,
                    "actions": [
                        { "_class": "hudson.model.CauseAction" },
                        {
                            "_class": METRICS_ACTION_CLASS,
                            "buildableTimeMillis": 0,
                            "waitingTimeMillis": 1500,
                            "blockedTimeMillis": 0,
                            "executingTimeMillis": 9000,
                            "buildingDurationMillis": 0
                        }
                    ]
                }],
                "jobs": []
            }]
        })
    }

    async fn mock_tree(server: &mut mockito::Server, body: Value) -> mockito::Mock {
        server
            .mock("GET", "/api/json")
            .match_query(Matcher::UrlEncoded(
                "tree".into(),
                builds::job_tree_query(MAX_JOB_DEPTH),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_builds_infra_scenario() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_tree(&mut server, infra_tree(json!("SUCCESS"))).await;

        let builds = provider(&server).builds(false).await.unwrap();

        mock.assert_async().await;
        assert_eq!(builds.len(), 1);
        let build = &builds[0];
        assert_eq!(build.folder_name, "infra");
        assert_eq!(build.job_name, "");
        assert_eq!(build.id, 42);
        assert_eq!(build.waiting_time, TimeDelta::milliseconds(1500));
        assert_eq!(build.executing_time, TimeDelta::seconds(9));
        assert_eq!(build.buildable_time, TimeDelta::zero());
        assert_eq!(build.blocked_time, TimeDelta::zero());
        assert_eq!(build.building_duration, TimeDelta::zero());
        assert_eq!(build.result, "SUCCESS");
    }

    #[tokio::test]
    async fn test_builds_in_progress_filtering() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_tree(&mut server, infra_tree(Value::Null)).await;
        let provider = provider(&server);

        let with_running = provider.builds(true).await.unwrap();
        assert_eq!(with_running.len(), 1);
        assert!(with_running[0].is_in_progress());

        let finished_only = provider.builds(false).await.unwrap();
        assert!(finished_only.is_empty());
    }

    #[tokio::test]
    async fn test_builds_fetch_error_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = provider(&server).builds(true).await.unwrap_err();
        assert!(matches!(err, JenkinsLensError::ApiError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_builds_malformed_tree_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"jobs": {"name": "not-a-list"}}"#)
            .create_async()
            .await;

        let err = provider(&server).builds(true).await.unwrap_err();
        assert!(matches!(err, JenkinsLensError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_stages_folder_only_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/job/infra/42/wfapi")
            .with_status(200)
            .with_body(
                json!({
                    "id": "42",
                    "stages": [
                        { "name": "Build", "status": "SUCCESS", "durationMillis": 3000 },
                        { "name": "Test", "status": "FAILED", "durationMillis": 4500 }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let stages = provider(&server).stages("infra", "", "", 42).await.unwrap();

        mock.assert_async().await;
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].name, "Build");
        assert_eq!(stages[1].status, "FAILED");
        assert_eq!(stages[1].duration, TimeDelta::milliseconds(4500));
    }

    #[tokio::test]
    async fn test_stages_full_path_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/job/infra/job/api/job/main/42/wfapi")
            .with_status(200)
            .with_body(r#"{"stages": []}"#)
            .create_async()
            .await;

        let stages = provider(&server)
            .stages("infra", "api", "main", 42)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(stages.is_empty());
    }

    #[tokio::test]
    async fn test_stages_errors_propagate() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;
        let provider = provider(&server);

        let err = provider.stages("infra", "api", "", 7).await.unwrap_err();
        assert!(matches!(err, JenkinsLensError::ApiError { status: 404, .. }));

        let err = provider.stages("", "api", "", 7).await.unwrap_err();
        assert!(matches!(err, JenkinsLensError::UrlConstruction(_)));
    }

    #[tokio::test]
    async fn test_single_build_lookup() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/job/infra/job/api/job/main/42/api/json")
            .match_query(Matcher::UrlEncoded("tree".into(), builds::build_tree_query()))
            .with_status(200)
            .with_body(
                json!({
                    "id": "42",
                    "result": "FAILURE",
                    "actions": [{ "_class": METRICS_ACTION_CLASS, "executingTimeMillis": 250 }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let build = provider(&server)
            .build("infra", "api", "main", 42)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(build.path(), "infra/api/main");
        assert_eq!(build.executing_time, TimeDelta::milliseconds(250));
        assert_eq!(build.result, "FAILURE");
    }

    #[tokio::test]
    async fn test_single_build_without_metrics_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/infra/42/api/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": "42", "result": "SUCCESS", "actions": [{}]}"#)
            .create_async()
            .await;

        let err = provider(&server).build("infra", "", "", 42).await.unwrap_err();
        assert!(matches!(err, JenkinsLensError::MetricsNotFound));
    }

    #[tokio::test]
    async fn test_single_build_with_bad_id_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/infra/job/api/42/api/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "id": "abc",
                    "result": "SUCCESS",
                    "actions": [{ "_class": METRICS_ACTION_CLASS, "waitingTimeMillis": 5 }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = provider(&server).build("infra", "api", "", 42).await.unwrap_err();
        assert!(matches!(&err, JenkinsLensError::InvalidBuildId(id) if id == "abc"));
    }

    #[tokio::test]
    async fn test_stages_keep_negative_durations() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/infra/42/wfapi")
            .with_status(200)
            .with_body(
                json!({
                    "stages": [
                        { "name": "Build", "status": "SUCCESS", "durationMillis": 10 },
                        { "name": "Test", "status": "SUCCESS", "durationMillis": -1 }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let stages = provider(&server).stages("infra", "", "", 42).await.unwrap();

        assert_eq!(stages.len(), 2);
        assert_eq!(stages[1].duration, TimeDelta::milliseconds(-1));
    }
}
