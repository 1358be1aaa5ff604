use url::Url;

use crate::error::{JenkinsLensError, Result};

/// Appends the `job/<name>` segments addressing a build, then `build_id`.
///
/// Only three levels are addressable:
/// - empty `job_name`: `job/<folder>/<id>` (`branch_name` is ignored)
/// - empty `branch_name`: `job/<folder>/job/<job>/<id>`
/// - otherwise `job/<folder>/job/<job>/job/<branch>/<id>`
///
/// Segments are percent-encoded, so names cannot escape their segment.
///
/// # Errors
///
/// Returns `UrlConstruction` if `folder_name` is empty or `server_url` cannot
/// carry a path (e.g. `mailto:`).
pub fn build_url(
    server_url: &Url,
    folder_name: &str,
    job_name: &str,
    branch_name: &str,
    build_id: u64,
) -> Result<Url> {
    if folder_name.is_empty() {
        return Err(JenkinsLensError::UrlConstruction(
            "folder name must not be empty".to_string(),
        ));
    }

    let levels: &[&str] = if job_name.is_empty() {
        &[folder_name]
    } else if branch_name.is_empty() {
        &[folder_name, job_name]
    } else {
        &[folder_name, job_name, branch_name]
    };

    let mut url = server_url.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|()| {
            JenkinsLensError::UrlConstruction(format!("{server_url} cannot be a base URL"))
        })?;
        segments.pop_if_empty();
        for level in levels {
            segments.push("job").push(level);
        }
        segments.push(&build_id.to_string());
    }

    Ok(url)
}

/// `<build>/wfapi`, the pipeline stage listing of one build.
pub fn wfapi_url(
    server_url: &Url,
    folder_name: &str,
    job_name: &str,
    branch_name: &str,
    build_id: u64,
) -> Result<Url> {
    let mut url = build_url(server_url, folder_name, job_name, branch_name, build_id)?;
    push_segment(&mut url, "wfapi")?;
    Ok(url)
}

/// `<build>/api/json?tree=<tree>`.
pub fn build_api_url(
    server_url: &Url,
    folder_name: &str,
    job_name: &str,
    branch_name: &str,
    build_id: u64,
    tree: &str,
) -> Result<Url> {
    let mut url = build_url(server_url, folder_name, job_name, branch_name, build_id)?;
    push_segment(&mut url, "api")?;
    push_segment(&mut url, "json")?;
    url.query_pairs_mut().append_pair("tree", tree);
    Ok(url)
}

/// Root `api/json?tree=<tree>`.
pub fn root_api_url(server_url: &Url, tree: &str) -> Result<Url> {
    let mut url = server_url
        .join("api/json")
        .map_err(|e| JenkinsLensError::UrlConstruction(e.to_string()))?;
    url.query_pairs_mut().append_pair("tree", tree);
    Ok(url)
}

fn push_segment(url: &mut Url, segment: &str) -> Result<()> {
    url.path_segments_mut()
        .map_err(|()| JenkinsLensError::UrlConstruction(format!("{segment}: not a base URL")))?
        .push(segment);
    Ok(())
}
