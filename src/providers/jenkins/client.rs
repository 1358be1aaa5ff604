use std::time::Duration;

use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Credentials;
use crate::error::{JenkinsLensError, Result};

pub struct JenkinsClient {
    client: Client,
    server_url: Url,
    credentials: Option<Credentials>,
}

impl JenkinsClient {
    pub fn new(
        server_url: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jenkins-lens/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| JenkinsLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut server_url = Url::parse(server_url)
            .map_err(|e| JenkinsLensError::Config(format!("Invalid server URL: {e}")))?;

        // Relative joins drop the last segment unless the path ends with '/'
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }

        Ok(Self {
            client,
            server_url,
            credentials,
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(creds) = &self.credentials {
            request.basic_auth(&creds.user, Some(creds.token.as_str()))
        } else {
            request
        }
    }

    /// GET `url` and decode the JSON body into `T`.
    ///
    /// Non-2xx statuses become `ApiError`; a body that does not match `T`
    /// becomes `Decode`.
    pub async fn get_json<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!("GET {url}");

        let response = self.auth_request(self.client.get(url.clone())).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(JenkinsLensError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|source| JenkinsLensError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;
    use mockito::Matcher;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Ping {
        ok: bool,
    }

    fn client_for(server: &mockito::Server, credentials: Option<Credentials>) -> JenkinsClient {
        JenkinsClient::new(&server.url(), credentials, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_server_url_gets_trailing_slash() {
        let client =
            JenkinsClient::new("https://ci.example.com/jenkins", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.server_url().as_str(), "https://ci.example.com/jenkins/");
    }

    #[test]
    fn test_invalid_server_url() {
        let result = JenkinsClient::new("not a url", None, Duration::from_secs(1));
        assert!(matches!(result, Err(JenkinsLensError::Config(_))));
    }

    #[tokio::test]
    async fn test_get_json_decodes_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let url = client.server_url().join("ping").unwrap();
        let ping: Ping = client.get_json(url).await.unwrap();

        assert!(ping.ok);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_json_sends_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        // "ci:secret" base64-encoded
        let mock = server
            .mock("GET", "/ping")
            .match_header("authorization", "Basic Y2k6c2VjcmV0")
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let creds = Credentials {
            user: "ci".to_string(),
            token: Token::from("secret"),
        };
        let client = client_for(&server, Some(creds));
        let url = client.server_url().join("ping").unwrap();
        let _: Ping = client.get_json(url).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_json_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(403)
            .with_body("Forbidden")
            .create_async()
            .await;

        let client = client_for(&server, None);
        let url = client.server_url().join("ping").unwrap();
        let err = client.get_json::<Ping>(url).await.unwrap_err();

        assert!(matches!(
            err,
            JenkinsLensError::ApiError { status: 403, ref message } if message == "Forbidden"
        ));
    }

    #[tokio::test]
    async fn test_get_json_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body("<html>login</html>")
            .create_async()
            .await;

        let client = client_for(&server, None);
        let url = client.server_url().join("ping").unwrap();
        let err = client.get_json::<Ping>(url).await.unwrap_err();

        assert!(matches!(err, JenkinsLensError::Decode { .. }));
    }
}
