// Application catalog client
//
// The configuration server exposes the catalog as three dependent listings:
// applications for a server, versions for an application, profiles for a
// version. The trait seam lets the wizard run against a stub catalog in
// tests; `HttpCatalogClient` is the production implementation.

use async_trait::async_trait;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use url::Url;

/// Request timeout for catalog calls. The upstream service imposes none, so
/// the client bounds every call itself rather than hang the wizard.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// One streamable application as listed by the configuration server.
/// Immutable once fetched for a given server endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// Profile listings carry structured records; the wizard only keeps the id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileEntry {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {origin} failed: {detail}")]
    Transport {
        origin: String,
        detail: String,
        /// Connect/timeout failures are transient and worth a bounded retry;
        /// everything else is not.
        transient: bool,
    },

    #[error("{origin} returned status {status}")]
    Status { origin: String, status: u16 },

    #[error("unexpected response from {origin}: {detail}")]
    Decode { origin: String, detail: String },

    #[error("could not build request URL from {base}: {detail}")]
    BadUrl { base: String, detail: String },
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// List the applications a configuration server exposes.
    async fn list_applications(&self, server: &Url) -> Result<Vec<Application>, FetchError>;

    /// List the versions available for one application.
    async fn list_versions(
        &self,
        server: &Url,
        application_id: &str,
    ) -> Result<Vec<String>, FetchError>;

    /// List the profiles available for one application version.
    async fn list_profiles(
        &self,
        server: &Url,
        application_id: &str,
        version: &str,
    ) -> Result<Vec<ProfileEntry>, FetchError>;
}

// Wire shapes. Applications arrive keyed by id; versions and profiles as
// named arrays.

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    #[serde(default)]
    versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProfilesResponse {
    #[serde(default)]
    profiles: Vec<ProfileEntry>,
}

/// Production catalog client over HTTP.
///
/// The reqwest client is built per call: the wizard runs each advance on a
/// short-lived worker runtime, and pooled connections must not outlive it.
#[derive(Debug, Default)]
pub struct HttpCatalogClient;

impl HttpCatalogClient {
    pub fn new() -> Self {
        Self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let origin = crate::utils::logging::endpoint_origin(url.as_str());

        let attempt = || async {
            let client = reqwest::Client::builder()
                .timeout(CATALOG_TIMEOUT)
                .build()
                .map_err(|e| FetchError::Transport {
                    origin: origin.clone(),
                    detail: e.to_string(),
                    transient: false,
                })?;

            let response = client
                .get(url.clone())
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| FetchError::Transport {
                    origin: origin.clone(),
                    detail: e.to_string(),
                    transient: e.is_connect() || e.is_timeout(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    origin: origin.clone(),
                    status: status.as_u16(),
                });
            }

            response.json::<T>().await.map_err(|e| FetchError::Decode {
                origin: origin.clone(),
                detail: e.to_string(),
            })
        };

        let retry_strategy = ExponentialBackoff::from_millis(150)
            .factor(2)
            .max_delay(Duration::from_secs(2))
            .take(3)
            .map(jitter);

        RetryIf::spawn(retry_strategy, attempt, |e: &FetchError| {
            let transient = matches!(e, FetchError::Transport { transient: true, .. });
            if transient {
                warn!(
                    "[PHASE: catalog] [STEP: retry] Transient failure against {}, retrying: {}",
                    origin, e
                );
            }
            transient
        })
        .await
    }

    fn request_url(server: &Url, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = server.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::BadUrl {
                base: server.to_string(),
                detail: "endpoint cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_applications(&self, server: &Url) -> Result<Vec<Application>, FetchError> {
        let url = Self::request_url(server, &["cfg", "apps"])?;
        info!(
            "[PHASE: catalog] [STEP: applications] Listing applications from {}",
            crate::utils::logging::endpoint_origin(url.as_str())
        );

        // The server returns an object keyed by application id; the records
        // themselves carry the id again, so only the values matter.
        let body: serde_json::Map<String, serde_json::Value> = self.get_json(url.clone()).await?;
        let origin = crate::utils::logging::endpoint_origin(url.as_str());

        body.into_iter()
            .map(|(_, value)| {
                serde_json::from_value::<Application>(value).map_err(|e| FetchError::Decode {
                    origin: origin.clone(),
                    detail: e.to_string(),
                })
            })
            .collect()
    }

    async fn list_versions(
        &self,
        server: &Url,
        application_id: &str,
    ) -> Result<Vec<String>, FetchError> {
        let url = Self::request_url(server, &["cfg", "apps", application_id, "versions"])?;
        info!(
            "[PHASE: catalog] [STEP: versions] Listing versions for application {}",
            application_id
        );

        let body: VersionsResponse = self.get_json(url).await?;
        Ok(body.versions)
    }

    async fn list_profiles(
        &self,
        server: &Url,
        application_id: &str,
        version: &str,
    ) -> Result<Vec<ProfileEntry>, FetchError> {
        let url = Self::request_url(
            server,
            &["cfg", "apps", application_id, "versions", version, "profiles"],
        )?;
        info!(
            "[PHASE: catalog] [STEP: profiles] Listing profiles for application {} version {}",
            application_id, version
        );

        let body: ProfilesResponse = self.get_json(url).await?;
        Ok(body.profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_decodes_camel_case_with_optional_fields() {
        let app: Application = serde_json::from_str(
            r#"{"id":"usd-viewer","name":"USD Viewer","version":"106.1"}"#,
        )
        .expect("decode");
        assert_eq!(app.id, "usd-viewer");
        assert_eq!(app.name, "USD Viewer");
        assert_eq!(app.version.as_deref(), Some("106.1"));
        assert!(app.profile.is_none());
    }

    #[test]
    fn versions_response_defaults_to_empty_list() {
        let body: VersionsResponse = serde_json::from_str("{}").expect("decode");
        assert!(body.versions.is_empty());

        let body: VersionsResponse =
            serde_json::from_str(r#"{"versions":["106.1","105.0"]}"#).expect("decode");
        assert_eq!(body.versions, vec!["106.1", "105.0"]);
    }

    #[test]
    fn profiles_response_tolerates_extra_fields() {
        let body: ProfilesResponse = serde_json::from_str(
            r#"{"profiles":[{"id":"default","name":"Default"},{"id":"tuned"}]}"#,
        )
        .expect("decode");
        let ids: Vec<&str> = body.profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["default", "tuned"]);
    }

    #[test]
    fn request_url_appends_segments_without_doubling_slashes() {
        let server = Url::parse("http://gdn.example.com").expect("url");
        let url = HttpCatalogClient::request_url(&server, &["cfg", "apps"]).expect("join");
        assert_eq!(url.as_str(), "http://gdn.example.com/cfg/apps");

        let server = Url::parse("http://gdn.example.com/base/").expect("url");
        let url = HttpCatalogClient::request_url(&server, &["cfg", "apps"]).expect("join");
        assert_eq!(url.as_str(), "http://gdn.example.com/base/cfg/apps");
    }

    #[test]
    fn request_url_encodes_identifier_segments() {
        let server = Url::parse("http://gdn.example.com").expect("url");
        let url = HttpCatalogClient::request_url(&server, &["cfg", "apps", "my app", "versions"])
            .expect("join");
        assert_eq!(url.as_str(), "http://gdn.example.com/cfg/apps/my%20app/versions");
    }

    #[test]
    fn transport_error_marks_transient_classes_only() {
        let transient = FetchError::Transport {
            origin: "http://x".to_string(),
            detail: "connect timeout".to_string(),
            transient: true,
        };
        assert!(matches!(
            transient,
            FetchError::Transport { transient: true, .. }
        ));

        let status = FetchError::Status {
            origin: "http://x".to_string(),
            status: 503,
        };
        assert!(!matches!(status, FetchError::Transport { .. }));
    }
}
