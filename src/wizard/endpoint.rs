// Endpoint normalization and reachability probing.
//
// Normalization runs before any network call: trim, reject empty, default
// the scheme, then parse. The probe itself sits behind a trait so stages
// can be exercised against stubs; the production probe is one idempotent
// GET with a bounded timeout.

use crate::utils::logging::endpoint_origin;
use crate::wizard::error::WizardError;
use async_trait::async_trait;
use log::warn;
use std::time::Duration;
use url::Url;

/// Probe timeout. The original behavior had none, which leaves the wizard
/// hanging on a dead host; a bounded probe failing as Unreachable is the
/// correct surface for that.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Sub-path probed on the app server (the catalog listing route).
pub const APP_SERVER_PROBE_PATH: &[&str] = &["cfg", "apps"];
/// Sub-path probed on the stream server (the streaming transport route).
pub const STREAM_SERVER_PROBE_PATH: &[&str] = &["streaming", "stream"];

/// Normalize raw operator input into a URL.
///
/// `name` labels the field in error messages ("App Server" / "Stream
/// Server"). Empty input and unparseable input are both `InvalidUrl`;
/// no network is touched here.
pub fn normalize_endpoint(name: &'static str, raw: &str) -> Result<Url, WizardError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WizardError::InvalidUrl {
            name,
            reason: "a value must be entered".to_string(),
        });
    }

    let with_scheme = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    Url::parse(&with_scheme).map_err(|e| WizardError::InvalidUrl {
        name,
        reason: e.to_string(),
    })
}

/// Append probe path segments to a validated endpoint.
pub fn probe_target(endpoint: &Url, segments: &[&str]) -> Result<Url, WizardError> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| WizardError::InvalidUrl {
            name: "endpoint",
            reason: "endpoint cannot carry a path".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Display form of a committed endpoint for pre-filling the form: the
/// origin alone when nothing but the root path was committed, the full URL
/// otherwise.
pub fn endpoint_display(endpoint: &Url) -> String {
    if endpoint.path() == "/" && endpoint.query().is_none() && endpoint.fragment().is_none() {
        endpoint_origin(endpoint.as_str())
    } else {
        endpoint.as_str().to_string()
    }
}

/// Network-reachability probe for user-entered endpoints.
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    /// Probe the endpoint. Succeeds only on a 2xx response; any non-success
    /// status or network failure is `Unreachable`. Must not mutate wizard
    /// state and must be safe to retry.
    async fn probe(&self, endpoint: &Url) -> Result<(), WizardError>;
}

/// Production probe: idempotent JSON-accepting GET. The reqwest client is
/// built per probe; advances run on short-lived worker runtimes and pooled
/// connections must not outlive them.
#[derive(Debug, Default)]
pub struct HttpEndpointProbe;

impl HttpEndpointProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EndpointProbe for HttpEndpointProbe {
    async fn probe(&self, endpoint: &Url) -> Result<(), WizardError> {
        let origin = endpoint_origin(endpoint.as_str());

        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| WizardError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let response = client
            .get(endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(
                    "[PHASE: wizard] [STEP: probe] Error connecting to {}: {}",
                    endpoint, e
                );
                WizardError::Unreachable {
                    origin: origin.clone(),
                    cause: if e.is_timeout() {
                        "connection timed out".to_string()
                    } else {
                        "network error".to_string()
                    },
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "[PHASE: wizard] [STEP: probe] Received status code {} from {}",
                status, endpoint
            );
            return Err(WizardError::Unreachable {
                origin,
                cause: format!("received status {}", status.as_u16()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_prepends_default_scheme() {
        let url = normalize_endpoint("App Server", "example.com").expect("normalize");
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn normalize_keeps_explicit_scheme() {
        let url = normalize_endpoint("App Server", "https://example.com:4443").expect("normalize");
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.port(), Some(4443));
    }

    #[test]
    fn normalize_trims_surrounding_whitespace() {
        let url = normalize_endpoint("Stream Server", "  stream.example.com  ").expect("normalize");
        assert_eq!(url.host_str(), Some("stream.example.com"));
    }

    #[test]
    fn normalize_rejects_empty_input_before_any_network_call() {
        let err = normalize_endpoint("App Server", "   ").expect_err("must fail");
        assert!(matches!(
            err,
            WizardError::InvalidUrl { name: "App Server", .. }
        ));
    }

    #[test]
    fn normalize_rejects_unparseable_input() {
        let err = normalize_endpoint("App Server", "http://").expect_err("must fail");
        assert!(matches!(err, WizardError::InvalidUrl { .. }));
    }

    #[test]
    fn probe_target_appends_sub_path() {
        let endpoint = normalize_endpoint("App Server", "gdn.example.com").expect("normalize");
        let target = probe_target(&endpoint, APP_SERVER_PROBE_PATH).expect("target");
        assert_eq!(target.as_str(), "http://gdn.example.com/cfg/apps");

        let target = probe_target(&endpoint, STREAM_SERVER_PROBE_PATH).expect("target");
        assert_eq!(target.as_str(), "http://gdn.example.com/streaming/stream");
    }

    #[test]
    fn endpoint_display_round_trips_bare_origin() {
        let endpoint = normalize_endpoint("App Server", "example.com").expect("normalize");
        assert_eq!(endpoint_display(&endpoint), "http://example.com");

        let endpoint =
            normalize_endpoint("App Server", "http://example.com/base").expect("normalize");
        assert_eq!(endpoint_display(&endpoint), "http://example.com/base");
    }
}
