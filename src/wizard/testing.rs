// Test support: deterministic stub collaborators with call counters.
// Production code never touches this module.

use crate::catalog::{Application, CatalogClient, FetchError, ProfileEntry};
use crate::utils::logging::endpoint_origin;
use crate::wizard::endpoint::EndpointProbe;
use crate::wizard::error::WizardError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use url::Url;

pub(crate) fn app(id: &str, name: &str) -> Application {
    Application {
        id: id.to_string(),
        name: name.to_string(),
        version: None,
        profile: None,
    }
}

/// Catalog stub returning fixed listings, or a fixed HTTP status failure.
pub(crate) struct StubCatalog {
    pub applications: Vec<Application>,
    pub versions: Vec<String>,
    pub profiles: Vec<ProfileEntry>,
    pub fail_with_status: Option<u16>,
    pub calls: AtomicU32,
}

impl StubCatalog {
    pub fn new(
        applications: Vec<Application>,
        versions: Vec<String>,
        profiles: Vec<ProfileEntry>,
    ) -> Self {
        Self {
            applications,
            versions,
            profiles,
            fail_with_status: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::new(vec![], vec![], vec![])
        }
    }

    fn check_failure(&self) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with_status {
            Some(status) => Err(FetchError::Status {
                origin: "http://stub".to_string(),
                status,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn list_applications(&self, _server: &Url) -> Result<Vec<Application>, FetchError> {
        self.check_failure()?;
        Ok(self.applications.clone())
    }

    async fn list_versions(
        &self,
        _server: &Url,
        _application_id: &str,
    ) -> Result<Vec<String>, FetchError> {
        self.check_failure()?;
        Ok(self.versions.clone())
    }

    async fn list_profiles(
        &self,
        _server: &Url,
        _application_id: &str,
        _version: &str,
    ) -> Result<Vec<ProfileEntry>, FetchError> {
        self.check_failure()?;
        Ok(self.profiles.clone())
    }
}

/// Probe stub that is uniformly reachable or unreachable.
pub(crate) struct StubProbe {
    pub reachable: bool,
    pub calls: AtomicU32,
}

impl StubProbe {
    pub fn reachable() -> Self {
        Self {
            reachable: true,
            calls: AtomicU32::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl EndpointProbe for StubProbe {
    async fn probe(&self, endpoint: &Url) -> Result<(), WizardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reachable {
            Ok(())
        } else {
            Err(WizardError::Unreachable {
                origin: endpoint_origin(endpoint.as_str()),
                cause: "network error".to_string(),
            })
        }
    }
}
