// Stage resolvers.
//
// Each stage owns one unit of validation plus the dependent fetch that
// seeds the next stage. Resolvers are stateless strategies over a snapshot:
// they never touch WizardState directly, they return a patch (or the first
// failure, short-circuit order).

use crate::catalog::CatalogClient;
use crate::utils::logging::endpoint_origin;
use crate::wizard::endpoint::{
    normalize_endpoint, probe_target, EndpointProbe, APP_SERVER_PROBE_PATH,
    STREAM_SERVER_PROBE_PATH,
};
use crate::wizard::error::WizardError;
use crate::wizard::{Stage, StageInput, StagePatch, WizardState};
use async_trait::async_trait;
use log::info;
use url::Url;

/// Collaborators a resolver may call out to. Read-only; owned by the caller.
pub struct StageContext<'a> {
    pub catalog: &'a dyn CatalogClient,
    pub probe: &'a dyn EndpointProbe,
}

#[async_trait]
pub trait StageResolver: Send + Sync {
    fn stage(&self) -> Stage;

    /// Validate the stage's input against the snapshot, run the dependent
    /// fetch, and propose a patch. Failures leave no trace anywhere.
    async fn resolve(
        &self,
        ctx: &StageContext<'_>,
        snapshot: &WizardState,
        input: &StageInput,
    ) -> Result<StagePatch, WizardError>;
}

/// Resolver lookup for the active stage; `Done` has none.
pub fn resolver_for(stage: Stage) -> Option<&'static dyn StageResolver> {
    match stage {
        Stage::ServerEndpoints => Some(&ServerEndpointsStage),
        Stage::ApplicationSelect => Some(&ApplicationSelectStage),
        Stage::VersionSelect => Some(&VersionSelectStage),
        Stage::ProfileSelect => Some(&ProfileSelectStage),
        Stage::Done => None,
    }
}

fn input_mismatch(input: &StageInput, stage: Stage) -> WizardError {
    WizardError::Internal(format!(
        "input for stage {} handed to stage {}",
        input.stage().name(),
        stage.name()
    ))
}

fn committed_server(snapshot: &WizardState) -> Result<&Url, WizardError> {
    snapshot
        .server_endpoint
        .as_ref()
        .ok_or_else(|| WizardError::Internal("no committed server endpoint".to_string()))
}

/// Resolve an exactly-one-of selection: an explicit choice must exist in
/// the list; no choice falls back to the first entry.
fn select_from<'a>(
    options: &'a [String],
    choice: &Option<String>,
    what: &'static str,
) -> Result<&'a str, WizardError> {
    match choice {
        Some(id) => options
            .iter()
            .find(|v| v.as_str() == id.as_str())
            .map(|v| v.as_str())
            .ok_or(WizardError::NoSelection { what }),
        None => options
            .first()
            .map(|v| v.as_str())
            .ok_or(WizardError::NoSelection { what }),
    }
}

pub struct ServerEndpointsStage;

#[async_trait]
impl StageResolver for ServerEndpointsStage {
    fn stage(&self) -> Stage {
        Stage::ServerEndpoints
    }

    async fn resolve(
        &self,
        ctx: &StageContext<'_>,
        _snapshot: &WizardState,
        input: &StageInput,
    ) -> Result<StagePatch, WizardError> {
        let StageInput::ServerEndpoints {
            app_server,
            stream_server,
        } = input
        else {
            return Err(input_mismatch(input, Stage::ServerEndpoints));
        };

        // Validation order: non-empty, then parseable, then reachable.
        // Both fields normalize before either endpoint is probed.
        let app_endpoint = normalize_endpoint("App Server", app_server)?;
        let stream_endpoint = normalize_endpoint("Stream Server", stream_server)?;

        ctx.probe
            .probe(&probe_target(&app_endpoint, APP_SERVER_PROBE_PATH)?)
            .await?;
        ctx.probe
            .probe(&probe_target(&stream_endpoint, STREAM_SERVER_PROBE_PATH)?)
            .await?;

        let applications = ctx.catalog.list_applications(&app_endpoint).await?;
        if applications.is_empty() {
            return Err(WizardError::EmptyResult {
                what: "applications",
                scope: endpoint_origin(app_endpoint.as_str()),
            });
        }

        info!(
            "[PHASE: wizard] [STEP: server-endpoints] {} application(s) available from {}",
            applications.len(),
            endpoint_origin(app_endpoint.as_str())
        );

        Ok(StagePatch::ServerEndpoints {
            server_endpoint: app_endpoint,
            stream_endpoint,
            applications,
        })
    }
}

pub struct ApplicationSelectStage;

#[async_trait]
impl StageResolver for ApplicationSelectStage {
    fn stage(&self) -> Stage {
        Stage::ApplicationSelect
    }

    async fn resolve(
        &self,
        ctx: &StageContext<'_>,
        snapshot: &WizardState,
        input: &StageInput,
    ) -> Result<StagePatch, WizardError> {
        let StageInput::ApplicationSelect { application_id } = input else {
            return Err(input_mismatch(input, Stage::ApplicationSelect));
        };

        let ids: Vec<String> = snapshot.applications.iter().map(|a| a.id.clone()).collect();
        let selected = select_from(&ids, application_id, "an application")?.to_string();

        let server = committed_server(snapshot)?;
        let versions = ctx.catalog.list_versions(server, &selected).await?;
        if versions.is_empty() {
            return Err(WizardError::EmptyResult {
                what: "versions",
                scope: format!("application {}", selected),
            });
        }

        info!(
            "[PHASE: wizard] [STEP: application-select] {} version(s) available for application {}",
            versions.len(),
            selected
        );

        Ok(StagePatch::ApplicationSelect {
            application_id: selected,
            versions,
        })
    }
}

pub struct VersionSelectStage;

#[async_trait]
impl StageResolver for VersionSelectStage {
    fn stage(&self) -> Stage {
        Stage::VersionSelect
    }

    async fn resolve(
        &self,
        ctx: &StageContext<'_>,
        snapshot: &WizardState,
        input: &StageInput,
    ) -> Result<StagePatch, WizardError> {
        let StageInput::VersionSelect { version } = input else {
            return Err(input_mismatch(input, Stage::VersionSelect));
        };

        let selected = select_from(&snapshot.available_versions, version, "a version")?.to_string();

        let application_id = snapshot
            .selected_application_id
            .as_deref()
            .ok_or_else(|| WizardError::Internal("no committed application".to_string()))?;

        let server = committed_server(snapshot)?;
        let profiles = ctx
            .catalog
            .list_profiles(server, application_id, &selected)
            .await?;
        // Profile records are reduced to their identifiers here; nothing
        // deeper in the wizard needs the rest.
        let profiles: Vec<String> = profiles.into_iter().map(|p| p.id).collect();
        if profiles.is_empty() {
            return Err(WizardError::EmptyResult {
                what: "profiles",
                scope: format!("application version {}", selected),
            });
        }

        info!(
            "[PHASE: wizard] [STEP: version-select] {} profile(s) available for version {}",
            profiles.len(),
            selected
        );

        Ok(StagePatch::VersionSelect {
            version: selected,
            profiles,
        })
    }
}

pub struct ProfileSelectStage;

#[async_trait]
impl StageResolver for ProfileSelectStage {
    fn stage(&self) -> Stage {
        Stage::ProfileSelect
    }

    async fn resolve(
        &self,
        _ctx: &StageContext<'_>,
        snapshot: &WizardState,
        input: &StageInput,
    ) -> Result<StagePatch, WizardError> {
        let StageInput::ProfileSelect { profile } = input else {
            return Err(input_mismatch(input, Stage::ProfileSelect));
        };

        // Last stage: commit only, no further remote fetch.
        let selected = select_from(&snapshot.available_profiles, profile, "a profile")?.to_string();

        Ok(StagePatch::ProfileSelect { profile: selected })
    }
}
