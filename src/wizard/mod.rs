// Wizard core: stage sequencing and dependent-query resolution.
//
// WizardState is the single authoritative trail of committed answers, owned
// exclusively by the controller. Stage resolvers are stateless: they get a
// read-only snapshot plus the stage's typed input and hand back a patch.

pub mod controller;
pub mod endpoint;
pub mod error;
pub mod stages;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{AdvanceToken, AdvanceWork, WizardController};
pub use endpoint::{normalize_endpoint, EndpointProbe, HttpEndpointProbe};
pub use error::WizardError;

use crate::catalog::Application;
use serde::Serialize;
use url::Url;

/// One discrete step in the wizard's strictly ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ServerEndpoints,
    ApplicationSelect,
    VersionSelect,
    ProfileSelect,
    Done,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::ServerEndpoints => Stage::ApplicationSelect,
            Stage::ApplicationSelect => Stage::VersionSelect,
            Stage::VersionSelect => Stage::ProfileSelect,
            Stage::ProfileSelect => Stage::Done,
            Stage::Done => Stage::Done,
        }
    }

    pub fn prev(self) -> Stage {
        match self {
            Stage::ServerEndpoints => Stage::ServerEndpoints,
            Stage::ApplicationSelect => Stage::ServerEndpoints,
            Stage::VersionSelect => Stage::ApplicationSelect,
            Stage::ProfileSelect => Stage::VersionSelect,
            Stage::Done => Stage::Done,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done)
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::ServerEndpoints => "server-endpoints",
            Stage::ApplicationSelect => "application-select",
            Stage::VersionSelect => "version-select",
            Stage::ProfileSelect => "profile-select",
            Stage::Done => "done",
        }
    }
}

/// The authoritative, forward-only trail of committed answers.
///
/// Invariant: a field at depth n is populated only if all shallower fields
/// are committed; committing at depth n clears everything deeper
/// (`clear_below`). Depths: endpoints + applications (1), application
/// selection + versions (2), version selection + profiles (3), profile (4).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub server_endpoint: Option<Url>,
    pub stream_endpoint: Option<Url>,
    pub applications: Vec<Application>,
    pub selected_application_id: Option<String>,
    pub available_versions: Vec<String>,
    pub selected_version: Option<String>,
    pub available_profiles: Vec<String>,
    pub selected_profile: Option<String>,
}

impl WizardState {
    /// Cascading invalidation: drop every field owned by stages deeper than
    /// `stage`. Re-applied explicitly on every forward commit.
    pub fn clear_below(&mut self, stage: Stage) {
        match stage {
            Stage::ServerEndpoints => {
                self.selected_application_id = None;
                self.available_versions.clear();
                self.selected_version = None;
                self.available_profiles.clear();
                self.selected_profile = None;
            }
            Stage::ApplicationSelect => {
                self.selected_version = None;
                self.available_profiles.clear();
                self.selected_profile = None;
            }
            Stage::VersionSelect => {
                self.selected_profile = None;
            }
            Stage::ProfileSelect | Stage::Done => {}
        }
    }
}

/// Typed draft input for one stage, built by the presentation layer and
/// validated by the stage resolver before anything is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageInput {
    ServerEndpoints {
        app_server: String,
        stream_server: String,
    },
    /// `None` selects the default (first listed) entry.
    ApplicationSelect { application_id: Option<String> },
    VersionSelect { version: Option<String> },
    ProfileSelect { profile: Option<String> },
}

impl StageInput {
    pub fn stage(&self) -> Stage {
        match self {
            StageInput::ServerEndpoints { .. } => Stage::ServerEndpoints,
            StageInput::ApplicationSelect { .. } => Stage::ApplicationSelect,
            StageInput::VersionSelect { .. } => Stage::VersionSelect,
            StageInput::ProfileSelect { .. } => Stage::ProfileSelect,
        }
    }
}

/// A stage's proposed commit. Applied to WizardState by the controller
/// only; resolvers never mutate shared state.
#[derive(Debug, Clone, PartialEq)]
pub enum StagePatch {
    ServerEndpoints {
        server_endpoint: Url,
        stream_endpoint: Url,
        applications: Vec<Application>,
    },
    ApplicationSelect {
        application_id: String,
        versions: Vec<String>,
    },
    VersionSelect {
        version: String,
        profiles: Vec<String>,
    },
    ProfileSelect { profile: String },
}

impl StagePatch {
    pub fn stage(&self) -> Stage {
        match self {
            StagePatch::ServerEndpoints { .. } => Stage::ServerEndpoints,
            StagePatch::ApplicationSelect { .. } => Stage::ApplicationSelect,
            StagePatch::VersionSelect { .. } => Stage::VersionSelect,
            StagePatch::ProfileSelect { .. } => Stage::ProfileSelect,
        }
    }
}

/// The fully resolved tuple handed to the streaming viewer once the wizard
/// reaches its terminal stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSelection {
    pub server_endpoint: String,
    pub stream_endpoint: String,
    pub application_id: String,
    pub version: String,
    pub profile: String,
}
