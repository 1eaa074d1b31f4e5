// Wizard controller
//
// Owns the committed trail and the current stage. Resolvers run against a
// snapshot and propose patches; only `commit` writes, and every commit
// re-applies cascading invalidation before moving forward. One operation
// may be in flight at a time; completions carry a token so a result that
// arrives after cancellation (or after retreat) is discarded, never
// committed.

use crate::catalog::CatalogClient;
use crate::wizard::endpoint::EndpointProbe;
use crate::wizard::error::WizardError;
use crate::wizard::stages::{resolver_for, StageContext};
use crate::wizard::{Stage, StageInput, StagePatch, StreamSelection, WizardState};
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Identifies one in-flight advance. Tokens are compared by generation;
/// cancelling or completing invalidates every earlier token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceToken {
    generation: u64,
}

/// The off-thread portion of an advance: a snapshot, the stage input, and
/// clones of the remote collaborators. Runs without touching the controller.
pub struct AdvanceWork {
    catalog: Arc<dyn CatalogClient>,
    probe: Arc<dyn EndpointProbe>,
    snapshot: WizardState,
    stage: Stage,
    input: StageInput,
    correlation_id: Uuid,
}

impl std::fmt::Debug for AdvanceWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvanceWork")
            .field("snapshot", &self.snapshot)
            .field("stage", &self.stage)
            .field("input", &self.input)
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

impl AdvanceWork {
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub async fn run(self) -> Result<StagePatch, WizardError> {
        let Some(resolver) = resolver_for(self.stage) else {
            return Err(WizardError::Done);
        };

        let ctx = StageContext {
            catalog: self.catalog.as_ref(),
            probe: self.probe.as_ref(),
        };

        let result = resolver.resolve(&ctx, &self.snapshot, &self.input).await;
        match &result {
            Ok(_) => info!(
                "[PHASE: wizard] [STEP: {}] Advance resolved (correlation_id={})",
                self.stage.name(),
                self.correlation_id
            ),
            Err(e) => info!(
                "[PHASE: wizard] [STEP: {}] Advance failed (correlation_id={}): {}",
                self.stage.name(),
                self.correlation_id,
                e
            ),
        }
        result
    }
}

pub struct WizardController {
    catalog: Arc<dyn CatalogClient>,
    probe: Arc<dyn EndpointProbe>,
    state: WizardState,
    stage: Stage,
    generation: u64,
    pending: Option<AdvanceToken>,
}

impl WizardController {
    pub fn new(catalog: Arc<dyn CatalogClient>, probe: Arc<dyn EndpointProbe>) -> Self {
        Self {
            catalog,
            probe,
            state: WizardState::default(),
            stage: Stage::ServerEndpoints,
            generation: 0,
            pending: None,
        }
    }

    /// Resume from a previously committed trail (used by smoke rendering).
    /// The caller is responsible for `state` honoring the depth invariant.
    pub fn restore(
        catalog: Arc<dyn CatalogClient>,
        probe: Arc<dyn EndpointProbe>,
        state: WizardState,
        stage: Stage,
    ) -> Self {
        Self {
            catalog,
            probe,
            state,
            stage,
            generation: 0,
            pending: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Claim the in-flight slot and hand back the work to run elsewhere.
    /// Rejected while another operation is pending and from the terminal
    /// stage; both leave everything untouched.
    pub fn begin_advance(
        &mut self,
        input: StageInput,
    ) -> Result<(AdvanceToken, AdvanceWork), WizardError> {
        if self.pending.is_some() {
            return Err(WizardError::Busy);
        }
        if self.stage.is_terminal() {
            return Err(WizardError::Done);
        }
        if input.stage() != self.stage {
            return Err(WizardError::Internal(format!(
                "input for stage {} while on stage {}",
                input.stage().name(),
                self.stage.name()
            )));
        }

        self.generation += 1;
        let token = AdvanceToken {
            generation: self.generation,
        };
        self.pending = Some(token);

        let correlation_id = Uuid::new_v4();
        info!(
            "[PHASE: wizard] [STEP: {}] Advance requested (correlation_id={})",
            self.stage.name(),
            correlation_id
        );

        let work = AdvanceWork {
            catalog: Arc::clone(&self.catalog),
            probe: Arc::clone(&self.probe),
            snapshot: self.state.clone(),
            stage: self.stage,
            input,
            correlation_id,
        };

        Ok((token, work))
    }

    /// Deliver the outcome of an advance. Returns `None` when the token is
    /// no longer current (cancelled or superseded): the outcome is
    /// discarded and nothing is committed.
    pub fn complete_advance(
        &mut self,
        token: AdvanceToken,
        outcome: Result<StagePatch, WizardError>,
    ) -> Option<Result<Stage, WizardError>> {
        if self.pending != Some(token) {
            warn!(
                "[PHASE: wizard] [STEP: {}] Discarding stale advance completion",
                self.stage.name()
            );
            return None;
        }
        self.pending = None;

        match outcome {
            Ok(patch) => Some(self.commit(patch)),
            Err(e) => Some(Err(e)),
        }
    }

    /// Drop the in-flight operation, if any. Its eventual completion will
    /// no longer match and gets discarded.
    pub fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            info!(
                "[PHASE: wizard] [STEP: {}] Pending operation cancelled",
                self.stage.name()
            );
        }
    }

    /// Validate-then-fetch for the active stage, committing on success.
    /// The single-threaded convenience path; the TUI uses begin/complete.
    pub async fn advance(&mut self, input: StageInput) -> Result<Stage, WizardError> {
        let (token, work) = self.begin_advance(input)?;
        let outcome = work.run().await;
        match self.complete_advance(token, outcome) {
            Some(result) => result,
            // The token was issued by this very call; nothing can have
            // invalidated it in between.
            None => Err(WizardError::Internal(
                "advance completion discarded".to_string(),
            )),
        }
    }

    /// Move back one stage. No refetch, and the fields of the stage being
    /// left stay committed so the form is pre-filled on re-entry. Saturates
    /// at the first stage; rejected while an operation is pending and from
    /// the terminal stage.
    pub fn retreat(&mut self) -> Result<Stage, WizardError> {
        if self.pending.is_some() {
            return Err(WizardError::Busy);
        }
        if self.stage.is_terminal() {
            return Err(WizardError::Done);
        }

        self.stage = self.stage.prev();
        info!(
            "[PHASE: wizard] [STEP: {}] Moved back",
            self.stage.name()
        );
        Ok(self.stage)
    }

    /// The fully resolved tuple, available once the wizard is Done.
    pub fn selection(&self) -> Option<StreamSelection> {
        if !self.stage.is_terminal() {
            return None;
        }
        Some(StreamSelection {
            server_endpoint: self.state.server_endpoint.as_ref()?.to_string(),
            stream_endpoint: self.state.stream_endpoint.as_ref()?.to_string(),
            application_id: self.state.selected_application_id.clone()?,
            version: self.state.selected_version.clone()?,
            profile: self.state.selected_profile.clone()?,
        })
    }

    fn commit(&mut self, patch: StagePatch) -> Result<Stage, WizardError> {
        if patch.stage() != self.stage {
            return Err(WizardError::Internal(format!(
                "patch for stage {} while on stage {}",
                patch.stage().name(),
                self.stage.name()
            )));
        }

        match patch {
            StagePatch::ServerEndpoints {
                server_endpoint,
                stream_endpoint,
                applications,
            } => {
                self.state.server_endpoint = Some(server_endpoint);
                self.state.stream_endpoint = Some(stream_endpoint);
                self.state.applications = applications;
            }
            StagePatch::ApplicationSelect {
                application_id,
                versions,
            } => {
                self.state.selected_application_id = Some(application_id);
                self.state.available_versions = versions;
            }
            StagePatch::VersionSelect { version, profiles } => {
                self.state.selected_version = Some(version);
                self.state.available_profiles = profiles;
            }
            StagePatch::ProfileSelect { profile } => {
                self.state.selected_profile = Some(profile);
            }
        }

        // Mandatory on every forward transition, not just the common path.
        let committed = self.stage;
        self.state.clear_below(committed);
        self.stage = committed.next();

        info!(
            "[PHASE: wizard] [STEP: {}] Committed, now on stage {}",
            committed.name(),
            self.stage.name()
        );
        Ok(self.stage)
    }
}
