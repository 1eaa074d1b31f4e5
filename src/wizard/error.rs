// Wizard error taxonomy
//
// Every failure a stage can produce is a value handed back to the
// presentation layer; nothing here is allowed to escape as a panic. The
// messages are user-facing and must stay free of internal detail.

use crate::catalog::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    /// Input could not be parsed as a URL after normalization (empty input
    /// included). Local and recoverable; the operator must correct the field.
    #[error("invalid URL for {name}: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    /// The endpoint probe failed (network error or non-success status).
    #[error("unable to connect to {origin}: {cause}")]
    Unreachable { origin: String, cause: String },

    /// A dependent fetch succeeded transport-wise but returned zero items.
    #[error("no {what} found for {scope}")]
    EmptyResult { what: &'static str, scope: String },

    /// Advance was attempted without a required selection.
    #[error("{what} must be selected before continuing")]
    NoSelection { what: &'static str },

    /// Transport/parse failure from the catalog service, surfaced verbatim.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A second operation arrived while one was still pending.
    #[error("another operation is already in progress")]
    Busy,

    /// A transition was attempted from the terminal stage.
    #[error("setup is already complete")]
    Done,

    /// Stage/input mismatch or missing precondition. The controller upholds
    /// the invariants that make this unreachable from the UI.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WizardError {
    /// Whether the failure leaves the wizard interactive on the same stage.
    /// Everything except `Done` does; the terminal stage accepts no input.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, WizardError::Done)
    }
}
