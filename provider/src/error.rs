//! Dispatcher and registration error types

use thiserror::Error;
use typed_resources_core::ValidationError;

/// Everything that can go wrong while dispatching one lifecycle event
///
/// The variants mirror the stages of dispatch. Only the `Properties` stage is
/// recoverable through a registration's error hook; every other variant is
/// fatal and propagated to the caller untouched. The dispatcher performs no
/// retries - retry policy belongs to the invoking orchestrator.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The lifecycle event itself was malformed; no hook is consulted
    #[error("invalid lifecycle event: {0}")]
    Envelope(ValidationError),

    /// No registration exists for the event's resource type
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    /// The resource properties failed schema validation
    #[error("invalid resource properties: {0}")]
    Properties(ValidationError),

    /// The previous properties of an update failed schema validation
    ///
    /// Old properties were validated when they were first recorded, so a
    /// failure here means the deployment state is corrupted. The error hook
    /// is never consulted on this path.
    #[error("invalid old resource properties: {0}")]
    OldProperties(ValidationError),

    /// A registration's error hook replaced the validation error
    #[error("{0}")]
    Replaced(anyhow::Error),

    /// A lifecycle handler failed; the error passes through unmodified
    #[error("{0}")]
    Handler(anyhow::Error),
}

/// Errors building a [`ResourceRegistration`](crate::ResourceRegistration)
///
/// Every resource type must handle all three lifecycle transitions; a
/// registration without one of them is rejected at build time rather than at
/// dispatch time.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// No create handler was supplied
    #[error("registration is missing a create handler")]
    MissingCreate,

    /// No update handler was supplied
    #[error("registration is missing an update handler")]
    MissingUpdate,

    /// No delete handler was supplied
    #[error("registration is missing a delete handler")]
    MissingDelete,
}
