//! # Typed Resources Testing
//!
//! Test helpers for exercising a [`Provider`](typed_resources_provider::Provider)
//! end to end:
//!
//! - Event builders that produce raw lifecycle events in the caller's
//!   PascalCase wire convention, the way the orchestrating framework sends
//!   them
//! - A [`CallLog`] plus [`recording_registration`] for asserting which
//!   lifecycle callbacks ran (and that the others did not)
//!
//! ## Example
//!
//! ```ignore
//! let log = CallLog::new();
//! let registration = recording_registration(schema, &log, "phys-1")?;
//! let provider = Provider::single("Custom::Thing", registration);
//!
//! provider.handle(&create_event("Custom::Thing", json!({ "Path": "/tmp" }))).await?;
//! assert_eq!(log.calls(), vec![Invocation::Create]);
//! ```

use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use typed_resources_core::{LifecycleResponse, Schema};
use typed_resources_provider::{RegistrationError, ResourceRegistration};

/// Build a Create event in the caller's wire convention
#[must_use]
pub fn create_event(resource_type: &str, properties: Value) -> Value {
    json!({
        "RequestType": "Create",
        "ResourceType": resource_type,
        "LogicalResourceId": "TestResource",
        "RequestId": "request-1",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/test/guid",
        "ResourceProperties": properties,
    })
}

/// Build an Update event in the caller's wire convention
#[must_use]
pub fn update_event(
    resource_type: &str,
    physical_id: &str,
    properties: Value,
    old_properties: Value,
) -> Value {
    let mut event = create_event(resource_type, properties);
    event["RequestType"] = json!("Update");
    event["PhysicalResourceId"] = json!(physical_id);
    event["OldResourceProperties"] = old_properties;
    event
}

/// Build a Delete event in the caller's wire convention
#[must_use]
pub fn delete_event(resource_type: &str, physical_id: &str, properties: Value) -> Value {
    let mut event = create_event(resource_type, properties);
    event["RequestType"] = json!("Delete");
    event["PhysicalResourceId"] = json!(physical_id);
    event
}

/// Which callback of a recording registration was invoked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// The create handler ran
    Create,
    /// The update handler ran
    Update,
    /// The delete handler ran
    Delete,
    /// The validation-error hook was consulted
    ErrorHook,
}

/// Shared, clonable record of which callbacks ran, in order
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl CallLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation
    ///
    /// # Panics
    ///
    /// Panics if the log lock is poisoned (a panic in another test thread)
    #[allow(clippy::expect_used)]
    pub fn record(&self, invocation: Invocation) {
        self.calls.lock().expect("call log lock poisoned").push(invocation);
    }

    /// Snapshot of all invocations so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the log lock is poisoned (a panic in another test thread)
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("call log lock poisoned").clone()
    }
}

/// Build a registration whose handlers only record their invocation
///
/// Create responds with `physical_id`; update echoes the id it was given;
/// delete returns no response (the dispatcher substitutes `{}`). The error
/// hook records that it was consulted and declines to replace the error.
///
/// # Errors
///
/// Returns a [`RegistrationError`] if the registration cannot be built;
/// does not happen for the handlers installed here.
pub fn recording_registration(
    schema: Schema,
    log: &CallLog,
    physical_id: &str,
) -> Result<ResourceRegistration, RegistrationError> {
    let physical_id = physical_id.to_string();
    let on_create_log = log.clone();
    let on_update_log = log.clone();
    let on_delete_log = log.clone();
    let on_error_log = log.clone();

    ResourceRegistration::builder(schema)
        .on_create_raw(move |_properties, _request| {
            let log = on_create_log.clone();
            let physical_id = physical_id.clone();
            async move {
                log.record(Invocation::Create);
                Ok(LifecycleResponse::default().with_physical_resource_id(physical_id))
            }
        })
        .on_update_raw(move |physical_id, _properties, _old_properties, _request| {
            let log = on_update_log.clone();
            async move {
                log.record(Invocation::Update);
                Ok(LifecycleResponse::default().with_physical_resource_id(physical_id))
            }
        })
        .on_delete_raw(move |_physical_id, _properties, _request| {
            let log = on_delete_log.clone();
            async move {
                log.record(Invocation::Delete);
                Ok(None)
            }
        })
        .on_error(move |_error, _request| {
            on_error_log.record(Invocation::ErrorHook);
            None
        })
        .build()
}
