//! Lifecycle event dispatcher
//!
//! [`Provider`] is the orchestrating unit: it accepts one raw event per
//! invocation and walks it through normalization, registration lookup,
//! property validation, exactly one lifecycle callback, and response
//! conversion back into the caller's PascalCase convention.
//!
//! Dispatch per request:
//!
//! ```text
//! raw event -> normalize -> resolve type -> validate properties
//!           -> one of {create, update, delete} -> Pascal-keyed response
//! ```
//!
//! Any stage can fail into a [`DispatchError`]; only a current-property
//! validation failure consults the registration's error hook. The dispatcher
//! holds no mutable state - the registry is immutable after construction, so
//! a `Provider` can be shared across concurrent invocations freely.

use crate::error::DispatchError;
use crate::registration::ResourceRegistration;
use crate::registry::{ResourceRegistry, ResourceRegistryBuilder};
use serde_json::Value;
use std::sync::Arc;
use typed_resources_core::{
    KeyConvention, LifecycleRequest, RequestKind, ValidationError, convert_keys, normalize,
};

/// Dispatches lifecycle events to registered resource handlers
///
/// Cheap to clone; clones share the underlying registry.
#[derive(Clone, Debug)]
pub struct Provider {
    registry: Arc<ResourceRegistry>,
}

impl Provider {
    /// Create a provider over a prebuilt registry
    #[must_use]
    pub fn new(registry: ResourceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Start building a provider by registering resource types
    #[must_use]
    pub fn builder() -> ProviderBuilder {
        ProviderBuilder {
            registry: ResourceRegistry::builder(),
        }
    }

    /// Create a provider serving a single resource type
    ///
    /// Convenience for deployments exposing one handler entry point.
    #[must_use]
    pub fn single(type_identifier: impl Into<String>, registration: ResourceRegistration) -> Self {
        Self::builder().resource(type_identifier, registration).build()
    }

    /// The registry this provider dispatches against
    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Handle one raw lifecycle event
    ///
    /// Returns the handler's response converted to the caller's PascalCase
    /// convention. Exactly one lifecycle callback runs per request; the
    /// dispatcher awaits it and nothing else. Cancellation from the invoking
    /// runtime propagates into that await.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when the envelope is malformed, the
    /// resource type is unregistered, properties fail validation, or the
    /// handler itself fails. Handler errors pass through unmodified.
    pub async fn handle(&self, raw_event: &Value) -> Result<Value, DispatchError> {
        let request = match normalize(raw_event) {
            Ok(request) => request,
            Err(error) => {
                tracing::error!(error = %error, "received an invalid lifecycle event");
                return Err(DispatchError::Envelope(error));
            }
        };

        let Some(registration) = self.registry.resolve(&request.resource_type) else {
            tracing::error!(resource_type = %request.resource_type, "received an event for an unknown resource type");
            return Err(DispatchError::UnknownResourceType(request.resource_type));
        };

        let properties = match registration.schema.validate_object(&request.resource_properties) {
            Ok(properties) => properties,
            Err(error) => {
                tracing::error!(
                    resource_type = %request.resource_type,
                    error = %error,
                    "failed to validate resource properties for incoming request"
                );
                if let Some(hook) = &registration.on_error {
                    if let Some(replacement) = hook(&error, &request) {
                        return Err(DispatchError::Replaced(replacement));
                    }
                }
                return Err(DispatchError::Properties(error));
            }
        };

        tracing::debug!(
            resource_type = %request.resource_type,
            kind = %request.kind,
            logical_id = %request.logical_id,
            "dispatching lifecycle request"
        );

        // Exactly one branch runs per request; each arm awaits its single
        // callback and yields the response.
        let response = match request.kind {
            RequestKind::Create => (registration.on_create)(properties, request.clone())
                .await
                .map_err(DispatchError::Handler)?,

            RequestKind::Update => {
                let physical_id = require_physical_id(&request)?;
                let old_raw = request.old_resource_properties.clone().ok_or_else(|| {
                    DispatchError::Envelope(ValidationError::single(
                        "oldResourceProperties",
                        "required for update events",
                    ))
                })?;
                // Old properties were valid when they were recorded; a
                // failure here is corrupted deployment state. No hook.
                let old_properties = registration
                    .schema
                    .validate_object(&old_raw)
                    .map_err(DispatchError::OldProperties)?;
                (registration.on_update)(physical_id, properties, old_properties, request.clone())
                    .await
                    .map_err(DispatchError::Handler)?
            }

            RequestKind::Delete => {
                let physical_id = require_physical_id(&request)?;
                (registration.on_delete)(physical_id, properties, request.clone())
                    .await
                    .map_err(DispatchError::Handler)?
                    .unwrap_or_default()
            }
        };

        Ok(convert_keys(&response.into_value(), KeyConvention::Pascal))
    }
}

/// The normalizer guarantees a physical id for Update and Delete; this keeps
/// the guarantee explicit instead of unwrapping.
fn require_physical_id(request: &LifecycleRequest) -> Result<String, DispatchError> {
    request.physical_id.clone().ok_or_else(|| {
        DispatchError::Envelope(ValidationError::single(
            "physicalResourceId",
            "required for update and delete events",
        ))
    })
}

/// Builder for [`Provider`]
pub struct ProviderBuilder {
    registry: ResourceRegistryBuilder,
}

impl ProviderBuilder {
    /// Register a resource type with this provider
    #[must_use]
    pub fn resource(
        mut self,
        type_identifier: impl Into<String>,
        registration: ResourceRegistration,
    ) -> Self {
        self.registry = self.registry.register(type_identifier, registration);
        self
    }

    /// Finish the provider
    #[must_use]
    pub fn build(self) -> Provider {
        Provider::new(self.registry.build())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use typed_resources_core::{LifecycleResponse, Schema, Shape};

    #[derive(Debug, Deserialize)]
    struct PathProps {
        path: String,
    }

    fn create_event(properties: Value) -> Value {
        json!({
            "RequestType": "Create",
            "ResourceType": "Custom::Example",
            "LogicalResourceId": "Example",
            "RequestId": "req-1",
            "StackId": "stack-1",
            "ResourceProperties": properties,
        })
    }

    #[tokio::test]
    async fn typed_handler_receives_deserialized_properties() {
        let registration = ResourceRegistration::builder(Schema::new().field("path", Shape::String))
            .on_create(|props: PathProps, _request| async move {
                Ok(LifecycleResponse::default().with_physical_resource_id(props.path))
            })
            .on_update(|id, _props: PathProps, _old: PathProps, _request| async move {
                Ok(LifecycleResponse::default().with_physical_resource_id(id))
            })
            .on_delete(|_id, _props: PathProps, _request| async move { Ok(None) })
            .build()
            .unwrap();

        let provider = Provider::single("Custom::Example", registration);
        let response = provider.handle(&create_event(json!({ "Path": "/tmp" }))).await.unwrap();

        assert_eq!(response, json!({ "PhysicalResourceId": "/tmp" }));
    }

    #[tokio::test]
    async fn schema_and_handler_type_disagreement_is_a_handler_error() {
        // The schema admits a boolean where the struct wants a string; the
        // decode failure surfaces as a handler error, not a validation error.
        let registration = ResourceRegistration::builder(Schema::new().field("path", Shape::Any))
            .on_create(|props: PathProps, _request| async move {
                Ok(LifecycleResponse::default().with_physical_resource_id(props.path))
            })
            .on_update(|id, _props: PathProps, _old: PathProps, _request| async move {
                Ok(LifecycleResponse::default().with_physical_resource_id(id))
            })
            .on_delete(|_id, _props: PathProps, _request| async move { Ok(None) })
            .build()
            .unwrap();

        let provider = Provider::single("Custom::Example", registration);
        let error = provider.handle(&create_event(json!({ "Path": true }))).await.unwrap_err();

        assert!(matches!(error, DispatchError::Handler(_)));
    }
}
