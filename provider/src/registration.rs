//! Resource handler registration
//!
//! A [`ResourceRegistration`] binds a schema to the three lifecycle callbacks
//! (plus an optional validation-error hook) for one resource type. Handlers
//! are registered through typed builder methods: the closure receives the
//! validated properties deserialized into any `P: DeserializeOwned`, so
//! handler code works with real structs instead of raw JSON maps. Raw
//! variants exist for handlers that want the coerced map as-is.
//!
//! ```ignore
//! let registration = ResourceRegistration::builder(schema)
//!     .on_create(|props: FileProps, _request| async move {
//!         let id = provision(&props.path).await?;
//!         Ok(LifecycleResponse::default().with_physical_resource_id(id))
//!     })
//!     .on_update(|id, props: FileProps, old: FileProps, _request| async move { .. })
//!     .on_delete(|id, props: FileProps, _request| async move { Ok(None) })
//!     .build()?;
//! ```

use crate::error::RegistrationError;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use typed_resources_core::{LifecycleRequest, LifecycleResponse, Schema, ValidationError};

/// Type-erased create callback: `(validated properties, request)`
pub type CreateFn = Arc<
    dyn Fn(Map<String, Value>, LifecycleRequest) -> BoxFuture<'static, anyhow::Result<LifecycleResponse>>
        + Send
        + Sync,
>;

/// Type-erased update callback: `(physical id, new properties, old properties, request)`
pub type UpdateFn = Arc<
    dyn Fn(
            String,
            Map<String, Value>,
            Map<String, Value>,
            LifecycleRequest,
        ) -> BoxFuture<'static, anyhow::Result<LifecycleResponse>>
        + Send
        + Sync,
>;

/// Type-erased delete callback: `(physical id, validated properties, request)`
///
/// Returning `None` is not an error; the dispatcher substitutes an empty
/// response.
pub type DeleteFn = Arc<
    dyn Fn(
            String,
            Map<String, Value>,
            LifecycleRequest,
        ) -> BoxFuture<'static, anyhow::Result<Option<LifecycleResponse>>>
        + Send
        + Sync,
>;

/// Hook consulted when the current resource properties fail validation
///
/// May return a replacement error to surface instead of the validation
/// error, or `None` to let it propagate as-is.
pub type ErrorHook = Arc<dyn Fn(&ValidationError, &LifecycleRequest) -> Option<anyhow::Error> + Send + Sync>;

/// Schema and lifecycle callbacks for one resource type
///
/// Immutable once built; the registry owns it and handlers hold no
/// back-reference.
#[derive(Clone)]
pub struct ResourceRegistration {
    pub(crate) schema: Schema,
    pub(crate) on_create: CreateFn,
    pub(crate) on_update: UpdateFn,
    pub(crate) on_delete: DeleteFn,
    pub(crate) on_error: Option<ErrorHook>,
}

impl ResourceRegistration {
    /// Start building a registration around a property schema
    #[must_use]
    pub fn builder(schema: Schema) -> RegistrationBuilder {
        RegistrationBuilder {
            schema,
            on_create: None,
            on_update: None,
            on_delete: None,
            on_error: None,
        }
    }

    /// The property schema this registration validates against
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl std::fmt::Debug for ResourceRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistration")
            .field("schema", &self.schema)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ResourceRegistration`]
pub struct RegistrationBuilder {
    schema: Schema,
    on_create: Option<CreateFn>,
    on_update: Option<UpdateFn>,
    on_delete: Option<DeleteFn>,
    on_error: Option<ErrorHook>,
}

impl RegistrationBuilder {
    /// Set the create handler with typed properties
    #[must_use]
    pub fn on_create<P, F, Fut>(mut self, handler: F) -> Self
    where
        P: DeserializeOwned + Send,
        F: Fn(P, LifecycleRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<LifecycleResponse>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.on_create = Some(Arc::new(move |properties, request| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let typed = decode::<P>(properties)?;
                handler(typed, request).await
            })
        }));
        self
    }

    /// Set the create handler over the raw validated property map
    #[must_use]
    pub fn on_create_raw<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Map<String, Value>, LifecycleRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<LifecycleResponse>> + Send + 'static,
    {
        self.on_create = Some(Arc::new(move |properties, request| {
            Box::pin(handler(properties, request))
        }));
        self
    }

    /// Set the update handler with typed new and old properties
    #[must_use]
    pub fn on_update<P, F, Fut>(mut self, handler: F) -> Self
    where
        P: DeserializeOwned + Send,
        F: Fn(String, P, P, LifecycleRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<LifecycleResponse>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.on_update = Some(Arc::new(move |physical_id, properties, old_properties, request| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let typed = decode::<P>(properties)?;
                let typed_old = decode::<P>(old_properties)?;
                handler(physical_id, typed, typed_old, request).await
            })
        }));
        self
    }

    /// Set the update handler over the raw validated property maps
    #[must_use]
    pub fn on_update_raw<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(String, Map<String, Value>, Map<String, Value>, LifecycleRequest) -> Fut
            + Send
            + Sync
            + 'static,
        Fut: Future<Output = anyhow::Result<LifecycleResponse>> + Send + 'static,
    {
        self.on_update = Some(Arc::new(move |physical_id, properties, old_properties, request| {
            Box::pin(handler(physical_id, properties, old_properties, request))
        }));
        self
    }

    /// Set the delete handler with typed properties
    #[must_use]
    pub fn on_delete<P, F, Fut>(mut self, handler: F) -> Self
    where
        P: DeserializeOwned + Send,
        F: Fn(String, P, LifecycleRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<LifecycleResponse>>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.on_delete = Some(Arc::new(move |physical_id, properties, request| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let typed = decode::<P>(properties)?;
                handler(physical_id, typed, request).await
            })
        }));
        self
    }

    /// Set the delete handler over the raw validated property map
    #[must_use]
    pub fn on_delete_raw<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(String, Map<String, Value>, LifecycleRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<LifecycleResponse>>> + Send + 'static,
    {
        self.on_delete = Some(Arc::new(move |physical_id, properties, request| {
            Box::pin(handler(physical_id, properties, request))
        }));
        self
    }

    /// Set the hook consulted when current properties fail validation
    ///
    /// The hook is never consulted for envelope failures or for old-property
    /// failures during updates.
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ValidationError, &LifecycleRequest) -> Option<anyhow::Error> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Finish the registration
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] naming the first missing lifecycle
    /// handler.
    pub fn build(self) -> Result<ResourceRegistration, RegistrationError> {
        Ok(ResourceRegistration {
            schema: self.schema,
            on_create: self.on_create.ok_or(RegistrationError::MissingCreate)?,
            on_update: self.on_update.ok_or(RegistrationError::MissingUpdate)?,
            on_delete: self.on_delete.ok_or(RegistrationError::MissingDelete)?,
            on_error: self.on_error,
        })
    }
}

/// Deserialize validated properties into the handler's declared type.
///
/// The schema has already coerced the payload, so a failure here means the
/// registered type and the registered schema disagree - a registration bug,
/// surfaced as a handler error.
fn decode<P: DeserializeOwned>(properties: Map<String, Value>) -> anyhow::Result<P> {
    serde_json::from_value(Value::Object(properties))
        .map_err(|err| anyhow::anyhow!("validated properties do not match the registered handler type: {err}"))
}
