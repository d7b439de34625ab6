//! # Typed Resources Provider
//!
//! The dispatching half of the typed custom resource framework: a
//! [`ResourceRegistry`] binds resource-type identifiers to
//! [`ResourceRegistration`]s (schema plus create/update/delete callbacks),
//! and a [`Provider`] dispatches each incoming lifecycle event to exactly one
//! of those callbacks, validating the event envelope and the resource
//! properties on the way in and converting the response to the caller's key
//! convention on the way out.
//!
//! ## Example
//!
//! ```ignore
//! use typed_resources_core::{LifecycleResponse, Schema, Shape};
//! use typed_resources_provider::{Provider, ResourceRegistration};
//!
//! #[derive(serde::Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct FileProps {
//!     path: String,
//!     optional_bool: Option<bool>,
//! }
//!
//! let schema = Schema::new()
//!     .field("path", Shape::String)
//!     .optional("optionalBool", Shape::Boolean);
//!
//! let registration = ResourceRegistration::builder(schema)
//!     .on_create(|props: FileProps, _request| async move {
//!         Ok(LifecycleResponse::default().with_physical_resource_id("some-id"))
//!     })
//!     .on_update(|id, props: FileProps, _old: FileProps, _request| async move {
//!         Ok(LifecycleResponse::default().with_physical_resource_id(id))
//!     })
//!     .on_delete(|_id, _props: FileProps, _request| async move { Ok(None) })
//!     .build()?;
//!
//! let provider = Provider::single("Custom::ExampleResource", registration);
//! let response = provider.handle(&raw_event).await?;
//! ```

pub mod dispatcher;
pub mod error;
pub mod registration;
pub mod registry;

pub use dispatcher::{Provider, ProviderBuilder};
pub use error::{DispatchError, RegistrationError};
pub use registration::{CreateFn, DeleteFn, ErrorHook, RegistrationBuilder, ResourceRegistration, UpdateFn};
pub use registry::{ResourceRegistry, ResourceRegistryBuilder};
