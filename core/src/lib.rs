//! # Typed Resources Core
//!
//! Leaf types and pure logic for typed custom resource providers: the
//! lifecycle event envelope, schema-driven payload validation, and
//! key-convention conversion between the caller's PascalCase transport and
//! the camelCase convention used internally.
//!
//! The dispatching machinery lives in `typed-resources-provider`; this crate
//! has no opinion about how requests arrive or handlers run.
//!
//! ## Modules
//!
//! - [`case`]: recursive key renaming between naming conventions
//! - [`schema`]: declarative shapes, coercing validation, typed extraction
//! - [`event`]: the [`LifecycleRequest`]/[`LifecycleResponse`] envelope and
//!   the request normalizer
//! - [`error`]: validation failures as inspectable values

pub mod case;
pub mod error;
pub mod event;
pub mod schema;

pub use case::{KeyConvention, convert_key, convert_keys};
pub use error::{Issue, ValidationError};
pub use event::{LifecycleRequest, LifecycleResponse, RequestKind, normalize};
pub use schema::{Schema, Shape};

// Re-export the JSON value types used throughout the public API
pub use serde_json::{Map, Value};
