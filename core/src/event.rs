//! Lifecycle event envelope and request normalization
//!
//! The orchestrating caller sends raw, Pascal-keyed events. [`normalize`]
//! reshapes one of those into a canonical [`LifecycleRequest`]: keys are
//! converted to camelCase, the envelope fields are checked (including the
//! conditional ones - `physicalResourceId` for updates and deletes,
//! `oldResourceProperties` for updates), and anything the envelope does not
//! name is preserved in `extra` rather than rejected.
//!
//! Envelope failures are reported as [`ValidationError`] values distinct from
//! resource-property validation - the dispatcher treats them as fatal and
//! never consults a handler's error hook for them.

use crate::case::{KeyConvention, convert_keys};
use crate::error::{Issue, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Which lifecycle transition the caller is requesting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// The logical resource must be provisioned
    Create,
    /// The logical resource must be reconfigured
    Update,
    /// The logical resource must be torn down
    Delete,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "Create"),
            Self::Update => write!(f, "Update"),
            Self::Delete => write!(f, "Delete"),
        }
    }
}

/// Canonical envelope for one lifecycle event
///
/// `physical_id` is always `Some` for Update and Delete requests, and
/// `old_resource_properties` is always `Some` for Updates - [`normalize`]
/// enforces both. Top-level fields the envelope does not name are carried in
/// `extra`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRequest {
    /// Requested lifecycle transition
    #[serde(rename = "requestType")]
    pub kind: RequestKind,
    /// Identifier selecting which registration applies
    pub resource_type: String,
    /// Caller-side logical identifier of the resource
    #[serde(rename = "logicalResourceId")]
    pub logical_id: String,
    /// Unique identifier of this request
    pub request_id: String,
    /// Identifier of the owning deployment unit
    pub stack_id: String,
    /// Resource-type-specific payload, not yet validated
    pub resource_properties: Map<String, Value>,
    /// Physical identifier of the provisioned resource
    #[serde(rename = "physicalResourceId", skip_serializing_if = "Option::is_none")]
    pub physical_id: Option<String>,
    /// Previous payload, present on updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Map<String, Value>>,
    /// Unrecognized top-level fields, preserved as received (camel-keyed)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response returned by a lifecycle handler
///
/// Open like the request envelope: anything a handler puts in `extra` is
/// converted and returned alongside the named fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleResponse {
    /// Physical identifier of the resource this request produced or touched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    /// Named attributes the caller can reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// Suppress echoing the response payload in caller logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_echo: Option<bool>,
    /// Additional handler-defined fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LifecycleResponse {
    /// Builder: set the physical resource id
    #[must_use]
    pub fn with_physical_resource_id(mut self, id: impl Into<String>) -> Self {
        self.physical_resource_id = Some(id.into());
        self
    }

    /// Builder: set the data attributes
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Builder: set the no-echo flag
    #[must_use]
    pub const fn with_no_echo(mut self, no_echo: bool) -> Self {
        self.no_echo = Some(no_echo);
        self
    }

    /// Render the response as a camel-keyed JSON object
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut map = self.extra;
        if let Some(id) = self.physical_resource_id {
            map.insert("physicalResourceId".to_string(), Value::String(id));
        }
        if let Some(data) = self.data {
            map.insert("data".to_string(), Value::Object(data));
        }
        if let Some(no_echo) = self.no_echo {
            map.insert("noEcho".to_string(), Value::Bool(no_echo));
        }
        Value::Object(map)
    }
}

/// Reshape a raw event into a canonical [`LifecycleRequest`]
///
/// Keys are converted to camelCase recursively before the envelope is
/// checked, so callers may send any convention the converter understands.
/// All envelope issues are collected into a single error.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the event is not an object, a required
/// envelope field is missing or mistyped, or a conditional field rule is
/// violated (`physicalResourceId` absent on Update/Delete,
/// `oldResourceProperties` absent on Update).
pub fn normalize(raw_event: &Value) -> Result<LifecycleRequest, ValidationError> {
    let converted = convert_keys(raw_event, KeyConvention::Camel);
    let Value::Object(mut map) = converted else {
        return Err(ValidationError::single("", "lifecycle event must be an object"));
    };

    let mut issues = Vec::new();
    let kind = take_kind(&mut map, &mut issues);
    let resource_type = take_string(&mut map, "resourceType", &mut issues);
    let logical_id = take_string(&mut map, "logicalResourceId", &mut issues);
    let request_id = take_string(&mut map, "requestId", &mut issues);
    let stack_id = take_string(&mut map, "stackId", &mut issues);
    let resource_properties = take_object(&mut map, "resourceProperties", &mut issues);
    let physical_id = take_optional_string(&mut map, "physicalResourceId", &mut issues);
    let old_resource_properties = take_optional_object(&mut map, "oldResourceProperties", &mut issues);

    match kind {
        Some(RequestKind::Update) => {
            if physical_id.is_none() {
                issues.push(Issue::new("physicalResourceId", "required for update and delete events"));
            }
            if old_resource_properties.is_none() {
                issues.push(Issue::new("oldResourceProperties", "required for update events"));
            }
        }
        Some(RequestKind::Delete) => {
            if physical_id.is_none() {
                issues.push(Issue::new("physicalResourceId", "required for update and delete events"));
            }
        }
        Some(RequestKind::Create) | None => {}
    }

    match (kind, resource_type, logical_id, request_id, stack_id, resource_properties) {
        (
            Some(kind),
            Some(resource_type),
            Some(logical_id),
            Some(request_id),
            Some(stack_id),
            Some(resource_properties),
        ) if issues.is_empty() => Ok(LifecycleRequest {
            kind,
            resource_type,
            logical_id,
            request_id,
            stack_id,
            resource_properties,
            physical_id,
            old_resource_properties,
            extra: map,
        }),
        _ => Err(ValidationError::new(issues)),
    }
}

fn take_kind(map: &mut Map<String, Value>, issues: &mut Vec<Issue>) -> Option<RequestKind> {
    match map.remove("requestType") {
        Some(Value::String(s)) => match s.as_str() {
            "Create" => Some(RequestKind::Create),
            "Update" => Some(RequestKind::Update),
            "Delete" => Some(RequestKind::Delete),
            _ => {
                issues.push(Issue::new(
                    "requestType",
                    "expected one of \"Create\", \"Update\", \"Delete\"",
                ));
                None
            }
        },
        Some(_) => {
            issues.push(Issue::new("requestType", "expected a string"));
            None
        }
        None => {
            issues.push(Issue::new("requestType", "required field is missing"));
            None
        }
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str, issues: &mut Vec<Issue>) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            issues.push(Issue::new(key, "expected a string"));
            None
        }
        None => {
            issues.push(Issue::new(key, "required field is missing"));
            None
        }
    }
}

fn take_object(
    map: &mut Map<String, Value>,
    key: &str,
    issues: &mut Vec<Issue>,
) -> Option<Map<String, Value>> {
    match map.remove(key) {
        Some(Value::Object(object)) => Some(object),
        Some(_) => {
            issues.push(Issue::new(key, "expected an object"));
            None
        }
        None => {
            issues.push(Issue::new(key, "required field is missing"));
            None
        }
    }
}

fn take_optional_string(
    map: &mut Map<String, Value>,
    key: &str,
    issues: &mut Vec<Issue>,
) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            issues.push(Issue::new(key, "expected a string"));
            None
        }
        None => None,
    }
}

fn take_optional_object(
    map: &mut Map<String, Value>,
    key: &str,
    issues: &mut Vec<Issue>,
) -> Option<Map<String, Value>> {
    match map.remove(key) {
        Some(Value::Object(object)) => Some(object),
        Some(_) => {
            issues.push(Issue::new(key, "expected an object"));
            None
        }
        None => None,
    }
}
