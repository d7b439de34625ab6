//! End-to-end dispatch scenarios: raw caller events through the provider to
//! normalized responses or structured errors.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use serde::Deserialize;
use serde_json::{Map, Value, json};
use typed_resources_core::{LifecycleResponse, Schema, Shape};
use typed_resources_provider::{DispatchError, Provider, ResourceRegistration};
use typed_resources_testing::{
    CallLog, Invocation, create_event, delete_event, recording_registration, update_event,
};

const TYPE: &str = "Custom::ExampleResource";

fn file_schema() -> Schema {
    Schema::new()
        .field("path", Shape::String)
        .optional("optionalBool", Shape::Boolean)
}

fn recording_provider(log: &CallLog) -> Provider {
    let registration = recording_registration(file_schema(), log, "some-id").unwrap();
    Provider::single(TYPE, registration)
}

#[tokio::test]
async fn create_invokes_only_the_create_handler() {
    let log = CallLog::new();
    let provider = recording_provider(&log);

    let response = provider
        .handle(&create_event(TYPE, json!({ "Path": "/tmp", "OptionalBool": "true" })))
        .await
        .unwrap();

    assert_eq!(response, json!({ "PhysicalResourceId": "some-id" }));
    assert_eq!(log.calls(), vec![Invocation::Create]);
}

#[tokio::test]
async fn update_invokes_only_the_update_handler() {
    let log = CallLog::new();
    let provider = recording_provider(&log);

    let event = update_event(TYPE, "phys-1", json!({ "Path": "/tmp" }), json!({ "Path": "/var" }));
    let response = provider.handle(&event).await.unwrap();

    assert_eq!(response, json!({ "PhysicalResourceId": "phys-1" }));
    assert_eq!(log.calls(), vec![Invocation::Update]);
}

#[tokio::test]
async fn delete_with_no_handler_response_returns_empty_object() {
    let log = CallLog::new();
    let provider = recording_provider(&log);

    let response = provider
        .handle(&delete_event(TYPE, "phys-1", json!({ "Path": "/tmp" })))
        .await
        .unwrap();

    assert_eq!(response, json!({}));
    assert_eq!(log.calls(), vec![Invocation::Delete]);
}

#[tokio::test]
async fn typed_create_receives_coerced_properties() {
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct FileProps {
        path: String,
        optional_bool: Option<bool>,
    }

    let registration = ResourceRegistration::builder(file_schema())
        .on_create(|props: FileProps, _request| async move {
            assert_eq!(props.path, "/tmp");
            assert_eq!(props.optional_bool, Some(true));
            Ok(LifecycleResponse::default().with_physical_resource_id("some-id"))
        })
        .on_update(|id, _props: FileProps, _old: FileProps, _request| async move {
            Ok(LifecycleResponse::default().with_physical_resource_id(id))
        })
        .on_delete(|_id, _props: FileProps, _request| async move { Ok(None) })
        .build()
        .unwrap();

    let provider = Provider::single(TYPE, registration);
    let response = provider
        .handle(&create_event(TYPE, json!({ "Path": "/tmp", "OptionalBool": "true" })))
        .await
        .unwrap();

    assert_eq!(response, json!({ "PhysicalResourceId": "some-id" }));
}

#[tokio::test]
async fn unknown_resource_type_invokes_no_handler() {
    let log = CallLog::new();
    let provider = recording_provider(&log);

    let error = provider
        .handle(&create_event("Custom::Unregistered", json!({ "Path": "/tmp" })))
        .await
        .unwrap_err();

    assert!(matches!(error, DispatchError::UnknownResourceType(ref t) if t == "Custom::Unregistered"));
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn update_without_physical_id_fails_normalization() {
    let log = CallLog::new();
    let provider = recording_provider(&log);

    let mut event = create_event(TYPE, json!({ "Path": "/tmp" }));
    event["RequestType"] = json!("Update");
    event["OldResourceProperties"] = json!({ "Path": "/var" });

    let error = provider.handle(&event).await.unwrap_err();
    assert!(matches!(error, DispatchError::Envelope(_)));
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn delete_without_physical_id_fails_normalization() {
    let log = CallLog::new();
    let provider = recording_provider(&log);

    let mut event = create_event(TYPE, json!({ "Path": "/tmp" }));
    event["RequestType"] = json!("Delete");

    let error = provider.handle(&event).await.unwrap_err();
    assert!(matches!(error, DispatchError::Envelope(_)));
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn invalid_properties_consult_the_error_hook_but_no_lifecycle_handler() {
    let log = CallLog::new();
    let provider = recording_provider(&log);

    let error = provider
        .handle(&create_event(TYPE, json!({ "Path": "/tmp", "OptionalBool": "maybe" })))
        .await
        .unwrap_err();

    let DispatchError::Properties(validation) = error else {
        panic!("expected a property validation error");
    };
    assert_eq!(validation.issues[0].path, "optionalBool");
    // The hook was consulted; no create/update/delete handler ran.
    assert_eq!(log.calls(), vec![Invocation::ErrorHook]);
}

#[tokio::test]
async fn error_hook_may_replace_the_validation_error() {
    let registration = ResourceRegistration::builder(file_schema())
        .on_create_raw(|_properties, _request| async { Ok(LifecycleResponse::default()) })
        .on_update_raw(|id, _properties, _old, _request| async {
            Ok(LifecycleResponse::default().with_physical_resource_id(id))
        })
        .on_delete_raw(|_id, _properties, _request| async { Ok(None) })
        .on_error(|error, request| {
            Some(anyhow::anyhow!(
                "resource {} rejected: {} issue(s)",
                request.resource_type,
                error.issues.len()
            ))
        })
        .build()
        .unwrap();

    let provider = Provider::single(TYPE, registration);
    let error = provider
        .handle(&create_event(TYPE, json!({})))
        .await
        .unwrap_err();

    assert!(matches!(error, DispatchError::Replaced(_)));
    assert_eq!(error.to_string(), format!("resource {TYPE} rejected: 1 issue(s)"));
}

#[tokio::test]
async fn invalid_old_properties_fail_hard_without_the_hook() {
    let log = CallLog::new();
    let provider = recording_provider(&log);

    // Old properties are missing the required "Path" field.
    let event = update_event(TYPE, "phys-1", json!({ "Path": "/tmp" }), json!({}));
    let error = provider.handle(&event).await.unwrap_err();

    assert!(matches!(error, DispatchError::OldProperties(_)));
    // Neither the update handler nor the error hook ran.
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn handler_errors_propagate_unmodified() {
    let registration = ResourceRegistration::builder(file_schema())
        .on_create_raw(|_properties, _request| async {
            Err(anyhow::anyhow!("the provisioning API is down"))
        })
        .on_update_raw(|id, _properties, _old, _request| async {
            Ok(LifecycleResponse::default().with_physical_resource_id(id))
        })
        .on_delete_raw(|_id, _properties, _request| async { Ok(None) })
        .build()
        .unwrap();

    let provider = Provider::single(TYPE, registration);
    let error = provider
        .handle(&create_event(TYPE, json!({ "Path": "/tmp" })))
        .await
        .unwrap_err();

    assert!(matches!(error, DispatchError::Handler(_)));
    assert_eq!(error.to_string(), "the provisioning API is down");
}

#[tokio::test]
async fn responses_are_converted_to_the_caller_convention() {
    let registration = ResourceRegistration::builder(file_schema())
        .on_create_raw(|_properties, _request| async {
            let mut data = Map::new();
            data.insert("serviceEndpoint".to_string(), json!("https://example.test"));
            let mut extra = Map::new();
            extra.insert("customField".to_string(), json!({ "nestedKey": 1 }));
            Ok(LifecycleResponse {
                physical_resource_id: Some("some-id".to_string()),
                data: Some(data),
                no_echo: Some(true),
                extra,
            })
        })
        .on_update_raw(|id, _properties, _old, _request| async {
            Ok(LifecycleResponse::default().with_physical_resource_id(id))
        })
        .on_delete_raw(|_id, _properties, _request| async { Ok(None) })
        .build()
        .unwrap();

    let provider = Provider::single(TYPE, registration);
    let response = provider
        .handle(&create_event(TYPE, json!({ "Path": "/tmp" })))
        .await
        .unwrap();

    assert_eq!(
        response,
        json!({
            "PhysicalResourceId": "some-id",
            "Data": { "ServiceEndpoint": "https://example.test" },
            "NoEcho": true,
            "CustomField": { "NestedKey": 1 },
        })
    );
}

#[tokio::test]
async fn unknown_envelope_fields_reach_the_handler() {
    let registration = ResourceRegistration::builder(file_schema())
        .on_create_raw(|_properties, request| async move {
            let echoed = request.extra["responseUrl"].clone();
            let mut data = Map::new();
            data.insert("echoed".to_string(), echoed);
            Ok(LifecycleResponse::default()
                .with_physical_resource_id("some-id")
                .with_data(data))
        })
        .on_update_raw(|id, _properties, _old, _request| async {
            Ok(LifecycleResponse::default().with_physical_resource_id(id))
        })
        .on_delete_raw(|_id, _properties, _request| async { Ok(None) })
        .build()
        .unwrap();

    let mut event = create_event(TYPE, json!({ "Path": "/tmp" }));
    event["ResponseURL"] = json!("https://callback.example");

    let provider = Provider::single(TYPE, registration);
    let response = provider.handle(&event).await.unwrap();

    assert_eq!(response["Data"]["Echoed"], json!("https://callback.example"));
}

#[tokio::test]
async fn multi_resource_provider_routes_by_type() {
    let file_log = CallLog::new();
    let user_log = CallLog::new();
    let provider = Provider::builder()
        .resource("Custom::File", recording_registration(file_schema(), &file_log, "file-id").unwrap())
        .resource(
            "Custom::User",
            recording_registration(Schema::new().field("name", Shape::String), &user_log, "user-id").unwrap(),
        )
        .build();

    let response = provider
        .handle(&create_event("Custom::User", json!({ "Name": "alice" })))
        .await
        .unwrap();

    assert_eq!(response, json!({ "PhysicalResourceId": "user-id" }));
    assert!(file_log.calls().is_empty());
    assert_eq!(user_log.calls(), vec![Invocation::Create]);
}

#[tokio::test]
async fn concurrent_requests_share_the_provider() {
    let log = CallLog::new();
    let provider = recording_provider(&log);

    let create = create_event(TYPE, json!({ "Path": "/a" }));
    let delete = delete_event(TYPE, "phys-1", json!({ "Path": "/b" }));
    let first = provider.handle(&create);
    let second = provider.handle(&delete);
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(log.calls().len(), 2);
}
