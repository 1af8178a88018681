//! Plain-mode handler integration tests.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use stagehand::fixtures::{error_switch_schema, RecordingLogSink};
use stagehand::{
    create_standard_handler, typed, HandlerError, InvocationContext, InvocationEvent, Schema,
    StandardHandler,
};
use std::sync::Arc;

async fn switch(event: InvocationEvent, _ctx: InvocationContext) -> Result<Value, HandlerError> {
    if event.get("throwClientError") == Some(&json!(true)) {
        return Err(HandlerError::bad_request("bad request"));
    }
    if event.get("throwServiceError") == Some(&json!(true)) {
        return Err(anyhow::anyhow!("database unreachable").into());
    }
    Ok(json!({ "ok": true }))
}

fn handler() -> (StandardHandler, Arc<RecordingLogSink>) {
    let sink = Arc::new(RecordingLogSink::new());
    let handler = create_standard_handler(switch, error_switch_schema(), sink.clone());
    (handler, sink)
}

fn event(client: bool, service: bool) -> Value {
    json!({ "throwClientError": client, "throwServiceError": service })
}

// ============================================================================
// Outcomes
// ============================================================================

#[tokio::test]
async fn test_success_returns_logic_value() {
    let (handler, sink) = handler();

    let result = handler
        .invoke(event(false, false), InvocationContext::new())
        .await
        .unwrap();

    assert_eq!(result, json!({ "ok": true }));
    assert_eq!(sink.debug_count(), 2);
    assert_eq!(sink.error_count(), 0);
    assert_eq!(
        sink.with_message("handler.output")[0].metadata,
        json!({ "response": { "ok": true } })
    );
}

#[tokio::test]
async fn test_client_error_is_returned_as_value() {
    let (handler, sink) = handler();

    let result = handler
        .invoke(event(true, false), InvocationContext::new())
        .await
        .unwrap();

    assert_eq!(result["errorMessage"], "bad request");
    assert_eq!(result["errorType"], "BadRequestError");
    assert!(result["stackTrace"]
        .as_str()
        .unwrap()
        .starts_with("BadRequestError: bad request"));
    assert_eq!(sink.error_count(), 0);
    assert_eq!(sink.debug_count(), 2);
}

#[tokio::test]
async fn test_service_error_propagates_and_logs_once() {
    let (handler, sink) = handler();

    let error = handler
        .invoke(event(false, true), InvocationContext::new())
        .await
        .unwrap_err();

    assert!(!error.is_client_caused());
    assert_eq!(error.message(), "database unreachable");

    let errors = sink.with_message("handler.error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].metadata["errorMessage"], "database unreachable");
    assert!(errors[0].metadata["stackTrace"].is_string());

    let output = &sink.with_message("handler.output")[0];
    assert_eq!(output.metadata["errorMessage"], "database unreachable");
    assert_eq!(sink.debug_count(), 2);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_validation_failure_short_circuits_logic() {
    let sink = Arc::new(RecordingLogSink::new());
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handler = create_standard_handler(
        move |_event: InvocationEvent, _ctx: InvocationContext| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async move { Ok::<_, HandlerError>(json!({})) }
        },
        error_switch_schema(),
        sink.clone(),
    );

    let result = handler
        .invoke(json!({ "bananas": true }), InvocationContext::new())
        .await
        .unwrap();

    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    let message = result["errorMessage"].as_str().unwrap();
    assert!(message.starts_with(
        "Errors on 1 properties were found while validating properties for lambda invocation event:"
    ));
    assert!(message.contains(r#""path": "throwClientError""#));
    assert!(message.contains(r#""bananas": true"#));

    // Start log sees the raw event; the end log still fires.
    let input = &sink.with_message("handler.input")[0];
    assert_eq!(input.metadata["event"], json!({ "bananas": true }));
    assert_eq!(sink.debug_count(), 2);
    assert_eq!(sink.error_count(), 0);
}

#[tokio::test]
async fn test_typed_logic_rejects_mismatched_event() {
    #[derive(Deserialize)]
    struct Order {
        quantity: u32,
    }

    #[derive(Serialize)]
    struct Receipt {
        total: u32,
    }

    let sink = Arc::new(RecordingLogSink::new());
    let handler = create_standard_handler(
        typed(|order: Order, _ctx: InvocationContext| async move {
            Ok::<_, HandlerError>(Receipt {
                total: order.quantity * 3,
            })
        }),
        Schema::any(),
        sink.clone(),
    );

    let ok = handler
        .invoke(json!({ "quantity": 2 }), InvocationContext::new())
        .await
        .unwrap();
    assert_eq!(ok, json!({ "total": 6 }));

    let rejected = handler
        .invoke(json!({ "quantity": "two" }), InvocationContext::new())
        .await
        .unwrap();
    assert_eq!(rejected["errorType"], "BadRequestError");
    assert_eq!(sink.error_count(), 0);
}

// ============================================================================
// Context and concurrency
// ============================================================================

#[tokio::test]
async fn test_context_reaches_logic() {
    let sink = Arc::new(RecordingLogSink::new());
    let handler = create_standard_handler(
        |_event: InvocationEvent, ctx: InvocationContext| async move {
            Ok::<_, HandlerError>(json!({ "user": ctx.attribute("sub").cloned() }))
        },
        Schema::any(),
        sink,
    );

    let context = InvocationContext::new().with_attribute("sub", json!("user-42"));
    let result = handler.invoke(json!({}), context).await.unwrap();

    assert_eq!(result, json!({ "user": "user-42" }));
}

#[tokio::test]
async fn test_repeated_invocations_are_identical() {
    let (handler, _sink) = handler();

    let first = handler
        .invoke(event(true, false), InvocationContext::new())
        .await
        .unwrap();
    let second = handler
        .invoke(event(true, false), InvocationContext::new())
        .await
        .unwrap();

    assert_eq!(first["errorMessage"], second["errorMessage"]);
    assert_eq!(first["errorType"], second["errorType"]);
    assert_eq!(
        first.as_object().unwrap().keys().collect::<Vec<_>>(),
        second.as_object().unwrap().keys().collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_concurrent_invocations_are_independent() {
    let (handler, sink) = handler();

    let mut tasks = Vec::new();
    for i in 0..6 {
        let handler = handler.clone();
        tasks.push(tokio::spawn(async move {
            handler
                .invoke(event(i % 2 == 0, false), InvocationContext::new())
                .await
        }));
    }

    let mut client_errors = 0;
    for task in tasks {
        let result = task.await.unwrap().unwrap();
        if result.get("errorType").is_some() {
            client_errors += 1;
        }
    }

    assert_eq!(client_errors, 3);
    assert_eq!(sink.debug_count(), 12);
    assert_eq!(sink.error_count(), 0);
}
