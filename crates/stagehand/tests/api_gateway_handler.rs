//! Gateway-mode handler integration tests.

use serde_json::{json, Value};
use stagehand::fixtures::{gateway_body_schema, RecordingLogSink};
use stagehand::{
    create_api_gateway_handler, ApiGatewayHandler, ClientError, CorsConfig, CorsInput,
    GatewayResponse, HandlerError, InvocationContext, InvocationEvent, Schema,
    SecurityHeadersConfig,
};
use std::sync::Arc;

async fn hello(_event: InvocationEvent, _ctx: InvocationContext) -> Result<Value, HandlerError> {
    Ok(json!({ "statusCode": 200, "body": { "hello": "there" } }))
}

async fn bad_request(
    _event: InvocationEvent,
    _ctx: InvocationContext,
) -> Result<Value, HandlerError> {
    Err(ClientError::new("bad request").into())
}

async fn crash(_event: InvocationEvent, _ctx: InvocationContext) -> Result<Value, HandlerError> {
    Err(anyhow::anyhow!("connection reset by peer").into())
}

fn get_request() -> Value {
    json!({
        "httpMethod": "GET",
        "headers": { "origin": "https://example.com" }
    })
}

fn build<L: stagehand::HandlerLogic>(
    logic: L,
    cors: Option<CorsInput>,
) -> (ApiGatewayHandler, Arc<RecordingLogSink>) {
    let sink = Arc::new(RecordingLogSink::new());
    let handler = create_api_gateway_handler(logic, Schema::any(), sink.clone(), cors);
    (handler, sink)
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[tokio::test]
async fn test_success_serializes_body() {
    let (handler, sink) = build(hello, None);

    let response = handler.invoke(json!({}), InvocationContext::new()).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body.as_deref(), Some(r#"{"hello":"there"}"#));
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(sink.debug_count(), 2);
    assert_eq!(sink.error_count(), 0);
}

#[tokio::test]
async fn test_client_error_is_400_with_body() {
    let (handler, sink) = build(bad_request, None);

    let response = handler.invoke(json!({}), InvocationContext::new()).await;

    assert_eq!(response.status_code, 400);
    assert_eq!(
        response.body.as_deref(),
        Some(r#"{"errorMessage":"bad request","errorType":"BadRequestError"}"#)
    );
    assert_eq!(sink.error_count(), 0);
    assert_eq!(sink.debug_count(), 2);
}

#[tokio::test]
async fn test_service_error_is_bare_500() {
    let (handler, sink) = build(crash, None);

    let response = handler.invoke(json!({}), InvocationContext::new()).await;

    assert_eq!(response.status_code, 500);
    assert!(response.body.is_none());
    assert_eq!(sink.error_count(), 1);
    assert_eq!(
        sink.with_message("handler.error")[0].metadata["errorMessage"],
        "connection reset by peer"
    );
    assert_eq!(sink.debug_count(), 2);

    let serialized = serde_json::to_value(&response).unwrap();
    assert!(serialized.get("body").is_none());
    assert!(!serialized.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_success_without_status_code_is_logged_500() {
    let (handler, sink) = build(
        |_event: InvocationEvent, _ctx: InvocationContext| async move {
            Ok::<_, HandlerError>(json!({ "body": { "hello": "there" } }))
        },
        None,
    );

    let response = handler.invoke(json!({}), InvocationContext::new()).await;

    assert_eq!(response.status_code, 500);
    assert!(response.body.is_none());
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(sink.error_count(), 1);
    assert_eq!(
        sink.with_message("handler.error")[0].metadata["errorMessage"],
        "gateway response is missing a valid statusCode"
    );
    assert_eq!(sink.debug_count(), 2);
}

#[tokio::test]
async fn test_every_outcome_has_status_code() {
    for (logic_name, expected) in [("hello", 200), ("bad_request", 400), ("crash", 500)] {
        let (handler, _) = match logic_name {
            "hello" => build(hello, Some(true.into())),
            "bad_request" => build(bad_request, Some(true.into())),
            _ => build(crash, Some(true.into())),
        };
        let response = handler.invoke(get_request(), InvocationContext::new()).await;
        let serialized = serde_json::to_value(&response).unwrap();

        assert_eq!(serialized["statusCode"], expected, "{logic_name}");
        assert_eq!(
            response.header("Access-Control-Allow-Origin"),
            Some("https://example.com"),
            "{logic_name}"
        );
    }
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_cors_wildcard_with_credentials_echoes_origin() {
    let (handler, _) = build(hello, Some(CorsInput::Enabled(true)));

    let response = handler.invoke(get_request(), InvocationContext::new()).await;

    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some("https://example.com")
    );
    assert_eq!(response.header("Access-Control-Allow-Credentials"), Some("true"));
}

#[tokio::test]
async fn test_cors_wildcard_without_origin_header() {
    let (handler, _) = build(hello, Some(CorsInput::Enabled(true)));

    let response = handler
        .invoke(json!({ "httpMethod": "GET" }), InvocationContext::new())
        .await;

    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
}

#[tokio::test]
async fn test_cors_explicit_origin_list() {
    let cors = CorsConfig::with_origins(["https://shop.example", "https://admin.example"])
        .credentials(false)
        .allow_header("Authorization");
    let (handler, _) = build(hello, Some(cors.into()));

    let listed = handler
        .invoke(
            json!({ "httpMethod": "GET", "headers": { "Origin": "https://admin.example" } }),
            InvocationContext::new(),
        )
        .await;
    assert_eq!(
        listed.header("Access-Control-Allow-Origin"),
        Some("https://admin.example")
    );
    assert_eq!(listed.header("Access-Control-Allow-Credentials"), None);
    assert_eq!(listed.header("Access-Control-Allow-Headers"), Some("Authorization"));

    let unlisted = handler
        .invoke(get_request(), InvocationContext::new())
        .await;
    assert_eq!(
        unlisted.header("Access-Control-Allow-Origin"),
        Some("https://shop.example")
    );
}

#[tokio::test]
async fn test_cors_skipped_without_http_method() {
    let (handler, _) = build(hello, Some(CorsInput::Enabled(true)));

    let response = handler.invoke(json!({}), InvocationContext::new()).await;

    assert_eq!(response.header("Access-Control-Allow-Origin"), None);
}

#[tokio::test]
async fn test_cors_config_from_json_document() {
    let cors: CorsInput =
        serde_json::from_value(json!({ "origins": ["https://shop.example"], "withCredentials": true }))
            .unwrap();
    let (handler, _) = build(hello, Some(cors));

    let response = handler.invoke(get_request(), InvocationContext::new()).await;

    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some("https://shop.example")
    );
    assert_eq!(response.header("Access-Control-Allow-Credentials"), Some("true"));
}

// ============================================================================
// Security headers
// ============================================================================

#[tokio::test]
async fn test_security_headers_on_every_outcome() {
    for handler in [build(hello, None).0, build(crash, None).0] {
        let response = handler.invoke(json!({}), InvocationContext::new()).await;
        assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
        assert_eq!(response.header("referrer-policy"), Some("no-referrer"));
        assert!(response
            .header("strict-transport-security")
            .unwrap()
            .starts_with("max-age=15552000"));
    }
}

#[tokio::test]
async fn test_custom_security_headers() {
    let handler = ApiGatewayHandler::builder(hello)
        .log(Arc::new(RecordingLogSink::new()))
        .security_headers(SecurityHeadersConfig {
            referrer_policy: "same-origin".to_string(),
            ..SecurityHeadersConfig::default()
        })
        .build();

    let response = handler.invoke(json!({}), InvocationContext::new()).await;

    assert_eq!(response.header("referrer-policy"), Some("same-origin"));
}

// ============================================================================
// Body parsing and validation
// ============================================================================

async fn greet(event: InvocationEvent, _ctx: InvocationContext) -> Result<Value, HandlerError> {
    let name = event
        .body()
        .and_then(|body| body.get("name"))
        .cloned()
        .unwrap_or(Value::Null);
    Ok(json!({ "statusCode": 200, "body": { "hello": name } }))
}

fn post(body: &str) -> Value {
    json!({
        "httpMethod": "POST",
        "headers": { "Content-Type": "application/json" },
        "body": body
    })
}

#[tokio::test]
async fn test_json_body_is_parsed_before_validation() {
    let sink = Arc::new(RecordingLogSink::new());
    let handler = create_api_gateway_handler(greet, gateway_body_schema(), sink, None);

    let response = handler
        .invoke(post(r#"{"name":"casey"}"#), InvocationContext::new())
        .await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body.as_deref(), Some(r#"{"hello":"casey"}"#));
}

#[tokio::test]
async fn test_validation_failure_is_400() {
    let sink = Arc::new(RecordingLogSink::new());
    let handler = create_api_gateway_handler(greet, gateway_body_schema(), sink.clone(), None);

    let response = handler
        .invoke(post(r#"{"name":42}"#), InvocationContext::new())
        .await;

    assert_eq!(response.status_code, 400);
    let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["errorType"], "BadRequestError");
    let message = body["errorMessage"].as_str().unwrap();
    assert!(message.contains(
        "Errors on 1 properties were found while validating properties for lambda invocation event"
    ));
    assert!(message.contains(r#""body.name" must be a string"#));
    assert_eq!(sink.error_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_body_is_400() {
    let sink = Arc::new(RecordingLogSink::new());
    let handler = create_api_gateway_handler(greet, gateway_body_schema(), sink.clone(), None);

    let response = handler
        .invoke(post("{\"name\":"), InvocationContext::new())
        .await;

    assert_eq!(response.status_code, 400);
    assert_eq!(sink.error_count(), 0);
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_repeated_invocations_yield_identical_responses() {
    let (handler, _) = build(bad_request, Some(CorsInput::Enabled(true)));

    let first = handler.invoke(get_request(), InvocationContext::new()).await;
    let second = handler.invoke(get_request(), InvocationContext::new()).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_gateway_response_serializes_camel_case() {
    let (handler, _) = build(hello, None);

    let response: GatewayResponse = handler.invoke(json!({}), InvocationContext::new()).await;
    let serialized = serde_json::to_value(&response).unwrap();

    assert_eq!(serialized["statusCode"], 200);
    assert_eq!(serialized["body"], r#"{"hello":"there"}"#);
    assert!(serialized["headers"].is_object());
}
