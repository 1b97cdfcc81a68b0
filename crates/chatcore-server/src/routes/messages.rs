use axum::{routing::post, Json, Router};
use chatcore::{
    assemble::{assemble, sanitize_ui_messages},
    hydrate::{hydrate_all, to_rows},
    models::{
        fragment::ContentFragment,
        message::{ContentRow, PersistedMessage, ResponseMessage},
        ui::UIMessage,
    },
    normalize::normalize,
    sanitize::sanitize,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct NormalizeRequest {
    content: Value,
}

#[derive(Debug, Serialize)]
struct NormalizeResponse {
    fragments: Vec<ContentFragment>,
}

#[derive(Debug, Deserialize)]
struct AssembleRequest {
    messages: Vec<PersistedMessage>,
    /// Rows of the content side table for `messages`
    #[serde(default)]
    contents: Vec<ContentRow>,
    /// Drop unfinished tool invocations, for history sent back to the model
    #[serde(default)]
    sanitize: bool,
}

#[derive(Debug, Serialize)]
struct AssembleResponse {
    messages: Vec<UIMessage>,
}

#[derive(Debug, Deserialize)]
struct SanitizeRequest {
    messages: Vec<ResponseMessage>,
    #[serde(default)]
    reasoning: Option<String>,
}

#[derive(Debug, Serialize)]
struct SanitizeResponse {
    messages: Vec<ResponseMessage>,
    /// Side table rows to write for the kept messages
    rows: Vec<ContentRow>,
}

async fn normalize_handler(Json(request): Json<NormalizeRequest>) -> Json<NormalizeResponse> {
    Json(NormalizeResponse {
        fragments: normalize(&request.content),
    })
}

async fn assemble_handler(Json(request): Json<AssembleRequest>) -> Json<AssembleResponse> {
    let count = request.messages.len();
    let messages = assemble(&hydrate_all(request.messages, request.contents));
    let messages = if request.sanitize {
        sanitize_ui_messages(messages)
    } else {
        messages
    };

    tracing::debug!(stored = count, rendered = messages.len(), "assembled chat history");
    Json(AssembleResponse { messages })
}

async fn sanitize_handler(Json(request): Json<SanitizeRequest>) -> Json<SanitizeResponse> {
    let received = request.messages.len();
    let messages = sanitize(request.messages, request.reasoning.as_deref());

    let rows = messages
        .iter()
        .flat_map(|message| to_rows(&message.id, &message.content.clone().into_fragments()))
        .collect();

    tracing::debug!(received, kept = messages.len(), "sanitized response messages");
    Json(SanitizeResponse { messages, rows })
}

pub fn routes() -> Router {
    Router::new()
        .route("/messages/normalize", post(normalize_handler))
        .route("/messages/assemble", post(assemble_handler))
        .route("/messages/sanitize", post(sanitize_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = routes()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_normalize_route() {
        let (status, body) = post_json(
            "/messages/normalize",
            json!({"content": "[{\"type\":\"tool-call\",\"toolCallId\":\"a\",\"toolName\":\"calc\",\"args\":{}}]"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"fragments": [{
                "type": "tool_call",
                "content": {"toolCallId": "a", "toolName": "calc", "args": {}},
                "order": 0
            }]})
        );
    }

    #[tokio::test]
    async fn test_assemble_route_pairs_tool_results() {
        let (status, body) = post_json(
            "/messages/assemble",
            json!({
                "messages": [
                    {"id": "u1", "chatId": "c1", "role": "user", "content": "hi", "createdAt": "2024-05-01T12:00:00Z"},
                    {"id": "a1", "chatId": "c1", "role": "assistant", "content": "{}", "createdAt": "2024-05-01T12:00:01Z"},
                    {"id": "t1", "chatId": "c1", "role": "tool", "content": "{}", "createdAt": "2024-05-01T12:00:02Z"}
                ],
                "contents": [
                    {"messageId": "a1", "type": "tool_call", "content": {"toolCallId": "a", "toolName": "calc", "args": {"q": "6*7"}}, "order": 0},
                    {"messageId": "t1", "type": "tool_result", "content": {"toolCallId": "a", "toolName": "calc", "result": "42"}, "order": 0}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["content"], "hi");
        assert_eq!(messages[1]["toolInvocations"][0]["state"], "result");
        assert_eq!(messages[1]["toolInvocations"][0]["result"], "42");
    }

    #[tokio::test]
    async fn test_assemble_route_accepts_legacy_row_types() {
        let (status, body) = post_json(
            "/messages/assemble",
            json!({
                "messages": [
                    {"id": "a1", "chatId": "c1", "role": "assistant", "content": "{}",
                     "createdAt": "2024-05-01T12:00:01Z"}
                ],
                "contents": [
                    {"messageId": "a1", "type": "image", "content": "see attached", "order": 0},
                    {"messageId": "a1", "type": "tool-call",
                     "content": {"toolCallId": "a", "toolName": "calc", "args": {}}, "order": 1}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"][0]["content"], "see attached");
        assert_eq!(body["messages"][0]["toolInvocations"][0]["toolCallId"], "a");
    }

    #[tokio::test]
    async fn test_assemble_route_can_sanitize() {
        let (_, body) = post_json(
            "/messages/assemble",
            json!({
                "sanitize": true,
                "messages": [
                    {"id": "a1", "chatId": "c1", "role": "assistant", "createdAt": "2024-05-01T12:00:01Z",
                     "content": [{"type": "tool-call", "toolCallId": "a", "toolName": "calc", "args": {}}]}
                ]
            }),
        )
        .await;

        assert_eq!(body, json!({"messages": []}));
    }

    #[tokio::test]
    async fn test_sanitize_route_returns_rows() {
        let (status, body) = post_json(
            "/messages/sanitize",
            json!({
                "reasoning": "short answer",
                "messages": [
                    {"id": "r1", "role": "assistant", "content": [
                        {"type": "text", "text": "Done."},
                        {"type": "tool-call", "toolCallId": "x", "toolName": "calc", "args": {}}
                    ]}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["rows"],
            json!([
                {"messageId": "r1", "type": "text", "content": "Done.", "order": 0},
                {"messageId": "r1", "type": "reasoning", "content": "short answer", "order": 1}
            ])
        );
    }

    #[tokio::test]
    async fn test_malformed_request_is_rejected() {
        let (status, _) = post_json("/messages/sanitize", json!({"messages": "nope"})).await;
        assert!(status.is_client_error());
    }
}
