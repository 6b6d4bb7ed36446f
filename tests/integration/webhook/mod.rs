//! Webhook ingress integration tests

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{close_conversation, new_conversation, new_message, TestApp};

const T0: &str = "2024-01-01T00:00:00Z";
const T1: &str = "2024-01-01T00:01:00Z";
const T2: &str = "2024-01-01T00:02:00Z";

mod test_new_conversation {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_new_conversation_returns_201_with_id() {
        let app = TestApp::in_memory();
        let id = Uuid::new_v4();

        let (status, body) = app.post_webhook(new_conversation(id, T0)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Conversation created");
        assert_eq!(body["id"], id.to_string());
    }

    #[tokio::test]
    async fn test_duplicate_conversation_returns_409() {
        let app = TestApp::in_memory();
        let id = Uuid::new_v4();
        app.open_conversation(id, T0).await;

        let (status, body) = app.post_webhook(new_conversation(id, T1)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");

        let (_, list) = app.get("/conversations").await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_uuid_conversation_id_returns_400() {
        let app = TestApp::in_memory();

        let (status, body) = app
            .post_webhook(json!({
                "type": "NEW_CONVERSATION",
                "timestamp": T0,
                "data": { "id": "c1" }
            }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }
}

mod test_new_message {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_message_on_open_conversation_returns_201() {
        let app = TestApp::in_memory();
        let conversation_id = Uuid::new_v4();
        let message_id = Uuid::new_v4();
        app.open_conversation(conversation_id, T0).await;

        let (status, body) = app
            .post_webhook(new_message(
                message_id,
                conversation_id,
                "RECEIVED",
                "Hello",
                T1,
            ))
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Message created");
        assert_eq!(body["id"], message_id.to_string());
    }

    #[tokio::test]
    async fn test_message_on_unknown_conversation_returns_404() {
        let app = TestApp::in_memory();

        let (status, body) = app
            .post_webhook(new_message(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "SENT",
                "Hello",
                T1,
            ))
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn test_message_on_closed_conversation_is_rejected() {
        let app = TestApp::in_memory();
        let conversation_id = Uuid::new_v4();
        app.open_conversation(conversation_id, T0).await;
        app.post_webhook(close_conversation(conversation_id, T1))
            .await;

        let (status, body) = app
            .post_webhook(new_message(
                Uuid::new_v4(),
                conversation_id,
                "SENT",
                "too late",
                T2,
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "closed_conversation");

        let (_, detail) = app.get(&format!("/conversations/{}", conversation_id)).await;
        assert!(detail["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_message_id_returns_409() {
        let app = TestApp::in_memory();
        let conversation_id = Uuid::new_v4();
        let message_id = Uuid::new_v4();
        app.open_conversation(conversation_id, T0).await;
        app.post_webhook(new_message(message_id, conversation_id, "SENT", "a", T1))
            .await;

        let (status, body) = app
            .post_webhook(new_message(message_id, conversation_id, "SENT", "b", T2))
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");
    }

    #[tokio::test]
    async fn test_invalid_direction_returns_400() {
        let app = TestApp::in_memory();
        let conversation_id = Uuid::new_v4();
        app.open_conversation(conversation_id, T0).await;

        let (status, body) = app
            .post_webhook(new_message(
                Uuid::new_v4(),
                conversation_id,
                "sideways",
                "Hello",
                T1,
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }

    #[tokio::test]
    async fn test_missing_content_returns_400() {
        let app = TestApp::in_memory();
        let conversation_id = Uuid::new_v4();
        app.open_conversation(conversation_id, T0).await;

        let (status, body) = app
            .post_webhook(json!({
                "type": "NEW_MESSAGE",
                "timestamp": T1,
                "data": {
                    "id": Uuid::new_v4(),
                    "conversation_id": conversation_id,
                    "direction": "SENT"
                }
            }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }
}

mod test_close_conversation {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_close_open_conversation_returns_200() {
        let app = TestApp::in_memory();
        let id = Uuid::new_v4();
        app.open_conversation(id, T0).await;

        let (status, body) = app.post_webhook(close_conversation(id, T1)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Conversation closed");
        assert_eq!(body["id"], id.to_string());

        let (_, detail) = app.get(&format!("/conversations/{}", id)).await;
        assert_eq!(detail["status"], "CLOSED");
    }

    #[tokio::test]
    async fn test_close_twice_is_a_no_op() {
        let app = TestApp::in_memory();
        let id = Uuid::new_v4();
        app.open_conversation(id, T0).await;
        app.post_webhook(close_conversation(id, T1)).await;

        let (status, body) = app.post_webhook(close_conversation(id, T2)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Conversation already closed");

        let (_, detail) = app.get(&format!("/conversations/{}", id)).await;
        assert_eq!(detail["status"], "CLOSED");
    }

    #[tokio::test]
    async fn test_close_unknown_conversation_returns_404() {
        let app = TestApp::in_memory();

        let (status, body) = app
            .post_webhook(close_conversation(Uuid::new_v4(), T0))
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }
}

mod test_envelope {
    use super::*;

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let app = TestApp::in_memory();

        let (status, body) = app
            .post_raw("/webhook", r#"{"type": "NEW_CONVERSATION","#.to_string())
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }

    #[tokio::test]
    async fn test_unknown_event_type_returns_400() {
        let app = TestApp::in_memory();

        let (status, body) = app
            .post_webhook(json!({
                "type": "DELETE_EVERYTHING",
                "timestamp": T0,
                "data": { "id": Uuid::new_v4() }
            }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }

    #[tokio::test]
    async fn test_missing_timestamp_returns_400() {
        let app = TestApp::in_memory();

        let (status, body) = app
            .post_webhook(json!({
                "type": "NEW_CONVERSATION",
                "data": { "id": Uuid::new_v4() }
            }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }

    #[tokio::test]
    async fn test_unparseable_timestamp_returns_400() {
        let app = TestApp::in_memory();

        let (status, body) = app
            .post_webhook(new_conversation(Uuid::new_v4(), "yesterday at noon"))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }

    #[tokio::test]
    async fn test_non_object_data_returns_400() {
        let app = TestApp::in_memory();

        let (status, body) = app
            .post_webhook(json!({
                "type": "NEW_CONVERSATION",
                "timestamp": T0,
                "data": [1, 2, 3]
            }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }

    #[tokio::test]
    async fn test_empty_type_rejected_before_dispatch() {
        let app = TestApp::in_memory();

        let (status, body) = app
            .post_webhook(json!({
                "type": "",
                "timestamp": T0,
                "data": { "id": Uuid::new_v4() }
            }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_payload");
    }

    #[tokio::test]
    async fn test_compact_offsets_accepted() {
        let app = TestApp::in_memory();
        let compact = Uuid::new_v4();
        let hours_only = Uuid::new_v4();

        let (status, _) = app
            .post_webhook(new_conversation(compact, "2024-01-01T00:00:00+0000"))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = app
            .post_webhook(new_conversation(hours_only, "2024-01-01T01:00:00+01"))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, detail) = app.get(&format!("/conversations/{}/", hours_only)).await;
        assert_eq!(detail["initiated_at"], "2024-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_trailing_slash_webhook_path() {
        let app = TestApp::in_memory();

        let (status, _) = app
            .post_raw(
                "/webhook/",
                new_conversation(Uuid::new_v4(), T0).to_string(),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_rejected_event_leaves_no_trace() {
        let app = TestApp::in_memory();

        app.post_webhook(new_conversation(Uuid::new_v4(), "not a time"))
            .await;

        let (status, list) = app.get("/conversations").await;
        assert_eq!(status, StatusCode::OK);
        assert!(list.as_array().unwrap().is_empty());
    }
}
