pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::readiness_handler))
        // Interview API
        .route("/api/interview/start", post(handlers::handle_start))
        .route("/api/interview/answer", post(handlers::handle_answer))
        .route(
            "/api/interview/next/:session_id",
            post(handlers::handle_next_question),
        )
        .route(
            "/api/interview/current/:session_id",
            get(handlers::handle_current_question),
        )
        .route(
            "/api/interview/summary/:session_id",
            get(handlers::handle_summary),
        )
        .route(
            "/api/interview/status/:session_id",
            get(handlers::handle_status),
        )
        .route(
            "/api/interview/session/:session_id",
            delete(handlers::handle_delete_session),
        )
        .route("/api/interview/sessions", get(handlers::handle_list_sessions))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::interview::generator::{MockFeedbackGenerator, MockQuestionGenerator};
    use crate::interview::manager::InterviewManager;
    use crate::interview::store::SessionStore;

    fn test_router(max_questions: usize) -> Router {
        let config = Config::for_tests(max_questions);
        let manager = InterviewManager::new(
            Arc::new(SessionStore::new()),
            Arc::new(MockQuestionGenerator),
            Arc::new(MockFeedbackGenerator),
            config.max_questions,
        );
        build_router(AppState {
            manager: Arc::new(manager),
            config,
        })
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn start(router: &Router) -> Value {
        let (status, body) = send(
            router,
            Method::POST,
            "/api/interview/start",
            Some(json!({
                "role": "backend engineer",
                "difficulty": "medium",
                "topics": ["system design"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let router = test_router(10);
        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&router, Method::GET, "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["active_sessions"], 0);
    }

    #[tokio::test]
    async fn test_start_returns_first_question() {
        let router = test_router(10);
        let body = start(&router).await;
        assert_eq!(body["question_id"], 0);
        assert_eq!(
            body["question"],
            "Mock question (medium) for backend engineer on system design. Previous: none"
        );
        assert_eq!(body["progress"]["answered"], 0);
        assert_eq!(body["progress"]["remaining"], 10);
        assert!(body["session_id"].as_str().unwrap().starts_with("session_"));
    }

    #[tokio::test]
    async fn test_start_defaults_difficulty_from_config() {
        let router = test_router(10);
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/interview/start",
            Some(json!({ "role": "sre", "topics": ["linux"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["question"].as_str().unwrap().contains("(medium)"));
    }

    #[tokio::test]
    async fn test_start_with_invalid_difficulty_is_400() {
        let router = test_router(10);
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/interview/start",
            Some(json!({ "role": "sre", "difficulty": "legendary", "topics": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_end_to_end_interview() {
        let max = 3;
        let router = test_router(max);
        let started = start(&router).await;
        let session_id = started["session_id"].as_str().unwrap().to_string();
        let mut question_id = started["question_id"].as_u64().unwrap();

        for i in 0..max {
            let (status, body) = send(
                &router,
                Method::POST,
                "/api/interview/answer",
                Some(json!({
                    "session_id": session_id,
                    "question_id": question_id,
                    "answer": "I would shard by user id and add a cache in front."
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert!(body["feedback"].is_string());
            assert!(body["score"].is_number());

            if i + 1 < max {
                assert_eq!(body["is_complete"], false);
                question_id = body["next_question_id"].as_u64().unwrap();
            } else {
                assert_eq!(body["is_complete"], true);
                assert!(body.get("next_question").is_none());
                assert!(body.get("next_question_id").is_none());
            }
        }

        let (status, status_body) = send(
            &router,
            Method::GET,
            &format!("/api/interview/status/{session_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(status_body["state"], "completed");
        assert_eq!(status_body["is_complete"], true);

        let (status, summary) = send(
            &router,
            Method::GET,
            &format!("/api/interview/summary/{session_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["total_answers"], max);
        assert_eq!(summary["completion_rate"], 100.0);
        assert_eq!(summary["questions_and_answers"].as_array().unwrap().len(), max);
        assert_eq!(summary["strongest_topic"], "system design");
    }

    #[tokio::test]
    async fn test_current_and_next_question() {
        let router = test_router(10);
        let started = start(&router).await;
        let session_id = started["session_id"].as_str().unwrap();

        let (status, current) = send(
            &router,
            Method::GET,
            &format!("/api/interview/current/{session_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(current["question_id"], 0);

        let (status, next) = send(
            &router,
            Method::POST,
            &format!("/api/interview/next/{session_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(next["question_id"], 1);
        assert!(next["question"].as_str().unwrap().contains("Previous: Mock question"));
    }

    #[tokio::test]
    async fn test_unknown_session_routes_are_404() {
        let router = test_router(10);
        for uri in [
            "/api/interview/summary/session_nope",
            "/api/interview/current/session_nope",
            "/api/interview/status/session_nope",
        ] {
            let (status, body) = send(&router, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }

        let (status, _) = send(
            &router,
            Method::POST,
            "/api/interview/answer",
            Some(json!({ "session_id": "session_nope", "question_id": 0, "answer": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_question_is_404() {
        let router = test_router(10);
        let started = start(&router).await;
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/interview/answer",
            Some(json!({
                "session_id": started["session_id"],
                "question_id": 99,
                "answer": "x"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_session_then_404() {
        let router = test_router(10);
        let started = start(&router).await;
        let uri = format!(
            "/api/interview/session/{}",
            started["session_id"].as_str().unwrap()
        );

        let (status, body) = send(&router, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], true);

        let (status, _) = send(&router, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_sessions() {
        let router = test_router(10);
        start(&router).await;
        start(&router).await;
        let (status, body) = send(&router, Method::GET, "/api/interview/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["sessions"].as_array().unwrap().len(), 2);
    }
}
