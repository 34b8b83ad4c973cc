pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers::{self, MAX_UPLOAD_BYTES};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze", post(handlers::handle_analyze))
        .route(
            "/analyze/upload",
            post(handlers::handle_analyze_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::ModelError;
    use crate::pipeline::orchestrator::Orchestrator;
    use crate::pipeline::testing::{
        roadmap_reply, ScriptedModel, CAREER_REPLY, INTERVIEW_REPLY, RESUME_REPLY,
        SAMPLE_RESUME, SKILL_GAP_REPLY,
    };

    fn app(model: &Arc<ScriptedModel>) -> Router {
        build_router(AppState::new(Orchestrator::new(model.clone())))
    }

    fn full_script() -> Arc<ScriptedModel> {
        let roadmap = roadmap_reply(6);
        Arc::new(ScriptedModel::replying(&[
            RESUME_REPLY,
            SKILL_GAP_REPLY,
            CAREER_REPLY,
            roadmap.as_str(),
            INTERVIEW_REPLY,
        ]))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Request<Body> {
        const BOUNDARY: &str = "mentor-test-boundary";
        let mut body = String::new();
        for (name, file, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file {
                Some((file_name, content_type)) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/analyze/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let model = Arc::new(ScriptedModel::replying(&[]));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "scripted");
        assert_eq!(body["service"], "mentor-api");
    }

    #[tokio::test]
    async fn test_analyze_returns_summary_and_data() {
        let model = full_script();
        let req = post_json(
            "/analyze",
            json!({"resume_text": SAMPLE_RESUME, "target_role": "Senior Software Engineer"}),
        );
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["summary"]["recommended_role"], "Backend Engineer");
        assert_eq!(body["summary"]["total_skill_gaps"], 3);
        assert_eq!(body["summary"]["roadmap_duration"], 6);
        assert_eq!(
            body["data"]["learning_roadmap"]["monthly_goals"]
                .as_array()
                .unwrap()
                .len(),
            6
        );
        for key in [
            "resume_analysis",
            "skill_gap_analysis",
            "career_recommendations",
            "learning_roadmap",
            "interview_preparation",
        ] {
            assert!(body["data"][key].is_object(), "missing {key}");
        }
        assert!(body["analysis_id"].is_string());
        assert_eq!(model.calls(), 5);
    }

    #[tokio::test]
    async fn test_short_resume_is_422_without_model_calls() {
        let model = full_script();
        let req = post_json("/analyze", json!({"resume_text": "Too short."}));
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["detail"].as_str().unwrap().contains("at least 50"));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_months_out_of_range_is_422() {
        let model = full_script();
        let req = post_json(
            "/analyze",
            json!({"resume_text": SAMPLE_RESUME, "roadmap_months": 12}),
        );
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_422() {
        let model = full_script();
        let req = post_json("/analyze", json!({"target_role": "SRE"}));
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_model_failure_is_502_with_stage() {
        let model = Arc::new(ScriptedModel::new(vec![Err(ModelError::Timeout)]));
        let req = post_json("/analyze", json!({"resume_text": SAMPLE_RESUME}));
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MODEL_ERROR");
        assert_eq!(body["error"]["stage"], "resume_analysis");
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_unusable_reply_is_500_parse_error() {
        let model = Arc::new(ScriptedModel::replying(&["I cannot help with that."]));
        let req = post_json("/analyze", json!({"resume_text": SAMPLE_RESUME}));
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "PARSE_ERROR");
        assert_eq!(body["error"]["stage"], "resume_analysis");
    }

    #[tokio::test]
    async fn test_upload_plain_text_resume() {
        let roadmap = roadmap_reply(3);
        let model = Arc::new(ScriptedModel::replying(&[
            RESUME_REPLY,
            SKILL_GAP_REPLY,
            CAREER_REPLY,
            roadmap.as_str(),
            INTERVIEW_REPLY,
        ]));
        let req = multipart_request(&[
            ("file", Some(("resume.txt", "text/plain")), SAMPLE_RESUME),
            ("target_role", None, "Staff Engineer"),
            ("roadmap_months", None, "3"),
        ]);
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"]["roadmap_duration"], 3);
        assert_eq!(body["data"]["skill_gap_analysis"]["target_role"], "Staff Engineer");
        assert!(model.prompts()[0].contains("payments API"));
    }

    #[tokio::test]
    async fn test_upload_without_file_is_400() {
        let model = full_script();
        let req = multipart_request(&[("target_role", None, "SRE")]);
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_unsupported_type_is_400() {
        let model = full_script();
        let req = multipart_request(&[("file", Some(("photo.png", "image/png")), "not an image")]);
        let response = app(&model).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(model.calls(), 0);
    }
}
