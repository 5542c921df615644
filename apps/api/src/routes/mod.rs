pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // ATS analysis
        .route("/api/v1/resume/analyze", post(handlers::handle_analyze_resume))
        .route(
            "/api/v1/resume/analysis/:id",
            get(handlers::handle_get_analysis),
        )
        .route(
            "/api/v1/resume/analysis/:id/report",
            get(handlers::handle_get_report),
        )
        // Job fit
        .route(
            "/api/v1/analysis/job-fit",
            post(handlers::handle_analyze_job_fit),
        )
        .route(
            "/api/v1/analysis/job-fit/:id",
            get(handlers::handle_get_job_fit),
        )
        // Job recommendations
        .route("/api/v1/jobs/match", post(handlers::handle_match_jobs))
        .route("/api/v1/jobs/match/:id", get(handlers::handle_get_job_matches))
        // Skill quiz
        .route("/api/v1/quiz/generate", post(handlers::handle_generate_quiz))
        .route("/api/v1/quiz/:id", get(handlers::handle_get_quiz))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::generation::orchestrator::GenerationOrchestrator;
    use crate::llm_client::fake::ScriptedProvider;
    use crate::llm_client::DEFAULT_MODEL;
    use crate::store::MemoryArtifactStore;

    const RESUME: &str = "Priya Nair. Data engineer, 4 years. Spark, Airflow, Python, SQL.";

    fn app(provider: &Arc<ScriptedProvider>) -> Router {
        let orchestrator = GenerationOrchestrator::new(
            provider.clone(),
            Arc::new(MemoryArtifactStore::new()),
            DEFAULT_MODEL,
            Duration::from_secs(30),
        );
        let config = Config {
            database_url: None,
            db_max_connections: 10,
            gemini_api_key: "test-key".to_string(),
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_api_base: "http://localhost".to_string(),
            llm_timeout: Duration::from_secs(30),
            port: 8080,
            rust_log: "info".to_string(),
        };
        build_router(AppState {
            orchestrator: Arc::new(orchestrator),
            config,
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn ats_response() -> String {
        json!({
            "candidate_name": "Priya Nair",
            "job_title": "Data Engineer",
            "contact_info": {"email": null, "location": "Kochi"},
            "professional_summary": "Data engineer focused on batch pipelines.",
            "ats_compatibility_score": 68,
            "strengths": ["Spark", "Airflow", "SQL"],
            "weaknesses": ["No cloud certs", "Sparse metrics", "Long summary"],
            "improvement_suggestions": ["Add a projects section"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let provider = Arc::new(ScriptedProvider::always("{}"));
        let (status, body) = send(&app(&provider), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn test_analyze_then_get_is_idempotent() {
        let provider = Arc::new(ScriptedProvider::always(ats_response()));
        let app = app(&provider);
        let request = json!({"id": "res-42", "extracted_text": RESUME, "filename": "priya.pdf"});

        let (status, first) =
            send(&app, Method::POST, "/api/v1/resume/analyze", Some(request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["kind"], "ats_analysis");
        assert_eq!(first["result"]["status"], "ok");
        assert_eq!(first["result"]["data"]["ats_compatibility_score"], 68);

        let (_, second) = send(&app, Method::POST, "/api/v1/resume/analyze", Some(request)).await;
        let (status, fetched) =
            send(&app, Method::GET, "/api/v1/resume/analysis/res-42", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(first, fetched);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected() {
        let provider = Arc::new(ScriptedProvider::always(ats_response()));
        let (status, body) = send(
            &app(&provider),
            Method::POST,
            "/api/v1/resume/analyze",
            Some(json!({"id": "  ", "extracted_text": RESUME})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app(&provider),
            Method::POST,
            "/api/v1/resume/analyze",
            Some(json!({"id": "r\u{0}1", "extracted_text": RESUME})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_id_is_404() {
        let provider = Arc::new(ScriptedProvider::always("{}"));
        let app = app(&provider);
        for uri in [
            "/api/v1/resume/analysis/nope",
            "/api/v1/resume/analysis/nope/report",
            "/api/v1/analysis/job-fit/nope",
            "/api/v1/jobs/match/nope",
            "/api/v1/quiz/nope",
        ] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn test_report_of_degraded_analysis_is_422() {
        let provider = Arc::new(ScriptedProvider::always("I can't read this resume."));
        let app = app(&provider);
        let (status, record) = send(
            &app,
            Method::POST,
            "/api/v1/resume/analyze",
            Some(json!({"id": "r1", "extracted_text": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["result"]["status"], "degraded");
        assert_eq!(
            record["result"]["data"]["raw_text"],
            "I can't read this resume."
        );

        let (status, _) = send(&app, Method::GET, "/api/v1/resume/analysis/r1/report", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_report_exposes_render_fields() {
        let provider = Arc::new(ScriptedProvider::always(ats_response()));
        let app = app(&provider);
        send(
            &app,
            Method::POST,
            "/api/v1/resume/analyze",
            Some(json!({"id": "r1", "extracted_text": RESUME})),
        )
        .await;

        let (status, report) =
            send(&app, Method::GET, "/api/v1/resume/analysis/r1/report", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["ats_compatibility_score"], 68);
        assert_eq!(report["weaknesses"].as_array().unwrap().len(), 3);
        assert!(report.get("candidate_name").is_none());
    }

    #[tokio::test]
    async fn test_job_fit_requires_job_description() {
        let provider = Arc::new(ScriptedProvider::always(
            json!({"job_fit_score": 81, "strengths": ["Spark"]}).to_string(),
        ));
        let app = app(&provider);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/analysis/job-fit",
            Some(json!({"id": "r1", "extracted_text": RESUME, "job_description": " "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, record) = send(
            &app,
            Method::POST,
            "/api/v1/analysis/job-fit",
            Some(json!({
                "id": "r1",
                "extracted_text": RESUME,
                "job_description_text": "Senior data engineer, Databricks"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["result"]["data"]["job_fit_score"], 81);
        assert!(provider
            .last_prompt()
            .unwrap()
            .contains("Senior data engineer, Databricks"));

        let (status, fetched) = send(&app, Method::GET, "/api/v1/analysis/job-fit/r1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["resume_text"], RESUME);
        assert_eq!(fetched["job_description"], "Senior data engineer, Databricks");
    }

    #[tokio::test]
    async fn test_job_matches_regenerate_on_each_post() {
        let provider = Arc::new(ScriptedProvider::always(
            json!([{"company": "Initech", "job_title": "Data Engineer", "match_score": 88}])
                .to_string(),
        ));
        let app = app(&provider);
        let request = json!({"id": "r1", "extracted_text": RESUME});

        send(&app, Method::POST, "/api/v1/jobs/match", Some(request.clone())).await;
        let (status, record) = send(&app, Method::POST, "/api/v1/jobs/match", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(provider.calls(), 2);
        assert_eq!(record["result"]["data"]["jobs"][0]["company"], "Initech");

        let (status, fetched) = send(&app, Method::GET, "/api/v1/jobs/match/r1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn test_quiz_generate_then_get() {
        let provider = Arc::new(ScriptedProvider::always(
            json!([{
                "question": "Which Airflow object defines a workflow?",
                "options": ["DAG", "Operator", "Sensor", "Hook"],
                "answer": "DAG"
            }])
            .to_string(),
        ));
        let app = app(&provider);

        let (status, record) = send(
            &app,
            Method::POST,
            "/api/v1/quiz/generate",
            Some(json!({"id": "q1", "extracted_text": RESUME})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["result"]["data"]["mcqs"][0]["answer"], "DAG");

        let (status, fetched) = send(&app, Method::GET, "/api/v1/quiz/q1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, record);
    }
}
