use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use agency_site::{
    AppConfig, AppState, InMemoryRepository, MockCaptchaVerifier,
    captcha::{CaptchaError, CaptchaVerifier},
    error::{ApiError, StoreError},
    handlers,
    models::{
        ActiveStatusUpdate, Blog, BlogInput, CaseStudy, CaseStudyFields, ContactRequest,
        ContentCounts, ListFilter, LoginRequest,
    },
    repository::Repository,
    view_model::{CaseStudyForm, ChallengeSection, ClientOverview},
};
use std::sync::{Arc, Mutex};
use tokio::test;
use uuid::Uuid;

// --- MOCK REPOSITORY IMPLEMENTATION ---

// Every call fails the way a dropped database connection would, so the handlers'
// error mapping can be checked without a database.
#[derive(Default)]
struct BrokenRepo;

fn broken() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl Repository for BrokenRepo {
    async fn list_blogs(&self, _filter: ListFilter) -> Result<Vec<Blog>, StoreError> {
        Err(broken())
    }
    async fn get_blog(&self, _id: Uuid) -> Result<Blog, StoreError> {
        Err(broken())
    }
    async fn get_blog_by_slug(&self, _slug: &str) -> Result<Blog, StoreError> {
        Err(broken())
    }
    async fn create_blog(&self, _input: BlogInput) -> Result<Blog, StoreError> {
        Err(broken())
    }
    async fn update_blog(&self, _id: Uuid, _input: BlogInput) -> Result<Blog, StoreError> {
        Err(broken())
    }
    async fn set_blog_active(&self, _id: Uuid, _is_active: bool) -> Result<Blog, StoreError> {
        Err(broken())
    }
    async fn delete_blog(&self, _id: Uuid) -> Result<(), StoreError> {
        Err(broken())
    }
    async fn list_case_studies(&self, _filter: ListFilter) -> Result<Vec<CaseStudy>, StoreError> {
        Err(broken())
    }
    async fn get_case_study(&self, _id: Uuid) -> Result<CaseStudy, StoreError> {
        Err(broken())
    }
    async fn get_case_study_by_slug(&self, _slug: &str) -> Result<CaseStudy, StoreError> {
        Err(broken())
    }
    async fn create_case_study(&self, _fields: CaseStudyFields) -> Result<CaseStudy, StoreError> {
        Err(broken())
    }
    async fn update_case_study(
        &self,
        _id: Uuid,
        _fields: CaseStudyFields,
    ) -> Result<CaseStudy, StoreError> {
        Err(broken())
    }
    async fn set_case_study_active(
        &self,
        _id: Uuid,
        _is_active: bool,
    ) -> Result<CaseStudy, StoreError> {
        Err(broken())
    }
    async fn delete_case_study(&self, _id: Uuid) -> Result<(), StoreError> {
        Err(broken())
    }
    async fn content_counts(&self) -> Result<ContentCounts, StoreError> {
        Err(broken())
    }
}

// --- MOCK VERIFIER ---

// Remembers the client IP it was handed.
#[derive(Default)]
struct RecordingVerifier {
    seen_ip: Mutex<Option<String>>,
}

#[async_trait]
impl CaptchaVerifier for RecordingVerifier {
    async fn verify(&self, _token: &str, remote_ip: Option<&str>) -> Result<bool, CaptchaError> {
        *self.seen_ip.lock().unwrap() = remote_ip.map(str::to_string);
        Ok(true)
    }
}

// --- HELPERS ---

fn create_test_state<R: Repository + 'static>(repo: R) -> AppState {
    AppState {
        repo: Arc::new(repo),
        captcha: Arc::new(MockCaptchaVerifier::accepting()),
        config: AppConfig::default(),
    }
}

fn contact() -> ContactRequest {
    ContactRequest {
        name: Some("Ada".to_string()),
        email: Some("ada@example.com".to_string()),
        subject: Some("Hello".to_string()),
        message: Some("Quote please".to_string()),
        recaptcha_token: Some("token".to_string()),
        ..ContactRequest::default()
    }
}

// --- STORE FAILURES ---

#[test]
async fn test_list_blogs_store_failure_is_500() {
    let state = create_test_state(BrokenRepo);
    let err = handlers::list_blogs(State(state), Query(ListFilter::default()))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Internal("Failed to fetch blogs"));
}

#[test]
async fn test_delete_case_study_store_failure_is_500() {
    let state = create_test_state(BrokenRepo);
    let err = handlers::delete_case_study(State(state), Path(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.message(), "Failed to delete case study");
}

#[test]
async fn test_dashboard_store_failure_body() {
    let state = create_test_state(BrokenRepo);
    let response = handlers::admin_dashboard(State(state))
        .await
        .into_response();

    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(parts.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to load dashboard");
}

// --- HAPPY PATHS AGAINST THE IN-MEMORY STORE ---

#[test]
async fn test_patch_missing_blog_is_not_found() {
    let state = create_test_state(InMemoryRepository::new());
    let err = handlers::patch_blog(
        State(state),
        Path(Uuid::new_v4()),
        Json(ActiveStatusUpdate { is_active: false }),
    )
    .await
    .unwrap_err();
    assert_eq!(err, ApiError::NotFound("Not found"));
}

#[test]
async fn test_admin_list_includes_inactive() {
    let state = create_test_state(InMemoryRepository::new());
    for (slug, active) in [("on", true), ("off", false)] {
        handlers::create_blog(
            State(state.clone()),
            Json(BlogInput {
                title: slug.to_string(),
                slug: slug.to_string(),
                content: "x".to_string(),
                is_active: Some(active),
                ..BlogInput::default()
            }),
        )
        .await
        .unwrap();
    }

    let Json(all) = handlers::admin_list_blogs(State(state.clone())).await.unwrap();
    assert_eq!(all.len(), 2);

    let Json(public) = handlers::list_blogs(State(state), Query(ListFilter::active()))
        .await
        .unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].slug, "on");
}

#[test]
async fn test_case_study_form_prefill_matches_stored_row() {
    let state = create_test_state(InMemoryRepository::new());
    let form = CaseStudyForm {
        slug: "prefill".to_string(),
        title: "Prefill".to_string(),
        client_overview: ClientOverview {
            client: "Globex".to_string(),
            industry: "Energy".to_string(),
            overview: "Grid analytics".to_string(),
        },
        challenge: ChallengeSection {
            title: Some("Data silos".to_string()),
            ..ChallengeSection::default()
        },
        is_active: Some(false),
        ..CaseStudyForm::default()
    };

    let Json(row) = handlers::create_case_study(State(state.clone()), Json(form.clone()))
        .await
        .unwrap();
    assert!(!row.is_active);

    let Json(prefill) = handlers::admin_case_study_form(State(state), Path(row.id))
        .await
        .unwrap();
    assert_eq!(prefill, form);
}

#[test]
async fn test_update_case_study_keeps_visibility_when_omitted() {
    let state = create_test_state(InMemoryRepository::new());
    let form = CaseStudyForm {
        slug: "keep".to_string(),
        title: "Keep".to_string(),
        is_active: Some(false),
        ..CaseStudyForm::default()
    };
    let Json(row) = handlers::create_case_study(State(state.clone()), Json(form))
        .await
        .unwrap();

    let replacement = CaseStudyForm {
        slug: "keep".to_string(),
        title: "Renamed".to_string(),
        ..CaseStudyForm::default()
    };
    let Json(updated) =
        handlers::update_case_study(State(state), Path(row.id), Json(replacement))
            .await
            .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert!(!updated.is_active);
    assert_eq!(updated.created_at, row.created_at);
}

// --- CONTACT ---

#[test]
async fn test_contact_passes_forwarded_ip_to_verifier() {
    let verifier = Arc::new(RecordingVerifier::default());
    let state = AppState {
        captcha: verifier.clone(),
        ..create_test_state(InMemoryRepository::new())
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
    );

    let Json(reply) = handlers::submit_contact(State(state), headers, Json(contact()))
        .await
        .unwrap();

    assert!(reply.success);
    assert_eq!(
        verifier.seen_ip.lock().unwrap().as_deref(),
        Some("203.0.113.7")
    );
}

#[test]
async fn test_contact_whitespace_fields_count_as_missing() {
    let captcha = MockCaptchaVerifier::accepting();
    let state = AppState {
        captcha: Arc::new(captcha.clone()),
        ..create_test_state(InMemoryRepository::new())
    };
    let payload = ContactRequest {
        subject: Some("   ".to_string()),
        ..contact()
    };

    let err = handlers::submit_contact(State(state), HeaderMap::new(), Json(payload))
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::BadRequest("Missing required fields"));
    assert_eq!(captcha.calls(), 0);
}

// --- LOGIN ---

#[test]
async fn test_login_cookie_is_secure_in_production() {
    let config = AppConfig {
        env: agency_site::config::Env::Production,
        admin_username: Some("editor".to_string()),
        admin_password: Some("pw".to_string()),
        ..AppConfig::default()
    };
    let state = AppState {
        config,
        ..create_test_state(InMemoryRepository::new())
    };

    let response = handlers::admin_login(
        State(state),
        Json(LoginRequest {
            username: "editor".to_string(),
            password: "pw".to_string(),
        }),
    )
    .await
    .unwrap();

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=Lax"));
}
