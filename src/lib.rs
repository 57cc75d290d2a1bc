use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod captcha;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod view_model;

// Public API and admin route groups.
pub mod routes;
use routes::{admin, public};

// --- Public Re-exports ---

pub use captcha::{CaptchaState, MockCaptchaVerifier, RecaptchaClient};
pub use config::AppConfig;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every handler and schema, served at `/api-docs/openapi.json`
/// with Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_blogs, handlers::get_blog, handlers::get_blog_by_slug,
        handlers::create_blog, handlers::update_blog, handlers::patch_blog, handlers::delete_blog,
        handlers::list_case_studies, handlers::get_case_study, handlers::get_case_study_by_slug,
        handlers::create_case_study, handlers::update_case_study, handlers::patch_case_study,
        handlers::delete_case_study, handlers::submit_contact,
        handlers::admin_session_status, handlers::admin_login, handlers::admin_logout, handlers::admin_dashboard,
        handlers::admin_list_blogs, handlers::admin_list_case_studies,
        handlers::admin_case_study_form
    ),
    components(
        schemas(
            models::Blog, models::RelatedArticle, models::BlogInput, models::CaseStudy,
            models::CaseStudyStat, models::ActiveStatusUpdate, models::ContactRequest,
            models::ContactResponse, models::LoginRequest, models::SuccessResponse,
            models::ContentCounts, models::SessionStatus, error::ErrorBody,
            view_model::CaseStudyView, view_model::CaseStudyForm, view_model::ClientOverview,
            view_model::ChallengeSection, view_model::SolutionSection, view_model::ImpactSection,
            view_model::Testimonial, view_model::Quote, view_model::Styling, view_model::MetaFields,
        )
    ),
    tags(
        (name = "agency-site", description = "Marketing site content API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single immutable container of shared services, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Content store (Postgres in production).
    pub repo: RepositoryState,
    /// reCAPTCHA verification for the contact form.
    pub captcha: CaptchaState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for CaptchaState {
    fn from_ref(app_state: &AppState) -> CaptchaState {
        app_state.captcha.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, the admin gate and the observability layers around the shared
/// state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header used to correlate every log line of one request.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Routes and the admin gate
    let base_router = Router::new()
        // Documentation: Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Content API and health check. No session required.
        .merge(public::public_routes())
        // Admin routes, nested under '/admin'.
        .nest("/admin", admin::admin_routes())
        // Layered on the outer router so the gate sees unstripped `/admin/...` paths.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_gate,
        ))
        .with_state(state);

    // 3. Observability. Outermost first: assign the id, trace with it, echo it back.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, tagged with the `x-request-id` set by `SetRequestIdLayer`
/// so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
