use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// The content API under `/api`. Reads accept the `ListFilter` query parameters; the
/// public pages pass `isActive=true` themselves.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // --- Blogs ---
        .route(
            "/api/blogs",
            get(handlers::list_blogs).post(handlers::create_blog),
        )
        .route("/api/blogs/slug/{slug}", get(handlers::get_blog_by_slug))
        .route(
            "/api/blogs/{id}",
            get(handlers::get_blog)
                .put(handlers::update_blog)
                .patch(handlers::patch_blog)
                .delete(handlers::delete_blog),
        )
        // --- Case Studies ---
        .route(
            "/api/case-studies",
            get(handlers::list_case_studies).post(handlers::create_case_study),
        )
        // Served as the nested view model for the case study page.
        .route(
            "/api/case-studies/slug/{slug}",
            get(handlers::get_case_study_by_slug),
        )
        .route(
            "/api/case-studies/{id}",
            get(handlers::get_case_study)
                .put(handlers::update_case_study)
                .patch(handlers::patch_case_study)
                .delete(handlers::delete_case_study),
        )
        // POST /api/contact
        // Verifies the reCAPTCHA token before the submission is accepted.
        .route("/api/contact", post(handlers::submit_contact))
}
