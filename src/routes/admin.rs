use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Nested under `/admin`. Every route except `/login` is only reachable with a session
/// cookie; `auth::admin_gate` redirects everyone else to `/admin/login`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/login is where the gate redirects; it reports the session state.
        // POST /admin/login exchanges the configured credentials for the session cookie.
        .route(
            "/login",
            get(handlers::admin_session_status).post(handlers::admin_login),
        )
        .route("/logout", post(handlers::admin_logout))
        // GET /admin/dashboard
        // Total and active counts for blogs and case studies.
        .route("/dashboard", get(handlers::admin_dashboard))
        .route("/blogs", get(handlers::admin_list_blogs))
        .route("/case-studies", get(handlers::admin_list_case_studies))
        // GET /admin/case-studies/{id}
        // Prefills the editor in the nested form shape.
        .route("/case-studies/{id}", get(handlers::admin_case_study_form))
}
