use crate::{
    AppState,
    auth::{
        credential_matches, issue_session_token, request_is_authenticated,
        session_clear_cookie, session_set_cookie,
    },
    captcha::CaptchaError,
    config::Env,
    error::{ApiError, ErrorBody},
    models::{
        ActiveStatusUpdate, Blog, BlogInput, CaseStudy, ContactRequest, ContactResponse,
        ContentCounts, ListFilter, LoginRequest, SessionStatus, SuccessResponse,
    },
    view_model::{self, CaseStudyForm, CaseStudyView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

// --- Blog Handlers ---

/// list_blogs
///
/// [Public Route] Lists blogs, newest first. With no query parameters every blog is
/// returned; the public site passes `isActive=true`.
#[utoipa::path(
    get,
    path = "/api/blogs",
    params(ListFilter),
    responses(
        (status = 200, description = "Blogs", body = [Blog]),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<Blog>>, ApiError> {
    let blogs = state
        .repo
        .list_blogs(filter)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch blogs"))?;
    Ok(Json(blogs))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Found", body = Blog),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state
        .repo
        .get_blog(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch blog"))?;
    Ok(Json(blog))
}

#[utoipa::path(
    get,
    path = "/api/blogs/slug/{slug}",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 200, description = "Found", body = Blog),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_blog_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state
        .repo
        .get_blog_by_slug(&slug)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch blog"))?;
    Ok(Json(blog))
}

/// create_blog
///
/// Any store failure, a taken slug included, answers 500.
#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body = BlogInput,
    responses(
        (status = 200, description = "Created", body = Blog),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_blog(
    State(state): State<AppState>,
    Json(payload): Json<BlogInput>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state
        .repo
        .create_blog(payload)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to create blog"))?;
    tracing::info!(blog_id = %blog.id, slug = %blog.slug, "blog created");
    Ok(Json(blog))
}

#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body = BlogInput,
    responses(
        (status = 200, description = "Updated", body = Blog),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BlogInput>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state
        .repo
        .update_blog(id, payload)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to update blog"))?;
    Ok(Json(blog))
}

/// patch_blog
///
/// Toggles visibility. No other field is touched.
#[utoipa::path(
    patch,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body = ActiveStatusUpdate,
    responses(
        (status = 200, description = "Updated", body = Blog),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn patch_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActiveStatusUpdate>,
) -> Result<Json<Blog>, ApiError> {
    let blog = state
        .repo
        .set_blog_active(id, payload.is_active)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to update blog"))?;
    Ok(Json(blog))
}

#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .repo
        .delete_blog(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to delete blog"))?;
    tracing::info!(blog_id = %id, "blog deleted");
    Ok(Json(SuccessResponse { success: true }))
}

// --- Case Study Handlers ---

/// list_case_studies
///
/// [Public Route] Lists flat case study rows, newest first.
#[utoipa::path(
    get,
    path = "/api/case-studies",
    params(ListFilter),
    responses((status = 200, description = "Case studies", body = [CaseStudy]))
)]
pub async fn list_case_studies(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<CaseStudy>>, ApiError> {
    let studies = state
        .repo
        .list_case_studies(filter)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch case studies"))?;
    Ok(Json(studies))
}

#[utoipa::path(
    get,
    path = "/api/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study ID")),
    responses(
        (status = 200, description = "Found", body = CaseStudy),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_case_study(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseStudy>, ApiError> {
    let study = state
        .repo
        .get_case_study(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch case study"))?;
    Ok(Json(study))
}

/// get_case_study_by_slug
///
/// [Public Route] Serves the case study page. Answers with the nested view model
/// rather than the flat row.
#[utoipa::path(
    get,
    path = "/api/case-studies/slug/{slug}",
    params(("slug" = String, Path, description = "Case study slug")),
    responses(
        (status = 200, description = "Found", body = CaseStudyView),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_case_study_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CaseStudyView>, ApiError> {
    let study = state
        .repo
        .get_case_study_by_slug(&slug)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch case study"))?;
    Ok(Json(view_model::to_view_model(&study)))
}

/// create_case_study
///
/// Takes the nested editor form and stores it flattened.
#[utoipa::path(
    post,
    path = "/api/case-studies",
    request_body = CaseStudyForm,
    responses(
        (status = 200, description = "Created", body = CaseStudy),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_case_study(
    State(state): State<AppState>,
    Json(form): Json<CaseStudyForm>,
) -> Result<Json<CaseStudy>, ApiError> {
    let study = state
        .repo
        .create_case_study(view_model::flatten(form))
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to create case study"))?;
    tracing::info!(case_study_id = %study.id, slug = %study.slug, "case study created");
    Ok(Json(study))
}

#[utoipa::path(
    put,
    path = "/api/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study ID")),
    request_body = CaseStudyForm,
    responses(
        (status = 200, description = "Updated", body = CaseStudy),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn update_case_study(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<CaseStudyForm>,
) -> Result<Json<CaseStudy>, ApiError> {
    let study = state
        .repo
        .update_case_study(id, view_model::flatten(form))
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to update case study"))?;
    Ok(Json(study))
}

#[utoipa::path(
    patch,
    path = "/api/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study ID")),
    request_body = ActiveStatusUpdate,
    responses(
        (status = 200, description = "Updated", body = CaseStudy),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn patch_case_study(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActiveStatusUpdate>,
) -> Result<Json<CaseStudy>, ApiError> {
    let study = state
        .repo
        .set_case_study_active(id, payload.is_active)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to update case study"))?;
    Ok(Json(study))
}

#[utoipa::path(
    delete,
    path = "/api/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study ID")),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_case_study(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .repo
        .delete_case_study(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to delete case study"))?;
    tracing::info!(case_study_id = %id, "case study deleted");
    Ok(Json(SuccessResponse { success: true }))
}

// --- Contact ---

/// The field's value, unless it is absent, `null` or only whitespace.
fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// First address in `x-forwarded-for`, set by the reverse proxy in front of us.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

/// submit_contact
///
/// [Public Route] Accepts a contact form submission once its reCAPTCHA token checks out.
///
/// Field and token checks happen before the provider is called. An accepted
/// submission is only written to the log.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Accepted", body = ContactResponse),
        (status = 400, description = "Missing fields or failed verification", body = ErrorBody),
        (status = 500, description = "Verification unavailable", body = ErrorBody)
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    let (Some(name), Some(email), Some(subject), Some(message)) = (
        filled(&payload.name),
        filled(&payload.email),
        filled(&payload.subject),
        filled(&payload.message),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields"));
    };
    let Some(token) = filled(&payload.recaptcha_token) else {
        return Err(ApiError::BadRequest("Missing reCAPTCHA token"));
    };

    let remote_ip = client_ip(&headers);
    let verified = match state
        .captcha
        .verify(token, remote_ip.as_deref())
        .await
    {
        Ok(verified) => verified,
        Err(CaptchaError::MissingSecret) => {
            tracing::error!("contact submission rejected: RECAPTCHA_SECRET_KEY is not configured");
            return Err(ApiError::Internal("Server configuration error"));
        }
        Err(e) => {
            tracing::error!(error = %e, "reCAPTCHA verification call failed");
            return Err(ApiError::Internal("Failed to verify reCAPTCHA"));
        }
    };

    if !verified {
        return Err(ApiError::BadRequest("reCAPTCHA verification failed"));
    }

    // TODO: forward accepted submissions to the sales inbox once an email provider is chosen.
    tracing::info!(
        name = %name,
        email = %email,
        phone = ?payload.phone,
        company = ?payload.company,
        subject = %subject,
        message = %message,
        "contact form submission"
    );

    Ok(Json(ContactResponse {
        success: true,
        message: "Thank you for your message. We will get back to you soon.".to_string(),
    }))
}

// --- Admin Handlers ---

/// admin_session_status
///
/// [Admin Route] `GET /admin/login`, where the gate sends browsers without a session.
/// The login page itself is rendered by the frontend; this only reports whether the
/// request already carries a valid session.
#[utoipa::path(
    get,
    path = "/admin/login",
    responses((status = 200, description = "Current session state", body = SessionStatus))
)]
pub async fn admin_session_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: request_is_authenticated(&headers, &state.config),
    })
}

/// admin_login
///
/// [Admin Route] Checks the configured admin credentials and, on a match, sets the
/// session cookie to a signed session token.
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = SuccessResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Login not configured", body = ErrorBody)
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let config = &state.config;
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password)
    else {
        tracing::error!("admin login attempted but ADMIN_USERNAME/ADMIN_PASSWORD are not set");
        return Err(ApiError::Internal("Admin login is not configured"));
    };

    // Both comparisons always run so a wrong username costs the same as a wrong password.
    let username_ok = credential_matches(&payload.username, username);
    let password_ok = credential_matches(&payload.password, password);
    if !(username_ok && password_ok) {
        tracing::warn!(username = %payload.username, "admin login rejected");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = issue_session_token(username, &config.session_secret, config.session_ttl)
        .map_err(|e| {
            tracing::error!("failed to sign admin session token: {}", e);
            ApiError::Internal("Failed to create session")
        })?;
    let cookie = session_set_cookie(
        &config.admin_cookie_name,
        &token,
        config.session_ttl,
        config.env == Env::Production,
    );

    tracing::info!(username = %username, "admin logged in");
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SuccessResponse { success: true }),
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    responses((status = 200, description = "Session cookie cleared", body = SuccessResponse))
)]
pub async fn admin_logout(State(state): State<AppState>) -> Response {
    let cookie = session_clear_cookie(&state.config.admin_cookie_name);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SuccessResponse { success: true }),
    )
        .into_response()
}

/// admin_dashboard
///
/// [Admin Route] Content counters for the dashboard landing page.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses((status = 200, description = "Counts", body = ContentCounts))
)]
pub async fn admin_dashboard(
    State(state): State<AppState>,
) -> Result<Json<ContentCounts>, ApiError> {
    let counts = state
        .repo
        .content_counts()
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to load dashboard"))?;
    Ok(Json(counts))
}

/// admin_list_blogs
///
/// [Admin Route] Every blog, active or not.
#[utoipa::path(
    get,
    path = "/admin/blogs",
    responses((status = 200, description = "All blogs", body = [Blog]))
)]
pub async fn admin_list_blogs(
    State(state): State<AppState>,
) -> Result<Json<Vec<Blog>>, ApiError> {
    let blogs = state
        .repo
        .list_blogs(ListFilter::default())
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch blogs"))?;
    Ok(Json(blogs))
}

#[utoipa::path(
    get,
    path = "/admin/case-studies",
    responses((status = 200, description = "All case studies", body = [CaseStudy]))
)]
pub async fn admin_list_case_studies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CaseStudy>>, ApiError> {
    let studies = state
        .repo
        .list_case_studies(ListFilter::default())
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch case studies"))?;
    Ok(Json(studies))
}

/// admin_case_study_form
///
/// [Admin Route] A stored case study in the nested shape the editor submits back.
#[utoipa::path(
    get,
    path = "/admin/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study ID")),
    responses(
        (status = 200, description = "Editor form", body = CaseStudyForm),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn admin_case_study_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseStudyForm>, ApiError> {
    let study = state
        .repo
        .get_case_study(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to fetch case study"))?;
    Ok(Json(view_model::to_form(&study)))
}
