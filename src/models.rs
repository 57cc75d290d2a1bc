use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Content Schemas (Mapped to Database) ---

/// Blog
///
/// A blog article from the `blogs` table. The public site only ever sees rows with
/// `is_active = true`; the admin views read everything.
///
/// `related_articles` is not a column. The repository fills it from the
/// `blog_related_articles` join table after the row itself is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    // Unique across all blogs (enforced by `blogs_slug_key`).
    pub slug: String,
    // Rich text, stored as HTML.
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,

    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,

    pub is_active: bool,

    #[ts(type = "string")]
    pub published_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,

    #[sqlx(skip)]
    pub related_articles: Vec<RelatedArticle>,
}

/// RelatedArticle
///
/// The summary of a linked blog that is embedded in `Blog::related_articles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RelatedArticle {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    #[ts(type = "string")]
    pub published_at: DateTime<Utc>,
}

/// CaseStudyStat
///
/// One headline figure on a case study page (e.g. "40%" / "faster releases").
/// Stored as an element of the `stats` JSONB array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CaseStudyStat {
    pub label: String,
    pub value: String,
}

/// CaseStudy
///
/// The flat `case_studies` row. Every page section is spread over prefixed columns
/// (`challenge_*`, `solution_*`, ...); `view_model::to_view_model` regroups them for
/// presentation and `view_model::flatten` does the reverse for writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CaseStudy {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub client: String,
    pub industry: String,
    pub overview: String,

    pub challenge_title: Option<String>,
    pub challenge_description: Option<String>,
    pub challenge_points: Option<Vec<String>>,
    pub challenge_conclusion: Option<String>,
    pub challenge_image: Option<String>,

    pub solution_title: Option<String>,
    pub solution_description: Option<String>,
    pub solution_steps: Option<Vec<String>>,
    pub solution_image: Option<String>,

    pub impact_title: Option<String>,
    pub impact_description: Option<String>,
    pub impact_points: Option<Vec<String>>,
    pub impact_conclusion: Option<String>,
    pub impact_image: Option<String>,

    pub testimonial_quote: Option<String>,
    pub testimonial_author: Option<String>,
    pub testimonial_position: Option<String>,
    pub testimonial_image: Option<String>,

    pub quote_text: Option<String>,
    pub quote_author: Option<String>,

    #[sqlx(json)]
    pub stats: Vec<CaseStudyStat>,
    // Styling hints consumed by the frontend only.
    pub gradient: Option<String>,
    pub icon: Option<String>,

    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,

    pub is_active: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// BlogInput
///
/// Body of `POST /api/blogs` and `PUT /api/blogs/{id}`.
///
/// On create a missing `isActive` means `true`. On replace it keeps the stored value.
/// `relatedArticleIds` is a full set: a replace drops links that are not listed, and ids
/// that do not match an existing blog are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlogInput {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub related_article_ids: Vec<Uuid>,
}

/// CaseStudyFields
///
/// The flat write model for `case_studies`, produced by `view_model::flatten` from the
/// nested admin form. Mirrors `CaseStudy` minus the server-owned columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CaseStudyFields {
    pub slug: String,
    pub title: String,
    pub client: String,
    pub industry: String,
    pub overview: String,

    pub challenge_title: Option<String>,
    pub challenge_description: Option<String>,
    pub challenge_points: Option<Vec<String>>,
    pub challenge_conclusion: Option<String>,
    pub challenge_image: Option<String>,

    pub solution_title: Option<String>,
    pub solution_description: Option<String>,
    pub solution_steps: Option<Vec<String>>,
    pub solution_image: Option<String>,

    pub impact_title: Option<String>,
    pub impact_description: Option<String>,
    pub impact_points: Option<Vec<String>>,
    pub impact_conclusion: Option<String>,
    pub impact_image: Option<String>,

    pub testimonial_quote: Option<String>,
    pub testimonial_author: Option<String>,
    pub testimonial_position: Option<String>,
    pub testimonial_image: Option<String>,

    pub quote_text: Option<String>,
    pub quote_author: Option<String>,

    pub stats: Vec<CaseStudyStat>,
    pub gradient: Option<String>,
    pub icon: Option<String>,

    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,

    pub is_active: Option<bool>,
}

/// ActiveStatusUpdate
///
/// Body of the `PATCH` endpoints. Visibility is the only field that can be patched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ActiveStatusUpdate {
    pub is_active: bool,
}

/// ListFilter
///
/// Query parameters accepted by the list endpoints, passed straight through to the
/// repository. Results are always ordered by `created_at` descending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListFilter {
    /// Only return rows whose `isActive` flag matches.
    pub is_active: Option<bool>,
    /// Leave this id out of the result (used for "more articles" strips).
    pub exclude_id: Option<Uuid>,
    /// Exact slug match.
    pub slug: Option<String>,
    /// Maximum number of rows.
    pub limit: Option<i64>,
}

impl ListFilter {
    /// The filter used by the public site: active rows only.
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }
}

/// ContactRequest
///
/// Body of `POST /api/contact`. Every field is optional at the JSON level, so a missing
/// or `null` field reaches the handler, which answers 400 itself instead of the
/// extractor's 422.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub recaptcha_token: Option<String>,
}

/// LoginRequest
///
/// Body of `POST /admin/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// --- Response Schemas (Output) ---

/// SuccessResponse
///
/// `{"success": true}` returned by deletes, logout and login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SuccessResponse {
    pub success: bool,
}

/// SessionStatus
///
/// Output of `GET /admin/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionStatus {
    pub authenticated: bool,
}

/// ContactResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// ContentCounts
///
/// Output of `GET /admin/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContentCounts {
    pub total_blogs: i64,
    pub active_blogs: i64,
    pub total_case_studies: i64,
    pub active_case_studies: i64,
}
