use agency_site::{
    models::{Blog, BlogInput, CaseStudy, ContactRequest, ListFilter},
    view_model::{self, CaseStudyForm},
};
use serde_json::json;

#[test]
fn test_blog_serializes_camel_case() {
    let value = serde_json::to_value(Blog::default()).unwrap();

    for key in [
        "coverImage",
        "metaTitle",
        "isActive",
        "publishedAt",
        "createdAt",
        "relatedArticles",
    ] {
        assert!(value.get(key).is_some(), "missing key {}", key);
    }
    assert!(value.get("cover_image").is_none());
}

#[test]
fn test_blog_input_minimal_body() {
    let input: BlogInput = serde_json::from_value(json!({
        "title": "T",
        "slug": "t",
        "content": "c"
    }))
    .unwrap();

    assert_eq!(input.is_active, None);
    assert!(input.related_article_ids.is_empty());
}

#[test]
fn test_blog_input_requires_content() {
    let result = serde_json::from_value::<BlogInput>(json!({ "title": "T", "slug": "t" }));
    assert!(result.is_err());
}

#[test]
fn test_contact_request_tolerates_missing_fields() {
    let request: ContactRequest = serde_json::from_value(json!({
        "name": "Ada",
        "recaptchaToken": "tok"
    }))
    .unwrap();

    assert_eq!(request.recaptcha_token.as_deref(), Some("tok"));
    assert_eq!(request.message, None);
    assert_eq!(request.phone, None);
}

#[test]
fn test_contact_request_accepts_null_fields() {
    let request: ContactRequest = serde_json::from_value(json!({
        "name": "Ada",
        "message": null,
        "recaptchaToken": null
    }))
    .unwrap();

    assert_eq!(request.message, None);
    assert_eq!(request.recaptcha_token, None);
}

#[test]
fn test_list_filter_reads_camel_case_query() {
    let filter: ListFilter = serde_json::from_value(json!({
        "isActive": true,
        "limit": 3
    }))
    .unwrap();

    assert_eq!(filter.is_active, Some(true));
    assert_eq!(filter.limit, Some(3));
    assert_eq!(filter.exclude_id, None);
}

#[test]
fn test_view_model_with_challenge_but_no_solution() {
    let row = CaseStudy {
        slug: "partial".to_string(),
        challenge_title: Some("Legacy billing".to_string()),
        challenge_points: Some(vec!["manual invoices".to_string()]),
        ..CaseStudy::default()
    };

    let view = view_model::to_view_model(&row);

    assert_eq!(view.challenge.title.as_deref(), Some("Legacy billing"));
    assert_eq!(view.solution.title, None);
    assert_eq!(view.solution.steps, None);
    assert_eq!(view.testimonial.quote, None);
}

#[test]
fn test_form_accepts_omitted_sections() {
    let form: CaseStudyForm = serde_json::from_value(json!({
        "slug": "bare",
        "title": "Bare",
        "clientOverview": { "client": "Acme" }
    }))
    .unwrap();

    let fields = view_model::flatten(form);
    assert_eq!(fields.client, "Acme");
    assert_eq!(fields.industry, "");
    assert_eq!(fields.impact_title, None);
    assert!(fields.stats.is_empty());
    assert_eq!(fields.is_active, None);
}
