use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CaseStudy, CaseStudyFields, CaseStudyStat};

// --- Nested Case Study Sections ---
//
// The case study page and the admin form both work with these groupings. Storage is flat
// (see `models::CaseStudy`), so every read goes through `to_view_model` and every write
// through `flatten`. Both are pure and total: an unset column is simply `None`.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ClientOverview {
    pub client: String,
    pub industry: String,
    pub overview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ChallengeSection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub points: Option<Vec<String>>,
    pub conclusion: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SolutionSection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub steps: Option<Vec<String>>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ImpactSection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub points: Option<Vec<String>>,
    pub conclusion: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Testimonial {
    pub quote: Option<String>,
    pub author: Option<String>,
    pub position: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Quote {
    pub text: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Styling {
    pub gradient: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct MetaFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

/// CaseStudyView
///
/// Read model served to the public case study page (`GET /api/case-studies/slug/{slug}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CaseStudyView {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub client_overview: ClientOverview,
    pub challenge: ChallengeSection,
    pub solution: SolutionSection,
    pub impact: ImpactSection,
    pub testimonial: Testimonial,
    pub quote: Quote,
    pub stats: Vec<CaseStudyStat>,
    pub styling: Styling,
    pub meta: MetaFields,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CaseStudyForm
///
/// Write model submitted by the admin editor on create and replace. Sections may be
/// omitted entirely; each missing section flattens to all-`None` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CaseStudyForm {
    pub slug: String,
    pub title: String,
    pub client_overview: ClientOverview,
    pub challenge: ChallengeSection,
    pub solution: SolutionSection,
    pub impact: ImpactSection,
    pub testimonial: Testimonial,
    pub quote: Quote,
    pub stats: Vec<CaseStudyStat>,
    pub styling: Styling,
    pub meta: MetaFields,
    pub is_active: Option<bool>,
}

fn client_overview(row: &CaseStudy) -> ClientOverview {
    ClientOverview {
        client: row.client.clone(),
        industry: row.industry.clone(),
        overview: row.overview.clone(),
    }
}

fn challenge(row: &CaseStudy) -> ChallengeSection {
    ChallengeSection {
        title: row.challenge_title.clone(),
        description: row.challenge_description.clone(),
        points: row.challenge_points.clone(),
        conclusion: row.challenge_conclusion.clone(),
        image: row.challenge_image.clone(),
    }
}

fn solution(row: &CaseStudy) -> SolutionSection {
    SolutionSection {
        title: row.solution_title.clone(),
        description: row.solution_description.clone(),
        steps: row.solution_steps.clone(),
        image: row.solution_image.clone(),
    }
}

fn impact(row: &CaseStudy) -> ImpactSection {
    ImpactSection {
        title: row.impact_title.clone(),
        description: row.impact_description.clone(),
        points: row.impact_points.clone(),
        conclusion: row.impact_conclusion.clone(),
        image: row.impact_image.clone(),
    }
}

fn testimonial(row: &CaseStudy) -> Testimonial {
    Testimonial {
        quote: row.testimonial_quote.clone(),
        author: row.testimonial_author.clone(),
        position: row.testimonial_position.clone(),
        image: row.testimonial_image.clone(),
    }
}

fn meta(row: &CaseStudy) -> MetaFields {
    MetaFields {
        title: row.meta_title.clone(),
        description: row.meta_description.clone(),
        keywords: row.meta_keywords.clone(),
    }
}

/// to_view_model
///
/// Regroups a flat row into the nested page structure.
pub fn to_view_model(row: &CaseStudy) -> CaseStudyView {
    CaseStudyView {
        id: row.id,
        slug: row.slug.clone(),
        title: row.title.clone(),
        client_overview: client_overview(row),
        challenge: challenge(row),
        solution: solution(row),
        impact: impact(row),
        testimonial: testimonial(row),
        quote: Quote {
            text: row.quote_text.clone(),
            author: row.quote_author.clone(),
        },
        stats: row.stats.clone(),
        styling: Styling {
            gradient: row.gradient.clone(),
            icon: row.icon.clone(),
        },
        meta: meta(row),
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// to_form
///
/// Prefills the admin editor from a stored row. `flatten(to_form(row))` gives back the
/// row's content columns.
pub fn to_form(row: &CaseStudy) -> CaseStudyForm {
    let view = to_view_model(row);
    CaseStudyForm {
        slug: view.slug,
        title: view.title,
        client_overview: view.client_overview,
        challenge: view.challenge,
        solution: view.solution,
        impact: view.impact,
        testimonial: view.testimonial,
        quote: view.quote,
        stats: view.stats,
        styling: view.styling,
        meta: view.meta,
        is_active: Some(view.is_active),
    }
}

/// flatten
///
/// Spreads the nested form over the flat column set used for storage.
pub fn flatten(form: CaseStudyForm) -> CaseStudyFields {
    let CaseStudyForm {
        slug,
        title,
        client_overview,
        challenge,
        solution,
        impact,
        testimonial,
        quote,
        stats,
        styling,
        meta,
        is_active,
    } = form;

    CaseStudyFields {
        slug,
        title,
        client: client_overview.client,
        industry: client_overview.industry,
        overview: client_overview.overview,

        challenge_title: challenge.title,
        challenge_description: challenge.description,
        challenge_points: challenge.points,
        challenge_conclusion: challenge.conclusion,
        challenge_image: challenge.image,

        solution_title: solution.title,
        solution_description: solution.description,
        solution_steps: solution.steps,
        solution_image: solution.image,

        impact_title: impact.title,
        impact_description: impact.description,
        impact_points: impact.points,
        impact_conclusion: impact.conclusion,
        impact_image: impact.image,

        testimonial_quote: testimonial.quote,
        testimonial_author: testimonial.author,
        testimonial_position: testimonial.position,
        testimonial_image: testimonial.image,

        quote_text: quote.text,
        quote_author: quote.author,

        stats,
        gradient: styling.gradient,
        icon: styling.icon,

        meta_title: meta.title,
        meta_description: meta.description,
        meta_keywords: meta.keywords,

        is_active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_challenge_only() -> CaseStudy {
        CaseStudy {
            slug: "fintech-platform".to_string(),
            title: "Fintech Platform".to_string(),
            client: "Acme Pay".to_string(),
            industry: "Finance".to_string(),
            overview: "Rebuilt the payments core.".to_string(),
            challenge_title: Some("Legacy monolith".to_string()),
            challenge_points: Some(vec!["Slow deploys".to_string(), "Outages".to_string()]),
            is_active: true,
            ..CaseStudy::default()
        }
    }

    #[test]
    fn missing_sections_become_none() {
        let view = to_view_model(&row_with_challenge_only());

        assert_eq!(view.challenge.title.as_deref(), Some("Legacy monolith"));
        assert_eq!(view.challenge.points.as_ref().map(Vec::len), Some(2));
        assert_eq!(view.solution.title, None);
        assert_eq!(view.solution.steps, None);
        assert_eq!(view.testimonial, Testimonial::default());
        assert_eq!(view.client_overview.client, "Acme Pay");
    }

    #[test]
    fn flatten_reverses_the_grouping() {
        let row = row_with_challenge_only();
        let fields = flatten(to_form(&row));

        assert_eq!(fields.slug, row.slug);
        assert_eq!(fields.client, row.client);
        assert_eq!(fields.challenge_title, row.challenge_title);
        assert_eq!(fields.challenge_points, row.challenge_points);
        assert_eq!(fields.solution_title, None);
        assert_eq!(fields.is_active, Some(true));
    }
}
