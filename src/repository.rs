use crate::error::StoreError;
use crate::models::{
    Blog, BlogInput, CaseStudy, CaseStudyFields, ContentCounts, ListFilter, RelatedArticle,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    FromRow, PgPool, Postgres,
    postgres::PgArguments,
    query::QueryAs,
    query_builder::QueryBuilder,
    types::Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract for the content store. Handlers only see
/// `Arc<dyn Repository>`, so Postgres in production and `InMemoryRepository` in tests
/// are interchangeable.
///
/// Lists are ordered by `created_at` descending. Single-row reads and writes report a
/// missing id or slug as `StoreError::NotFound`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Blogs ---
    async fn list_blogs(&self, filter: ListFilter) -> Result<Vec<Blog>, StoreError>;
    async fn get_blog(&self, id: Uuid) -> Result<Blog, StoreError>;
    async fn get_blog_by_slug(&self, slug: &str) -> Result<Blog, StoreError>;
    // Assigns the id and sets `published_at` to now.
    async fn create_blog(&self, input: BlogInput) -> Result<Blog, StoreError>;
    // Full replace, including the related-article set.
    async fn update_blog(&self, id: Uuid, input: BlogInput) -> Result<Blog, StoreError>;
    // Writes `is_active` and nothing else.
    async fn set_blog_active(&self, id: Uuid, is_active: bool) -> Result<Blog, StoreError>;
    async fn delete_blog(&self, id: Uuid) -> Result<(), StoreError>;

    // --- Case Studies ---
    async fn list_case_studies(&self, filter: ListFilter) -> Result<Vec<CaseStudy>, StoreError>;
    async fn get_case_study(&self, id: Uuid) -> Result<CaseStudy, StoreError>;
    async fn get_case_study_by_slug(&self, slug: &str) -> Result<CaseStudy, StoreError>;
    async fn create_case_study(&self, fields: CaseStudyFields) -> Result<CaseStudy, StoreError>;
    async fn update_case_study(
        &self,
        id: Uuid,
        fields: CaseStudyFields,
    ) -> Result<CaseStudy, StoreError>;
    async fn set_case_study_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<CaseStudy, StoreError>;
    async fn delete_case_study(&self, id: Uuid) -> Result<(), StoreError>;

    // --- Admin ---
    async fn content_counts(&self) -> Result<ContentCounts, StoreError>;
}

/// RepositoryState
///
/// The shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// Negative limits are ignored rather than sent to the database.
fn effective_limit(filter: &ListFilter) -> Option<i64> {
    filter.limit.filter(|limit| *limit >= 0)
}

// --- Postgres ---

const BLOG_COLUMNS: &str = "id, title, slug, content, excerpt, cover_image, \
     meta_title, meta_description, meta_keywords, is_active, \
     published_at, created_at, updated_at";

const CASE_STUDY_COLUMNS: &str = "id, slug, title, client, industry, overview, \
     challenge_title, challenge_description, challenge_points, challenge_conclusion, challenge_image, \
     solution_title, solution_description, solution_steps, solution_image, \
     impact_title, impact_description, impact_points, impact_conclusion, impact_image, \
     testimonial_quote, testimonial_author, testimonial_position, testimonial_image, \
     quote_text, quote_author, stats, gradient, icon, \
     meta_title, meta_description, meta_keywords, is_active, created_at, updated_at";

// Column list shared by INSERT and UPDATE, bound as $2..$32 by `bind_case_study_fields`.
const CASE_STUDY_WRITE_COLUMNS: [&str; 31] = [
    "slug",
    "title",
    "client",
    "industry",
    "overview",
    "challenge_title",
    "challenge_description",
    "challenge_points",
    "challenge_conclusion",
    "challenge_image",
    "solution_title",
    "solution_description",
    "solution_steps",
    "solution_image",
    "impact_title",
    "impact_description",
    "impact_points",
    "impact_conclusion",
    "impact_image",
    "testimonial_quote",
    "testimonial_author",
    "testimonial_position",
    "testimonial_image",
    "quote_text",
    "quote_author",
    "stats",
    "gradient",
    "icon",
    "meta_title",
    "meta_description",
    "meta_keywords",
];

fn case_study_insert_sql() -> String {
    let columns = CASE_STUDY_WRITE_COLUMNS.join(", ");
    let params = (2..=32)
        .map(|n| format!("${}", n))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO case_studies (id, {columns}, is_active, created_at, updated_at) \
         VALUES ($1, {params}, $33, NOW(), NOW()) \
         RETURNING {CASE_STUDY_COLUMNS}"
    )
}

fn case_study_update_sql() -> String {
    let assignments = CASE_STUDY_WRITE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE case_studies SET {assignments}, \
         is_active = COALESCE($33, is_active), updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {CASE_STUDY_COLUMNS}"
    )
}

type CaseStudyQuery<'q> = QueryAs<'q, Postgres, CaseStudy, PgArguments>;

/// Binds the 31 content columns in `CASE_STUDY_WRITE_COLUMNS` order.
fn bind_case_study_fields<'q>(query: CaseStudyQuery<'q>, f: CaseStudyFields) -> CaseStudyQuery<'q> {
    query
        .bind(f.slug)
        .bind(f.title)
        .bind(f.client)
        .bind(f.industry)
        .bind(f.overview)
        .bind(f.challenge_title)
        .bind(f.challenge_description)
        .bind(f.challenge_points)
        .bind(f.challenge_conclusion)
        .bind(f.challenge_image)
        .bind(f.solution_title)
        .bind(f.solution_description)
        .bind(f.solution_steps)
        .bind(f.solution_image)
        .bind(f.impact_title)
        .bind(f.impact_description)
        .bind(f.impact_points)
        .bind(f.impact_conclusion)
        .bind(f.impact_image)
        .bind(f.testimonial_quote)
        .bind(f.testimonial_author)
        .bind(f.testimonial_position)
        .bind(f.testimonial_image)
        .bind(f.quote_text)
        .bind(f.quote_author)
        .bind(Json(f.stats))
        .bind(f.gradient)
        .bind(f.icon)
        .bind(f.meta_title)
        .bind(f.meta_description)
        .bind(f.meta_keywords)
}

/// A related-article row tagged with the blog it belongs to.
#[derive(FromRow)]
struct RelatedRow {
    blog_id: Uuid,
    #[sqlx(flatten)]
    article: RelatedArticle,
}

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries are built at runtime (`query_as` / `QueryBuilder`) with every value bound
/// as a parameter.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the related-article summaries of every blog in `blogs` with one query.
    async fn attach_related(&self, blogs: &mut [Blog]) -> Result<(), StoreError> {
        if blogs.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = blogs.iter().map(|b| b.id).collect();

        let rows = sqlx::query_as::<_, RelatedRow>(
            r#"
            SELECT r.blog_id, b.id, b.title, b.slug, b.excerpt, b.cover_image, b.published_at
            FROM blog_related_articles r
            JOIN blogs b ON b.id = r.related_id
            WHERE r.blog_id = ANY($1)
            ORDER BY b.published_at DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_blog: HashMap<Uuid, Vec<RelatedArticle>> = HashMap::new();
        for row in rows {
            by_blog.entry(row.blog_id).or_default().push(row.article);
        }
        for blog in blogs.iter_mut() {
            blog.related_articles = by_blog.remove(&blog.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn hydrate(&self, mut blog: Blog) -> Result<Blog, StoreError> {
        self.attach_related(std::slice::from_mut(&mut blog)).await?;
        Ok(blog)
    }

    /// Replaces the related set of `blog_id` inside `tx`. Unknown ids are dropped by the
    /// `SELECT ... WHERE id = ANY` instead of failing the write.
    async fn replace_related(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        blog_id: Uuid,
        related_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM blog_related_articles WHERE blog_id = $1")
            .bind(blog_id)
            .execute(&mut **tx)
            .await?;

        if !related_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO blog_related_articles (blog_id, related_id)
                SELECT $1, id FROM blogs WHERE id = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(blog_id)
            .bind(related_ids)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ListFilter) {
        if let Some(active) = filter.is_active {
            builder.push(" AND is_active = ");
            builder.push_bind(active);
        }
        if let Some(exclude) = filter.exclude_id {
            builder.push(" AND id <> ");
            builder.push_bind(exclude);
        }
        if let Some(slug) = &filter.slug {
            builder.push(" AND slug = ");
            builder.push_bind(slug.clone());
        }
        builder.push(" ORDER BY created_at DESC");
        if let Some(limit) = effective_limit(filter) {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// list_blogs
    ///
    /// Builds the WHERE clause from whichever filter fields are set.
    async fn list_blogs(&self, filter: ListFilter) -> Result<Vec<Blog>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE TRUE"));
        Self::push_filter(&mut builder, &filter);

        let mut blogs = builder.build_query_as::<Blog>().fetch_all(&self.pool).await?;
        self.attach_related(&mut blogs).await?;
        Ok(blogs)
    }

    async fn get_blog(&self, id: Uuid) -> Result<Blog, StoreError> {
        let blog = sqlx::query_as::<_, Blog>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        self.hydrate(blog).await
    }

    async fn get_blog_by_slug(&self, slug: &str) -> Result<Blog, StoreError> {
        let blog = sqlx::query_as::<_, Blog>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        self.hydrate(blog).await
    }

    /// create_blog
    ///
    /// Inserts the row and connects its related articles in one transaction.
    async fn create_blog(&self, input: BlogInput) -> Result<Blog, StoreError> {
        let mut tx = self.pool.begin().await?;
        let new_id = Uuid::new_v4();

        let blog = sqlx::query_as::<_, Blog>(&format!(
            r#"
            INSERT INTO blogs (id, title, slug, content, excerpt, cover_image,
                               meta_title, meta_description, meta_keywords, is_active,
                               published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW(), NOW())
            RETURNING {BLOG_COLUMNS}
            "#
        ))
        .bind(new_id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(&input.excerpt)
        .bind(&input.cover_image)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .bind(&input.meta_keywords)
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::from_write(e, &input.slug))?;

        Self::replace_related(&mut tx, blog.id, &input.related_article_ids).await?;
        tx.commit().await?;

        self.hydrate(blog).await
    }

    /// update_blog
    ///
    /// Overwrites every content column. `is_active` is only written when provided.
    async fn update_blog(&self, id: Uuid, input: BlogInput) -> Result<Blog, StoreError> {
        let mut tx = self.pool.begin().await?;

        let blog = sqlx::query_as::<_, Blog>(&format!(
            r#"
            UPDATE blogs
            SET title = $2, slug = $3, content = $4, excerpt = $5, cover_image = $6,
                meta_title = $7, meta_description = $8, meta_keywords = $9,
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BLOG_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(&input.excerpt)
        .bind(&input.cover_image)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .bind(&input.meta_keywords)
        .bind(input.is_active)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StoreError::from_write(e, &input.slug))?
        .ok_or(StoreError::NotFound)?;

        Self::replace_related(&mut tx, id, &input.related_article_ids).await?;
        tx.commit().await?;

        self.hydrate(blog).await
    }

    async fn set_blog_active(&self, id: Uuid, is_active: bool) -> Result<Blog, StoreError> {
        let blog = sqlx::query_as::<_, Blog>(&format!(
            "UPDATE blogs SET is_active = $2 WHERE id = $1 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        self.hydrate(blog).await
    }

    /// delete_blog
    ///
    /// Join rows in both directions go with it (`ON DELETE CASCADE`).
    async fn delete_blog(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_case_studies(&self, filter: ListFilter) -> Result<Vec<CaseStudy>, StoreError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {CASE_STUDY_COLUMNS} FROM case_studies WHERE TRUE"
        ));
        Self::push_filter(&mut builder, &filter);

        let studies = builder
            .build_query_as::<CaseStudy>()
            .fetch_all(&self.pool)
            .await?;
        Ok(studies)
    }

    async fn get_case_study(&self, id: Uuid) -> Result<CaseStudy, StoreError> {
        sqlx::query_as::<_, CaseStudy>(&format!(
            "SELECT {CASE_STUDY_COLUMNS} FROM case_studies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn get_case_study_by_slug(&self, slug: &str) -> Result<CaseStudy, StoreError> {
        sqlx::query_as::<_, CaseStudy>(&format!(
            "SELECT {CASE_STUDY_COLUMNS} FROM case_studies WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn create_case_study(&self, fields: CaseStudyFields) -> Result<CaseStudy, StoreError> {
        let sql = case_study_insert_sql();
        let slug = fields.slug.clone();
        let is_active = fields.is_active.unwrap_or(true);

        let query = sqlx::query_as::<_, CaseStudy>(&sql).bind(Uuid::new_v4());
        bind_case_study_fields(query, fields)
            .bind(is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_write(e, &slug))
    }

    async fn update_case_study(
        &self,
        id: Uuid,
        fields: CaseStudyFields,
    ) -> Result<CaseStudy, StoreError> {
        let sql = case_study_update_sql();
        let slug = fields.slug.clone();
        let is_active = fields.is_active;

        let query = sqlx::query_as::<_, CaseStudy>(&sql).bind(id);
        bind_case_study_fields(query, fields)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_write(e, &slug))?
            .ok_or(StoreError::NotFound)
    }

    async fn set_case_study_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<CaseStudy, StoreError> {
        sqlx::query_as::<_, CaseStudy>(&format!(
            "UPDATE case_studies SET is_active = $2 WHERE id = $1 RETURNING {CASE_STUDY_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_case_study(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM case_studies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// content_counts
    ///
    /// All four dashboard counters in a single round-trip.
    async fn content_counts(&self) -> Result<ContentCounts, StoreError> {
        let counts = sqlx::query_as::<_, ContentCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM blogs) AS total_blogs,
                (SELECT COUNT(*) FROM blogs WHERE is_active) AS active_blogs,
                (SELECT COUNT(*) FROM case_studies) AS total_case_studies,
                (SELECT COUNT(*) FROM case_studies WHERE is_active) AS active_case_studies
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }
}

// --- In-Memory (For Tests) ---

#[derive(Default)]
struct MemoryTables {
    // Insertion order; `related_articles` is left empty and filled on read.
    blogs: Vec<Blog>,
    // (blog_id, related_id)
    related: Vec<(Uuid, Uuid)>,
    case_studies: Vec<CaseStudy>,
}

impl MemoryTables {
    fn blog_slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.blogs
            .iter()
            .any(|b| b.slug == slug && Some(b.id) != except)
    }

    fn case_study_slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.case_studies
            .iter()
            .any(|c| c.slug == slug && Some(c.id) != except)
    }

    fn replace_related(&mut self, blog_id: Uuid, related_ids: &[Uuid]) {
        self.related.retain(|(owner, _)| *owner != blog_id);
        for related_id in related_ids {
            let exists = self.blogs.iter().any(|b| b.id == *related_id);
            let linked = self.related.contains(&(blog_id, *related_id));
            if exists && !linked {
                self.related.push((blog_id, *related_id));
            }
        }
    }

    fn hydrate(&self, blog: &Blog) -> Blog {
        let mut related: Vec<RelatedArticle> = self
            .related
            .iter()
            .filter(|(owner, _)| *owner == blog.id)
            .filter_map(|(_, related_id)| self.blogs.iter().find(|b| b.id == *related_id))
            .map(|b| RelatedArticle {
                id: b.id,
                title: b.title.clone(),
                slug: b.slug.clone(),
                excerpt: b.excerpt.clone(),
                cover_image: b.cover_image.clone(),
                published_at: b.published_at,
            })
            .collect();
        related.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Blog {
            related_articles: related,
            ..blog.clone()
        }
    }
}

fn matches_filter(filter: &ListFilter, id: Uuid, slug: &str, is_active: bool) -> bool {
    filter.is_active.is_none_or(|wanted| wanted == is_active)
        && filter.exclude_id.is_none_or(|excluded| excluded != id)
        && filter.slug.as_deref().is_none_or(|wanted| wanted == slug)
}

/// Newest first. Equal timestamps fall back to reverse insertion order.
fn newest_first<T: Clone>(
    rows: &[T],
    created_at: impl Fn(&T) -> chrono::DateTime<Utc>,
    keep: impl Fn(&T) -> bool,
    limit: Option<i64>,
) -> Vec<T> {
    let mut selected: Vec<T> = rows.iter().rev().filter(|row| keep(row)).cloned().collect();
    selected.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    if let Some(limit) = limit {
        selected.truncate(limit as usize);
    }
    selected
}

fn case_study_from_fields(
    id: Uuid,
    f: CaseStudyFields,
    is_active: bool,
    created_at: chrono::DateTime<Utc>,
) -> CaseStudy {
    CaseStudy {
        id,
        slug: f.slug,
        title: f.title,
        client: f.client,
        industry: f.industry,
        overview: f.overview,
        challenge_title: f.challenge_title,
        challenge_description: f.challenge_description,
        challenge_points: f.challenge_points,
        challenge_conclusion: f.challenge_conclusion,
        challenge_image: f.challenge_image,
        solution_title: f.solution_title,
        solution_description: f.solution_description,
        solution_steps: f.solution_steps,
        solution_image: f.solution_image,
        impact_title: f.impact_title,
        impact_description: f.impact_description,
        impact_points: f.impact_points,
        impact_conclusion: f.impact_conclusion,
        impact_image: f.impact_image,
        testimonial_quote: f.testimonial_quote,
        testimonial_author: f.testimonial_author,
        testimonial_position: f.testimonial_position,
        testimonial_image: f.testimonial_image,
        quote_text: f.quote_text,
        quote_author: f.quote_author,
        stats: f.stats,
        gradient: f.gradient,
        icon: f.icon,
        meta_title: f.meta_title,
        meta_description: f.meta_description,
        meta_keywords: f.meta_keywords,
        is_active,
        created_at,
        updated_at: Utc::now(),
    }
}

/// InMemoryRepository
///
/// A process-local `Repository` with the same observable rules as Postgres: unique
/// slugs, newest-first lists, connect-only-existing related articles, `NotFound` on
/// missing ids. Used by the test suite in place of a database.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<MemoryTables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_blogs(&self, filter: ListFilter) -> Result<Vec<Blog>, StoreError> {
        let tables = self.tables.read().await;
        let rows = newest_first(
            &tables.blogs,
            |b| b.created_at,
            |b| matches_filter(&filter, b.id, &b.slug, b.is_active),
            effective_limit(&filter),
        );
        Ok(rows.iter().map(|b| tables.hydrate(b)).collect())
    }

    async fn get_blog(&self, id: Uuid) -> Result<Blog, StoreError> {
        let tables = self.tables.read().await;
        tables
            .blogs
            .iter()
            .find(|b| b.id == id)
            .map(|b| tables.hydrate(b))
            .ok_or(StoreError::NotFound)
    }

    async fn get_blog_by_slug(&self, slug: &str) -> Result<Blog, StoreError> {
        let tables = self.tables.read().await;
        tables
            .blogs
            .iter()
            .find(|b| b.slug == slug)
            .map(|b| tables.hydrate(b))
            .ok_or(StoreError::NotFound)
    }

    async fn create_blog(&self, input: BlogInput) -> Result<Blog, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.blog_slug_taken(&input.slug, None) {
            return Err(StoreError::SlugTaken(input.slug));
        }

        let now = Utc::now();
        let blog = Blog {
            id: Uuid::new_v4(),
            title: input.title,
            slug: input.slug,
            content: input.content,
            excerpt: input.excerpt,
            cover_image: input.cover_image,
            meta_title: input.meta_title,
            meta_description: input.meta_description,
            meta_keywords: input.meta_keywords,
            is_active: input.is_active.unwrap_or(true),
            published_at: now,
            created_at: now,
            updated_at: now,
            related_articles: Vec::new(),
        };
        tables.blogs.push(blog.clone());
        tables.replace_related(blog.id, &input.related_article_ids);
        Ok(tables.hydrate(&blog))
    }

    async fn update_blog(&self, id: Uuid, input: BlogInput) -> Result<Blog, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.blogs.iter().any(|b| b.id == id) {
            return Err(StoreError::NotFound);
        }
        if tables.blog_slug_taken(&input.slug, Some(id)) {
            return Err(StoreError::SlugTaken(input.slug));
        }

        let updated = {
            let blog = tables
                .blogs
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or(StoreError::NotFound)?;
            blog.title = input.title;
            blog.slug = input.slug;
            blog.content = input.content;
            blog.excerpt = input.excerpt;
            blog.cover_image = input.cover_image;
            blog.meta_title = input.meta_title;
            blog.meta_description = input.meta_description;
            blog.meta_keywords = input.meta_keywords;
            if let Some(active) = input.is_active {
                blog.is_active = active;
            }
            blog.updated_at = Utc::now();
            blog.clone()
        };
        tables.replace_related(id, &input.related_article_ids);
        Ok(tables.hydrate(&updated))
    }

    async fn set_blog_active(&self, id: Uuid, is_active: bool) -> Result<Blog, StoreError> {
        let mut tables = self.tables.write().await;
        let updated = {
            let blog = tables
                .blogs
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or(StoreError::NotFound)?;
            blog.is_active = is_active;
            blog.clone()
        };
        Ok(tables.hydrate(&updated))
    }

    async fn delete_blog(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.blogs.len();
        tables.blogs.retain(|b| b.id != id);
        if tables.blogs.len() == before {
            return Err(StoreError::NotFound);
        }
        tables
            .related
            .retain(|(owner, related)| *owner != id && *related != id);
        Ok(())
    }

    async fn list_case_studies(&self, filter: ListFilter) -> Result<Vec<CaseStudy>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            &tables.case_studies,
            |c| c.created_at,
            |c| matches_filter(&filter, c.id, &c.slug, c.is_active),
            effective_limit(&filter),
        ))
    }

    async fn get_case_study(&self, id: Uuid) -> Result<CaseStudy, StoreError> {
        let tables = self.tables.read().await;
        tables
            .case_studies
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_case_study_by_slug(&self, slug: &str) -> Result<CaseStudy, StoreError> {
        let tables = self.tables.read().await;
        tables
            .case_studies
            .iter()
            .find(|c| c.slug == slug)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_case_study(&self, fields: CaseStudyFields) -> Result<CaseStudy, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.case_study_slug_taken(&fields.slug, None) {
            return Err(StoreError::SlugTaken(fields.slug));
        }

        let is_active = fields.is_active.unwrap_or(true);
        let study = case_study_from_fields(Uuid::new_v4(), fields, is_active, Utc::now());
        tables.case_studies.push(study.clone());
        Ok(study)
    }

    async fn update_case_study(
        &self,
        id: Uuid,
        fields: CaseStudyFields,
    ) -> Result<CaseStudy, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.case_studies.iter().any(|c| c.id == id) {
            return Err(StoreError::NotFound);
        }
        if tables.case_study_slug_taken(&fields.slug, Some(id)) {
            return Err(StoreError::SlugTaken(fields.slug));
        }

        let existing = tables
            .case_studies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound)?;
        let is_active = fields.is_active.unwrap_or(existing.is_active);
        *existing = case_study_from_fields(id, fields, is_active, existing.created_at);
        Ok(existing.clone())
    }

    async fn set_case_study_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<CaseStudy, StoreError> {
        let mut tables = self.tables.write().await;
        let study = tables
            .case_studies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound)?;
        study.is_active = is_active;
        Ok(study.clone())
    }

    async fn delete_case_study(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.case_studies.len();
        tables.case_studies.retain(|c| c.id != id);
        if tables.case_studies.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn content_counts(&self) -> Result<ContentCounts, StoreError> {
        let tables = self.tables.read().await;
        let count = |n: usize| n as i64;
        Ok(ContentCounts {
            total_blogs: count(tables.blogs.len()),
            active_blogs: count(tables.blogs.iter().filter(|b| b.is_active).count()),
            total_case_studies: count(tables.case_studies.len()),
            active_case_studies: count(tables.case_studies.iter().filter(|c| c.is_active).count()),
        })
    }
}
