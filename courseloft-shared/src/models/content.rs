/// Course-content model and database operations
///
/// Content items are time-gated: each carries a `release_date` (a calendar
/// date, no time of day) and a status that is `published` iff the release
/// date has been reached at the last evaluation. Creation classifies the
/// item; after that the only mutation is the pending -> published flip
/// performed by the publication worker. Status never moves back.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE content_status AS ENUM ('pending', 'published');
///
/// CREATE TABLE course_content (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     description TEXT NOT NULL,
///     video_ref TEXT NOT NULL,
///     release_date DATE NOT NULL,
///     status content_status NOT NULL,
///     course_module TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Publication status of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Release date not yet reached; invisible to students
    Pending,

    /// Release date reached; visible to students
    Published,
}

impl ContentStatus {
    /// Classifies a release date against `today`
    ///
    /// Returns `None` for a date in the past: content cannot be created
    /// already overdue, callers must reject it.
    pub fn classify(release_date: NaiveDate, today: NaiveDate) -> Option<ContentStatus> {
        if release_date < today {
            None
        } else if release_date == today {
            Some(ContentStatus::Published)
        } else {
            Some(ContentStatus::Pending)
        }
    }

    /// Status as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Published => "published",
        }
    }
}

/// Content item attached to a course
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseContent {
    /// Content ID
    pub id: Uuid,

    /// Course this item belongs to
    pub course_id: Uuid,

    /// Human-readable description
    pub description: String,

    /// Opaque reference to the hosted video
    pub video_ref: String,

    /// Calendar date on which the item becomes visible
    pub release_date: NaiveDate,

    /// Publication status
    pub status: ContentStatus,

    /// Module the item is grouped under
    pub course_module: String,

    /// When the item was created
    pub created_at: DateTime<Utc>,

    /// When the item was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a content item (already classified)
#[derive(Debug, Clone)]
pub struct NewCourseContent {
    pub course_id: Uuid,
    pub description: String,
    pub video_ref: String,
    pub release_date: NaiveDate,
    pub status: ContentStatus,
    pub course_module: String,
}

impl CourseContent {
    /// Creates a content item
    pub async fn create(pool: &PgPool, data: NewCourseContent) -> Result<Self, sqlx::Error> {
        let content = sqlx::query_as::<_, CourseContent>(
            r#"
            INSERT INTO course_content
                (course_id, description, video_ref, release_date, status, course_module)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, course_id, description, video_ref, release_date, status,
                      course_module, created_at, updated_at
            "#,
        )
        .bind(data.course_id)
        .bind(data.description)
        .bind(data.video_ref)
        .bind(data.release_date)
        .bind(data.status)
        .bind(data.course_module)
        .fetch_one(pool)
        .await?;

        Ok(content)
    }

    /// Finds a content item by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let content = sqlx::query_as::<_, CourseContent>(
            r#"
            SELECT id, course_id, description, video_ref, release_date, status,
                   course_module, created_at, updated_at
            FROM course_content
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(content)
    }

    /// Lists the content of a course, oldest release first
    pub async fn list_by_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let items = sqlx::query_as::<_, CourseContent>(
            r#"
            SELECT id, course_id, description, video_ref, release_date, status,
                   course_module, created_at, updated_at
            FROM course_content
            WHERE course_id = $1
            ORDER BY release_date ASC, created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Lists every item still awaiting publication
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let items = sqlx::query_as::<_, CourseContent>(
            r#"
            SELECT id, course_id, description, video_ref, release_date, status,
                   course_module, created_at, updated_at
            FROM course_content
            WHERE status = 'pending'
            ORDER BY release_date ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Flips one pending item to published
    ///
    /// Returns `false` if the item no longer exists or was already
    /// published (the transition is monotonic, so that is not an error).
    pub async fn mark_published(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE course_content
            SET status = 'published', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
