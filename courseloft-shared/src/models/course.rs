/// Course model and database operations
///
/// A course is owned by the user that created it; ownership never changes
/// after creation. `maximum_attendees` bounds how many memberships the
/// course may hold (see `crate::admission` for the admission rules).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE courses (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     maximum_attendees INTEGER NOT NULL CHECK (maximum_attendees >= 1),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Course record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    /// Course ID
    pub id: Uuid,

    /// Owning user; immutable after creation
    pub owner_id: Uuid,

    /// Course title
    pub title: String,

    /// Capacity bound for memberships (>= 1)
    pub maximum_attendees: i32,

    /// When the course was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new course
#[derive(Debug, Clone)]
pub struct CreateCourse {
    /// Owning user
    pub owner_id: Uuid,

    /// Course title
    pub title: String,

    /// Capacity bound (>= 1)
    pub maximum_attendees: i32,
}

impl Course {
    /// Creates a new course
    pub async fn create(pool: &PgPool, data: CreateCourse) -> Result<Self, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (owner_id, title, maximum_attendees)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, title, maximum_attendees, created_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.maximum_attendees)
        .fetch_one(pool)
        .await?;

        Ok(course)
    }

    /// Finds a course by ID
    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, owner_id, title, maximum_attendees, created_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(course)
    }

    /// Lists courses owned by a user
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, owner_id, title, maximum_attendees, created_at
            FROM courses
            WHERE owner_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(courses)
    }
}
