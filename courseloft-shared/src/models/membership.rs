/// Membership model and database operations
///
/// A membership is a (user, course) relationship record. The source system
/// exposed it under two names ("enrollment" and "subscription"); both map to
/// this single concept and this single table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE memberships (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT memberships_user_course_key UNIQUE (user_id, course_id)
/// );
/// ```
///
/// # Capacity
///
/// [`Membership::insert_if_below`] runs the capacity check and the insert
/// in one transaction that first takes a row lock on the course, so two
/// concurrent joins for the last spot serialize on that lock and the
/// second one sees the first one's row when it counts. A bare conditional
/// `INSERT ... SELECT ... WHERE count < max` would not be enough: under
/// READ COMMITTED each statement counts against its own snapshot and two
/// joins by different users could both pass the predicate. Duplicate joins
/// are rejected by the unique constraint.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership record linking a user to a course
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Membership ID
    pub id: Uuid,

    /// Member user
    pub user_id: Uuid,

    /// Course joined
    pub course_id: Uuid,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone)]
pub struct NewMembership {
    /// Member user
    pub user_id: Uuid,

    /// Course to join
    pub course_id: Uuid,
}

impl Membership {
    /// Inserts a membership only if the course still has a free spot
    ///
    /// Locks the course row for the duration of the transaction, then
    /// counts and inserts. Concurrent joins queue on the lock, so the
    /// membership count can never overshoot `capacity`. Returns `None`
    /// when the course is full (or was deleted out from under the caller).
    ///
    /// # Errors
    ///
    /// A duplicate (user, course) pair surfaces as a unique constraint
    /// violation; other errors indicate the database is unreachable.
    pub async fn insert_if_below(
        pool: &PgPool,
        data: NewMembership,
        capacity: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // The lock serializes concurrent joins for this course; without
        // it, two READ COMMITTED inserts could each count the same
        // pre-insert state and both pass the capacity predicate.
        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
                .bind(data.course_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM memberships WHERE course_id = $1")
                .bind(data.course_id)
                .fetch_one(&mut *tx)
                .await?;
        if count >= i64::from(capacity) {
            tx.rollback().await?;
            return Ok(None);
        }

        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (user_id, course_id)
            VALUES ($1, $2)
            RETURNING id, user_id, course_id, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.course_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(membership))
    }

    /// Finds a specific membership by user and course
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, course_id, created_at
            FROM memberships
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Deletes a membership
    ///
    /// Returns `true` if a row was deleted, `false` if no membership
    /// existed for the pair.
    pub async fn delete(
        pool: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM memberships WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all members of a course
    pub async fn list_by_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, course_id, created_at
            FROM memberships
            WHERE course_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Lists all courses a user has joined
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, course_id, created_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Counts members of a course
    pub async fn count_by_course(pool: &PgPool, course_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM memberships WHERE course_id = $1")
                .bind(course_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
