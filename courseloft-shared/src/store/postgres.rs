/// Postgres store implementations
///
/// Thin wrappers that delegate to the query functions on the models and
/// translate `sqlx::Error` into [`StoreError`]. The atomicity the traits
/// promise comes from the SQL: the membership insert counts and inserts
/// inside one transaction holding a course-row lock, the token insert is a
/// single `ON CONFLICT DO NOTHING` statement, and the unique indexes back
/// both up.
use crate::models::{
    Course, CourseContent, CreateCourse, CreateUser, Membership, NewCourseContent, NewMembership,
    NewResetToken, PasswordResetToken, User,
};
use crate::store::{
    ContentStore, CourseStore, MembershipInsert, MembershipStore, ResetTokenStore, StoreError,
    UserStore,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Users backed by the `users` table
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, data: CreateUser) -> Result<User, StoreError> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        Ok(User::update_password(&self.pool, id, password_hash).await?)
    }

    async fn update_last_login(&self, id: Uuid) -> Result<(), StoreError> {
        Ok(User::update_last_login(&self.pool, id).await?)
    }
}

/// Courses backed by the `courses` table
pub struct PgCourseStore {
    pool: PgPool,
}

impl PgCourseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseStore for PgCourseStore {
    async fn create(&self, data: CreateCourse) -> Result<Course, StoreError> {
        Ok(Course::create(&self.pool, data).await?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        Ok(Course::find(&self.pool, id).await?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Course>, StoreError> {
        Ok(Course::list_by_owner(&self.pool, owner_id).await?)
    }
}

/// Memberships backed by the `memberships` table
pub struct PgMembershipStore {
    pool: PgPool,
}

impl PgMembershipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipStore for PgMembershipStore {
    async fn insert(
        &self,
        data: NewMembership,
        capacity: i32,
    ) -> Result<MembershipInsert, StoreError> {
        match Membership::insert_if_below(&self.pool, data, capacity).await {
            Ok(Some(membership)) => Ok(MembershipInsert::Inserted(membership)),
            Ok(None) => Ok(MembershipInsert::CapacityExhausted),
            Err(err) => match StoreError::from(err) {
                StoreError::Duplicate(_) => Ok(MembershipInsert::Duplicate),
                other => Err(other),
            },
        }
    }

    async fn find(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(Membership::find(&self.pool, user_id, course_id).await?)
    }

    async fn delete(&self, user_id: Uuid, course_id: Uuid) -> Result<bool, StoreError> {
        Ok(Membership::delete(&self.pool, user_id, course_id).await?)
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Membership>, StoreError> {
        Ok(Membership::list_by_course(&self.pool, course_id).await?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Membership>, StoreError> {
        Ok(Membership::list_by_user(&self.pool, user_id).await?)
    }

    async fn count_by_course(&self, course_id: Uuid) -> Result<i64, StoreError> {
        Ok(Membership::count_by_course(&self.pool, course_id).await?)
    }
}

/// Reset tokens backed by the `password_reset_tokens` table
pub struct PgResetTokenStore {
    pool: PgPool,
}

impl PgResetTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenStore for PgResetTokenStore {
    async fn create(
        &self,
        data: NewResetToken,
    ) -> Result<Option<PasswordResetToken>, StoreError> {
        Ok(PasswordResetToken::create(&self.pool, data).await?)
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PasswordResetToken>, StoreError> {
        Ok(PasswordResetToken::find_by_user(&self.pool, user_id).await?)
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, StoreError> {
        Ok(PasswordResetToken::find_by_token(&self.pool, token).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(PasswordResetToken::delete(&self.pool, id).await?)
    }
}

/// Course content backed by the `course_content` table
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn create(&self, data: NewCourseContent) -> Result<CourseContent, StoreError> {
        Ok(CourseContent::create(&self.pool, data).await?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<CourseContent>, StoreError> {
        Ok(CourseContent::find(&self.pool, id).await?)
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<CourseContent>, StoreError> {
        Ok(CourseContent::list_by_course(&self.pool, course_id).await?)
    }

    async fn list_pending(&self) -> Result<Vec<CourseContent>, StoreError> {
        Ok(CourseContent::list_pending(&self.pool).await?)
    }

    async fn mark_published(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(CourseContent::mark_published(&self.pool, id).await?)
    }
}
