/// Store boundary
///
/// The business rules in [`crate::admission`], [`crate::recovery`], and the
/// publication worker operate against these traits rather than a concrete
/// database handle, so they can be exercised deterministically with the
/// in-memory implementation and run in production against Postgres.
///
/// Two invariants are enforced *inside* the store, because they are
/// check-then-act sequences that cannot be made safe from the outside:
///
/// - [`MembershipStore::insert`] checks capacity and inserts atomically,
///   returning [`MembershipInsert`] so the caller can distinguish a full
///   course from a duplicate join.
/// - [`ResetTokenStore::create`] refuses a second token for a user that
///   already has one, returning `None` so the caller can reload and resend
///   the winning token.
///
/// # Example
///
/// ```
/// use courseloft_shared::store::Stores;
///
/// // In-memory bundle for tests and demos; `Stores::postgres(pool)` is the
/// // production equivalent.
/// let stores = Stores::memory();
/// ```
pub mod memory;
pub mod postgres;

use crate::models::{
    Course, CourseContent, CreateCourse, CreateUser, Membership, NewCourseContent, NewMembership,
    NewResetToken, PasswordResetToken, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// The backing store failed or is unreachable
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.constraint().unwrap_or("unique").to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Outcome of an atomic membership insert
#[derive(Debug)]
pub enum MembershipInsert {
    /// The membership was created
    Inserted(Membership),

    /// The course was already at `maximum_attendees`
    CapacityExhausted,

    /// A membership for the (user, course) pair already exists
    Duplicate,
}

/// User accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, data: CreateUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Returns `false` when the user no longer exists
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;
    async fn update_last_login(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Course records
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn create(&self, data: CreateCourse) -> Result<Course, StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<Course>, StoreError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Course>, StoreError>;
}

/// (user, course) membership records
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Atomic capacity check + insert; see [`MembershipInsert`]
    async fn insert(
        &self,
        data: NewMembership,
        capacity: i32,
    ) -> Result<MembershipInsert, StoreError>;
    async fn find(&self, user_id: Uuid, course_id: Uuid)
        -> Result<Option<Membership>, StoreError>;
    /// Returns `false` when no membership existed for the pair
    async fn delete(&self, user_id: Uuid, course_id: Uuid) -> Result<bool, StoreError>;
    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Membership>, StoreError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Membership>, StoreError>;
    async fn count_by_course(&self, course_id: Uuid) -> Result<i64, StoreError>;
}

/// Password-reset tokens, at most one per user
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    /// Returns `None` when the user already has a token
    async fn create(&self, data: NewResetToken)
        -> Result<Option<PasswordResetToken>, StoreError>;
    async fn find_by_user(&self, user_id: Uuid)
        -> Result<Option<PasswordResetToken>, StoreError>;
    async fn find_by_token(&self, token: &str)
        -> Result<Option<PasswordResetToken>, StoreError>;
    /// Returns `false` when the token was already gone
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Time-gated course content
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create(&self, data: NewCourseContent) -> Result<CourseContent, StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<CourseContent>, StoreError>;
    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<CourseContent>, StoreError>;
    async fn list_pending(&self) -> Result<Vec<CourseContent>, StoreError>;
    /// Pending -> published flip; `false` when the item was already
    /// published or deleted
    async fn mark_published(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Bundle of every store the system uses
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub courses: Arc<dyn CourseStore>,
    pub memberships: Arc<dyn MembershipStore>,
    pub reset_tokens: Arc<dyn ResetTokenStore>,
    pub content: Arc<dyn ContentStore>,
}

impl Stores {
    /// Postgres-backed stores sharing one connection pool
    pub fn postgres(pool: PgPool) -> Self {
        Stores {
            users: Arc::new(postgres::PgUserStore::new(pool.clone())),
            courses: Arc::new(postgres::PgCourseStore::new(pool.clone())),
            memberships: Arc::new(postgres::PgMembershipStore::new(pool.clone())),
            reset_tokens: Arc::new(postgres::PgResetTokenStore::new(pool.clone())),
            content: Arc::new(postgres::PgContentStore::new(pool)),
        }
    }

    /// In-memory stores for tests and demos
    pub fn memory() -> Self {
        Stores {
            users: Arc::new(memory::MemoryUserStore::default()),
            courses: Arc::new(memory::MemoryCourseStore::default()),
            memberships: Arc::new(memory::MemoryMembershipStore::default()),
            reset_tokens: Arc::new(memory::MemoryResetTokenStore::default()),
            content: Arc::new(memory::MemoryContentStore::default()),
        }
    }
}
