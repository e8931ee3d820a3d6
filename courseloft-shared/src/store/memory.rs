/// In-memory store implementations
///
/// Used by the test suites and by local demos that run without Postgres.
/// Each store guards its data with one async mutex, so the check-then-act
/// sequences (capacity check + insert, single-token check + insert) are as
/// atomic here as the locked transactions are in the Postgres stores.
use crate::models::{
    Course, CourseContent, ContentStatus, CreateCourse, CreateUser, Membership, NewCourseContent,
    NewMembership, NewResetToken, PasswordResetToken, User,
};
use crate::store::{
    ContentStore, CourseStore, MembershipInsert, MembershipStore, ResetTokenStore, StoreError,
    UserStore,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Users held in a map keyed by ID
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().await;
        if rows.values().any(|u| u.email == data.email) {
            return Err(StoreError::Duplicate("users_email_key".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            name: data.name,
            created_at: Utc::now(),
            last_login_at: None,
        };
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.get(&id).cloned())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_last_login(&self, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().await;
        if let Some(user) = rows.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// Courses held in a map keyed by ID
#[derive(Default)]
pub struct MemoryCourseStore {
    rows: Mutex<HashMap<Uuid, Course>>,
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn create(&self, data: CreateCourse) -> Result<Course, StoreError> {
        let course = Course {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            title: data.title,
            maximum_attendees: data.maximum_attendees,
            created_at: Utc::now(),
        };
        self.rows.lock().await.insert(course.id, course.clone());
        Ok(course)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Course>, StoreError> {
        let rows = self.rows.lock().await;
        let mut courses: Vec<Course> = rows
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        courses.sort_by_key(|c| c.created_at);
        Ok(courses)
    }
}

/// Memberships held in a vector behind one mutex
///
/// The single lock is what makes `insert` atomic: capacity and duplicate
/// are evaluated and the row appended without releasing it.
#[derive(Default)]
pub struct MemoryMembershipStore {
    rows: Mutex<Vec<Membership>>,
}

#[async_trait]
impl MembershipStore for MemoryMembershipStore {
    async fn insert(
        &self,
        data: NewMembership,
        capacity: i32,
    ) -> Result<MembershipInsert, StoreError> {
        let mut rows = self.rows.lock().await;
        let count = rows.iter().filter(|m| m.course_id == data.course_id).count();
        if count as i64 >= capacity as i64 {
            return Ok(MembershipInsert::CapacityExhausted);
        }
        if rows
            .iter()
            .any(|m| m.user_id == data.user_id && m.course_id == data.course_id)
        {
            return Ok(MembershipInsert::Duplicate);
        }
        let membership = Membership {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            course_id: data.course_id,
            created_at: Utc::now(),
        };
        rows.push(membership.clone());
        Ok(MembershipInsert::Inserted(membership))
    }

    async fn find(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|m| m.user_id == user_id && m.course_id == course_id)
            .cloned())
    }

    async fn delete(&self, user_id: Uuid, course_id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|m| !(m.user_id == user_id && m.course_id == course_id));
        Ok(rows.len() < before)
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Membership>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Membership>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_by_course(&self, course_id: Uuid) -> Result<i64, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|m| m.course_id == course_id).count() as i64)
    }
}

/// Reset tokens keyed by user, mirroring the unique constraint
#[derive(Default)]
pub struct MemoryResetTokenStore {
    rows: Mutex<HashMap<Uuid, PasswordResetToken>>,
}

#[async_trait]
impl ResetTokenStore for MemoryResetTokenStore {
    async fn create(
        &self,
        data: NewResetToken,
    ) -> Result<Option<PasswordResetToken>, StoreError> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&data.user_id) {
            return Ok(None);
        }
        let token = PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            token: data.token,
            expires_at: data.expires_at,
            created_at: Utc::now(),
        };
        rows.insert(token.user_id, token.clone());
        Ok(Some(token))
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PasswordResetToken>, StoreError> {
        Ok(self.rows.lock().await.get(&user_id).cloned())
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.values().find(|t| t.token == token).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|_, t| t.id != id);
        Ok(rows.len() < before)
    }
}

/// Content items held in a map keyed by ID
#[derive(Default)]
pub struct MemoryContentStore {
    rows: Mutex<HashMap<Uuid, CourseContent>>,
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn create(&self, data: NewCourseContent) -> Result<CourseContent, StoreError> {
        let now = Utc::now();
        let content = CourseContent {
            id: Uuid::new_v4(),
            course_id: data.course_id,
            description: data.description,
            video_ref: data.video_ref,
            release_date: data.release_date,
            status: data.status,
            course_module: data.course_module,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().await.insert(content.id, content.clone());
        Ok(content)
    }

    async fn find(&self, id: Uuid) -> Result<Option<CourseContent>, StoreError> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<CourseContent>, StoreError> {
        let rows = self.rows.lock().await;
        let mut items: Vec<CourseContent> = rows
            .values()
            .filter(|c| c.course_id == course_id)
            .cloned()
            .collect();
        items.sort_by_key(|c| (c.release_date, c.created_at));
        Ok(items)
    }

    async fn list_pending(&self) -> Result<Vec<CourseContent>, StoreError> {
        let rows = self.rows.lock().await;
        let mut items: Vec<CourseContent> = rows
            .values()
            .filter(|c| c.status == ContentStatus::Pending)
            .cloned()
            .collect();
        items.sort_by_key(|c| c.release_date);
        Ok(items)
    }

    async fn mark_published(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&id) {
            Some(item) if item.status == ContentStatus::Pending => {
                item.status = ContentStatus::Published;
                item.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
