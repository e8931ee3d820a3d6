/// Course and content authoring
///
/// Courses are created with a capacity bound; content items are attached by
/// the course owner and classified against today's date on creation (see
/// [`crate::models::ContentStatus::classify`]): releasing today publishes
/// immediately, a future date leaves the item pending for the publication
/// worker, and a past date is rejected outright.
use crate::models::{
    ContentStatus, Course, CourseContent, CreateCourse, NewCourseContent,
};
use crate::store::{ContentStore, CourseStore, StoreError};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Error type for authoring operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The course does not exist
    #[error("course not found")]
    CourseNotFound,

    /// Only the course owner may author content
    #[error("only the course owner can manage its content")]
    NotCourseOwner,

    /// Capacity must be at least one attendee
    #[error("maximum attendees must be at least 1")]
    InvalidCapacity,

    /// The release date is already in the past
    #[error("release date cannot be in the past")]
    InvalidReleaseDate,

    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for a new content item, before classification
#[derive(Debug, Clone)]
pub struct ContentDraft {
    pub description: String,
    pub video_ref: String,
    pub release_date: NaiveDate,
    pub course_module: String,
}

/// Authoring service over the course and content stores
pub struct CourseCatalog {
    courses: Arc<dyn CourseStore>,
    content: Arc<dyn ContentStore>,
}

impl CourseCatalog {
    pub fn new(courses: Arc<dyn CourseStore>, content: Arc<dyn ContentStore>) -> Self {
        Self { courses, content }
    }

    /// Creates a course owned by `owner_id`
    pub async fn create_course(
        &self,
        owner_id: Uuid,
        title: String,
        maximum_attendees: i32,
    ) -> Result<Course, CatalogError> {
        if maximum_attendees < 1 {
            return Err(CatalogError::InvalidCapacity);
        }

        let course = self
            .courses
            .create(CreateCourse {
                owner_id,
                title,
                maximum_attendees,
            })
            .await?;

        tracing::info!(course_id = %course.id, owner_id = %owner_id, "course created");
        Ok(course)
    }

    /// Fetches a course
    pub async fn get_course(&self, course_id: Uuid) -> Result<Course, CatalogError> {
        self.courses
            .find(course_id)
            .await?
            .ok_or(CatalogError::CourseNotFound)
    }

    /// Attaches a content item to a course
    ///
    /// The item is classified against today's UTC date; see the module
    /// docs for the publishing rules.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CourseNotFound`] — no such course
    /// - [`CatalogError::NotCourseOwner`] — `caller_id` does not own it
    /// - [`CatalogError::InvalidReleaseDate`] — release date in the past
    pub async fn create_content(
        &self,
        caller_id: Uuid,
        course_id: Uuid,
        draft: ContentDraft,
    ) -> Result<CourseContent, CatalogError> {
        self.create_content_on(caller_id, course_id, draft, Utc::now().date_naive())
            .await
    }

    /// Like [`Self::create_content`] with an explicit "today", for
    /// deterministic classification in tests
    pub async fn create_content_on(
        &self,
        caller_id: Uuid,
        course_id: Uuid,
        draft: ContentDraft,
        today: NaiveDate,
    ) -> Result<CourseContent, CatalogError> {
        let course = self
            .courses
            .find(course_id)
            .await?
            .ok_or(CatalogError::CourseNotFound)?;

        if course.owner_id != caller_id {
            return Err(CatalogError::NotCourseOwner);
        }

        let status = ContentStatus::classify(draft.release_date, today)
            .ok_or(CatalogError::InvalidReleaseDate)?;

        let content = self
            .content
            .create(NewCourseContent {
                course_id,
                description: draft.description,
                video_ref: draft.video_ref,
                release_date: draft.release_date,
                status,
                course_module: draft.course_module,
            })
            .await?;

        tracing::info!(
            content_id = %content.id,
            course_id = %course_id,
            status = content.status.as_str(),
            release_date = %content.release_date,
            "content item created"
        );
        Ok(content)
    }

    /// Lists a course's content, oldest release first
    pub async fn list_content(&self, course_id: Uuid) -> Result<Vec<CourseContent>, CatalogError> {
        if self.courses.find(course_id).await?.is_none() {
            return Err(CatalogError::CourseNotFound);
        }
        Ok(self.content.list_by_course(course_id).await?)
    }
}
