/// Admission control for course membership
///
/// Decides whether a user may join or leave a course. Caller identity is
/// always an explicit argument; nothing here reads ambient request state.
///
/// # Check order
///
/// `join` evaluates its preconditions in a fixed order, and that order is
/// part of the contract (it determines which error a client sees when
/// several conditions hold at once):
///
/// 1. the course exists
/// 2. the caller is not the course owner
/// 3. the course has a free spot
/// 4. the caller is not already a member
///
/// The store insert then re-checks capacity and uniqueness atomically, so a
/// concurrent join racing for the last spot loses cleanly instead of
/// overshooting `maximum_attendees`.
///
/// # Example
///
/// ```no_run
/// use courseloft_shared::admission::AdmissionControl;
/// use courseloft_shared::store::Stores;
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid, course_id: Uuid) -> anyhow::Result<()> {
/// let stores = Stores::memory();
/// let admission = AdmissionControl::new(stores.courses, stores.memberships);
/// let membership = admission.join(user_id, course_id).await?;
/// # Ok(())
/// # }
/// ```
use crate::models::{Membership, NewMembership};
use crate::store::{CourseStore, MembershipInsert, MembershipStore, StoreError};
use std::sync::Arc;
use uuid::Uuid;

/// Error type for admission decisions
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// The course does not exist
    #[error("course not found")]
    CourseNotFound,

    /// The caller owns the course
    #[error("task not allowed")]
    OwnerEnrollment,

    /// The course is at `maximum_attendees`
    #[error("no available spots in this course")]
    NoAvailableSpots,

    /// The caller already holds a membership for the course
    #[error("already enrolled in this course")]
    AlreadyEnrolled,

    /// No membership exists for the (user, course) pair
    #[error("membership not found")]
    MembershipNotFound,

    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Admission-control service
pub struct AdmissionControl {
    courses: Arc<dyn CourseStore>,
    memberships: Arc<dyn MembershipStore>,
}

impl AdmissionControl {
    /// Creates the service over the given stores
    pub fn new(courses: Arc<dyn CourseStore>, memberships: Arc<dyn MembershipStore>) -> Self {
        Self {
            courses,
            memberships,
        }
    }

    /// Joins `user_id` to `course_id`
    ///
    /// # Errors
    ///
    /// - [`AdmissionError::CourseNotFound`] — no such course
    /// - [`AdmissionError::OwnerEnrollment`] — owners cannot join their own course
    /// - [`AdmissionError::NoAvailableSpots`] — course full
    /// - [`AdmissionError::AlreadyEnrolled`] — duplicate (user, course) pair
    pub async fn join(&self, user_id: Uuid, course_id: Uuid) -> Result<Membership, AdmissionError> {
        let course = self
            .courses
            .find(course_id)
            .await?
            .ok_or(AdmissionError::CourseNotFound)?;

        if course.owner_id == user_id {
            return Err(AdmissionError::OwnerEnrollment);
        }

        let count = self.memberships.count_by_course(course_id).await?;
        if count >= i64::from(course.maximum_attendees) {
            return Err(AdmissionError::NoAvailableSpots);
        }

        if self.memberships.find(user_id, course_id).await?.is_some() {
            return Err(AdmissionError::AlreadyEnrolled);
        }

        // The insert re-validates capacity and uniqueness atomically; a
        // race lost between the checks above and here maps back onto the
        // same error the serialized path would have produced.
        let outcome = self
            .memberships
            .insert(
                NewMembership {
                    user_id,
                    course_id,
                },
                course.maximum_attendees,
            )
            .await?;

        match outcome {
            MembershipInsert::Inserted(membership) => {
                tracing::info!(
                    user_id = %user_id,
                    course_id = %course_id,
                    "user joined course"
                );
                Ok(membership)
            }
            MembershipInsert::CapacityExhausted => Err(AdmissionError::NoAvailableSpots),
            MembershipInsert::Duplicate => Err(AdmissionError::AlreadyEnrolled),
        }
    }

    /// Removes the membership of `user_id` in `course_id`
    ///
    /// # Errors
    ///
    /// [`AdmissionError::MembershipNotFound`] when the pair holds no
    /// membership (including a retried leave after the first succeeded).
    pub async fn leave(&self, user_id: Uuid, course_id: Uuid) -> Result<(), AdmissionError> {
        let deleted = self.memberships.delete(user_id, course_id).await?;
        if !deleted {
            return Err(AdmissionError::MembershipNotFound);
        }

        tracing::info!(
            user_id = %user_id,
            course_id = %course_id,
            "user left course"
        );
        Ok(())
    }

    /// Lists the members of a course
    pub async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Membership>, AdmissionError> {
        Ok(self.memberships.list_by_course(course_id).await?)
    }

    /// Lists the courses a user has joined
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Membership>, AdmissionError> {
        Ok(self.memberships.list_by_user(user_id).await?)
    }
}
