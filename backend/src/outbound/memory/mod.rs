//! In-memory repositories for database-less runs and tests.
//!
//! One [`InMemoryStore`] implements all three repository ports over a single
//! mutex so that `enroll` can check uniqueness, insert and bump the course
//! counter atomically, mirroring the Diesel transaction.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::ports::{
    CoursePersistenceError, CourseRepository, EnrollmentPersistenceError, EnrollmentRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Course, CourseFilter, CourseId, CourseListQuery, EmailAddress, EnrolledCourse, Enrollment,
    EnrollmentId, EnrollmentTarget, User, UserId, enrollment::sort_by_recent_access,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    courses: HashMap<CourseId, Course>,
    enrollments: HashMap<EnrollmentId, Enrollment>,
}

/// Process-local store backing every repository port.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Option<MutexGuard<'_, StoreState>> {
        self.state.lock().ok()
    }
}

fn window<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

fn total(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        if state.users.values().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.to_string()));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        let clash = state
            .users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email);
        if clash {
            return Err(UserPersistenceError::duplicate_email(user.email.to_string()));
        }
        Ok(match state.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        Ok(state.users.remove(id).is_some())
    }

    async fn list(&self, page: PageRequest) -> Result<(Vec<User>, u64), UserPersistenceError> {
        let state = self.lock().ok_or_else(|| UserPersistenceError::query(POISONED))?;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| right.id.cmp(&left.id))
        });
        let count = total(users.len());
        Ok((window(users, page), count))
    }
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        let mut state = self.lock().ok_or_else(|| CoursePersistenceError::query(POISONED))?;
        state.courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<bool, CoursePersistenceError> {
        let mut state = self.lock().ok_or_else(|| CoursePersistenceError::query(POISONED))?;
        Ok(match state.courses.get_mut(&course.id) {
            Some(stored) => {
                let students_count = stored.students_count;
                *stored = course.clone();
                stored.students_count = students_count;
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CoursePersistenceError> {
        let state = self.lock().ok_or_else(|| CoursePersistenceError::query(POISONED))?;
        Ok(state.courses.get(id).cloned())
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, CoursePersistenceError> {
        let mut state = self.lock().ok_or_else(|| CoursePersistenceError::query(POISONED))?;
        Ok(state.courses.remove(id).is_some())
    }

    async fn list(&self, query: &CourseListQuery) -> Result<Vec<Course>, CoursePersistenceError> {
        let state = self.lock().ok_or_else(|| CoursePersistenceError::query(POISONED))?;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|course| query.filter.matches(course))
            .cloned()
            .collect();
        courses.sort_by(|left, right| query.sort.compare(left, right));
        Ok(window(courses, query.page))
    }

    async fn count(&self, filter: &CourseFilter) -> Result<u64, CoursePersistenceError> {
        let state = self.lock().ok_or_else(|| CoursePersistenceError::query(POISONED))?;
        Ok(total(
            state
                .courses
                .values()
                .filter(|course| filter.matches(course))
                .count(),
        ))
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), EnrollmentPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| EnrollmentPersistenceError::query(POISONED))?;
        let duplicate = state.enrollments.values().any(|existing| {
            existing.user_id == enrollment.user_id && existing.course_id == enrollment.course_id
        });
        if duplicate {
            return Err(EnrollmentPersistenceError::already_enrolled());
        }
        let course = state
            .courses
            .get_mut(&enrollment.course_id)
            .ok_or_else(EnrollmentPersistenceError::course_missing)?;
        course.students_count = course.students_count.saturating_add(1);
        state.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(())
    }

    async fn find_for_user(
        &self,
        user_id: &UserId,
        target: EnrollmentTarget,
    ) -> Result<Option<Enrollment>, EnrollmentPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| EnrollmentPersistenceError::query(POISONED))?;
        Ok(state
            .enrollments
            .values()
            .find(|enrollment| enrollment.user_id == *user_id && target.matches(enrollment))
            .cloned())
    }

    async fn save_progress(
        &self,
        enrollment: &Enrollment,
    ) -> Result<(), EnrollmentPersistenceError> {
        let mut state = self
            .lock()
            .ok_or_else(|| EnrollmentPersistenceError::query(POISONED))?;
        let stored = state
            .enrollments
            .get_mut(&enrollment.id)
            .ok_or_else(|| EnrollmentPersistenceError::query("enrollment vanished during update"))?;
        stored.progress = enrollment.progress;
        stored.completed_lessons = enrollment.completed_lessons;
        stored.last_accessed = enrollment.last_accessed;
        stored.updated_at = enrollment.updated_at;
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EnrolledCourse>, EnrollmentPersistenceError> {
        let state = self
            .lock()
            .ok_or_else(|| EnrollmentPersistenceError::query(POISONED))?;
        let mut entries: Vec<EnrolledCourse> = state
            .enrollments
            .values()
            .filter(|enrollment| enrollment.user_id == *user_id)
            .map(|enrollment| EnrolledCourse {
                enrollment: enrollment.clone(),
                course: state.courses.get(&enrollment.course_id).map(Course::summary),
            })
            .collect();
        sort_by_recent_access(&mut entries);
        Ok(entries)
    }
}
