use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{
    Content, Course, CourseQuiz, NewContent, NewCourse, NewCourseQuiz,
};
use crate::database::schema::{contents, course_quizzes, courses};
use diesel::prelude::*;
use std::sync::Arc;

/// Course repository trait - courses, their contents and content quizzes
#[cfg_attr(test, mockall::automock)]
pub trait CourseRepository: Send + Sync {
    /// All courses, oldest first
    fn list_courses(&self) -> Result<Vec<Course>, DatabaseError>;

    fn find_course(&self, course_id: i64) -> Result<Option<Course>, DatabaseError>;

    fn insert_course(&self, new_course: NewCourse) -> Result<Course, DatabaseError>;

    /// Contents of a course ordered by position
    fn contents_for_course(&self, course_id: i64) -> Result<Vec<Content>, DatabaseError>;

    fn find_content(&self, content_id: i64) -> Result<Option<Content>, DatabaseError>;

    fn insert_content(&self, new_content: NewContent) -> Result<Content, DatabaseError>;

    /// Total content items across all courses
    fn count_contents(&self) -> Result<i64, DatabaseError>;

    fn quiz_for_content(&self, content_id: i64) -> Result<Option<CourseQuiz>, DatabaseError>;

    fn insert_course_quiz(&self, new_quiz: NewCourseQuiz) -> Result<CourseQuiz, DatabaseError>;
}

/// Concrete implementation of CourseRepository
pub struct CourseRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl CourseRepositoryImpl {
    /// Create new course repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl CourseRepository for CourseRepositoryImpl {
    fn list_courses(&self) -> Result<Vec<Course>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        courses::table
            .order(courses::id.asc())
            .load::<Course>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn find_course(&self, course_id: i64) -> Result<Option<Course>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        courses::table
            .filter(courses::id.eq(course_id))
            .first::<Course>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn insert_course(&self, new_course: NewCourse) -> Result<Course, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(courses::table)
            .values(&new_course)
            .get_result::<Course>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn contents_for_course(&self, course_id: i64) -> Result<Vec<Content>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        contents::table
            .filter(contents::course_id.eq(course_id))
            .order((contents::position.asc(), contents::id.asc()))
            .load::<Content>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn find_content(&self, content_id: i64) -> Result<Option<Content>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        contents::table
            .filter(contents::id.eq(content_id))
            .first::<Content>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn insert_content(&self, new_content: NewContent) -> Result<Content, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(contents::table)
            .values(&new_content)
            .get_result::<Content>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn count_contents(&self) -> Result<i64, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        contents::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn quiz_for_content(&self, content_id: i64) -> Result<Option<CourseQuiz>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        course_quizzes::table
            .filter(course_quizzes::content_id.eq(content_id))
            .first::<CourseQuiz>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    fn insert_course_quiz(&self, new_quiz: NewCourseQuiz) -> Result<CourseQuiz, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::insert_into(course_quizzes::table)
            .values(&new_quiz)
            .get_result::<CourseQuiz>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
