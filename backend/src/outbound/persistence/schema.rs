//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` carries a unique index.
    users (id) {
        id -> Uuid,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        role -> Varchar,
        avatar -> Text,
        phone -> Nullable<Text>,
        bio -> Nullable<Text>,
        location -> Nullable<Text>,
        date_of_birth -> Nullable<Date>,
        occupation -> Nullable<Text>,
        education -> Nullable<Text>,
        is_active -> Bool,
        is_email_verified -> Bool,
        last_login -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Course catalog. `students_count` is only written by the enrollment
    /// transaction.
    courses (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        price -> Float8,
        category -> Varchar,
        level -> Varchar,
        duration -> Float8,
        instructor -> Varchar,
        thumbnail -> Text,
        rating -> Float8,
        students_count -> Int4,
        lessons_count -> Int4,
        tags -> Array<Text>,
        is_published -> Bool,
        created_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// User to course links. `(user_id, course_id)` is unique; neither column
    /// is a foreign key so enrollments outlive their user or course.
    enrollments (id) {
        id -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        progress -> Float8,
        completed_lessons -> Int4,
        enrolled_at -> Timestamptz,
        last_accessed -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(courses, enrollments, users);
