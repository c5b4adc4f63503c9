//! Diesel table definitions, mirrored by the SQL in `migrations/`.
//!
//! The unique constraint `materialized_class_occurrence_key` on
//! `(template_id, occurrence_start)` is the coordination point for
//! idempotent materialization; it is a hard requirement of the schema,
//! not an optimization.

diesel::table! {
    class_template (id) {
        id -> Uuid,
        teacher_id -> Uuid,
        service_id -> Nullable<Uuid>,
        anchor_start -> Timestamptz,
        duration_minutes -> Int4,
        frequency -> Text,
        recur_until -> Nullable<Timestamptz>,
        recur_count -> Nullable<Int4>,
        is_group -> Bool,
        is_trial -> Bool,
        notes -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    template_participant (template_id, student_id) {
        template_id -> Uuid,
        student_id -> Uuid,
        status -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    materialized_class (id) {
        id -> Uuid,
        template_id -> Uuid,
        occurrence_start -> Timestamptz,
        occurrence_end -> Timestamptz,
        teacher_id -> Uuid,
        service_id -> Nullable<Uuid>,
        is_group -> Bool,
        is_trial -> Bool,
        notes -> Nullable<Text>,
        status -> Text,
        trigger_reason -> Nullable<Text>,
        materialized_at -> Timestamptz,
    }
}

diesel::table! {
    materialized_participant (class_id, student_id) {
        class_id -> Uuid,
        student_id -> Uuid,
        status -> Text,
    }
}

diesel::table! {
    cancellation_policy (id) {
        id -> Uuid,
        teacher_id -> Uuid,
        hours_before_class -> Int4,
        charge_percentage -> Int4,
        allow_amnesty -> Bool,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    working_hours (id) {
        id -> Uuid,
        teacher_id -> Uuid,
        day_of_week -> Int2,
        start_minute -> Int4,
        end_minute -> Int4,
        is_active -> Bool,
    }
}

diesel::table! {
    blockout (id) {
        id -> Uuid,
        teacher_id -> Uuid,
        start_at -> Timestamptz,
        end_at -> Timestamptz,
        reason -> Nullable<Text>,
    }
}

diesel::table! {
    service (id) {
        id -> Uuid,
        teacher_id -> Uuid,
        name -> Text,
        price -> Nullable<Numeric>,
    }
}

diesel::joinable!(template_participant -> class_template (template_id));
diesel::joinable!(materialized_class -> class_template (template_id));
diesel::joinable!(materialized_participant -> materialized_class (class_id));
diesel::joinable!(class_template -> service (service_id));

diesel::allow_tables_to_appear_in_same_query!(
    class_template,
    template_participant,
    materialized_class,
    materialized_participant,
    cancellation_policy,
    working_hours,
    blockout,
    service,
);
