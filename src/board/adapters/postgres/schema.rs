//! Diesel schema for board task storage.

diesel::table! {
    /// Task records for every role's pipeline board.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Pipeline stage name.
        #[max_length = 100]
        status -> Varchar,
        /// Priority (`low`, `medium`, `high`, `urgent`).
        #[max_length = 20]
        priority -> Varchar,
        /// Owning role.
        #[max_length = 20]
        role -> Varchar,
        /// Creating user.
        created_by -> Uuid,
        /// Optional assignee.
        assigned_to -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Rank within the stage.
        position -> Int4,
        /// Revision counter advanced by every update.
        revision -> Int8,
    }
}
