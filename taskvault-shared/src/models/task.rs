/// Task model and the ownership-scoped query engine
///
/// Every operation here takes the authenticated owner's id and bakes it
/// into the SQL, so a task belonging to someone else behaves exactly like
/// a task that does not exist. There is no code path that reads or writes
/// a task without an owner constraint.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner UUID NOT NULL REFERENCES users(id),
///     description TEXT NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskvault_shared::models::task::{CreateTask, Task, TaskQuery};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), sqlx::Error> {
/// Task::create(&pool, CreateTask {
///     owner,
///     description: "buy milk".to_string(),
///     completed: false,
/// }).await?;
///
/// let open = Task::list_by_owner(&pool, owner, &TaskQuery {
///     completed: Some(false),
///     ..TaskQuery::default()
/// }).await?;
/// assert_eq!(open.len(), 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Page size applied when the caller gives no usable limit
pub const DEFAULT_LIMIT: i64 = 10;

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user; never settable by clients
    pub owner: Uuid,

    /// What needs doing
    pub description: String,

    /// Whether it is done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owner id, taken from the authenticated session
    pub owner: Uuid,

    /// Task description (validated non-empty by the handler)
    pub description: String,

    /// Initial completion state
    pub completed: bool,
}

/// Input for a task update; only non-None fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New description
    pub description: Option<String>,

    /// New completion state
    pub completed: Option<bool>,
}

/// Sortable task fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    Description,
    Completed,
    CreatedAt,
    UpdatedAt,
}

impl TaskSortField {
    /// Maps a client-facing field name (camelCase or snake_case) to a
    /// sortable field. Anything unrecognized is no sort at all.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "description" => Some(TaskSortField::Description),
            "completed" => Some(TaskSortField::Completed),
            "createdAt" | "created_at" => Some(TaskSortField::CreatedAt),
            "updatedAt" | "updated_at" => Some(TaskSortField::UpdatedAt),
            _ => None,
        }
    }

    /// Column name used when building the ORDER BY clause
    pub fn as_column(&self) -> &'static str {
        match self {
            TaskSortField::Description => "description",
            TaskSortField::Completed => "completed",
            TaskSortField::CreatedAt => "created_at",
            TaskSortField::UpdatedAt => "updated_at",
        }
    }
}

/// A field plus direction, parsed from `sortBy=field_asc|field_desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub descending: bool,
}

impl TaskSort {
    /// Parses the `sortBy` query value
    ///
    /// The direction suffix is optional and defaults to ascending;
    /// `createdAt`, `createdAt_asc`, and `created_at_desc` all parse.
    /// An unrecognized field yields `None` (store-default order), the
    /// same normalize-don't-crash policy the limit/skip parameters get.
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, descending) = match raw.rsplit_once('_') {
            Some((field, "desc")) => (field, true),
            Some((field, "asc")) => (field, false),
            _ => (raw, false),
        };

        TaskSortField::parse(field).map(|field| TaskSort { field, descending })
    }
}

/// Normalized list-query parameters
#[derive(Debug, Clone)]
pub struct TaskQuery {
    /// Restrict to this completion state when present
    pub completed: Option<bool>,

    /// Requested ordering; `None` means store-default order
    pub sort: Option<TaskSort>,

    /// Page size
    pub limit: i64,

    /// Rows to skip before the page starts
    pub skip: i64,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            completed: None,
            sort: None,
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

impl Task {
    /// Creates a task for the given owner
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner, description, completed)
            VALUES ($1, $2, $3)
            RETURNING id, owner, description, completed, created_at, updated_at
            "#,
        )
        .bind(data.owner)
        .bind(data.description)
        .bind(data.completed)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Fetches one task, constrained to its owner
    ///
    /// A task owned by someone else and a task that does not exist are
    /// the same `None` here.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner, description, completed, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND owner = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// The list query: filtered, sorted, paginated, always owner-scoped
    ///
    /// Sort columns come from the [`TaskSortField`] enum, never from raw
    /// client input. Without an explicit sort the order is
    /// `created_at ASC, id ASC`; the id tiebreak keeps every ordering
    /// deterministic for a fixed data set.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner: Uuid,
        query: &TaskQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut sql = String::from(
            "SELECT id, owner, description, completed, created_at, updated_at \
             FROM tasks WHERE owner = $1",
        );

        let mut bind_count = 1;
        if query.completed.is_some() {
            bind_count += 1;
            sql.push_str(&format!(" AND completed = ${}", bind_count));
        }

        match query.sort {
            Some(sort) => {
                let direction = if sort.descending { "DESC" } else { "ASC" };
                sql.push_str(&format!(
                    " ORDER BY {} {}, id ASC",
                    sort.field.as_column(),
                    direction
                ));
            }
            None => sql.push_str(" ORDER BY created_at ASC, id ASC"),
        }

        sql.push_str(&format!(
            " LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Task>(&sql).bind(owner);
        if let Some(completed) = query.completed {
            q = q.bind(completed);
        }

        let tasks = q.bind(query.limit).bind(query.skip).fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Applies an update to a task the owner holds
    ///
    /// Returns `None` when no task with that id is owned by `owner` —
    /// which covers both "missing" and "not yours".
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND owner = $2 \
             RETURNING id, owner, description, completed, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner);

        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Atomic find-and-remove scoped to the owner
    ///
    /// Returns the removed task's prior state, or `None` if nothing the
    /// owner holds matched.
    pub async fn delete(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND owner = $2
            RETURNING id, owner, description, completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Counts the owner's tasks
    pub async fn count_by_owner(pool: &PgPool, owner: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE owner = $1")
            .bind(owner)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse_with_direction() {
        let sort = TaskSort::parse("createdAt_desc").expect("Should parse");
        assert_eq!(sort.field, TaskSortField::CreatedAt);
        assert!(sort.descending);

        let sort = TaskSort::parse("completed_asc").expect("Should parse");
        assert_eq!(sort.field, TaskSortField::Completed);
        assert!(!sort.descending);
    }

    #[test]
    fn test_sort_parse_snake_case_field() {
        let sort = TaskSort::parse("created_at_desc").expect("Should parse");
        assert_eq!(sort.field, TaskSortField::CreatedAt);
        assert!(sort.descending);

        // Bare snake_case field, no direction suffix
        let sort = TaskSort::parse("updated_at").expect("Should parse");
        assert_eq!(sort.field, TaskSortField::UpdatedAt);
        assert!(!sort.descending);
    }

    #[test]
    fn test_sort_parse_defaults_to_ascending() {
        let sort = TaskSort::parse("description").expect("Should parse");
        assert_eq!(sort.field, TaskSortField::Description);
        assert!(!sort.descending);
    }

    #[test]
    fn test_sort_parse_unknown_field_is_none() {
        assert!(TaskSort::parse("owner_desc").is_none());
        assert!(TaskSort::parse("garbage").is_none());
        assert!(TaskSort::parse("").is_none());
    }

    #[test]
    fn test_sort_field_columns_are_fixed() {
        assert_eq!(TaskSortField::CreatedAt.as_column(), "created_at");
        assert_eq!(TaskSortField::UpdatedAt.as_column(), "updated_at");
        assert_eq!(TaskSortField::Description.as_column(), "description");
        assert_eq!(TaskSortField::Completed.as_column(), "completed");
    }

    #[test]
    fn test_query_defaults() {
        let query = TaskQuery::default();
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.skip, 0);
        assert!(query.completed.is_none());
        assert!(query.sort.is_none());
    }
}
