/// Task endpoints
///
/// # Endpoints
///
/// - `GET /tasks` - List with `completed`, `limit`, `skip`, `sortBy`
/// - `POST /tasks` - Create; responds 201
/// - `GET /tasks/:id` - Fetch one
/// - `PATCH /tasks/:id` - Allow-listed update
/// - `DELETE /tasks/:id` - Remove and return the prior state
///
/// Every handler takes the owner id from the authenticated session; the
/// id is never read from client input. Query parameters are normalized,
/// not validated: an unusable `limit`, `skip`, or `sortBy` falls back to
/// its default instead of failing the request.
///
/// ```text
/// GET /tasks?completed=true
/// GET /tasks?limit=10&skip=20
/// GET /tasks?sortBy=createdAt_desc
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{ensure_allowed_fields, expect_string, validation_error},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taskvault_shared::{
    auth::session::AuthSession,
    models::task::{CreateTask, Task, TaskQuery, TaskSort, UpdateTask, DEFAULT_LIMIT},
};
use uuid::Uuid;

/// Fields a task PATCH may touch; anything else fails the whole update
const TASK_UPDATE_FIELDS: [&str; 2] = ["description", "completed"];

/// Raw list query parameters, before normalization
///
/// Everything is accepted as a string so that junk input reaches the
/// normalization step instead of bouncing off the deserializer.
#[derive(Debug, Deserialize, Default)]
pub struct ListTasksQuery {
    /// Completion filter; "true" selects completed tasks, any other
    /// present value selects open ones
    pub completed: Option<String>,

    /// Page size; non-numeric or negative falls back to the default
    pub limit: Option<String>,

    /// Offset; non-numeric or negative falls back to zero
    pub skip: Option<String>,

    /// `field_asc` / `field_desc` ordering request
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

impl ListTasksQuery {
    /// Normalizes raw parameters into a [`TaskQuery`]
    pub fn normalize(self) -> TaskQuery {
        TaskQuery {
            completed: self.completed.map(|raw| raw == "true"),
            sort: self.sort_by.as_deref().and_then(TaskSort::parse),
            limit: normalize_count(self.limit.as_deref(), DEFAULT_LIMIT),
            skip: normalize_count(self.skip.as_deref(), 0),
        }
    }
}

/// Create request; unknown fields (including `owner`) are ignored, the
/// owner always comes from the session
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// What needs doing
    pub description: Option<String>,

    /// Initial completion state
    pub completed: Option<bool>,
}

/// Response carrying one task
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// The task
    pub task: Task,
}

/// Response carrying a page of tasks
#[derive(Debug, Serialize, Deserialize)]
pub struct TasksEnvelope {
    /// The page contents
    pub tasks: Vec<Task>,
}

/// List handler
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TasksEnvelope>> {
    let tasks = Task::list_by_owner(&state.db, auth.user.id, &query.normalize()).await?;

    Ok(Json(TasksEnvelope { tasks }))
}

/// Create handler
///
/// # Errors
///
/// - `422`: missing or empty description
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| validation_error("description", "Description is required"))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            owner: auth.user.id,
            description: description.to_string(),
            completed: req.completed.unwrap_or(false),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetch handler
///
/// A task owned by someone else answers exactly like a missing one.
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskEnvelope>> {
    let task = Task::find_by_id_and_owner(&state.db, id, auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found.".to_string()))?;

    Ok(Json(TaskEnvelope { task }))
}

/// Update handler
///
/// Allow-list first: a request containing any key outside
/// {description, completed} (an `owner` grab, for instance) fails whole
/// before any field is examined.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<Json<TaskEnvelope>> {
    ensure_allowed_fields(&body, &TASK_UPDATE_FIELDS)?;

    let mut update = UpdateTask::default();

    if let Some(value) = body.get("description") {
        let description = expect_string(value, "description")?;
        if description.trim().is_empty() {
            return Err(validation_error("description", "Description is required"));
        }
        update.description = Some(description.trim().to_string());
    }

    if let Some(value) = body.get("completed") {
        let completed = value
            .as_bool()
            .ok_or_else(|| validation_error("completed", "Completed must be a boolean"))?;
        update.completed = Some(completed);
    }

    let task = Task::update(&state.db, id, auth.user.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task to update not found.".to_string()))?;

    Ok(Json(TaskEnvelope { task }))
}

/// Delete handler: atomic find-and-remove, returns the prior state
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskEnvelope>> {
    let task = Task::delete(&state.db, id, auth.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task to delete not found.".to_string()))?;

    Ok(Json(TaskEnvelope { task }))
}

/// Parses a count parameter, falling back to `default` for anything that
/// is not a non-negative integer
fn normalize_count(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value >= 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskvault_shared::models::task::TaskSortField;

    #[test]
    fn test_normalize_count_defaults() {
        assert_eq!(normalize_count(None, DEFAULT_LIMIT), DEFAULT_LIMIT);
        assert_eq!(normalize_count(Some("abc"), DEFAULT_LIMIT), DEFAULT_LIMIT);
        assert_eq!(normalize_count(Some("12.5"), DEFAULT_LIMIT), DEFAULT_LIMIT);
        assert_eq!(normalize_count(Some("-3"), DEFAULT_LIMIT), DEFAULT_LIMIT);
        assert_eq!(normalize_count(Some(""), 0), 0);
    }

    #[test]
    fn test_normalize_count_accepts_plain_integers() {
        assert_eq!(normalize_count(Some("25"), DEFAULT_LIMIT), 25);
        assert_eq!(normalize_count(Some("0"), DEFAULT_LIMIT), 0);
    }

    #[test]
    fn test_query_normalization_defaults() {
        let query = ListTasksQuery::default().normalize();

        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.skip, 0);
        assert!(query.completed.is_none());
        assert!(query.sort.is_none());
    }

    #[test]
    fn test_query_normalization_junk_input() {
        let query = ListTasksQuery {
            completed: None,
            limit: Some("plenty".to_string()),
            skip: Some("-1".to_string()),
            sort_by: Some("favoriteColor_desc".to_string()),
        }
        .normalize();

        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.skip, 0);
        assert!(query.sort.is_none());
    }

    #[test]
    fn test_query_normalization_completed_flag() {
        let truthy = ListTasksQuery {
            completed: Some("true".to_string()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(truthy.completed, Some(true));

        // Any other present value selects open tasks
        let falsy = ListTasksQuery {
            completed: Some("false".to_string()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(falsy.completed, Some(false));

        let junk = ListTasksQuery {
            completed: Some("banana".to_string()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(junk.completed, Some(false));
    }

    #[test]
    fn test_query_normalization_sort() {
        let query = ListTasksQuery {
            sort_by: Some("createdAt_desc".to_string()),
            ..Default::default()
        }
        .normalize();

        let sort = query.sort.expect("Should parse sort");
        assert_eq!(sort.field, TaskSortField::CreatedAt);
        assert!(sort.descending);
    }
}
