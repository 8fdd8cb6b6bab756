// rest/routes/tasks.rs — Task CRUD routes.
//
// Handlers are thin: authorization decisions live in `tasks::access`,
// persistence in `tasks::storage`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::rest::extract::CurrentUser;
use crate::tasks::access::{
    check_task_access, listing_scope, merge_fields, validate_create, validate_page, ListingScope,
};
use crate::tasks::TaskFields;
use crate::AppContext;

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    user: CurrentUser,
    Json(fields): Json<TaskFields>,
) -> Result<Json<Value>, ApiError> {
    validate_create(&fields)?;
    // Owner is always the caller; any owner_id in the payload is ignored.
    let task = ctx.tasks.create(&user.0.id, &fields).await?;
    info!(task_id = %task.id, owner_id = %task.owner_id, "task created");
    Ok(Json(serde_json::to_value(&task).map_err(anyhow::Error::from)?))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    user: CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let skip = page.skip.unwrap_or(0);
    let limit = page.limit.unwrap_or(ctx.config.default_page_limit);
    validate_page(skip, limit)?;

    let value = match listing_scope(&user.principal()) {
        ListingScope::AllWithOwners => {
            let tasks = ctx.tasks.list_all_with_owners(skip, limit).await?;
            serde_json::to_value(&tasks).map_err(anyhow::Error::from)?
        }
        ListingScope::OwnedBy(owner_id) => {
            let tasks = ctx.tasks.list_by_owner(&owner_id, skip, limit).await?;
            serde_json::to_value(&tasks).map_err(anyhow::Error::from)?
        }
    };
    Ok(Json(value))
}

pub async fn get_task(
    State(ctx): State<Arc<AppContext>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let stored = ctx.tasks.get(&id).await?;
    let task = check_task_access(&user.principal(), stored.as_ref())?;
    Ok(Json(serde_json::to_value(task).map_err(anyhow::Error::from)?))
}

pub async fn update_task(
    State(ctx): State<Arc<AppContext>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(fields): Json<TaskFields>,
) -> Result<Json<Value>, ApiError> {
    let stored = ctx.tasks.get(&id).await?;
    let task = check_task_access(&user.principal(), stored.as_ref())?;

    let merged = merge_fields(task, &fields);
    let updated = ctx.tasks.update(&merged).await?;
    info!(task_id = %updated.id, "task updated");
    Ok(Json(
        serde_json::to_value(&updated).map_err(anyhow::Error::from)?,
    ))
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let stored = ctx.tasks.get(&id).await?;
    let task = check_task_access(&user.principal(), stored.as_ref())?;

    ctx.tasks.delete(&task.id).await?;
    info!(task_id = %task.id, "task deleted");
    Ok(Json(serde_json::json!({ "detail": "Task deleted" })))
}
