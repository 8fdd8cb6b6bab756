//! Role-based access control for task operations.
//!
//! Every task route funnels through these functions. They are pure — no I/O,
//! no framework types — so the visibility and mutation rules live in one
//! place instead of being scattered across handlers.
//!
//! Rules:
//! - any authenticated principal may create a task; the owner is always the
//!   caller, whatever the payload says
//! - a `User` sees and mutates only tasks it owns
//! - an `Admin` sees and mutates every task, and listings include owner info
//! - a missing task is `NotFound` for everyone, admins included

use crate::error::ApiError;
use crate::tasks::model::{Task, TaskFields};
use crate::users::Role;

/// An authenticated caller: resolved identity plus role.
///
/// Produced by the auth layer from a verified token; the evaluator trusts
/// it unconditionally.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// ─── Listing scope ────────────────────────────────────────────────────────────

/// Filter/shape directive for task listings.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingScope {
    /// All tasks, each annotated with owner id/email. Admin only.
    AllWithOwners,
    /// Only tasks owned by this principal, bare shape.
    OwnedBy(String),
}

/// Decide what a listing returns for this principal.
pub fn listing_scope(principal: &Principal) -> ListingScope {
    if principal.is_admin() {
        ListingScope::AllWithOwners
    } else {
        ListingScope::OwnedBy(principal.id.clone())
    }
}

/// Reject negative pagination values rather than clamping them.
pub fn validate_page(skip: i64, limit: i64) -> Result<(), ApiError> {
    if skip < 0 {
        return Err(ApiError::validation("skip must be a non-negative integer"));
    }
    if limit < 0 {
        return Err(ApiError::validation("limit must be a non-negative integer"));
    }
    Ok(())
}

// ─── Per-task checks ──────────────────────────────────────────────────────────

/// Existence and ownership gate shared by read, update, and delete.
///
/// `NotFound` when the task does not exist; `Forbidden` when it exists but
/// the principal is neither its owner nor an admin. On success the task is
/// handed back to the caller.
pub fn check_task_access<'t>(
    principal: &Principal,
    task: Option<&'t Task>,
) -> Result<&'t Task, ApiError> {
    let task = task.ok_or(ApiError::NotFound)?;
    if !principal.is_admin() && task.owner_id != principal.id {
        return Err(ApiError::Forbidden);
    }
    Ok(task)
}

/// Validate create input. Only the title is constrained: non-empty after
/// trimming. The owner is not taken from the payload at all — see
/// [`TaskStorage::create`](crate::tasks::TaskStorage::create), which stamps
/// the principal's id.
pub fn validate_create(fields: &TaskFields) -> Result<(), ApiError> {
    if fields.title.trim().is_empty() {
        return Err(ApiError::validation("title must not be empty"));
    }
    Ok(())
}

/// Merge proposed fields into a stored task.
///
/// A proposed value replaces the stored one only when it is not the field's
/// empty/falsy default: an empty title, an empty or absent description, or
/// `is_completed = false` leave the stored field unchanged. Consequence: this
/// path cannot clear a description or un-complete a task. That matches the
/// behavior clients already depend on — do not change it without a dedicated
/// "clear" operation to replace it.
pub fn merge_fields(stored: &Task, proposed: &TaskFields) -> Task {
    let mut merged = stored.clone();
    if !proposed.title.is_empty() {
        merged.title = proposed.title.clone();
    }
    match &proposed.description {
        Some(d) if !d.is_empty() => merged.description = Some(d.clone()),
        _ => {}
    }
    if proposed.is_completed {
        merged.is_completed = true;
    }
    merged
}

// ─── Tests ────────────────────────────────────────────────────────────────────
