// SPDX-License-Identifier: MIT
//! Tasks: model, access-control rules, and SQLite operations.

pub mod access;
pub mod model;
pub mod storage;

pub use access::Principal;
pub use model::{Task, TaskFields, TaskWithOwner};
pub use storage::TaskStorage;
