// SPDX-License-Identifier: MIT
//! User accounts: model, roles, and SQLite operations.

pub mod model;
pub mod storage;

pub use model::{Role, User, UserInfo};
pub use storage::UserStorage;
